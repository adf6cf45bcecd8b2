// src/main.rs

// sexp_engine
// Resolves media-pipeline profile expressions from the command line.

use clap::Parser as ClapParser;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::Level;

use sexp_engine::{evaluate, parse, tokenize, Context, FunctionRegistry, Literal};

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Expression to evaluate. If neither this nor --file is given, launches the REPL.
    expr: Option<String>,

    /// Read the expression from a file instead.
    #[arg(short, long, conflicts_with = "expr")]
    file: Option<PathBuf>,

    /// Bind a variable, e.g. `-D quality=80` or `-D encoder='"lame"'`.
    #[arg(short = 'D', long = "define", value_name = "NAME=VALUE", value_parser = parse_binding)]
    defines: Vec<(String, Literal)>,

    /// Print the token stream instead of evaluating.
    #[arg(long)]
    tokens: bool,

    /// Print the parsed tree before evaluating.
    #[arg(long)]
    tree: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Values that read as a literal keep their type; anything else binds as a
/// plain string so `-D encoder=lame` works without quoting.
fn parse_binding(raw: &str) -> Result<(String, Literal), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{}'", raw));
    }
    let literal = value.parse::<Literal>().unwrap_or_else(|_| Literal::string(value));
    Ok((name.to_string(), literal))
}

fn show_examples() {
    println!("\n--- Profile Expression Examples ---\n");

    let examples = [
        ("Arithmetic", "(+ 1 2)"),
        ("Threshold on a variable", "(> quality 50)"),
        ("Choosing an encoder", "(if (> quality 50) \"high-bitrate-enc\" \"low-bitrate-enc\")"),
        ("Multi-way choice", "(cond (< quality 30) \"low\" (< quality 70) \"mid\" \"high\")"),
        ("Assembling a pipeline", "(join \" ! \" \"audioconvert\" (+ \"lame bitrate=\" (* quality 2)))"),
    ];

    for (description, code) in examples.iter() {
        println!("; {}", description);
        println!("{}\n", code);
    }
    println!("-----------------------------------\n");
}

// Parses, optionally dumps, and evaluates one expression.
fn process_input(input: &str, context: &Context, cli: &Cli) -> Result<Option<Literal>, String> {
    if cli.tokens {
        let tokens = tokenize(input).map_err(|e| format!("Lex error: {}", e))?;
        for token in tokens {
            println!("{}", token);
        }
        return Ok(None);
    }

    let tree = parse(input).map_err(|e| e.to_string())?;
    if cli.tree {
        println!("Parsed: {}", tree);
    }
    evaluate(&tree, context, FunctionRegistry::builtins())
        .map(Some)
        .map_err(|e| format!("Eval error: {}", e))
}

// Simple REPL
fn repl(context: &mut Context, cli: &Cli) {
    println!("sexp_engine REPL");
    println!("Enter expressions, ':let NAME=VALUE', ':examples', or 'quit'");

    loop {
        print!("> ");
        if std::io::stdout().flush().is_err() {
            break;
        }
        let mut input = String::new();
        match std::io::stdin().read_line(&mut input) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input_str = input.trim();

        if input_str == "quit" || input_str == "exit" { break; }
        if input_str.is_empty() { continue; }
        if input_str == ":examples" {
            show_examples();
            continue;
        }
        if let Some(binding) = input_str.strip_prefix(":let ") {
            match parse_binding(binding) {
                Ok((name, value)) => {
                    println!("{} = {}", name, value.to_source());
                    context.insert(name, value);
                }
                Err(e) => println!("Error: {}", e),
            }
            continue;
        }

        match process_input(input_str, context, cli) {
            Ok(Some(result)) => print_result(&result),
            Ok(None) => {}
            Err(e) => println!("Error: {}", e),
        }
    }
}

/// Runs the engine on an expression stored in a file.
fn run_script(path: &Path, context: &Context, cli: &Cli) -> Result<(), String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read file '{}': {}", path.display(), e))?;
    tracing::info!(path = %path.display(), "evaluating profile file");
    if let Some(result) = process_input(&content, context, cli)? {
        print_result(&result);
    }
    Ok(())
}

fn print_result(result: &Literal) {
    println!("{}", result.to_display_string());
    tracing::debug!(kind = %result.enclosed_type(), "result");
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut context: Context = cli.defines.iter().cloned().collect();

    let outcome = if let Some(path) = &cli.file {
        run_script(path, &context, &cli)
    } else if let Some(expr) = &cli.expr {
        process_input(expr, &context, &cli).map(|result| {
            if let Some(result) = result {
                print_result(&result);
            }
        })
    } else {
        repl(&mut context, &cli);
        Ok(())
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
