// src/parser.rs

use crate::ast::Node;
use crate::error::{LexError, ParseError, ParseErrorKind, SyntaxError};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::literal::Literal;

/// Knobs for the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest call nesting accepted before giving up with `TooDeep`.
    pub max_depth: usize,
}

pub const DEFAULT_MAX_DEPTH: usize = 256;

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { max_depth: DEFAULT_MAX_DEPTH }
    }
}

// --- The Parser ---
// Recursive descent over the lexer's token stream with one token of lookahead.
pub struct Parser {
    lexer: Lexer,
    lookahead: Option<Token>,
    options: ParseOptions,
    depth: usize,
}

impl Parser {
    pub fn new(input: &str) -> Self {
        Self::with_options(input, ParseOptions::default())
    }

    pub fn with_options(input: &str, options: ParseOptions) -> Self {
        Parser {
            lexer: Lexer::new(input),
            lookahead: None,
            options,
            depth: 0,
        }
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        if let Some(token) = self.lookahead.take() {
            return Ok(Some(token));
        }
        self.lexer.next().transpose()
    }

    fn peek_token(&mut self) -> Result<Option<&Token>, LexError> {
        if self.lookahead.is_none() {
            self.lookahead = self.lexer.next().transpose()?;
        }
        Ok(self.lookahead.as_ref())
    }

    fn error_at(token: &Token, kind: ParseErrorKind) -> ParseError {
        ParseError { kind, line: token.position.line, col: token.position.col }
    }

    pub fn parse(&mut self) -> Result<Node, SyntaxError> {
        let first = match self.next_token()? {
            Some(token) => token,
            None => {
                return Err(ParseError { kind: ParseErrorKind::EmptyInput, line: 1, col: 1 }.into());
            }
        };
        let node = self.parse_expr(first)?;

        if let Some(extra) = self.next_token()? {
            let kind = match extra.kind {
                TokenKind::CloseParen => ParseErrorKind::UnmatchedCloseParen,
                _ => ParseErrorKind::UnexpectedToken {
                    found: extra.lexeme.clone(),
                    expected: "end of input",
                },
            };
            return Err(Self::error_at(&extra, kind).into());
        }
        Ok(node)
    }

    fn parse_expr(&mut self, token: Token) -> Result<Node, SyntaxError> {
        let node = match token.kind {
            TokenKind::OpenParen => return self.parse_call(token),
            TokenKind::CloseParen => {
                return Err(Self::error_at(&token, ParseErrorKind::UnmatchedCloseParen).into());
            }
            TokenKind::Symbol(name) => Node::Variable(name),
            TokenKind::Str(s) => Node::Literal(Literal::String(s)),
            TokenKind::Integer(i) => Node::Literal(Literal::Integer(i)),
            TokenKind::Double(x) => Node::Literal(Literal::Double(x)),
            TokenKind::Boolean(b) => Node::Literal(Literal::Boolean(b)),
        };
        Ok(node)
    }

    // `open` is the already-consumed '(' token; it anchors the error when the
    // matching ')' never arrives.
    fn parse_call(&mut self, open: Token) -> Result<Node, SyntaxError> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(Self::error_at(&open, ParseErrorKind::TooDeep(self.options.max_depth)).into());
        }

        let name = match self.next_token()? {
            None => return Err(Self::error_at(&open, ParseErrorKind::UnmatchedOpenParen).into()),
            Some(Token { kind: TokenKind::Symbol(name), .. }) => name,
            Some(other) => {
                return Err(Self::error_at(
                    &other,
                    ParseErrorKind::UnexpectedToken {
                        found: other.lexeme.clone(),
                        expected: "a function name",
                    },
                )
                .into());
            }
        };

        let mut args = Vec::new();
        loop {
            let closes = match self.peek_token()? {
                None => return Err(Self::error_at(&open, ParseErrorKind::UnmatchedOpenParen).into()),
                Some(token) => token.kind == TokenKind::CloseParen,
            };
            match self.next_token()? {
                Some(_) if closes => break,
                Some(token) => args.push(self.parse_expr(token)?),
                None => return Err(Self::error_at(&open, ParseErrorKind::UnmatchedOpenParen).into()),
            }
        }

        self.depth -= 1;
        Ok(Node::Call(name, args))
    }
}

/// Parses `input` into a single expression tree.
pub fn parse(input: &str) -> Result<Node, SyntaxError> {
    parse_with(input, &ParseOptions::default())
}

pub fn parse_with(input: &str, options: &ParseOptions) -> Result<Node, SyntaxError> {
    let node = Parser::with_options(input, *options).parse()?;
    tracing::debug!(depth = node.depth(), "parsed expression");
    Ok(node)
}
