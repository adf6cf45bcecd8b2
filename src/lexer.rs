// src/lexer.rs

use std::fmt;

use crate::error::{LexError, Position};

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    OpenParen,
    CloseParen,
    Symbol(String),
    Str(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw source text of the token, quotes and escapes included.
    pub lexeme: String,
    pub position: Position,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            TokenKind::OpenParen => "open-paren",
            TokenKind::CloseParen => "close-paren",
            TokenKind::Symbol(_) => "symbol",
            TokenKind::Str(_) => "string",
            TokenKind::Integer(_) => "integer",
            TokenKind::Double(_) => "double",
            TokenKind::Boolean(_) => "boolean",
        };
        write!(f, "{} {:<11} {}", self.position, kind, self.lexeme)
    }
}

// --- The Lexer ---
// Walks the input lazily, one token per `next()`. Once an error has been
// yielded the lexer is exhausted.
#[derive(Debug, Clone)]
pub struct Lexer {
    input: Vec<char>,
    pos: usize,
    line: usize,
    col: usize,
    failed: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            failed: false,
        }
    }

    /// Rewinds to the start of the input.
    pub fn reset(&mut self) {
        self.pos = 0;
        self.line = 1;
        self.col = 1;
        self.failed = false;
    }

    fn current_char(&self) -> Option<char> { self.input.get(self.pos).copied() }

    fn here(&self) -> Position {
        Position { line: self.line, col: self.col }
    }

    fn advance(&mut self) {
        if let Some(c) = self.current_char() {
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
            self.pos += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        loop {
            while let Some(c) = self.current_char() {
                if c.is_whitespace() {
                    self.advance();
                } else {
                    break;
                }
            }

            // `;` comments run to the end of the line.
            if self.current_char() == Some(';') {
                while let Some(c) = self.current_char() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn is_delimiter(c: char) -> bool {
        c.is_whitespace() || c == '(' || c == ')' || c == '"' || c == ';'
    }

    fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        self.skip_whitespace();
        let start = self.here();
        let c = match self.current_char() {
            Some(c) => c,
            None => return Ok(None),
        };

        let token = match c {
            '(' => {
                self.advance();
                Token { kind: TokenKind::OpenParen, lexeme: "(".to_string(), position: start }
            }
            ')' => {
                self.advance();
                Token { kind: TokenKind::CloseParen, lexeme: ")".to_string(), position: start }
            }
            '"' => self.lex_string(start)?,
            c if c.is_control() => {
                return Err(LexError::UnexpectedChar { ch: c, position: start });
            }
            _ => self.lex_atom(start)?,
        };
        Ok(Some(token))
    }

    fn lex_string(&mut self, start: Position) -> Result<Token, LexError> {
        let begin = self.pos;
        self.advance(); // consume opening quote
        let mut value = String::new();
        loop {
            match self.current_char() {
                None => return Err(LexError::UnterminatedString { position: start }),
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    let escaped = match self.current_char() {
                        None => return Err(LexError::UnterminatedString { position: start }),
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some(other) => other,
                    };
                    value.push(escaped);
                    self.advance();
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token {
            kind: TokenKind::Str(value),
            lexeme: self.input[begin..self.pos].iter().collect(),
            position: start,
        })
    }

    // Reads a run of non-delimiter characters and classifies it as a boolean,
    // a number or a symbol.
    fn lex_atom(&mut self, start: Position) -> Result<Token, LexError> {
        let mut lexeme = String::new();
        while let Some(c) = self.current_char() {
            if Self::is_delimiter(c) {
                break;
            }
            if c.is_control() {
                return Err(LexError::UnexpectedChar { ch: c, position: self.here() });
            }
            lexeme.push(c);
            self.advance();
        }

        let kind = match lexeme.as_str() {
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            s if looks_numeric(s) => classify_number(s).ok_or_else(|| LexError::InvalidNumber {
                lexeme: lexeme.clone(),
                position: start,
            })?,
            s => TokenKind::Symbol(s.to_string()),
        };
        Ok(Token { kind, lexeme, position: start })
    }
}

impl Iterator for Lexer {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Lexer {}

/// A run is numeric when, after an optional sign, it starts with a digit or
/// with a `.` followed by a digit (`.5`, `-.5`).
fn looks_numeric(s: &str) -> bool {
    let unsigned = s.strip_prefix(&['-', '+'][..]).unwrap_or(s);
    let mut chars = unsigned.chars();
    match chars.next() {
        Some(c) if c.is_ascii_digit() => true,
        Some('.') => chars.next().map_or(false, |c| c.is_ascii_digit()),
        _ => false,
    }
}

fn classify_number(s: &str) -> Option<TokenKind> {
    let unsigned = s.strip_prefix(&['-', '+'][..]).unwrap_or(s);
    let mut seen_dot = false;
    let mut seen_exp = false;
    let mut prev = ' ';
    for c in unsigned.chars() {
        match c {
            '0'..='9' => {}
            '.' if !seen_dot && !seen_exp => seen_dot = true,
            'e' | 'E' if !seen_exp => seen_exp = true,
            '+' | '-' if prev == 'e' || prev == 'E' => {}
            _ => return None,
        }
        prev = c;
    }
    if seen_dot || seen_exp {
        // Out-of-range doubles would become inf, which has no literal syntax.
        s.parse::<f64>().ok().filter(|x| x.is_finite()).map(TokenKind::Double)
    } else {
        s.parse::<i64>().ok().map(TokenKind::Integer)
    }
}

/// Lexes the whole input eagerly.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).collect()
}
