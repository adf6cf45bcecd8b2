// src/error.rs

use std::fmt;

use thiserror::Error;

use crate::literal::{LiteralType, TypeExpectation};
use crate::registry::Arity;

/// A 1-based line/column location in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("Unexpected character {ch:?} at {position}")]
    UnexpectedChar { ch: char, position: Position },
    #[error("Unterminated string literal starting at {position}")]
    UnterminatedString { position: Position },
    #[error("Invalid number '{lexeme}' at {position}")]
    InvalidNumber { lexeme: String, position: Position },
}

impl LexError {
    pub fn position(&self) -> Position {
        match self {
            LexError::UnexpectedChar { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::InvalidNumber { position, .. } => *position,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parse error at {line}:{col}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
    pub col: usize,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    #[error("Empty input")]
    EmptyInput,
    #[error("Unexpected token '{found}', expected {expected}")]
    UnexpectedToken { found: String, expected: &'static str },
    #[error("Unmatched '(' (missing ')')")]
    UnmatchedOpenParen,
    #[error("Unmatched ')'")]
    UnmatchedCloseParen,
    #[error("Expression nested deeper than {0} levels")]
    TooDeep(usize),
}

/// Everything that can go wrong turning text into a tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unbound variable: '{0}'")]
    UnboundVariable(String),
    #[error("Unknown function: '{0}'")]
    UnknownFunction(String),
    #[error("'{function}' expects {expected} argument(s), got {actual}")]
    Arity {
        function: String,
        expected: Arity,
        actual: usize,
    },
    #[error("'{function}' expects {expected}, got {actual}")]
    TypeMismatch {
        function: String,
        expected: TypeExpectation,
        actual: LiteralType,
    },
    #[error("'{function}' divided by zero")]
    DivisionByZero { function: String },
}

impl EvalError {
    pub fn type_mismatch(function: &str, expected: TypeExpectation, actual: LiteralType) -> Self {
        EvalError::TypeMismatch {
            function: function.to_string(),
            expected,
            actual,
        }
    }
}

/// Combined error for the parse-then-evaluate convenience entry point.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Syntax(SyntaxError::Lex(e))
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Syntax(SyntaxError::Parse(e))
    }
}
