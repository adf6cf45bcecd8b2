// src/lib.rs

// --- Module Declarations ---
pub mod ast;
pub mod builtins;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod registry;

// --- Public API Re-exports ---
pub use ast::Node;
pub use error::{Error, EvalError, LexError, ParseError, ParseErrorKind, Position, SyntaxError};
pub use evaluator::{eval_str, evaluate, Context};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use literal::{Literal, LiteralType, TypeExpectation};
pub use parser::{parse, parse_with, ParseOptions};
pub use registry::{Arity, FunctionDescriptor, FunctionRegistry, Rule};
