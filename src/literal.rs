// src/literal.rs

use std::fmt;
use std::str::FromStr;

use crate::ast::Node;
use crate::error::{ParseError, ParseErrorKind, SyntaxError};
use crate::parser::parse;

/// The static type tag every literal carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralType {
    Void,
    Double,
    Boolean,
    Integer,
    String,
}

impl fmt::Display for LiteralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LiteralType::Void => "void",
            LiteralType::Double => "double",
            LiteralType::Boolean => "boolean",
            LiteralType::Integer => "integer",
            LiteralType::String => "string",
        };
        f.write_str(name)
    }
}

/// What a function rule was willing to accept when it rejected an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeExpectation {
    Exactly(LiteralType),
    /// Integer or Double.
    Numeric,
    /// Integer, Double or String (ordered comparisons).
    Comparable,
}

impl fmt::Display for TypeExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpectation::Exactly(ty) => write!(f, "{}", ty),
            TypeExpectation::Numeric => f.write_str("number (integer or double)"),
            TypeExpectation::Comparable => f.write_str("number or string"),
        }
    }
}

/// An immutable, typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Void,
    Double(f64),
    Boolean(bool),
    Integer(i64),
    String(String),
}

/// Numeric view over Integer and Double literals used by the arithmetic and
/// comparison rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(x) => x,
        }
    }
}

impl From<Number> for Literal {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(i) => Literal::Integer(i),
            Number::Float(x) => Literal::Double(x),
        }
    }
}

impl Literal {
    pub fn void() -> Self { Literal::Void }
    pub fn double(value: f64) -> Self { Literal::Double(value) }
    pub fn boolean(value: bool) -> Self { Literal::Boolean(value) }
    pub fn integer(value: i64) -> Self { Literal::Integer(value) }
    pub fn string(value: impl Into<String>) -> Self { Literal::String(value.into()) }

    pub fn enclosed_type(&self) -> LiteralType {
        match self {
            Literal::Void => LiteralType::Void,
            Literal::Double(_) => LiteralType::Double,
            Literal::Boolean(_) => LiteralType::Boolean,
            Literal::Integer(_) => LiteralType::Integer,
            Literal::String(_) => LiteralType::String,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Literal::Void)
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Literal::Double(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Literal::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Literal::Integer(i) => Some(Number::Int(*i)),
            Literal::Double(x) => Some(Number::Float(*x)),
            _ => None,
        }
    }

    /// Canonical rendering: `true`/`false`, numbers, verbatim strings, `void`.
    pub fn to_display_string(&self) -> String {
        self.to_string()
    }

    /// A rendering the lexer reads back as an equal literal. Strings are quoted
    /// and escaped; Void has no literal syntax and renders as `void`.
    pub fn to_source(&self) -> String {
        match self {
            Literal::String(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for c in s.chars() {
                    match c {
                        '"' => out.push_str("\\\""),
                        '\\' => out.push_str("\\\\"),
                        '\n' => out.push_str("\\n"),
                        '\t' => out.push_str("\\t"),
                        '\r' => out.push_str("\\r"),
                        _ => out.push(c),
                    }
                }
                out.push('"');
                out
            }
            other => other.to_string(),
        }
    }
}

fn format_double(x: f64) -> String {
    if !x.is_finite() {
        return x.to_string();
    }
    let s = x.to_string();
    // Keep the decimal point so the text lexes back as a Double.
    if s.contains('.') { s } else { format!("{}.0", s) }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Void => f.write_str("void"),
            Literal::Double(x) => f.write_str(&format_double(*x)),
            Literal::Boolean(b) => f.write_str(if *b { "true" } else { "false" }),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::String(s) => f.write_str(s),
        }
    }
}

impl FromStr for Literal {
    type Err = SyntaxError;

    /// Reads exactly one literal token, e.g. `42`, `2.5`, `true` or `"x264enc"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse(s)? {
            Node::Literal(lit) => Ok(lit),
            other => Err(SyntaxError::Parse(ParseError {
                kind: ParseErrorKind::UnexpectedToken {
                    found: other.to_string(),
                    expected: "a literal",
                },
                line: 1,
                col: 1,
            })),
        }
    }
}

impl From<f64> for Literal {
    fn from(x: f64) -> Self { Literal::Double(x) }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self { Literal::Boolean(b) }
}

impl From<i64> for Literal {
    fn from(i: i64) -> Self { Literal::Integer(i) }
}

impl From<i32> for Literal {
    fn from(i: i32) -> Self { Literal::Integer(i64::from(i)) }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self { Literal::String(s.to_string()) }
}

impl From<String> for Literal {
    fn from(s: String) -> Self { Literal::String(s) }
}

impl From<()> for Literal {
    fn from(_: ()) -> Self { Literal::Void }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enclosed_type_matches_payload() {
        assert_eq!(Literal::void().enclosed_type(), LiteralType::Void);
        assert_eq!(Literal::double(1.5).enclosed_type(), LiteralType::Double);
        assert_eq!(Literal::boolean(true).enclosed_type(), LiteralType::Boolean);
        assert_eq!(Literal::integer(7).enclosed_type(), LiteralType::Integer);
        assert_eq!(Literal::string("x").enclosed_type(), LiteralType::String);
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(Literal::Void.to_display_string(), "void");
        assert_eq!(Literal::Boolean(false).to_display_string(), "false");
        assert_eq!(Literal::Integer(-12).to_display_string(), "-12");
        assert_eq!(Literal::Double(2.0).to_display_string(), "2.0");
        assert_eq!(Literal::Double(0.25).to_display_string(), "0.25");
        assert_eq!(Literal::Double(f64::INFINITY).to_display_string(), "inf");
        assert_eq!(Literal::string("lame ! mux").to_display_string(), "lame ! mux");
    }

    #[test]
    fn test_equality_requires_matching_types() {
        assert_eq!(Literal::Integer(3), Literal::Integer(3));
        assert_ne!(Literal::Integer(3), Literal::Double(3.0));
        assert_ne!(Literal::string("true"), Literal::Boolean(true));
        assert_eq!(Literal::Void, Literal::Void);
    }

    #[test]
    fn test_source_form_escapes_strings() {
        assert_eq!(Literal::string("say \"hi\"\n").to_source(), "\"say \\\"hi\\\"\\n\"");
        assert_eq!(Literal::Integer(5).to_source(), "5");
    }

    #[test]
    fn test_source_form_reads_back() {
        let samples = [
            Literal::Double(1e21),
            Literal::Double(-0.125),
            Literal::Double(3.0),
            Literal::Boolean(true),
            Literal::Integer(i64::MIN),
            Literal::string("a \\ b \"c\"\t"),
            Literal::string(""),
        ];
        for lit in samples {
            let back: Literal = lit.to_source().parse().unwrap();
            assert_eq!(back, lit);
        }
    }

    #[test]
    fn test_from_str_rejects_non_literals() {
        assert!("quality".parse::<Literal>().is_err());
        assert!("(+ 1 2)".parse::<Literal>().is_err());
        assert!("".parse::<Literal>().is_err());
    }

    #[test]
    fn test_numeric_view() {
        assert_eq!(Literal::Integer(4).as_number(), Some(Number::Int(4)));
        assert_eq!(Literal::Double(0.5).as_number(), Some(Number::Float(0.5)));
        assert_eq!(Literal::Boolean(true).as_number(), None);
        assert_eq!(Number::Int(3).as_f64(), 3.0);
    }
}
