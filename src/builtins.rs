// src/builtins.rs

use std::borrow::Cow;
use std::cmp::Ordering;

use paste::paste;

use crate::ast::Node;
use crate::error::EvalError;
use crate::literal::{Literal, LiteralType, Number, TypeExpectation};
use crate::registry::{Arity, FunctionDescriptor, Rule};

// --- Macro Template System ---

macro_rules! define_builtins {
    (
        // Functions over evaluated arguments with a hand-written rule
        strict: [$(($s_name:literal, $s_func:expr, $s_arity:expr)),* $(,)?],
        // Binary ordered comparisons, generated from an `Ordering` predicate
        comparison: [$(($c_name:literal, $c_ident:ident, $c_pred:expr)),* $(,)?],
        // Variadic boolean folds, generated from an identity and a combinator
        logical: [$(($l_name:literal, $l_ident:ident, $l_init:expr, $l_op:expr)),* $(,)?],
        // Functions that pick which argument nodes to evaluate
        lazy: [$(($z_name:literal, $z_func:expr, $z_arity:expr)),* $(,)?]
    ) => {
        paste! {
            $(
                fn [<builtin_ $c_ident>](name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
                    compare(name, args, $c_pred)
                }
            )*

            $(
                fn [<builtin_ $l_ident>](name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
                    fold_bool(name, args, $l_init, $l_op)
                }
            )*

            /// The built-in function set, keyed by symbol.
            pub static BUILTINS: phf::Map<&'static str, FunctionDescriptor> = phf::phf_map! {
                $( $s_name => FunctionDescriptor {
                    name: Cow::Borrowed($s_name),
                    arity: $s_arity,
                    rule: Rule::Strict($s_func),
                }, )*
                $( $c_name => FunctionDescriptor {
                    name: Cow::Borrowed($c_name),
                    arity: Arity::exactly(2),
                    rule: Rule::Strict([<builtin_ $c_ident>]),
                }, )*
                $( $l_name => FunctionDescriptor {
                    name: Cow::Borrowed($l_name),
                    arity: Arity::at_least(1),
                    rule: Rule::Strict([<builtin_ $l_ident>]),
                }, )*
                $( $z_name => FunctionDescriptor {
                    name: Cow::Borrowed($z_name),
                    arity: $z_arity,
                    rule: Rule::Lazy($z_func),
                }, )*
            };
        }
    };
}

/// Looks up a built-in without going through a registry.
pub fn builtin(name: &str) -> Option<&'static FunctionDescriptor> {
    BUILTINS.get(name)
}

pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains_key(name)
}

// --- Coercion Helpers ---

fn number(name: &str, lit: &Literal) -> Result<Number, EvalError> {
    lit.as_number()
        .ok_or_else(|| EvalError::type_mismatch(name, TypeExpectation::Numeric, lit.enclosed_type()))
}

fn boolean(name: &str, lit: &Literal) -> Result<bool, EvalError> {
    lit.as_bool()
        .ok_or_else(|| EvalError::type_mismatch(name, TypeExpectation::Exactly(LiteralType::Boolean), lit.enclosed_type()))
}

// Takes exactly N arguments; a host may re-register a rule under a wider arity.
fn fixed<'a, T, const N: usize>(name: &str, args: &'a [T]) -> Result<&'a [T; N], EvalError> {
    args.try_into()
        .map_err(|_| arity_error(name, Arity::exactly(N), args.len()))
}

fn arity_error(name: &str, expected: Arity, actual: usize) -> EvalError {
    EvalError::Arity { function: name.to_string(), expected, actual }
}

fn numbers(name: &str, args: &[Literal]) -> Result<Vec<Number>, EvalError> {
    args.iter().map(|lit| number(name, lit)).collect()
}

// Integer pairs stay integral unless the checked op overflows, in which case
// the result widens to Double. Any Double operand makes the result a Double.
fn combine(a: Number, b: Number, int_op: fn(i64, i64) -> Option<i64>, float_op: fn(f64, f64) -> f64) -> Number {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => match int_op(x, y) {
            Some(v) => Number::Int(v),
            None => Number::Float(float_op(x as f64, y as f64)),
        },
        _ => Number::Float(float_op(a.as_f64(), b.as_f64())),
    }
}

fn fold_numeric(
    name: &str,
    args: &[Literal],
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Literal, EvalError> {
    let nums = numbers(name, args)?;
    let mut iter = nums.into_iter();
    let first = match iter.next() {
        Some(n) => n,
        None => return Ok(Literal::Integer(0)),
    };
    Ok(iter.fold(first, |acc, n| combine(acc, n, int_op, float_op)).into())
}

fn render_all(args: &[Literal]) -> String {
    args.iter().map(Literal::to_display_string).collect()
}

// --- Arithmetic ---

// `+` concatenates when any argument is a string.
fn builtin_add(name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
    if args.iter().any(|lit| matches!(lit, Literal::String(_))) {
        return Ok(Literal::String(render_all(args)));
    }
    fold_numeric(name, args, i64::checked_add, |a, b| a + b)
}

// A single argument is negated.
fn builtin_sub(name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
    if let [only] = args {
        return Ok(match number(name, only)? {
            Number::Int(i) => i.checked_neg().map_or(Literal::Double(-(i as f64)), Literal::Integer),
            Number::Float(x) => Literal::Double(-x),
        });
    }
    fold_numeric(name, args, i64::checked_sub, |a, b| a - b)
}

fn builtin_mul(name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
    fold_numeric(name, args, i64::checked_mul, |a, b| a * b)
}

// Integer division truncates; an integer zero divisor is an error while
// Double division follows IEEE semantics.
fn builtin_div(name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
    let nums = numbers(name, args)?;
    let (mut acc, rest) = match nums.split_first() {
        Some((first, rest)) => (*first, rest),
        None => return Ok(Literal::Integer(0)),
    };
    for &n in rest {
        if let (Number::Int(_), Number::Int(0)) = (acc, n) {
            return Err(EvalError::DivisionByZero { function: name.to_string() });
        }
        acc = combine(acc, n, i64::checked_div, |a, b| a / b);
    }
    Ok(acc.into())
}

fn builtin_rem(name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
    let [a, b] = fixed::<_, 2>(name, args)?;
    let (a, b) = (number(name, a)?, number(name, b)?);
    if let (Number::Int(_), Number::Int(0)) = (a, b) {
        return Err(EvalError::DivisionByZero { function: name.to_string() });
    }
    Ok(combine(a, b, i64::checked_rem, |x, y| x % y).into())
}

// --- Comparison ---

fn compare(name: &str, args: &[Literal], pred: fn(Ordering) -> bool) -> Result<Literal, EvalError> {
    let [a, b] = fixed::<_, 2>(name, args)?;
    let ordering = match (a, b) {
        (Literal::String(a), Literal::String(b)) => Some(a.cmp(b)),
        (a, b) => match (a.as_number(), b.as_number()) {
            (Some(Number::Int(x)), Some(Number::Int(y))) => Some(x.cmp(&y)),
            (Some(x), Some(y)) => x.as_f64().partial_cmp(&y.as_f64()),
            (Some(_), None) => {
                return Err(EvalError::type_mismatch(name, TypeExpectation::Numeric, b.enclosed_type()));
            }
            (None, _) if matches!(a, Literal::String(_)) => {
                return Err(EvalError::type_mismatch(
                    name,
                    TypeExpectation::Exactly(LiteralType::String),
                    b.enclosed_type(),
                ));
            }
            (None, _) => {
                return Err(EvalError::type_mismatch(name, TypeExpectation::Comparable, a.enclosed_type()));
            }
        },
    };
    // NaN compares false against everything.
    Ok(Literal::Boolean(ordering.map_or(false, pred)))
}

/// Numbers compare by value across Integer and Double; everything else needs
/// matching types and values.
pub fn literals_equal(a: &Literal, b: &Literal) -> bool {
    match (a.as_number(), b.as_number()) {
        (Some(Number::Int(x)), Some(Number::Int(y))) => x == y,
        (Some(x), Some(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn builtin_eq(name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
    let [a, b] = fixed::<_, 2>(name, args)?;
    Ok(Literal::Boolean(literals_equal(a, b)))
}

fn builtin_ne(name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
    let [a, b] = fixed::<_, 2>(name, args)?;
    Ok(Literal::Boolean(!literals_equal(a, b)))
}

// --- Logic ---

fn fold_bool(name: &str, args: &[Literal], init: bool, op: fn(bool, bool) -> bool) -> Result<Literal, EvalError> {
    let mut acc = init;
    for arg in args {
        acc = op(acc, boolean(name, arg)?);
    }
    Ok(Literal::Boolean(acc))
}

fn builtin_not(name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
    let [value] = fixed::<_, 1>(name, args)?;
    Ok(Literal::Boolean(!boolean(name, value)?))
}

// --- Strings ---

fn builtin_concat(_name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
    Ok(Literal::String(render_all(args)))
}

// (join sep a b ...) renders each value and joins them with `sep`.
fn builtin_join(name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
    let (sep, values) = match args.split_first() {
        Some(split) => split,
        None => return Err(arity_error(name, Arity::at_least(1), 0)),
    };
    let sep = sep.as_str().ok_or_else(|| {
        EvalError::type_mismatch(name, TypeExpectation::Exactly(LiteralType::String), sep.enclosed_type())
    })?;
    let parts: Vec<String> = values.iter().map(Literal::to_display_string).collect();
    Ok(Literal::String(parts.join(sep)))
}

// --- Control ---

// (if cond then [else]); only the chosen branch is evaluated and a false
// condition without an else branch yields Void.
fn builtin_if(
    name: &str,
    args: &[Node],
    eval: &mut dyn FnMut(&Node) -> Result<Literal, EvalError>,
) -> Result<Literal, EvalError> {
    let (condition, then, otherwise) = match args {
        [condition, then] => (condition, then, None),
        [condition, then, otherwise] => (condition, then, Some(otherwise)),
        _ => return Err(arity_error(name, Arity::between(2, 3), args.len())),
    };
    let condition = eval(condition)?;
    if boolean(name, &condition)? {
        eval(then)
    } else {
        match otherwise {
            Some(otherwise) => eval(otherwise),
            None => Ok(Literal::Void),
        }
    }
}

// (cond c1 v1 c2 v2 ... [default]); conditions are tried in order and stop at
// the first true one. No match and no default yields Void.
fn builtin_cond(
    name: &str,
    args: &[Node],
    eval: &mut dyn FnMut(&Node) -> Result<Literal, EvalError>,
) -> Result<Literal, EvalError> {
    let mut clauses = args.chunks_exact(2);
    for clause in clauses.by_ref() {
        let condition = eval(&clause[0])?;
        if boolean(name, &condition)? {
            return eval(&clause[1]);
        }
    }
    match clauses.remainder() {
        [default] => eval(default),
        _ => Ok(Literal::Void),
    }
}

// --- The Registry Definition ---

define_builtins! {
    strict: [
        // name,     rule,            arity
        ("+",        builtin_add,     Arity::at_least(1)),
        ("-",        builtin_sub,     Arity::at_least(1)),
        ("*",        builtin_mul,     Arity::at_least(1)),
        ("/",        builtin_div,     Arity::at_least(2)),
        ("%",        builtin_rem,     Arity::exactly(2)),
        ("=",        builtin_eq,      Arity::exactly(2)),
        ("!=",       builtin_ne,      Arity::exactly(2)),
        ("not",      builtin_not,     Arity::exactly(1)),
        ("concat",   builtin_concat,  Arity::at_least(1)),
        ("cat",      builtin_concat,  Arity::at_least(1)),
        ("join",     builtin_join,    Arity::at_least(1)),
    ],
    comparison: [
        (">",  gt, Ordering::is_gt),
        ("<",  lt, Ordering::is_lt),
        (">=", ge, Ordering::is_ge),
        ("<=", le, Ordering::is_le),
    ],
    logical: [
        ("and", and, true,  |a, b| a && b),
        ("or",  or,  false, |a, b| a || b),
    ],
    lazy: [
        ("if",   builtin_if,   Arity::between(2, 3)),
        ("cond", builtin_cond, Arity::at_least(2)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Literal]) -> Result<Literal, EvalError> {
        match &builtin(name).unwrap().rule {
            Rule::Strict(f) => f(name, args),
            other => panic!("{} is not strict: {:?}", name, other),
        }
    }

    #[test]
    fn test_integer_arithmetic_stays_integral() {
        assert_eq!(call("+", &[1.into(), 2.into()]), Ok(Literal::Integer(3)));
        assert_eq!(call("-", &[10.into(), 4.into(), 1.into()]), Ok(Literal::Integer(5)));
        assert_eq!(call("*", &[6.into(), 7.into()]), Ok(Literal::Integer(42)));
        assert_eq!(call("/", &[7.into(), 2.into()]), Ok(Literal::Integer(3)));
        assert_eq!(call("%", &[7.into(), 3.into()]), Ok(Literal::Integer(1)));
    }

    #[test]
    fn test_mixed_arithmetic_widens() {
        assert_eq!(call("+", &[1.into(), 0.5.into()]), Ok(Literal::Double(1.5)));
        assert_eq!(call("/", &[7.into(), 2.0.into()]), Ok(Literal::Double(3.5)));
        assert_eq!(call("/", &[1.0.into(), 0.into()]), Ok(Literal::Double(f64::INFINITY)));
    }

    #[test]
    fn test_overflow_widens_to_double() {
        assert_eq!(
            call("+", &[Literal::Integer(i64::MAX), 1.into()]),
            Ok(Literal::Double(i64::MAX as f64 + 1.0))
        );
        assert_eq!(call("-", &[Literal::Integer(i64::MIN)]), Ok(Literal::Double(9.223372036854775808e18)));
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(call("-", &[5.into()]), Ok(Literal::Integer(-5)));
        assert_eq!(call("-", &[2.5.into()]), Ok(Literal::Double(-2.5)));
    }

    #[test]
    fn test_integer_division_by_zero() {
        assert_eq!(
            call("/", &[1.into(), 0.into()]),
            Err(EvalError::DivisionByZero { function: "/".to_string() })
        );
        assert_eq!(
            call("%", &[1.into(), 0.into()]),
            Err(EvalError::DivisionByZero { function: "%".to_string() })
        );
    }

    #[test]
    fn test_plus_concatenates_strings() {
        assert_eq!(
            call("+", &["bitrate=".into(), 128.into()]),
            Ok(Literal::string("bitrate=128"))
        );
    }

    #[test]
    fn test_arithmetic_rejects_booleans() {
        assert_eq!(
            call("*", &[2.into(), true.into()]),
            Err(EvalError::type_mismatch("*", TypeExpectation::Numeric, LiteralType::Boolean))
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(call(">", &[80.into(), 50.into()]), Ok(Literal::Boolean(true)));
        assert_eq!(call("<=", &[2.into(), 2.0.into()]), Ok(Literal::Boolean(true)));
        assert_eq!(call("<", &["abc".into(), "abd".into()]), Ok(Literal::Boolean(true)));
        assert_eq!(call(">=", &[f64::NAN.into(), 1.into()]), Ok(Literal::Boolean(false)));
    }

    #[test]
    fn test_comparison_type_errors() {
        assert_eq!(
            call(">", &[1.into(), "x".into()]),
            Err(EvalError::type_mismatch(">", TypeExpectation::Numeric, LiteralType::String))
        );
        assert_eq!(
            call(">", &["x".into(), 1.into()]),
            Err(EvalError::type_mismatch(">", TypeExpectation::Exactly(LiteralType::String), LiteralType::Integer))
        );
        assert_eq!(
            call("<", &[true.into(), 1.into()]),
            Err(EvalError::type_mismatch("<", TypeExpectation::Comparable, LiteralType::Boolean))
        );
    }

    #[test]
    fn test_equality() {
        assert_eq!(call("=", &[1.into(), 1.0.into()]), Ok(Literal::Boolean(true)));
        assert_eq!(call("=", &["a".into(), "a".into()]), Ok(Literal::Boolean(true)));
        assert_eq!(call("=", &["1".into(), 1.into()]), Ok(Literal::Boolean(false)));
        assert_eq!(call("!=", &[true.into(), false.into()]), Ok(Literal::Boolean(true)));
        assert_eq!(call("=", &[Literal::Void, Literal::Void]), Ok(Literal::Boolean(true)));
    }

    #[test]
    fn test_logic() {
        assert_eq!(call("and", &[true.into(), true.into(), false.into()]), Ok(Literal::Boolean(false)));
        assert_eq!(call("or", &[false.into(), true.into()]), Ok(Literal::Boolean(true)));
        assert_eq!(call("not", &[false.into()]), Ok(Literal::Boolean(true)));
        assert_eq!(
            call("and", &[true.into(), 1.into()]),
            Err(EvalError::type_mismatch("and", TypeExpectation::Exactly(LiteralType::Boolean), LiteralType::Integer))
        );
    }

    #[test]
    fn test_string_functions() {
        assert_eq!(
            call("concat", &["q=".into(), 0.5.into(), " ".into(), true.into(), Literal::Void]),
            Ok(Literal::string("q=0.5 truevoid"))
        );
        assert_eq!(
            call("join", &[" ! ".into(), "audioconvert".into(), "lame".into()]),
            Ok(Literal::string("audioconvert ! lame"))
        );
        assert_eq!(call("join", &[",".into()]), Ok(Literal::string("")));
        assert!(call("join", &[1.into(), "a".into()]).is_err());
    }

    #[test]
    fn test_rules_reject_unexpected_argument_counts() {
        assert_eq!(
            call("%", &[]),
            Err(EvalError::Arity { function: "%".to_string(), expected: Arity::exactly(2), actual: 0 })
        );
        assert_eq!(
            call(">", &[1.into()]),
            Err(EvalError::Arity { function: ">".to_string(), expected: Arity::exactly(2), actual: 1 })
        );
        assert!(matches!(call("=", &[1.into(), 1.into(), 1.into()]), Err(EvalError::Arity { actual: 3, .. })));
        assert!(matches!(call("not", &[]), Err(EvalError::Arity { actual: 0, .. })));
        assert_eq!(
            call("join", &[]),
            Err(EvalError::Arity { function: "join".to_string(), expected: Arity::at_least(1), actual: 0 })
        );
    }

    #[test]
    fn test_builtin_lookup() {
        assert!(is_builtin("cond"));
        assert!(!is_builtin("gstreamer-pipeline"));
        assert_eq!(builtin("if").unwrap().arity, Arity::between(2, 3));
        assert_eq!(builtin("cat").unwrap().name, "cat");
    }
}
