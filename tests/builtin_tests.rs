// tests/builtin_tests.rs

use rstest::rstest;
use sexp_engine::{Arity, EvalError, Literal, LiteralType, TypeExpectation};
use test_utils::*;

#[rstest]
#[case("(+ 1 2)", Literal::Integer(3))]
#[case("(+ 1 2 3 4)", Literal::Integer(10))]
#[case("(+ 7)", Literal::Integer(7))]
#[case("(- 10 3)", Literal::Integer(7))]
#[case("(- 3)", Literal::Integer(-3))]
#[case("(* 2 3 4)", Literal::Integer(24))]
#[case("(/ 20 2 5)", Literal::Integer(2))]
#[case("(/ -7 2)", Literal::Integer(-3))]
#[case("(% 17 5)", Literal::Integer(2))]
#[case("(+ 0.5 0.25)", Literal::Double(0.75))]
#[case("(* 2 1.5)", Literal::Double(3.0))]
#[case("(/ 5.0 2)", Literal::Double(2.5))]
#[case("(% 5.5 2)", Literal::Double(1.5))]
fn arithmetic(#[case] input: &str, #[case] expected: Literal) {
    assert_eq!(eval_ok(input), expected);
}

#[rstest]
#[case("(> 2 1)", true)]
#[case("(> 1 2)", false)]
#[case("(< 1 1.5)", true)]
#[case("(>= 2 2.0)", true)]
#[case("(<= 3 2)", false)]
#[case("(< \"aac\" \"mp3\")", true)]
#[case("(= 2 2.0)", true)]
#[case("(= \"ogg\" \"ogg\")", true)]
#[case("(= true false)", false)]
#[case("(= 1 \"1\")", false)]
#[case("(!= 1 2)", true)]
#[case("(and true true)", true)]
#[case("(and true false true)", false)]
#[case("(or false false)", false)]
#[case("(or false true)", true)]
#[case("(not true)", false)]
fn predicates(#[case] input: &str, #[case] expected: bool) {
    assert_eq!(eval_ok(input), Literal::Boolean(expected));
}

#[rstest]
#[case("(concat \"a\" \"b\" \"c\")", "abc")]
#[case("(cat \"vbr=\" true)", "vbr=true")]
#[case("(concat \"q\" 2.0)", "q2.0")]
#[case("(+ \"lame \" \"-V \" 2)", "lame -V 2")]
#[case("(join \",\" 1 2 3)", "1,2,3")]
#[case("(join \" ! \" \"a\")", "a")]
fn strings(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(eval_ok(input), Literal::string(expected));
}

#[rstest]
#[case("(not)", "not", Arity::exactly(1), 0)]
#[case("(not true false)", "not", Arity::exactly(1), 2)]
#[case("(> 1 2 3)", ">", Arity::exactly(2), 3)]
#[case("(if true)", "if", Arity::between(2, 3), 1)]
#[case("(if true 1 2 3)", "if", Arity::between(2, 3), 4)]
#[case("(/ 1)", "/", Arity::at_least(2), 1)]
#[case("(concat)", "concat", Arity::at_least(1), 0)]
fn arity_errors(#[case] input: &str, #[case] function: &str, #[case] expected: Arity, #[case] actual: usize) {
    assert_eq!(
        eval_err(input),
        EvalError::Arity { function: function.to_string(), expected, actual }
    );
}

#[rstest]
#[case("(+ 1 true)", "+", TypeExpectation::Numeric, LiteralType::Boolean)]
#[case("(- \"a\")", "-", TypeExpectation::Numeric, LiteralType::String)]
#[case("(not 1)", "not", TypeExpectation::Exactly(LiteralType::Boolean), LiteralType::Integer)]
#[case("(or false \"yes\")", "or", TypeExpectation::Exactly(LiteralType::Boolean), LiteralType::String)]
#[case("(< 1 \"2\")", "<", TypeExpectation::Numeric, LiteralType::String)]
#[case("(join 1 2)", "join", TypeExpectation::Exactly(LiteralType::String), LiteralType::Integer)]
#[case("(cond 1 2)", "cond", TypeExpectation::Exactly(LiteralType::Boolean), LiteralType::Integer)]
fn type_mismatches(
    #[case] input: &str,
    #[case] function: &str,
    #[case] expected: TypeExpectation,
    #[case] actual: LiteralType,
) {
    assert_eq!(
        eval_err(input),
        EvalError::TypeMismatch { function: function.to_string(), expected, actual }
    );
}

#[test]
fn test_arity_error_ignores_argument_types() {
    // 2-arity function called with 3 mistyped arguments
    assert!(matches!(eval_err("(> \"a\" true 1.5)"), EvalError::Arity { actual: 3, .. }));
    assert!(matches!(eval_err("(= (missing) 1 2)"), EvalError::Arity { actual: 3, .. }));
}

#[test]
fn test_integer_division_by_zero() {
    assert_eq!(eval_err("(/ 4 0)"), EvalError::DivisionByZero { function: "/".to_string() });
    assert_eq!(eval_err("(% 4 0)"), EvalError::DivisionByZero { function: "%".to_string() });
    assert_eq!(eval_ok("(/ 4 0.0)"), Literal::Double(f64::INFINITY));
}

#[test]
fn test_integer_overflow_widens() {
    let result = eval_ok("(* 9223372036854775807 2)");
    assert_eq!(result.enclosed_type(), LiteralType::Double);
}
