//! Restricted arithmetic evaluation
//!
//! Accepts decimal literals, `+ - * / % **`, unary minus and parentheses.
//! The whole input is tokenized and parsed before anything is evaluated, so
//! any other token is rejected without side effects.

mod lexer;
mod parser;

use crate::error::CalcError;
use tracing::debug;

pub struct Calculator;

impl Calculator {
    pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
        let tokens = lexer::tokenize(expression)?;
        let ast = parser::parse(&tokens)?;
        let value = parser::eval(&ast)?;

        debug!("Evaluated {:?} = {}", expression, value);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> f64 {
        Calculator::evaluate(input).unwrap()
    }

    #[test]
    fn test_basic_arithmetic() {
        assert_eq!(eval("2+2"), 4.0);
        assert_eq!(eval("(12 * 3.5) / 7"), 6.0);
        assert_eq!(eval("1 + 2 * 3"), 7.0);
        assert_eq!(eval("(1 + 2) * 3"), 9.0);
        assert_eq!(eval("10 - 4 - 3"), 3.0);
        assert_eq!(eval("-3 + 5"), 2.0);
        assert_eq!(eval("--3"), 3.0);
    }

    #[test]
    fn test_power() {
        assert_eq!(eval("2 ** 10"), 1024.0);
        assert_eq!(eval("2 ** 3 ** 2"), 512.0);
        assert_eq!(eval("-2 ** 2"), -4.0);
        assert_eq!(eval("2 ** -1"), 0.5);
        assert_eq!(eval("(-2) ** 2"), 4.0);
    }

    #[test]
    fn test_modulo_is_floored() {
        assert_eq!(eval("7 % 3"), 1.0);
        assert_eq!(eval("-7 % 3"), 2.0);
        assert_eq!(eval("7 % -3"), -2.0);
        assert_eq!(eval("7.5 % 2"), 1.5);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(Calculator::evaluate("1/0"), Err(CalcError::DivisionByZero));
        assert_eq!(Calculator::evaluate("5 % 0"), Err(CalcError::DivisionByZero));
        assert_eq!(Calculator::evaluate("0 ** -1"), Err(CalcError::DivisionByZero));
        assert_eq!(Calculator::evaluate("1 / (2 - 2)"), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn test_code_injection_is_rejected() {
        for input in ["__import__('os')", "open('x').read()", "os.system('ls')", "1; 2", "[1]"] {
            assert!(matches!(
                Calculator::evaluate(input),
                Err(CalcError::InvalidExpression(_))
            ));
        }
    }

    #[test]
    fn test_long_operator_chains() {
        let input = vec!["2"; 100_000].join(" * 1 + ");
        assert_eq!(eval(&input), 200_000.0);
        assert_eq!(eval(&vec!["1"; 150_000].join("-")), -149_998.0);
    }

    #[test]
    fn test_non_finite_results() {
        assert_eq!(Calculator::evaluate("10 ** 400"), Err(CalcError::NonFinite));
        assert_eq!(Calculator::evaluate("(-8) ** 0.5"), Err(CalcError::NonFinite));
    }
}
