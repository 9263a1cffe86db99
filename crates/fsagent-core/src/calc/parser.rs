//! Recursive-descent parser and evaluator
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := term (("+" | "-") term)*
//! term    := unary (("*" | "/" | "%") unary)*
//! unary   := "-" unary | power
//! power   := primary ("**" unary)?
//! primary := NUMBER | "(" expr ")"
//! ```
//!
//! `**` binds tighter than a unary minus on its left and is right-associative,
//! so `-2 ** 2` is `-4` and `2 ** 3 ** 2` is `512`.
//!
//! Operator chains (`expr` and `term`) are kept flat and folded left to right,
//! so their length never adds stack depth. Only parentheses, unary minus and
//! `**` nest, and those are capped at `MAX_DEPTH`.

use super::lexer::Token;
use crate::error::CalcError;

const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(f64),
    Neg(Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    /// `first op1 rhs1 op2 rhs2 ...`, evaluated left to right
    Chain {
        first: Box<Expr>,
        rest: Vec<(BinaryOp, Expr)>,
    },
}

pub(crate) fn parse(tokens: &[Token]) -> Result<Expr, CalcError> {
    if tokens.is_empty() {
        return Err(CalcError::InvalidExpression("empty expression".to_string()));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.expr()?;

    if let Some(token) = parser.peek() {
        return Err(CalcError::InvalidExpression(format!(
            "unexpected {} after complete expression",
            describe(token)
        )));
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.peek();
        self.pos += 1;
        token
    }

    fn descend(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::InvalidExpression("expression is nested too deeply".to_string()));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<Expr, CalcError> {
        let first = self.term()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(chain(first, rest)),
            };
            self.bump();
            rest.push((op, self.term()?));
        }
    }

    fn term(&mut self) -> Result<Expr, CalcError> {
        let first = self.unary()?;
        let mut rest = Vec::new();
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::Percent) => BinaryOp::Rem,
                _ => return Ok(chain(first, rest)),
            };
            self.bump();
            rest.push((op, self.unary()?));
        }
    }

    fn unary(&mut self) -> Result<Expr, CalcError> {
        if self.peek() == Some(Token::Minus) {
            self.bump();
            self.descend()?;
            let operand = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Neg(Box::new(operand)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, CalcError> {
        let base = self.primary()?;
        if self.peek() == Some(Token::Power) {
            self.bump();
            self.descend()?;
            let exponent = self.unary()?;
            self.depth -= 1;
            return Ok(Expr::Pow(Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, CalcError> {
        match self.bump() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::LParen) => {
                self.descend()?;
                let inner = self.expr()?;
                self.depth -= 1;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    Some(other) => Err(CalcError::InvalidExpression(format!(
                        "expected ')' but found {}",
                        describe(other)
                    ))),
                    None => Err(CalcError::InvalidExpression("missing ')'".to_string())),
                }
            }
            Some(other) => Err(CalcError::InvalidExpression(format!(
                "expected a number or '(' but found {}",
                describe(other)
            ))),
            None => Err(CalcError::InvalidExpression("unexpected end of expression".to_string())),
        }
    }
}

fn chain(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    if rest.is_empty() {
        first
    } else {
        Expr::Chain {
            first: Box::new(first),
            rest,
        }
    }
}

fn describe(token: Token) -> String {
    match token {
        Token::Number(v) => format!("number {}", v),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Percent => "'%'".to_string(),
        Token::Power => "'**'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
    }
}

/// Evaluate a parsed expression
pub(crate) fn eval(expr: &Expr) -> Result<f64, CalcError> {
    let value = match expr {
        Expr::Number(v) => *v,
        Expr::Neg(inner) => -eval(inner)?,
        Expr::Pow(base, exponent) => {
            let (a, b) = (eval(base)?, eval(exponent)?);
            if a == 0.0 && b < 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            a.powf(b)
        }
        Expr::Chain { first, rest } => {
            let mut acc = eval(first)?;
            for (op, rhs) in rest {
                acc = finite(apply(*op, acc, eval(rhs)?)?)?;
            }
            acc
        }
    };

    finite(value)
}

fn apply(op: BinaryOp, a: f64, b: f64) -> Result<f64, CalcError> {
    Ok(match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            a / b
        }
        BinaryOp::Rem => {
            if b == 0.0 {
                return Err(CalcError::DivisionByZero);
            }
            // floored: the result takes the sign of the divisor
            let r = a % b;
            if r != 0.0 && (r < 0.0) != (b < 0.0) {
                r + b
            } else {
                r
            }
        }
    })
}

fn finite(value: f64) -> Result<f64, CalcError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse_str(input: &str) -> Result<Expr, CalcError> {
        parse(&tokenize(input)?)
    }

    fn num(v: f64) -> Expr {
        Expr::Number(v)
    }

    #[test]
    fn test_power_binds_tighter_than_negation() {
        let expr = parse_str("-2 ** 2").unwrap();
        assert_eq!(expr, Expr::Neg(Box::new(Expr::Pow(Box::new(num(2.0)), Box::new(num(2.0))))));
    }

    #[test]
    fn test_chains_are_flat() {
        let expr = parse_str("8 - 3 * 2 - 1").unwrap();
        assert_eq!(
            expr,
            chain(
                num(8.0),
                vec![
                    (BinaryOp::Sub, chain(num(3.0), vec![(BinaryOp::Mul, num(2.0))])),
                    (BinaryOp::Sub, num(1.0)),
                ]
            )
        );
        assert_eq!(eval(&expr).unwrap(), 1.0);
    }

    #[test]
    fn test_long_chains_do_not_nest() {
        let sum = vec!["1"; 200_000].join("+");
        assert_eq!(eval(&parse_str(&sum).unwrap()).unwrap(), 200_000.0);

        let product = vec!["1"; 200_000].join("*");
        assert_eq!(eval(&parse_str(&product).unwrap()).unwrap(), 1.0);
    }

    #[test]
    fn test_structural_errors() {
        for input in ["", "1 +", "(1 + 2", "1 + 2)", "* 3", "1 2", "1..2", "()", "+1"] {
            assert!(
                matches!(parse_str(input), Err(CalcError::InvalidExpression(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!("{}1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(matches!(parse_str(&deep), Err(CalcError::InvalidExpression(_))));

        let ok = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert!(parse_str(&ok).is_ok());
    }
}
