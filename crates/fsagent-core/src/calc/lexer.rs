//! Tokenizer for arithmetic expressions

use crate::error::CalcError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Token {
    Number(f64),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    LParen,
    RParen,
}

/// Split an expression into tokens. Anything outside the arithmetic alphabet
/// (letters, quotes, underscores, dots not part of a number, ...) is rejected.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, CalcError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        let token = match c {
            c if c.is_whitespace() => continue,
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => {
                if chars.next_if(|&(_, next)| next == '*').is_some() {
                    Token::Power
                } else {
                    Token::Star
                }
            }
            '/' => Token::Slash,
            '%' => Token::Percent,
            '(' => Token::LParen,
            ')' => Token::RParen,
            c if c.is_ascii_digit() || c == '.' => {
                let mut end = pos + c.len_utf8();
                let mut seen_dot = c == '.';
                while let Some((next_pos, next)) =
                    chars.next_if(|&(_, n)| n.is_ascii_digit() || (n == '.' && !seen_dot))
                {
                    seen_dot |= next == '.';
                    end = next_pos + next.len_utf8();
                }

                let literal = &input[pos..end];
                if !literal.bytes().any(|b| b.is_ascii_digit()) {
                    return Err(CalcError::InvalidExpression(format!(
                        "malformed number {:?} at position {}",
                        literal, pos
                    )));
                }
                let value = literal.parse::<f64>().map_err(|_| {
                    CalcError::InvalidExpression(format!("malformed number {:?} at position {}", literal, pos))
                })?;
                Token::Number(value)
            }
            other => {
                return Err(CalcError::InvalidExpression(format!(
                    "unexpected character {:?} at position {}",
                    other, pos
                )))
            }
        };
        tokens.push(token);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_operators_and_numbers() {
        let tokens = tokenize("(12 * 3.5) ** 2 % .5").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::LParen,
                Token::Number(12.0),
                Token::Star,
                Token::Number(3.5),
                Token::RParen,
                Token::Power,
                Token::Number(2.0),
                Token::Percent,
                Token::Number(0.5),
            ]
        );
    }

    #[test]
    fn test_rejects_identifiers_and_strings() {
        for input in ["__import__('os')", "abs(1)", "x + 1", "1e3", "1 , 2", "."] {
            assert!(
                matches!(tokenize(input), Err(CalcError::InvalidExpression(_))),
                "{input} should be rejected"
            );
        }
    }
}
