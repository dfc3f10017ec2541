use super::{EvalError, Number};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Number(Number),
    Ident(String),
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    LParen,
    RParen,
    Comma,
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, EvalError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        let c = chars[pos];
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                pos += 1;
            }
            '0'..='9' | '.' => {
                let (number, next) = lex_number(&chars, pos)?;
                tokens.push(Token::Number(number));
                pos = next;
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = pos;
                while pos < chars.len() && (chars[pos].is_ascii_alphanumeric() || chars[pos] == '_')
                {
                    pos += 1;
                }
                tokens.push(Token::Ident(chars[start..pos].iter().collect()));
            }
            '*' => {
                if chars.get(pos + 1) == Some(&'*') {
                    tokens.push(Token::DoubleStar);
                    pos += 2;
                } else {
                    tokens.push(Token::Star);
                    pos += 1;
                }
            }
            '/' => {
                if chars.get(pos + 1) == Some(&'/') {
                    tokens.push(Token::DoubleSlash);
                    pos += 2;
                } else {
                    tokens.push(Token::Slash);
                    pos += 1;
                }
            }
            '+' => {
                tokens.push(Token::Plus);
                pos += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                pos += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                pos += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                pos += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                pos += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                pos += 1;
            }
            other => {
                return Err(EvalError::Syntax(format!(
                    "unexpected character '{}'",
                    other
                )));
            }
        }
    }

    Ok(tokens)
}

fn lex_number(chars: &[char], start: usize) -> Result<(Number, usize), EvalError> {
    let mut pos = start;
    let mut is_float = false;

    while pos < chars.len() && chars[pos].is_ascii_digit() {
        pos += 1;
    }

    if pos < chars.len() && chars[pos] == '.' {
        is_float = true;
        pos += 1;
        while pos < chars.len() && chars[pos].is_ascii_digit() {
            pos += 1;
        }
    }

    // exponent suffix, only when followed by digits
    if pos < chars.len() && (chars[pos] == 'e' || chars[pos] == 'E') {
        let mut lookahead = pos + 1;
        if lookahead < chars.len() && (chars[lookahead] == '+' || chars[lookahead] == '-') {
            lookahead += 1;
        }
        if lookahead < chars.len() && chars[lookahead].is_ascii_digit() {
            is_float = true;
            pos = lookahead;
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
        }
    }

    let literal: String = chars[start..pos].iter().collect();
    if literal == "." {
        return Err(EvalError::Syntax("unexpected character '.'".to_string()));
    }

    if pos < chars.len() && (chars[pos].is_ascii_alphabetic() || chars[pos] == '_') {
        return Err(EvalError::Syntax(format!(
            "invalid number literal '{}{}'",
            literal, chars[pos]
        )));
    }

    let number = if is_float {
        Number::Float(
            literal
                .parse::<f64>()
                .map_err(|_| EvalError::Syntax(format!("invalid number literal '{}'", literal)))?,
        )
    } else {
        match literal.parse::<i64>() {
            Ok(value) => Number::Int(value),
            Err(_) => Number::Float(literal.parse::<f64>().map_err(|_| {
                EvalError::Syntax(format!("invalid number literal '{}'", literal))
            })?),
        }
    };

    Ok((number, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_operators_and_numbers() {
        let tokens = tokenize("2 ** 3 // 4.5").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Number(Number::Int(2)),
                Token::DoubleStar,
                Token::Number(Number::Int(3)),
                Token::DoubleSlash,
                Token::Number(Number::Float(4.5)),
            ]
        );
    }

    #[test]
    fn reads_leading_dot_and_exponent_literals() {
        assert_eq!(tokenize(".5").unwrap(), vec![Token::Number(Number::Float(0.5))]);
        assert_eq!(
            tokenize("1e3").unwrap(),
            vec![Token::Number(Number::Float(1000.0))]
        );
    }

    #[test]
    fn identifiers_and_calls() {
        let tokens = tokenize("sqrt(pi)").unwrap();
        assert_eq!(tokens[0], Token::Ident("sqrt".to_string()));
        assert_eq!(tokens[1], Token::LParen);
        assert_eq!(tokens[2], Token::Ident("pi".to_string()));
    }

    #[test]
    fn rejects_stray_characters() {
        assert!(matches!(tokenize("2 & 3"), Err(EvalError::Syntax(_))));
        assert!(matches!(tokenize("__import__.x"), Err(EvalError::Syntax(_))));
        assert!(matches!(tokenize("12abc"), Err(EvalError::Syntax(_))));
    }
}
