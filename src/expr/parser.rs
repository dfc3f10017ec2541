use super::{lexer::Token, EvalError, Number};

const MAX_DEPTH: usize = 64;
/// Bounds the height of left-leaning operator chains such as `1+1+...+1`
const MAX_OPERATORS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Plus,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Number(Number),
    Name(String),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

pub(crate) fn parse(tokens: &[Token]) -> Result<Expr, EvalError> {
    if tokens.is_empty() {
        return Err(EvalError::Syntax("empty expression".to_string()));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
        operators: 0,
    };
    let expr = parser.expression()?;

    match parser.peek() {
        None => Ok(expr),
        Some(token) => Err(EvalError::Syntax(format!(
            "unexpected token {}",
            describe(token)
        ))),
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    operators: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn enter(&mut self) -> Result<(), EvalError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(EvalError::Syntax("expression nested too deeply".to_string()));
        }
        Ok(())
    }

    fn count_operator(&mut self) -> Result<(), EvalError> {
        self.operators += 1;
        if self.operators > MAX_OPERATORS {
            return Err(EvalError::Syntax("expression too long".to_string()));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn expression(&mut self) -> Result<Expr, EvalError> {
        self.enter()?;
        let mut left = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => break,
            };
            self.count_operator()?;
            self.pos += 1;
            let right = self.term()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        self.leave();
        Ok(left)
    }

    fn term(&mut self) -> Result<Expr, EvalError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                Some(Token::DoubleSlash) => BinaryOp::FloorDiv,
                Some(Token::Percent) => BinaryOp::Mod,
                _ => break,
            };
            self.count_operator()?;
            self.pos += 1;
            let right = self.unary()?;
            left = Expr::Binary(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, EvalError> {
        let op = match self.peek() {
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Minus) => UnaryOp::Neg,
            _ => return self.power(),
        };
        self.pos += 1;
        self.enter()?;
        let operand = self.unary()?;
        self.leave();
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    // `**` binds tighter than a unary minus on its left and is right associative
    fn power(&mut self) -> Result<Expr, EvalError> {
        let base = self.atom()?;
        if self.eat(&Token::DoubleStar) {
            self.count_operator()?;
            self.enter()?;
            let exponent = self.unary()?;
            self.leave();
            return Ok(Expr::Binary(
                BinaryOp::Pow,
                Box::new(base),
                Box::new(exponent),
            ));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, EvalError> {
        match self.advance() {
            Some(Token::Number(number)) => Ok(Expr::Number(*number)),
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let args = self.arguments()?;
                    Ok(Expr::Call(name.clone(), args))
                } else {
                    Ok(Expr::Name(name.clone()))
                }
            }
            Some(Token::LParen) => {
                let inner = self.expression()?;
                if !self.eat(&Token::RParen) {
                    return Err(EvalError::Syntax("'(' was never closed".to_string()));
                }
                Ok(inner)
            }
            Some(token) => Err(EvalError::Syntax(format!(
                "unexpected token {}",
                describe(token)
            ))),
            None => Err(EvalError::Syntax("unexpected end of expression".to_string())),
        }
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, EvalError> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expression()?);
            if self.eat(&Token::Comma) {
                continue;
            }
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            return match self.peek() {
                Some(token) => Err(EvalError::Syntax(format!(
                    "unexpected token {} in argument list",
                    describe(token)
                ))),
                None => Err(EvalError::Syntax("'(' was never closed".to_string())),
            };
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(number) => format!("'{}'", number),
        Token::Ident(name) => format!("'{}'", name),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::DoubleStar => "'**'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::DoubleSlash => "'//'".to_string(),
        Token::Percent => "'%'".to_string(),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Comma => "','".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse_str(input: &str) -> Result<Expr, EvalError> {
        parse(&tokenize(input)?)
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let expr = parse_str("1 + 2 * 3").unwrap();
        match expr {
            Expr::Binary(BinaryOp::Add, _, right) => {
                assert!(matches!(*right, Expr::Binary(BinaryOp::Mul, _, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn power_is_right_associative_and_beats_unary_minus() {
        let expr = parse_str("-2 ** 3 ** 2").unwrap();
        match expr {
            Expr::Unary(UnaryOp::Neg, inner) => match *inner {
                Expr::Binary(BinaryOp::Pow, _, exponent) => {
                    assert!(matches!(*exponent, Expr::Binary(BinaryOp::Pow, _, _)));
                }
                other => panic!("unexpected tree: {:?}", other),
            },
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn parses_calls_with_arguments() {
        let expr = parse_str("max(1, 2, 3)").unwrap();
        assert!(matches!(expr, Expr::Call(ref name, ref args) if name == "max" && args.len() == 3));
        assert!(matches!(parse_str("pi").unwrap(), Expr::Name(_)));
    }

    #[test]
    fn reports_malformed_input() {
        assert!(parse_str("").is_err());
        assert!(parse_str("(1 + 2").is_err());
        assert!(parse_str("1 +").is_err());
        assert!(parse_str("2 3").is_err());
        assert!(parse_str("max(1 2)").is_err());
    }

    #[test]
    fn rejects_pathological_nesting() {
        let input = format!("{}1{}", "(".repeat(200), ")".repeat(200));
        assert!(matches!(
            parse_str(&input),
            Err(EvalError::Syntax(message)) if message.contains("nested")
        ));
    }

    #[test]
    fn rejects_flat_chains_past_the_operator_limit() {
        let input = format!("{}1", "1+".repeat(100_000));
        assert!(matches!(
            parse_str(&input),
            Err(EvalError::Syntax(message)) if message == "expression too long"
        ));

        let input = format!("{}1", "1*".repeat(MAX_OPERATORS));
        assert!(parse_str(&input).is_ok());
    }
}
