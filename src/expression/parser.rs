//! Tokenizer and recursive-descent parser for custom expressions.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! additive       := multiplicative (("+" | "-") multiplicative)*
//! multiplicative := unary (("*" | "/" | "%") unary)*
//! unary          := ("+" | "-") unary | power
//! power          := primary ("^" unary)?
//! primary        := number | string | identifier | identifier "(" args ")" | "(" additive ")"
//! ```

use crate::expression::error::{ExpressionError, ExpressionResult};
use crate::expression::expr::Expression;
use crate::expression::operator::{BinaryOperator, Function, UnaryOperator};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Text(String),
    Operator(BinaryOperator),
    LeftParen,
    RightParen,
    Comma,
    Eof,
}

static EOF: Token = Token::Eof;

struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    /// Tokens paired with their starting positions
    fn tokenize(mut self) -> ExpressionResult<Vec<(Token, usize)>> {
        let mut tokens = Vec::new();
        loop {
            while self.current_char().map_or(false, char::is_whitespace) {
                self.advance();
            }
            let start = self.position;
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push((token, start));
            if done {
                return Ok(tokens);
            }
        }
    }

    fn next_token(&mut self) -> ExpressionResult<Token> {
        let ch = match self.current_char() {
            Some(ch) => ch,
            None => return Ok(Token::Eof),
        };

        if ch.is_ascii_digit() || ch == '.' {
            return self.read_number();
        }
        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(Token::Identifier(self.read_identifier()));
        }
        if ch == '"' {
            return self.read_string();
        }

        self.advance();
        match ch {
            '(' => Ok(Token::LeftParen),
            ')' => Ok(Token::RightParen),
            ',' => Ok(Token::Comma),
            _ => BinaryOperator::from_symbol(ch)
                .map(Token::Operator)
                .ok_or_else(|| ExpressionError::Syntax {
                    message: format!("unexpected character '{}'", ch),
                    position: self.position - 1,
                }),
        }
    }

    fn read_number(&mut self) -> ExpressionResult<Token> {
        let start = self.position;
        self.consume_digits();
        if self.current_char() == Some('.') {
            self.advance();
            self.consume_digits();
        }
        if matches!(self.current_char(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.current_char(), Some('+' | '-')) {
                self.advance();
            }
            self.consume_digits();
        }

        let text: String = self.input[start..self.position].iter().collect();
        text.parse::<f64>()
            .map(Token::Number)
            .map_err(|_| ExpressionError::Syntax {
                message: format!("invalid number '{}'", text),
                position: start,
            })
    }

    fn consume_digits(&mut self) {
        while self.current_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.position;
        while self
            .current_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        self.input[start..self.position].iter().collect()
    }

    fn read_string(&mut self) -> ExpressionResult<Token> {
        let start = self.position;
        self.advance(); // opening quote
        let mut text = String::new();
        loop {
            match self.current_char() {
                Some('"') => {
                    self.advance();
                    return Ok(Token::Text(text));
                }
                Some(ch) => {
                    text.push(ch);
                    self.advance();
                }
                None => {
                    return Err(ExpressionError::Syntax {
                        message: "unterminated string".to_string(),
                        position: start,
                    })
                }
            }
        }
    }
}

/// Deepest expression tree the parser builds. Parentheses, signs, operator
/// chains and function calls each add a level.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parser over a token stream
pub struct Parser {
    tokens: Vec<(Token, usize)>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(input: &str) -> ExpressionResult<Self> {
        Ok(Self {
            tokens: Lexer::new(input).tokenize()?,
            position: 0,
            depth: 0,
        })
    }

    fn current_token(&self) -> &Token {
        self.tokens.get(self.position).map_or(&EOF, |(t, _)| t)
    }

    fn current_position(&self) -> usize {
        self.tokens
            .get(self.position)
            .or_else(|| self.tokens.last())
            .map_or(0, |(_, p)| *p)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn descend(&mut self) -> ExpressionResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ExpressionError::Syntax {
                message: format!("expression nested deeper than {} levels", MAX_NESTING_DEPTH),
                position: self.current_position(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn match_operator(&mut self, candidates: &[BinaryOperator]) -> Option<BinaryOperator> {
        match self.current_token() {
            Token::Operator(op) if candidates.contains(op) => {
                let op = *op;
                self.advance();
                Some(op)
            }
            _ => None,
        }
    }

    fn expect_token(&mut self, expected: Token, description: &str) -> ExpressionResult<()> {
        if *self.current_token() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(description))
        }
    }

    fn unexpected(&self, expected: &str) -> ExpressionError {
        let found = match self.current_token() {
            Token::Eof => "end of input".to_string(),
            Token::Number(n) => format!("number {}", n),
            Token::Identifier(name) => format!("'{}'", name),
            Token::Text(text) => format!("string {:?}", text),
            Token::Operator(op) => format!("'{}'", op),
            Token::LeftParen => "'('".to_string(),
            Token::RightParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
        };
        ExpressionError::Syntax {
            message: format!("expected {}, found {}", expected, found),
            position: self.current_position(),
        }
    }

    /// Parse a complete expression
    pub fn parse(&mut self) -> ExpressionResult<Expression> {
        let expr = self.parse_additive()?;
        if *self.current_token() != Token::Eof {
            return Err(self.unexpected("operator or end of input"));
        }
        Ok(expr)
    }

    // Each operator in a chain deepens the left-leaning tree by one level
    fn parse_additive(&mut self) -> ExpressionResult<Expression> {
        let depth = self.depth;
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.match_operator(&[BinaryOperator::Add, BinaryOperator::Sub]) {
            self.descend()?;
            let right = self.parse_multiplicative()?;
            left = Expression::binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> ExpressionResult<Expression> {
        let depth = self.depth;
        let mut left = self.parse_unary()?;
        while let Some(op) = self.match_operator(&[
            BinaryOperator::Mul,
            BinaryOperator::Div,
            BinaryOperator::Mod,
        ]) {
            self.descend()?;
            let right = self.parse_unary()?;
            left = Expression::binary(op, left, right);
        }
        self.depth = depth;
        Ok(left)
    }

    fn parse_unary(&mut self) -> ExpressionResult<Expression> {
        let op = match self.match_operator(&[BinaryOperator::Add, BinaryOperator::Sub]) {
            Some(BinaryOperator::Sub) => UnaryOperator::Minus,
            Some(_) => UnaryOperator::Plus,
            None => return self.parse_power(),
        };
        let depth = self.depth;
        self.descend()?;
        let operand = self.parse_unary()?;
        self.depth = depth;
        Ok(Expression::unary(op, operand))
    }

    fn parse_power(&mut self) -> ExpressionResult<Expression> {
        let base = self.parse_primary()?;
        if self.match_operator(&[BinaryOperator::Pow]).is_some() {
            // Right-associative: the exponent may itself be a power
            let depth = self.depth;
            self.descend()?;
            let exponent = self.parse_unary()?;
            self.depth = depth;
            return Ok(Expression::binary(BinaryOperator::Pow, base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> ExpressionResult<Expression> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.advance();
                Ok(Expression::Number(n))
            }
            Token::Text(text) => {
                self.advance();
                Ok(Expression::Text(text))
            }
            Token::Identifier(name) => {
                self.advance();
                if *self.current_token() == Token::LeftParen {
                    self.parse_call(name)
                } else {
                    Ok(Expression::Variable(name))
                }
            }
            Token::LeftParen => {
                let depth = self.depth;
                self.descend()?;
                self.advance();
                let inner = self.parse_additive()?;
                self.expect_token(Token::RightParen, "')'")?;
                self.depth = depth;
                Ok(inner)
            }
            _ => Err(self.unexpected("a value")),
        }
    }

    fn parse_call(&mut self, name: String) -> ExpressionResult<Expression> {
        let function = Function::lookup(&name).ok_or(ExpressionError::UnknownFunction { name })?;
        self.expect_token(Token::LeftParen, "'('")?;
        let depth = self.depth;
        self.descend()?;

        let mut args = Vec::new();
        if *self.current_token() != Token::RightParen {
            args.push(self.parse_additive()?);
            while *self.current_token() == Token::Comma {
                self.advance();
                args.push(self.parse_additive()?);
            }
        }
        self.expect_token(Token::RightParen, "',' or ')'")?;
        self.depth = depth;

        if args.len() != function.arity() {
            return Err(ExpressionError::FunctionArgumentCount {
                function: function.name().to_string(),
                expected: function.arity(),
                actual: args.len(),
            });
        }
        Ok(Expression::FunctionCall { function, args })
    }
}

/// Parse expression text into an AST
pub fn parse(input: &str) -> ExpressionResult<Expression> {
    Parser::new(input)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(input: &str) -> String {
        parse(input).unwrap().to_string()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(shape("clicks/impressions"), "(clicks / impressions)");
        assert_eq!(shape("1 + 2 * 3"), "(1 + (2 * 3))");
        assert_eq!(shape("(1 + 2) * 3"), "((1 + 2) * 3)");
        assert_eq!(shape("10 - 4 - 3"), "((10 - 4) - 3)");
        assert_eq!(shape("7 % 4 / 2"), "((7 % 4) / 2)");
    }

    #[test]
    fn test_power_is_right_associative_and_binds_tighter_than_minus() {
        assert_eq!(shape("2^3^2"), "(2 ^ (3 ^ 2))");
        assert_eq!(shape("-2^2"), "-(2 ^ 2)");
        assert_eq!(shape("2^-1"), "(2 ^ -1)");
    }

    #[test]
    fn test_literals_and_calls() {
        assert_eq!(shape("1.5e3"), "1500");
        assert_eq!(shape(".5"), "0.5");
        assert_eq!(shape("campaign + \" (x)\""), "(campaign + \" (x)\")");
        assert_eq!(shape("max(sum_clicks, 2)"), "max(sum_clicks, 2)");
        assert_eq!(shape("round(avg_clicks * 100) / 100"), "(round((avg_clicks * 100)) / 100)");
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(
            parse("clicks +"),
            Err(ExpressionError::Syntax { position: 8, .. })
        ));
        assert!(matches!(
            parse("(clicks"),
            Err(ExpressionError::Syntax { .. })
        ));
        assert!(matches!(
            parse("clicks $ 2"),
            Err(ExpressionError::Syntax { position: 7, .. })
        ));
        assert!(matches!(
            parse("\"open"),
            Err(ExpressionError::Syntax { position: 0, .. })
        ));
        assert!(matches!(parse("1 2"), Err(ExpressionError::Syntax { .. })));
        assert!(matches!(parse(""), Err(ExpressionError::Syntax { .. })));
    }

    #[test]
    fn test_function_errors() {
        assert_eq!(
            parse("median(clicks)"),
            Err(ExpressionError::UnknownFunction {
                name: "median".to_string()
            })
        );
        assert_eq!(
            parse("sqrt(1, 2)"),
            Err(ExpressionError::FunctionArgumentCount {
                function: "sqrt".to_string(),
                expected: 1,
                actual: 2,
            })
        );
    }

    fn is_too_deep(result: ExpressionResult<Expression>) -> bool {
        matches!(
            result,
            Err(ExpressionError::Syntax { message, .. }) if message.contains("nested deeper")
        )
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let parens = |depth: usize| format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        assert_eq!(shape(&parens(MAX_NESTING_DEPTH)), "1");
        assert!(is_too_deep(parse(&parens(MAX_NESTING_DEPTH + 1))));

        assert!(is_too_deep(parse(&parens(10_000))));
        assert!(is_too_deep(parse(&"(".repeat(10_000))));
        assert!(is_too_deep(parse(&format!("{}1", "-".repeat(10_000)))));
        assert!(is_too_deep(parse(&vec!["2"; 10_000].join("^"))));
        assert!(is_too_deep(parse(&vec!["clicks"; 10_000].join(" + "))));
        assert!(is_too_deep(parse(&format!("{}1{}", "abs(".repeat(10_000), ")".repeat(10_000)))));
    }

    #[test]
    fn test_moderate_nesting_still_parses() {
        assert!(parse(&vec!["clicks"; 100].join(" + ")).is_ok());
        assert!(parse(&format!("{}clicks", "-".repeat(100))).is_ok());
        assert_eq!(shape("((clicks)) * (-(2))"), "(clicks * -2)");
    }
}
