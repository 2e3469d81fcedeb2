// Filter parser - converts filter tokens into a predicate tree
//
// Grammar:
//   or         := and ((',' | "or") and)*
//   and        := constraint ((';' | "and") constraint)*
//   constraint := '(' or ')' | comparison
//   comparison := selector comparator arguments
//   arguments  := '(' value (',' value)* ')' | value

use super::error::{FilterError, FilterResult, SyntaxError};
use super::lexer::Lexer;
use super::predicate::{ComparisonOperator, Literal, Predicate};
use super::token::Token;
use crate::catalog;

static EOF: Token = Token::Eof;

/// Deepest parenthesised group accepted before parsing gives up
pub const MAX_NESTING_DEPTH: usize = 128;

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    depth: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            position: 0,
            depth: 0,
        }
    }

    /// Parse the whole token stream into a single predicate
    pub fn parse(&mut self) -> Result<Predicate, SyntaxError> {
        let predicate = self.parse_or()?;
        if self.current_token() != &Token::Eof {
            return Err(self.unexpected("a logical operator or end of input"));
        }
        Ok(predicate)
    }

    fn parse_or(&mut self) -> Result<Predicate, SyntaxError> {
        let mut children = vec![self.parse_and()?];
        while self.current_token().is_or() {
            self.advance();
            children.push(self.parse_and()?);
        }
        Ok(collapse(children, Predicate::Or))
    }

    fn parse_and(&mut self) -> Result<Predicate, SyntaxError> {
        let mut children = vec![self.parse_constraint()?];
        while self.current_token().is_and() {
            self.advance();
            children.push(self.parse_constraint()?);
        }
        Ok(collapse(children, Predicate::And))
    }

    fn parse_constraint(&mut self) -> Result<Predicate, SyntaxError> {
        if self.match_token(&Token::LeftParen) {
            if self.depth >= MAX_NESTING_DEPTH {
                return Err(SyntaxError::TooDeep {
                    limit: MAX_NESTING_DEPTH,
                });
            }
            self.advance();
            self.depth += 1;
            let inner = self.parse_or()?;
            self.depth -= 1;
            self.expect_token(Token::RightParen)?;
            return Ok(inner);
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Predicate, SyntaxError> {
        let field = match self.current_token().clone() {
            Token::Word(name) if !name.is_empty() => catalog::resolve(&name)?,
            _ => return Err(self.unexpected("a field name")),
        };
        self.advance();

        let symbol = match self.current_token().clone() {
            Token::Comparator(symbol) => symbol,
            _ => return Err(self.unexpected("a comparison operator")),
        };
        self.advance();

        let (operator, negated) = match symbol.as_str() {
            "=out=" => (ComparisonOperator::In, true),
            other => match ComparisonOperator::from_symbol(other) {
                Some(op) => (op, false),
                None => return Err(SyntaxError::UnknownOperator { operator: symbol }),
            },
        };

        let arguments = self.parse_arguments()?;
        if !operator.is_multi_value() && arguments.len() != 1 {
            return Err(SyntaxError::TooManyArguments {
                operator: symbol,
                count: arguments.len(),
            });
        }

        let comparison = Predicate::comparison(field, operator, arguments);
        Ok(if negated {
            Predicate::negate(comparison)
        } else {
            comparison
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<Literal>, SyntaxError> {
        if !self.match_token(&Token::LeftParen) {
            return Ok(vec![self.parse_value()?]);
        }
        self.advance();

        let mut values = vec![self.parse_value()?];
        while self.match_token(&Token::Comma) {
            self.advance();
            values.push(self.parse_value()?);
        }
        self.expect_token(Token::RightParen)?;
        Ok(values)
    }

    fn parse_value(&mut self) -> Result<Literal, SyntaxError> {
        let literal = match self.current_token() {
            Token::Quoted(text) => Literal::Text(text.clone()),
            Token::Word(word) if !word.is_empty() => Literal::bare(word.as_str()),
            _ => return Err(self.unexpected("a value")),
        };
        self.advance();
        Ok(literal)
    }

    fn current_token(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&EOF)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn match_token(&self, token: &Token) -> bool {
        self.current_token() == token
    }

    fn expect_token(&mut self, expected: Token) -> Result<(), SyntaxError> {
        if self.match_token(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&expected.describe()))
        }
    }

    fn unexpected(&self, expected: &str) -> SyntaxError {
        SyntaxError::UnexpectedToken {
            expected: expected.to_string(),
            found: self.current_token().describe(),
        }
    }
}

fn collapse(mut children: Vec<Predicate>, combine: fn(Vec<Predicate>) -> Predicate) -> Predicate {
    if children.len() == 1 {
        children.remove(0)
    } else {
        combine(children)
    }
}

/// Parse a filter expression into a predicate tree
pub fn parse(text: &str) -> FilterResult<Predicate> {
    let tokens = Lexer::new(text)
        .tokenize()
        .map_err(|cause| FilterError::new(text, cause))?;
    Parser::new(tokens)
        .parse()
        .map_err(|cause| FilterError::new(text, cause))
}
