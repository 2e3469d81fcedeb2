//! Filter parsing error types.

use crate::catalog::UnknownFieldError;
use thiserror::Error;

/// Low-level reasons a filter string is rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("unterminated quoted value starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("unknown comparison operator '{operator}'")]
    UnknownOperator { operator: String },

    #[error("expected {expected} but found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("operator '{operator}' takes a single argument, got {count}")]
    TooManyArguments { operator: String, count: usize },

    #[error("unknown selector: {0}")]
    UnknownSelector(#[from] UnknownFieldError),

    #[error("groups nested deeper than {limit} levels")]
    TooDeep { limit: usize },
}

/// A filter expression that could not be parsed, with the underlying cause
#[derive(Error, Debug, Clone, PartialEq)]
#[error("cannot parse '{input}': {cause}")]
pub struct FilterError {
    pub input: String,
    #[source]
    pub cause: SyntaxError,
}

impl FilterError {
    pub fn new(input: impl Into<String>, cause: SyntaxError) -> Self {
        Self {
            input: input.into(),
            cause,
        }
    }
}

pub type FilterResult<T> = Result<T, FilterError>;
