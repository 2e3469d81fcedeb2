//! Execution error types of the in-memory backend.

use crate::access::DataType;
use crate::catalog::Field;
use thiserror::Error;

/// A filter literal that cannot be used against a column
#[derive(Error, Debug)]
pub enum LiteralError {
    #[error("'{literal}' is not a number")]
    NotANumber {
        literal: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("'{literal}' is not a date")]
    NotADate {
        literal: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("'{literal}' cannot be compared with a {expected:?} column")]
    Incompatible { literal: String, expected: DataType },
}

/// Errors raised while executing a query plan
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Could not translate filter on field '{field}'")]
    Translation {
        field: Field,
        #[source]
        source: LiteralError,
    },

    #[error("Column '{0}' must appear in the GROUP BY clause or be used in an aggregate function")]
    NotGrouped(Field),

    #[error("Function {function} cannot be applied to field '{field}' of type {data_type:?}")]
    InvalidAggregate {
        function: &'static str,
        field: Field,
        data_type: DataType,
    },
}

pub type ExecutionResult<T> = Result<T, ExecutionError>;
