//! Errors surfaced by the query pipeline.

use crate::catalog::UnknownFieldError;
use crate::filter::FilterError;
use std::error::Error;
use thiserror::Error;

/// Number of nested causes included in an execution error message
const EXECUTION_CAUSE_DEPTH: usize = 2;

/// Every request-level failure of the query pipeline.
///
/// All of these are client errors: rebuilding the same specification can
/// only fail the same way.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    UnknownField(#[from] UnknownFieldError),

    #[error("You have to specify at least one selection")]
    EmptySelection,

    #[error("Filter expression invalid: {0}")]
    InvalidFilter(#[source] FilterError),

    #[error("There are errors in query. Details: {0}")]
    QueryExecution(String),

    #[error("Result row has {actual} values but {expected} columns were projected")]
    AliasMismatch { expected: usize, actual: usize },
}

impl QueryError {
    /// Wrap a backend failure, keeping the messages of up to two nested causes
    pub fn execution(err: &(dyn Error + 'static)) -> Self {
        QueryError::QueryExecution(describe_chain(err, EXECUTION_CAUSE_DEPTH))
    }
}

/// Join an error's message with the messages of its first `depth` causes
pub fn describe_chain(err: &(dyn Error + 'static), depth: usize) -> String {
    let mut parts = vec![err.to_string()];
    let mut cause = err.source();
    while let Some(inner) = cause {
        if parts.len() > depth {
            break;
        }
        parts.push(inner.to_string());
        cause = inner.source();
    }
    parts.join(", ")
}

pub type QueryResult<T> = Result<T, QueryError>;
