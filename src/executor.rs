//! Query execution.
//!
//! A [`QueryBackend`] turns a [`QueryPlan`] into rows of values. Backends
//! may answer a single-column plan with a flat list of scalars instead of
//! one-element tuples; [`ResultSet::into_tuples`] hides that difference
//! from the rest of the pipeline.

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod memory;
pub mod row;

pub use error::{ExecutionError, ExecutionResult, LiteralError};
pub use filter::RecordFilter;
pub use memory::MemoryBackend;
pub use row::{assemble, Cell, ResultRow};

use crate::access::Value;
use crate::query::{QueryError, QueryPlan, QueryResult};

/// Raw output of a backend
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    Tuples(Vec<Vec<Value>>),
    /// Degenerate form for plans with exactly one projection
    Scalars(Vec<Value>),
}

impl ResultSet {
    /// Wrap tuples, collapsing them to scalars when there is a single column
    pub fn from_tuples(tuples: Vec<Vec<Value>>, width: usize) -> Self {
        if width == 1 {
            ResultSet::Scalars(tuples.into_iter().flatten().collect())
        } else {
            ResultSet::Tuples(tuples)
        }
    }

    /// Normalize to tuples, wrapping each scalar into a one-element tuple
    pub fn into_tuples(self) -> Vec<Vec<Value>> {
        match self {
            ResultSet::Tuples(tuples) => tuples,
            ResultSet::Scalars(values) => values.into_iter().map(|v| vec![v]).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ResultSet::Tuples(tuples) => tuples.len(),
            ResultSet::Scalars(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A data source able to run query plans
pub trait QueryBackend: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(&self, plan: &QueryPlan) -> Result<ResultSet, Self::Error>;
}

/// Run a plan and normalize its output, wrapping backend failures as
/// [`QueryError::QueryExecution`]
pub fn execute<B: QueryBackend + ?Sized>(
    backend: &B,
    plan: &QueryPlan,
) -> QueryResult<Vec<Vec<Value>>> {
    match backend.execute(plan) {
        Ok(result) => Ok(result.into_tuples()),
        Err(err) => {
            let wrapped = QueryError::execution(&err);
            log::warn!("Query execution failed: {}", wrapped);
            Err(wrapped)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_normalize_to_single_element_tuples() {
        let result = ResultSet::from_tuples(vec![vec![Value::Integer(1)], vec![Value::Integer(2)]], 1);
        assert_eq!(result, ResultSet::Scalars(vec![Value::Integer(1), Value::Integer(2)]));
        assert_eq!(result.len(), 2);
        assert_eq!(
            result.into_tuples(),
            vec![vec![Value::Integer(1)], vec![Value::Integer(2)]]
        );
    }

    #[test]
    fn test_tuples_pass_through() {
        let tuples = vec![vec![Value::Integer(1), Value::from("a")]];
        let result = ResultSet::from_tuples(tuples.clone(), 2);
        assert_eq!(result.into_tuples(), tuples);
        assert!(ResultSet::Tuples(vec![]).is_empty());
    }
}
