//! Caller-facing description of a report request.

use crate::catalog::{resolve_all, Field, UnknownFieldError};
use crate::query::plan::AggregateFunction;

/// Request parameters as received from the HTTP layer, before field names
/// are resolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub select: Vec<String>,
    pub filter: String,
    pub group_by: Vec<String>,
    pub sum: Vec<String>,
    pub avg: Vec<String>,
    pub min: Vec<String>,
    pub max: Vec<String>,
    pub count: Vec<String>,
    pub custom: Vec<String>,
}

/// Validated, typed representation of what the caller asked for.
///
/// One is built per request and dropped when the request completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySpecification {
    /// Fields projected directly, aliased by their own name
    pub select: Vec<Field>,
    /// Raw filter expression; empty means no restriction
    pub filter: String,
    pub group_by: Vec<Field>,
    pub sum: Vec<Field>,
    pub avg: Vec<Field>,
    pub min: Vec<Field>,
    pub max: Vec<Field>,
    pub count: Vec<Field>,
    /// Arithmetic expressions evaluated per row after execution
    pub custom: Vec<String>,
}

impl QuerySpecification {
    /// Resolve every field name of the request through the field registry
    pub fn from_params(params: &QueryParams) -> Result<Self, UnknownFieldError> {
        Ok(Self {
            select: resolve_all(&params.select)?,
            filter: params.filter.clone(),
            group_by: resolve_all(&params.group_by)?,
            sum: resolve_all(&params.sum)?,
            avg: resolve_all(&params.avg)?,
            min: resolve_all(&params.min)?,
            max: resolve_all(&params.max)?,
            count: resolve_all(&params.count)?,
            custom: params.custom.clone(),
        })
    }

    /// Fields requested for one aggregate function
    pub fn aggregates(&self, function: AggregateFunction) -> &[Field] {
        match function {
            AggregateFunction::Sum => &self.sum,
            AggregateFunction::Avg => &self.avg,
            AggregateFunction::Min => &self.min,
            AggregateFunction::Max => &self.max,
            AggregateFunction::Count => &self.count,
        }
    }

    /// Number of columns the query itself will project
    pub fn projection_count(&self) -> usize {
        self.select.len()
            + AggregateFunction::ALL
                .iter()
                .map(|f| self.aggregates(*f).len())
                .sum::<usize>()
    }
}
