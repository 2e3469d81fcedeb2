//! Dynamic query construction.
//!
//! This module provides:
//! - `QueryParams` / `QuerySpecification`: what the caller asked for
//! - `QueryPlan`: a backend-agnostic plan with ordered, aliased projections
//! - `QueryBuilder`: the translation between the two
//! - `QueryError`: every request-level failure of the pipeline

pub mod builder;
pub mod error;
pub mod plan;
pub mod spec;

pub use builder::{build, normalize_filter_casing, QueryBuilder};
pub use error::{describe_chain, QueryError, QueryResult};
pub use plan::{AggregateFunction, Projection, ProjectionKind, QueryPlan};
pub use spec::{QueryParams, QuerySpecification};
