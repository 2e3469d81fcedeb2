//! Translation of a [`QuerySpecification`] into a [`QueryPlan`].

use crate::catalog::Field;
use crate::filter;
use crate::query::error::{QueryError, QueryResult};
use crate::query::plan::{AggregateFunction, Projection, QueryPlan};
use crate::query::spec::QuerySpecification;

/// Interprets a specification and produces the plan plus its output aliases
pub struct QueryBuilder<'a> {
    spec: &'a QuerySpecification,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(spec: &'a QuerySpecification) -> Self {
        Self { spec }
    }

    /// Build the plan.
    ///
    /// The returned aliases line up positionally with the values of every
    /// tuple the plan yields: direct selections first, then the aggregates
    /// in SUM, AVG, MIN, MAX, COUNT order.
    pub fn build(&self) -> QueryResult<(QueryPlan, Vec<String>)> {
        let projections = self.build_projections()?;
        let predicate = self.build_filter()?;

        let plan = QueryPlan {
            projections,
            predicate,
            group_by: self.spec.group_by.clone(),
        };
        let aliases = plan.aliases();
        log::debug!("Built query plan: {}", plan);

        Ok((plan, aliases))
    }

    fn build_projections(&self) -> QueryResult<Vec<Projection>> {
        let mut projections = Vec::with_capacity(self.spec.projection_count());

        projections.extend(self.spec.select.iter().map(|f| Projection::field(*f)));
        for function in AggregateFunction::ALL {
            projections.extend(
                self.spec
                    .aggregates(function)
                    .iter()
                    .map(|f| Projection::aggregate(function, *f)),
            );
        }

        if projections.is_empty() {
            return Err(QueryError::EmptySelection);
        }
        Ok(projections)
    }

    fn build_filter(&self) -> QueryResult<Option<filter::Predicate>> {
        if self.spec.filter.is_empty() {
            return Ok(None);
        }
        let normalized = normalize_filter_casing(&self.spec.filter);
        filter::parse(&normalized)
            .map(Some)
            .map_err(QueryError::InvalidFilter)
    }
}

/// Build the plan for a specification
pub fn build(spec: &QuerySpecification) -> QueryResult<(QueryPlan, Vec<String>)> {
    QueryBuilder::new(spec).build()
}

/// Rewrite every case-insensitive occurrence of a field name to its
/// canonical spelling, so `DataSource==x` and `datasource==x` both work.
///
/// The rewrite is textual and also applies inside quoted values.
pub fn normalize_filter_casing(filter: &str) -> String {
    Field::ALL
        .iter()
        .fold(filter.to_string(), |text, field| {
            replace_ignore_case(&text, field.name())
        })
}

fn replace_ignore_case(haystack: &str, canonical: &str) -> String {
    // ASCII lower-casing keeps byte offsets valid for the original string.
    let lowered = haystack.to_ascii_lowercase();
    let needle = canonical.to_ascii_lowercase();

    let mut out = String::with_capacity(haystack.len());
    let mut last = 0;
    for (start, _) in lowered.match_indices(&needle) {
        out.push_str(&haystack[last..start]);
        out.push_str(canonical);
        last = start + needle.len();
    }
    out.push_str(&haystack[last..]);
    out
}
