//! Backend-agnostic query plan.
//!
//! A [`QueryPlan`] is the neutral value a backend translates into its own
//! query form: ordered projections, an optional predicate and ordered
//! group-by fields.

use crate::catalog::Field;
use crate::filter::Predicate;
use std::fmt;

/// Aggregate functions a caller can request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Avg,
    Min,
    Max,
    Count,
}

impl AggregateFunction {
    /// Order in which aggregate projections follow the direct selections
    pub const ALL: [AggregateFunction; 5] = [
        AggregateFunction::Sum,
        AggregateFunction::Avg,
        AggregateFunction::Min,
        AggregateFunction::Max,
        AggregateFunction::Count,
    ];

    /// Lower-case name, used as the alias prefix
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Sum => "sum",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Count => "count",
        }
    }

    /// Alias of this function applied to a field, e.g. `sum_clicks`
    pub fn alias_for(&self, field: Field) -> String {
        format!("{}_{}", self.name(), field.name())
    }
}

/// What a projected column computes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    Field(Field),
    Aggregate(AggregateFunction, Field),
}

/// One output column of the plan
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub kind: ProjectionKind,
    pub alias: String,
}

impl Projection {
    pub fn field(field: Field) -> Self {
        Self {
            kind: ProjectionKind::Field(field),
            alias: field.name().to_string(),
        }
    }

    pub fn aggregate(function: AggregateFunction, field: Field) -> Self {
        Self {
            kind: ProjectionKind::Aggregate(function, field),
            alias: function.alias_for(field),
        }
    }

    /// The field this column reads
    pub fn source_field(&self) -> Field {
        match self.kind {
            ProjectionKind::Field(field) | ProjectionKind::Aggregate(_, field) => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub projections: Vec<Projection>,
    pub predicate: Option<Predicate>,
    pub group_by: Vec<Field>,
}

impl QueryPlan {
    /// Output column names, positionally aligned with the projections
    pub fn aliases(&self) -> Vec<String> {
        self.projections.iter().map(|p| p.alias.clone()).collect()
    }

    pub fn has_aggregates(&self) -> bool {
        self.projections
            .iter()
            .any(|p| matches!(p.kind, ProjectionKind::Aggregate(..)))
    }

    /// Whether execution collapses records into groups
    pub fn is_aggregating(&self) -> bool {
        self.has_aggregates() || !self.group_by.is_empty()
    }
}

impl fmt::Display for QueryPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT ")?;
        for (i, projection) in self.projections.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match projection.kind {
                ProjectionKind::Field(field) => write!(f, "{}", field)?,
                ProjectionKind::Aggregate(function, field) => write!(
                    f,
                    "{}({}) AS {}",
                    function.name().to_uppercase(),
                    field,
                    projection.alias
                )?,
            }
        }
        if let Some(predicate) = &self.predicate {
            write!(f, " WHERE {}", predicate)?;
        }
        if !self.group_by.is_empty() {
            let fields: Vec<&str> = self.group_by.iter().map(|g| g.name()).collect();
            write!(f, " GROUP BY {}", fields.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(Projection::field(Field::DataSource).alias, "dataSource");
        assert_eq!(
            Projection::aggregate(AggregateFunction::Sum, Field::Clicks).alias,
            "sum_clicks"
        );
        assert_eq!(
            AggregateFunction::Count.alias_for(Field::Daily),
            "count_daily"
        );
    }

    #[test]
    fn test_aggregating() {
        let plain = QueryPlan {
            projections: vec![Projection::field(Field::Campaign)],
            predicate: None,
            group_by: vec![],
        };
        assert!(!plain.is_aggregating());

        let grouped = QueryPlan {
            group_by: vec![Field::Campaign],
            ..plain.clone()
        };
        assert!(grouped.is_aggregating());
        assert!(!grouped.has_aggregates());

        let totals = QueryPlan {
            projections: vec![Projection::aggregate(AggregateFunction::Max, Field::Clicks)],
            ..plain
        };
        assert!(totals.is_aggregating());
        assert_eq!(totals.projections[0].source_field(), Field::Clicks);
    }

    #[test]
    fn test_display() {
        let plan = QueryPlan {
            projections: vec![
                Projection::field(Field::DataSource),
                Projection::aggregate(AggregateFunction::Sum, Field::Clicks),
            ],
            predicate: None,
            group_by: vec![Field::DataSource],
        };
        assert_eq!(
            plan.to_string(),
            "SELECT dataSource, SUM(clicks) AS sum_clicks GROUP BY dataSource"
        );
    }
}
