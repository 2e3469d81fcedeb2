use crate::access::{AdRecord, Value};
use crate::catalog::Field;
use crate::executor::aggregate::{check_applicable, AggregateState};
use crate::executor::error::{ExecutionError, ExecutionResult};
use crate::executor::filter::RecordFilter;
use crate::executor::{QueryBackend, ResultSet};
use crate::query::{ProjectionKind, QueryPlan};
use crate::storage::AdStore;
use std::collections::HashMap;
use std::sync::Arc;

/// Query backend that scans the in-memory [`AdStore`].
///
/// Aggregating plans are executed as a single-pass hash aggregation; groups
/// come out in the order their first record was seen.
pub struct MemoryBackend {
    store: Arc<AdStore>,
}

impl MemoryBackend {
    pub fn new(store: Arc<AdStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<AdStore> {
        &self.store
    }
}

impl QueryBackend for MemoryBackend {
    type Error = ExecutionError;

    fn execute(&self, plan: &QueryPlan) -> ExecutionResult<ResultSet> {
        validate(plan)?;
        let filter = plan
            .predicate
            .as_ref()
            .map(RecordFilter::translate)
            .transpose()?;

        let tuples = self.store.scan(|records| {
            let matching = records
                .iter()
                .filter(|record| filter.as_ref().map_or(true, |f| f.matches(record)));
            if plan.is_aggregating() {
                aggregate(plan, matching)
            } else {
                project(plan, matching)
            }
        });

        log::debug!("Plan produced {} rows", tuples.len());
        Ok(ResultSet::from_tuples(tuples, plan.projections.len()))
    }
}

fn validate(plan: &QueryPlan) -> ExecutionResult<()> {
    for projection in &plan.projections {
        match projection.kind {
            ProjectionKind::Aggregate(function, field) => check_applicable(function, field)?,
            ProjectionKind::Field(field) => {
                if plan.is_aggregating() && !plan.group_by.contains(&field) {
                    return Err(ExecutionError::NotGrouped(field));
                }
            }
        }
    }
    Ok(())
}

fn project<'a>(plan: &QueryPlan, records: impl Iterator<Item = &'a AdRecord>) -> Vec<Vec<Value>> {
    records
        .map(|record| {
            plan.projections
                .iter()
                .map(|p| record.get(p.source_field()))
                .collect()
        })
        .collect()
}

struct Group {
    key: Vec<Value>,
    states: Vec<AggregateState>,
}

fn fresh_states(plan: &QueryPlan) -> Vec<AggregateState> {
    plan.projections
        .iter()
        .filter_map(|p| match p.kind {
            ProjectionKind::Aggregate(function, _) => Some(AggregateState::new(function)),
            ProjectionKind::Field(_) => None,
        })
        .collect()
}

fn aggregate<'a>(
    plan: &QueryPlan,
    records: impl Iterator<Item = &'a AdRecord>,
) -> Vec<Vec<Value>> {
    let inputs: Vec<Field> = plan
        .projections
        .iter()
        .filter_map(|p| match p.kind {
            ProjectionKind::Aggregate(_, field) => Some(field),
            ProjectionKind::Field(_) => None,
        })
        .collect();

    let mut groups: Vec<Group> = Vec::new();
    let mut index: HashMap<Vec<Value>, usize> = HashMap::new();

    for record in records {
        let key: Vec<Value> = plan.group_by.iter().map(|f| record.get(*f)).collect();
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(Group {
                key,
                states: fresh_states(plan),
            });
            groups.len() - 1
        });

        for (state, field) in groups[slot].states.iter_mut().zip(&inputs) {
            state.update(&record.get(*field));
        }
    }

    // An ungrouped aggregation over no records still yields one row
    if groups.is_empty() && plan.group_by.is_empty() {
        groups.push(Group {
            key: Vec::new(),
            states: fresh_states(plan),
        });
    }

    groups
        .into_iter()
        .map(|group| {
            let mut states = group.states.iter();
            plan.projections
                .iter()
                .map(|p| match p.kind {
                    ProjectionKind::Field(field) => plan
                        .group_by
                        .iter()
                        .position(|g| *g == field)
                        .map_or(Value::Null, |i| group.key[i].clone()),
                    ProjectionKind::Aggregate(..) => {
                        states.next().map_or(Value::Null, AggregateState::finalize)
                    }
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{build, QuerySpecification};
    use chrono::NaiveDate;
    use std::error::Error;

    fn backend() -> MemoryBackend {
        let store = AdStore::new();
        let day = |d| NaiveDate::from_ymd_opt(2020, 1, d).unwrap();
        store.insert_batch(vec![
            AdRecord::new("A", "Alpha", day(1), 3, 30),
            AdRecord::new("B", "Beta", day(1), 4, 40),
            AdRecord::new("A", "Gamma", day(2), 5, 50),
        ]);
        MemoryBackend::new(Arc::new(store))
    }

    fn run(spec: QuerySpecification) -> ExecutionResult<Vec<Vec<Value>>> {
        let (plan, _) = build(&spec).unwrap();
        backend().execute(&plan).map(ResultSet::into_tuples)
    }

    #[test]
    fn test_plain_projection_with_filter() -> ExecutionResult<()> {
        let rows = run(QuerySpecification {
            select: vec![Field::Campaign, Field::Clicks],
            filter: "daily=='2020-01-01'".to_string(),
            ..Default::default()
        })?;
        assert_eq!(
            rows,
            vec![
                vec![Value::from("Alpha"), Value::Integer(3)],
                vec![Value::from("Beta"), Value::Integer(4)],
            ]
        );
        Ok(())
    }

    #[test]
    fn test_grouped_aggregation_in_first_seen_order() -> ExecutionResult<()> {
        let rows = run(QuerySpecification {
            select: vec![Field::DataSource],
            group_by: vec![Field::DataSource],
            sum: vec![Field::Clicks],
            avg: vec![Field::Clicks],
            count: vec![Field::Campaign],
            ..Default::default()
        })?;
        assert_eq!(
            rows,
            vec![
                vec![
                    Value::from("A"),
                    Value::Integer(8),
                    Value::Float(4.0),
                    Value::Integer(2)
                ],
                vec![
                    Value::from("B"),
                    Value::Integer(4),
                    Value::Float(4.0),
                    Value::Integer(1)
                ],
            ]
        );
        Ok(())
    }

    #[test]
    fn test_single_projection_is_scalar() -> ExecutionResult<()> {
        let (plan, _) = build(&QuerySpecification {
            max: vec![Field::Daily],
            ..Default::default()
        })
        .unwrap();
        let result = backend().execute(&plan)?;
        let expected = Value::Date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap());
        assert_eq!(result, ResultSet::Scalars(vec![expected]));
        Ok(())
    }

    #[test]
    fn test_empty_ungrouped_aggregate_yields_one_row() -> ExecutionResult<()> {
        let rows = run(QuerySpecification {
            filter: "clicks>100".to_string(),
            sum: vec![Field::Clicks],
            count: vec![Field::Clicks],
            ..Default::default()
        })?;
        assert_eq!(rows, vec![vec![Value::Null, Value::Integer(0)]]);

        let rows = run(QuerySpecification {
            select: vec![Field::DataSource],
            group_by: vec![Field::DataSource],
            filter: "clicks>100".to_string(),
            count: vec![Field::Clicks],
            ..Default::default()
        })?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[test]
    fn test_group_by_without_aggregates_is_distinct() -> ExecutionResult<()> {
        let rows = run(QuerySpecification {
            select: vec![Field::Daily],
            group_by: vec![Field::Daily],
            ..Default::default()
        })?;
        assert_eq!(rows.len(), 2);
        Ok(())
    }

    #[test]
    fn test_ungrouped_field_with_aggregate_is_rejected() {
        let err = run(QuerySpecification {
            select: vec![Field::Campaign],
            sum: vec![Field::Clicks],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ExecutionError::NotGrouped(Field::Campaign)));
    }

    #[test]
    fn test_sum_of_text_is_rejected() {
        let err = run(QuerySpecification {
            sum: vec![Field::Campaign],
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidAggregate { .. }));
    }

    #[test]
    fn test_bad_literal_surfaces_cause_chain() {
        let err = run(QuerySpecification {
            select: vec![Field::Clicks],
            filter: "daily>'soon'".to_string(),
            ..Default::default()
        })
        .unwrap_err();
        let cause = err.source().unwrap();
        assert!(cause.source().is_some());
    }
}
