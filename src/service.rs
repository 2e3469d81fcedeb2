//! The query service: builder, backend, row assembly and custom
//! expressions wired into one call.

use crate::executor::{self, assemble, QueryBackend, ResultRow};
use crate::expression;
use crate::query::{self, QueryParams, QueryResult, QuerySpecification};

pub struct AdsService<B> {
    backend: B,
}

impl<B: QueryBackend> AdsService<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run a specification end to end
    pub fn query(&self, spec: &QuerySpecification) -> QueryResult<Vec<ResultRow>> {
        let (plan, aliases) = query::build(spec)?;
        let tuples = executor::execute(&self.backend, &plan)?;
        let rows = assemble(tuples, &aliases)?;
        Ok(expression::evaluate(rows, &spec.custom))
    }

    /// Resolve raw request parameters, then run the query
    pub fn query_params(&self, params: &QueryParams) -> QueryResult<Vec<ResultRow>> {
        let spec = QuerySpecification::from_params(params)?;
        self.query(&spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AdRecord, Value};
    use crate::catalog::Field;
    use crate::executor::{Cell, MemoryBackend};
    use crate::query::QueryError;
    use crate::storage::AdStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn service() -> AdsService<MemoryBackend> {
        let store = AdStore::new();
        let day = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        store.insert_batch(vec![
            AdRecord::new("A", "X", day, 3, 30),
            AdRecord::new("A", "Y", day, 5, 70),
        ]);
        AdsService::new(MemoryBackend::new(Arc::new(store)))
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_aggregation_with_custom_expression() -> QueryResult<()> {
        let rows = service().query(&QuerySpecification {
            select: vec![Field::DataSource],
            group_by: vec![Field::DataSource],
            sum: vec![Field::Clicks, Field::Impressions],
            custom: strings(&["sum_clicks/sum_impressions"]),
            ..Default::default()
        })?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("dataSource"), Some(&Value::from("A")));
        assert_eq!(rows[0].value("sum_clicks"), Some(&Value::Integer(8)));
        assert_eq!(
            rows[0].get("sum_clicks/sum_impressions"),
            Some(&Cell::Value(Value::Float(0.08)))
        );
        Ok(())
    }

    #[test]
    fn test_params_resolution_errors() {
        let params = QueryParams {
            select: strings(&["bogus"]),
            ..Default::default()
        };
        let err = service().query_params(&params).unwrap_err();
        assert_eq!(err.to_string(), "No field named bogus");
    }

    #[test]
    fn test_execution_errors_are_wrapped() {
        let err = service()
            .query(&QuerySpecification {
                select: vec![Field::Clicks],
                filter: "daily>'tomorrow'".to_string(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, QueryError::QueryExecution(_)));
        assert!(err
            .to_string()
            .starts_with("There are errors in query. Details: Could not translate filter on field 'daily', 'tomorrow' is not a date, "));
    }
}
