//! Running aggregate state for grouped execution.

use crate::access::Value;
use crate::catalog::Field;
use crate::executor::error::{ExecutionError, ExecutionResult};
use crate::query::AggregateFunction;
use std::cmp::Ordering;

/// Reject aggregates whose function does not apply to the field's type
pub fn check_applicable(function: AggregateFunction, field: Field) -> ExecutionResult<()> {
    let data_type = field.data_type();
    match function {
        AggregateFunction::Sum | AggregateFunction::Avg if !data_type.is_numeric() => {
            Err(ExecutionError::InvalidAggregate {
                function: function.name(),
                field,
                data_type,
            })
        }
        _ => Ok(()),
    }
}

/// State for tracking one aggregate value during a scan
#[derive(Debug, Clone)]
pub struct AggregateState {
    function: AggregateFunction,
    count: i64,
    int_sum: i64,
    float_sum: f64,
    saw_float: bool,
    extreme: Option<Value>,
}

impl AggregateState {
    pub fn new(function: AggregateFunction) -> Self {
        Self {
            function,
            count: 0,
            int_sum: 0,
            float_sum: 0.0,
            saw_float: false,
            extreme: None,
        }
    }

    /// Fold a value into the state. NULLs are ignored.
    pub fn update(&mut self, value: &Value) {
        if value.is_null() {
            return;
        }
        self.count += 1;

        match self.function {
            AggregateFunction::Count => {}
            AggregateFunction::Sum | AggregateFunction::Avg => match value {
                Value::Integer(n) => {
                    self.int_sum = self.int_sum.saturating_add(*n);
                    self.float_sum += *n as f64;
                }
                Value::Float(x) => {
                    self.saw_float = true;
                    self.float_sum += x;
                }
                _ => {}
            },
            AggregateFunction::Min => self.keep_if(value, Ordering::Less),
            AggregateFunction::Max => self.keep_if(value, Ordering::Greater),
        }
    }

    fn keep_if(&mut self, value: &Value, wanted: Ordering) {
        let replace = match &self.extreme {
            None => true,
            Some(current) => value.compare(current) == Some(wanted),
        };
        if replace {
            self.extreme = Some(value.clone());
        }
    }

    /// Final value of the aggregate
    pub fn finalize(&self) -> Value {
        match self.function {
            AggregateFunction::Count => Value::Integer(self.count),
            _ if self.count == 0 => Value::Null,
            AggregateFunction::Sum if self.saw_float => Value::Float(self.float_sum),
            AggregateFunction::Sum => Value::Integer(self.int_sum),
            AggregateFunction::Avg => Value::Float(self.float_sum / self.count as f64),
            AggregateFunction::Min | AggregateFunction::Max => {
                self.extreme.clone().unwrap_or(Value::Null)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(function: AggregateFunction, values: &[Value]) -> Value {
        let mut state = AggregateState::new(function);
        for value in values {
            state.update(value);
        }
        state.finalize()
    }

    #[test]
    fn test_numeric_aggregates() {
        let values = vec![Value::Integer(3), Value::Null, Value::Integer(5)];
        assert_eq!(fold(AggregateFunction::Sum, &values), Value::Integer(8));
        assert_eq!(fold(AggregateFunction::Avg, &values), Value::Float(4.0));
        assert_eq!(fold(AggregateFunction::Count, &values), Value::Integer(2));
        assert_eq!(fold(AggregateFunction::Min, &values), Value::Integer(3));
        assert_eq!(fold(AggregateFunction::Max, &values), Value::Integer(5));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fold(AggregateFunction::Count, &[]), Value::Integer(0));
        assert_eq!(fold(AggregateFunction::Sum, &[]), Value::Null);
        assert_eq!(fold(AggregateFunction::Avg, &[]), Value::Null);
        assert_eq!(fold(AggregateFunction::Max, &[]), Value::Null);
    }

    #[test]
    fn test_min_max_keep_type() {
        let names = vec![Value::from("b"), Value::from("a"), Value::from("c")];
        assert_eq!(fold(AggregateFunction::Min, &names), Value::from("a"));
        assert_eq!(fold(AggregateFunction::Max, &names), Value::from("c"));
    }

    #[test]
    fn test_applicability() {
        assert!(check_applicable(AggregateFunction::Sum, Field::Clicks).is_ok());
        assert!(check_applicable(AggregateFunction::Max, Field::Daily).is_ok());
        assert!(check_applicable(AggregateFunction::Count, Field::Campaign).is_ok());
        assert!(matches!(
            check_applicable(AggregateFunction::Avg, Field::Campaign),
            Err(ExecutionError::InvalidAggregate { .. })
        ));
    }
}
