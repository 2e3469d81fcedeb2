//! Per-row evaluation of custom expressions.

use crate::access::Value;
use crate::executor::{Cell, ResultRow};
use crate::expression::error::{ExpressionError, ExpressionResult};
use crate::expression::expr::Expression;
use crate::expression::operator::{BinaryOperator, UnaryOperator};
use crate::expression::parser;
use std::collections::HashMap;

/// A value as seen by the expression language
#[derive(Debug, Clone, PartialEq)]
pub enum EvalValue {
    Number(f64),
    Text(String),
    /// A NULL column
    Missing,
}

impl EvalValue {
    fn bind(value: &Value) -> Self {
        match value {
            Value::Null => EvalValue::Missing,
            Value::Integer(n) => EvalValue::Number(*n as f64),
            Value::Float(x) => EvalValue::Number(*x),
            Value::String(s) => EvalValue::Text(s.clone()),
            Value::Date(_) => EvalValue::Text(value.to_string()),
        }
    }

    fn into_value(self) -> ExpressionResult<Value> {
        match self {
            EvalValue::Number(x) if x.is_finite() => Ok(Value::Float(x)),
            EvalValue::Number(_) => Err(ExpressionError::NonFinite),
            EvalValue::Text(s) => Ok(Value::String(s)),
            EvalValue::Missing => Ok(Value::Null),
        }
    }
}

/// Evaluator for expressions over one row's variables
pub struct ExpressionEvaluator {
    variables: HashMap<String, EvalValue>,
}

impl ExpressionEvaluator {
    /// Bind every column of the row as a variable named by its alias.
    /// Error cells bind as missing values.
    pub fn for_row(row: &ResultRow) -> Self {
        let variables = row
            .iter()
            .map(|(alias, cell)| {
                let value = cell.as_value().map_or(EvalValue::Missing, EvalValue::bind);
                (alias.to_string(), value)
            })
            .collect();
        Self { variables }
    }

    /// Evaluate an expression and return the result as a row value
    pub fn evaluate(&self, expr: &Expression) -> ExpressionResult<Value> {
        self.eval(expr)?.into_value()
    }

    fn eval(&self, expr: &Expression) -> ExpressionResult<EvalValue> {
        match expr {
            Expression::Number(n) => Ok(EvalValue::Number(*n)),
            Expression::Text(s) => Ok(EvalValue::Text(s.clone())),
            Expression::Variable(name) => self
                .variables
                .get(name)
                .cloned()
                .ok_or_else(|| ExpressionError::UnknownVariable { name: name.clone() }),

            Expression::Unary { op, operand } => {
                let x = self.number(operand, &op.to_string())?;
                Ok(EvalValue::Number(match op {
                    UnaryOperator::Plus => x,
                    UnaryOperator::Minus => -x,
                }))
            }

            Expression::Binary { op, left, right } => {
                if *op == BinaryOperator::Add {
                    if let (EvalValue::Text(l), EvalValue::Text(r)) =
                        (self.eval(left)?, self.eval(right)?)
                    {
                        return Ok(EvalValue::Text(l + &r));
                    }
                }
                let symbol = op.to_string();
                let l = self.number(left, &symbol)?;
                let r = self.number(right, &symbol)?;
                op.apply(l, r)
                    .map(EvalValue::Number)
                    .ok_or(ExpressionError::DivisionByZero)
            }

            Expression::FunctionCall { function, args } => {
                let values = args
                    .iter()
                    .map(|arg| self.number(arg, function.name()))
                    .collect::<ExpressionResult<Vec<_>>>()?;
                Ok(EvalValue::Number(function.apply(&values)))
            }
        }
    }

    fn number(&self, expr: &Expression, operator: &str) -> ExpressionResult<f64> {
        match self.eval(expr)? {
            EvalValue::Number(x) => Ok(x),
            EvalValue::Text(s) => Err(ExpressionError::NonNumericOperand {
                operator: operator.to_string(),
                value: s,
            }),
            EvalValue::Missing => Err(ExpressionError::MissingValue {
                name: expr.to_string(),
            }),
        }
    }
}

/// Append one column per expression to every row.
///
/// Each expression is parsed once; the new column is keyed by the
/// expression text and holds either the result or an error cell. Variables
/// are bound from the row as it was before any expression was added.
pub fn evaluate(rows: Vec<ResultRow>, expressions: &[String]) -> Vec<ResultRow> {
    if expressions.is_empty() {
        return rows;
    }

    let parsed: Vec<(&str, ExpressionResult<Expression>)> = expressions
        .iter()
        .map(|text| (text.as_str(), parser::parse(text)))
        .collect();
    for (text, result) in &parsed {
        if let Err(err) = result {
            log::debug!("Custom expression '{}' does not parse: {}", text, err);
        }
    }

    rows.into_iter()
        .map(|row| {
            let evaluator = ExpressionEvaluator::for_row(&row);
            parsed.iter().fold(row, |row, (text, result)| {
                let cell = match result {
                    Ok(expr) => evaluator
                        .evaluate(expr)
                        .map_or_else(|err| Cell::error(err.to_string()), Cell::Value),
                    Err(err) => Cell::error(err.to_string()),
                };
                row.with_column(*text, cell)
            })
        })
        .collect()
}
