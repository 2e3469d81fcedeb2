//! Error types for custom expression evaluation.

use std::fmt;

/// Errors that can occur while parsing or evaluating a custom expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Malformed expression text
    Syntax { message: String, position: usize },

    /// Identifier not bound in the row
    UnknownVariable { name: String },

    /// Identifier bound to a NULL column
    MissingValue { name: String },

    /// Division or remainder by zero
    DivisionByZero,

    /// Invalid function name
    UnknownFunction { name: String },

    /// Wrong number of function arguments
    FunctionArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// Arithmetic applied to text
    NonNumericOperand { operator: String, value: String },

    /// Infinite or NaN result
    NonFinite,
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionError::Syntax { message, position } => {
                write!(f, "Syntax error at position {}: {}", position, message)
            }
            ExpressionError::UnknownVariable { name } => write!(f, "Unknown variable: {}", name),
            ExpressionError::MissingValue { name } => {
                write!(f, "Variable {} has no value", name)
            }
            ExpressionError::DivisionByZero => write!(f, "Division by zero"),
            ExpressionError::UnknownFunction { name } => write!(f, "Unknown function: {}", name),
            ExpressionError::FunctionArgumentCount {
                function,
                expected,
                actual,
            } => write!(
                f,
                "Function {} expects {} arguments, got {}",
                function, expected, actual
            ),
            ExpressionError::NonNumericOperand { operator, value } => {
                write!(f, "Operator {} expects numbers, got '{}'", operator, value)
            }
            ExpressionError::NonFinite => write!(f, "Result is not a finite number"),
        }
    }
}

impl std::error::Error for ExpressionError {}

pub type ExpressionResult<T> = Result<T, ExpressionError>;
