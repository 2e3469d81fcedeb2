//! Custom arithmetic expressions evaluated over result rows.
//!
//! This module provides:
//! - A small expression language (numbers, strings, `+ - * / % ^`,
//!   parentheses and a handful of math functions)
//! - Evaluation with a row's columns bound as variables
//! - Degrade-per-cell error handling: a failing expression yields an error
//!   cell instead of failing the row

pub mod error;
pub mod eval;
pub mod expr;
pub mod operator;
pub mod parser;

pub use error::{ExpressionError, ExpressionResult};
pub use eval::{evaluate, EvalValue, ExpressionEvaluator};
pub use expr::Expression;
pub use operator::{BinaryOperator, Function, UnaryOperator};
pub use parser::{parse, Parser};
