//! Filter expression parsing.
//!
//! Filters are RSQL-style comparison expressions such as
//! `dataSource=='Google Ads';daily=ge=2019-11-01`. Parsing produces a
//! backend-agnostic [`Predicate`] tree; evaluation is left to the backend.

pub mod error;
pub mod lexer;
pub mod parser;
pub mod predicate;
pub mod token;

pub use error::{FilterError, FilterResult, SyntaxError};
pub use lexer::Lexer;
pub use parser::{parse, Parser};
pub use predicate::{Comparison, ComparisonOperator, Literal, Predicate};
pub use token::Token;
