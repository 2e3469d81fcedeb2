//! Field registry for the advertising dataset.
//!
//! The set of queryable columns is closed and fixed at compile time. Callers
//! refer to fields by name in any casing; [`resolve`] maps those names onto
//! [`Field`] values and is the only place an unknown name is turned into an
//! error.

pub mod field;

pub use field::{resolve, resolve_all, Field, FieldLookup, UnknownFieldError};
