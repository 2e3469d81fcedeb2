//! Alias-keyed result rows.

use crate::access::Value;
use crate::query::{QueryError, QueryResult};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// One cell of a result row: a value, or the message of a failed evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Value(Value),
    Error { error: String },
}

impl Cell {
    pub fn error(message: impl Into<String>) -> Self {
        Cell::Error {
            error: message.into(),
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Cell::Value(value) => Some(value),
            Cell::Error { .. } => None,
        }
    }
}

impl From<Value> for Cell {
    fn from(value: Value) -> Self {
        Cell::Value(value)
    }
}

/// An ordered mapping from output alias to cell.
///
/// Rows are values: adding a column consumes the row and returns a new one.
/// Adding an alias that is already present replaces its cell in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRow {
    columns: Vec<(String, Cell)>,
}

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_column(mut self, alias: impl Into<String>, cell: impl Into<Cell>) -> Self {
        let alias = alias.into();
        let cell = cell.into();
        match self.columns.iter_mut().find(|(name, _)| *name == alias) {
            Some((_, existing)) => *existing = cell,
            None => self.columns.push((alias, cell)),
        }
        self
    }

    pub fn get(&self, alias: &str) -> Option<&Cell> {
        self.columns
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, cell)| cell)
    }

    /// The value under `alias`, if present and not an error
    pub fn value(&self, alias: &str) -> Option<&Value> {
        self.get(alias).and_then(Cell::as_value)
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.columns.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Serialize for ResultRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (alias, cell) in &self.columns {
            map.serialize_entry(alias, cell)?;
        }
        map.end()
    }
}

/// Zip positional tuples with the plan's aliases
pub fn assemble(tuples: Vec<Vec<Value>>, aliases: &[String]) -> QueryResult<Vec<ResultRow>> {
    tuples
        .into_iter()
        .map(|tuple| {
            if tuple.len() != aliases.len() {
                return Err(QueryError::AliasMismatch {
                    expected: aliases.len(),
                    actual: tuple.len(),
                });
            }
            Ok(aliases
                .iter()
                .zip(tuple)
                .fold(ResultRow::new(), |row, (alias, value)| {
                    row.with_column(alias.as_str(), value)
                }))
        })
        .collect()
}
