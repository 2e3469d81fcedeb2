//! The closed set of queryable columns of the advertising dataset.

use crate::access::DataType;
use std::fmt;
use thiserror::Error;

/// A queryable column of the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Clicks,
    Impressions,
    Campaign,
    DataSource,
    Daily,
}

/// Outcome of a case-insensitive field lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLookup {
    Found(Field),
    NotFound,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No field named {name}")]
pub struct UnknownFieldError {
    pub name: String,
}

/// Lower-cased canonical name -> field, in declaration order
const REGISTRY: [(&str, Field); 5] = [
    ("clicks", Field::Clicks),
    ("impressions", Field::Impressions),
    ("campaign", Field::Campaign),
    ("datasource", Field::DataSource),
    ("daily", Field::Daily),
];

impl Field {
    /// All fields in declaration order
    pub const ALL: [Field; 5] = [
        Field::Clicks,
        Field::Impressions,
        Field::Campaign,
        Field::DataSource,
        Field::Daily,
    ];

    /// Canonical column name, also used as the alias of a direct selection
    pub fn name(&self) -> &'static str {
        match self {
            Field::Clicks => "clicks",
            Field::Impressions => "impressions",
            Field::Campaign => "campaign",
            Field::DataSource => "dataSource",
            Field::Daily => "daily",
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Field::Clicks | Field::Impressions => DataType::Integer,
            Field::Campaign | Field::DataSource => DataType::Varchar,
            Field::Daily => DataType::Date,
        }
    }

    /// Case-insensitive exact lookup
    pub fn lookup(name: &str) -> FieldLookup {
        let lowered = name.to_ascii_lowercase();
        REGISTRY
            .iter()
            .find(|(key, _)| *key == lowered)
            .map_or(FieldLookup::NotFound, |(_, field)| FieldLookup::Found(*field))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Resolve a caller-supplied field name, failing on names outside the registry
pub fn resolve(name: &str) -> Result<Field, UnknownFieldError> {
    match Field::lookup(name) {
        FieldLookup::Found(field) => Ok(field),
        FieldLookup::NotFound => Err(UnknownFieldError {
            name: name.to_string(),
        }),
    }
}

/// Resolve a list of names, stopping at the first unknown one
pub fn resolve_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Field>, UnknownFieldError> {
    names.iter().map(|name| resolve(name.as_ref())).collect()
}
