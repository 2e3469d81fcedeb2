//! Access layer for the dataset's records and values.
//!
//! - **AdRecord**: one stored advertising performance record
//! - **Value**: type-safe representation of column and result values
//! - **DataType**: the types a column or computed value can have

pub mod record;
pub mod value;

pub use record::{AdRecord, RecordId};
pub use value::{DataType, Value, DATE_FORMAT};
