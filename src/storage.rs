//! Storage layer for the advertising dataset.
//!
//! - **AdStore**: the record set, guarded by a reader/writer lock, with an
//!   optional bincode snapshot file for persistence across restarts
//! - **StorageError**: failures reading or writing the snapshot

pub mod error;
pub mod store;

pub use error::{StorageError, StorageResult};
pub use store::AdStore;
