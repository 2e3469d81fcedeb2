use crate::access::{AdRecord, RecordId};
use crate::storage::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

struct StoreInner {
    records: Vec<AdRecord>,
    next_id: RecordId,
}

/// Record store for the advertising dataset.
///
/// Reads take a shared lock and may run concurrently; inserts take the
/// exclusive lock. When opened with a snapshot path the records can be
/// persisted with [`AdStore::save`] and are reloaded by [`AdStore::open`].
pub struct AdStore {
    inner: RwLock<StoreInner>,
    snapshot_path: Option<PathBuf>,
}

impl AdStore {
    /// Create an empty store that lives only in memory
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                records: Vec::new(),
                next_id: 1,
            }),
            snapshot_path: None,
        }
    }

    /// Open a store backed by a snapshot file, loading it if it exists
    pub fn open(path: &Path) -> StorageResult<Self> {
        let records: Vec<AdRecord> = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            bincode::deserialize_from(reader).map_err(|source| StorageError::CorruptSnapshot {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            Vec::new()
        };

        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        log::info!(
            "Opened snapshot {} with {} records",
            path.display(),
            records.len()
        );

        Ok(Self {
            inner: RwLock::new(StoreInner { records, next_id }),
            snapshot_path: Some(path.to_path_buf()),
        })
    }

    /// Insert a record, assigning it the next id
    pub fn insert(&self, mut record: AdRecord) -> RecordId {
        let mut inner = self.inner.write();
        record.id = inner.next_id;
        inner.next_id += 1;
        inner.records.push(record);
        inner.next_id - 1
    }

    /// Insert many records under a single lock acquisition
    pub fn insert_batch(&self, records: impl IntoIterator<Item = AdRecord>) -> usize {
        let mut inner = self.inner.write();
        let before = inner.records.len();
        for mut record in records {
            record.id = inner.next_id;
            inner.next_id += 1;
            inner.records.push(record);
        }
        inner.records.len() - before
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` over all records in insertion order while holding the read lock
    pub fn scan<R>(&self, f: impl FnOnce(&[AdRecord]) -> R) -> R {
        let inner = self.inner.read();
        f(&inner.records)
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Write all records to the snapshot file. No-op for in-memory stores.
    pub fn save(&self) -> StorageResult<()> {
        let path = match &self.snapshot_path {
            Some(path) => path,
            None => return Ok(()),
        };

        // Write to a sibling file first so a crash never leaves a torn snapshot.
        let tmp_path = path.with_extension("tmp");
        {
            let inner = self.inner.read();
            let mut writer = BufWriter::new(File::create(&tmp_path)?);
            bincode::serialize_into(&mut writer, &inner.records).map_err(StorageError::Encode)?;
            writer.flush()?;
        }
        fs::rename(&tmp_path, path)?;

        log::info!("Saved {} records to {}", self.len(), path.display());
        Ok(())
    }
}

impl Default for AdStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn record(source: &str, clicks: i32) -> AdRecord {
        let day = NaiveDate::from_ymd_opt(2019, 11, 12).unwrap();
        AdRecord::new(source, "Campaign", day, clicks, clicks * 10)
    }

    #[test]
    fn test_insert_assigns_ids() {
        let store = AdStore::new();
        assert!(store.is_empty());

        assert_eq!(store.insert(record("A", 1)), 1);
        assert_eq!(store.insert(record("B", 2)), 2);
        assert_eq!(store.insert_batch(vec![record("C", 3), record("D", 4)]), 2);
        assert_eq!(store.len(), 4);

        let ids = store.scan(|records| records.iter().map(|r| r.id).collect::<Vec<_>>());
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_in_memory_save_is_noop() -> StorageResult<()> {
        let store = AdStore::new();
        store.insert(record("A", 1));
        store.save()?;
        assert!(store.snapshot_path().is_none());
        Ok(())
    }

    #[test]
    fn test_snapshot_roundtrip() -> StorageResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ads.snapshot");

        let store = AdStore::open(&path)?;
        assert!(store.is_empty());
        store.insert(record("A", 3));
        store.insert(record("A", 5));
        store.save()?;

        let reopened = AdStore::open(&path)?;
        assert_eq!(reopened.len(), 2);
        let clicks = reopened.scan(|records| records.iter().map(|r| r.clicks).collect::<Vec<_>>());
        assert_eq!(clicks, vec![3, 5]);

        // Ids continue after the highest persisted id
        assert_eq!(reopened.insert(record("B", 1)), 3);
        Ok(())
    }

    #[test]
    fn test_corrupt_snapshot() -> StorageResult<()> {
        let dir = tempdir()?;
        let path = dir.path().join("ads.snapshot");
        fs::write(&path, b"\xff\xff\xff\xff\xff\xff\xff\xff\x01")?;

        assert!(matches!(
            AdStore::open(&path),
            Err(StorageError::CorruptSnapshot { .. })
        ));
        Ok(())
    }
}
