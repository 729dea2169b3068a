//! InMemoryRecordStore - 開発用・テスト用の record store
//!
//! # 実装詳細
//! - HashMap<RecordId, Record> を Mutex で保護
//! - replace は revision を比較する（楽観的排他制御）
//! - 返す Record は常に保存済みの clone（呼び出し元とは別オブジェクト）

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::domain::{Record, RecordId};
use crate::ports::{RecordStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    records: Mutex<HashMap<RecordId, Record>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<RecordId, Record>>, StoreError> {
        self.records
            .lock()
            .map_err(|e| StoreError::Unavailable(format!("lock poisoned: {e}")))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn create(&self, mut record: Record) -> Result<Record, StoreError> {
        let mut records = self.lock()?;
        if records.contains_key(record.id()) {
            return Err(StoreError::AlreadyExists(record.id().clone()));
        }

        record.set_revision(1);
        debug!(id = %record.id(), "record created");
        records.insert(record.id().clone(), record.clone());
        Ok(record)
    }

    fn get(&self, id: &RecordId) -> Result<Record, StoreError> {
        let records = self.lock()?;
        records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn replace(&self, mut record: Record) -> Result<Record, StoreError> {
        let mut records = self.lock()?;
        let Some(stored) = records.get_mut(record.id()) else {
            return Err(StoreError::NotFound(record.id().clone()));
        };

        if stored.revision() != record.revision() {
            debug!(
                id = %record.id(),
                expected = record.revision(),
                actual = stored.revision(),
                "replace rejected: stale revision"
            );
            return Err(StoreError::RevisionConflict {
                id: record.id().clone(),
                expected: record.revision(),
                actual: stored.revision(),
            });
        }

        record.set_revision(stored.revision() + 1);
        debug!(id = %record.id(), revision = record.revision(), "record replaced");
        *stored = record.clone();
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> Record {
        Record::new(RecordId::from(id))
    }

    #[test]
    fn create_then_get_roundtrip() {
        let store = InMemoryRecordStore::new();

        let created = store.create(record("item-1")).unwrap();
        assert_eq!(created.revision(), 1);

        let fetched = store.get(&RecordId::from("item-1")).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn create_rejects_duplicate_id() {
        let store = InMemoryRecordStore::new();
        store.create(record("item-1")).unwrap();

        let err = store.create(record("item-1")).unwrap_err();
        assert_eq!(err, StoreError::AlreadyExists(RecordId::from("item-1")));
    }

    #[test]
    fn get_missing_is_not_found() {
        let store = InMemoryRecordStore::new();

        let err = store.get(&RecordId::from("nope")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn replace_bumps_revision() {
        let store = InMemoryRecordStore::new();
        let created = store.create(record("item-1")).unwrap();

        let replaced = store.replace(created).unwrap();
        assert_eq!(replaced.revision(), 2);
        assert_eq!(store.get(replaced.id()).unwrap().revision(), 2);
    }

    #[test]
    fn replace_with_stale_revision_conflicts() {
        let store = InMemoryRecordStore::new();
        let created = store.create(record("item-1")).unwrap();
        store.replace(created.clone()).unwrap();

        let err = store.replace(created).unwrap_err();
        assert_eq!(
            err,
            StoreError::RevisionConflict {
                id: RecordId::from("item-1"),
                expected: 1,
                actual: 2,
            }
        );
    }

    #[test]
    fn replace_missing_is_not_found() {
        let store = InMemoryRecordStore::new();

        let err = store.replace(record("item-1")).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
