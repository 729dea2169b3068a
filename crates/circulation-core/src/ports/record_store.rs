//! RecordStore port - 永続化の境界
//!
//! The circulation core only needs create / get / replace over whole records.
//! Each call is treated as synchronous and atomic at single-record
//! granularity; everything else (indexes, schema validation, deletion) is the
//! adapter's business.

use thiserror::Error;

use crate::domain::{Record, RecordId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record {0} not found")]
    NotFound(RecordId),

    #[error("record {0} already exists")]
    AlreadyExists(RecordId),

    #[error("record {id} changed concurrently (expected revision {expected}, found {actual})")]
    RevisionConflict {
        id: RecordId,
        expected: u64,
        actual: u64,
    },

    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

/// RecordStore は record の正本（source of truth）
///
/// # 契約
/// - `create` fails with `AlreadyExists` when the id is taken.
/// - `replace` compares the incoming record's revision with the stored one
///   and fails with `RevisionConflict` when they differ.
/// - Successful writes return the record as stored, with its new revision.
///   Adapters may return a different object than the one passed in.
pub trait RecordStore: Send + Sync {
    fn create(&self, record: Record) -> Result<Record, StoreError>;

    fn get(&self, id: &RecordId) -> Result<Record, StoreError>;

    fn replace(&self, record: Record) -> Result<Record, StoreError>;
}
