//! Errors raised by the circulation core.

use thiserror::Error;

use super::config::LifecycleAction;
use super::ids::RecordId;
use super::state::CirculationStatus;
use crate::ports::record_store::StoreError;

/// Operational classification of a [`CirculationError`].
///
/// - InvalidAction: the caller asked for something the item's state forbids.
///   An identifier service upstream should reject the action; never retried.
/// - Unsupported: the deployment turned the operation off.
/// - Infrastructure: the record store failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidAction,
    Unsupported,
    Infrastructure,
}

#[derive(Debug, Error)]
pub enum CirculationError {
    #[error("cannot transition {entity}: status is {current}, requires {required}")]
    InvalidTransition {
        entity: RecordId,
        current: CirculationStatus,
        required: CirculationStatus,
    },

    #[error("{entity} has no circulation status")]
    MissingStatus { entity: RecordId },

    #[error("{entity} is on loan to {borrower}, cannot be returned by {returned_by}")]
    BorrowerMismatch {
        entity: RecordId,
        borrower: String,
        returned_by: String,
    },

    #[error("operation '{operation}' is not supported by this deployment")]
    UnsupportedOperation { operation: LifecycleAction },

    #[error("invalid record data: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CirculationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CirculationError::InvalidTransition { .. }
            | CirculationError::MissingStatus { .. }
            | CirculationError::BorrowerMismatch { .. }
            | CirculationError::InvalidRecord(_) => ErrorKind::InvalidAction,
            CirculationError::UnsupportedOperation { .. } => ErrorKind::Unsupported,
            CirculationError::Store(_) => ErrorKind::Infrastructure,
        }
    }

    /// Should an identifier service treat this as "reject this action"?
    pub fn is_invalid_action(&self) -> bool {
        self.kind() == ErrorKind::InvalidAction
    }
}
