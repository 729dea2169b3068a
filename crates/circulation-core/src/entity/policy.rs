//! Return policy hook.
//!
//! Whether the person returning an item must be the one who borrowed it is a
//! deployment decision. The default accepts any return.

use super::item::Item;
use crate::domain::{CirculationError, ReturnCheck};

/// Consulted by `Item::return_` after the status guard passed.
pub trait ReturnPolicy: Send + Sync {
    fn check(&self, item: &Item, returned_by: Option<&str>) -> Result<(), CirculationError>;
}

/// Accept every return.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unchecked;

impl ReturnPolicy for Unchecked {
    fn check(&self, _item: &Item, _returned_by: Option<&str>) -> Result<(), CirculationError> {
        Ok(())
    }
}

/// Only the recorded borrower may return the item.
///
/// An anonymous return is rejected when a borrower is on record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameBorrower;

impl ReturnPolicy for SameBorrower {
    fn check(&self, item: &Item, returned_by: Option<&str>) -> Result<(), CirculationError> {
        match (item.borrower(), returned_by) {
            (None, _) => Ok(()),
            (Some(borrower), Some(user)) if borrower == user => Ok(()),
            (Some(borrower), user) => Err(CirculationError::BorrowerMismatch {
                entity: item.id().clone(),
                borrower: borrower.to_string(),
                returned_by: user.unwrap_or("anonymous").to_string(),
            }),
        }
    }
}

/// Built-in policy for a configured [`ReturnCheck`].
pub fn policy_for(check: ReturnCheck) -> Box<dyn ReturnPolicy> {
    match check {
        ReturnCheck::Unchecked => Box::new(Unchecked),
        ReturnCheck::SameBorrower => Box::new(SameBorrower),
    }
}
