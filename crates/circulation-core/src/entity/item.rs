//! Item entity and its lifecycle operations.
//!
//! Every state change goes through the same shape:
//! guard(required status) -> compute next circulation -> preserve(circulation)
//! around the store write. The preserve step matters because the store hands
//! back a new record object, and adapters are free to drop or rewrite fields
//! they do not know about.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::policy::ReturnPolicy;
use crate::domain::{
    Circulation, CirculationConfig, CirculationError, CirculationStatus, Record, RecordId,
    SCHEMA_FIELD,
};
use crate::ports::{Clock, RecordStore};
use crate::transition::{Entity, Operation, PreserveFields, guard};

/// A circulation item (e.g. a book copy).
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    record: Record,
}

/// Who borrows, and optionally until when.
///
/// The core stores the due date; computing it is loan policy and lives with
/// the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowRequest {
    pub user: String,
    pub due_date: Option<DateTime<Utc>>,
}

impl BorrowRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            due_date: None,
        }
    }

    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

impl From<&str> for BorrowRequest {
    fn from(user: &str) -> Self {
        Self::new(user)
    }
}

impl From<String> for BorrowRequest {
    fn from(user: String) -> Self {
        Self::new(user)
    }
}

impl Item {
    /// Create and store a new item.
    ///
    /// Caller data wins over every default: `$schema` comes from
    /// `item_default_schema` only when the data has none, and the status is
    /// `on_shelf` only when the data carries no circulation of its own.
    pub fn create(
        store: &dyn RecordStore,
        config: &CirculationConfig,
        id: RecordId,
        data: Map<String, Value>,
    ) -> Result<Self, CirculationError> {
        let mut record = Record::from_data(id, data)?;
        if let Some(schema) = &config.item_default_schema {
            record.set_default(SCHEMA_FIELD, Value::String(schema.clone()));
        }
        match record.circulation() {
            None => record.set_circulation(Some(Circulation::default())),
            Some(c) => check_loan_fields(record.id(), c)?,
        }

        let created = store.create(record)?;
        Ok(Self::from_record(created))
    }

    pub fn from_record(record: Record) -> Self {
        Self { record }
    }

    pub fn into_record(self) -> Record {
        self.record
    }

    pub fn id(&self) -> &RecordId {
        self.record.id()
    }

    pub fn status(&self) -> Option<CirculationStatus> {
        self.record.status()
    }

    pub fn borrower(&self) -> Option<&str> {
        self.record.circulation().and_then(|c| c.borrower.as_deref())
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.record.circulation().and_then(|c| c.due_date)
    }

    pub fn location(&self) -> Option<&RecordId> {
        self.record.circulation().and_then(|c| c.location.as_ref())
    }

    /// Is the stored due date behind `now`? Items without one are never overdue.
    pub fn overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.due_date().is_some_and(|due| now > due)
    }

    pub fn overdue(&self, clock: &dyn Clock) -> bool {
        self.overdue_at(clock.now())
    }

    /// ON_SHELF -> ON_LOAN.
    pub fn borrow(
        &mut self,
        store: &dyn RecordStore,
        request: BorrowRequest,
    ) -> Result<Item, CirculationError> {
        let BorrowRequest { user, due_date } = request;
        guard(
            CirculationStatus::OnShelf,
            |item: &mut Item| -> Result<Item, CirculationError> {
                commit(item, store, |c| {
                    c.status = CirculationStatus::OnLoan;
                    c.borrower = Some(user);
                    c.due_date = due_date;
                })
            },
        )
        .call(self)
    }

    /// ON_LOAN -> ON_SHELF, after `policy` accepts the returning user.
    pub fn return_(
        &mut self,
        store: &dyn RecordStore,
        policy: &dyn ReturnPolicy,
        returned_by: Option<&str>,
    ) -> Result<Item, CirculationError> {
        guard(
            CirculationStatus::OnLoan,
            |item: &mut Item| -> Result<Item, CirculationError> {
                policy.check(item, returned_by)?;
                commit(item, store, |c| {
                    c.status = CirculationStatus::OnShelf;
                    c.borrower = None;
                    c.due_date = None;
                })
            },
        )
        .call(self)
    }

    /// ON_SHELF -> IN_TRANSIT towards `destination`.
    pub fn transfer(
        &mut self,
        store: &dyn RecordStore,
        destination: RecordId,
    ) -> Result<Item, CirculationError> {
        guard(
            CirculationStatus::OnShelf,
            |item: &mut Item| -> Result<Item, CirculationError> {
                commit(item, store, |c| {
                    c.status = CirculationStatus::InTransit;
                    c.location = Some(destination);
                })
            },
        )
        .call(self)
    }

    /// IN_TRANSIT -> ON_SHELF at the transfer destination.
    pub fn receive(&mut self, store: &dyn RecordStore) -> Result<Item, CirculationError> {
        guard(
            CirculationStatus::InTransit,
            |item: &mut Item| -> Result<Item, CirculationError> {
                commit(item, store, |c| c.status = CirculationStatus::OnShelf)
            },
        )
        .call(self)
    }

    /// ON_LOAN -> LOST. The loan ends here, so borrower and due date go too.
    pub fn mark_lost(&mut self, store: &dyn RecordStore) -> Result<Item, CirculationError> {
        guard(
            CirculationStatus::OnLoan,
            |item: &mut Item| -> Result<Item, CirculationError> {
                commit(item, store, |c| {
                    c.status = CirculationStatus::Lost;
                    c.borrower = None;
                    c.due_date = None;
                })
            },
        )
        .call(self)
    }

    /// LOST -> ON_SHELF.
    pub fn found(&mut self, store: &dyn RecordStore) -> Result<Item, CirculationError> {
        guard(
            CirculationStatus::Lost,
            |item: &mut Item| -> Result<Item, CirculationError> {
                commit(item, store, |c| {
                    c.status = CirculationStatus::OnShelf;
                    c.borrower = None;
                    c.due_date = None;
                })
            },
        )
        .call(self)
    }

    /// Edit descriptive fields. Any `circulation` in `data` is discarded:
    /// status only moves through the transitions above.
    pub fn update(
        &mut self,
        store: &dyn RecordStore,
        data: Map<String, Value>,
    ) -> Result<Item, CirculationError> {
        let mut next = PreserveFields::default()
            .onto_result(|item: &mut Item| -> Result<Item, CirculationError> {
                let mut next = item.clone();
                next.record.merge_data(data)?;
                Ok(next)
            })
            .call(self)?;

        let persisted = persist(&mut next, store)?;
        *self = persisted.clone();
        Ok(persisted)
    }
}

impl Entity for Item {
    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

/// Apply `change` to a copy of the item's circulation and persist the copy.
///
/// `item` is only overwritten once the store accepted the write, so a failed
/// write leaves the caller's entity as it was.
fn commit(
    item: &mut Item,
    store: &dyn RecordStore,
    change: impl FnOnce(&mut Circulation),
) -> Result<Item, CirculationError> {
    let mut next = item.clone();
    let mut circulation = next.record.circulation().cloned().unwrap_or_default();
    change(&mut circulation);
    next.record.set_circulation(Some(circulation));

    let persisted = persist(&mut next, store)?;
    *item = persisted.clone();
    Ok(persisted)
}

/// Write `next` and carry its circulation over to whatever the store returns.
fn persist(next: &mut Item, store: &dyn RecordStore) -> Result<Item, CirculationError> {
    PreserveFields::default()
        .onto_result(|next: &mut Item| -> Result<Item, CirculationError> {
            Ok(Item::from_record(store.replace(next.record.clone())?))
        })
        .call(next)
}

/// Borrower and due date belong to a loan; any other status must not carry them.
fn check_loan_fields(id: &RecordId, circulation: &Circulation) -> Result<(), CirculationError> {
    let has_loan_fields = circulation.borrower.is_some() || circulation.due_date.is_some();
    if has_loan_fields && circulation.status != CirculationStatus::OnLoan {
        return Err(CirculationError::InvalidRecord(format!(
            "{id}: borrower and due_date are only allowed while {}",
            CirculationStatus::OnLoan
        )));
    }
    Ok(())
}
