//! CirculationService - lifecycle operations over the record store.
//!
//! Wires entities, store, clock, id generator and return policy together and
//! serializes writers per record id.

use std::sync::Arc;

use serde_json::{Map, Value};

use super::locks::KeyedLocks;
use crate::domain::{
    CIRCULATION_FIELD, CirculationConfig, CirculationError, LifecycleAction, RecordId, RecordKind,
};
use crate::entity::{BorrowRequest, Item, Location, ReturnPolicy};
use crate::ports::{Clock, IdGenerator, RecordStore};

/// Entry point for callers: create, borrow, return, transfer, ...
///
/// `Send + Sync`; share it behind an `Arc`.
pub struct CirculationService {
    pub(super) store: Arc<dyn RecordStore>,
    pub(super) config: CirculationConfig,
    pub(super) clock: Arc<dyn Clock>,
    pub(super) ids: Arc<dyn IdGenerator>,
    pub(super) return_policy: Arc<dyn ReturnPolicy>,
    pub(super) locks: KeyedLocks,
}

impl CirculationService {
    pub fn config(&self) -> &CirculationConfig {
        &self.config
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Create an item. Without an id, one is generated (`item-<ulid>`).
    ///
    /// A `circulation.location` in the data must name an existing location.
    pub fn create_item(
        &self,
        id: Option<RecordId>,
        data: Map<String, Value>,
    ) -> Result<Item, CirculationError> {
        if let Some(location) = referenced_location(&data) {
            self.ensure_location(&location)?;
        }
        let id = id.unwrap_or_else(|| self.ids.generate(RecordKind::Item));
        Item::create(self.store.as_ref(), &self.config, id, data)
    }

    /// Create a location. Without an id, one is generated (`loc-<ulid>`).
    pub fn create_location(
        &self,
        id: Option<RecordId>,
        data: Map<String, Value>,
    ) -> Result<Location, CirculationError> {
        let id = id.unwrap_or_else(|| self.ids.generate(RecordKind::Location));
        Location::create(self.store.as_ref(), &self.config, id, data)
    }

    pub fn item(&self, id: &RecordId) -> Result<Item, CirculationError> {
        Ok(Item::from_record(self.store.get(id)?))
    }

    pub fn location(&self, id: &RecordId) -> Result<Location, CirculationError> {
        Ok(Location::from_record(self.store.get(id)?))
    }

    pub fn borrow(
        &self,
        id: &RecordId,
        request: impl Into<BorrowRequest>,
    ) -> Result<Item, CirculationError> {
        let request = request.into();
        self.with_item(LifecycleAction::Borrow, id, |item, store| {
            item.borrow(store, request)
        })
    }

    /// `returned_by` is only looked at by the return policy.
    pub fn return_(
        &self,
        id: &RecordId,
        returned_by: Option<&str>,
    ) -> Result<Item, CirculationError> {
        let policy = Arc::clone(&self.return_policy);
        self.with_item(LifecycleAction::Return, id, |item, store| {
            item.return_(store, policy.as_ref(), returned_by)
        })
    }

    pub fn transfer(&self, id: &RecordId, destination: &RecordId) -> Result<Item, CirculationError> {
        self.config.ensure_enabled(LifecycleAction::Transfer)?;
        self.ensure_location(destination)?;
        self.with_item(LifecycleAction::Transfer, id, |item, store| {
            item.transfer(store, destination.clone())
        })
    }

    pub fn receive(&self, id: &RecordId) -> Result<Item, CirculationError> {
        self.with_item(LifecycleAction::Receive, id, |item, store| item.receive(store))
    }

    pub fn mark_lost(&self, id: &RecordId) -> Result<Item, CirculationError> {
        self.with_item(LifecycleAction::MarkLost, id, |item, store| {
            item.mark_lost(store)
        })
    }

    pub fn found(&self, id: &RecordId) -> Result<Item, CirculationError> {
        self.with_item(LifecycleAction::Found, id, |item, store| item.found(store))
    }

    pub fn update_item(
        &self,
        id: &RecordId,
        data: Map<String, Value>,
    ) -> Result<Item, CirculationError> {
        self.with_item(LifecycleAction::Update, id, |item, store| {
            item.update(store, data)
        })
    }

    pub fn update_location(
        &self,
        id: &RecordId,
        data: Map<String, Value>,
    ) -> Result<Location, CirculationError> {
        self.config.ensure_enabled(LifecycleAction::Update)?;
        self.locks.with(id, || {
            let mut location = self.location(id)?;
            location.update(self.store.as_ref(), data)
        })
    }

    /// Is the item past its stored due date, by the service clock?
    pub fn overdue(&self, id: &RecordId) -> Result<bool, CirculationError> {
        Ok(self.item(id)?.overdue(self.clock.as_ref()))
    }

    /// The record must exist and be a location, not an item.
    fn ensure_location(&self, id: &RecordId) -> Result<(), CirculationError> {
        let record = self.store.get(id)?;
        if record.circulation().is_some() {
            return Err(CirculationError::InvalidRecord(format!(
                "{id} is not a location"
            )));
        }
        Ok(())
    }

    fn with_item<F>(
        &self,
        action: LifecycleAction,
        id: &RecordId,
        f: F,
    ) -> Result<Item, CirculationError>
    where
        F: FnOnce(&mut Item, &dyn RecordStore) -> Result<Item, CirculationError>,
    {
        self.config.ensure_enabled(action)?;
        self.locks.with(id, || {
            let mut item = self.item(id)?;
            f(&mut item, self.store.as_ref())
        })
    }
}

fn referenced_location(data: &Map<String, Value>) -> Option<RecordId> {
    data.get(CIRCULATION_FIELD)?
        .get("location")?
        .as_str()
        .map(RecordId::from)
}
