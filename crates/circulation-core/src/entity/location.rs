//! Location entity: a physical site items are held at.
//!
//! No status machine of its own.

use serde_json::{Map, Value};

use crate::domain::{
    CIRCULATION_FIELD, CirculationConfig, CirculationError, Record, RecordId, SCHEMA_FIELD,
};
use crate::ports::RecordStore;
use crate::transition::Entity;

#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    record: Record,
}

impl Location {
    /// Create and store a new location; `$schema` defaults to
    /// `location_default_schema` when the data has none.
    pub fn create(
        store: &dyn RecordStore,
        config: &CirculationConfig,
        id: RecordId,
        data: Map<String, Value>,
    ) -> Result<Self, CirculationError> {
        reject_circulation(&data)?;
        let mut record = Record::from_data(id, data)?;
        if let Some(schema) = &config.location_default_schema {
            record.set_default(SCHEMA_FIELD, Value::String(schema.clone()));
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

    pub fn name(&self) -> Option<&str> {
        self.record.fields().get("name").and_then(Value::as_str)
    }

    pub fn update(
        &mut self,
        store: &dyn RecordStore,
        data: Map<String, Value>,
    ) -> Result<Location, CirculationError> {
        reject_circulation(&data)?;
        let mut next = self.record.clone();
        next.merge_data(data)?;

        let persisted = Location::from_record(store.replace(next)?);
        *self = persisted.clone();
        Ok(persisted)
    }
}

impl Entity for Location {
    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}

fn reject_circulation(data: &Map<String, Value>) -> Result<(), CirculationError> {
    if data.contains_key(CIRCULATION_FIELD) {
        return Err(CirculationError::InvalidRecord(
            "locations have no circulation state".to_string(),
        ));
    }
    Ok(())
}
