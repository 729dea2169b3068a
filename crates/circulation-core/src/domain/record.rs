//! Stored records: a typed core plus an open extension map.
//!
//! The core (`id`, `revision`, `circulation`) is what the transition logic
//! needs typed access to. Everything else the caller supplies (including
//! `$schema`) lives in the extension map and is carried through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::CirculationError;
use super::ids::RecordId;
use super::state::CirculationStatus;

/// Name of the circulation sub-record.
pub const CIRCULATION_FIELD: &str = "circulation";

/// Name of the schema tag field.
pub const SCHEMA_FIELD: &str = "$schema";

/// Keys owned by the store; callers may not supply them as data.
const RESERVED_FIELDS: [&str; 2] = ["id", "revision"];

/// The `circulation` sub-record of an item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Circulation {
    #[serde(default)]
    pub status: CirculationStatus,

    /// Set only while the item is on loan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub borrower: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    /// Location the item sits at, or travels to while in transit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<RecordId>,
}

impl Circulation {
    pub fn with_status(status: CirculationStatus) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }
}

/// A record as held by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,

    /// Bumped by the store on every successful write.
    #[serde(default)]
    revision: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    circulation: Option<Circulation>,

    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            revision: 0,
            circulation: None,
            fields: Map::new(),
        }
    }

    /// Build a record from caller data.
    ///
    /// A `circulation` key is parsed into the typed sub-record; a missing
    /// `status` inside it defaults to `on_shelf`.
    pub fn from_data(id: RecordId, data: Map<String, Value>) -> Result<Self, CirculationError> {
        let mut record = Self::new(id);
        record.merge_data(data)?;
        Ok(record)
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Store adapters set this when they persist the record.
    pub fn set_revision(&mut self, revision: u64) {
        self.revision = revision;
    }

    pub fn circulation(&self) -> Option<&Circulation> {
        self.circulation.as_ref()
    }

    pub fn status(&self) -> Option<CirculationStatus> {
        self.circulation.as_ref().map(|c| c.status)
    }

    pub(crate) fn set_circulation(&mut self, circulation: Option<Circulation>) {
        self.circulation = circulation;
    }

    /// Extension fields (everything except the typed core).
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn schema(&self) -> Option<&str> {
        self.fields.get(SCHEMA_FIELD).and_then(Value::as_str)
    }

    /// Value of a top-level field, `circulation` included.
    pub fn field(&self, name: &str) -> Option<Value> {
        if name == CIRCULATION_FIELD {
            return self
                .circulation
                .as_ref()
                .and_then(|c| serde_json::to_value(c).ok());
        }
        self.fields.get(name).cloned()
    }

    pub fn has_field(&self, name: &str) -> bool {
        if name == CIRCULATION_FIELD {
            self.circulation.is_some()
        } else {
            self.fields.contains_key(name)
        }
    }

    /// Set `name` only if the record does not carry it yet.
    pub fn set_default(&mut self, name: &str, value: Value) {
        self.fields.entry(name.to_string()).or_insert(value);
    }

    /// Overwrite fields with caller data, `circulation` included.
    ///
    /// Validation happens before anything is written, so a rejected patch
    /// leaves the record as it was.
    pub fn merge_data(&mut self, data: Map<String, Value>) -> Result<(), CirculationError> {
        if let Some(key) = data.keys().find(|k| RESERVED_FIELDS.contains(&k.as_str())) {
            return Err(CirculationError::InvalidRecord(format!(
                "field '{key}' is managed by the record store"
            )));
        }

        let mut data = data;
        let circulation = match data.remove(CIRCULATION_FIELD) {
            None => None,
            Some(Value::Null) => Some(None),
            Some(value) => {
                let parsed: Circulation = serde_json::from_value(value).map_err(|e| {
                    CirculationError::InvalidRecord(format!("{CIRCULATION_FIELD}: {e}"))
                })?;
                Some(Some(parsed))
            }
        };

        if let Some(circulation) = circulation {
            self.circulation = circulation;
        }
        self.fields.extend(data);
        Ok(())
    }

    /// Copy the named fields that exist on this record.
    ///
    /// Names that are absent are skipped silently.
    pub fn snapshot<'a, I>(&self, names: I) -> FieldSnapshot
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut entries = Vec::new();
        for name in names {
            let value = if name == CIRCULATION_FIELD {
                self.circulation.clone().map(FieldValue::Circulation)
            } else {
                self.fields.get(name).cloned().map(FieldValue::Extension)
            };
            if let Some(value) = value {
                entries.push((name.to_string(), value));
            }
        }
        FieldSnapshot { entries }
    }

    /// Write every snapshotted field back, replacing whatever is there.
    pub fn restore(&mut self, snapshot: &FieldSnapshot) {
        for (name, value) in &snapshot.entries {
            match value {
                FieldValue::Circulation(c) => self.circulation = Some(c.clone()),
                FieldValue::Extension(v) => {
                    self.fields.insert(name.clone(), v.clone());
                }
            }
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Field values copied out of a record by [`Record::snapshot`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldSnapshot {
    entries: Vec<(String, FieldValue)>,
}

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Circulation(Circulation),
    Extension(Value),
}

impl FieldSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn from_data_parses_circulation_and_keeps_extensions() {
        let record = Record::from_data(
            RecordId::from("item-1"),
            data(json!({
                "title": "Dune",
                "circulation": { "status": "on_loan", "borrower": "alice" }
            })),
        )
        .unwrap();

        assert_eq!(record.status(), Some(CirculationStatus::OnLoan));
        assert_eq!(
            record.circulation().and_then(|c| c.borrower.as_deref()),
            Some("alice")
        );
        assert_eq!(record.fields()["title"], "Dune");
        assert!(!record.fields().contains_key(CIRCULATION_FIELD));
    }

    #[test]
    fn circulation_without_status_defaults_to_on_shelf() {
        let record = Record::from_data(
            RecordId::from("item-1"),
            data(json!({ "circulation": { "location": "loc-1" } })),
        )
        .unwrap();

        assert_eq!(record.status(), Some(CirculationStatus::OnShelf));
    }

    #[test]
    fn reserved_fields_are_rejected() {
        let err = Record::from_data(RecordId::from("item-1"), data(json!({ "revision": 7 })))
            .unwrap_err();

        assert!(matches!(err, CirculationError::InvalidRecord(msg) if msg.contains("revision")));
    }

    #[test]
    fn malformed_circulation_leaves_record_untouched() {
        let mut record =
            Record::from_data(RecordId::from("item-1"), data(json!({ "title": "Dune" }))).unwrap();

        let err = record
            .merge_data(data(json!({ "title": "Emma", "circulation": { "status": "draft" } })))
            .unwrap_err();

        assert!(matches!(err, CirculationError::InvalidRecord(_)));
        assert_eq!(record.fields()["title"], "Dune");
    }

    #[test]
    fn set_default_does_not_overwrite() {
        let mut record = Record::from_data(
            RecordId::from("item-1"),
            data(json!({ "$schema": "caller.json" })),
        )
        .unwrap();

        record.set_default(SCHEMA_FIELD, json!("configured.json"));
        assert_eq!(record.schema(), Some("caller.json"));
    }

    #[test]
    fn snapshot_skips_absent_fields_and_restores_present_ones() {
        let mut record = Record::from_data(
            RecordId::from("item-1"),
            data(json!({ "title": "Dune", "circulation": { "status": "on_shelf" } })),
        )
        .unwrap();

        let snapshot = record.snapshot([CIRCULATION_FIELD, "title", "missing"]);
        assert_eq!(snapshot.len(), 2);
        assert!(!snapshot.contains("missing"));

        record
            .merge_data(data(json!({
                "title": "Changed",
                "circulation": { "status": "lost" }
            })))
            .unwrap();
        record.restore(&snapshot);

        assert_eq!(record.fields()["title"], "Dune");
        assert_eq!(record.status(), Some(CirculationStatus::OnShelf));
        assert!(!record.has_field("missing"));
    }

    #[test]
    fn serializes_flat() {
        let mut record = Record::from_data(
            RecordId::from("item-1"),
            data(json!({ "title": "Dune", "circulation": {} })),
        )
        .unwrap();
        record.set_revision(3);

        let value = record.to_value();
        assert_eq!(value["id"], "item-1");
        assert_eq!(value["revision"], 3);
        assert_eq!(value["title"], "Dune");
        assert_eq!(value["circulation"]["status"], "on_shelf");

        let back: Record = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
