//! Record identifiers.
//!
//! Identity is owned by an external persistent-identifier service, so the core
//! treats ids as opaque strings. Generated ids carry a kind prefix followed by
//! a ULID (see `ports::id_generator`), which keeps them sortable by creation
//! time without coordination between nodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Opaque identifier of a stored record (item or location).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Build a `<prefix><ulid>` id, e.g. `item-01HV...`.
    pub fn from_ulid(kind: RecordKind, ulid: Ulid) -> Self {
        Self(format!("{}{}", kind.prefix(), ulid))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Kind of record an id is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Item,
    Location,
}

impl RecordKind {
    /// Display prefix used for generated ids.
    pub fn prefix(self) -> &'static str {
        match self {
            RecordKind::Item => "item-",
            RecordKind::Location => "loc-",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_kind_prefix() {
        let ulid = Ulid::new();

        let item = RecordId::from_ulid(RecordKind::Item, ulid);
        let location = RecordId::from_ulid(RecordKind::Location, ulid);

        assert_eq!(item.as_str(), format!("item-{ulid}"));
        assert!(location.to_string().starts_with("loc-"));
        assert_ne!(item, location);
    }

    #[test]
    fn ulid_ids_are_sortable() {
        let id1 = RecordId::from_ulid(RecordKind::Item, Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = RecordId::from_ulid(RecordKind::Item, Ulid::new());

        assert!(id1 < id2);
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = RecordId::from("item-1");

        let s = serde_json::to_string(&id).unwrap();
        assert_eq!(s, "\"item-1\"");
    }
}
