//! Circulation status of an item.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of a circulation item.
///
/// State transitions:
/// - OnShelf -> OnLoan (borrow) -> OnShelf (return)
/// - OnShelf -> InTransit (transfer) -> OnShelf (receive)
/// - OnLoan -> Lost (mark_lost) -> OnShelf (found)
///
/// Serialized in snake_case (`on_shelf`), displayed as `ON_SHELF`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CirculationStatus {
    /// Available at its location.
    #[default]
    OnShelf,

    /// Lent to a borrower.
    OnLoan,

    /// Travelling between locations.
    InTransit,

    /// Reported lost.
    Lost,
}

impl CirculationStatus {
    pub const ALL: [CirculationStatus; 4] = [
        CirculationStatus::OnShelf,
        CirculationStatus::OnLoan,
        CirculationStatus::InTransit,
        CirculationStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CirculationStatus::OnShelf => "ON_SHELF",
            CirculationStatus::OnLoan => "ON_LOAN",
            CirculationStatus::InTransit => "IN_TRANSIT",
            CirculationStatus::Lost => "LOST",
        }
    }

    /// Can the item be handed to a borrower right now?
    pub fn is_available(self) -> bool {
        matches!(self, CirculationStatus::OnShelf)
    }
}

impl fmt::Display for CirculationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown circulation status '{0}'")]
pub struct ParseStatusError(String);

impl FromStr for CirculationStatus {
    type Err = ParseStatusError;

    /// Accepts both `ON_LOAN` and `on_loan`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        CirculationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}
