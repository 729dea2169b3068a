//! Deployment configuration.
//!
//! Passed explicitly to the builder; the core never reads global state.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::CirculationError;

/// Named options consumed by the lifecycle operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CirculationConfig {
    /// `$schema` applied to new items whose data omits one.
    pub item_default_schema: Option<String>,

    /// `$schema` applied to new locations whose data omits one.
    pub location_default_schema: Option<String>,

    /// Built-in policy consulted on return.
    pub return_check: ReturnCheck,

    /// Lifecycle operations this deployment does not offer.
    pub disabled_operations: Vec<LifecycleAction>,
}

impl CirculationConfig {
    pub fn with_item_schema(mut self, schema: impl Into<String>) -> Self {
        self.item_default_schema = Some(schema.into());
        self
    }

    pub fn with_location_schema(mut self, schema: impl Into<String>) -> Self {
        self.location_default_schema = Some(schema.into());
        self
    }

    pub fn with_return_check(mut self, check: ReturnCheck) -> Self {
        self.return_check = check;
        self
    }

    pub fn disable(mut self, action: LifecycleAction) -> Self {
        if !self.disabled_operations.contains(&action) {
            self.disabled_operations.push(action);
        }
        self
    }

    pub fn is_enabled(&self, action: LifecycleAction) -> bool {
        !self.disabled_operations.contains(&action)
    }

    /// Fails with `UnsupportedOperation` when `action` is disabled.
    pub fn ensure_enabled(&self, action: LifecycleAction) -> Result<(), CirculationError> {
        if self.is_enabled(action) {
            Ok(())
        } else {
            Err(CirculationError::UnsupportedOperation { operation: action })
        }
    }
}

/// Whether a return must come from the recorded borrower.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCheck {
    #[default]
    Unchecked,
    SameBorrower,
}

/// Lifecycle operations that can be switched off per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    Borrow,
    Return,
    Transfer,
    Receive,
    MarkLost,
    Found,
    Update,
}

impl LifecycleAction {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleAction::Borrow => "borrow",
            LifecycleAction::Return => "return",
            LifecycleAction::Transfer => "transfer",
            LifecycleAction::Receive => "receive",
            LifecycleAction::MarkLost => "mark_lost",
            LifecycleAction::Found => "found",
            LifecycleAction::Update => "update",
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_enables_everything() {
        let config = CirculationConfig::default();

        assert_eq!(config.item_default_schema, None);
        assert_eq!(config.return_check, ReturnCheck::Unchecked);
        assert!(config.is_enabled(LifecycleAction::Borrow));
        assert!(config.ensure_enabled(LifecycleAction::Found).is_ok());
    }

    #[test]
    fn disabled_action_is_unsupported() {
        let config = CirculationConfig::default()
            .disable(LifecycleAction::Transfer)
            .disable(LifecycleAction::Transfer);

        assert_eq!(config.disabled_operations.len(), 1);
        let err = config.ensure_enabled(LifecycleAction::Transfer).unwrap_err();
        assert!(matches!(
            err,
            CirculationError::UnsupportedOperation {
                operation: LifecycleAction::Transfer
            }
        ));
    }

    #[test]
    fn deserializes_partial_config() {
        let json = r#"
        {
          "item_default_schema": "https://example.org/schemas/item-v1.0.0.json",
          "return_check": "same_borrower",
          "disabled_operations": ["mark_lost"]
        }"#;
        let config: CirculationConfig = serde_json::from_str(json).unwrap();

        assert_eq!(
            config.item_default_schema.as_deref(),
            Some("https://example.org/schemas/item-v1.0.0.json")
        );
        assert_eq!(config.location_default_schema, None);
        assert_eq!(config.return_check, ReturnCheck::SameBorrower);
        assert!(!config.is_enabled(LifecycleAction::MarkLost));
    }
}
