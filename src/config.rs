//! Mock handler configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a [`Mocks`](crate::mocks::Mocks) handler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MocksConfig {
    /// Optional label attached to log spans of this handler.
    pub label: Option<String>,
    /// Verify unmet cardinalities when the handler is dropped.
    pub verify_on_drop: bool,
}

impl Default for MocksConfig {
    fn default() -> Self {
        Self {
            label: None,
            verify_on_drop: true,
        }
    }
}

impl MocksConfig {
    /// Set log label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set drop-time verification.
    pub fn with_verify_on_drop(mut self, verify_on_drop: bool) -> Self {
        self.verify_on_drop = verify_on_drop;
        self
    }
}
