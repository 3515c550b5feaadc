//! Core data shapes shared by every layer.

use serde::{Deserialize, Serialize};

/// A single configuration value.
///
/// Objects are branches of the state tree; every other variant (arrays
/// included) is a leaf. File handles are carried as path strings.
pub use serde_json::Value;

/// Tree-shaped configuration, keyed by plain segment names.
pub type NestedState = serde_json::Map<String, Value>;

/// One entry per leaf, keyed by dot-joined paths. Values are never objects.
pub type FlatState = serde_json::Map<String, Value>;

/// Separator between path segments.
pub const PATH_SEPARATOR: char = '.';

/// Notification delivered to the binder's listener.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    /// Path of the node whose value changed.
    pub field: String,
    /// The node's value after the change.
    pub data: Value,
}

impl StateChange {
    pub fn new(field: impl Into<String>, data: Value) -> Self {
        Self {
            field: field.into(),
            data,
        }
    }
}

/// Builds a nested state from a `serde_json::json!` object literal.
///
/// Non-object values yield an empty state.
pub fn nested(value: Value) -> NestedState {
    match value {
        Value::Object(map) => map,
        _ => NestedState::new(),
    }
}
