//! Todo item domain model.
//!
//! # Responsibility
//! - Define the single record rendered and persisted by the list.
//! - Provide the fixed seed set used when no record exists yet.
//!
//! # Invariants
//! - `id` is assigned at creation and never reassigned.
//! - `text` blankness is checked by the producer, not by this type.
//! - Serialized field names match the persisted record (`isCompleted`).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identifier token for one todo item.
///
/// Kept as a plain string so records written with older id shapes still load.
pub type TodoId = String;

/// Labels of the default items shown on first launch.
pub const SEED_TEXTS: [&str; 3] = ["Set Env", "Create project", "Customize  structure"];

/// One task entry in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    /// Stable unique token within the list.
    pub id: TodoId,
    /// User-supplied label.
    pub text: String,
    /// Completion flag toggled by the user.
    pub is_completed: bool,
}

impl TodoItem {
    /// Creates an incomplete item with a freshly generated id.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(generate_todo_id(), text)
    }

    /// Creates an incomplete item with a caller-provided id.
    pub fn with_id(id: impl Into<TodoId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_completed: false,
        }
    }

    /// Returns a copy with the completion flag flipped.
    pub fn toggled(&self) -> Self {
        Self {
            is_completed: !self.is_completed,
            ..self.clone()
        }
    }
}

/// Generates a fresh item id.
pub fn generate_todo_id() -> TodoId {
    Uuid::new_v4().to_string()
}

/// Builds the seed list, each item with a fresh id.
pub fn seed_items() -> Vec<TodoItem> {
    SEED_TEXTS.iter().map(|text| TodoItem::new(*text)).collect()
}

/// Returns whether `text` is empty once surrounding whitespace is removed.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
