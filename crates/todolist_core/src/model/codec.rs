//! Persisted record codec for the todo list.
//!
//! # Responsibility
//! - Encode the full ordered list into one textual JSON record.
//! - Decode the record back into an equivalent ordered list.
//!
//! # Invariants
//! - Encoding is lossless and order-preserving.
//! - Decoding rejects records that break id uniqueness.
//!
//! Record shape: `[{"id": "...", "text": "...", "isCompleted": false}, ...]`.

use crate::model::todo::TodoItem;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

/// Failure while encoding or decoding the persisted record.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
    DuplicateId(String),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed todo record: {err}"),
            Self::DuplicateId(id) => write!(f, "malformed todo record: duplicate id `{id}`"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Serializes the full list into its record form.
pub fn encode_todo_list(items: &[TodoItem]) -> CodecResult<String> {
    Ok(serde_json::to_string(items)?)
}

/// Parses a record back into an ordered list.
pub fn decode_todo_list(record: &str) -> CodecResult<Vec<TodoItem>> {
    let items: Vec<TodoItem> = serde_json::from_str(record)?;

    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if !seen.insert(item.id.as_str()) {
            return Err(CodecError::DuplicateId(item.id.clone()));
        }
    }

    Ok(items)
}
