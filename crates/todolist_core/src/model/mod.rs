//! Domain model for the todo list.
//!
//! # Responsibility
//! - Define the canonical item shape shared by store, FFI and CLI.
//! - Own the textual record format used for persistence.
//!
//! # Invariants
//! - Every item is identified by a stable `TodoId`.
//! - Deletion is a hard removal from the list; no tombstones.

pub mod codec;
pub mod todo;
