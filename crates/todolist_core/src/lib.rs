//! Core domain logic for the todo list.
//! This crate is the single source of truth for list invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::resolve_db_path;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::codec::{decode_todo_list, encode_todo_list, CodecError};
pub use model::todo::{TodoId, TodoItem, SEED_TEXTS};
pub use repo::kv_repo::{
    InMemoryKeyValueStore, KeyValueStore, RepoError, RepoResult, SqliteKeyValueStore,
};
pub use service::todo_store::{
    LoadSource, MutationOutcome, PersistStatus, StoreResult, TodoStore, TodoStoreError,
    STORAGE_KEY,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
