//! Runtime configuration resolution.
//!
//! # Responsibility
//! - Resolve where the key-value database lives for FFI and CLI callers.
//!
//! # Invariants
//! - Resolution never fails; a blank override falls back to the default.

use std::path::PathBuf;

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "TODOLIST_DB_PATH";

/// Default database file name under the system temp directory.
pub const DB_FILE_NAME: &str = "todolist.sqlite3";

/// Resolves the database path from `TODOLIST_DB_PATH` or the default.
pub fn resolve_db_path() -> PathBuf {
    db_path_from(std::env::var(DB_PATH_ENV).ok().as_deref())
}

/// Resolves the database path from an optional raw override.
pub fn db_path_from(raw: Option<&str>) -> PathBuf {
    match raw.map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => PathBuf::from(trimmed),
        _ => std::env::temp_dir().join(DB_FILE_NAME),
    }
}
