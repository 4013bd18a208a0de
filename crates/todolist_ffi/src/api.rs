//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the todo list use-cases to Dart via FRB.
//! - Own the one process-wide store and serialize access to it.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Storage-touching calls are not `sync`, so FRB runs them off the UI
//!   thread; the store mutex keeps them in one-at-a-time order.
//! - `todo_snapshot` runs on the UI thread and never waits on that mutex; it
//!   falls back to the last snapshot published by a storage call.
//! - A poisoned store lock is recovered: the store is consistent between
//!   calls because mutations assign the list before persisting.
//! - Load and persist failures are reported in `message`, never as `ok=false`.

use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError, RwLock, TryLockError};
use todolist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    resolve_db_path, LoadSource, MutationOutcome, PersistStatus, SqliteKeyValueStore, TodoItem,
    TodoStore,
};

type SharedStore = TodoStore<SqliteKeyValueStore>;

static TODO_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static TODO_STORE: Mutex<Option<SharedStore>> = Mutex::new(None);
static LAST_SNAPSHOT: RwLock<Option<TodoSnapshotResponse>> = RwLock::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row rendered by the list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItemView {
    pub id: String,
    pub text: String,
    pub is_completed: bool,
}

/// Full list state returned by every todo call.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoSnapshotResponse {
    /// `false` only when the call could not reach a loaded store.
    pub ok: bool,
    /// Items in display order.
    pub items: Vec<TodoItemView>,
    /// Completed fraction in `[0, 1]`.
    pub progress: f64,
    /// Human-readable diagnostics; empty on a clean call.
    pub message: String,
}

impl TodoSnapshotResponse {
    fn from_store(store: &SharedStore, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            items: store.items().iter().map(to_item_view).collect(),
            progress: store.progress(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            progress: 0.0,
            message: message.into(),
        }
    }
}

/// Loads the persisted list once per process.
///
/// # FFI contract
/// - Async call (runs on the FRB worker pool), DB-backed.
/// - Repeated calls return the current snapshot without reloading.
/// - A malformed record yields `ok=true`, an empty list and a diagnostic message.
/// - Never panics.
pub fn todo_load() -> TodoSnapshotResponse {
    let mut guard = lock_store();
    if let Some(store) = guard.as_ref() {
        return publish(TodoSnapshotResponse::from_store(store, ""));
    }

    let db_path = resolve_todo_db_path();
    let storage = match SqliteKeyValueStore::open(&db_path) {
        Ok(storage) => storage,
        Err(err) => return TodoSnapshotResponse::failure(format!("todo_load failed: {err}")),
    };

    let mut store = TodoStore::new(storage);
    let message = match store.load() {
        Ok(LoadSource::Restored)
        | Ok(LoadSource::Seeded(PersistStatus::Saved | PersistStatus::Skipped)) => String::new(),
        Ok(LoadSource::Seeded(PersistStatus::Failed(reason))) => {
            format!("todo_load not saved: {reason}")
        }
        Ok(LoadSource::Failed(err)) => format!("todo_load degraded: {err}"),
        Err(err) => return TodoSnapshotResponse::failure(format!("todo_load failed: {err}")),
    };
    let response = publish(TodoSnapshotResponse::from_store(&store, message));
    *guard = Some(store);
    response
}

/// Appends an item; blank text leaves the list unchanged.
///
/// # FFI contract
/// - Async call, DB-backed. Requires a prior `todo_load`.
/// - Never panics.
pub fn todo_add(text: String) -> TodoSnapshotResponse {
    with_store("todo_add", |store| store.add(&text))
}

/// Toggles completion of one item; unknown ids leave the list unchanged.
///
/// # FFI contract
/// - Async call, DB-backed. Requires a prior `todo_load`.
/// - Never panics.
pub fn todo_toggle(id: String) -> TodoSnapshotResponse {
    with_store("todo_toggle", |store| store.toggle_complete(&id))
}

/// Deletes one item; unknown ids leave the list unchanged.
///
/// # FFI contract
/// - Async call, DB-backed. Requires a prior `todo_load`.
/// - Never panics.
pub fn todo_delete(id: String) -> TodoSnapshotResponse {
    with_store("todo_delete", |store| store.delete(&id))
}

/// Returns the current in-memory list without touching storage.
///
/// # FFI contract
/// - Sync call, memory-only, never blocks on in-flight storage calls.
/// - While a storage call holds the store, returns the last published
///   snapshot (the state before that call).
/// - `ok=false` before `todo_load`.
#[flutter_rust_bridge::frb(sync)]
pub fn todo_snapshot() -> TodoSnapshotResponse {
    match TODO_STORE.try_lock() {
        Ok(guard) => snapshot_of(guard.as_ref()),
        Err(TryLockError::Poisoned(poisoned)) => {
            let guard = recover_store(poisoned);
            snapshot_of(guard.as_ref())
        }
        Err(TryLockError::WouldBlock) => last_snapshot(),
    }
}

fn with_store(
    operation: &'static str,
    mutate: impl FnOnce(&mut SharedStore) -> todolist_core::StoreResult<MutationOutcome>,
) -> TodoSnapshotResponse {
    let mut guard = lock_store();
    let Some(store) = guard.as_mut() else {
        return TodoSnapshotResponse::failure(format!(
            "{operation} failed: todo store is not loaded yet"
        ));
    };

    match mutate(&mut *store) {
        Ok(outcome) => {
            let message = match outcome.persist {
                PersistStatus::Failed(reason) => format!("{operation} not saved: {reason}"),
                PersistStatus::Saved | PersistStatus::Skipped => String::new(),
            };
            publish(TodoSnapshotResponse::from_store(store, message))
        }
        Err(err) => TodoSnapshotResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn lock_store() -> MutexGuard<'static, Option<SharedStore>> {
    TODO_STORE.lock().unwrap_or_else(recover_store)
}

fn recover_store(
    poisoned: PoisonError<MutexGuard<'static, Option<SharedStore>>>,
) -> MutexGuard<'static, Option<SharedStore>> {
    warn!("event=ffi_store_lock module=ffi status=recovered error_code=lock_poisoned");
    TODO_STORE.clear_poison();
    poisoned.into_inner()
}

fn snapshot_of(store: Option<&SharedStore>) -> TodoSnapshotResponse {
    match store {
        Some(store) => TodoSnapshotResponse::from_store(store, ""),
        None => TodoSnapshotResponse::failure("todo store is not loaded yet"),
    }
}

/// Records `response` as the latest state for `todo_snapshot` fallbacks.
///
/// Called while the store lock is still held, so published snapshots follow
/// call order.
fn publish(response: TodoSnapshotResponse) -> TodoSnapshotResponse {
    let mut last = LAST_SNAPSHOT
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *last = Some(TodoSnapshotResponse {
        message: String::new(),
        ..response.clone()
    });
    response
}

fn last_snapshot() -> TodoSnapshotResponse {
    let last = LAST_SNAPSHOT.read().unwrap_or_else(PoisonError::into_inner);
    match last.as_ref() {
        Some(snapshot) => snapshot.clone(),
        None => TodoSnapshotResponse::failure("todo store is still loading"),
    }
}

fn resolve_todo_db_path() -> PathBuf {
    TODO_DB_PATH.get_or_init(resolve_db_path).clone()
}

fn to_item_view(item: &TodoItem) -> TodoItemView {
    TodoItemView {
        id: item.id.clone(),
        text: item.text.clone(),
        is_completed: item.is_completed,
    }
}
