//! Todo list state holder synchronized with one persisted record.
//!
//! # Responsibility
//! - Own the authoritative in-memory list for the session.
//! - Load the persisted record once, then write the full list back after
//!   every mutation.
//! - Derive the completion progress on read.
//!
//! # Invariants
//! - Exactly one `load` per store; mutations before it are rejected.
//! - Item ids stay unique; insertion order is display and persistence order.
//! - Load and persist failures are logged and never roll back memory state.
//!
//! Item text is never written to logs.

use crate::model::codec::{decode_todo_list, encode_todo_list, CodecError};
use crate::model::todo::{is_blank, seed_items, TodoItem};
use crate::repo::kv_repo::{KeyValueStore, RepoError};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Fixed key of the one persisted record.
pub const STORAGE_KEY: &str = "TODO_LISTS";

pub type StoreResult<T> = Result<T, TodoStoreError>;

/// Store-level failures.
#[derive(Debug)]
pub enum TodoStoreError {
    /// A mutation arrived before `load`.
    NotLoaded,
    /// `load` was called a second time.
    AlreadyLoaded,
    /// Storage read failed.
    LoadRead(RepoError),
    /// Stored record could not be decoded.
    LoadDecode(CodecError),
    /// Current list could not be encoded.
    PersistEncode(CodecError),
    /// Storage write failed.
    PersistWrite(RepoError),
}

impl TodoStoreError {
    /// Returns whether this error belongs to the load path.
    pub fn is_load_failure(&self) -> bool {
        matches!(self, Self::LoadRead(_) | Self::LoadDecode(_))
    }

    /// Returns whether this error belongs to the persist path.
    pub fn is_persist_failure(&self) -> bool {
        matches!(self, Self::PersistEncode(_) | Self::PersistWrite(_))
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NotLoaded => "store_not_loaded",
            Self::AlreadyLoaded => "store_already_loaded",
            Self::LoadRead(_) => "load_read_failed",
            Self::LoadDecode(_) => "load_decode_failed",
            Self::PersistEncode(_) => "persist_encode_failed",
            Self::PersistWrite(_) => "persist_write_failed",
        }
    }
}

impl Display for TodoStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLoaded => write!(f, "todo store is not loaded yet"),
            Self::AlreadyLoaded => write!(f, "todo store is already loaded"),
            Self::LoadRead(err) => write!(f, "failed to read todo record: {err}"),
            Self::LoadDecode(err) => write!(f, "failed to load todo record: {err}"),
            Self::PersistEncode(err) => write!(f, "failed to encode todo record: {err}"),
            Self::PersistWrite(err) => write!(f, "failed to save todo record: {err}"),
        }
    }
}

impl Error for TodoStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::LoadRead(err) | Self::PersistWrite(err) => Some(err),
            Self::LoadDecode(err) | Self::PersistEncode(err) => Some(err),
            Self::NotLoaded | Self::AlreadyLoaded => None,
        }
    }
}

/// Where the list came from after `load`.
#[derive(Debug)]
pub enum LoadSource {
    /// Decoded from the persisted record.
    Restored,
    /// No record existed; the seed set was installed and written back.
    Seeded(PersistStatus),
    /// The record could not be read or decoded; the list stays empty.
    Failed(TodoStoreError),
}

/// Result of the persist side effect of a load or mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    /// Full list written.
    Saved,
    /// Mutation was a boundary no-op; nothing written.
    Skipped,
    /// Write failed; memory state was kept.
    Failed(String),
}

/// Report returned by every mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    /// Whether the in-memory list differs from before the call.
    pub changed: bool,
    pub persist: PersistStatus,
}

impl MutationOutcome {
    fn skipped() -> Self {
        Self {
            changed: false,
            persist: PersistStatus::Skipped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StoreState {
    Uninitialized,
    Loaded,
}

/// In-memory todo list mirrored to one key-value record.
pub struct TodoStore<S: KeyValueStore> {
    storage: S,
    items: Vec<TodoItem>,
    state: StoreState,
}

impl<S: KeyValueStore> TodoStore<S> {
    /// Creates an unloaded store over the given storage.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            items: Vec::new(),
            state: StoreState::Uninitialized,
        }
    }

    /// Reads the persisted record and installs the session list.
    ///
    /// # Contract
    /// - Missing record: installs the seed set and persists it right away, so
    ///   seed ids survive a restart. A failed write is logged and reported in
    ///   `LoadSource::Seeded`.
    /// - Unreadable or malformed record: logs the failure, keeps the empty
    ///   list and returns `LoadSource::Failed`. The store is still loaded.
    ///
    /// # Errors
    /// - `AlreadyLoaded` on a second call.
    pub fn load(&mut self) -> StoreResult<LoadSource> {
        if self.state == StoreState::Loaded {
            return Err(TodoStoreError::AlreadyLoaded);
        }
        let started_at = Instant::now();
        self.state = StoreState::Loaded;

        let record = match self.storage.get(STORAGE_KEY) {
            Ok(record) => record,
            Err(err) => {
                return Ok(load_failed(TodoStoreError::LoadRead(err), started_at));
            }
        };

        let Some(record) = record else {
            self.items = seed_items();
            info!(
                "event=todo_load module=store status=ok source=seed count={} duration_ms={}",
                self.items.len(),
                started_at.elapsed().as_millis()
            );
            return Ok(LoadSource::Seeded(self.persist_status()));
        };

        match decode_todo_list(&record) {
            Ok(items) => {
                self.items = items;
                info!(
                    "event=todo_load module=store status=ok source=record count={} duration_ms={}",
                    self.items.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(LoadSource::Restored)
            }
            Err(err) => Ok(load_failed(TodoStoreError::LoadDecode(err), started_at)),
        }
    }

    /// Appends a new incomplete item.
    ///
    /// Blank text (after trimming) is a boundary no-op and writes nothing.
    /// Non-blank text is stored as given.
    pub fn add(&mut self, text: &str) -> StoreResult<MutationOutcome> {
        self.ensure_loaded()?;
        if is_blank(text) {
            debug!("event=todo_add module=store status=skipped reason=blank_text");
            return Ok(MutationOutcome::skipped());
        }

        let mut item = TodoItem::new(text);
        while self.contains(&item.id) {
            item = TodoItem::new(text);
        }
        debug!(
            "event=todo_add module=store status=ok count={}",
            self.items.len() + 1
        );

        let mut next = self.items.clone();
        next.push(item);
        Ok(self.commit(next, true))
    }

    /// Flips completion on the item with `id`.
    ///
    /// An unknown id leaves the list unchanged; the list is still persisted.
    pub fn toggle_complete(&mut self, id: &str) -> StoreResult<MutationOutcome> {
        self.ensure_loaded()?;
        let next = self
            .items
            .iter()
            .map(|item| {
                if item.id == id {
                    item.toggled()
                } else {
                    item.clone()
                }
            })
            .collect::<Vec<_>>();
        let changed = self.contains(id);
        debug!("event=todo_toggle module=store status=ok matched={changed}");
        Ok(self.commit(next, changed))
    }

    /// Removes the item with `id`.
    ///
    /// An unknown id leaves the list unchanged; the list is still persisted.
    pub fn delete(&mut self, id: &str) -> StoreResult<MutationOutcome> {
        self.ensure_loaded()?;
        let next = self
            .items
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect::<Vec<_>>();
        let changed = next.len() != self.items.len();
        debug!("event=todo_delete module=store status=ok matched={changed}");
        Ok(self.commit(next, changed))
    }

    /// Writes the full current list under `STORAGE_KEY`.
    ///
    /// Failures are logged and returned; memory state is never touched.
    pub fn persist(&self) -> StoreResult<()> {
        let started_at = Instant::now();
        let result = encode_todo_list(&self.items)
            .map_err(TodoStoreError::PersistEncode)
            .and_then(|record| {
                self.storage
                    .set(STORAGE_KEY, &record)
                    .map_err(TodoStoreError::PersistWrite)
            });

        match &result {
            Ok(()) => debug!(
                "event=todo_persist module=store status=ok count={} duration_ms={}",
                self.items.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=todo_persist module=store status=error count={} duration_ms={} error_code={} error={}",
                self.items.len(),
                started_at.elapsed().as_millis(),
                err.error_code(),
                err
            ),
        }
        result
    }

    /// Completed fraction of the list in `[0, 1]`; `0` when empty.
    pub fn progress(&self) -> f64 {
        if self.items.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.items.len() as f64
    }

    /// Current list in display order.
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Looks up one item by id.
    pub fn get(&self, id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_completed).count()
    }

    pub fn is_loaded(&self) -> bool {
        self.state == StoreState::Loaded
    }

    /// Borrows the injected storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    fn ensure_loaded(&self) -> StoreResult<()> {
        if self.state == StoreState::Loaded {
            Ok(())
        } else {
            Err(TodoStoreError::NotLoaded)
        }
    }

    fn commit(&mut self, next: Vec<TodoItem>, changed: bool) -> MutationOutcome {
        self.items = next;
        MutationOutcome {
            changed,
            persist: self.persist_status(),
        }
    }

    fn persist_status(&self) -> PersistStatus {
        match self.persist() {
            Ok(()) => PersistStatus::Saved,
            Err(err) => PersistStatus::Failed(err.to_string()),
        }
    }
}

fn load_failed(err: TodoStoreError, started_at: Instant) -> LoadSource {
    error!(
        "event=todo_load module=store status=error duration_ms={} error_code={} error={}",
        started_at.elapsed().as_millis(),
        err.error_code(),
        err
    );
    LoadSource::Failed(err)
}

#[cfg(test)]
mod tests {
    use super::{LoadSource, PersistStatus, TodoStore, TodoStoreError, STORAGE_KEY};
    use crate::model::codec::decode_todo_list;
    use crate::repo::kv_repo::{InMemoryKeyValueStore, KeyValueStore};

    const TWO_ITEMS: &str = r#"[
        {"id":"a","text":"first","isCompleted":false},
        {"id":"b","text":"second","isCompleted":true}
    ]"#;

    fn loaded(record: &str) -> TodoStore<InMemoryKeyValueStore> {
        let mut store = TodoStore::new(InMemoryKeyValueStore::with_entry(STORAGE_KEY, record));
        let source = store.load().expect("first load should be accepted");
        assert!(matches!(source, LoadSource::Restored));
        store
    }

    fn stored_ids(storage: &InMemoryKeyValueStore) -> Vec<String> {
        let record = storage
            .get(STORAGE_KEY)
            .expect("in-memory read should succeed")
            .expect("record should have been written");
        decode_todo_list(&record)
            .expect("written record should decode")
            .into_iter()
            .map(|item| item.id)
            .collect()
    }

    #[test]
    fn mutations_before_load_are_rejected() {
        let mut store = TodoStore::new(InMemoryKeyValueStore::new());
        assert!(matches!(store.add("x"), Err(TodoStoreError::NotLoaded)));
        assert!(matches!(store.toggle_complete("a"), Err(TodoStoreError::NotLoaded)));
        assert!(matches!(store.delete("a"), Err(TodoStoreError::NotLoaded)));
        assert!(!store.is_loaded());
    }

    #[test]
    fn second_load_is_rejected() {
        let mut store = TodoStore::new(InMemoryKeyValueStore::new());
        store.load().expect("first load should be accepted");
        assert!(matches!(store.load(), Err(TodoStoreError::AlreadyLoaded)));
    }

    #[test]
    fn seed_is_persisted_on_load() {
        let mut store = TodoStore::new(InMemoryKeyValueStore::new());
        let source = store.load().expect("first load should be accepted");
        assert!(matches!(source, LoadSource::Seeded(PersistStatus::Saved)));

        let seed_ids = store
            .items()
            .iter()
            .map(|item| item.id.clone())
            .collect::<Vec<_>>();
        assert_eq!(stored_ids(store.storage()), seed_ids);
    }

    #[test]
    fn seed_ids_survive_into_next_session() {
        let backend = InMemoryKeyValueStore::new();
        let shown_id = {
            let mut first = TodoStore::new(&backend);
            first.load().expect("first session load should be accepted");
            first.items()[0].id.clone()
        };

        let mut second = TodoStore::new(&backend);
        let source = second.load().expect("second session load should be accepted");
        assert!(matches!(source, LoadSource::Restored));

        let outcome = second
            .toggle_complete(&shown_id)
            .expect("loaded store should accept toggle");
        assert!(outcome.changed, "seed id from first session should still exist");
        assert!(second
            .get(&shown_id)
            .expect("seed item should be present")
            .is_completed);
    }

    #[test]
    fn blank_add_is_a_noop_without_persist() {
        let mut store = loaded(TWO_ITEMS);
        for text in ["", "   ", "\t"] {
            let outcome = store.add(text).expect("loaded store should accept add");
            assert!(!outcome.changed);
            assert_eq!(outcome.persist, PersistStatus::Skipped);
        }
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn add_appends_with_unique_id_and_keeps_text() {
        let mut store = loaded(TWO_ITEMS);
        let outcome = store.add(" buy milk").expect("loaded store should accept add");
        assert!(outcome.changed);
        assert_eq!(outcome.persist, PersistStatus::Saved);

        let last = store.items().last().expect("list should not be empty");
        assert_eq!(last.text, " buy milk");
        assert!(!last.is_completed);
        assert!(last.id != "a" && last.id != "b");
        assert_eq!(
            stored_ids(store.storage()),
            vec!["a", "b", last.id.as_str()]
        );
    }

    #[test]
    fn toggle_flips_only_target() {
        let mut store = loaded(TWO_ITEMS);
        let outcome = store
            .toggle_complete("a")
            .expect("loaded store should accept toggle");
        assert!(outcome.changed);
        assert!(store.get("a").expect("item a should exist").is_completed);
        assert!(store.get("b").expect("item b should exist").is_completed);
        assert_eq!(store.items()[0].id, "a");
        assert_eq!(store.progress(), 1.0);
    }

    #[test]
    fn toggle_unknown_id_keeps_list_but_persists() {
        let mut store = loaded(TWO_ITEMS);
        let before = store.items().to_vec();
        let outcome = store
            .toggle_complete("missing")
            .expect("loaded store should accept toggle");
        assert!(!outcome.changed);
        assert_eq!(outcome.persist, PersistStatus::Saved);
        assert_eq!(store.items(), before.as_slice());
    }

    #[test]
    fn delete_removes_target_and_keeps_order() {
        let mut store = loaded(
            r#"[
            {"id":"a","text":"1","isCompleted":false},
            {"id":"b","text":"2","isCompleted":false},
            {"id":"c","text":"3","isCompleted":false}
        ]"#,
        );
        let outcome = store.delete("b").expect("loaded store should accept delete");
        assert!(outcome.changed);
        let ids = store
            .items()
            .iter()
            .map(|item| item.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(stored_ids(store.storage()), vec!["a", "c"]);

        let repeated = store.delete("b").expect("loaded store should accept delete");
        assert!(!repeated.changed);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn progress_is_zero_for_empty_list() {
        let store = loaded("[]");
        assert!(store.is_empty());
        assert_eq!(store.progress(), 0.0);
    }

    #[test]
    fn malformed_record_loads_empty_and_stays_usable() {
        let mut store = TodoStore::new(InMemoryKeyValueStore::with_entry(STORAGE_KEY, "{oops"));
        match store.load().expect("first load should be accepted") {
            LoadSource::Failed(err) => assert!(err.is_load_failure()),
            other => panic!("unexpected load source: {other:?}"),
        }
        assert!(store.is_loaded());
        assert!(store.is_empty());

        store
            .add("after failure")
            .expect("store should stay usable after a failed load");
        assert_eq!(store.len(), 1);
    }
}
