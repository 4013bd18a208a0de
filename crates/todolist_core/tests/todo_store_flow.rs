use todolist_core::{
    decode_todo_list, encode_todo_list, InMemoryKeyValueStore, KeyValueStore, LoadSource,
    PersistStatus, RepoError, RepoResult, SqliteKeyValueStore, TodoItem, TodoStore, SEED_TEXTS,
    STORAGE_KEY,
};

/// Backend whose writes always fail; reads fail too when `fail_reads` is set.
struct BrokenStore {
    fail_reads: bool,
}

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> RepoResult<Option<String>> {
        if self.fail_reads {
            return Err(RepoError::Backend("disk unavailable".to_string()));
        }
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str) -> RepoResult<()> {
        Err(RepoError::Backend("disk full".to_string()))
    }
}

#[test]
fn seeded_session_end_to_end() {
    let mut store = TodoStore::new(InMemoryKeyValueStore::new());
    let source = store.load().expect("first load should be accepted");
    assert!(matches!(source, LoadSource::Seeded(PersistStatus::Saved)));

    let texts = store
        .items()
        .iter()
        .map(|item| item.text.as_str())
        .collect::<Vec<_>>();
    assert_eq!(texts, SEED_TEXTS.to_vec());
    assert_eq!(store.progress(), 0.0);

    store.add("x").expect("loaded store should accept add");
    assert_eq!(store.len(), 4);

    let seed_id = store.items()[1].id.clone();
    store
        .toggle_complete(&seed_id)
        .expect("loaded store should accept toggle");
    assert_eq!(store.progress(), 0.25);

    store
        .delete(&seed_id)
        .expect("loaded store should accept delete");
    assert_eq!(store.len(), 3);
    assert_eq!(store.progress(), 0.0);
}

#[test]
fn fresh_sqlite_database_keeps_seed_ids_across_sessions() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("todolist.db");

    let listed_ids = {
        let storage = SqliteKeyValueStore::open(&path).expect("db should open");
        let mut store = TodoStore::new(storage);
        store.load().expect("first load should be accepted");
        store
            .items()
            .iter()
            .map(|item| item.id.clone())
            .collect::<Vec<_>>()
    };

    let storage = SqliteKeyValueStore::open(&path).expect("db should reopen");
    let mut store = TodoStore::new(storage);
    let source = store.load().expect("second load should be accepted");
    assert!(matches!(source, LoadSource::Restored));

    let outcome = store
        .toggle_complete(&listed_ids[2])
        .expect("loaded store should accept toggle");
    assert!(outcome.changed);
    assert_eq!(store.completed_count(), 1);
}

#[test]
fn reload_from_sqlite_restores_same_list() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("todolist.db");

    let expected = {
        let storage = SqliteKeyValueStore::open(&path).expect("db should open");
        let mut store = TodoStore::new(storage);
        store.load().expect("first load should be accepted");
        store.add("buy milk").expect("add should be accepted");
        let first_id = store.items()[0].id.clone();
        store
            .toggle_complete(&first_id)
            .expect("toggle should be accepted");
        let third_id = store.items()[2].id.clone();
        store.delete(&third_id).expect("delete should be accepted");
        store.items().to_vec()
    };

    let storage = SqliteKeyValueStore::open(&path).expect("db should reopen");
    let mut reopened = TodoStore::new(storage);
    let source = reopened.load().expect("second load should be accepted");
    assert!(matches!(source, LoadSource::Restored));
    assert_eq!(reopened.items(), expected.as_slice());
    assert_eq!(reopened.completed_count(), 1);
    assert_eq!(reopened.progress(), 1.0 / 3.0);
}

#[test]
fn persisted_record_uses_wire_field_names() {
    let backend = InMemoryKeyValueStore::new();
    let mut store = TodoStore::new(&backend);
    store.load().expect("first load should be accepted");
    store.add("write docs").expect("add should be accepted");

    let record = backend
        .get(STORAGE_KEY)
        .expect("in-memory read should succeed")
        .expect("record should have been written");
    let value: serde_json::Value =
        serde_json::from_str(&record).expect("record should be valid JSON");
    let last = value
        .as_array()
        .and_then(|items| items.last())
        .expect("record should be a non-empty array");
    assert_eq!(last["text"], "write docs");
    assert_eq!(last["isCompleted"], false);
    assert!(last["id"].is_string());
}

#[test]
fn second_session_over_shared_backend_sees_writes() {
    let backend = InMemoryKeyValueStore::new();
    {
        let mut first = TodoStore::new(&backend);
        first.load().expect("first session load should be accepted");
        first.add("carry over").expect("add should be accepted");
    }

    let mut second = TodoStore::new(&backend);
    let source = second.load().expect("second session load should be accepted");
    assert!(matches!(source, LoadSource::Restored));
    assert_eq!(second.len(), 4);
    assert_eq!(second.items()[3].text, "carry over");
}

#[test]
fn write_failure_keeps_in_memory_state() {
    let mut store = TodoStore::new(BrokenStore { fail_reads: false });
    let source = store.load().expect("first load should be accepted");
    assert!(matches!(
        source,
        LoadSource::Seeded(PersistStatus::Failed(ref message)) if message.contains("disk full")
    ));
    assert_eq!(store.len(), 3);

    let outcome = store.add("still here").expect("add should be accepted");
    assert!(outcome.changed);
    assert!(matches!(
        outcome.persist,
        PersistStatus::Failed(ref message) if message.contains("disk full")
    ));
    assert_eq!(store.len(), 4);

    let err = store
        .persist()
        .expect_err("broken backend should reject writes");
    assert!(err.is_persist_failure());
}

#[test]
fn read_failure_loads_empty_list() {
    let mut store = TodoStore::new(BrokenStore { fail_reads: true });
    match store.load().expect("first load should be accepted") {
        LoadSource::Failed(err) => {
            assert!(err.is_load_failure());
            assert!(err.to_string().contains("disk unavailable"));
        }
        other => panic!("unexpected load source: {other:?}"),
    }
    assert!(store.is_loaded());
    assert!(store.is_empty());
    assert_eq!(store.progress(), 0.0);
}

#[test]
fn record_roundtrip_matches_store_contents() {
    let record = encode_todo_list(&[TodoItem::with_id("a", "one"), TodoItem::with_id("b", "two")])
        .expect("record should encode");
    let backend = InMemoryKeyValueStore::with_entry(STORAGE_KEY, record);
    let mut store = TodoStore::new(&backend);
    store.load().expect("first load should be accepted");
    store.toggle_complete("b").expect("toggle should be accepted");

    let record = backend
        .get(STORAGE_KEY)
        .expect("in-memory read should succeed")
        .expect("record should have been written");
    let decoded = decode_todo_list(&record).expect("written record should decode");
    assert_eq!(decoded, store.items());
}
