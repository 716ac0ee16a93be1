//! History store behavior against in-memory and file-backed storage.

use qrscan_lib::history_manager::{HistoryStore, DEFAULT_CAPACITY, HISTORY_KEY};
use qrscan_lib::storage::{FileStore, KeyValueStore, MemoryStore};

fn urls<S: KeyValueStore>(store: &HistoryStore<S>) -> Vec<String> {
    store.list().iter().map(|e| e.url.clone()).collect()
}

#[test]
fn readding_moves_entry_to_front() {
    let mut store = HistoryStore::load(MemoryStore::new());
    store.add("https://a.com");
    store.add("https://b.com");
    let list = store.add("https://a.com");

    let order: Vec<&str> = list.iter().map(|e| e.url.as_str()).collect();
    assert_eq!(order, vec!["https://a.com", "https://b.com"]);
}

#[test]
fn twenty_one_urls_evict_the_oldest() {
    let mut store = HistoryStore::load(MemoryStore::new());
    for i in 1..=21 {
        store.add(&format!("u{}", i));
    }

    let expected: Vec<String> = (2..=21).rev().map(|i| format!("u{}", i)).collect();
    assert_eq!(store.list().len(), DEFAULT_CAPACITY);
    assert_eq!(urls(&store), expected);
    assert!(!urls(&store).contains(&"u1".to_string()));
}

#[test]
fn mixed_sequence_matches_reference_model() {
    // Small LCG so the sequence repeats across runs.
    let mut seed: u64 = 0x2545_f491;
    let mut next = move || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) as usize
    };

    let mut store = HistoryStore::load(MemoryStore::new());
    let mut model: Vec<String> = Vec::new();

    for _ in 0..500 {
        let url = format!("https://site{}.dev", next() % 35);
        store.add(&url);

        model.retain(|u| u != &url);
        model.insert(0, url);
        model.truncate(DEFAULT_CAPACITY);

        assert!(store.list().len() <= DEFAULT_CAPACITY);
        assert_eq!(urls(&store), model);
    }
}

#[test]
fn same_url_twice_keeps_one_entry() {
    let mut store = HistoryStore::load(MemoryStore::new());
    store.add("https://a.com");
    let first_id = store.list()[0].id;
    store.add("https://a.com");

    assert_eq!(store.list().len(), 1);
    assert_eq!(store.list()[0].url, "https://a.com");
    assert!(store.list()[0].id > first_id);
}

#[test]
fn remove_unknown_id_changes_nothing() {
    let mut store = HistoryStore::load(MemoryStore::new());
    store.add("https://a.com");
    store.add("https://b.com");
    let before = store.list().to_vec();

    let after = store.remove(123).to_vec();
    assert_eq!(after, before);
}

#[test]
fn remove_deletes_only_that_entry() {
    let mut store = HistoryStore::load(MemoryStore::new());
    store.add("https://a.com");
    store.add("https://b.com");
    let b_id = store.list()[0].id;

    store.remove(b_id);
    assert_eq!(urls(&store), vec!["https://a.com".to_string()]);
}

#[test]
fn clear_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = HistoryStore::load(FileStore::new(dir.path()));
    store.add("https://a.com");
    store.add("https://b.com");
    assert!(store.clear().is_empty());

    let reloaded = HistoryStore::load(FileStore::new(dir.path()));
    assert!(reloaded.list().is_empty());
}

#[test]
fn reload_restores_identical_list() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = HistoryStore::load(FileStore::new(dir.path()));
    for url in ["https://a.com", "https://b.com", "https://c.com"] {
        store.add(url);
    }

    let reloaded = HistoryStore::load(FileStore::new(dir.path()));
    assert_eq!(reloaded.list(), store.list());
}

#[test]
fn memory_store_clone_acts_as_restart() {
    let storage = MemoryStore::new();
    let mut store = HistoryStore::load(storage.clone());
    store.add("https://a.com");

    let reloaded = HistoryStore::load(storage);
    assert_eq!(reloaded.list(), store.list());
}

#[test]
fn corrupt_file_starts_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{}.json", HISTORY_KEY)), "[{\"id\":").unwrap();

    let mut store = HistoryStore::load(FileStore::new(dir.path()));
    assert!(store.list().is_empty());

    store.add("https://a.com");
    let reloaded = HistoryStore::load(FileStore::new(dir.path()));
    assert_eq!(urls(&reloaded), vec!["https://a.com".to_string()]);
}

#[test]
fn unreadable_storage_starts_empty() {
    let storage = MemoryStore::new();
    storage.fail_reads(true);
    let store = HistoryStore::load(storage);
    assert!(store.list().is_empty());
    assert!(store.is_persistent());
}

#[test]
fn persisted_format_uses_timestamp_key() {
    let storage = MemoryStore::new();
    let mut store = HistoryStore::load(storage.clone());
    store.add("https://a.com");

    let raw = storage.get_string(HISTORY_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value.as_array().unwrap()[0];
    assert_eq!(first["url"], "https://a.com");
    assert!(first["id"].is_i64());
    assert!(first["timestamp"].is_string());
}
