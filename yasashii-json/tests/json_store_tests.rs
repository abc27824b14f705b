use chrono::{DateTime, Utc};
use serde_json::json;
use std::fs;
use std::sync::Arc;
use yasashii_core::{AppState, CoreError, OutcomeLevel, PoolKind, Repository};
use yasashii_json::JsonStore;

async fn open(root: &std::path::Path, keep: usize) -> JsonStore {
    JsonStore::open_with(root.join("store"), root.join("backups"), keep)
        .await
        .unwrap()
}

#[tokio::test]
async fn values_survive_reopen() {
    let tmp = tempfile::tempdir().unwrap();
    {
        let store = open(tmp.path(), 3).await;
        store.put("streak", json!(5)).await.unwrap();
        store.put("progress", json!({ "mastery": 0.25 })).await.unwrap();
    }
    let store = open(tmp.path(), 3).await;
    assert_eq!(store.get("streak").await.unwrap(), Some(json!(5)));
    assert_eq!(store.load_streak().await.unwrap(), 5);
    assert_eq!(store.load_progress().await.unwrap().mastery, 0.25);
    assert!(tmp.path().join("store/streak.json").exists());
}

#[tokio::test]
async fn backups_are_rotated_per_key() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), 1).await;
    store.put("streak", json!(1)).await.unwrap();
    store.put("results", json!([])).await.unwrap();
    store.put("streak", json!(2)).await.unwrap();

    let names: Vec<String> = fs::read_dir(tmp.path().join("backups"))
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".json"))
        .collect();
    assert_eq!(names.iter().filter(|n| n.starts_with("streak-")).count(), 1);
    assert_eq!(names.iter().filter(|n| n.starts_with("results-")).count(), 1);
}

#[tokio::test]
async fn bad_keys_and_corrupt_files() {
    let tmp = tempfile::tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("store")).unwrap();
    fs::write(tmp.path().join("store/progress.json"), "{ truncated").unwrap();

    let store = open(tmp.path(), 2).await;
    assert_eq!(store.get("progress").await.unwrap(), None);
    assert_eq!(store.load_progress().await.unwrap().mastery, 0.0);

    let err = store.put("../escape", json!(1)).await.unwrap_err();
    assert!(matches!(err, CoreError::Invalid(_)));
}

#[tokio::test]
async fn app_state_round_trip_and_reset() {
    let tmp = tempfile::tempdir().unwrap();
    let now = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();
    {
        let store: Arc<dyn Repository> = Arc::new(open(tmp.path(), 2).await);
        let state = AppState::load(store).await.unwrap();
        state
            .record_answer(PoolKind::Vocab, "book", "buku", OutcomeLevel::Strong, Some(640), now)
            .await
            .unwrap();
    }

    let store: Arc<dyn Repository> = Arc::new(open(tmp.path(), 2).await);
    let state = AppState::load(store.clone()).await.unwrap();
    let book = state.pool(PoolKind::Vocab).await.get("book").cloned().unwrap();
    assert_eq!(book.history.len(), 1);
    assert_eq!(book.history[0].time_ms, Some(640));

    state.reset().await.unwrap();
    assert!(!tmp.path().join("store/vocab_queue.json").exists());
    assert!(state.pool(PoolKind::Vocab).await.get("book").unwrap().is_new());
    assert_eq!(store.get("vocab_queue").await.unwrap(), None);
}

#[tokio::test]
async fn failed_write_keeps_previous_value() {
    let tmp = tempfile::tempdir().unwrap();
    let store = open(tmp.path(), 2).await;
    store.put("streak", json!(1)).await.unwrap();

    // Replace the store directory with a plain file so writes fail.
    fs::remove_dir_all(tmp.path().join("store")).unwrap();
    fs::write(tmp.path().join("store"), "not a dir").unwrap();

    assert!(store.put("streak", json!(2)).await.is_err());
    assert_eq!(store.get("streak").await.unwrap(), Some(json!(1)));
}
