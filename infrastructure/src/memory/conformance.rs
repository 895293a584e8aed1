//! Behaviour every memory backend must share.
//!
//! Each check takes an empty store. Backend test modules call them so the
//! in-process, file and Redis stores are held to identical semantics.

use agentloop_application::ports::memory_store::{MemoryError, MemoryStore};
use agentloop_domain::{DomainError, MemoryQuery, SetOptions};
use chrono::Utc;
use serde_json::json;
use std::time::Duration;

pub(crate) async fn set_then_get(store: &dyn MemoryStore) {
    let stored = store
        .set("user/name", json!("Ada"), SetOptions::default().with_tag("profile"))
        .await
        .unwrap();

    let fetched = store.get("user/name").await.unwrap().unwrap();
    assert_eq!(fetched, stored);
    assert!(fetched.has_tag("profile"));
    assert!(store.get("user/other").await.unwrap().is_none());
}

pub(crate) async fn set_replaces_existing_entry(store: &dyn MemoryStore) {
    let first = store
        .set("k", json!(1), SetOptions::default().with_tag("old"))
        .await
        .unwrap();
    let second = store.set("k", json!(2), SetOptions::default()).await.unwrap();

    assert_ne!(first.id, second.id);
    let fetched = store.get("k").await.unwrap().unwrap();
    assert_eq!(fetched.value, json!(2));
    assert!(!fetched.has_tag("old"), "tags are not merged");
    assert!(store.search(&MemoryQuery::new().tag("old")).await.unwrap().is_empty());
    assert_eq!(store.search(&MemoryQuery::new()).await.unwrap().len(), 1);
}

pub(crate) async fn rejects_invalid_input(store: &dyn MemoryStore) {
    assert_eq!(
        store.set("  ", json!(1), SetOptions::default()).await,
        Err(MemoryError::Validation(DomainError::EmptyMemoryKey))
    );

    let past = SetOptions::default().expires_at(Utc::now() - chrono::Duration::seconds(1));
    assert_eq!(
        store.set("k", json!(1), past).await,
        Err(MemoryError::Validation(DomainError::ExpiryInPast))
    );
    assert!(store.get("k").await.unwrap().is_none());
}

pub(crate) async fn expired_entries_are_absent(store: &dyn MemoryStore) {
    store
        .set(
            "short",
            json!("soon gone"),
            SetOptions::default().expires_in(chrono::Duration::milliseconds(50)),
        )
        .await
        .unwrap();
    store.set("long", json!("stays"), SetOptions::default()).await.unwrap();

    assert!(store.get("short").await.unwrap().is_some());
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert!(store.get("short").await.unwrap().is_none());
    assert_eq!(store.search(&MemoryQuery::new()).await.unwrap().len(), 1);
    assert!(!store.delete("short").await.unwrap());
    assert_eq!(store.purge_expired().await.unwrap(), 0, "delete already dropped it");
}

pub(crate) async fn purge_expired_counts_removed(store: &dyn MemoryStore) {
    for key in ["a", "b"] {
        store
            .set(
                key,
                json!(key),
                SetOptions::default().expires_in(chrono::Duration::milliseconds(20)),
            )
            .await
            .unwrap();
    }
    store.set("c", json!("c"), SetOptions::default()).await.unwrap();

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(store.purge_expired().await.unwrap(), 2);
    assert_eq!(store.purge_expired().await.unwrap(), 0);
    assert!(store.get("c").await.unwrap().is_some());
}

pub(crate) async fn search_by_tag_and_text(store: &dyn MemoryStore) {
    store
        .set("notes/rust", json!({"text": "Ownership rules"}), SetOptions::default().with_tag("lang"))
        .await
        .unwrap();
    store
        .set("notes/go", json!({"text": "Goroutines"}), SetOptions::default().with_tag("lang"))
        .await
        .unwrap();
    store
        .set("todo", json!("buy milk"), SetOptions::default().with_tag("chores"))
        .await
        .unwrap();

    let tagged = store.search(&MemoryQuery::new().tag("lang")).await.unwrap();
    assert_eq!(tagged.len(), 2);

    let text = store.search(&MemoryQuery::new().text("OWNERSHIP")).await.unwrap();
    assert_eq!(text.len(), 1);
    assert_eq!(text[0].key, "notes/rust");

    let limited = store.search(&MemoryQuery::new().limit(1)).await.unwrap();
    assert_eq!(limited.len(), 1);
}

pub(crate) async fn delete_and_clear(store: &dyn MemoryStore) {
    store.set("a", json!(1), SetOptions::default().with_tag("x")).await.unwrap();
    store.set("b", json!(2), SetOptions::default().with_tag("y")).await.unwrap();
    store.set("c", json!(3), SetOptions::default().with_tags(["x", "y"])).await.unwrap();
    store.set("d", json!(4), SetOptions::default()).await.unwrap();

    assert!(store.delete("d").await.unwrap());
    assert!(!store.delete("d").await.unwrap());

    let removed = store.clear(Some(&["x".to_string()])).await.unwrap();
    assert_eq!(removed, 2);
    assert!(store.get("a").await.unwrap().is_none());
    assert!(store.get("b").await.unwrap().is_some());

    assert_eq!(store.clear(None).await.unwrap(), 1);
    assert!(store.search(&MemoryQuery::new()).await.unwrap().is_empty());
}
