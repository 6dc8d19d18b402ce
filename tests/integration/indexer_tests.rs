//! End-to-end indexing against the fake server

use crate::fake_server::{message_id, FakeNews};
use newsindex::storage::{SqliteStorage, Storage};
use newsindex::{ClientPool, Indexer};
use std::path::Path;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(20);

/// Polls until `group` holds `expected` articles
async fn wait_for_count(db: &Path, group: &str, expected: u64) {
    let reader = SqliteStorage::new(db).unwrap();
    let waited = tokio::time::timeout(WAIT, async {
        loop {
            if reader.count_articles(group).unwrap() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(
        waited.is_ok(),
        "expected {} articles, found {}",
        expected,
        reader.count_articles(group).unwrap()
    );
}

#[tokio::test]
async fn test_bootstrap_indexes_recent_window() {
    let server = FakeNews::new("alt.test", 1, 1050)
        .missing(&[1000])
        .start()
        .await;
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("news.db");

    let pool = ClientPool::start(server.config(), 3);
    let store = SqliteStorage::new(&db).unwrap();
    let handle = Indexer::new("alt.test", Duration::from_secs(3600), pool, store).start();
    assert_eq!(handle.group(), "alt.test");

    // 950..1050 minus the missing article
    wait_for_count(&db, "alt.test", 99).await;

    let reader = SqliteStorage::new(&db).unwrap();
    let first = reader
        .get_article("alt.test", &message_id(950))
        .unwrap()
        .expect("first article of the window");
    assert_eq!(first.subject, "Article number 950");
    assert_eq!(first.posted_at, 1400902829);
    assert_eq!(first.xrefs[0].number, 950);
    assert!(first.headers.contains_key("From"));

    assert!(reader.get_article("alt.test", &message_id(949)).unwrap().is_none());
    assert!(reader.get_article("alt.test", &message_id(1000)).unwrap().is_none());
    // The high watermark itself waits for the next round
    assert!(reader.get_article("alt.test", &message_id(1050)).unwrap().is_none());

    let mut pending = handle.watch_pending();
    tokio::time::timeout(WAIT, pending.wait_for(|p| *p == 0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(server.heads(), 100);
}

#[tokio::test]
async fn test_next_round_fetches_only_new_articles() {
    let server = FakeNews::new("alt.test", 1, 200).start().await;
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("news.db");

    let pool = ClientPool::start(server.config(), 2);
    let store = SqliteStorage::new(&db).unwrap();
    let _handle = Indexer::new("alt.test", Duration::from_millis(100), pool, store).start();

    wait_for_count(&db, "alt.test", 100).await;

    server.set_high(230);
    wait_for_count(&db, "alt.test", 130).await;

    let reader = SqliteStorage::new(&db).unwrap();
    assert!(reader.get_article("alt.test", &message_id(200)).unwrap().is_some());
    assert!(reader.get_article("alt.test", &message_id(229)).unwrap().is_some());
    assert_eq!(server.heads(), 130);
}

#[tokio::test]
async fn test_reindexing_same_window_stores_nothing_twice() {
    let server = FakeNews::new("alt.test", 1, 300).start().await;
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("news.db");
    let pool = ClientPool::start(server.config(), 2);

    let first = Indexer::new(
        "alt.test",
        Duration::from_secs(3600),
        pool.clone(),
        SqliteStorage::new(&db).unwrap(),
    )
    .start();
    wait_for_count(&db, "alt.test", 100).await;

    let second = Indexer::new(
        "alt.test",
        Duration::from_secs(3600),
        pool,
        SqliteStorage::new(&db).unwrap(),
    )
    .start();

    tokio::time::timeout(WAIT, async {
        while server.heads() < 200 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .unwrap();
    let mut pending = second.watch_pending();
    tokio::time::timeout(WAIT, pending.wait_for(|p| *p == 0))
        .await
        .unwrap()
        .unwrap();

    let reader = SqliteStorage::new(&db).unwrap();
    assert_eq!(reader.count_articles("alt.test").unwrap(), 100);
    drop(first);
}

#[tokio::test]
async fn test_unknown_group_indexes_nothing() {
    let server = FakeNews::new("alt.test", 1, 50).start().await;
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("news.db");

    let pool = ClientPool::start(server.config(), 1);
    let store = SqliteStorage::new(&db).unwrap();
    let _handle = Indexer::new("alt.nowhere", Duration::from_millis(50), pool, store).start();

    tokio::time::sleep(Duration::from_millis(300)).await;

    let reader = SqliteStorage::new(&db).unwrap();
    assert_eq!(reader.count_articles("alt.nowhere").unwrap(), 0);
    assert_eq!(server.heads(), 0);
}
