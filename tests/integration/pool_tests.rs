//! Client pool against the fake server

use crate::fake_server::{message_id, FakeNews};
use newsindex::{Article, ClientPool};
use std::time::Duration;
use tokio::sync::mpsc;

const WAIT: Duration = Duration::from_secs(10);

async fn collect(mut articles: mpsc::Receiver<Article>) -> Vec<Article> {
    tokio::time::timeout(WAIT, async {
        let mut received = Vec::new();
        while let Some(article) = articles.recv().await {
            received.push(article);
        }
        received
    })
    .await
    .expect("range fetch did not finish")
}

fn numbers(articles: &[Article]) -> Vec<u64> {
    articles
        .iter()
        .filter_map(|a| a.number_in("alt.test"))
        .collect()
}

#[tokio::test]
async fn test_select_group() {
    let server = FakeNews::new("alt.test", 1, 1050).start().await;
    let pool = ClientPool::start(server.config(), 2);

    let snapshot = tokio::time::timeout(WAIT, pool.select_group("alt.test"))
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.name, "alt.test");
    assert_eq!((snapshot.low, snapshot.high), (1, 1050));
    assert_eq!(snapshot.count, 1050);
}

#[tokio::test]
async fn test_select_unknown_group_keeps_connection() {
    let server = FakeNews::new("alt.test", 1, 10).start().await;
    let pool = ClientPool::start(server.config(), 1);

    let err = tokio::time::timeout(WAIT, pool.select_group("alt.nowhere"))
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert_eq!(err.status_code(), Some(411));

    let snapshot = tokio::time::timeout(WAIT, pool.select_group("alt.test"))
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.high, 10);
    assert_eq!(server.connections(), 1);
}

#[tokio::test]
async fn test_range_skips_missing_article() {
    let server = FakeNews::new("alt.test", 1, 1050)
        .missing(&[423])
        .start()
        .await;
    let pool = ClientPool::start(server.config(), 2);

    let articles = collect(pool.fetch_range("alt.test", 420, 426)).await;

    assert_eq!(numbers(&articles), vec![420, 421, 422, 424, 425, 426]);
    assert!(articles.iter().all(|a| !a.has_errors()));
    assert_eq!(articles[0].message_id, message_id(420));
    assert_eq!(articles[0].subject, "Article number 420");
    assert_eq!(articles[0].timestamp, 1400902829);
    assert!(articles[0].header.contains_key("From"));
    assert!(!articles[0].header.contains_key("Organization"));
}

#[tokio::test]
async fn test_connection_drop_mid_range() {
    let server = FakeNews::new("alt.test", 1, 100)
        .drop_once_at(5)
        .start()
        .await;
    let pool = ClientPool::start(server.config(), 1);

    let articles = collect(pool.fetch_range("alt.test", 1, 10)).await;

    assert_eq!(numbers(&articles), vec![1, 2, 3, 4, 5]);
    let (failed, fetched) = articles.split_last().unwrap();
    assert!(fetched.iter().all(|a| !a.has_errors()));
    assert!(failed.has_errors());
    assert_eq!(failed.errors.len(), 1);
    assert!(failed.message_id.is_empty());

    // The same (only) worker serves the next request over a new connection
    let articles = collect(pool.fetch_range("alt.test", 6, 8)).await;
    assert_eq!(numbers(&articles), vec![6, 7, 8]);
    assert!(articles.iter().all(|a| !a.has_errors()));
    assert_eq!(server.connections(), 2);
}

#[tokio::test]
async fn test_concurrent_ranges_share_workers() {
    let server = FakeNews::new("alt.test", 1, 200).start().await;
    let pool = ClientPool::start(server.config(), 3);

    let ranges: Vec<_> = (0..6u64)
        .map(|i| pool.fetch_range("alt.test", 1 + i * 20, 20 + i * 20))
        .collect();

    let mut all = Vec::new();
    for range in ranges {
        let articles = collect(range).await;
        let got = numbers(&articles);
        let mut sorted = got.clone();
        sorted.sort_unstable();
        assert_eq!(got, sorted, "range arrived out of order");
        all.extend(got);
    }

    all.sort_unstable();
    assert_eq!(all, (1..=120).collect::<Vec<_>>());
    assert!(server.connections() <= 3);
}

#[tokio::test]
async fn test_authenticated_pool() {
    let server = FakeNews::new("alt.test", 1, 10)
        .credentials("reader", "secret")
        .start()
        .await;
    let mut config = server.config();
    config.username = Some("reader".to_string());
    config.password = Some("secret".to_string());
    let pool = ClientPool::start(config, 1);

    let articles = collect(pool.fetch_range("alt.test", 9, 10)).await;
    assert_eq!(numbers(&articles), vec![9, 10]);
}

#[tokio::test]
async fn test_unknown_group_range_yields_placeholder() {
    let server = FakeNews::new("alt.test", 1, 10).start().await;
    let pool = ClientPool::start(server.config(), 1);

    let articles = collect(pool.fetch_range("alt.nowhere", 3, 8)).await;
    assert_eq!(articles.len(), 1);
    assert_eq!(articles[0].number_in("alt.nowhere"), Some(3));
    assert!(articles[0].has_errors());
}
