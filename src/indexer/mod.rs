//! Per-group crawl pipeline
//!
//! Three stages connected by rendezvous channels, so a slow stage holds
//! back the one feeding it:
//! - discover: polls the group's watermarks
//! - fetch: plans chunks from the cursor and fetches them concurrently
//! - load: inserts articles into the store
//!
//! A pending meter counts articles dispatched but not yet fetched.

mod cursor;
mod discover;
mod fetch;
mod load;
mod meter;

pub use cursor::{chunk_range, Chunk, Cursor, BOOTSTRAP_WINDOW, CHUNK_SIZE};
pub use meter::PendingMeter;

use crate::article::Article;
use crate::client::ClientPool;
use crate::storage::ArticleStore;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Indexes one group into a store
pub struct Indexer<S> {
    group: String,
    delay: Duration,
    client: ClientPool,
    store: S,
}

impl<S> Indexer<S>
where
    S: ArticleStore + Send + 'static,
{
    /// # Arguments
    ///
    /// * `group` - Newsgroup to index
    /// * `delay` - Pause between watermark polls
    /// * `client` - Pool the fetches go through
    /// * `store` - Where articles are loaded
    pub fn new(group: impl Into<String>, delay: Duration, client: ClientPool, store: S) -> Self {
        Self {
            group: group.into(),
            delay,
            client,
            store,
        }
    }

    /// Spawns the pipeline. It runs until the returned handle is dropped
    /// or the process exits.
    pub fn start(self) -> IndexerHandle {
        let Self {
            group,
            delay,
            client,
            store,
        } = self;

        let span_group = group.clone();
        let stage = move |name: &'static str| {
            tracing::info_span!("indexer", group = %span_group, stage = name)
        };

        let meter = stage("meter").in_scope(PendingMeter::spawn);
        let (snapshot_tx, snapshot_rx) = kanal::bounded_async(0);
        let (article_tx, article_rx) = kanal::bounded_async(0);

        let mut stages = JoinSet::new();
        stages.spawn(
            discover::discover(group.clone(), delay, client.clone(), snapshot_tx)
                .instrument(stage("discover")),
        );
        stages.spawn(
            fetch::fetch(group.clone(), client, meter.clone(), snapshot_rx, article_tx)
                .instrument(stage("fetch")),
        );
        stages.spawn(load_stage(group.clone(), store, article_rx).instrument(stage("load")));

        tracing::info!("Indexing {} every {}s", group, delay.as_secs());

        IndexerHandle {
            group,
            stages,
            meter,
        }
    }
}

async fn load_stage<S: ArticleStore>(
    group: String,
    store: S,
    articles: kanal::AsyncReceiver<Article>,
) {
    let processed = load::load(group, store, articles).await;
    tracing::info!("Stopped after {} articles", processed);
}

/// A running pipeline. Dropping it aborts every stage.
pub struct IndexerHandle {
    group: String,
    stages: JoinSet<()>,
    meter: PendingMeter,
}

impl IndexerHandle {
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Articles dispatched for fetching but not yet finished
    pub fn pending(&self) -> i64 {
        self.meter.pending()
    }

    /// Watches the pending count as it changes
    pub fn watch_pending(&self) -> watch::Receiver<i64> {
        self.meter.subscribe()
    }

    /// Waits on the stages. They do not finish on their own, so this keeps
    /// the caller parked and reports any stage that panics.
    pub async fn join(mut self) {
        while let Some(result) = self.stages.join_next().await {
            if let Err(e) = result {
                tracing::error!("Stage of {} ended abnormally: {}", self.group, e);
            }
        }
    }
}
