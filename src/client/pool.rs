use super::request::{GroupRequest, GroupResult, RangeRequest, Request};
use super::worker::Worker;
use super::RECONNECT_DELAY;
use crate::article::Article;
use crate::config::ServerConfig;
use kanal::AsyncSender;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::Instrument;

/// Handle to a running pool of NNTP workers
///
/// Cheap to clone; every clone feeds the same request queue. Workers shut
/// down once the last handle is dropped.
#[derive(Clone)]
pub struct ClientPool {
    requests: AsyncSender<Request>,
}

impl std::fmt::Debug for ClientPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientPool").finish_non_exhaustive()
    }
}

impl ClientPool {
    /// Spawns `connections` workers against `server`
    ///
    /// Workers dial lazily in the background; a server that is down delays
    /// replies but never fails this call.
    pub fn start(server: ServerConfig, connections: usize) -> Self {
        let (requests, queue) = kanal::bounded_async(0);
        let server = Arc::new(server);

        for id in 0..connections {
            let worker = Worker::new(Arc::clone(&server), queue.clone(), RECONNECT_DELAY);
            tokio::spawn(worker.run().instrument(tracing::info_span!("worker", id)));
        }
        tracing::info!("Started {} NNTP workers for {}", connections, server.addr);

        Self { requests }
    }

    /// Selects `name` on whichever connection is free and reports its
    /// watermarks. The receiver yields exactly one result, or an error if
    /// the pool shut down first.
    pub fn select_group(&self, name: &str) -> oneshot::Receiver<GroupResult> {
        let (reply, result) = oneshot::channel();
        self.enqueue(Request::Group(GroupRequest {
            name: name.to_string(),
            reply,
        }));
        result
    }

    /// Fetches the headers of articles `start..=end` in `group`
    ///
    /// Articles arrive in ascending number order. Numbers the server does not
    /// have are skipped, so the stream may be shorter than the range. A
    /// connection failure ends the stream early with one error-bearing
    /// placeholder for the number that failed.
    pub fn fetch_range(&self, group: &str, start: u64, end: u64) -> mpsc::Receiver<Article> {
        let (reply, articles) = mpsc::channel(1);
        self.enqueue(Request::Range(RangeRequest {
            group: group.to_string(),
            start,
            end,
            reply,
        }));
        articles
    }

    /// Hands the request to the queue without making the caller wait for a
    /// free worker
    fn enqueue(&self, request: Request) {
        let requests = self.requests.clone();
        tokio::spawn(async move {
            if requests.send(request).await.is_err() {
                tracing::warn!("Request queue closed, dropping request");
            }
        });
    }
}
