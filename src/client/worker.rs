use super::request::{GroupRequest, RangeRequest, Request};
use crate::article::{build_article, Article};
use crate::config::ServerConfig;
use crate::nntp::{NntpConnection, NntpError};
use kanal::AsyncReceiver;
use std::sync::Arc;
use std::time::Duration;

/// What a served request left the connection fit for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Session {
    Healthy,
    Broken,
}

impl Session {
    fn after(error: &NntpError) -> Self {
        if error.is_connection_error() {
            Self::Broken
        } else {
            Self::Healthy
        }
    }
}

/// Owns one connection and serves requests from the shared queue
pub(crate) struct Worker {
    server: Arc<ServerConfig>,
    queue: AsyncReceiver<Request>,
    reconnect_delay: Duration,
}

impl Worker {
    pub(crate) fn new(
        server: Arc<ServerConfig>,
        queue: AsyncReceiver<Request>,
        reconnect_delay: Duration,
    ) -> Self {
        Self {
            server,
            queue,
            reconnect_delay,
        }
    }

    /// Connect, take a request, serve it, repeat. Returns when the queue
    /// closes.
    pub(crate) async fn run(self) {
        let mut idle: Option<NntpConnection> = None;

        loop {
            let mut conn = match idle.take() {
                Some(conn) => conn,
                None => match NntpConnection::connect(&self.server).await {
                    Ok(conn) => {
                        tracing::debug!("Connected to {}", self.server.addr);
                        conn
                    }
                    Err(e) => {
                        tracing::error!("Failed to connect to {}: {}", self.server.addr, e);
                        tokio::time::sleep(self.reconnect_delay).await;
                        continue;
                    }
                },
            };

            let request = match self.queue.recv().await {
                Ok(request) => request,
                Err(_) => {
                    tracing::trace!("Request queue closed, worker exiting");
                    conn.quit().await;
                    return;
                }
            };

            let session = match request {
                Request::Group(request) => serve_group(&mut conn, request).await,
                Request::Range(request) => serve_range(&mut conn, request).await,
            };

            match session {
                Session::Healthy => idle = Some(conn),
                Session::Broken => tracing::debug!("Discarding connection to {}", self.server.addr),
            }
        }
    }
}

async fn serve_group(conn: &mut NntpConnection, request: GroupRequest) -> Session {
    let GroupRequest { name, reply } = request;

    let result = conn.group(&name).await;
    let session = match &result {
        Ok(snapshot) => {
            tracing::trace!(
                "GROUP {}: {} articles, {}-{}",
                name,
                snapshot.count,
                snapshot.low,
                snapshot.high
            );
            Session::Healthy
        }
        Err(e) => Session::after(e),
    };

    if reply.send(result).is_err() {
        tracing::trace!("Nobody waiting for GROUP {}", name);
    }
    session
}

async fn serve_range(conn: &mut NntpConnection, request: RangeRequest) -> Session {
    let RangeRequest {
        group,
        start,
        end,
        reply,
    } = request;

    if let Err(e) = conn.group(&group).await {
        tracing::warn!("GROUP {} failed before fetching {}-{}: {}", group, start, end, e);
        let _ = reply.send(Article::fetch_failed(&group, start, &e)).await;
        return Session::after(&e);
    }

    for number in start..=end {
        let article = match conn.head(number).await {
            Ok(header) => build_article(header),
            Err(e) if e.is_no_such_article() => {
                tracing::trace!("No article {} in {}", number, group);
                continue;
            }
            Err(e) if e.is_connection_error() => {
                tracing::error!("HEAD {} in {} failed: {}", number, group, e);
                let _ = reply.send(Article::fetch_failed(&group, number, &e)).await;
                return Session::Broken;
            }
            Err(e) => {
                tracing::debug!("HEAD {} in {}: {}", number, group, e);
                Article::fetch_failed(&group, number, &e)
            }
        };

        if reply.send(article).await.is_err() {
            tracing::trace!("Range {}-{} in {} abandoned at {}", start, end, group, number);
            break;
        }
    }

    Session::Healthy
}
