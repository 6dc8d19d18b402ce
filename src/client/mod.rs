//! Pooled NNTP client
//!
//! A fixed set of workers, each owning one connection, serve requests from a
//! single shared queue. Callers never see a connection: they enqueue a
//! request and read the reply channel it carries.
//!
//! - Group selection replies once on a `oneshot` channel
//! - Range fetches stream articles, in ascending number order, on an `mpsc`
//!   channel that closes when the range is done
//!
//! Connection failures are retried forever; per-article failures come back
//! as placeholder articles carrying the error.

mod pool;
mod request;
mod worker;

pub use pool::ClientPool;
pub use request::GroupResult;

use std::time::Duration;

/// How long a worker waits before redialing after a failed connect
pub const RECONNECT_DELAY: Duration = Duration::from_secs(3);
