use tokio::sync::{mpsc, watch};
use tracing::Instrument;

/// Count of articles dispatched for fetching but not yet finished
///
/// A single task owns the running total and applies deltas sent by any
/// clone of this handle. The total is for observability only.
#[derive(Debug, Clone)]
pub struct PendingMeter {
    deltas: mpsc::UnboundedSender<i64>,
    total: watch::Receiver<i64>,
}

impl PendingMeter {
    /// Spawns the accumulator task. It ends when the last handle is dropped.
    pub fn spawn() -> Self {
        let (deltas, mut incoming) = mpsc::unbounded_channel::<i64>();
        let (publish, total) = watch::channel(0);

        tokio::spawn(
            async move {
                let mut pending = 0i64;
                while let Some(delta) = incoming.recv().await {
                    pending += delta;
                    tracing::trace!("{} articles pending", pending);
                    publish.send_replace(pending);
                }
            }
            .in_current_span(),
        );

        Self { deltas, total }
    }

    pub fn add(&self, count: u64) {
        let _ = self.deltas.send(count as i64);
    }

    pub fn done(&self, count: u64) {
        let _ = self.deltas.send(-(count as i64));
    }

    /// Latest published total
    pub fn pending(&self) -> i64 {
        *self.total.borrow()
    }

    /// Watches the total as it changes
    pub fn subscribe(&self) -> watch::Receiver<i64> {
        self.total.clone()
    }
}
