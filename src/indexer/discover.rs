use crate::client::ClientPool;
use crate::nntp::GroupSnapshot;
use kanal::AsyncSender;
use std::time::Duration;

/// Polls the group's watermarks every `delay` and forwards each good
/// snapshot to the fetch stage
pub(crate) async fn discover(
    group: String,
    delay: Duration,
    client: ClientPool,
    snapshots: AsyncSender<GroupSnapshot>,
) {
    loop {
        match client.select_group(&group).await {
            Ok(Ok(snapshot)) => {
                tracing::debug!(
                    "{} articles, {}-{}",
                    snapshot.count,
                    snapshot.low,
                    snapshot.high
                );
                if snapshots.send(snapshot).await.is_err() {
                    tracing::debug!("Fetch stage gone, stopping");
                    return;
                }
            }
            Ok(Err(e)) => tracing::error!("Failed to select {}: {}", group, e),
            Err(_) => tracing::error!("Client pool dropped the request for {}", group),
        }

        tokio::time::sleep(delay).await;
    }
}
