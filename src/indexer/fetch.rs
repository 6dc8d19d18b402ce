use super::cursor::{Chunk, Cursor};
use super::meter::PendingMeter;
use crate::article::Article;
use crate::client::ClientPool;
use crate::nntp::GroupSnapshot;
use kanal::{AsyncReceiver, AsyncSender};
use tokio::task::JoinSet;
use tracing::Instrument;

/// Turns snapshots into concurrently fetched chunks and forwards clean
/// articles to the load stage
///
/// The cursor moves as soon as a round is dispatched, so a crash mid-round
/// loses that round's articles until the next bootstrap.
pub(crate) async fn fetch(
    group: String,
    client: ClientPool,
    meter: PendingMeter,
    snapshots: AsyncReceiver<GroupSnapshot>,
    articles: AsyncSender<Article>,
) {
    let mut cursor = Cursor::new();
    let mut chunks = JoinSet::new();

    while let Ok(snapshot) = snapshots.recv().await {
        let planned = cursor.plan(&snapshot);
        if planned.is_empty() {
            tracing::debug!("Nothing new below {}", snapshot.high);
            continue;
        }

        tracing::debug!(
            "Dispatching {} chunks for {}-{}",
            planned.len(),
            planned[0].first,
            snapshot.high - 1
        );
        for chunk in planned {
            meter.add(chunk.len());
            chunks.spawn(
                fetch_chunk(
                    group.clone(),
                    chunk,
                    client.clone(),
                    meter.clone(),
                    articles.clone(),
                )
                .in_current_span(),
            );
        }
        cursor.advance(snapshot.high);

        while chunks.try_join_next().is_some() {}
    }

    while chunks.join_next().await.is_some() {}
}

async fn fetch_chunk(
    group: String,
    chunk: Chunk,
    client: ClientPool,
    meter: PendingMeter,
    articles: AsyncSender<Article>,
) {
    let mut fetched = client.fetch_range(&group, chunk.first, chunk.last);

    while let Some(article) = fetched.recv().await {
        if article.has_errors() {
            // TODO: queue error-bearing articles for a later retry round
            let errors: Vec<String> = article.errors.iter().map(ToString::to_string).collect();
            tracing::warn!(
                "Dropping article {:?} ({:?}): {}",
                article.message_id,
                article.number_in(&group),
                errors.join("; ")
            );
            continue;
        }
        if articles.send(article).await.is_err() {
            tracing::debug!("Load stage gone, abandoning {}-{}", chunk.first, chunk.last);
            break;
        }
    }

    meter.done(chunk.len());
}
