use crate::article::Article;
use crate::storage::{ArticleStore, StorageError};
use kanal::AsyncReceiver;

/// Progress is logged every this many stored articles
const PROGRESS_EVERY: u64 = 100;

/// Inserts every article it receives. Duplicates count as stored; other
/// failures are logged and skipped. Returns the number of articles
/// processed once the fetch stage hangs up.
pub(crate) async fn load<S: ArticleStore>(
    group: String,
    mut store: S,
    articles: AsyncReceiver<Article>,
) -> u64 {
    let mut processed = 0u64;

    while let Ok(article) = articles.recv().await {
        match store.insert(&group, &article) {
            Ok(()) => {}
            Err(StorageError::DuplicateKey { message_id, .. }) => {
                tracing::trace!("Already stored {}", message_id);
            }
            Err(e) => {
                tracing::error!("Failed to store {:?}: {}", article, e);
                continue;
            }
        }

        processed += 1;
        if processed % PROGRESS_EVERY == 0 {
            tracing::debug!("{} articles processed", processed);
        }
    }

    processed
}
