use crate::nntp::GroupSnapshot;

/// Most article numbers fetched by one range request
pub const CHUNK_SIZE: u64 = 20;

/// How far behind the high watermark a fresh cursor starts
pub const BOOTSTRAP_WINDOW: u64 = 100;

/// An inclusive run of article numbers fetched as one unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    pub first: u64,
    pub last: u64,
}

impl Chunk {
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.last - self.first + 1
    }
}

/// Splits `[start, end)` into consecutive chunks of at most `size` numbers
pub fn chunk_range(start: u64, end: u64, size: u64) -> Vec<Chunk> {
    if size == 0 {
        return Vec::new();
    }
    (start..end)
        .step_by(size as usize)
        .map(|first| Chunk {
            first,
            last: first.saturating_add(size - 1).min(end - 1),
        })
        .collect()
}

/// The next article number not yet dispatched for one group
///
/// Lives only in memory: a restart bootstraps again from the high
/// watermark.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor {
    start: Option<u64>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` until the first snapshot is planned
    pub fn start(&self) -> Option<u64> {
        self.start
    }

    /// Chunks covering everything from the cursor up to, not including,
    /// the snapshot's high watermark. Empty when there is nothing new.
    ///
    /// The first snapshot seen positions the cursor `BOOTSTRAP_WINDOW`
    /// below its high watermark.
    pub fn plan(&mut self, snapshot: &GroupSnapshot) -> Vec<Chunk> {
        let start = *self
            .start
            .get_or_insert_with(|| snapshot.high.saturating_sub(BOOTSTRAP_WINDOW));

        if snapshot.high <= start {
            return Vec::new();
        }
        chunk_range(start, snapshot.high, CHUNK_SIZE)
    }

    /// Marks everything below `high` as dispatched
    pub fn advance(&mut self, high: u64) {
        self.start = Some(high);
    }
}
