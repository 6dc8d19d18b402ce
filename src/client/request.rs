use crate::article::Article;
use crate::nntp::{GroupSnapshot, NntpError};
use tokio::sync::{mpsc, oneshot};

/// Reply to a group selection
pub type GroupResult = Result<GroupSnapshot, NntpError>;

/// A unit of work for a pool worker; each variant carries its reply channel
#[derive(Debug)]
pub(crate) enum Request {
    Group(GroupRequest),
    Range(RangeRequest),
}

#[derive(Debug)]
pub(crate) struct GroupRequest {
    pub name: String,
    pub reply: oneshot::Sender<GroupResult>,
}

/// Fetch `start..=end` from `group`
#[derive(Debug)]
pub(crate) struct RangeRequest {
    pub group: String,
    pub start: u64,
    pub end: u64,
    pub reply: mpsc::Sender<Article>,
}
