//! Article entity and header normalization
//!
//! Everything here is pure: raw `HEAD` headers go in, an [`Article`] comes
//! out. Problems with individual fields are recorded on the article as
//! [`ArticleError`]s instead of being returned, so a partially broken
//! article still flows downstream.

mod date;
mod normalize;
mod xref;

pub use date::{parse_posting_date, DateError};
pub use normalize::{build_article, STRIPPED_HEADERS};
pub use xref::{parse_xref, XrefError};

use crate::nntp::{HeaderMap, NntpError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A normalized article header record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Article {
    /// Remaining headers, with promoted fields removed
    pub header: HeaderMap,
    pub message_id: String,
    pub subject: String,
    pub xrefs: Vec<CrossRef>,
    /// Seconds since the Unix epoch; zero when the date was unusable
    pub timestamp: i64,
    pub errors: Vec<ArticleError>,
}

/// One group an article is filed under, and its number there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossRef {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,
    pub group: String,
    pub number: u64,
}

/// A problem found while building an article
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArticleError {
    #[error("missing {0}")]
    MissingHeader(&'static str),

    #[error(transparent)]
    Xref(#[from] XrefError),

    #[error(transparent)]
    Date(#[from] DateError),

    #[error("HEAD {number} in {group} failed: {message}")]
    Fetch {
        group: String,
        number: u64,
        message: String,
    },
}

impl Article {
    /// Placeholder for an article that could not be fetched: it carries only
    /// a cross-reference to where it should have been, and the error.
    pub fn fetch_failed(group: &str, number: u64, error: &NntpError) -> Self {
        Self {
            xrefs: vec![CrossRef {
                server: String::new(),
                group: group.to_string(),
                number,
            }],
            errors: vec![ArticleError::Fetch {
                group: group.to_string(),
                number,
                message: error.to_string(),
            }],
            ..Self::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Article number within `group`, if the article is cross-referenced there
    pub fn number_in(&self, group: &str) -> Option<u64> {
        self.xrefs
            .iter()
            .find(|x| x.group == group)
            .map(|x| x.number)
    }
}
