use std::time::Duration;
use thiserror::Error;

use super::NO_SUCH_ARTICLE;

/// Errors from a single NNTP exchange
#[derive(Debug, Error)]
pub enum NntpError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed by server")]
    Closed,

    #[error("No response within {0:?}")]
    Timeout(Duration),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("Invalid TLS server name: {0}")]
    ServerName(String),

    #[error("Malformed response: {0:?}")]
    Malformed(String),

    #[error("Malformed header line: {0:?}")]
    MalformedHeader(String),

    #[error("Server replied {code} {message}")]
    Status { code: u16, message: String },
}

impl NntpError {
    /// Whether the connection can no longer be trusted and must be redialed.
    ///
    /// A status reply or a bad header line inside a fully read block leaves
    /// the stream in sync; everything else does not.
    pub fn is_connection_error(&self) -> bool {
        !matches!(self, Self::Status { .. } | Self::MalformedHeader(_))
    }

    /// The NNTP status code, for status replies
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// `423`: the article number does not exist in the group
    pub fn is_no_such_article(&self) -> bool {
        self.status_code() == Some(NO_SUCH_ARTICLE)
    }
}
