//! NNTP wire protocol client
//!
//! Only the handful of commands the indexer needs are modeled:
//! - `AUTHINFO USER` / `AUTHINFO PASS` (RFC 4643)
//! - `GROUP` to select a newsgroup and read its watermarks
//! - `HEAD` to fetch one article's headers by number
//! - `QUIT`
//!
//! A connection is not shared; callers own it exclusively and drive one
//! command at a time.

mod connection;
mod error;
mod headers;

pub use connection::{NntpConnection, NntpStream};
pub use error::NntpError;
pub use headers::{canonical_key, parse_header_block, HeaderMap};

/// Service available, posting allowed
pub const SERVICE_READY: u16 = 200;
/// Service available, posting prohibited
pub const SERVICE_READY_NO_POSTING: u16 = 201;
/// Connection closing
pub const CLOSING: u16 = 205;
/// Group successfully selected
pub const GROUP_SELECTED: u16 = 211;
/// Headers follow
pub const HEAD_FOLLOWS: u16 = 221;
/// Authentication accepted
pub const AUTH_ACCEPTED: u16 = 281;
/// Password required
pub const PASSWORD_REQUIRED: u16 = 381;
/// No such newsgroup
pub const NO_SUCH_GROUP: u16 = 411;
/// No article with that number
pub const NO_SUCH_ARTICLE: u16 = 423;

/// A group's article range as reported by `GROUP`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSnapshot {
    pub name: String,
    /// Estimated number of articles
    pub count: u64,
    pub low: u64,
    pub high: u64,
}
