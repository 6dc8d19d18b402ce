use super::CrossRef;
use std::num::ParseIntError;
use thiserror::Error;

/// Why an `Xref` header could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XrefError {
    #[error("malformed xref: {0:?}")]
    Malformed(String),

    #[error("invalid article number in xref entry {token:?}: {source}")]
    Number { token: String, source: ParseIntError },
}

/// Parses `"<server> <group>:<number> <group>:<number> ..."`.
///
/// All or nothing: one bad entry fails the whole header.
pub fn parse_xref(raw: &str) -> Result<Vec<CrossRef>, XrefError> {
    let (server, entries) = raw
        .split_once(' ')
        .ok_or_else(|| XrefError::Malformed(raw.to_string()))?;

    entries
        .split(' ')
        .map(|token| {
            let (group, number) = token
                .split_once(':')
                .ok_or_else(|| XrefError::Malformed(raw.to_string()))?;
            let number = number.parse::<u64>().map_err(|source| XrefError::Number {
                token: token.to_string(),
                source,
            })?;
            Ok(CrossRef {
                server: server.to_string(),
                group: group.to_string(),
                number,
            })
        })
        .collect()
}
