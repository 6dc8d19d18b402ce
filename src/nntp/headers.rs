//! Header block parsing for `HEAD` responses

use super::NntpError;
use std::collections::BTreeMap;

/// Header name to values, in the order they appeared
pub type HeaderMap = BTreeMap<String, Vec<String>>;

/// Canonicalizes a header name: the first letter and every letter after a
/// hyphen upper-cased, the rest lower-cased (`message-ID` -> `Message-Id`).
pub fn canonical_key(key: &str) -> String {
    let mut upper = true;
    key.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

/// Parses the lines of a dot-terminated header block (terminator already
/// removed, dot-unstuffing already applied).
///
/// Folded lines are joined to the previous value with a single space. A
/// repeated header appends another value.
pub fn parse_header_block(lines: &[String]) -> Result<HeaderMap, NntpError> {
    let mut header = HeaderMap::new();
    let mut current: Option<(String, String)> = None;

    for line in lines {
        if line.is_empty() {
            break;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            match current.as_mut() {
                Some((_, value)) => {
                    value.push(' ');
                    value.push_str(line.trim());
                    continue;
                }
                None => return Err(NntpError::MalformedHeader(line.clone())),
            }
        }

        if let Some((key, value)) = current.take() {
            header.entry(key).or_default().push(value);
        }

        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| NntpError::MalformedHeader(line.clone()))?;
        if key.is_empty() || key.contains(char::is_whitespace) {
            return Err(NntpError::MalformedHeader(line.clone()));
        }
        current = Some((canonical_key(key), value.trim().to_string()));
    }

    if let Some((key, value)) = current {
        header.entry(key).or_default().push(value);
    }

    Ok(header)
}
