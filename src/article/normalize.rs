use super::{parse_posting_date, parse_xref, Article, ArticleError};
use crate::nntp::HeaderMap;

const MESSAGE_ID: &str = "Message-Id";
const SUBJECT: &str = "Subject";
const XREF: &str = "Xref";
const DATE: &str = "Date";

/// Headers removed from [`Article::header`] once normalized. The first four
/// are promoted to typed fields; the last two are noise.
pub const STRIPPED_HEADERS: [&str; 6] = [MESSAGE_ID, SUBJECT, XREF, DATE, "Organization", "Path"];

fn first_value<'a>(header: &'a HeaderMap, key: &str) -> Option<&'a String> {
    header.get(key).and_then(|values| values.first())
}

/// Builds an [`Article`] from raw `HEAD` headers.
///
/// Never fails: each missing or unusable field adds one entry to
/// `errors` and leaves the field at its zero value.
pub fn build_article(mut header: HeaderMap) -> Article {
    let mut article = Article::default();

    match first_value(&header, MESSAGE_ID) {
        Some(id) => article.message_id = id.clone(),
        None => article.errors.push(ArticleError::MissingHeader(MESSAGE_ID)),
    }

    match first_value(&header, SUBJECT) {
        Some(subject) => article.subject = subject.clone(),
        None => article.errors.push(ArticleError::MissingHeader(SUBJECT)),
    }

    match first_value(&header, XREF).map(|raw| parse_xref(raw)) {
        Some(Ok(xrefs)) => article.xrefs = xrefs,
        Some(Err(e)) => article.errors.push(e.into()),
        None => article.errors.push(ArticleError::MissingHeader(XREF)),
    }

    match first_value(&header, DATE).map(|raw| parse_posting_date(raw)) {
        Some(Ok(date)) => article.timestamp = date.timestamp(),
        Some(Err(e)) => article.errors.push(e.into()),
        None => article.errors.push(ArticleError::MissingHeader(DATE)),
    }

    for key in STRIPPED_HEADERS {
        header.remove(key);
    }
    article.header = header;

    article
}
