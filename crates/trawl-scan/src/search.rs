//! Literal substring search within one session log.

use regex::{Regex, RegexBuilder};
use std::path::Path;
use trawl_format::{LogRecord, RecordReader, SearchMatch};

/// Characters of context kept before a match.
pub const CONTEXT_BEFORE: usize = 50;
/// Characters of context kept after a match.
pub const CONTEXT_AFTER: usize = 100;

/// A compiled literal query. Regex metacharacters in the query match
/// themselves.
#[derive(Debug, Clone)]
pub struct Matcher {
    query: String,
    re: Regex,
}

impl Matcher {
    pub fn new(query: &str, case_sensitive: bool) -> Result<Self, regex::Error> {
        let re = RegexBuilder::new(&regex::escape(query))
            .case_insensitive(!case_sensitive)
            .build()?;
        Ok(Self {
            query: query.to_string(),
            re,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Byte range of the first occurrence in `text`.
    pub fn find(&self, text: &str) -> Option<(usize, usize)> {
        self.re.find(text).map(|m| (m.start(), m.end()))
    }
}

/// Everything searchable in a user or assistant record, space-joined.
pub fn searchable_text(record: &LogRecord) -> String {
    match record.content() {
        Some(content) => content.searchable_parts().join(" "),
        None => String::new(),
    }
}

/// Up to [`CONTEXT_BEFORE`] characters before and [`CONTEXT_AFTER`] after
/// the byte range `start..end`, newlines flattened and trimmed, with `...`
/// marking a clipped side.
pub fn context_window(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(CONTEXT_BEFORE - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let to = text[end..]
        .char_indices()
        .nth(CONTEXT_AFTER)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    let mut context = text[from..to].replace('\n', " ").trim().to_string();
    if from > 0 {
        context.insert_str(0, "...");
    }
    if to < text.len() {
        context.push_str("...");
    }
    context
}

/// One match per user/assistant record whose text contains the query, in
/// record order.
pub fn search_records<I>(records: I, matcher: &Matcher) -> Vec<SearchMatch>
where
    I: IntoIterator<Item = LogRecord>,
{
    let mut matches = Vec::new();
    for record in records {
        let Some(role) = record.role() else {
            continue;
        };
        let text = searchable_text(&record);
        if text.is_empty() {
            continue;
        }
        if let Some((start, end)) = matcher.find(&text) {
            matches.push(SearchMatch {
                role: role.to_string(),
                context: context_window(&text, start, end),
                timestamp: record.timestamp,
            });
        }
    }
    matches
}

/// Search one session log. An unreadable file has no matches.
pub fn search_session(path: &Path, matcher: &Matcher) -> Vec<SearchMatch> {
    match RecordReader::open(path) {
        Ok(reader) => search_records(reader, matcher),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "cannot open session");
            Vec::new()
        }
    }
}
