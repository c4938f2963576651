use crate::{Error, Lexicon, Result, TermId, Tokenizer};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Topics keyed by id (iterated in ascending order) plus counts of what was dropped.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QuerySet {
    pub topics: BTreeMap<u32, Vec<TermId>>,
    /// Topic/text pairs skipped because a line was malformed.
    pub skipped: usize,
    /// Query tokens absent from the lexicon.
    pub unknown_terms: usize,
}

pub fn load_queries(path: &Path, tokenizer: Tokenizer, lexicon: &Lexicon) -> Result<QuerySet> {
    let file = File::open(path).map_err(|e| Error::from_open(e, path))?;
    parse_queries(BufReader::new(file), tokenizer, lexicon)
}

/// Parse alternating topic-id and query-text lines.
pub fn parse_queries<R: BufRead>(reader: R, tokenizer: Tokenizer, lexicon: &Lexicon) -> Result<QuerySet> {
    let mut set = QuerySet::default();
    let mut pending: Option<(usize, Result<u32>)> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let Some((topic_line, topic)) = pending.take() else {
            if !line.trim().is_empty() {
                pending = Some((line_no, parse_topic_id(line_no, &line)));
            }
            continue;
        };
        let topic = match topic {
            Ok(topic) => topic,
            Err(e) => {
                tracing::warn!(line = topic_line, error = %e, "skipping query");
                set.skipped += 1;
                continue;
            }
        };

        let mut terms = Vec::new();
        for token in tokenizer.tokens(&line) {
            match lexicon.resolve_existing(&token) {
                Some(tid) => terms.push(tid),
                None => set.unknown_terms += 1,
            }
        }
        if set.topics.insert(topic, terms).is_some() {
            tracing::warn!(topic, line = topic_line, "duplicate topic id, keeping the later query");
            set.skipped += 1;
        }
    }

    if let Some((line, _)) = pending {
        let e = Error::MalformedQueryLine { line, reason: "topic id without query text".into() };
        tracing::warn!(error = %e, "skipping query");
        set.skipped += 1;
    }
    if set.skipped > 0 {
        tracing::warn!(skipped = set.skipped, "malformed query lines were skipped");
    }
    tracing::debug!(topics = set.topics.len(), unknown_terms = set.unknown_terms, "parsed queries");
    Ok(set)
}

fn parse_topic_id(line: usize, text: &str) -> Result<u32> {
    text.trim()
        .parse()
        .map_err(|_| Error::MalformedQueryLine { line, reason: format!("topic id {:?} is not an integer", text.trim()) })
}
