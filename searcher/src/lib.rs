use anyhow::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use trec_core::bm25::{Bm25, Bm25Params};
use trec_core::boolean::{conjunction, MissingTerms};
use trec_core::persist::{load_index, IndexPaths};
use trec_core::query::{load_queries, QuerySet};
use trec_core::run::{RunScore, RunWriter};
use trec_core::{Index, Tokenizer};

/// Inputs shared by both engines.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub index: PathBuf,
    pub queries: PathBuf,
    pub output: PathBuf,
    pub run_tag: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub topics: usize,
    pub lines: usize,
    pub skipped_queries: usize,
    pub unknown_terms: usize,
}

struct Session {
    index: Index,
    queries: QuerySet,
}

/// Load the index, then tokenize the queries the same way the index was built.
fn open_session(opts: &SearchOptions) -> Result<Session> {
    let (index, meta) =
        load_index(&IndexPaths::new(&opts.index)).with_context(|| format!("loading index {}", opts.index.display()))?;
    let tokenizer = Tokenizer::new(meta.stemmed);
    let queries = load_queries(&opts.queries, tokenizer, &index.lexicon)
        .with_context(|| format!("reading queries {}", opts.queries.display()))?;
    tracing::info!(
        num_docs = index.num_docs(),
        num_terms = index.lexicon.len(),
        topics = queries.topics.len(),
        stemmed = meta.stemmed,
        "search session ready"
    );
    Ok(Session { index, queries })
}

fn create_output(opts: &SearchOptions) -> Result<RunWriter<BufWriter<File>>> {
    let file = File::create(&opts.output).with_context(|| format!("creating run file {}", opts.output.display()))?;
    Ok(RunWriter::new(BufWriter::new(file), opts.run_tag.clone()))
}

fn summarize(session: &Session, lines: usize) -> RunSummary {
    RunSummary {
        topics: session.queries.topics.len(),
        lines,
        skipped_queries: session.queries.skipped,
        unknown_terms: session.queries.unknown_terms,
    }
}

/// Rank every topic with BM25 and write the top `top_k` documents per topic.
pub fn run_bm25(opts: &SearchOptions, params: Bm25Params, top_k: usize) -> Result<RunSummary> {
    let session = open_session(opts)?;
    let bm25 = Bm25::new(&session.index, params);
    let mut writer = create_output(opts)?;

    for (&topic, terms) in &session.queries.topics {
        let ranked = bm25.rank(terms, top_k);
        let hits = ranked.iter().filter_map(|s| {
            let meta = session.index.meta(s.doc_id)?;
            Some((meta.docno.as_str(), RunScore::Relevance(s.score)))
        });
        let written = writer.write_topic(topic, hits)?;
        tracing::debug!(topic, candidates = ranked.len(), written, "ranked topic");
    }

    let lines = writer.lines();
    writer.finish()?;
    let summary = summarize(&session, lines);
    tracing::info!(topics = summary.topics, lines, output = %opts.output.display(), "bm25 run written");
    Ok(summary)
}

/// Evaluate every topic as a conjunction and write the matches in doc id order.
pub fn run_boolean(opts: &SearchOptions, policy: MissingTerms) -> Result<RunSummary> {
    let session = open_session(opts)?;
    let mut writer = create_output(opts)?;

    for (&topic, terms) in &session.queries.topics {
        let docs = conjunction(&session.index.inverted, terms, policy);
        let total = docs.len();
        let hits = docs.iter().enumerate().filter_map(|(i, &doc_id)| {
            let meta = session.index.meta(doc_id)?;
            Some((meta.docno.as_str(), RunScore::Remaining(total - (i + 1))))
        });
        let written = writer.write_topic(topic, hits)?;
        tracing::debug!(topic, matches = total, written, "evaluated topic");
    }

    let lines = writer.lines();
    writer.finish()?;
    let summary = summarize(&session, lines);
    tracing::info!(topics = summary.topics, lines, output = %opts.output.display(), "boolean run written");
    Ok(summary)
}
