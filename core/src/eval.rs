//! Effectiveness metrics for a run file against binary relevance judgments.

use crate::run::RunEntry;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{BufRead, Write};

/// Cut-off used for average precision.
pub const AP_DEPTH: usize = 1000;

/// Relevant docnos per topic. Topics without a positive judgment are absent.
#[derive(Debug, Default, Clone)]
pub struct Qrels {
    pub relevant: BTreeMap<u32, HashSet<String>>,
    pub skipped: usize,
}

pub fn parse_qrels<R: BufRead>(reader: R) -> Result<Qrels> {
    let mut qrels = Qrels::default();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let parsed = match fields.as_slice() {
            [topic, _iter, docno, judgment] => match (topic.parse::<u32>(), judgment.parse::<i32>()) {
                (Ok(topic), Ok(judgment)) => Some((topic, *docno, judgment)),
                _ => None,
            },
            _ => None,
        };
        let Some((topic, docno, judgment)) = parsed else {
            tracing::warn!(line = idx + 1, "skipping malformed qrels line");
            qrels.skipped += 1;
            continue;
        };
        if judgment > 0 {
            qrels.relevant.entry(topic).or_default().insert(docno.to_string());
        }
    }
    Ok(qrels)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub docno: String,
    pub score: f64,
}

/// Parse a run file into per-topic lists ordered by descending score, ties by
/// descending docno. The first malformed line is an error.
pub fn parse_run<R: BufRead>(reader: R) -> Result<HashMap<u32, Vec<Ranked>>> {
    let mut results: HashMap<u32, Vec<Ranked>> = HashMap::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let entry = RunEntry::parse(idx + 1, &line)?;
        results
            .entry(entry.topic)
            .or_default()
            .push(Ranked { docno: entry.docno, score: entry.score.value() });
    }
    for docs in results.values_mut() {
        docs.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| b.docno.cmp(&a.docno)));
    }
    Ok(results)
}

pub fn average_precision(ranked: &[Ranked], relevant: &HashSet<String>) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let mut hits = 0usize;
    let mut sum = 0.0;
    for (i, doc) in ranked.iter().take(AP_DEPTH).enumerate() {
        if relevant.contains(&doc.docno) {
            hits += 1;
            sum += hits as f64 / (i + 1) as f64;
        }
    }
    sum / relevant.len() as f64
}

pub fn precision_at(ranked: &[Ranked], relevant: &HashSet<String>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = ranked.iter().take(k).filter(|d| relevant.contains(&d.docno)).count();
    hits as f64 / k as f64
}

fn discount(i: usize) -> f64 {
    1.0 / ((i + 2) as f64).log2()
}

pub fn ndcg_at(ranked: &[Ranked], relevant: &HashSet<String>, k: usize) -> f64 {
    let dcg: f64 = ranked
        .iter()
        .take(k)
        .enumerate()
        .filter(|(_, d)| relevant.contains(&d.docno))
        .map(|(i, _)| discount(i))
        .sum();
    let idcg: f64 = (0..relevant.len().min(k)).map(discount).sum();
    if idcg == 0.0 {
        0.0
    } else {
        dcg / idcg
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopicScores {
    pub topic: u32,
    pub average_precision: f64,
    pub ndcg_10: f64,
    pub ndcg_1000: f64,
    pub precision_10: f64,
}

/// Score every judged topic, in ascending topic order. Topics missing from
/// the run score zero.
pub fn evaluate(qrels: &Qrels, run: &HashMap<u32, Vec<Ranked>>) -> Vec<TopicScores> {
    qrels
        .relevant
        .iter()
        .map(|(&topic, relevant)| {
            let ranked = run.get(&topic).map(Vec::as_slice).unwrap_or(&[]);
            TopicScores {
                topic,
                average_precision: average_precision(ranked, relevant),
                ndcg_10: ndcg_at(ranked, relevant, 10),
                ndcg_1000: ndcg_at(ranked, relevant, 1000),
                precision_10: precision_at(ranked, relevant, 10),
            }
        })
        .collect()
}

pub fn mean(scores: &[TopicScores]) -> Option<TopicScores> {
    if scores.is_empty() {
        return None;
    }
    let n = scores.len() as f64;
    let avg = |f: fn(&TopicScores) -> f64| scores.iter().map(f).sum::<f64>() / n;
    Some(TopicScores {
        topic: 0,
        average_precision: avg(|s| s.average_precision),
        ndcg_10: avg(|s| s.ndcg_10),
        ndcg_1000: avg(|s| s.ndcg_1000),
        precision_10: avg(|s| s.precision_10),
    })
}

pub fn write_csv<W: Write>(mut out: W, scores: &[TopicScores]) -> Result<()> {
    writeln!(out, "Topic Number,Average Precision,NDCG@10,NDCG@1000,Precision@10")?;
    for s in scores {
        writeln!(
            out,
            "{},{:.3},{:.3},{:.3},{:.3}",
            s.topic, s.average_precision, s.ndcg_10, s.ndcg_1000, s.precision_10
        )?;
    }
    out.flush().map_err(Error::from)
}
