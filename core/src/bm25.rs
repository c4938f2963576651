//! Okapi BM25 ranking over an in-memory [`Index`].

use crate::{DocId, Index, TermId};
use std::cmp::Ordering;
use std::collections::HashMap;

pub const BM25_K1: f64 = 1.2;
pub const BM25_B: f64 = 0.75;
pub const DEFAULT_TOP_K: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: BM25_K1, b: BM25_B }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDoc {
    pub doc_id: DocId,
    pub score: f64,
}

/// Descending score, then ascending doc id.
fn rank_order(a: &ScoredDoc, b: &ScoredDoc) -> Ordering {
    b.score.total_cmp(&a.score).then(a.doc_id.cmp(&b.doc_id))
}

pub struct Bm25<'a> {
    index: &'a Index,
    params: Bm25Params,
    avg_doc_len: f64,
}

impl<'a> Bm25<'a> {
    pub fn new(index: &'a Index, params: Bm25Params) -> Self {
        let avg = index.avg_doc_len();
        Self { index, params, avg_doc_len: if avg > 0.0 { avg } else { 1.0 } }
    }

    pub fn idf(&self, df: u32) -> f64 {
        let n = self.index.num_docs() as f64;
        let df = f64::from(df);
        ((n - df + 0.5) / (df + 0.5)).ln()
    }

    /// Contribution of one term occurring `tf` times in a document of `doc_len` tokens.
    pub fn term_score(&self, tf: u32, df: u32, doc_len: u32) -> f64 {
        let Bm25Params { k1, b } = self.params;
        let tf = f64::from(tf);
        let norm = 1.0 - b + b * f64::from(doc_len) / self.avg_doc_len;
        self.idf(df) * tf / (tf + k1 * norm)
    }

    /// Score every document matching at least one query term and return the
    /// best `top_k`. Repeated query terms add their contribution repeatedly.
    pub fn rank(&self, terms: &[TermId], top_k: usize) -> Vec<ScoredDoc> {
        let mut scores: HashMap<DocId, f64> = HashMap::new();
        for &tid in terms {
            let Some(postings) = self.index.inverted.postings(tid) else { continue };
            let df = postings.len() as u32;
            for p in postings {
                let contrib = self.term_score(p.tf, df, self.index.doc_len(p.doc_id));
                *scores.entry(p.doc_id).or_insert(0.0) += contrib;
            }
        }

        let mut scored: Vec<ScoredDoc> = scores.into_iter().map(|(doc_id, score)| ScoredDoc { doc_id, score }).collect();
        if top_k == 0 {
            return Vec::new();
        }
        if scored.len() > top_k {
            scored.select_nth_unstable_by(top_k - 1, rank_order);
            scored.truncate(top_k);
        }
        scored.sort_by(rank_order);
        scored
    }
}
