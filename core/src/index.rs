use crate::{Error, Lexicon, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TermId = u32;
pub type DocId = u32;

/// Publication date recovered from the document number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocDate {
    pub month: u8,
    pub day: u8,
    pub year: u16,
}

impl fmt::Display for DocDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}-{}", self.month, self.day, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    /// External document number, e.g. `LA010189-0001`.
    pub docno: String,
    pub date: DocDate,
    pub headline: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u32,
}

/// Term id -> postings list. Lists are stored densely by term id and are
/// doc-id ascending.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvertedIndex {
    lists: Vec<Vec<Posting>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_lists(lists: Vec<Vec<Posting>>) -> Self {
        Self { lists }
    }

    /// Append a posting for `term`. Callers add documents in ascending doc id order.
    pub fn push(&mut self, term: TermId, posting: Posting) {
        let slot = term as usize;
        if self.lists.len() <= slot {
            self.lists.resize_with(slot + 1, Vec::new);
        }
        self.lists[slot].push(posting);
    }

    pub fn postings(&self, term: TermId) -> Option<&[Posting]> {
        self.lists.get(term as usize).map(Vec::as_slice).filter(|l| !l.is_empty())
    }

    pub fn df(&self, term: TermId) -> u32 {
        self.postings(term).map_or(0, |p| p.len() as u32)
    }

    pub fn num_terms(&self) -> usize {
        self.lists.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TermId, &[Posting])> {
        self.lists.iter().enumerate().map(|(t, l)| (t as TermId, l.as_slice()))
    }

    pub fn num_postings(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }
}

/// Everything a query engine needs: lexicon, postings, doc lengths and metadata.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Index {
    pub lexicon: Lexicon,
    pub inverted: InvertedIndex,
    pub doc_lengths: Vec<u32>,
    pub metadata: Vec<DocMeta>,
}

impl Index {
    pub fn num_docs(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn doc_len(&self, doc_id: DocId) -> u32 {
        self.doc_lengths.get(doc_id as usize).copied().unwrap_or(0)
    }

    pub fn avg_doc_len(&self) -> f64 {
        if self.doc_lengths.is_empty() {
            return 0.0;
        }
        let total: u64 = self.doc_lengths.iter().map(|&l| u64::from(l)).sum();
        total as f64 / self.doc_lengths.len() as f64
    }

    pub fn meta(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.metadata.get(doc_id as usize)
    }

    /// Check the cross-artifact invariants. Used after loading from disk.
    pub fn validate(&self) -> Result<()> {
        if self.doc_lengths.len() != self.metadata.len() {
            return Err(Error::corrupt(
                "doc-lengths",
                format!("{} doc lengths but {} metadata records", self.doc_lengths.len(), self.metadata.len()),
            ));
        }
        if self.inverted.num_terms() != self.lexicon.len() {
            return Err(Error::corrupt(
                "postings",
                format!("{} postings lists but {} lexicon terms", self.inverted.num_terms(), self.lexicon.len()),
            ));
        }
        let num_docs = self.num_docs();
        for (term, list) in self.inverted.iter() {
            if list.is_empty() {
                return Err(Error::corrupt("postings", format!("term {term} has an empty postings list")));
            }
            let mut prev: Option<DocId> = None;
            for p in list {
                if p.doc_id as usize >= num_docs {
                    return Err(Error::corrupt("postings", format!("term {term} references unknown doc {}", p.doc_id)));
                }
                if p.tf == 0 {
                    return Err(Error::corrupt("postings", format!("term {term} has zero tf for doc {}", p.doc_id)));
                }
                if prev.is_some_and(|d| d >= p.doc_id) {
                    return Err(Error::corrupt("postings", format!("term {term} postings are not ascending")));
                }
                prev = Some(p.doc_id);
            }
        }
        Ok(())
    }
}
