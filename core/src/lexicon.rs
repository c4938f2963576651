use crate::{Error, Result, TermId};
use std::collections::HashMap;

/// Bidirectional term <-> id mapping. Ids are dense and assigned in order of
/// first sighting.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Lexicon {
    terms: Vec<String>,
    ids: HashMap<String, TermId>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a lexicon from its id-ordered term list.
    pub fn from_terms(terms: Vec<String>) -> Result<Self> {
        let mut ids = HashMap::with_capacity(terms.len());
        for (id, term) in terms.iter().enumerate() {
            if ids.insert(term.clone(), id as TermId).is_some() {
                return Err(Error::corrupt("lexicon", format!("duplicate term {term:?} at id {id}")));
            }
        }
        Ok(Self { terms, ids })
    }

    /// Build-time lookup: returns the existing id or assigns the next one.
    pub fn resolve_or_create(&mut self, term: &str) -> TermId {
        if let Some(&id) = self.ids.get(term) {
            return id;
        }
        let id = self.terms.len() as TermId;
        self.terms.push(term.to_string());
        self.ids.insert(term.to_string(), id);
        id
    }

    /// Query-time lookup. Unknown terms yield `None` and leave the lexicon untouched.
    pub fn resolve_existing(&self, term: &str) -> Option<TermId> {
        self.ids.get(term).copied()
    }

    pub fn term(&self, id: TermId) -> Option<&str> {
        self.terms.get(id as usize).map(String::as_str)
    }

    /// Terms in id order.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
