use crate::corpus::{parse_record, ParsedDoc};
use crate::{DocId, DocMeta, Index, InvertedIndex, Lexicon, Posting, Result, TermId, Tokenizer};
use std::collections::HashMap;

const PROGRESS_EVERY: usize = 10_000;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub documents: usize,
    pub skipped: usize,
    pub terms: usize,
}

/// Accumulates documents into an [`Index`]. Documents get doc ids in the
/// order they are added, so every postings list stays doc-id ascending.
pub struct IndexBuilder {
    tokenizer: Tokenizer,
    lexicon: Lexicon,
    inverted: InvertedIndex,
    doc_lengths: Vec<u32>,
    metadata: Vec<DocMeta>,
}

impl IndexBuilder {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            tokenizer,
            lexicon: Lexicon::new(),
            inverted: InvertedIndex::new(),
            doc_lengths: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn add_document(&mut self, doc: ParsedDoc) -> DocId {
        let doc_id = self.doc_lengths.len() as DocId;

        let mut tf_counts: HashMap<TermId, u32> = HashMap::new();
        let mut length = 0u32;
        for token in self.tokenizer.tokens(&doc.text) {
            let tid = self.lexicon.resolve_or_create(&token);
            *tf_counts.entry(tid).or_insert(0) += 1;
            length += 1;
        }
        for (tid, tf) in tf_counts {
            self.inverted.push(tid, Posting { doc_id, tf });
        }

        self.doc_lengths.push(length);
        self.metadata.push(DocMeta { docno: doc.docno, date: doc.date, headline: doc.headline });
        doc_id
    }

    pub fn num_docs(&self) -> usize {
        self.doc_lengths.len()
    }

    pub fn finish(self) -> Index {
        Index {
            lexicon: self.lexicon,
            inverted: self.inverted,
            doc_lengths: self.doc_lengths,
            metadata: self.metadata,
        }
    }
}

/// Index every well-formed record of `records`. Malformed records are skipped
/// and counted; read errors abort the build.
pub fn build<I>(records: I, tokenizer: Tokenizer) -> Result<(Index, BuildStats)>
where
    I: IntoIterator<Item = std::io::Result<String>>,
{
    let mut builder = IndexBuilder::new(tokenizer);
    let mut skipped = 0usize;
    for (ordinal, raw) in records.into_iter().enumerate() {
        let raw = raw?;
        match parse_record(&raw) {
            Ok(doc) => {
                builder.add_document(doc);
                if builder.num_docs() % PROGRESS_EVERY == 0 {
                    tracing::info!(documents = builder.num_docs(), "indexing");
                }
            }
            Err(e) if e.is_recoverable() => {
                skipped += 1;
                tracing::warn!(record = ordinal, error = %e, "skipping record");
            }
            Err(e) => return Err(e),
        }
    }

    let index = builder.finish();
    let stats = BuildStats { documents: index.num_docs(), skipped, terms: index.lexicon.len() };
    if skipped > 0 {
        tracing::warn!(skipped, "malformed records were skipped");
    }
    tracing::info!(num_docs = stats.documents, num_terms = stats.terms, "ingested documents");
    Ok((index, stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocDate;

    fn doc(docno: &str, text: &str) -> ParsedDoc {
        ParsedDoc {
            docno: docno.into(),
            date: DocDate { month: 1, day: 1, year: 1989 },
            headline: String::new(),
            text: text.into(),
        }
    }

    #[test]
    fn two_document_scenario() {
        let mut b = IndexBuilder::new(Tokenizer::new(false));
        assert_eq!(b.add_document(doc("A", "cat dog cat")), 0);
        assert_eq!(b.add_document(doc("B", "dog bird")), 1);
        let index = b.finish();

        assert_eq!(index.lexicon.terms(), &["cat", "dog", "bird"]);
        assert_eq!(index.inverted.postings(0).unwrap(), &[Posting { doc_id: 0, tf: 2 }]);
        assert_eq!(
            index.inverted.postings(1).unwrap(),
            &[Posting { doc_id: 0, tf: 1 }, Posting { doc_id: 1, tf: 1 }]
        );
        assert_eq!(index.inverted.postings(2).unwrap(), &[Posting { doc_id: 1, tf: 1 }]);
        assert_eq!(index.doc_lengths, vec![3, 2]);
        assert_eq!(index.meta(1).unwrap().docno, "B");
        index.validate().unwrap();
    }

    #[test]
    fn empty_document_still_gets_a_slot() {
        let mut b = IndexBuilder::new(Tokenizer::new(false));
        b.add_document(doc("A", "  ... "));
        b.add_document(doc("B", "word"));
        let index = b.finish();
        assert_eq!(index.doc_lengths, vec![0, 1]);
        assert_eq!(index.metadata.len(), 2);
        assert_eq!(index.inverted.postings(0).unwrap(), &[Posting { doc_id: 1, tf: 1 }]);
    }

    #[test]
    fn malformed_records_are_skipped_and_counted() {
        let records: Vec<std::io::Result<String>> = vec![
            Ok("<DOC><DOCNO> LA010189-0001 </DOCNO><TEXT>alpha beta</TEXT></DOC>\n".to_string()),
            Ok("<DOC><TEXT>no docno here</TEXT></DOC>\n".to_string()),
            Ok("<DOC><DOCNO> LA010289-0002 </DOCNO><TEXT>beta</TEXT></DOC>\n".to_string()),
        ];
        let (index, stats) = build(records, Tokenizer::new(false)).unwrap();
        assert_eq!(stats, BuildStats { documents: 2, skipped: 1, terms: 2 });
        assert_eq!(index.metadata[1].docno, "LA010289-0002");
        assert_eq!(index.inverted.df(1), 2);
    }

    #[test]
    fn read_errors_abort() {
        let bad = std::io::Error::new(std::io::ErrorKind::InvalidData, "bad gzip");
        let records: Vec<std::io::Result<String>> = vec![Err(bad)];
        assert!(build(records, Tokenizer::new(false)).is_err());
    }
}
