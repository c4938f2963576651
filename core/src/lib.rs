//! Batch indexing and retrieval over TREC-style tagged corpora.
//!
//! The pipeline is: [`corpus`] splits a gzip stream into records, [`builder`]
//! tokenizes them into an [`Index`], [`persist`] writes and reads the index
//! directory, [`query`] maps topic text to term ids, and [`bm25`] / [`boolean`]
//! produce the results that [`run`] formats as run-file lines.

pub mod bm25;
pub mod boolean;
pub mod builder;
pub mod corpus;
pub mod error;
pub mod eval;
pub mod index;
pub mod lexicon;
pub mod persist;
pub mod query;
pub mod run;
pub mod tokenizer;

pub use error::{Error, Result};
pub use index::{DocDate, DocId, DocMeta, Index, InvertedIndex, Posting, TermId};
pub use lexicon::Lexicon;
pub use tokenizer::Tokenizer;
