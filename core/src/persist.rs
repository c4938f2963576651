use crate::{DocMeta, Error, Index, InvertedIndex, Lexicon, Posting, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub num_docs: u32,
    pub num_terms: u32,
    pub stemmed: bool,
    pub created_at: String,
}

impl MetaFile {
    pub fn describe(index: &Index, stemmed: bool) -> Self {
        Self {
            version: FORMAT_VERSION,
            num_docs: index.num_docs() as u32,
            num_terms: index.lexicon.len() as u32,
            stemmed,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
        }
    }
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn lexicon(&self) -> PathBuf { self.root.join("lexicon.bin") }
    pub fn postings(&self) -> PathBuf { self.root.join("postings.bin") }
    pub fn doc_lengths(&self) -> PathBuf { self.root.join("doc-lengths.bin") }
    pub fn metadata(&self) -> PathBuf { self.root.join("metadata.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

/// Every binary artifact starts with a tag naming it and the format version.
#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    magic: [u8; 4],
    version: u32,
    payload: T,
}

struct Artifact {
    name: &'static str,
    magic: [u8; 4],
}

const LEXICON: Artifact = Artifact { name: "lexicon", magic: *b"TLEX" };
const POSTINGS: Artifact = Artifact { name: "postings", magic: *b"TPST" };
const DOC_LENGTHS: Artifact = Artifact { name: "doc-lengths", magic: *b"TDLN" };
const METADATA: Artifact = Artifact { name: "metadata", magic: *b"TMET" };

fn write_artifact<T: Serialize>(path: &Path, artifact: &Artifact, payload: &T) -> Result<()> {
    let envelope = Envelope { magic: artifact.magic, version: FORMAT_VERSION, payload };
    let bytes = bincode::serialize(&envelope).map_err(|e| Error::corrupt(artifact.name, e.to_string()))?;
    let mut f = File::create(path)?;
    f.write_all(&bytes)?;
    f.sync_all()?;
    Ok(())
}

fn read_artifact<T: DeserializeOwned + Serialize>(path: &Path, artifact: &Artifact) -> Result<T> {
    let mut f = File::open(path).map_err(|e| Error::from_open(e, path))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf)?;
    let envelope: Envelope<T> =
        bincode::deserialize(&buf).map_err(|e| Error::corrupt(artifact.name, e.to_string()))?;
    if envelope.magic != artifact.magic {
        return Err(Error::corrupt(artifact.name, "unexpected file tag"));
    }
    if envelope.version != FORMAT_VERSION {
        return Err(Error::corrupt(
            artifact.name,
            format!("format version {}, expected {FORMAT_VERSION}", envelope.version),
        ));
    }
    let consumed = bincode::serialized_size(&envelope).map_err(|e| Error::corrupt(artifact.name, e.to_string()))?;
    if consumed != buf.len() as u64 {
        return Err(Error::corrupt(artifact.name, format!("{} trailing bytes", buf.len() as u64 - consumed)));
    }
    Ok(envelope.payload)
}

/// Create a fresh index directory. An existing path is never reused.
pub fn create_index_dir(paths: &IndexPaths) -> Result<()> {
    if let Some(parent) = paths.root.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::create_dir(&paths.root).map_err(|e| match e.kind() {
        std::io::ErrorKind::AlreadyExists => Error::DestinationExists { path: paths.root.clone() },
        _ => Error::Io(e),
    })
}

pub fn save_lexicon(paths: &IndexPaths, lexicon: &Lexicon) -> Result<()> {
    write_artifact(&paths.lexicon(), &LEXICON, &lexicon.terms())
}

pub fn load_lexicon(paths: &IndexPaths) -> Result<Lexicon> {
    let terms: Vec<String> = read_artifact(&paths.lexicon(), &LEXICON)?;
    Lexicon::from_terms(terms)
}

pub fn save_postings(paths: &IndexPaths, inverted: &InvertedIndex) -> Result<()> {
    let lists: Vec<&[Posting]> = inverted.iter().map(|(_, list)| list).collect();
    write_artifact(&paths.postings(), &POSTINGS, &lists)
}

pub fn load_postings(paths: &IndexPaths) -> Result<InvertedIndex> {
    let lists: Vec<Vec<Posting>> = read_artifact(&paths.postings(), &POSTINGS)?;
    Ok(InvertedIndex::from_lists(lists))
}

pub fn save_doc_lengths(paths: &IndexPaths, doc_lengths: &[u32]) -> Result<()> {
    write_artifact(&paths.doc_lengths(), &DOC_LENGTHS, &doc_lengths)
}

pub fn load_doc_lengths(paths: &IndexPaths) -> Result<Vec<u32>> {
    read_artifact(&paths.doc_lengths(), &DOC_LENGTHS)
}

pub fn save_metadata(paths: &IndexPaths, metadata: &[DocMeta]) -> Result<()> {
    write_artifact(&paths.metadata(), &METADATA, &metadata)
}

pub fn load_metadata(paths: &IndexPaths) -> Result<Vec<DocMeta>> {
    read_artifact(&paths.metadata(), &METADATA)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta).map_err(|e| Error::corrupt("meta", e.to_string()))?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let path = paths.meta();
    let mut f = File::open(&path).map_err(|e| Error::from_open(e, &path))?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf).map_err(|e| Error::corrupt("meta", e.to_string()))?;
    if meta.version != FORMAT_VERSION {
        return Err(Error::corrupt("meta", format!("format version {}, expected {FORMAT_VERSION}", meta.version)));
    }
    Ok(meta)
}

/// Write all four artifacts and the manifest into an existing directory.
pub fn save_index(paths: &IndexPaths, index: &Index, meta: &MetaFile) -> Result<()> {
    save_lexicon(paths, &index.lexicon)?;
    save_postings(paths, &index.inverted)?;
    save_doc_lengths(paths, &index.doc_lengths)?;
    save_metadata(paths, &index.metadata)?;
    save_meta(paths, meta)?;
    Ok(())
}

/// Load and cross-check a whole index directory.
pub fn load_index(paths: &IndexPaths) -> Result<(Index, MetaFile)> {
    if !paths.root.is_dir() {
        return Err(Error::InputNotFound { path: paths.root.clone() });
    }
    let meta = load_meta(paths)?;
    let index = Index {
        lexicon: load_lexicon(paths)?,
        inverted: load_postings(paths)?,
        doc_lengths: load_doc_lengths(paths)?,
        metadata: load_metadata(paths)?,
    };
    index.validate()?;
    if index.num_docs() != meta.num_docs as usize || index.lexicon.len() != meta.num_terms as usize {
        return Err(Error::corrupt(
            "meta",
            format!(
                "manifest declares {} docs / {} terms, artifacts hold {} / {}",
                meta.num_docs,
                meta.num_terms,
                index.num_docs(),
                index.lexicon.len()
            ),
        ));
    }
    tracing::debug!(num_docs = meta.num_docs, num_terms = meta.num_terms, "loaded index");
    Ok((index, meta))
}
