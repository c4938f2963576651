use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while building, loading or querying an index.
#[derive(Error, Debug)]
pub enum Error {
    #[error("input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("malformed query file at line {line}: {reason}")]
    MalformedQueryLine { line: usize, reason: String },

    #[error("malformed run file at line {line}: {reason}")]
    MalformedRunLine { line: usize, reason: String },

    #[error("index artifact `{artifact}` is corrupt: {reason}")]
    IndexCorrupt { artifact: &'static str, reason: String },

    #[error("destination already exists: {}", path.display())]
    DestinationExists { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn corrupt(artifact: &'static str, reason: impl Into<String>) -> Self {
        Error::IndexCorrupt { artifact, reason: reason.into() }
    }

    /// Map an open failure to `InputNotFound` when the file is absent.
    pub fn from_open(err: std::io::Error, path: &std::path::Path) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Error::InputNotFound { path: path.to_path_buf() }
        } else {
            Error::Io(err)
        }
    }

    /// Whether the error only affects a single record or line and the caller may skip it.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::MalformedRecord(_) | Error::MalformedQueryLine { .. } | Error::MalformedRunLine { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_input_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::from_open(io, std::path::Path::new("/tmp/missing.gz"));
        assert!(matches!(err, Error::InputNotFound { .. }));
        assert!(err.to_string().contains("/tmp/missing.gz"));
    }

    #[test]
    fn corrupt_names_the_artifact() {
        let err = Error::corrupt("lexicon", "bad magic");
        assert_eq!(err.to_string(), "index artifact `lexicon` is corrupt: bad magic");
        assert!(!err.is_recoverable());
        assert!(Error::MalformedRecord("x".into()).is_recoverable());
    }
}
