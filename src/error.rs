use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::types::Field;

/// Common result type for toccata operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid configuration, including an unknown output
    /// profile. Fatal before any file is touched.
    #[error("configuration error: {0}")]
    Config(String),

    /// A filename split into a segment count the schema policy rejects.
    #[error("{name}: {found} fields but the schema expects {expected}")]
    SchemaMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    /// A track-number field that does not reduce to an integer.
    #[error("{name}: invalid track number \"{value}\"")]
    InvalidTrackNumber { name: String, value: String },

    /// Two tracks in one directory disagree on an album-scoped field.
    #[error("tracks disagree on {field}: \"{first}\" vs \"{second}\"")]
    InconsistentMetadata {
        field: Field,
        first: String,
        second: String,
    },

    /// A file referenced by a ToC is gone from disk.
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// A ToC document that exists but cannot be parsed.
    #[error("corrupt ToC {}: {source}", .path.display())]
    CorruptToc {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// A ToC document that cannot be serialized.
    #[error("cannot encode ToC for {}: {source}", .path.display())]
    EncodeToc {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The external converter exited with a non-zero status.
    #[error("converter failed for {}: {status}", .path.display())]
    Converter { path: PathBuf, status: ExitStatus },

    /// Tag read/write failure surfaced by the tag library.
    #[error("{}: {message}", .path.display())]
    Tag { path: PathBuf, message: String },

    /// Some tracks or directories failed; details were logged as they
    /// happened.
    #[error("finished with {0} failures")]
    Incomplete(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
