//! Error types for volarc operations.
//!
//! One error enum covers every failure mode in the workspace: I/O errors
//! from the underlying stream, container-format violations, and the
//! packing-time rejections (duplicates, overflow, self-overwrite).
//! All of these are deterministic; nothing is retried or silently
//! recovered.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for volarc operations.
#[derive(Debug, Error)]
pub enum VolError {
    /// I/O error from underlying reader/writer.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed section header, bad padding marker, or length overflow.
    #[error("Malformed header at offset {offset}: {message}")]
    MalformedHeader {
        /// Byte offset where the violation was detected.
        offset: u64,
        /// Description of the violation.
        message: String,
    },

    /// Entry index past the valid entry count.
    #[error("Entry index {index} out of range (archive has {count} entries)")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Number of valid entries in the archive.
        count: usize,
    },

    /// Named entry does not exist in the archive.
    #[error("Entry not found: {name}")]
    NameNotFound {
        /// Name of the missing entry.
        name: String,
    },

    /// Compression kind the extractor cannot handle.
    #[error("Unsupported compression kind: {kind:#06x}")]
    UnsupportedCompression {
        /// The raw compression-kind code from the index entry.
        kind: u16,
    },

    /// Two entries collide case-insensitively when packing.
    #[error("Duplicate entry name (case-insensitive): {name}")]
    DuplicateName {
        /// The colliding name.
        name: String,
    },

    /// A computed offset or length exceeds the format's 32-bit limits.
    #[error("Size overflow: {message}")]
    SizeOverflow {
        /// Description of the overflowing quantity.
        message: String,
    },

    /// Packing into a path that is also one of the source files.
    #[error("Refusing to overwrite source file: {path}")]
    SelfOverwrite {
        /// The destination path that collides with a source.
        path: PathBuf,
    },
}

/// Result type alias for volarc operations.
pub type Result<T> = std::result::Result<T, VolError>;

impl VolError {
    /// Create a malformed header error.
    pub fn malformed_header(offset: u64, message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            offset,
            message: message.into(),
        }
    }

    /// Create an index out of range error.
    pub fn index_out_of_range(index: usize, count: usize) -> Self {
        Self::IndexOutOfRange { index, count }
    }

    /// Create a name not found error.
    pub fn name_not_found(name: impl Into<String>) -> Self {
        Self::NameNotFound { name: name.into() }
    }

    /// Create an unsupported compression error.
    pub fn unsupported_compression(kind: u16) -> Self {
        Self::UnsupportedCompression { kind }
    }

    /// Create a duplicate name error.
    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }

    /// Create a size overflow error.
    pub fn size_overflow(message: impl Into<String>) -> Self {
        Self::SizeOverflow {
            message: message.into(),
        }
    }

    /// Create a self-overwrite error.
    pub fn self_overwrite(path: impl Into<PathBuf>) -> Self {
        Self::SelfOverwrite { path: path.into() }
    }
}
