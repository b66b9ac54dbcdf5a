//! Error types for archive access, entry reading and link extraction.
//!
//! Each layer wraps the error of the layer below as its `source()`, so the
//! full chain stays available to the caller. Messages describe only their
//! own layer; print with `{:#}` (anyhow) or walk `source()` for the rest.

use std::fmt;
use std::io;
use std::string::FromUtf8Error;

use thiserror::Error;

use crate::io::FetchError;
use crate::links::XmlError;
use crate::zip::FormatError;

/// Errors raised while opening an archive or looking up its entries.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot open {location}")]
    Open {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("cannot fetch {url}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("{location} is not a readable zip archive")]
    Format {
        location: String,
        #[source]
        source: FormatError,
    },

    #[error("no entry named \"{0}\"")]
    EntryNotFound(String),

    #[error("no entry name contains \"{0}\"")]
    NoMatch(String),
}

impl ArchiveError {
    /// Whether the archive could not be opened at all, as opposed to a
    /// failed lookup on an open archive.
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            ArchiveError::Open { .. } | ArchiveError::Fetch { .. } | ArchiveError::Format { .. }
        )
    }
}

/// Errors raised while materializing one entry's content.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("entry is encrypted")]
    Encrypted,

    #[error("unsupported compression method: {0}")]
    UnsupportedCompression(u16),

    #[error("corrupt entry header")]
    Format(#[from] FormatError),

    #[error("I/O error while reading entry data")]
    Io(#[from] io::Error),

    #[error("decompression failed")]
    Decompress(#[source] io::Error),

    /// For deflated entries `actual` is capped at `expected + 1`.
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    SizeMismatch { expected: u64, actual: u64 },

    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    Checksum { expected: u32, actual: u32 },

    #[error("content is not valid UTF-8")]
    Utf8(#[from] FromUtf8Error),
}

/// Pipeline step a [`LinkError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Open,
    Selection,
    Read,
    Parse,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Open => "open",
            Stage::Selection => "selection",
            Stage::Read => "read",
            Stage::Parse => "parse",
        })
    }
}

/// Failure of a link extraction run.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("opening the archive failed")]
    Open(#[source] ArchiveError),

    #[error("selecting entries failed")]
    Selection(#[source] ArchiveError),

    #[error("reading {entry} failed")]
    Read {
        entry: String,
        #[source]
        source: ReadError,
    },

    #[error("parsing {entry} failed")]
    Parse {
        entry: String,
        #[source]
        source: XmlError,
    },
}

impl LinkError {
    pub fn stage(&self) -> Stage {
        match self {
            LinkError::Open(_) => Stage::Open,
            LinkError::Selection(_) => Stage::Selection,
            LinkError::Read { .. } => Stage::Read,
            LinkError::Parse { .. } => Stage::Parse,
        }
    }

    /// Name of the entry being processed, for read and parse failures.
    pub fn entry(&self) -> Option<&str> {
        match self {
            LinkError::Read { entry, .. } | LinkError::Parse { entry, .. } => Some(entry),
            LinkError::Open(_) | LinkError::Selection(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn link_error_keeps_source() {
        let err = LinkError::Selection(ArchiveError::NoMatch("zzz".to_string()));
        assert_eq!(err.stage(), Stage::Selection);
        assert_eq!(err.entry(), None);
        assert_eq!(err.to_string(), "selecting entries failed");
        assert_eq!(
            err.source().unwrap().to_string(),
            "no entry name contains \"zzz\""
        );
    }

    #[test]
    fn open_errors_are_grouped() {
        let open = ArchiveError::Open {
            location: "missing.epub".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(open.is_open_error());
        assert!(!ArchiveError::EntryNotFound("x".to_string()).is_open_error());
        assert!(!ArchiveError::NoMatch("x".to_string()).is_open_error());
    }

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Read.to_string(), "read");
        assert_eq!(Stage::Parse.to_string(), "parse");
    }
}
