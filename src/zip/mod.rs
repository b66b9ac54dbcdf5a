//! Read-only access to zip archives.
//!
//! ## Architecture
//!
//! - [`structures`]: fixed-layout records (EOCD, ZIP64 records, entries)
//! - `directory`: locating and parsing the central directory
//! - [`Archive`]: the opened archive, with entry lookup and content reading
//!
//! The central directory is read once when the archive is opened. Entry data
//! is fetched through the archive's [`ReadAt`](crate::io::ReadAt) source each
//! time it is requested, so any number of reads can share one open archive.
//!
//! ## Supported Features
//!
//! - Archive comments (EOCD search)
//! - ZIP64 extensions for large archives and entries
//! - STORED and DEFLATE entries, with size and CRC-32 verification
//!
//! ## Limitations
//!
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

mod archive;
mod content;
mod directory;
pub mod structures;

pub use archive::Archive;
pub use structures::{CompressionMethod, FormatError, ZipFileEntry};
