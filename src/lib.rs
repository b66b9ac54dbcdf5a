//! # epublinks
//!
//! Extracts the hyperlinks embedded in the section documents of an EPUB.
//!
//! An EPUB is a zip archive of XHTML documents. This library opens the archive
//! from a local file or from a buffer fetched over HTTP, selects the entries
//! whose names contain a fragment ([`SECTION_FRAGMENT`] by default), streams
//! each one through an XML tokenizer and collects the `href` of every `a`
//! element. Links come back in archive order, then document order, with
//! duplicates kept.
//!
//! ## Features
//!
//! - One archive type over interchangeable byte sources ([`ReadAt`])
//! - Exact and substring entry lookup
//! - STORED and DEFLATE entries, ZIP64, CRC-32 verification
//! - Streaming tokenizer; no DOM is built
//! - Fail-fast pipeline with errors tagged by [`Stage`]
//!
//! ## Runtime
//!
//! The API is async and needs a [Tokio](https://tokio.rs) runtime: archive
//! access goes through the async [`ReadAt`] trait, and [`HttpFetcher`] runs on
//! reqwest and Tokio timers. A run is still strictly sequential, so a
//! current-thread runtime is enough.
//!
//! ## Example
//!
//! ```no_run
//! use epublinks::{Archive, extract_links, SECTION_FRAGMENT};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let archive = Archive::open_path("book.epub").await?;
//!
//!     for entry in archive.entries_by_name_substring(SECTION_FRAGMENT)? {
//!         println!("{}", entry.file_name);
//!     }
//!
//!     let links = extract_links(&archive, SECTION_FRAGMENT).await?;
//!     archive.close();
//!
//!     for link in &links {
//!         println!("{link}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod links;
pub mod pipeline;
pub mod zip;

pub use cli::Cli;
pub use error::{ArchiveError, LinkError, ReadError, Stage};
pub use io::{Fetch, FetchError, HttpFetcher, LocalFileReader, MemoryReader, ReadAt};
pub use links::{XmlError, extract_hrefs};
pub use pipeline::{
    SECTION_FRAGMENT, epub_links_from_file, epub_links_from_url, extract_links, links_from_file,
    links_from_url, select_documents,
};
pub use self::zip::{Archive, ZipFileEntry};
