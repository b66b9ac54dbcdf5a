use std::path::Path;

use tracing::debug;

use crate::error::ArchiveError;
use crate::io::{Fetch, LocalFileReader, MemoryReader, ReadAt};

use super::directory::read_central_directory;
use super::structures::ZipFileEntry;

/// An opened zip archive over any [`ReadAt`] source.
///
/// The central directory is parsed once on open; lookups work on that list
/// and never touch the source. Entry content is read on demand, see
/// [`Archive::read_text`].
pub struct Archive<R: ReadAt> {
    reader: R,
    location: String,
    entries: Vec<ZipFileEntry>,
}

impl<R: ReadAt> Archive<R> {
    /// Open an archive over `reader`. `location` names the source in errors
    /// and logs.
    pub async fn open(reader: R, location: impl Into<String>) -> Result<Self, ArchiveError> {
        let location = location.into();
        let entries = match read_central_directory(&reader).await {
            Ok(entries) => entries,
            Err(source) => return Err(ArchiveError::Format { location, source }),
        };

        debug!(%location, entries = entries.len(), "opened archive");
        Ok(Self {
            reader,
            location,
            entries,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    /// All entries, in the order the central directory stores them.
    pub fn entries(&self) -> &[ZipFileEntry] {
        &self.entries
    }

    /// The entry whose name is exactly `name`.
    pub fn entry_by_name(&self, name: &str) -> Result<&ZipFileEntry, ArchiveError> {
        self.entries
            .iter()
            .find(|e| e.file_name == name)
            .ok_or_else(|| ArchiveError::EntryNotFound(name.to_string()))
    }

    /// Every entry whose name contains `fragment`, in archive order.
    ///
    /// An empty selection is an error: an empty archive and a filter that
    /// matches nothing both report [`ArchiveError::NoMatch`].
    pub fn entries_by_name_substring(
        &self,
        fragment: &str,
    ) -> Result<Vec<&ZipFileEntry>, ArchiveError> {
        let selection: Vec<_> = self
            .entries
            .iter()
            .filter(|e| e.file_name.contains(fragment))
            .collect();

        if selection.is_empty() {
            return Err(ArchiveError::NoMatch(fragment.to_string()));
        }
        Ok(selection)
    }

    /// Release the underlying source.
    pub fn close(self) {
        debug!(location = %self.location, "closing archive");
    }

    pub(crate) fn reader(&self) -> &R {
        &self.reader
    }
}

impl Archive<LocalFileReader> {
    /// Open a zip archive stored on the local filesystem.
    pub async fn open_path(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let location = path.display().to_string();
        let reader = match LocalFileReader::new(path) {
            Ok(reader) => reader,
            Err(source) => return Err(ArchiveError::Open { location, source }),
        };
        Self::open(reader, location).await
    }
}

impl Archive<MemoryReader> {
    /// Open a zip archive already held in memory.
    pub async fn from_bytes(
        bytes: Vec<u8>,
        location: impl Into<String>,
    ) -> Result<Self, ArchiveError> {
        Self::open(MemoryReader::new(bytes), location).await
    }

    /// Fetch a remote archive in full, then open it from memory.
    pub async fn fetch<F: Fetch + ?Sized>(fetcher: &F, url: &str) -> Result<Self, ArchiveError> {
        let bytes = fetcher
            .fetch(url)
            .await
            .map_err(|source| ArchiveError::Fetch {
                url: url.to_string(),
                source,
            })?;
        Self::from_bytes(bytes, url).await
    }
}
