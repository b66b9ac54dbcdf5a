//! Archive → selected entries → text → tokens → links.

use std::path::Path;

use tracing::{debug, info};

use crate::error::LinkError;
use crate::io::{Fetch, ReadAt};
use crate::links::extract_hrefs;
use crate::zip::{Archive, ZipFileEntry};

/// Name fragment shared by the section documents of an EPUB.
pub const SECTION_FRAGMENT: &str = "OEBPS/Text/Section";

/// The documents whose name contains `name_fragment`, in archive order.
///
/// Directory entries are matched like any other but left out of the result,
/// since they have no content to read.
pub fn select_documents<'a, R: ReadAt>(
    archive: &'a Archive<R>,
    name_fragment: &str,
) -> Result<Vec<&'a ZipFileEntry>, LinkError> {
    let selection = archive
        .entries_by_name_substring(name_fragment)
        .map_err(LinkError::Selection)?;

    Ok(selection.into_iter().filter(|e| !e.is_directory).collect())
}

/// Extract the links of every entry whose name contains `name_fragment`.
///
/// Entries are processed one after another in archive order, and the result
/// keeps that order, then document order within each entry. The first
/// failing entry aborts the run; no partial result is returned.
pub async fn extract_links<R: ReadAt>(
    archive: &Archive<R>,
    name_fragment: &str,
) -> Result<Vec<String>, LinkError> {
    let selection = select_documents(archive, name_fragment)?;

    let mut links = Vec::new();
    for entry in &selection {
        let text = archive
            .read_text(entry)
            .await
            .map_err(|source| LinkError::Read {
                entry: entry.file_name.clone(),
                source,
            })?;

        let hrefs = extract_hrefs(&text).map_err(|source| LinkError::Parse {
            entry: entry.file_name.clone(),
            source,
        })?;

        debug!(entry = %entry.file_name, links = hrefs.len(), "extracted links");
        links.extend(hrefs);
    }

    info!(
        archive = archive.location(),
        entries = selection.len(),
        links = links.len(),
        "link extraction finished"
    );
    Ok(links)
}

/// Open a local archive, extract its links, and close it again.
pub async fn links_from_file(
    path: impl AsRef<Path>,
    name_fragment: &str,
) -> Result<Vec<String>, LinkError> {
    let archive = Archive::open_path(path).await.map_err(LinkError::Open)?;
    let result = extract_links(&archive, name_fragment).await;
    archive.close();
    result
}

/// Fetch a remote archive, extract its links, and release it.
pub async fn links_from_url<F: Fetch + ?Sized>(
    fetcher: &F,
    url: &str,
    name_fragment: &str,
) -> Result<Vec<String>, LinkError> {
    let archive = Archive::fetch(fetcher, url)
        .await
        .map_err(LinkError::Open)?;
    let result = extract_links(&archive, name_fragment).await;
    archive.close();
    result
}

/// Links of the section documents of a local EPUB.
pub async fn epub_links_from_file(path: impl AsRef<Path>) -> Result<Vec<String>, LinkError> {
    links_from_file(path, SECTION_FRAGMENT).await
}

/// Links of the section documents of a remote EPUB.
pub async fn epub_links_from_url<F: Fetch + ?Sized>(
    fetcher: &F,
    url: &str,
) -> Result<Vec<String>, LinkError> {
    links_from_url(fetcher, url, SECTION_FRAGMENT).await
}
