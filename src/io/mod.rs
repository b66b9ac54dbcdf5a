//! Byte sources an archive can be read from.
//!
//! Everything above this module talks to a [`ReadAt`] and never to a concrete
//! backend. Two backends are provided:
//!
//! - [`LocalFileReader`]: positional reads from a file on disk
//! - [`MemoryReader`]: an owned buffer, typically the body of an HTTP response
//!
//! Remote archives are fetched in full through a [`Fetch`] implementation
//! ([`HttpFetcher`] by default) and then wrapped in a [`MemoryReader`].

mod http;
mod local;
mod memory;

pub use http::{Fetch, FetchError, HttpFetcher};
pub use local::LocalFileReader;
pub use memory::MemoryReader;

use async_trait::async_trait;
use std::io;

/// Trait for random access reading from a data source
#[async_trait]
pub trait ReadAt: Send + Sync {
    /// Read data at the specified offset into the buffer.
    ///
    /// May read fewer bytes than requested. Returns 0 at or past the end.
    async fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Get the total size of the data source
    fn size(&self) -> u64;

    /// Fill `buf` completely from `offset`, failing with
    /// [`io::ErrorKind::UnexpectedEof`] if the source ends first.
    async fn read_exact_at(&self, mut offset: u64, mut buf: &mut [u8]) -> io::Result<()> {
        while !buf.is_empty() {
            match self.read_at(offset, buf).await {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("source ended at offset {offset}"),
                    ));
                }
                Ok(n) => {
                    let rest = buf;
                    buf = &mut rest[n..];
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
