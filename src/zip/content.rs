use std::io::Read;

use flate2::Crc;
use flate2::read::DeflateDecoder;

use crate::error::ReadError;
use crate::io::ReadAt;

use super::archive::Archive;
use super::directory::data_offset;
use super::structures::{CompressionMethod, FormatError, ZipFileEntry};

/// Upper bound on the buffer reserved up front from a header's claimed size.
const MAX_PREALLOC: u64 = 16 * 1024 * 1024;

const BOM: char = '\u{feff}';

impl<R: ReadAt> Archive<R> {
    /// Decompress an entry into memory.
    ///
    /// Every call reads and inflates the entry again; nothing is cached.
    /// The decompressed length and CRC-32 are checked against the central
    /// directory.
    pub async fn read_bytes(&self, entry: &ZipFileEntry) -> Result<Vec<u8>, ReadError> {
        if entry.is_encrypted() {
            return Err(ReadError::Encrypted);
        }

        let reader = self.reader();
        let offset = data_offset(reader, entry).await?;
        if offset
            .checked_add(entry.compressed_size)
            .is_none_or(|end| end > reader.size())
        {
            return Err(FormatError::OutOfBounds("entry data").into());
        }

        let mut raw = vec![0u8; entry.compressed_size as usize];
        reader.read_exact_at(offset, &mut raw).await?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => inflate(&raw, entry.uncompressed_size)?,
            CompressionMethod::Unknown(method) => {
                return Err(ReadError::UnsupportedCompression(method));
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            return Err(ReadError::SizeMismatch {
                expected: entry.uncompressed_size,
                actual: data.len() as u64,
            });
        }

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            return Err(ReadError::Checksum {
                expected: entry.crc32,
                actual: crc.sum(),
            });
        }

        Ok(data)
    }

    /// Decompress an entry and decode it as UTF-8 text.
    ///
    /// A leading byte order mark is dropped.
    pub async fn read_text(&self, entry: &ZipFileEntry) -> Result<String, ReadError> {
        let bytes = self.read_bytes(entry).await?;
        let mut text = String::from_utf8(bytes)?;
        if text.starts_with(BOM) {
            text.replace_range(..BOM.len_utf8(), "");
        }
        Ok(text)
    }
}

/// Inflate at most one byte more than `expected`, which is enough for the
/// caller to see a size mismatch without expanding the whole stream.
fn inflate(raw: &[u8], expected: u64) -> Result<Vec<u8>, ReadError> {
    let mut out = Vec::with_capacity(expected.min(MAX_PREALLOC) as usize);
    DeflateDecoder::new(raw)
        .take(expected.saturating_add(1))
        .read_to_end(&mut out)
        .map_err(ReadError::Decompress)?;
    Ok(out)
}
