//! Central directory parsing.
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the file's end
//! 2. If ZIP64, read the ZIP64 EOCD for the 64-bit counts and offsets
//! 3. Read the Central Directory in one go and parse every entry
//!
//! Local file headers are only touched when an entry's data is read, see
//! [`data_offset`].

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

use crate::io::ReadAt;

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: u64 = 65535;

/// ZIP64 extended information extra field
const ZIP64_EXTRA_ID: u16 = 0x0001;

/// Check that `len` bytes starting at `offset` lie inside a source of `size` bytes.
fn check_bounds(offset: u64, len: u64, size: u64, what: &'static str) -> Result<(), FormatError> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(FormatError::OutOfBounds(what)),
    }
}

/// Find and parse the End of Central Directory record.
///
/// Returns the record together with its offset in the source.
async fn find_eocd<R: ReadAt + ?Sized>(
    reader: &R,
) -> Result<(EndOfCentralDirectory, u64), FormatError> {
    let size = reader.size();
    let record = EndOfCentralDirectory::SIZE as u64;
    if size < record {
        return Err(FormatError::MissingEndOfCentralDirectory);
    }

    // Common case first: no archive comment, record sits at the very end.
    let offset = size - record;
    let mut buf = vec![0u8; EndOfCentralDirectory::SIZE];
    reader.read_exact_at(offset, &mut buf).await?;
    if &buf[0..4] == EndOfCentralDirectory::SIGNATURE {
        let eocd = EndOfCentralDirectory::from_bytes(&buf)?;
        if eocd.comment_len == 0 {
            return Ok((eocd, offset));
        }
    }

    // Otherwise scan backwards through the largest possible comment.
    let search_size = (MAX_COMMENT_SIZE + record).min(size);
    let search_start = size - search_size;
    let mut buf = vec![0u8; search_size as usize];
    reader.read_exact_at(search_start, &mut buf).await?;

    for i in (0..=buf.len() - EndOfCentralDirectory::SIZE).rev() {
        if &buf[i..i + 4] != EndOfCentralDirectory::SIGNATURE {
            continue;
        }

        // A real record's comment runs exactly to the end of the file.
        let eocd = EndOfCentralDirectory::from_bytes(&buf[i..])?;
        if eocd.comment_len as usize == buf.len() - i - EndOfCentralDirectory::SIZE {
            return Ok((eocd, search_start + i as u64));
        }
    }

    Err(FormatError::MissingEndOfCentralDirectory)
}

/// Read the ZIP64 End of Central Directory record through its locator,
/// which sits immediately before the classic EOCD.
async fn read_zip64_eocd<R: ReadAt + ?Sized>(
    reader: &R,
    eocd_offset: u64,
) -> Result<Zip64EOCD, FormatError> {
    let locator_offset = eocd_offset
        .checked_sub(Zip64EOCDLocator::SIZE as u64)
        .ok_or(FormatError::OutOfBounds("ZIP64 locator"))?;
    let mut locator_buf = vec![0u8; Zip64EOCDLocator::SIZE];
    reader.read_exact_at(locator_offset, &mut locator_buf).await?;
    let locator = Zip64EOCDLocator::from_bytes(&locator_buf)?;

    check_bounds(
        locator.eocd64_offset,
        Zip64EOCD::MIN_SIZE as u64,
        reader.size(),
        "ZIP64 end of central directory",
    )?;
    let mut eocd64_buf = vec![0u8; Zip64EOCD::MIN_SIZE];
    reader
        .read_exact_at(locator.eocd64_offset, &mut eocd64_buf)
        .await?;

    Zip64EOCD::from_bytes(&eocd64_buf)
}

/// Read every entry of the central directory, in stored order.
pub(crate) async fn read_central_directory<R: ReadAt + ?Sized>(
    reader: &R,
) -> Result<Vec<ZipFileEntry>, FormatError> {
    let (eocd, eocd_offset) = find_eocd(reader).await?;

    let (cd_offset, cd_size, total_entries) = if eocd.is_zip64() {
        let eocd64 = read_zip64_eocd(reader, eocd_offset).await?;
        (eocd64.cd_offset, eocd64.cd_size, eocd64.total_entries)
    } else {
        (
            u64::from(eocd.cd_offset),
            u64::from(eocd.cd_size),
            u64::from(eocd.total_entries),
        )
    };

    check_bounds(cd_offset, cd_size, reader.size(), "central directory")?;
    let mut cd_data = vec![0u8; cd_size as usize];
    reader.read_exact_at(cd_offset, &mut cd_data).await?;

    // The entry count comes from the file; never trust it for allocation.
    let capacity = total_entries.min(cd_size / CDFH_MIN_SIZE as u64) as usize;
    let mut entries = Vec::with_capacity(capacity);
    let mut cursor = Cursor::new(cd_data.as_slice());

    for _ in 0..total_entries {
        entries.push(parse_cdfh(&mut cursor)?);
    }

    Ok(entries)
}

/// Parse one Central Directory File Header.
fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> Result<ZipFileEntry, FormatError> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        return Err(FormatError::BadSignature("central directory file header"));
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = u64::from(cursor.read_u32::<LittleEndian>()?);
    let mut uncompressed_size = u64::from(cursor.read_u32::<LittleEndian>()?);
    let file_name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_field_length = cursor.read_u16::<LittleEndian>()?;
    let file_comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut lfh_offset = u64::from(cursor.read_u32::<LittleEndian>()?);

    let mut file_name_bytes = vec![0u8; file_name_length as usize];
    cursor.read_exact(&mut file_name_bytes)?;
    let file_name = String::from_utf8_lossy(&file_name_bytes).into_owned();
    let is_directory = file_name.ends_with('/');

    // ZIP64 values are present only for header fields saturated to 0xFFFFFFFF,
    // in the order uncompressed, compressed, offset.
    let extra_field_end = cursor.position() + u64::from(extra_field_length);
    while cursor.position() + 4 <= extra_field_end {
        let header_id = cursor.read_u16::<LittleEndian>()?;
        let field_size = cursor.read_u16::<LittleEndian>()?;
        let field_end = cursor.position() + u64::from(field_size);

        if header_id == ZIP64_EXTRA_ID {
            if uncompressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                uncompressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if compressed_size == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                compressed_size = cursor.read_u64::<LittleEndian>()?;
            }
            if lfh_offset == 0xFFFFFFFF && cursor.position() + 8 <= field_end {
                lfh_offset = cursor.read_u64::<LittleEndian>()?;
            }
        }
        cursor.set_position(field_end);
    }

    cursor.set_position(extra_field_end + u64::from(file_comment_length));

    Ok(ZipFileEntry {
        file_name,
        compression_method: CompressionMethod::from_u16(compression_method),
        flags,
        compressed_size,
        uncompressed_size,
        crc32,
        lfh_offset,
        is_directory,
    })
}

/// Offset of an entry's compressed data.
///
/// The local header repeats the name and carries its own extra field, whose
/// length may differ from the central directory's, so it has to be read.
pub(crate) async fn data_offset<R: ReadAt + ?Sized>(
    reader: &R,
    entry: &ZipFileEntry,
) -> Result<u64, FormatError> {
    check_bounds(entry.lfh_offset, LFH_SIZE as u64, reader.size(), "local file header")?;
    let mut lfh_buf = vec![0u8; LFH_SIZE];
    reader.read_exact_at(entry.lfh_offset, &mut lfh_buf).await?;

    if &lfh_buf[0..4] != LFH_SIGNATURE {
        return Err(FormatError::BadSignature("local file header"));
    }

    let mut cursor = Cursor::new(&lfh_buf[26..]);
    let file_name_length = u64::from(cursor.read_u16::<LittleEndian>()?);
    let extra_field_length = u64::from(cursor.read_u16::<LittleEndian>()?);

    Ok(entry.lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length)
}
