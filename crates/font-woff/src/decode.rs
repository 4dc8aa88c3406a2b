use std::io::Read;

use flate2::read::ZlibDecoder;
use fontverter_sfnt::{CancelToken, DecodedFont, Reader, SfntImage, SfntTable, WebFontExtras};
use log::{debug, warn};

use crate::{Error, Result, WoffHeader, WoffOptions, WoffTableEntry};

/// Unpack a WOFF file into its SFNT tables and extras.
///
/// Tables come back in the order their data appears in the file, so packing
/// an SFNT and unpacking it again preserves its table layout.
pub fn decode(data: &[u8], options: &WoffOptions) -> Result<DecodedFont> {
    let cancel = options.cancel.as_ref();
    let mut reader = Reader::new(data);
    let header = WoffHeader::read(&mut reader)?;

    if header.length as usize != data.len() {
        return Err(Error::malformed(format!(
            "WOFF header declares {} bytes but the file has {}",
            header.length,
            data.len()
        )));
    }
    if header.num_tables == 0 {
        return Err(Error::malformed("WOFF file has no tables"));
    }

    let mut entries = (0..header.num_tables)
        .map(|_| WoffTableEntry::read(&mut reader))
        .collect::<Result<Vec<_>>>()?;
    let data_start = reader.position();
    entries.sort_by_key(|entry| entry.offset);

    let mut image = SfntImage::new(header.flavor);
    for entry in &entries {
        CancelToken::check(cancel)?;

        if entry.comp_length > entry.orig_length {
            return Err(Error::malformed(format!(
                "table '{}' is larger compressed ({}) than uncompressed ({})",
                entry.tag, entry.comp_length, entry.orig_length
            )));
        }
        let what = format!("table '{}'", entry.tag);
        let payload = block(data, data_start, entry.offset, entry.comp_length, &what)?;

        let table_data = if entry.is_compressed() {
            debug!("Inflating '{}' ({} -> {} bytes)", entry.tag, entry.comp_length, entry.orig_length);
            inflate(payload, entry.orig_length, &what)?
        } else {
            payload.to_vec()
        };

        let table = SfntTable { tag: entry.tag, checksum: entry.orig_checksum, data: table_data };
        if !table.checksum_matches() {
            warn!("Table '{}' checksum does not match its data", entry.tag);
        }
        image.push(table)?;
    }

    let mut extras = WebFontExtras {
        version: Some((header.major_version, header.minor_version)),
        ..WebFontExtras::default()
    };
    if header.meta_length > 0 {
        let compressed = block(data, data_start, header.meta_offset, header.meta_length, "metadata")?;
        extras.metadata = Some(inflate(compressed, header.meta_orig_length, "metadata")?);
    }
    if header.priv_length > 0 {
        let private = block(data, data_start, header.priv_offset, header.priv_length, "private data")?;
        extras.private_data = Some(private.to_vec());
    }

    if header.total_sfnt_size as usize != image.serialized_size() {
        debug!(
            "WOFF totalSfntSize is {} but the tables serialize to {} bytes",
            header.total_sfnt_size,
            image.serialized_size()
        );
    }

    Ok(DecodedFont { image, extras })
}

/// Slice `length` bytes at `offset`, which must lie after the directory.
fn block<'a>(data: &'a [u8], data_start: usize, offset: u32, length: u32, what: &str) -> Result<&'a [u8]> {
    let start = offset as usize;
    start
        .checked_add(length as usize)
        .filter(|&end| start >= data_start && end <= data.len())
        .map(|end| &data[start..end])
        .ok_or_else(|| {
            Error::malformed(format!(
                "{what} ({length} bytes at offset {offset}) lies outside the WOFF data area"
            ))
        })
}

/// Inflate a zlib stream that must produce exactly `expected` bytes.
///
/// The buffer grows with what the stream actually yields; `expected` comes
/// from the file and only bounds the read.
fn inflate(data: &[u8], expected: u32, what: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .take(u64::from(expected) + 1)
        .read_to_end(&mut out)
        .map_err(Error::Inflate)?;
    if out.len() != expected as usize {
        return Err(Error::malformed(format!(
            "{what} inflated to {} bytes, expected {expected}",
            out.len()
        )));
    }
    Ok(out)
}
