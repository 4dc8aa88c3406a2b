use std::io::Read;

use fontverter_sfnt::{
    COLLECTION_TAG, CancelToken, DecodedFont, Reader, SfntImage, SfntTable, Tag, WebFontExtras,
    tags::{GLYF, HHEA, HMTX, LOCA},
};
use log::debug;
use read_fonts::{FontData, FontRead, tables::hhea::Hhea};

use crate::{
    Error, Result, Woff2Options,
    directory::{TableDirectoryEntry, Woff2Header},
    glyf::{ReconstructedGlyf, reconstruct_glyf},
    hmtx::{HMTX_TRANSFORM_VERSION, reconstruct_hmtx},
};

/// glyf and loca have the one transform, version 0.
const GLYF_TRANSFORM_VERSION: u8 = 0;

/// Unpack a WOFF2 file into its SFNT tables and extras.
///
/// Tables come back in directory order, which is tag order for files this
/// crate writes. Transformed glyf, loca and hmtx tables are rebuilt.
pub fn decode(data: &[u8], options: &Woff2Options) -> Result<DecodedFont> {
    let cancel = options.cancel.as_ref();
    let mut reader = Reader::new(data);
    let header = Woff2Header::read(&mut reader)?;

    if header.length as usize != data.len() {
        return Err(Error::malformed(format!(
            "WOFF2 header declares {} bytes but the file has {}",
            header.length,
            data.len()
        )));
    }
    if header.flavor == COLLECTION_TAG {
        return Err(Error::malformed("WOFF2 font collections are not supported"));
    }
    if header.num_tables == 0 {
        return Err(Error::malformed("WOFF2 file has no tables"));
    }

    let entries = (0..header.num_tables)
        .map(|_| TableDirectoryEntry::read(&mut reader))
        .collect::<Result<Vec<_>>>()?;
    check_transform_versions(&entries)?;
    check_transform_pairing(&entries)?;

    let compressed = reader.read_bytes(header.total_compressed_size as usize)?;
    let data_end = reader.position();
    let stream_size: u64 = entries.iter().map(|entry| u64::from(entry.stream_length())).sum();
    CancelToken::check(cancel)?;
    let stream = decompress(compressed, stream_size, "table data")?;

    let mut payloads = Vec::with_capacity(entries.len());
    let mut offset = 0;
    for entry in &entries {
        let len = entry.stream_length() as usize;
        payloads.push(&stream[offset..offset + len]);
        offset += len;
    }

    let mut glyf = match entries.iter().position(|entry| entry.tag == GLYF && entry.is_transformed()) {
        Some(index) => Some(rebuild_glyf(payloads[index], &entries)?),
        None => None,
    };

    let mut image = SfntImage::new(header.flavor);
    for (entry, payload) in entries.iter().zip(&payloads) {
        CancelToken::check(cancel)?;

        let table_data = if !entry.is_transformed() {
            payload.to_vec()
        } else {
            match (entry.tag, glyf.as_mut()) {
                (GLYF, Some(rebuilt)) => std::mem::take(&mut rebuilt.glyf),
                (LOCA, Some(rebuilt)) => std::mem::take(&mut rebuilt.loca),
                (HMTX, Some(rebuilt)) => rebuild_hmtx(payload, entry, &entries, &payloads, &rebuilt.x_mins)?,
                (HMTX, None) => {
                    return Err(Error::malformed("transformed hmtx requires a transformed glyf table"));
                }
                (tag, _) => {
                    return Err(Error::malformed(format!(
                        "unknown transform version {} for table '{tag}'",
                        entry.transform_version
                    )));
                }
            }
        };
        image.push(SfntTable::new(entry.tag, table_data))?;
    }

    let mut extras = WebFontExtras {
        version: Some((header.major_version, header.minor_version)),
        ..WebFontExtras::default()
    };
    if header.meta_length > 0 {
        let compressed = block(data, data_end, header.meta_offset, header.meta_length, "metadata")?;
        extras.metadata = Some(decompress(compressed, u64::from(header.meta_orig_length), "metadata")?);
    }
    if header.priv_length > 0 {
        let private = block(data, data_end, header.priv_offset, header.priv_length, "private data")?;
        extras.private_data = Some(private.to_vec());
    }

    if header.total_sfnt_size as usize != image.serialized_size() {
        debug!(
            "WOFF2 totalSfntSize is {} but the tables serialize to {} bytes",
            header.total_sfnt_size,
            image.serialized_size()
        );
    }

    Ok(DecodedFont { image, extras })
}

/// Every transformed table must use a transform this decoder can rebuild.
fn check_transform_versions(entries: &[TableDirectoryEntry]) -> Result<()> {
    let unknown = entries.iter().filter(|entry| entry.is_transformed()).find(|entry| {
        let known = match entry.tag {
            GLYF | LOCA => GLYF_TRANSFORM_VERSION,
            HMTX => HMTX_TRANSFORM_VERSION,
            _ => return true,
        };
        entry.transform_version != known
    });
    match unknown {
        Some(entry) => Err(Error::malformed(format!(
            "unknown transform version {} for table '{}'",
            entry.transform_version, entry.tag
        ))),
        None => Ok(()),
    }
}

/// glyf and loca are either both transformed or both stored.
fn check_transform_pairing(entries: &[TableDirectoryEntry]) -> Result<()> {
    let state = |tag: Tag| entries.iter().find(|entry| entry.tag == tag).map(TableDirectoryEntry::is_transformed);
    match (state(GLYF), state(LOCA)) {
        (Some(glyf), Some(loca)) if glyf != loca => {
            Err(Error::malformed("glyf and loca must both be transformed or both stored"))
        }
        (Some(true), None) | (None, Some(true)) => {
            Err(Error::malformed("a transformed glyf or loca table is missing its partner"))
        }
        _ => Ok(()),
    }
}

fn rebuild_glyf(payload: &[u8], entries: &[TableDirectoryEntry]) -> Result<ReconstructedGlyf> {
    let rebuilt = reconstruct_glyf(payload)?;
    let loca = entries.iter().find(|entry| entry.tag == LOCA);
    if let Some(loca) = loca.filter(|loca| loca.orig_length as usize != rebuilt.loca.len()) {
        return Err(Error::transform(format!(
            "loca origLength is {} but {} glyphs need {} bytes",
            loca.orig_length,
            rebuilt.x_mins.len(),
            rebuilt.loca.len()
        )));
    }
    debug!("Rebuilt glyf ({} bytes) for {} glyphs", rebuilt.glyf.len(), rebuilt.x_mins.len());
    Ok(rebuilt)
}

fn rebuild_hmtx(
    payload: &[u8],
    entry: &TableDirectoryEntry,
    entries: &[TableDirectoryEntry],
    payloads: &[&[u8]],
    x_mins: &[i16],
) -> Result<Vec<u8>> {
    let hhea = entries
        .iter()
        .position(|e| e.tag == HHEA && !e.is_transformed())
        .map(|index| payloads[index])
        .ok_or_else(|| Error::malformed("transformed hmtx requires an hhea table"))?;
    let num_h_metrics = Hhea::read(FontData::new(hhea))
        .map_err(|e| Error::malformed(format!("unreadable hhea: {e}")))?
        .number_of_h_metrics();

    let hmtx = reconstruct_hmtx(payload, num_h_metrics, x_mins)?;
    if hmtx.len() != entry.orig_length as usize {
        return Err(Error::transform(format!(
            "hmtx rebuilt to {} bytes, origLength is {}",
            hmtx.len(),
            entry.orig_length
        )));
    }
    Ok(hmtx)
}

/// Slice `length` bytes at `offset`, which must lie after the compressed data.
fn block<'a>(data: &'a [u8], data_end: usize, offset: u32, length: u32, what: &str) -> Result<&'a [u8]> {
    let start = offset as usize;
    start
        .checked_add(length as usize)
        .filter(|&end| start >= data_end && end <= data.len())
        .map(|end| &data[start..end])
        .ok_or_else(|| {
            Error::malformed(format!("{what} ({length} bytes at offset {offset}) lies outside the WOFF2 file"))
        })
}

/// Decompress a brotli stream that must produce exactly `expected` bytes.
fn decompress(data: &[u8], expected: u64, what: &str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    brotli::Decompressor::new(data, 4096)
        .take(expected + 1)
        .read_to_end(&mut out)
        .map_err(Error::Decompress)?;
    if out.len() as u64 != expected {
        return Err(Error::malformed(format!(
            "{what} decompressed to {} bytes, expected {expected}",
            out.len()
        )));
    }
    Ok(out)
}
