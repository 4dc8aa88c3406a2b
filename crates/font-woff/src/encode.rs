use std::{borrow::Cow, io::Write};

use flate2::{Compression, write::ZlibEncoder};
use fontverter_sfnt::{CancelToken, DecodedFont, SfntTable, WriteBe, pad4, table_checksum, tags::HEAD};
use log::debug;
use rayon::prelude::*;
use read_fonts::{FontData, FontRead, tables::head::Head};

use crate::{Error, HEADER_SIZE, Result, TABLE_ENTRY_SIZE, WoffHeader, WoffOptions, WoffTableEntry};

/// A table ready to be written: either deflated or stored verbatim.
struct PackedTable<'a> {
    entry: WoffTableEntry,
    payload: Cow<'a, [u8]>,
}

/// Pack a font into a WOFF file.
///
/// The directory is sorted by tag and the table data follows in the image's
/// table order. Each table is deflated independently and kept compressed only
/// when that makes it smaller.
pub fn encode(font: &DecodedFont, options: &WoffOptions) -> Result<Vec<u8>> {
    let image = &font.image;
    if image.is_empty() {
        return Err(Error::malformed("cannot pack a font with no tables"));
    }

    let cancel = options.cancel.as_ref();
    let level = Compression::new(options.zlib_level.min(9));
    let packed: Vec<PackedTable> = if options.parallel {
        image.tables().par_iter().map(|table| pack_table(table, level, cancel)).collect::<Result<_>>()?
    } else {
        image.tables().iter().map(|table| pack_table(table, level, cancel)).collect::<Result<_>>()?
    };

    let num_tables = packed.len();
    let mut out = vec![0u8; HEADER_SIZE + TABLE_ENTRY_SIZE * num_tables];
    let mut entries = Vec::with_capacity(num_tables);
    for PackedTable { mut entry, payload } in packed {
        out.pad_to_4();
        entry.offset = to_u32(out.len())?;
        out.extend_from_slice(&payload);
        entries.push(entry);
    }
    entries.sort_by_key(|entry| entry.tag);

    let (mut meta_offset, mut meta_length, mut meta_orig_length) = (0, 0, 0);
    if let Some(metadata) = &font.extras.metadata {
        let compressed = deflate(metadata, level)?;
        out.pad_to_4();
        meta_offset = to_u32(out.len())?;
        meta_length = to_u32(compressed.len())?;
        meta_orig_length = to_u32(metadata.len())?;
        out.extend_from_slice(&compressed);
    }

    let (mut priv_offset, mut priv_length) = (0, 0);
    if let Some(private) = &font.extras.private_data {
        out.pad_to_4();
        priv_offset = to_u32(out.len())?;
        priv_length = to_u32(private.len())?;
        out.extend_from_slice(private);
    }

    let (major_version, minor_version) =
        font.extras.version.or_else(|| font_revision(image.table_data(HEAD))).unwrap_or((0, 0));

    let header = WoffHeader {
        flavor: image.flavor(),
        length: to_u32(out.len())?,
        num_tables: num_tables as u16,
        total_sfnt_size: to_u32(image.serialized_size())?,
        major_version,
        minor_version,
        meta_offset,
        meta_length,
        meta_orig_length,
        priv_offset,
        priv_length,
    };

    let mut front = Vec::with_capacity(HEADER_SIZE + TABLE_ENTRY_SIZE * num_tables);
    header.write(&mut front);
    for entry in &entries {
        entry.write(&mut front);
    }
    out[..front.len()].copy_from_slice(&front);

    debug!(
        "Packed {num_tables} tables into {} bytes of WOFF (sfnt size {})",
        out.len(),
        header.total_sfnt_size
    );
    Ok(out)
}

fn pack_table<'a>(
    table: &'a SfntTable,
    level: Compression,
    cancel: Option<&CancelToken>,
) -> Result<PackedTable<'a>> {
    CancelToken::check(cancel)?;
    let orig_length = to_u32(table.data.len())?;
    let compressed = deflate(&table.data, level)?;

    let payload = if compressed.len() < table.data.len() {
        debug!("Deflated '{}' {} -> {} bytes", table.tag, table.data.len(), compressed.len());
        Cow::Owned(compressed)
    } else {
        debug!("Storing '{}' uncompressed ({} bytes)", table.tag, table.data.len());
        Cow::Borrowed(table.data.as_slice())
    };

    Ok(PackedTable {
        entry: WoffTableEntry {
            tag: table.tag,
            offset: 0,
            comp_length: to_u32(payload.len())?,
            orig_length,
            orig_checksum: table_checksum(table.tag, &table.data),
        },
        payload,
    })
}

fn deflate(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(pad4(data.len() / 2)), level);
    encoder.write_all(data).map_err(Error::Deflate)?;
    encoder.finish().map_err(Error::Deflate)
}

/// Split `head.fontRevision` (16.16 fixed) into a WOFF major/minor pair.
fn font_revision(head: Option<&[u8]>) -> Option<(u16, u16)> {
    let head = Head::read(FontData::new(head?)).ok()?;
    let bits = head.font_revision().to_bits();
    Some(((bits >> 16) as u16, bits as u16))
}

fn to_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::malformed("WOFF output exceeds 4 GiB"))
}
