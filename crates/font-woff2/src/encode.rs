use std::io::Read;

use fontverter_sfnt::{
    CancelToken, DecodedFont, SfntImage, SfntTable, WriteBe,
    tags::{GLYF, HEAD, HHEA, HMTX, LOCA, MAXP},
};
use log::debug;
use read_fonts::{
    FontData, FontRead,
    tables::{head::Head, hhea::Hhea},
};

use crate::{
    Error, Result, Woff2Options,
    directory::{HEADER_SIZE, TableDirectoryEntry, Woff2Header},
    glyf::{reconstruct_glyf, transform_glyf},
    hmtx::{HMTX_TRANSFORM_VERSION, reconstruct_hmtx, transform_hmtx},
};

/// A glyf transform that is known to rebuild the source tables exactly.
struct GlyfTransform {
    data: Vec<u8>,
    x_mins: Vec<i16>,
}

/// Pack a font into a WOFF2 file.
///
/// glyf/loca (and, with them, hmtx) are transformed when enabled and the
/// transform reproduces the source bytes exactly; otherwise they are stored
/// with the null transform. All table data is compressed as one brotli
/// stream in directory (tag) order.
pub fn encode(font: &DecodedFont, options: &Woff2Options) -> Result<Vec<u8>> {
    let image = &font.image;
    if image.is_empty() {
        return Err(Error::malformed("cannot pack a font with no tables"));
    }
    let cancel = options.cancel.as_ref();
    CancelToken::check(cancel)?;

    let glyf = if options.transform_glyf { glyf_transform(image) } else { None };
    let hmtx = match &glyf {
        Some(glyf) if options.transform_hmtx => hmtx_transform(image, &glyf.x_mins),
        _ => None,
    };

    let mut tables: Vec<&SfntTable> = image.tables().iter().collect();
    tables.sort_by_key(|table| table.tag);

    let mut entries = Vec::with_capacity(tables.len());
    let mut stream = Vec::with_capacity(image.serialized_size());
    for table in tables {
        CancelToken::check(cancel)?;
        let orig_length = to_u32(table.data.len())?;
        let entry = match (table.tag, &glyf, &hmtx) {
            (GLYF, Some(glyf), _) => {
                stream.extend_from_slice(&glyf.data);
                TableDirectoryEntry::transformed(GLYF, 0, orig_length, to_u32(glyf.data.len())?)
            }
            (LOCA, Some(_), _) => TableDirectoryEntry::transformed(LOCA, 0, orig_length, 0),
            (HMTX, _, Some(hmtx)) => {
                stream.extend_from_slice(hmtx);
                TableDirectoryEntry::transformed(HMTX, HMTX_TRANSFORM_VERSION, orig_length, to_u32(hmtx.len())?)
            }
            (tag, _, _) => {
                stream.extend_from_slice(&table.data);
                TableDirectoryEntry::null(tag, orig_length)
            }
        };
        entries.push(entry);
    }

    CancelToken::check(cancel)?;
    let compressed = compress(&stream, options.brotli_quality, options.brotli_window)?;
    debug!("Compressed {} bytes of table data to {} bytes", stream.len(), compressed.len());

    let mut out = Vec::with_capacity(HEADER_SIZE + compressed.len() + 1024);
    out.resize(HEADER_SIZE, 0);
    for entry in &entries {
        entry.write(&mut out);
    }
    out.extend_from_slice(&compressed);

    let (mut meta_offset, mut meta_length, mut meta_orig_length) = (0, 0, 0);
    if let Some(metadata) = &font.extras.metadata {
        let compressed = compress(metadata, options.brotli_quality, options.brotli_window)?;
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

    let header = Woff2Header {
        flavor: image.flavor(),
        length: to_u32(out.len())?,
        num_tables: entries.len() as u16,
        total_sfnt_size: to_u32(image.serialized_size())?,
        total_compressed_size: to_u32(compressed.len())?,
        major_version,
        minor_version,
        meta_offset,
        meta_length,
        meta_orig_length,
        priv_offset,
        priv_length,
    };
    let mut front = Vec::with_capacity(HEADER_SIZE);
    header.write(&mut front);
    out[..HEADER_SIZE].copy_from_slice(&front);

    debug!(
        "Packed {} tables into {} bytes of WOFF2 (glyf {}, hmtx {})",
        entries.len(),
        out.len(),
        if glyf.is_some() { "transformed" } else { "stored" },
        if hmtx.is_some() { "transformed" } else { "stored" },
    );
    Ok(out)
}

/// Transform glyf/loca, keeping the result only if it rebuilds them exactly.
fn glyf_transform(image: &SfntImage) -> Option<GlyfTransform> {
    let (Some(glyf), Some(loca), Some(head), Some(maxp)) =
        (image.table_data(GLYF), image.table_data(LOCA), image.table_data(HEAD), image.table_data(MAXP))
    else {
        return None;
    };

    let data = match transform_glyf(glyf, loca, head, maxp) {
        Ok(data) => data,
        Err(e) => {
            debug!("Storing glyf untransformed: {e}");
            return None;
        }
    };
    match reconstruct_glyf(&data) {
        Ok(rebuilt) if rebuilt.glyf == glyf && rebuilt.loca == loca => {
            debug!("Transformed glyf: {} -> {} bytes", glyf.len() + loca.len(), data.len());
            Some(GlyfTransform { data, x_mins: rebuilt.x_mins })
        }
        Ok(_) => {
            debug!("Storing glyf untransformed: glyph data is not in canonical form");
            None
        }
        Err(e) => {
            debug!("Storing glyf untransformed: {e}");
            None
        }
    }
}

/// Transform hmtx when its side bearings can be recovered from the glyphs.
fn hmtx_transform(image: &SfntImage, x_mins: &[i16]) -> Option<Vec<u8>> {
    let hmtx = image.table_data(HMTX)?;
    let hhea = Hhea::read(FontData::new(image.table_data(HHEA)?)).ok()?;
    let num_h_metrics = hhea.number_of_h_metrics();

    let transformed = transform_hmtx(hmtx, num_h_metrics, x_mins)?;
    match reconstruct_hmtx(&transformed, num_h_metrics, x_mins) {
        Ok(rebuilt) if rebuilt == hmtx => Some(transformed),
        _ => {
            debug!("Storing hmtx untransformed: transform does not rebuild it");
            None
        }
    }
}

fn compress(data: &[u8], quality: u32, window: u32) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    brotli::CompressorReader::new(data, 4096, quality.min(11), window.clamp(10, 24))
        .read_to_end(&mut out)
        .map_err(Error::Compress)?;
    Ok(out)
}

/// Split `head.fontRevision` (16.16 fixed) into a major/minor pair.
fn font_revision(head: Option<&[u8]>) -> Option<(u16, u16)> {
    let head = Head::read(FontData::new(head?)).ok()?;
    let bits = head.font_revision().to_bits();
    Some(((bits >> 16) as u16, bits as u16))
}

fn to_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::malformed("WOFF2 output exceeds 4 GiB"))
}
