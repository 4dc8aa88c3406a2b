//! The WOFF2 hmtx transform (version 1).
//!
//! When every left side bearing equals its glyph's xMin, the bearings can
//! be dropped and recovered from the rebuilt glyf table. The two lsb arrays
//! (proportional, after each advance, and monospaced, after the last
//! advance) are elided independently:
//!
//! ```text
//! flags                   u8   bit 0: proportional lsbs omitted
//!                              bit 1: monospace lsbs omitted
//! advanceWidth            u16[numberOfHMetrics]
//! lsb                     i16[numberOfHMetrics]              unless bit 0
//! leftSideBearing         i16[numGlyphs - numberOfHMetrics]  unless bit 1
//! ```

use fontverter_sfnt::{Reader, WriteBe};

use crate::{Error, Result};

/// Transform version WOFF2 assigns to the hmtx transform.
pub const HMTX_TRANSFORM_VERSION: u8 = 1;

const PROPORTIONAL_LSBS_OMITTED: u8 = 0x01;
const MONOSPACE_LSBS_OMITTED: u8 = 0x02;
const RESERVED_FLAGS: u8 = 0xFC;

struct Metrics {
    advances: Vec<u16>,
    lsbs: Vec<i16>,
}

fn read_metrics(hmtx: &[u8], num_h_metrics: usize, num_glyphs: usize) -> Result<Metrics> {
    let mut reader = Reader::new(hmtx);
    let mut advances = Vec::with_capacity(num_h_metrics);
    let mut lsbs = Vec::with_capacity(num_glyphs);
    for _ in 0..num_h_metrics {
        advances.push(reader.read_u16()?);
        lsbs.push(reader.read_i16()?);
    }
    for _ in num_h_metrics..num_glyphs {
        lsbs.push(reader.read_i16()?);
    }
    if !reader.is_empty() {
        return Err(Error::transform(format!("hmtx has {} trailing bytes", reader.remaining())));
    }
    Ok(Metrics { advances, lsbs })
}

/// Transform hmtx against the glyph x-minimums.
///
/// Returns `None` when neither lsb array matches the x-minimums, or when
/// the table is not laid out exactly as `hhea` and `maxp` describe; the
/// table is then stored as is.
pub fn transform_hmtx(hmtx: &[u8], num_h_metrics: u16, x_mins: &[i16]) -> Option<Vec<u8>> {
    let num_glyphs = x_mins.len();
    let num_h_metrics = usize::from(num_h_metrics);
    if num_h_metrics == 0 || num_h_metrics > num_glyphs {
        return None;
    }
    let metrics = read_metrics(hmtx, num_h_metrics, num_glyphs).ok()?;

    let (proportional, monospace) = metrics.lsbs.split_at(num_h_metrics);
    let (x_proportional, x_monospace) = x_mins.split_at(num_h_metrics);
    let mut flags = 0;
    if proportional == x_proportional {
        flags |= PROPORTIONAL_LSBS_OMITTED;
    }
    if monospace == x_monospace {
        flags |= MONOSPACE_LSBS_OMITTED;
    }
    if flags == 0 {
        return None;
    }

    let mut out = Vec::with_capacity(hmtx.len());
    out.push(flags);
    for &advance in &metrics.advances {
        out.write_u16(advance);
    }
    if flags & PROPORTIONAL_LSBS_OMITTED == 0 {
        proportional.iter().for_each(|&lsb| out.write_i16(lsb));
    }
    if flags & MONOSPACE_LSBS_OMITTED == 0 {
        monospace.iter().for_each(|&lsb| out.write_i16(lsb));
    }
    Some(out)
}

/// Rebuild hmtx from its transformed form and the glyph x-minimums.
pub fn reconstruct_hmtx(data: &[u8], num_h_metrics: u16, x_mins: &[i16]) -> Result<Vec<u8>> {
    rebuild(data, usize::from(num_h_metrics), x_mins).map_err(Error::in_transform)
}

fn rebuild(data: &[u8], num_h_metrics: usize, x_mins: &[i16]) -> Result<Vec<u8>> {
    let num_glyphs = x_mins.len();
    if num_h_metrics == 0 || num_h_metrics > num_glyphs {
        return Err(Error::transform(format!(
            "numberOfHMetrics {num_h_metrics} is out of range for {num_glyphs} glyphs"
        )));
    }

    let mut reader = Reader::new(data);
    let flags = reader.read_u8()?;
    if flags & RESERVED_FLAGS != 0 {
        return Err(Error::transform(format!("reserved hmtx flags set: {flags:#04x}")));
    }
    if flags & (PROPORTIONAL_LSBS_OMITTED | MONOSPACE_LSBS_OMITTED) == 0 {
        return Err(Error::transform("transformed hmtx omits no side bearings"));
    }

    let mut advances = Vec::with_capacity(num_h_metrics);
    for _ in 0..num_h_metrics {
        advances.push(reader.read_u16()?);
    }
    let mut lsbs = Vec::with_capacity(num_glyphs);
    if flags & PROPORTIONAL_LSBS_OMITTED != 0 {
        lsbs.extend_from_slice(&x_mins[..num_h_metrics]);
    } else {
        for _ in 0..num_h_metrics {
            lsbs.push(reader.read_i16()?);
        }
    }
    if flags & MONOSPACE_LSBS_OMITTED != 0 {
        lsbs.extend_from_slice(&x_mins[num_h_metrics..]);
    } else {
        for _ in num_h_metrics..num_glyphs {
            lsbs.push(reader.read_i16()?);
        }
    }

    let mut hmtx = Vec::with_capacity(4 * num_h_metrics + 2 * (num_glyphs - num_h_metrics));
    for (i, lsb) in lsbs.into_iter().enumerate() {
        if let Some(&advance) = advances.get(i) {
            hmtx.write_u16(advance);
        }
        hmtx.write_i16(lsb);
    }
    Ok(hmtx)
}
