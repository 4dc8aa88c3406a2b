//! Table payloads for the test fonts.
//!
//! The metric tables are laid out by hand so the tests can depend on exact
//! field offsets; name, post and cmap go through write-fonts.

use fontverter_sfnt::WriteBe;
use write_fonts::{
    dump_table,
    tables::{
        cmap::{Cmap, CmapSubtable, EncodingRecord, PlatformId, SequentialMapGroup},
        name::{Name, NameRecord},
        post::Post,
    },
    types::{FWord, Fixed, NameId, Version16Dot16},
};

use crate::{Bbox, Result};

pub const HEAD_MAGIC: u32 = 0x5F0F_3CF5;

pub fn head(font_revision: u32, bbox: Bbox, long_loca: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(54);
    out.write_u32(0x0001_0000);
    out.write_u32(font_revision);
    out.write_u32(0); // checksumAdjustment
    out.write_u32(HEAD_MAGIC);
    out.write_u16(0x000B); // flags
    out.write_u16(1000); // unitsPerEm
    out.extend_from_slice(&3_600_000_000u64.to_be_bytes()); // created
    out.extend_from_slice(&3_700_000_000u64.to_be_bytes()); // modified
    for v in bbox {
        out.write_i16(v);
    }
    out.write_u16(0); // macStyle
    out.write_u16(8); // lowestRecPPEM
    out.write_i16(2); // fontDirectionHint
    out.write_i16(i16::from(long_loca));
    out.write_i16(0); // glyphDataFormat
    out
}

pub fn hhea(advance_width_max: u16, num_h_metrics: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(36);
    out.write_u32(0x0001_0000);
    out.write_i16(800); // ascender
    out.write_i16(-200); // descender
    out.write_i16(0); // lineGap
    out.write_u16(advance_width_max);
    out.write_i16(0); // minLeftSideBearing
    out.write_i16(0); // minRightSideBearing
    out.write_i16(0); // xMaxExtent
    out.write_i16(1); // caretSlopeRise
    out.write_i16(0); // caretSlopeRun
    out.write_i16(0); // caretOffset
    out.extend_from_slice(&[0; 8]);
    out.write_i16(0); // metricDataFormat
    out.write_u16(num_h_metrics);
    out
}

/// maxp 1.0 for TrueType outlines.
pub fn maxp_v1(num_glyphs: u16, max_points: u16, max_contours: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(32);
    out.write_u32(0x0001_0000);
    out.write_u16(num_glyphs);
    out.write_u16(max_points);
    out.write_u16(max_contours);
    out.extend_from_slice(&[0; 20]);
    out.write_u16(1); // maxComponentDepth
    out
}

/// maxp 0.5 for CFF outlines.
pub fn maxp_v0_5(num_glyphs: u16) -> Vec<u8> {
    let mut out = Vec::with_capacity(6);
    out.write_u32(0x0000_5000);
    out.write_u16(num_glyphs);
    out
}

pub fn hmtx(advances: &[u16], lsbs: &[i16], num_h_metrics: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, &lsb) in lsbs.iter().enumerate() {
        if i < num_h_metrics {
            out.write_u16(advances[i]);
        }
        out.write_i16(lsb);
    }
    out
}

pub fn name(family: &str) -> Result<Vec<u8>> {
    let record = |id: u16, value: String| NameRecord::new(3, 1, 0x409, NameId::new(id), value.into());
    let table = Name::new(vec![
        record(1, family.to_string()),
        record(2, "Regular".to_string()),
        record(4, format!("{family} Regular")),
        record(6, format!("{}-Regular", family.replace(' ', ""))),
    ]);
    Ok(dump_table(&table)?)
}

pub fn post() -> Result<Vec<u8>> {
    let mut table = Post::new(Fixed::ZERO, FWord::new(-100), FWord::new(50), 0, 0, 0, 0, 0);
    table.version = Version16Dot16::VERSION_3_0;
    Ok(dump_table(&table)?)
}

/// A format 12 cmap mapping consecutive code points from `first` onto glyphs 1...
pub fn cmap(first: char, count: u32) -> Result<Vec<u8>> {
    let start = u32::from(first);
    let groups = vec![SequentialMapGroup {
        start_char_code: start,
        end_char_code: start + count - 1,
        start_glyph_id: 1,
    }];
    let table = Cmap::new(vec![EncodingRecord::new(
        PlatformId::Windows,
        10,
        CmapSubtable::format_12(0, groups),
    )]);
    Ok(dump_table(&table)?)
}
