//! Fonts for the fontverter test suites, assembled in code.
//!
//! [`TestFont::sample`] is a small TrueType font whose glyphs cover every
//! shape the WOFF2 glyf transform distinguishes: empty, simple with and
//! without an explicit bounding box, the overlap flag, long flag runs, all
//! triplet classes, and composites with and without instructions.

mod glyph;
pub mod tables;

use std::result;

use fontverter_sfnt::{CFF_FLAVOR, SfntImage, TRUETYPE_FLAVOR, Tag};
use write_fonts::FontBuilder;

pub use glyph::{Bbox, Component, Glyph, Point, glyf_and_loca};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Write(#[from] write_fonts::error::Error),

    #[error(transparent)]
    Sfnt(#[from] fontverter_sfnt::Error),
}

pub type Result<T> = result::Result<T, Error>;

/// Extended metadata block used by the WOFF and WOFF2 tests.
pub const METADATA: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<metadata version="1.0">
  <uniqueid id="org.fontverter.test.sample"/>
  <vendor name="Fontverter" url="https://example.com/"/>
  <description><text lang="en">Sample font for container conversion tests.</text></description>
</metadata>
"#;

/// Private data block used by the WOFF and WOFF2 tests.
pub const PRIVATE_DATA: &[u8] = b"fontverter private data\x00\x01\x02";

/// A TrueType font described by its glyphs and horizontal metrics.
#[derive(Debug, Clone)]
pub struct TestFont {
    pub family: String,
    pub glyphs: Vec<Glyph>,
    /// Advance widths; only the first `num_h_metrics` are stored.
    pub advances: Vec<u16>,
    pub num_h_metrics: usize,
    /// Added to every left side bearing. Zero keeps them equal to xMin.
    pub lsb_shift: i16,
    pub long_loca: bool,
    /// head.fontRevision as 16.16 bits.
    pub font_revision: u32,
}

impl TestFont {
    pub fn sample() -> Self {
        Self {
            family: "Fontverter Sample".to_string(),
            glyphs: sample_glyphs(),
            advances: vec![500, 250, 550, 6200, 350, 950, 550, 3100],
            num_h_metrics: 6,
            lsb_shift: 0,
            long_loca: false,
            font_revision: 0x0001_8000,
        }
    }

    /// The sample font with one glyph stored in a valid but non-canonical
    /// encoding: no flag repeats and word coordinates for small deltas.
    pub fn non_canonical() -> Self {
        let mut font = Self::sample();
        let mut triangle = Vec::new();
        for v in [1i16, 0, 0, 500, 700, 2, 0] {
            triangle.extend_from_slice(&v.to_be_bytes());
        }
        triangle.extend_from_slice(&[0x01, 0x01, 0x01]);
        for v in [0i16, 500, -250, 0, 0, 700] {
            triangle.extend_from_slice(&v.to_be_bytes());
        }
        font.glyphs[4] = Glyph::Raw(triangle);
        font
    }

    pub fn with_long_loca(mut self) -> Self {
        self.long_loca = true;
        self
    }

    pub fn with_lsb_shift(mut self, shift: i16) -> Self {
        self.lsb_shift = shift;
        self
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    /// All tables, sorted by tag.
    pub fn tables(&self) -> Result<Vec<(Tag, Vec<u8>)>> {
        let (glyf, loca) = glyf_and_loca(&self.glyphs, self.long_loca)?;
        let lsbs = self
            .glyphs
            .iter()
            .map(|g| Ok(g.x_min()? + self.lsb_shift))
            .collect::<Result<Vec<i16>>>()?;
        let num_glyphs = self.glyphs.len() as u16;
        let advance_max = self.advances.iter().copied().max().unwrap_or(0);

        let mut tables = vec![
            (Tag::new(b"cmap"), tables::cmap('A', u32::from(num_glyphs) - 1)?),
            (Tag::new(b"glyf"), glyf),
            (Tag::new(b"head"), tables::head(self.font_revision, [-3000, -2000, 3100, 5000], self.long_loca)),
            (Tag::new(b"hhea"), tables::hhea(advance_max, self.num_h_metrics as u16)),
            (Tag::new(b"hmtx"), tables::hmtx(&self.advances, &lsbs, self.num_h_metrics)),
            (Tag::new(b"loca"), loca),
            (Tag::new(b"maxp"), tables::maxp_v1(num_glyphs, 300, 2)),
            (Tag::new(b"name"), tables::name(&self.family)?),
            (Tag::new(b"post"), tables::post()?),
        ];
        tables.sort_by_key(|(tag, _)| *tag);
        Ok(tables)
    }

    pub fn image(&self) -> Result<SfntImage> {
        image_from(TRUETYPE_FLAVOR, self.tables()?)
    }

    /// The font as SFNT bytes, laid out in tag order.
    pub fn build(&self) -> Result<Vec<u8>> {
        Ok(self.image()?.to_bytes())
    }

    /// The same tables serialized by write-fonts' `FontBuilder`.
    pub fn build_with_font_builder(&self) -> Result<Vec<u8>> {
        let mut builder = FontBuilder::new();
        for (tag, data) in self.tables()? {
            builder.add_raw(tag, data);
        }
        Ok(builder.build())
    }
}

fn image_from(flavor: Tag, tables: Vec<(Tag, Vec<u8>)>) -> Result<SfntImage> {
    let mut image = SfntImage::new(flavor);
    for (tag, data) in tables {
        image.add_table(tag, data)?;
    }
    Ok(image)
}

/// The sample TrueType font.
pub fn truetype() -> Result<Vec<u8>> {
    TestFont::sample().build()
}

/// A CFF-flavored (`OTTO`) font. The CFF table is opaque filler; nothing in
/// the container codecs looks inside it.
pub fn cff() -> Result<Vec<u8>> {
    let charstrings: Vec<u8> = (0..600u32).map(|i| (i * 7 % 251) as u8).collect();
    let mut tables = vec![
        (Tag::new(b"CFF "), charstrings),
        (Tag::new(b"cmap"), tables::cmap('a', 2)?),
        (Tag::new(b"head"), tables::head(0x0002_0000, [0, -100, 700, 800], false)),
        (Tag::new(b"hhea"), tables::hhea(600, 3)),
        (Tag::new(b"hmtx"), tables::hmtx(&[500, 600, 550], &[0, 20, 30], 3)),
        (Tag::new(b"maxp"), tables::maxp_v0_5(3)),
        (Tag::new(b"name"), tables::name("Fontverter CFF")?),
        (Tag::new(b"post"), tables::post()?),
    ];
    tables.sort_by_key(|(tag, _)| *tag);
    Ok(image_from(CFF_FLAVOR, tables)?.to_bytes())
}

fn sample_glyphs() -> Vec<Glyph> {
    use Point as P;

    let notdef = Glyph::Simple {
        contours: vec![
            vec![P::on(50, 0), P::on(450, 0), P::on(450, 700), P::on(50, 700)],
            vec![P::on(100, 50), P::on(100, 650), P::on(400, 650), P::on(400, 50)],
        ],
        instructions: vec![0xB0, 0x01, 0x2C, 0x2D],
        overlap: false,
        bbox: None,
    };
    let overlapping = Glyph::Simple {
        contours: vec![vec![P::on(0, 0), P::on(500, 0), P::off(250, 700)]],
        instructions: Vec::new(),
        overlap: true,
        bbox: None,
    };
    // One delta per triplet class.
    let triplets = Glyph::simple(vec![vec![
        P::on(0, 100),
        P::on(200, 100),
        P::off(230, 140),
        P::on(-400, 600),
        P::on(3000, 500),
        P::off(-3000, 5000),
        P::on(-2990, 5000),
        P::on(-2990, 5000),
    ]]);
    let boxed = Glyph::Simple {
        contours: vec![vec![P::on(10, 10), P::on(300, 10), P::on(300, 300)]],
        instructions: Vec::new(),
        overlap: false,
        bbox: Some([0, 0, 320, 320]),
    };
    let composite = Glyph::Composite {
        components: vec![
            Component { glyph: 2, dx: 0, dy: 0, scale: None },
            Component { glyph: 4, dx: 600, dy: -20, scale: None },
        ],
        bbox: [0, -10, 920, 700],
        instructions: vec![0x40, 0x01, 0x00],
    };
    let scaled = Glyph::Composite {
        components: vec![Component { glyph: 0, dx: 10, dy: 5, scale: Some(0x2000) }],
        bbox: [35, 5, 235, 355],
        instructions: Vec::new(),
    };
    let long_run = Glyph::simple(vec![(1..=300).map(|i| P::on(i * 10, 0)).collect()]);

    vec![notdef, Glyph::Empty, overlapping, triplets, boxed, composite, scaled, long_run]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_tables_are_sorted_and_unique() {
        let tables = TestFont::sample().tables().unwrap();
        let tags: Vec<Tag> = tables.iter().map(|(tag, _)| *tag).collect();
        let mut sorted = tags.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(tags, sorted);
    }

    #[test]
    fn test_sample_parses() {
        let data = truetype().unwrap();
        let image = SfntImage::from_bytes(&data).unwrap();
        assert_eq!(image.flavor(), TRUETYPE_FLAVOR);
        assert_eq!(image.table_data(Tag::new(b"maxp")).map(|d| d[4..6].to_vec()), Some(vec![0, 8]));

        let hmtx = image.table_data(Tag::new(b"hmtx")).unwrap();
        assert_eq!(hmtx.len(), 6 * 4 + 2 * 2);
    }

    #[test]
    fn test_cff_flavor() {
        let data = cff().unwrap();
        assert_eq!(&data[..4], b"OTTO");
    }

    #[test]
    fn test_non_canonical_glyph_decodes_like_canonical() {
        let raw = TestFont::non_canonical().glyphs[4].clone();
        let canonical = Glyph::simple(vec![vec![Point::on(0, 0), Point::on(500, 0), Point::on(250, 700)]]);
        assert_ne!(raw.to_bytes().unwrap(), canonical.to_bytes().unwrap());
        assert_eq!(raw.x_min().unwrap(), canonical.x_min().unwrap());
    }
}
