//! TrueType glyph records.
//!
//! Simple glyphs are serialized by write-fonts' `SimpleGlyph`, which packs
//! flags into repeat runs (capped at 255) and uses the short or same
//! coordinate forms whenever the delta allows. It writes a flag that occurs
//! exactly twice as two plain flags, where WOFF2 decoders write one flag
//! with a repeat count of 1; glyphs without such a pair survive the WOFF2
//! glyf transform byte for byte.

use fontverter_sfnt::WriteBe;
use write_fonts::{
    dump_table,
    read::tables::glyf::CurvePoint,
    tables::glyf::{Bbox as GlyfBbox, Contour, SimpleGlyph},
};

use crate::Result;

const OVERLAP_SIMPLE: u8 = 0x40;

const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const ARGS_ARE_XY_VALUES: u16 = 0x0002;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_INSTRUCTIONS: u16 = 0x0100;

/// `[xMin, yMin, xMax, yMax]`
pub type Bbox = [i16; 4];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i16,
    pub y: i16,
    pub on_curve: bool,
}

impl Point {
    pub const fn on(x: i16, y: i16) -> Self {
        Self { x, y, on_curve: true }
    }

    pub const fn off(x: i16, y: i16) -> Self {
        Self { x, y, on_curve: false }
    }
}

/// A component placed at an x/y offset, optionally uniformly scaled (F2Dot14 bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    pub glyph: u16,
    pub dx: i16,
    pub dy: i16,
    pub scale: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Glyph {
    Empty,
    Simple {
        contours: Vec<Vec<Point>>,
        instructions: Vec<u8>,
        /// Set OVERLAP_SIMPLE on the first flag.
        overlap: bool,
        /// Stored bounds; computed from the points when `None`.
        bbox: Option<Bbox>,
    },
    Composite {
        components: Vec<Component>,
        bbox: Bbox,
        instructions: Vec<u8>,
    },
    /// Pre-encoded glyph data, written verbatim.
    Raw(Vec<u8>),
}

impl Glyph {
    pub fn simple(contours: Vec<Vec<Point>>) -> Self {
        Self::Simple { contours, instructions: Vec::new(), overlap: false, bbox: None }
    }

    /// The xMin the glyph header records, 0 for an empty glyph.
    pub fn x_min(&self) -> Result<i16> {
        let bytes = self.to_bytes()?;
        Ok(match bytes.get(2..4) {
            Some(&[hi, lo]) => i16::from_be_bytes([hi, lo]),
            _ => 0,
        })
    }

    /// The glyph record. Simple glyphs may carry write-fonts' 2-byte padding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(match self {
            Self::Empty => Vec::new(),
            Self::Raw(data) => data.clone(),
            Self::Simple { contours, instructions, overlap, bbox } => {
                write_simple(contours, instructions, *overlap, *bbox)?
            }
            Self::Composite { components, bbox, instructions } => {
                write_composite(components, *bbox, instructions)
            }
        })
    }
}

fn write_simple(
    contours: &[Vec<Point>],
    instructions: &[u8],
    overlap: bool,
    bbox: Option<Bbox>,
) -> Result<Vec<u8>> {
    let mut glyph = SimpleGlyph {
        contours: contours
            .iter()
            .map(|contour| {
                let points: Vec<CurvePoint> =
                    contour.iter().map(|p| CurvePoint::new(p.x, p.y, p.on_curve)).collect();
                Contour::from(points)
            })
            .collect(),
        instructions: instructions.to_vec(),
        ..SimpleGlyph::default()
    };
    match bbox {
        Some([x_min, y_min, x_max, y_max]) => glyph.bbox = GlyfBbox { x_min, y_min, x_max, y_max },
        None => glyph.recompute_bounding_box(),
    }

    let mut out = dump_table(&glyph)?;
    if overlap {
        // header, endPtsOfContours, instructionLength, instructions
        let first_flag = 10 + 2 * contours.len() + 2 + instructions.len();
        if let Some(flag) = out.get_mut(first_flag) {
            *flag |= OVERLAP_SIMPLE;
        }
    }
    Ok(out)
}

fn write_composite(components: &[Component], bbox: Bbox, instructions: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_i16(-1);
    for v in bbox {
        out.write_i16(v);
    }

    for (i, component) in components.iter().enumerate() {
        let words = i8::try_from(component.dx).is_err() || i8::try_from(component.dy).is_err();
        let mut flags = ARGS_ARE_XY_VALUES;
        if words {
            flags |= ARG_1_AND_2_ARE_WORDS;
        }
        if component.scale.is_some() {
            flags |= WE_HAVE_A_SCALE;
        }
        if i + 1 < components.len() {
            flags |= MORE_COMPONENTS;
        } else if !instructions.is_empty() {
            flags |= WE_HAVE_INSTRUCTIONS;
        }

        out.write_u16(flags);
        out.write_u16(component.glyph);
        if words {
            out.write_i16(component.dx);
            out.write_i16(component.dy);
        } else {
            out.push(component.dx as i8 as u8);
            out.push(component.dy as i8 as u8);
        }
        if let Some(scale) = component.scale {
            out.write_i16(scale);
        }
    }

    if !instructions.is_empty() {
        out.write_u16(instructions.len() as u16);
        out.extend_from_slice(instructions);
    }
    out
}

/// Lay out glyf and loca, padding every glyph to four bytes.
pub fn glyf_and_loca(glyphs: &[Glyph], long_loca: bool) -> Result<(Vec<u8>, Vec<u8>)> {
    let mut glyf = Vec::new();
    let mut offsets = Vec::with_capacity(glyphs.len() + 1);
    for glyph in glyphs {
        offsets.push(glyf.len());
        glyf.extend_from_slice(&glyph.to_bytes()?);
        glyf.pad_to_4();
    }
    offsets.push(glyf.len());

    let mut loca = Vec::new();
    for offset in offsets {
        if long_loca {
            loca.write_u32(offset as u32);
        } else {
            loca.write_u16((offset / 2) as u16);
        }
    }
    Ok((glyf, loca))
}
