//! The WOFF2 glyf/loca transform.
//!
//! The transformed glyf table splits glyph data into seven streams that
//! brotli compresses far better than the interleaved original:
//!
//! ```text
//! reserved         u16
//! optionFlags      u16   bit 0: overlapSimpleBitmap present
//! numGlyphs        u16
//! indexFormat      u16   loca format to rebuild
//! nContourStreamSize, nPointsStreamSize, flagStreamSize, glyphStreamSize,
//! compositeStreamSize, bboxStreamSize, instructionStreamSize   u32 each
//! the seven streams, in that order
//! overlapSimpleBitmap  (numGlyphs + 7) / 8 bytes, optional
//! ```
//!
//! loca is not stored at all; it falls out of rebuilding glyf.

mod reconstruct;
mod transform;
mod triplet;

pub use reconstruct::{ReconstructedGlyf, reconstruct_glyf};
pub use transform::transform_glyf;

// Simple glyph flags
const ON_CURVE: u8 = 0x01;
const X_SHORT: u8 = 0x02;
const Y_SHORT: u8 = 0x04;
const REPEAT: u8 = 0x08;
const X_SAME_OR_POSITIVE: u8 = 0x10;
const Y_SAME_OR_POSITIVE: u8 = 0x20;
const OVERLAP_SIMPLE: u8 = 0x40;

// Composite glyph flags
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;
const WE_HAVE_INSTRUCTIONS: u16 = 0x0100;

const OPTION_OVERLAP_SIMPLE_BITMAP: u16 = 0x0001;

/// Fixed part of the transformed table: four u16 fields and seven sizes.
const TRANSFORM_HEADER_SIZE: usize = 2 * 4 + 4 * 7;

/// Bytes in the bbox bitmap for `num_glyphs` glyphs (rounded to 32 bits).
fn bbox_bitmap_size(num_glyphs: usize) -> usize {
    num_glyphs.div_ceil(32) * 4
}

fn overlap_bitmap_size(num_glyphs: usize) -> usize {
    num_glyphs.div_ceil(8)
}

/// Bitmaps are most-significant-bit first.
fn bit_is_set(bitmap: &[u8], index: usize) -> bool {
    bitmap.get(index >> 3).is_some_and(|byte| byte & (0x80 >> (index & 7)) != 0)
}

fn set_bit(bitmap: &mut [u8], index: usize) {
    bitmap[index >> 3] |= 0x80 >> (index & 7);
}

/// Size of the argument, scale and matrix fields following a component's
/// flags and glyph index.
fn component_args_size(flags: u16) -> usize {
    let args = if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
    let transform = if flags & WE_HAVE_A_SCALE != 0 {
        2
    } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
        4
    } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
        8
    } else {
        0
    };
    args + transform
}

/// Bytes per loca entry for a `head.indexToLocFormat` value.
fn loca_entry_size(index_format: u16) -> usize {
    if index_format == 0 { 2 } else { 4 }
}
