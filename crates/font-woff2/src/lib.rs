//! WOFF2 codec.
//!
//! Packs an [`SfntImage`](fontverter_sfnt::SfntImage) into a WOFF2 file:
//! a variable-length table directory followed by a single brotli stream
//! holding every table. glyf and loca are split into the WOFF2 glyph
//! streams when that reproduces them exactly, and hmtx drops side bearings
//! that the rebuilt glyphs already carry.
//!
//! # Example
//!
//! ```no_run
//! use fontverter_font_woff2::{Woff2Options, decode, encode};
//! use fontverter_sfnt::{DecodedFont, SfntImage};
//!
//! let ttf = std::fs::read("input.ttf").unwrap();
//! let font = DecodedFont::new(SfntImage::from_bytes(&ttf).unwrap());
//! let woff2 = encode(&font, &Woff2Options::default()).unwrap();
//! let back = decode(&woff2, &Woff2Options::default()).unwrap();
//! assert_eq!(back.image.to_bytes(), font.image.to_bytes());
//! ```

mod decode;
mod directory;
mod encode;
mod error;
pub mod glyf;
pub mod hmtx;
mod known_tags;
pub mod varint;

pub use decode::decode;
pub use directory::{HEADER_SIZE, TableDirectoryEntry, WOFF2_SIGNATURE, Woff2Header};
pub use encode::encode;
pub use error::{Error, Result};
pub use known_tags::KNOWN_TAGS;

use fontverter_sfnt::CancelToken;

/// Default brotli quality: smallest output.
pub const DEFAULT_BROTLI_QUALITY: u32 = 11;
/// Default brotli window, log2 of the window size in bytes.
pub const DEFAULT_BROTLI_WINDOW: u32 = 22;

/// Options for encoding and decoding WOFF2.
#[derive(Debug, Clone)]
pub struct Woff2Options {
    /// brotli quality, 0 to 11.
    pub brotli_quality: u32,
    /// brotli window bits, 10 to 24.
    pub brotli_window: u32,
    /// Apply the glyf/loca transform when it round-trips exactly: the
    /// canonical rebuild must equal the source glyf and loca byte for byte.
    /// Non-canonical glyph data is stored with the null transform.
    pub transform_glyf: bool,
    /// Apply the hmtx transform alongside a glyf transform.
    pub transform_hmtx: bool,
    pub cancel: Option<CancelToken>,
}

impl Default for Woff2Options {
    fn default() -> Self {
        Self {
            brotli_quality: DEFAULT_BROTLI_QUALITY,
            brotli_window: DEFAULT_BROTLI_WINDOW,
            transform_glyf: true,
            transform_hmtx: true,
            cancel: None,
        }
    }
}
