//! WOFF 1.0 codec.
//!
//! Packs the tables of an [`SfntImage`](fontverter_sfnt::SfntImage) into a
//! WOFF container, zlib-compressing each table on its own, and unpacks them
//! again. Extended metadata and private data travel as
//! [`WebFontExtras`](fontverter_sfnt::WebFontExtras).
//!
//! # Example
//!
//! ```no_run
//! use fontverter_font_woff::{WoffOptions, decode, encode};
//! use fontverter_sfnt::{DecodedFont, SfntImage};
//!
//! let ttf = std::fs::read("input.ttf").unwrap();
//! let font = DecodedFont::new(SfntImage::from_bytes(&ttf).unwrap());
//! let woff = encode(&font, &WoffOptions::default()).unwrap();
//! let back = decode(&woff, &WoffOptions::default()).unwrap();
//! assert_eq!(back.image.len(), font.image.len());
//! ```

mod decode;
mod encode;
mod error;
mod header;

pub use decode::decode;
pub use encode::encode;
pub use error::{Error, Result};
pub use header::{HEADER_SIZE, TABLE_ENTRY_SIZE, WOFF_SIGNATURE, WoffHeader, WoffTableEntry};

use fontverter_sfnt::CancelToken;

/// Default zlib level: smallest output.
pub const DEFAULT_ZLIB_LEVEL: u32 = 9;

/// Options for encoding and decoding WOFF.
#[derive(Debug, Clone)]
pub struct WoffOptions {
    /// zlib compression level, 0 to 9.
    pub zlib_level: u32,
    /// Deflate tables on the rayon thread pool.
    pub parallel: bool,
    pub cancel: Option<CancelToken>,
}

impl Default for WoffOptions {
    fn default() -> Self {
        Self { zlib_level: DEFAULT_ZLIB_LEVEL, parallel: true, cancel: None }
    }
}
