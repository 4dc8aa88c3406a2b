//! SFNT table model shared by the WOFF and WOFF2 codecs.
//!
//! An [`SfntImage`] is the in-memory form of a plain TrueType/OpenType
//! font: a flavor tag and an ordered list of owned table payloads. Both web
//! font codecs decode into it and encode from it, so it doubles as the
//! interchange format between container types.
//!
//! # Example
//!
//! ```no_run
//! use fontverter_sfnt::SfntImage;
//!
//! let data = std::fs::read("input.ttf").unwrap();
//! let image = SfntImage::from_bytes(&data).unwrap();
//! for table in image.tables() {
//!     println!("{} {} bytes", table.tag, table.data.len());
//! }
//! // Repack with fresh checksums and checksumAdjustment
//! let rebuilt = image.to_bytes();
//! ```

mod cancel;
mod checksum;
mod error;
mod extras;
mod image;
mod reader;
mod writer;

pub use cancel::CancelToken;
pub use checksum::{
    CHECKSUM_MAGIC, HEAD_CHECKSUM_ADJUSTMENT_OFFSET, checksum, head_checksum, pad4, table_checksum,
};
pub use error::{Error, Result};
pub use extras::{DecodedFont, WebFontExtras};
pub use font_types::Tag;
pub use image::{
    APPLE_TRUETYPE_FLAVOR, CFF_FLAVOR, COLLECTION_TAG, SFNT_HEADER_SIZE, SfntImage, SfntTable,
    TABLE_RECORD_SIZE, TRUETYPE_FLAVOR, TableRecord, search_params,
};
pub use reader::Reader;
pub use writer::WriteBe;

/// Tags of the tables the codecs look inside.
pub mod tags {
    use font_types::Tag;

    pub const HEAD: Tag = Tag::new(b"head");
    pub const HHEA: Tag = Tag::new(b"hhea");
    pub const HMTX: Tag = Tag::new(b"hmtx");
    pub const MAXP: Tag = Tag::new(b"maxp");
    pub const GLYF: Tag = Tag::new(b"glyf");
    pub const LOCA: Tag = Tag::new(b"loca");
}
