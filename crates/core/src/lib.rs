//! Fontverter core - font container detection and conversion.
//!
//! Converts between plain SFNT (TrueType/OpenType), WOFF and WOFF2. The
//! source format is detected from the leading signature unless the caller
//! names it; converting to the format the data is already in hands the input
//! back without copying.

pub mod config;
mod convert;
mod detect;
mod error;
mod format;
mod options;

pub use convert::{Converter, convert, convert_with};
pub use detect::detect_format;
pub use error::{Error, Result};
pub use format::{ContainerFormat, UnknownFormat};
pub use options::ConvertOptions;

pub use fontverter_sfnt::{CancelToken, DecodedFont, SfntImage, WebFontExtras};
