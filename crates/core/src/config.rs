//! Default codec settings for conversions.

/// zlib level for WOFF tables and metadata (0 to 9).
pub const DEFAULT_ZLIB_LEVEL: u32 = fontverter_font_woff::DEFAULT_ZLIB_LEVEL;

/// brotli quality for the WOFF2 table stream and metadata (0 to 11).
pub const DEFAULT_BROTLI_QUALITY: u32 = fontverter_font_woff2::DEFAULT_BROTLI_QUALITY;

/// brotli window size as log2 bytes (10 to 24).
pub const DEFAULT_BROTLI_WINDOW: u32 = fontverter_font_woff2::DEFAULT_BROTLI_WINDOW;

/// Apply the WOFF2 glyf/loca and hmtx transforms when they round-trip exactly.
pub const DEFAULT_TRANSFORM_TABLES: bool = true;

/// Deflate WOFF tables on the rayon thread pool.
pub const DEFAULT_PARALLEL: bool = true;
