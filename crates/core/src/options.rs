use fontverter_font_woff::WoffOptions;
use fontverter_font_woff2::Woff2Options;
use fontverter_sfnt::CancelToken;

use crate::config::{
    DEFAULT_BROTLI_QUALITY, DEFAULT_BROTLI_WINDOW, DEFAULT_PARALLEL, DEFAULT_TRANSFORM_TABLES,
    DEFAULT_ZLIB_LEVEL,
};

/// Codec settings for a conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub zlib_level: u32,
    pub brotli_quality: u32,
    pub brotli_window: u32,
    /// Try the WOFF2 glyf/loca transform. It is kept only when rebuilding
    /// reproduces the source glyf and loca byte for byte.
    pub transform_glyf: bool,
    /// Try the WOFF2 hmtx transform (only applied together with glyf).
    pub transform_hmtx: bool,
    pub parallel: bool,
    pub cancel: Option<CancelToken>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            zlib_level: DEFAULT_ZLIB_LEVEL,
            brotli_quality: DEFAULT_BROTLI_QUALITY,
            brotli_window: DEFAULT_BROTLI_WINDOW,
            transform_glyf: DEFAULT_TRANSFORM_TABLES,
            transform_hmtx: DEFAULT_TRANSFORM_TABLES,
            parallel: DEFAULT_PARALLEL,
            cancel: None,
        }
    }
}

impl ConvertOptions {
    pub fn with_zlib_level(mut self, level: u32) -> Self {
        self.zlib_level = level;
        self
    }

    pub fn with_brotli_quality(mut self, quality: u32) -> Self {
        self.brotli_quality = quality;
        self
    }

    pub fn with_brotli_window(mut self, window: u32) -> Self {
        self.brotli_window = window;
        self
    }

    /// Enable or disable both WOFF2 table transforms.
    ///
    /// Enabling them does not guarantee transformed output. A decoder
    /// rebuilds glyf in canonical form (packed flag repeats, shortest
    /// coordinate encodings, 4-byte glyph alignment), so the transform is
    /// used only when that rebuild matches the source glyf and loca exactly.
    /// Fonts whose glyph data is laid out any other way, which includes many
    /// production fonts, get glyf, loca and hmtx stored untransformed and
    /// come back byte-identical.
    pub fn with_transforms(mut self, enabled: bool) -> Self {
        self.transform_glyf = enabled;
        self.transform_hmtx = enabled;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    pub fn woff(&self) -> WoffOptions {
        WoffOptions { zlib_level: self.zlib_level, parallel: self.parallel, cancel: self.cancel.clone() }
    }

    pub fn woff2(&self) -> Woff2Options {
        Woff2Options {
            brotli_quality: self.brotli_quality,
            brotli_window: self.brotli_window,
            transform_glyf: self.transform_glyf,
            transform_hmtx: self.transform_hmtx,
            cancel: self.cancel.clone(),
        }
    }
}
