use crate::SfntImage;

/// Container-level blocks of WOFF and WOFF2 that have no place in an SFNT.
///
/// Both blocks are opaque: metadata is held uncompressed so either codec
/// can recompress it with its own scheme, private data is copied as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebFontExtras {
    /// Extended metadata (XML), already decompressed.
    pub metadata: Option<Vec<u8>>,
    /// Private data block.
    pub private_data: Option<Vec<u8>>,
    /// WOFF major/minor version of the source container.
    pub version: Option<(u16, u16)>,
}

impl WebFontExtras {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_none() && self.private_data.is_none()
    }
}

/// Output of a codec decode step: the font tables plus any web font extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFont {
    pub image: SfntImage,
    pub extras: WebFontExtras,
}

impl DecodedFont {
    pub fn new(image: SfntImage) -> Self {
        Self { image, extras: WebFontExtras::default() }
    }
}
