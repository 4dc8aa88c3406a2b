use std::result;

use crate::ContainerFormat;

/// Errors a conversion can end in.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The first four bytes match none of the known signatures.
    #[error("Unrecognized font signature: {}", .signature.escape_ascii())]
    UnrecognizedFormat { signature: Vec<u8> },

    #[error("Unsupported target format: {format}")]
    UnsupportedTarget { format: String },

    #[error("Unsupported source format: {format}")]
    UnsupportedSource { format: String },

    #[error("malformed {format} data: {reason}")]
    MalformedContainer { format: ContainerFormat, reason: String },

    /// A transformed glyf, loca or hmtx table in a WOFF2 file could not be rebuilt.
    #[error("WOFF2 table transform failed: {reason}")]
    TransformFailure { reason: String },

    #[error("conversion cancelled")]
    Cancelled,
}

impl Error {
    fn malformed(format: ContainerFormat, reason: impl ToString) -> Self {
        Self::MalformedContainer { format, reason: reason.to_string() }
    }

    pub(crate) fn sfnt(err: fontverter_sfnt::Error) -> Self {
        match err {
            fontverter_sfnt::Error::Cancelled => Self::Cancelled,
            err => Self::malformed(ContainerFormat::Sfnt, err),
        }
    }

    pub(crate) fn woff(err: fontverter_font_woff::Error) -> Self {
        match err {
            fontverter_font_woff::Error::Sfnt(fontverter_sfnt::Error::Cancelled) => Self::Cancelled,
            err => Self::malformed(ContainerFormat::Woff, err),
        }
    }

    pub(crate) fn woff2(err: fontverter_font_woff2::Error) -> Self {
        match err {
            fontverter_font_woff2::Error::Sfnt(fontverter_sfnt::Error::Cancelled) => Self::Cancelled,
            fontverter_font_woff2::Error::Transform(reason) => Self::TransformFailure { reason },
            err => Self::malformed(ContainerFormat::Woff2, err),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = Error::UnrecognizedFormat { signature: b"abcd".to_vec() };
        assert_eq!(err.to_string(), "Unrecognized font signature: abcd");
        let err = Error::UnsupportedTarget { format: "footype".to_string() };
        assert_eq!(err.to_string(), "Unsupported target format: footype");
        let err = Error::UnsupportedSource { format: "footype".to_string() };
        assert_eq!(err.to_string(), "Unsupported source format: footype");
    }

    #[test]
    fn test_signature_bytes_are_escaped() {
        let err = Error::UnrecognizedFormat { signature: vec![0, b'x', 0xFF] };
        assert_eq!(err.to_string(), r"Unrecognized font signature: \x00x\xff");
    }

    #[test]
    fn test_codec_errors_map_to_taxonomy() {
        assert!(matches!(Error::sfnt(fontverter_sfnt::Error::Cancelled), Error::Cancelled));
        assert!(matches!(
            Error::woff2(fontverter_font_woff2::Error::Transform("bad".into())),
            Error::TransformFailure { reason } if reason == "bad"
        ));
        assert!(matches!(
            Error::woff(fontverter_font_woff::Error::Malformed("short".into())),
            Error::MalformedContainer { format: ContainerFormat::Woff, reason } if reason == "short"
        ));
    }
}
