//! Error types for the WOFF2 codec.

use std::{io, result};

/// Errors that can occur while packing or unpacking WOFF2.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sfnt(#[from] fontverter_sfnt::Error),

    #[error("{0}")]
    Malformed(String),

    /// A transformed glyf, loca or hmtx table could not be rebuilt, or a
    /// table could not be transformed.
    #[error("table transform failed: {0}")]
    Transform(String),

    #[error("brotli stream is corrupt: {0}")]
    Decompress(#[source] io::Error),

    #[error("brotli compression failed: {0}")]
    Compress(#[source] io::Error),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }

    pub(crate) fn transform(reason: impl Into<String>) -> Self {
        Self::Transform(reason.into())
    }

    /// Report truncated or inconsistent transform streams as transform
    /// failures rather than container damage.
    pub(crate) fn in_transform(self) -> Self {
        match self {
            Self::Sfnt(fontverter_sfnt::Error::Malformed(reason)) | Self::Malformed(reason) => {
                Self::Transform(reason)
            }
            other => other,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
