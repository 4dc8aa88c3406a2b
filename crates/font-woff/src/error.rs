//! Error types for the WOFF codec.

use std::{io, result};

/// Errors that can occur while packing or unpacking WOFF.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Sfnt(#[from] fontverter_sfnt::Error),

    #[error("{0}")]
    Malformed(String),

    #[error("zlib stream is corrupt: {0}")]
    Inflate(#[source] io::Error),

    #[error("zlib compression failed: {0}")]
    Deflate(#[source] io::Error),
}

impl Error {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}

pub type Result<T> = result::Result<T, Error>;
