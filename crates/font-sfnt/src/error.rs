//! Error types for SFNT parsing and serialization.

use std::result;

use read_fonts::ReadError;

/// Errors raised while reading or laying out an SFNT container.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse font: {0}")]
    Parse(#[from] ReadError),

    #[error("{0}")]
    Malformed(String),

    #[error("font collections are not supported")]
    Collection,

    #[error("duplicate table '{0}'")]
    DuplicateTable(font_types::Tag),

    #[error("conversion cancelled")]
    Cancelled,
}

impl Error {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed(reason.into())
    }
}

pub type Result<T> = result::Result<T, Error>;
