use crate::{ContainerFormat, Error, Result};

/// Identify a font container from its first four bytes.
///
/// `wOFF` and `wOF2` are checked before the SFNT versions (`true`, `OTTO`,
/// `00 01 00 00`). Anything else, including a buffer shorter than four
/// bytes, is [`Error::UnrecognizedFormat`] carrying the bytes that were seen.
pub fn detect_format(data: &[u8]) -> Result<ContainerFormat> {
    match data.get(..4) {
        Some(b"wOFF") => Ok(ContainerFormat::Woff),
        Some(b"wOF2") => Ok(ContainerFormat::Woff2),
        Some(b"true" | b"OTTO" | b"\x00\x01\x00\x00") => Ok(ContainerFormat::Sfnt),
        _ => Err(Error::UnrecognizedFormat { signature: data[..data.len().min(4)].to_vec() }),
    }
}
