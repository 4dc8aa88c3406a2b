//! Variable-length integers used by WOFF2.
//!
//! UIntBase128 sizes the table directory; 255UInt16 counts points and
//! instruction bytes inside the transformed glyf table.

use fontverter_sfnt::{Reader, WriteBe};

use crate::{Error, Result};

const ONE_MORE_BYTE_CODE1: u8 = 255;
const ONE_MORE_BYTE_CODE2: u8 = 254;
const WORD_CODE: u8 = 253;
const LOWEST_U_CODE: u16 = 253;

/// Read a UIntBase128 value: at most five bytes, no leading zeros, fits in u32.
pub fn read_base128(reader: &mut Reader) -> Result<u32> {
    let mut value = 0u32;
    for i in 0..5 {
        let byte = reader.read_u8()?;
        if i == 0 && byte == 0x80 {
            return Err(Error::malformed("UIntBase128 has a leading zero byte"));
        }
        if value & 0xFE00_0000 != 0 {
            return Err(Error::malformed("UIntBase128 overflows 32 bits"));
        }
        value = (value << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(Error::malformed("UIntBase128 is longer than five bytes"))
}

/// Number of bytes [`write_base128`] uses for `value`.
pub fn base128_size(value: u32) -> usize {
    let bits = 32 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

pub fn write_base128(out: &mut Vec<u8>, value: u32) {
    let size = base128_size(value);
    for i in (0..size).rev() {
        let mut byte = ((value >> (7 * i)) & 0x7F) as u8;
        if i != 0 {
            byte |= 0x80;
        }
        out.push(byte);
    }
}

pub fn read_255_u16(reader: &mut Reader) -> Result<u16> {
    let code = reader.read_u8()?;
    let value = match code {
        WORD_CODE => reader.read_u16()?,
        ONE_MORE_BYTE_CODE1 => u16::from(reader.read_u8()?) + LOWEST_U_CODE,
        ONE_MORE_BYTE_CODE2 => u16::from(reader.read_u8()?) + LOWEST_U_CODE * 2,
        _ => u16::from(code),
    };
    Ok(value)
}

pub fn write_255_u16(out: &mut Vec<u8>, value: u16) {
    if value < LOWEST_U_CODE {
        out.push(value as u8);
    } else if value < LOWEST_U_CODE * 2 {
        out.push(ONE_MORE_BYTE_CODE1);
        out.push((value - LOWEST_U_CODE) as u8);
    } else if value < LOWEST_U_CODE * 2 + 256 {
        out.push(ONE_MORE_BYTE_CODE2);
        out.push((value - LOWEST_U_CODE * 2) as u8);
    } else {
        out.push(WORD_CODE);
        out.write_u16(value);
    }
}
