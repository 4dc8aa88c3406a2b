//! Point deltas packed as a flag byte plus one to four data bytes.

use fontverter_sfnt::Reader;

use crate::{Error, Result};

const OFF_CURVE: u8 = 0x80;

/// Apply the sign bit: set means positive.
fn with_sign(flag: u8, value: i32) -> i32 {
    if flag & 1 != 0 { value } else { -value }
}

/// Read one point delta. Returns `(on_curve, dx, dy)`.
pub fn decode(flag: u8, glyph: &mut Reader) -> Result<(bool, i32, i32)> {
    let on_curve = flag & OFF_CURVE == 0;
    let f = flag & 0x7F;

    let (dx, dy) = if f < 10 {
        let b0 = i32::from(glyph.read_u8()?);
        (0, with_sign(f, (i32::from(f & 14) << 7) + b0))
    } else if f < 20 {
        let b0 = i32::from(glyph.read_u8()?);
        (with_sign(f, (i32::from((f - 10) & 14) << 7) + b0), 0)
    } else if f < 84 {
        let b0 = i32::from(f - 20);
        let b1 = i32::from(glyph.read_u8()?);
        (
            with_sign(f, 1 + (b0 & 0x30) + (b1 >> 4)),
            with_sign(f >> 1, 1 + ((b0 & 0x0C) << 2) + (b1 & 0x0F)),
        )
    } else if f < 120 {
        let b0 = i32::from(f - 84);
        let [in0, in1] = glyph.read_array::<2>()?.map(i32::from);
        (
            with_sign(f, 1 + ((b0 / 12) << 8) + in0),
            with_sign(f >> 1, 1 + (((b0 % 12) >> 2) << 8) + in1),
        )
    } else if f < 124 {
        let [in0, in1, in2] = glyph.read_array::<3>()?.map(i32::from);
        (with_sign(f, (in0 << 4) + (in1 >> 4)), with_sign(f >> 1, ((in1 & 0x0F) << 8) + in2))
    } else {
        let x = i32::from(glyph.read_u16()?);
        let y = i32::from(glyph.read_u16()?);
        (with_sign(f, x), with_sign(f >> 1, y))
    };

    Ok((on_curve, dx, dy))
}

/// Append one point delta, choosing the smallest encoding.
pub fn encode(on_curve: bool, dx: i32, dy: i32, flags: &mut Vec<u8>, glyph: &mut Vec<u8>) -> Result<()> {
    let abs_x = dx.unsigned_abs();
    let abs_y = dy.unsigned_abs();
    if abs_x > 0xFFFF || abs_y > 0xFFFF {
        return Err(Error::transform(format!("point delta ({dx}, {dy}) does not fit in 16 bits")));
    }

    let on_curve_bit = if on_curve { 0 } else { OFF_CURVE };
    let x_sign = u32::from(dx >= 0);
    let y_sign = u32::from(dy >= 0);
    let xy_signs = x_sign + 2 * y_sign;

    let flag = if dx == 0 && abs_y < 1280 {
        glyph.push(abs_y as u8);
        ((abs_y & 0xF00) >> 7) + y_sign
    } else if dy == 0 && abs_x < 1280 {
        glyph.push(abs_x as u8);
        10 + ((abs_x & 0xF00) >> 7) + x_sign
    } else if abs_x < 65 && abs_y < 65 {
        let (x, y) = (abs_x - 1, abs_y - 1);
        glyph.push((((x & 0x0F) << 4) | (y & 0x0F)) as u8);
        20 + (x & 0x30) + ((y & 0x30) >> 2) + xy_signs
    } else if abs_x < 769 && abs_y < 769 {
        let (x, y) = (abs_x - 1, abs_y - 1);
        glyph.push(x as u8);
        glyph.push(y as u8);
        84 + 12 * ((x & 0x300) >> 8) + ((y & 0x300) >> 6) + xy_signs
    } else if abs_x < 4096 && abs_y < 4096 {
        glyph.push((abs_x >> 4) as u8);
        glyph.push((((abs_x & 0x0F) << 4) | (abs_y >> 8)) as u8);
        glyph.push(abs_y as u8);
        120 + xy_signs
    } else {
        glyph.extend_from_slice(&(abs_x as u16).to_be_bytes());
        glyph.extend_from_slice(&(abs_y as u16).to_be_bytes());
        124 + xy_signs
    };

    flags.push(flag as u8 | on_curve_bit);
    Ok(())
}
