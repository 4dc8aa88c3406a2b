//! OpenType table checksums.

use font_types::Tag;

use crate::tags::HEAD;

/// `head.checksumAdjustment` is chosen so the whole file sums to this value.
pub const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;

/// Byte offset of `checksumAdjustment` inside the `head` table.
pub const HEAD_CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

/// Round a length up to the next multiple of four.
pub const fn pad4(len: usize) -> usize {
    (len + 3) & !3
}

/// Sum of big-endian u32 words, the final partial word zero-padded.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

/// Checksum of a `head` table, summed as if `checksumAdjustment` were zero.
pub fn head_checksum(head: &[u8]) -> u32 {
    let sum = checksum(head);
    let field = HEAD_CHECKSUM_ADJUSTMENT_OFFSET..HEAD_CHECKSUM_ADJUSTMENT_OFFSET + 4;
    match head.get(field) {
        Some(adjustment) => {
            sum.wrapping_sub(u32::from_be_bytes([adjustment[0], adjustment[1], adjustment[2], adjustment[3]]))
        }
        None => sum,
    }
}

/// Checksum as recorded in a table directory entry.
pub fn table_checksum(tag: Tag, data: &[u8]) -> u32 {
    if tag == HEAD { head_checksum(data) } else { checksum(data) }
}
