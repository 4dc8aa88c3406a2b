use font_types::Tag;

use crate::pad4;

/// Big-endian append helpers for building container byte streams.
pub trait WriteBe {
    fn write_u8(&mut self, value: u8);
    fn write_u16(&mut self, value: u16);
    fn write_i16(&mut self, value: i16);
    fn write_u32(&mut self, value: u32);
    fn write_tag(&mut self, tag: Tag);
    /// Append zero bytes until the length is a multiple of four.
    fn pad_to_4(&mut self);
}

impl WriteBe for Vec<u8> {
    fn write_u8(&mut self, value: u8) {
        self.push(value);
    }

    fn write_u16(&mut self, value: u16) {
        self.extend_from_slice(&value.to_be_bytes());
    }

    fn write_i16(&mut self, value: i16) {
        self.extend_from_slice(&value.to_be_bytes());
    }

    fn write_u32(&mut self, value: u32) {
        self.extend_from_slice(&value.to_be_bytes());
    }

    fn write_tag(&mut self, tag: Tag) {
        self.extend_from_slice(&tag.to_be_bytes());
    }

    fn pad_to_4(&mut self) {
        self.resize(pad4(self.len()), 0);
    }
}
