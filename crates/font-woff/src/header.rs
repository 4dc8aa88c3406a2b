//! WOFF header and table directory records.
//!
//! ```text
//! WOFFHeader (44 bytes)
//!   signature       u32  'wOFF'
//!   flavor          u32  sfntVersion of the packed font
//!   length          u32  total file size
//!   numTables       u16
//!   reserved        u16  0
//!   totalSfntSize   u32  size of the unpacked font
//!   majorVersion    u16
//!   minorVersion    u16
//!   metaOffset      u32
//!   metaLength      u32  compressed
//!   metaOrigLength  u32  uncompressed
//!   privOffset      u32
//!   privLength      u32
//!
//! TableDirectoryEntry (20 bytes)
//!   tag, offset, compLength, origLength, origChecksum
//! ```

use fontverter_sfnt::{Reader, Tag, WriteBe};

use crate::{Error, Result};

pub const WOFF_SIGNATURE: Tag = Tag::new(b"wOFF");
pub const HEADER_SIZE: usize = 44;
pub const TABLE_ENTRY_SIZE: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WoffHeader {
    pub flavor: Tag,
    pub length: u32,
    pub num_tables: u16,
    pub total_sfnt_size: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub meta_offset: u32,
    pub meta_length: u32,
    pub meta_orig_length: u32,
    pub priv_offset: u32,
    pub priv_length: u32,
}

impl WoffHeader {
    pub fn read(reader: &mut Reader) -> Result<Self> {
        let signature = reader.read_tag()?;
        if signature != WOFF_SIGNATURE {
            return Err(Error::malformed(format!("bad WOFF signature '{signature}'")));
        }
        let flavor = reader.read_tag()?;
        let length = reader.read_u32()?;
        let num_tables = reader.read_u16()?;
        let reserved = reader.read_u16()?;
        if reserved != 0 {
            return Err(Error::malformed("WOFF header reserved field is not zero"));
        }
        Ok(Self {
            flavor,
            length,
            num_tables,
            total_sfnt_size: reader.read_u32()?,
            major_version: reader.read_u16()?,
            minor_version: reader.read_u16()?,
            meta_offset: reader.read_u32()?,
            meta_length: reader.read_u32()?,
            meta_orig_length: reader.read_u32()?,
            priv_offset: reader.read_u32()?,
            priv_length: reader.read_u32()?,
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.write_tag(WOFF_SIGNATURE);
        out.write_tag(self.flavor);
        out.write_u32(self.length);
        out.write_u16(self.num_tables);
        out.write_u16(0);
        out.write_u32(self.total_sfnt_size);
        out.write_u16(self.major_version);
        out.write_u16(self.minor_version);
        out.write_u32(self.meta_offset);
        out.write_u32(self.meta_length);
        out.write_u32(self.meta_orig_length);
        out.write_u32(self.priv_offset);
        out.write_u32(self.priv_length);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WoffTableEntry {
    pub tag: Tag,
    pub offset: u32,
    pub comp_length: u32,
    pub orig_length: u32,
    pub orig_checksum: u32,
}

impl WoffTableEntry {
    pub fn read(reader: &mut Reader) -> Result<Self> {
        Ok(Self {
            tag: reader.read_tag()?,
            offset: reader.read_u32()?,
            comp_length: reader.read_u32()?,
            orig_length: reader.read_u32()?,
            orig_checksum: reader.read_u32()?,
        })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.write_tag(self.tag);
        out.write_u32(self.offset);
        out.write_u32(self.comp_length);
        out.write_u32(self.orig_length);
        out.write_u32(self.orig_checksum);
    }

    /// Whether the payload is stored deflated rather than verbatim.
    pub fn is_compressed(&self) -> bool {
        self.comp_length < self.orig_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let header = WoffHeader {
            flavor: Tag::new(b"OTTO"),
            length: 1000,
            num_tables: 3,
            total_sfnt_size: 2000,
            major_version: 1,
            minor_version: 2,
            meta_offset: 0,
            meta_length: 0,
            meta_orig_length: 0,
            priv_offset: 996,
            priv_length: 4,
        };
        let mut out = Vec::new();
        header.write(&mut out);
        assert_eq!(out.len(), HEADER_SIZE);
        assert_eq!(&out[0..4], b"wOFF");
        assert_eq!(&out[4..8], b"OTTO");

        let parsed = WoffHeader::read(&mut Reader::new(&out)).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_rejects_bad_signature_and_reserved() {
        let mut out = Vec::new();
        WoffHeader {
            flavor: Tag::new(b"true"),
            length: 44,
            num_tables: 0,
            total_sfnt_size: 0,
            major_version: 0,
            minor_version: 0,
            meta_offset: 0,
            meta_length: 0,
            meta_orig_length: 0,
            priv_offset: 0,
            priv_length: 0,
        }
        .write(&mut out);

        let mut bad_signature = out.clone();
        bad_signature[3] = b'2';
        assert!(WoffHeader::read(&mut Reader::new(&bad_signature)).is_err());

        let mut bad_reserved = out;
        bad_reserved[14] = 1;
        assert!(WoffHeader::read(&mut Reader::new(&bad_reserved)).is_err());
    }

    #[test]
    fn test_entry_compression_flag() {
        let entry = WoffTableEntry {
            tag: Tag::new(b"glyf"),
            offset: 64,
            comp_length: 10,
            orig_length: 40,
            orig_checksum: 0,
        };
        assert!(entry.is_compressed());
        assert!(!WoffTableEntry { comp_length: 40, ..entry.clone() }.is_compressed());

        let mut out = Vec::new();
        entry.write(&mut out);
        assert_eq!(out.len(), TABLE_ENTRY_SIZE);
        assert_eq!(WoffTableEntry::read(&mut Reader::new(&out)).unwrap(), entry);
    }
}
