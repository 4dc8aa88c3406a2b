//! WOFF2 header and table directory.
//!
//! ```text
//! WOFF2Header (48 bytes)
//!   signature            u32  'wOF2'
//!   flavor               u32
//!   length               u32
//!   numTables            u16
//!   reserved             u16  0
//!   totalSfntSize        u32
//!   totalCompressedSize  u32
//!   majorVersion         u16
//!   minorVersion         u16
//!   metaOffset           u32
//!   metaLength           u32
//!   metaOrigLength       u32
//!   privOffset           u32
//!   privLength           u32
//!
//! TableDirectoryEntry
//!   flags            u8           bits 0-5 known tag index, bits 6-7 transform version
//!   tag              u32          only when the index is 63
//!   origLength       UIntBase128
//!   transformLength  UIntBase128  only for transformed tables
//! ```

use fontverter_sfnt::{
    Reader, Tag, WriteBe,
    tags::{GLYF, LOCA},
};

use crate::{
    Error, Result,
    known_tags::{ARBITRARY_TAG_INDEX, KNOWN_TAGS, tag_index},
    varint::{read_base128, write_base128},
};

pub const WOFF2_SIGNATURE: Tag = Tag::new(b"wOF2");
pub const HEADER_SIZE: usize = 48;

/// Transform version meaning "stored as is" for glyf and loca.
const GLYF_NULL_TRANSFORM: u8 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Woff2Header {
    pub flavor: Tag,
    pub length: u32,
    pub num_tables: u16,
    pub total_sfnt_size: u32,
    pub total_compressed_size: u32,
    pub major_version: u16,
    pub minor_version: u16,
    pub meta_offset: u32,
    pub meta_length: u32,
    pub meta_orig_length: u32,
    pub priv_offset: u32,
    pub priv_length: u32,
}

impl Woff2Header {
    pub fn read(reader: &mut Reader) -> Result<Self> {
        let signature = reader.read_tag()?;
        if signature != WOFF2_SIGNATURE {
            return Err(Error::malformed(format!("bad WOFF2 signature '{signature}'")));
        }
        let flavor = reader.read_tag()?;
        let length = reader.read_u32()?;
        let num_tables = reader.read_u16()?;
        if reader.read_u16()? != 0 {
            return Err(Error::malformed("WOFF2 header reserved field is not zero"));
        }
        Ok(Self {
            flavor,
            length,
            num_tables,
            total_sfnt_size: reader.read_u32()?,
            total_compressed_size: reader.read_u32()?,
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
        out.write_tag(WOFF2_SIGNATURE);
        out.write_tag(self.flavor);
        out.write_u32(self.length);
        out.write_u16(self.num_tables);
        out.write_u16(0);
        out.write_u32(self.total_sfnt_size);
        out.write_u32(self.total_compressed_size);
        out.write_u16(self.major_version);
        out.write_u16(self.minor_version);
        out.write_u32(self.meta_offset);
        out.write_u32(self.meta_length);
        out.write_u32(self.meta_orig_length);
        out.write_u32(self.priv_offset);
        out.write_u32(self.priv_length);
    }
}

/// One table directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDirectoryEntry {
    pub tag: Tag,
    /// The two high bits of the flags byte.
    pub transform_version: u8,
    pub orig_length: u32,
    /// Present exactly when the table is transformed.
    pub transform_length: Option<u32>,
}

impl TableDirectoryEntry {
    /// An entry for a table stored without transformation.
    pub fn null(tag: Tag, orig_length: u32) -> Self {
        let transform_version = if tag == GLYF || tag == LOCA { GLYF_NULL_TRANSFORM } else { 0 };
        Self { tag, transform_version, orig_length, transform_length: None }
    }

    pub fn transformed(tag: Tag, transform_version: u8, orig_length: u32, transform_length: u32) -> Self {
        Self { tag, transform_version, orig_length, transform_length: Some(transform_length) }
    }

    pub fn is_transformed(&self) -> bool {
        is_transformed(self.tag, self.transform_version)
    }

    /// Bytes this table occupies in the decompressed stream.
    pub fn stream_length(&self) -> u32 {
        self.transform_length.unwrap_or(self.orig_length)
    }

    pub fn read(reader: &mut Reader) -> Result<Self> {
        let flags = reader.read_u8()?;
        let index = flags & 0x3F;
        let transform_version = flags >> 6;
        let tag = if index == ARBITRARY_TAG_INDEX { reader.read_tag()? } else { KNOWN_TAGS[index as usize] };

        let orig_length = read_base128(reader)?;
        let transform_length = if is_transformed(tag, transform_version) {
            Some(read_base128(reader)?)
        } else {
            None
        };

        if tag == LOCA && transform_length.is_some_and(|len| len != 0) {
            return Err(Error::malformed("transformed loca must have a zero transformLength"));
        }

        Ok(Self { tag, transform_version, orig_length, transform_length })
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        let index = tag_index(self.tag);
        out.push(index | (self.transform_version << 6));
        if index == ARBITRARY_TAG_INDEX {
            out.write_tag(self.tag);
        }
        write_base128(out, self.orig_length);
        if let Some(transform_length) = self.transform_length {
            write_base128(out, transform_length);
        }
    }
}

/// glyf and loca use version 3 for the null transform, every other table 0.
fn is_transformed(tag: Tag, version: u8) -> bool {
    if tag == GLYF || tag == LOCA { version != GLYF_NULL_TRANSFORM } else { version != 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_entry(bytes: &[u8]) -> Result<TableDirectoryEntry> {
        TableDirectoryEntry::read(&mut Reader::new(bytes))
    }

    #[test]
    fn test_known_tag_entry() {
        let entry = TableDirectoryEntry::null(Tag::new(b"cmap"), 300);
        let mut out = Vec::new();
        entry.write(&mut out);
        assert_eq!(out, [0x00, 0x82, 0x2C]);
        assert_eq!(read_entry(&out).unwrap(), entry);
    }

    #[test]
    fn test_arbitrary_tag_entry() {
        let entry = TableDirectoryEntry::null(Tag::new(b"DSIG"), 8);
        let mut out = Vec::new();
        entry.write(&mut out);
        assert_eq!(out, [0x3F, b'D', b'S', b'I', b'G', 0x08]);
        assert_eq!(read_entry(&out).unwrap(), entry);
    }

    #[test]
    fn test_glyf_versions() {
        // glyf, version 0: transformed, transformLength follows
        let transformed = read_entry(&[0x0A, 0x64, 0x32]).unwrap();
        assert!(transformed.is_transformed());
        assert_eq!(transformed.transform_length, Some(50));
        assert_eq!(transformed.stream_length(), 50);

        // glyf, version 3: null transform
        let null = read_entry(&[0xCA, 0x64]).unwrap();
        assert!(!null.is_transformed());
        assert_eq!(null.stream_length(), 100);
        assert_eq!(null, TableDirectoryEntry::null(GLYF, 100));
    }

    #[test]
    fn test_other_table_versions() {
        // hmtx, version 1
        let hmtx = read_entry(&[0x43, 0x20, 0x11]).unwrap();
        assert!(hmtx.is_transformed());
        assert_eq!(hmtx.transform_length, Some(0x11));
        // cmap, version 0
        assert!(!read_entry(&[0x00, 0x20]).unwrap().is_transformed());
    }

    #[test]
    fn test_transformed_loca_needs_zero_length() {
        assert!(read_entry(&[0x0B, 0x20, 0x00]).is_ok());
        assert!(read_entry(&[0x0B, 0x20, 0x04]).is_err());
    }

    #[test]
    fn test_header_layout() {
        let header = Woff2Header {
            flavor: Tag::new(b"OTTO"),
            length: 500,
            num_tables: 9,
            total_sfnt_size: 1200,
            total_compressed_size: 400,
            major_version: 1,
            minor_version: 0,
            meta_offset: 0,
            meta_length: 0,
            meta_orig_length: 0,
            priv_offset: 0,
            priv_length: 0,
        };
        let mut out = Vec::new();
        header.write(&mut out);
        assert_eq!(out.len(), HEADER_SIZE);
        assert_eq!(Woff2Header::read(&mut Reader::new(&out)).unwrap(), header);

        out[14] = 1;
        assert!(Woff2Header::read(&mut Reader::new(&out)).is_err());
    }
}
