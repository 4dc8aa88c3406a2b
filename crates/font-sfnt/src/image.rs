//! In-memory SFNT image: decode from and encode to the plain container.

use font_types::Tag;
use log::{debug, warn};
use read_fonts::FontRef;

use crate::{
    CHECKSUM_MAGIC, CancelToken, Error, HEAD_CHECKSUM_ADJUSTMENT_OFFSET, Result, WriteBe, checksum,
    pad4, table_checksum, tags::HEAD,
};

/// Size of the SFNT offset table.
pub const SFNT_HEADER_SIZE: usize = 12;

/// Size of one table directory entry.
pub const TABLE_RECORD_SIZE: usize = 16;

pub const TRUETYPE_FLAVOR: Tag = Tag::new(&[0x00, 0x01, 0x00, 0x00]);
pub const CFF_FLAVOR: Tag = Tag::new(b"OTTO");
pub const APPLE_TRUETYPE_FLAVOR: Tag = Tag::new(b"true");
pub const COLLECTION_TAG: Tag = Tag::new(b"ttcf");

/// One table directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

/// An owned table payload together with the checksum its source declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfntTable {
    pub tag: Tag,
    pub checksum: u32,
    pub data: Vec<u8>,
}

impl SfntTable {
    /// Create a table, computing its checksum from the data.
    pub fn new(tag: Tag, data: Vec<u8>) -> Self {
        Self { tag, checksum: table_checksum(tag, &data), data }
    }

    /// Whether the declared checksum matches the data.
    pub fn checksum_matches(&self) -> bool {
        self.checksum == table_checksum(self.tag, &self.data)
    }
}

/// A font's flavor and its tables in source order.
///
/// Table tags are unique. [`SfntImage::to_bytes`] writes the table data in
/// the order the tables were added and the directory sorted by tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SfntImage {
    flavor: Tag,
    tables: Vec<SfntTable>,
}

impl SfntImage {
    pub fn new(flavor: Tag) -> Self {
        Self { flavor, tables: Vec::new() }
    }

    /// The sfntVersion tag (`00 01 00 00`, `OTTO` or `true`).
    pub fn flavor(&self) -> Tag {
        self.flavor
    }

    pub fn tables(&self) -> &[SfntTable] {
        &self.tables
    }

    pub fn into_tables(self) -> Vec<SfntTable> {
        self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn table(&self, tag: Tag) -> Option<&SfntTable> {
        self.tables.iter().find(|t| t.tag == tag)
    }

    pub fn table_data(&self, tag: Tag) -> Option<&[u8]> {
        self.table(tag).map(|t| t.data.as_slice())
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.table(tag).is_some()
    }

    /// Append a table, rejecting duplicate tags.
    pub fn push(&mut self, table: SfntTable) -> Result<()> {
        if self.contains(table.tag) {
            return Err(Error::DuplicateTable(table.tag));
        }
        if self.tables.len() >= u16::MAX as usize {
            return Err(Error::malformed("too many tables for an SFNT directory"));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Append a table built from raw data.
    pub fn add_table(&mut self, tag: Tag, data: impl Into<Vec<u8>>) -> Result<&mut Self> {
        self.push(SfntTable::new(tag, data.into()))?;
        Ok(self)
    }

    /// Parse a plain SFNT font, copying every table out of `data`.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_cancel(data, None)
    }

    /// Like [`SfntImage::from_bytes`], polling `cancel` between tables.
    pub fn from_bytes_with_cancel(data: &[u8], cancel: Option<&CancelToken>) -> Result<Self> {
        if data.get(..4) == Some(COLLECTION_TAG.to_be_bytes().as_slice()) {
            return Err(Error::Collection);
        }

        let font = FontRef::new(data)?;
        let flavor = Tag::from_be_bytes(font.table_directory.sfnt_version().to_be_bytes());
        let mut image = Self::new(flavor);

        for record in font.table_directory.table_records() {
            CancelToken::check(cancel)?;

            let tag = record.tag();
            let offset = record.offset() as usize;
            let length = record.length() as usize;
            let end = offset.checked_add(length).filter(|&end| end <= data.len()).ok_or_else(|| {
                Error::malformed(format!(
                    "table '{tag}' ({length} bytes at offset {offset}) extends beyond the {}-byte font",
                    data.len()
                ))
            })?;

            let table = SfntTable { tag, checksum: record.checksum(), data: data[offset..end].to_vec() };
            if !table.checksum_matches() {
                warn!("Table '{tag}' checksum does not match its data");
            }
            image.push(table)?;
        }

        debug!("Parsed SFNT with {} tables", image.len());
        Ok(image)
    }

    /// The directory [`SfntImage::to_bytes`] writes, sorted by tag.
    pub fn table_records(&self) -> Vec<TableRecord> {
        let mut offset = SFNT_HEADER_SIZE + TABLE_RECORD_SIZE * self.tables.len();
        let mut records: Vec<TableRecord> = self
            .tables
            .iter()
            .map(|table| {
                let record = TableRecord {
                    tag: table.tag,
                    checksum: table_checksum(table.tag, &table.data),
                    offset: offset as u32,
                    length: table.data.len() as u32,
                };
                offset += pad4(table.data.len());
                record
            })
            .collect();
        records.sort_by_key(|r| r.tag);
        records
    }

    /// Size in bytes of the serialized font, padding included.
    pub fn serialized_size(&self) -> usize {
        SFNT_HEADER_SIZE
            + TABLE_RECORD_SIZE * self.tables.len()
            + self.tables.iter().map(|t| pad4(t.data.len())).sum::<usize>()
    }

    /// Serialize to a plain SFNT font.
    ///
    /// Table checksums are recomputed and `head.checksumAdjustment` is set so
    /// the file sums to [`CHECKSUM_MAGIC`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let records = self.table_records();
        let num_tables = self.tables.len() as u16;
        let (search_range, entry_selector, range_shift) = search_params(num_tables);

        let mut out = Vec::with_capacity(self.serialized_size());
        out.write_tag(self.flavor);
        out.write_u16(num_tables);
        out.write_u16(search_range);
        out.write_u16(entry_selector);
        out.write_u16(range_shift);

        for record in &records {
            out.write_tag(record.tag);
            out.write_u32(record.checksum);
            out.write_u32(record.offset);
            out.write_u32(record.length);
        }

        let mut adjustment_at = None;
        for table in &self.tables {
            let start = out.len();
            out.extend_from_slice(&table.data);
            if table.tag == HEAD && table.data.len() >= HEAD_CHECKSUM_ADJUSTMENT_OFFSET + 4 {
                let field = start + HEAD_CHECKSUM_ADJUSTMENT_OFFSET;
                out[field..field + 4].fill(0);
                adjustment_at = Some(field);
            }
            out.pad_to_4();
        }

        if let Some(field) = adjustment_at {
            let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&out));
            out[field..field + 4].copy_from_slice(&adjustment.to_be_bytes());
        }

        out
    }
}

/// `(searchRange, entrySelector, rangeShift)` for a table directory.
pub fn search_params(num_tables: u16) -> (u16, u16, u16) {
    if num_tables == 0 {
        return (0, 0, 0);
    }
    let entry_selector = 15 - num_tables.leading_zeros();
    let search_range = (1u32 << entry_selector) * 16;
    let range_shift = u32::from(num_tables) * 16 - search_range;
    (search_range as u16, entry_selector as u16, range_shift as u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::head_checksum;

    fn head_table() -> Vec<u8> {
        let mut head = vec![0u8; 54];
        head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
        head[8..12].copy_from_slice(&0x1234_5678u32.to_be_bytes());
        head[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());
        head
    }

    fn sample_image() -> SfntImage {
        let mut image = SfntImage::new(TRUETYPE_FLAVOR);
        image.add_table(Tag::new(b"name"), vec![1, 2, 3]).unwrap();
        image.add_table(HEAD, head_table()).unwrap();
        image.add_table(Tag::new(b"cmap"), vec![9; 8]).unwrap();
        image
    }

    #[test]
    fn test_search_params() {
        assert_eq!(search_params(0), (0, 0, 0));
        assert_eq!(search_params(1), (16, 0, 0));
        assert_eq!(search_params(9), (128, 3, 16));
        assert_eq!(search_params(16), (256, 4, 0));
        assert_eq!(search_params(17), (256, 4, 16));
    }

    #[test]
    fn test_duplicate_tags_rejected() {
        let mut image = sample_image();
        let err = image.add_table(Tag::new(b"cmap"), vec![0; 4]).unwrap_err();
        assert!(matches!(err, Error::DuplicateTable(tag) if tag == Tag::new(b"cmap")));
    }

    #[test]
    fn test_directory_sorted_data_in_source_order() {
        let image = sample_image();
        let records = image.table_records();
        let tags: Vec<_> = records.iter().map(|r| r.tag).collect();
        assert_eq!(tags, [Tag::new(b"cmap"), HEAD, Tag::new(b"name")]);

        let data_start = (SFNT_HEADER_SIZE + 3 * TABLE_RECORD_SIZE) as u32;
        let name = records.iter().find(|r| r.tag == Tag::new(b"name")).unwrap();
        let head = records.iter().find(|r| r.tag == HEAD).unwrap();
        let cmap = records.iter().find(|r| r.tag == Tag::new(b"cmap")).unwrap();
        assert_eq!(name.offset, data_start);
        assert_eq!(head.offset, data_start + 4);
        assert_eq!(cmap.offset, data_start + 4 + 56);
        assert_eq!(name.length, 3);
    }

    #[test]
    fn test_to_bytes_sets_checksum_adjustment() {
        let bytes = sample_image().to_bytes();
        assert_eq!(bytes.len(), sample_image().serialized_size());
        assert_eq!(bytes.len() % 4, 0);
        assert_eq!(checksum(&bytes), CHECKSUM_MAGIC);

        let reparsed = SfntImage::from_bytes(&bytes).unwrap();
        let head = reparsed.table_data(HEAD).unwrap();
        assert_ne!(&head[8..12], &0x1234_5678u32.to_be_bytes());
        assert_eq!(reparsed.table(HEAD).unwrap().checksum, head_checksum(head));
    }

    #[test]
    fn test_round_trip_is_stable() {
        let first = sample_image().to_bytes();
        let second = SfntImage::from_bytes(&first).unwrap().to_bytes();
        assert_eq!(first, second);
    }

    #[test]
    fn test_collection_rejected() {
        let mut data = b"ttcf".to_vec();
        data.extend_from_slice(&[0; 12]);
        assert!(matches!(SfntImage::from_bytes(&data), Err(Error::Collection)));
    }

    #[test]
    fn test_truncated_header_is_an_error() {
        assert!(SfntImage::from_bytes(&[0, 1, 0, 0, 0]).is_err());
        assert!(SfntImage::from_bytes(b"abcd").is_err());
    }

    #[test]
    fn test_out_of_bounds_table_is_malformed() {
        let mut bytes = sample_image().to_bytes();
        // Point the first directory entry's length far past the end.
        let length_field = SFNT_HEADER_SIZE + 12;
        bytes[length_field..length_field + 4].copy_from_slice(&0x0010_0000u32.to_be_bytes());
        let err = SfntImage::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::Malformed(_)), "{err}");
    }

    #[test]
    fn test_cancelled_parse() {
        let bytes = sample_image().to_bytes();
        let token = CancelToken::new();
        token.cancel();
        let err = SfntImage::from_bytes_with_cancel(&bytes, Some(&token)).unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }
}
