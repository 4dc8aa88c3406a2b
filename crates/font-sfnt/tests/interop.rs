//! Cross-checks against the fontations reader and writer.

use fontverter_sfnt::{CHECKSUM_MAGIC, SfntImage, Tag, checksum};
use read_fonts::FontRef;
use write_fonts::FontBuilder;

fn tables() -> Vec<(Tag, Vec<u8>)> {
    vec![
        (Tag::new(b"cmap"), vec![0, 0, 0, 0]),
        (Tag::new(b"name"), b"not really a name table".to_vec()),
        (Tag::new(b"post"), vec![0, 3, 0, 0, 1, 2, 3]),
        (Tag::new(b"OS/2"), (0u8..96).collect()),
    ]
}

#[test]
fn test_reads_font_built_by_write_fonts() {
    let mut builder = FontBuilder::new();
    for (tag, data) in tables() {
        builder.add_raw(tag, data);
    }
    let data = builder.build();

    let image = SfntImage::from_bytes(&data).unwrap();
    assert_eq!(image.len(), tables().len());
    for (tag, expected) in tables() {
        assert_eq!(image.table_data(tag), Some(expected.as_slice()), "table {tag}");
    }
}

#[test]
fn test_output_is_readable_by_read_fonts() {
    let mut image = SfntImage::new(fontverter_sfnt::TRUETYPE_FLAVOR);
    for (tag, data) in tables() {
        image.add_table(tag, data).unwrap();
    }
    let bytes = image.to_bytes();

    let font = FontRef::new(&bytes).unwrap();
    let records = font.table_directory.table_records();
    assert_eq!(records.len(), tables().len());

    // Directory must be sorted for binary search.
    let tags: Vec<Tag> = records.iter().map(|r| r.tag()).collect();
    let mut sorted = tags.clone();
    sorted.sort();
    assert_eq!(tags, sorted);

    for (tag, expected) in tables() {
        let data = font.table_data(tag).unwrap();
        assert_eq!(data.as_bytes(), expected.as_slice(), "table {tag}");
    }
}

#[test]
fn test_checksum_adjustment_with_head() {
    let mut head = vec![0u8; 54];
    head[0..4].copy_from_slice(&0x0001_0000u32.to_be_bytes());
    head[12..16].copy_from_slice(&0x5F0F_3CF5u32.to_be_bytes());

    let mut image = SfntImage::new(fontverter_sfnt::TRUETYPE_FLAVOR);
    image.add_table(Tag::new(b"head"), head).unwrap();
    for (tag, data) in tables() {
        image.add_table(tag, data).unwrap();
    }

    let bytes = image.to_bytes();
    assert_eq!(checksum(&bytes), CHECKSUM_MAGIC);
    assert!(FontRef::new(&bytes).is_ok());
}

#[test]
fn test_reads_tables_at_directory_offsets() {
    // Data laid out in reverse tag order, so directory offsets are not monotonic.
    let mut tables = tables();
    tables.sort_by_key(|(tag, _)| std::cmp::Reverse(*tag));
    let mut image = SfntImage::new(fontverter_sfnt::TRUETYPE_FLAVOR);
    for (tag, data) in &tables {
        image.add_table(*tag, data.clone()).unwrap();
    }
    let bytes = image.to_bytes();

    let font = FontRef::new(&bytes).unwrap();
    let offsets: Vec<u32> = font.table_directory.table_records().iter().map(|r| r.offset()).collect();
    assert!(offsets.windows(2).any(|pair| pair[0] > pair[1]));

    let parsed = SfntImage::from_bytes(&bytes).unwrap();
    for (tag, expected) in &tables {
        assert_eq!(parsed.table_data(*tag), Some(expected.as_slice()), "table {tag}");
    }
}
