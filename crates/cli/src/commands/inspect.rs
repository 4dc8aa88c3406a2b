use std::path::Path;

use anyhow::{Context, Result};
use fontverter_core::{ContainerFormat, convert, detect_format};
use read_fonts::{FontRef, TableProvider, types::Tag};

use crate::io::FontFile;

/// One row of the table listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub tag: Tag,
    pub checksum: u32,
    pub length: u32,
}

/// Decode `data` to SFNT and list its table directory.
pub fn summarize(data: &[u8]) -> Result<(ContainerFormat, Option<u16>, Vec<TableSummary>)> {
    let format = detect_format(data)?;
    let sfnt = convert(data, "sfnt", None)?;
    let font = FontRef::new(&sfnt).context("Decoded font could not be parsed")?;
    let num_glyphs = font.maxp().ok().map(|maxp| maxp.num_glyphs());
    let tables = font
        .table_directory
        .table_records()
        .iter()
        .map(|record| TableSummary { tag: record.tag(), checksum: record.checksum(), length: record.length() })
        .collect();
    Ok((format, num_glyphs, tables))
}

/// Print the container format, glyph count and tables of a font.
pub fn inspect_file(path: &Path) -> Result<()> {
    let data = FontFile::new(path).read()?;
    let (format, num_glyphs, tables) =
        summarize(&data).with_context(|| format!("Failed to inspect {}", path.display()))?;

    println!("{}: {format}, {} bytes", path.display(), data.len());
    if let Some(num_glyphs) = num_glyphs {
        println!("glyphs: {num_glyphs}");
    }
    for table in &tables {
        println!("  {}  checksum 0x{:08X}  {:>8} bytes", table.tag, table.checksum, table.length);
    }
    Ok(())
}
