use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fontverter_core::{ContainerFormat, ConvertOptions, convert_with};
use log::info;

use crate::io::{FontFile, output_path};

/// Where a converted font is written.
#[derive(Debug, Clone, Copy)]
pub enum Destination<'a> {
    /// Exactly this path.
    File(&'a Path),
    /// This directory, under the input's file stem and the target's extension.
    Dir(&'a Path),
    /// Next to the input, with the target's extension.
    Beside,
}

/// Convert one file and write the result, returning the path written.
///
/// The SFNT extension (`ttf` or `otf`) is chosen from the converted data.
/// When the resolved output is the input itself (the file is already in
/// the target format) nothing is written.
pub fn convert_file(
    input: &Path,
    destination: Destination<'_>,
    to: ContainerFormat,
    from: Option<ContainerFormat>,
    options: &ConvertOptions,
) -> Result<PathBuf> {
    let data = FontFile::new(input).read()?;
    let converted = convert_with(&data, to, from, options)
        .with_context(|| format!("Failed to convert {} to {to}", input.display()))?;

    let output = match destination {
        Destination::File(path) => path.to_path_buf(),
        Destination::Dir(dir) => output_path(input, Some(dir), to, &converted),
        Destination::Beside => output_path(input, None, to, &converted),
    };
    if output == input {
        info!("{} is already {to}", input.display());
        return Ok(output);
    }
    FontFile::new(&output).write(&converted)?;
    Ok(output)
}
