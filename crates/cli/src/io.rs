//! Shared font I/O utilities.

use std::{
    fs::{create_dir_all, read, write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use fontverter_core::ContainerFormat;
use glob::glob;

/// Extensions the batch command picks up.
pub const FONT_EXTENSIONS: [&str; 4] = ["ttf", "otf", "woff", "woff2"];

/// A font file handle for I/O operations.
#[derive(Debug, Clone)]
pub struct FontFile {
    path: PathBuf,
}

impl FontFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read font data from the file.
    pub fn read(&self) -> Result<Vec<u8>> {
        read(&self.path).with_context(|| format!("Failed to read font: {}", self.path.display()))
    }

    /// Write font data to the file, creating its directory if needed.
    pub fn write(&self, data: impl AsRef<[u8]>) -> Result<()> {
        self.ensure_parent_dir()?;
        write(&self.path, data).with_context(|| format!("Failed to write font: {}", self.path.display()))
    }

    /// Create parent directory if it doesn't exist.
    pub fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        Ok(())
    }
}

impl AsRef<Path> for FontFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// File extension for converted data: `otf` for CFF-flavored SFNT, `ttf`
/// for other SFNT, otherwise the format name.
pub fn extension_for(format: ContainerFormat, data: &[u8]) -> &'static str {
    match format {
        ContainerFormat::Sfnt if data.starts_with(b"OTTO") => "otf",
        ContainerFormat::Sfnt => "ttf",
        ContainerFormat::Woff => "woff",
        ContainerFormat::Woff2 => "woff2",
    }
}

/// Output path for `input` converted to `format`, placed in `out_dir` when given.
pub fn output_path(input: &Path, out_dir: Option<&Path>, format: ContainerFormat, data: &[u8]) -> PathBuf {
    let path = match (out_dir, input.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => input.to_path_buf(),
    };
    path.with_extension(extension_for(format, data))
}

/// Whether the path has one of [`FONT_EXTENSIONS`], ignoring case.
pub fn is_font_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| FONT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Find fonts matching a glob pattern in a directory.
pub fn glob_fonts(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(pattern);
    let pattern_str = pattern.to_str().context("Invalid pattern path")?;
    Ok(glob(pattern_str)
        .with_context(|| format!("Failed to glob pattern: {pattern_str}"))?
        .filter_map(Result::ok)
        .filter(|path| path.is_file() && is_font_path(path))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for(ContainerFormat::Sfnt, b"OTTO\0\x01"), "otf");
        assert_eq!(extension_for(ContainerFormat::Sfnt, &[0, 1, 0, 0]), "ttf");
        assert_eq!(extension_for(ContainerFormat::Sfnt, b"true"), "ttf");
        assert_eq!(extension_for(ContainerFormat::Woff, b"wOFF"), "woff");
        assert_eq!(extension_for(ContainerFormat::Woff2, b"wOF2"), "woff2");
    }

    #[test]
    fn test_output_path() {
        let input = Path::new("fonts/Sample-Regular.ttf");
        assert_eq!(
            output_path(input, None, ContainerFormat::Woff2, b"wOF2"),
            PathBuf::from("fonts/Sample-Regular.woff2")
        );
        assert_eq!(
            output_path(input, Some(Path::new("dist")), ContainerFormat::Woff, b"wOFF"),
            PathBuf::from("dist/Sample-Regular.woff")
        );
        assert_eq!(
            output_path(Path::new("a.woff2"), None, ContainerFormat::Sfnt, b"OTTO"),
            PathBuf::from("a.otf")
        );
    }

    #[test]
    fn test_is_font_path() {
        assert!(is_font_path(Path::new("a.TTF")));
        assert!(is_font_path(Path::new("dir/a.woff2")));
        assert!(!is_font_path(Path::new("README.md")));
        assert!(!is_font_path(Path::new("woff2")));
    }
}
