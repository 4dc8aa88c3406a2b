use std::path::Path;

use anyhow::{Result, bail};
use fontverter_core::{ContainerFormat, detect_format};

use crate::io::FontFile;

/// Read a file and identify its container.
pub fn detect_path(path: &Path) -> Result<ContainerFormat> {
    let data = FontFile::new(path).read()?;
    Ok(detect_format(&data)?)
}

/// Print `path: format` for each file; unrecognized files are reported on stderr.
pub fn detect_files(files: &[impl AsRef<Path>]) -> Result<()> {
    let mut failed = 0;
    for path in files.iter().map(AsRef::as_ref) {
        match detect_path(path) {
            Ok(format) => println!("{}: {format}", path.display()),
            Err(e) => {
                eprintln!("{}: {e:#}", path.display());
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("Could not detect the format of {failed} files");
    }
    Ok(())
}
