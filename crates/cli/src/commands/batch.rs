use std::path::PathBuf;

use anyhow::Result;
use fontverter_core::{ContainerFormat, ConvertOptions};
use log::info;

use crate::{
    commands::{Destination, convert_file},
    io::glob_fonts,
    parallel::{BatchResult, run_parallel},
};

/// Settings for converting a directory of fonts.
#[derive(Debug, Clone)]
pub struct BatchJob {
    pub dir: PathBuf,
    pub pattern: String,
    pub to: ContainerFormat,
    pub out_dir: Option<PathBuf>,
    pub options: ConvertOptions,
}

/// Convert every font matching the job's pattern, in parallel.
pub fn batch_convert(job: &BatchJob) -> Result<BatchResult> {
    let fonts = glob_fonts(&job.dir, &job.pattern)?;
    info!("Converting {} fonts in {} to {}", fonts.len(), job.dir.display(), job.to);

    let destination = match &job.out_dir {
        Some(dir) => Destination::Dir(dir),
        None => Destination::Beside,
    };
    Ok(run_parallel("Convert", &fonts, |path| {
        convert_file(path, destination, job.to, None, &job.options).map(|_| ())
    }))
}
