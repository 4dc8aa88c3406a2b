//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, value_parser};
use fontverter_core::{
    ContainerFormat, ConvertOptions,
    config::{DEFAULT_BROTLI_QUALITY, DEFAULT_ZLIB_LEVEL},
};

use crate::commands::{BatchJob, Destination, batch_convert, convert_file, detect_files, inspect_file};

#[derive(Parser)]
#[command(name = "fontverter")]
#[command(about = "Convert fonts between SFNT (TrueType/OpenType), WOFF and WOFF2")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Codec settings shared by the converting commands.
#[derive(Debug, Clone, clap::Args)]
pub struct CodecArgs {
    /// zlib level for WOFF tables
    #[arg(long, default_value_t = DEFAULT_ZLIB_LEVEL, value_parser = value_parser!(u32).range(0..=9))]
    pub zlib_level: u32,
    /// Brotli quality for WOFF2
    #[arg(long, default_value_t = DEFAULT_BROTLI_QUALITY, value_parser = value_parser!(u32).range(0..=11))]
    pub brotli_quality: u32,
    /// Store glyf, loca and hmtx untransformed in WOFF2
    #[arg(long)]
    pub no_transform: bool,
    /// Compress WOFF tables on the current thread
    #[arg(long)]
    pub sequential: bool,
}

impl CodecArgs {
    pub fn options(&self) -> ConvertOptions {
        ConvertOptions::default()
            .with_zlib_level(self.zlib_level)
            .with_brotli_quality(self.brotli_quality)
            .with_transforms(!self.no_transform)
            .with_parallel(!self.sequential)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a font to another container format
    Convert {
        input: PathBuf,
        /// Target format: sfnt (or truetype), woff, woff2
        #[arg(long)]
        to: ContainerFormat,
        /// Source format; detected from the file when omitted
        #[arg(long)]
        from: Option<ContainerFormat>,
        /// Output path; defaults to the input with the target's extension
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        codec: CodecArgs,
    },
    /// Print the container format of each file
    Detect {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the tables of a font in any supported container
    Inspect { file: PathBuf },
    /// Convert every font in a directory
    Batch {
        dir: PathBuf,
        #[arg(long)]
        to: ContainerFormat,
        /// Glob pattern relative to the directory
        #[arg(long, default_value = "*")]
        pattern: String,
        /// Directory for the converted fonts; defaults to the input directory
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[command(flatten)]
        codec: CodecArgs,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Convert { input, to, from, output, codec } => {
                let destination = output.as_deref().map_or(Destination::Beside, Destination::File);
                let output = convert_file(&input, destination, to, from, &codec.options())?;
                println!("Converted {} -> {}", input.display(), output.display());
            }
            Commands::Detect { files } => detect_files(&files)?,
            Commands::Inspect { file } => inspect_file(&file)?,
            Commands::Batch { dir, to, pattern, out_dir, codec } => {
                let job = BatchJob { dir, pattern, to, out_dir, options: codec.options() };
                batch_convert(&job)?.ok_or_bail("Batch conversion")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_convert() {
        let cli = Cli::try_parse_from([
            "fontverter",
            "convert",
            "in.ttf",
            "--to",
            "woff2",
            "--from",
            "truetype",
            "-o",
            "out.woff2",
            "--no-transform",
        ])
        .unwrap();
        let Commands::Convert { input, to, from, output, codec } = cli.command else {
            panic!("expected convert");
        };
        assert_eq!(input, PathBuf::from("in.ttf"));
        assert_eq!(to, ContainerFormat::Woff2);
        assert_eq!(from, Some(ContainerFormat::Sfnt));
        assert_eq!(output, Some(PathBuf::from("out.woff2")));
        let options = codec.options();
        assert!(!options.transform_glyf && !options.transform_hmtx);
        assert_eq!(options.zlib_level, DEFAULT_ZLIB_LEVEL);
        assert!(options.parallel);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["fontverter", "convert", "in.ttf", "--to", "footype"]).is_err());
        assert!(Cli::try_parse_from(["fontverter", "convert", "in.ttf", "--to", "WOFF"]).is_err());
    }

    #[test]
    fn test_codec_ranges() {
        let parse = |level: &str| {
            Cli::try_parse_from(["fontverter", "batch", "fonts", "--to", "woff", "--zlib-level", level])
        };
        assert!(parse("0").is_ok());
        assert!(parse("10").is_err());

        let cli = Cli::try_parse_from(["fontverter", "batch", "fonts", "--to", "woff", "--sequential"]).unwrap();
        let Commands::Batch { pattern, out_dir, codec, .. } = cli.command else {
            panic!("expected batch");
        };
        assert_eq!(pattern, "*");
        assert_eq!(out_dir, None);
        assert!(!codec.options().parallel);
    }
}
