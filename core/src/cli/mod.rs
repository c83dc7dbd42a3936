pub mod report;

use crate::extraction::ExtractOptions;
use crate::types::{ExtractionMode, PixelFormat};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line arguments for dcmsplit
#[derive(Parser, Debug)]
#[command(name = "dcmsplit")]
#[command(about = "Split DICOM files into metadata and binary components, and rebuild them")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decompose every DICOM file of a folder
    Extract(FolderArgs),
    /// Rebuild one DICOM file from its components
    Recombine {
        /// Metadata document (`<base>_metadata.json`)
        #[arg(short, long, value_name = "FILE")]
        metadata: PathBuf,

        /// Pixel payload (`<base>_pixels.raw` or `.p`)
        #[arg(short, long, value_name = "FILE")]
        pixels: Option<PathBuf>,

        /// DICOM file to write
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Report compression and tag sizes, and compare with a rebuilt copy
    Analyze {
        /// DICOM file to analyze
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Recombined file to compare against
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Decompose, rebuild and verify every DICOM file of a folder
    Process(FolderArgs),
}

/// Arguments shared by the folder commands
#[derive(Args, Debug)]
pub struct FolderArgs {
    /// Folder containing DICOM files
    #[arg(short, long, value_name = "DIRECTORY")]
    pub input: PathBuf,

    /// Folder receiving the components
    #[arg(short, long, value_name = "DIRECTORY")]
    pub output: PathBuf,

    /// How much of each file is externalized
    #[arg(short, long, default_value = "full")]
    pub mode: ModeArg,

    /// Pixel payload format
    #[arg(short, long, default_value = "raw")]
    pub pixel_format: PixelFormatArg,
}

impl FolderArgs {
    pub fn options(&self) -> ExtractOptions {
        ExtractOptions::default()
            .with_mode(self.mode.clone().into())
            .with_pixel_format(self.pixel_format.clone().into())
    }
}

/// Extraction mode options
#[derive(Debug, Clone, ValueEnum)]
pub enum ModeArg {
    /// Metadata and pixel data only
    Minimal,
    /// Also essential binary tags and the icon
    Standard,
    /// Everything, private tags and preamble included
    Full,
}

impl From<ModeArg> for ExtractionMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Minimal => ExtractionMode::Minimal,
            ModeArg::Standard => ExtractionMode::Standard,
            ModeArg::Full => ExtractionMode::Full,
        }
    }
}

/// Pixel payload format options
#[derive(Debug, Clone, ValueEnum)]
pub enum PixelFormatArg {
    /// Flat bytes
    Raw,
    /// Serialized archive with geometry
    Pickle,
}

impl From<PixelFormatArg> for PixelFormat {
    fn from(arg: PixelFormatArg) -> Self {
        match arg {
            PixelFormatArg::Raw => PixelFormat::Raw,
            PixelFormatArg::Pickle => PixelFormat::Pickle,
        }
    }
}
