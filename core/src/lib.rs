//! Decomposition and lossless recomposition of DICOM files
//!
//! A file is split into a JSON metadata document, a pixel payload and a
//! folder of externalized binary values ([`ComponentExtractor`]), rebuilt
//! from those parts ([`Recombiner`]), and checked against its original
//! ([`analysis`]).

pub mod analysis;
pub mod api;
pub mod cli;
pub mod error;
pub mod extraction;
pub mod model;
pub mod recombine;
pub mod report;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use analysis::{compare_dicom_files, ComparisonResult, CompressionAnalysis, TagSizeAnalysis};
pub use api::{extract_folder, process_folder, BatchSummary};
pub use error::{DcmSplitError, Result};
pub use extraction::{ComponentExtractor, ExtractOptions, ExtractionOutput};
pub use model::MetadataDocument;
pub use recombine::{RecombineSummary, Recombiner};
pub use report::{Event, LogReporter, MemoryReporter, Reporter};
pub use types::*;
