//! Fidelity Analyzer
//!
//! Read-only inspection of DICOM files: how well the pixel data is
//! compressed, where the bytes of a file go, and whether a recombined file
//! matches its original.

pub mod compare;
pub mod compression;
pub mod sizes;

pub use compare::{compare_dicom_files, ComparisonResult, ValueDifference};
pub use compression::{analyze_compression, CompressionAnalysis};
pub use sizes::{analyze_tag_sizes, TagSize, TagSizeAnalysis};
