use crate::analysis::{compare_dicom_files, ComparisonResult};
use crate::error::Result;
use crate::extraction::{read_preamble, ComponentExtractor, ExtractOptions, ExtractionOutput};
use crate::recombine::{RecombineSummary, Recombiner};
use crate::report::{Event, Reporter};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// A file the batch could not handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Full decompose, rebuild and verify pass over one file
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub source: PathBuf,
    pub extraction: ExtractionOutput,
    pub recombination: RecombineSummary,
    pub comparison: ComparisonResult,
}

/// Outcome of a folder run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<FailedFile>,
    /// One entry per processed file, empty for extraction-only runs
    pub comparisons: Vec<ComparisonResult>,
}

impl BatchSummary {
    /// Number of files seen
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    /// Number of processed files whose recombined copy matched the original
    pub fn identical_count(&self) -> usize {
        self.comparisons.iter().filter(|c| c.is_identical).count()
    }
}

/// Lists the DICOM files directly inside `directory`, sorted by path
///
/// Accepts `.dcm` and `.dicom` extensions in any case, and extension-less
/// files carrying the `DICM` magic.
///
/// # Errors
///
/// Returns an error if the directory cannot be read.
pub fn collect_dicom_files(directory: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_file() {
            if let Some(ext) = path.extension() {
                if ext.eq_ignore_ascii_case("dcm") || ext.eq_ignore_ascii_case("dicom") {
                    files.push(path);
                }
            } else if is_dicom_file(&path) {
                info!("Found headerless DICOM file: {}", path.display());
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Checks for the `DICM` magic after a 128-byte preamble
pub fn is_dicom_file(path: &Path) -> bool {
    matches!(read_preamble(path), Ok(Some(_)))
}

/// Base name used for the outputs of a source file
fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "dicom".to_string())
}

/// Extracts, rebuilds and compares one file
///
/// The rebuilt file is written as `<base>_recombined.dcm` next to the
/// extracted components.
///
/// # Errors
///
/// Returns an error if extraction or recombination fails. Comparison
/// failures are carried in [`ProcessedFile::comparison`].
pub fn process_file(
    path: &Path,
    output_dir: &Path,
    options: ExtractOptions,
    reporter: &dyn Reporter,
) -> Result<ProcessedFile> {
    let extraction = ComponentExtractor::new(options, reporter).extract_file(path, output_dir)?;

    let rebuilt = output_dir.join(format!("{}_recombined.dcm", base_name(path)));
    let recombination = Recombiner::new(reporter).recombine(
        &extraction.metadata_path,
        extraction.pixel_path.as_deref(),
        &rebuilt,
    )?;

    let comparison = compare_dicom_files(path, &rebuilt);
    Ok(ProcessedFile {
        source: path.to_path_buf(),
        extraction,
        recombination,
        comparison,
    })
}

/// Runs `step` over every DICOM file of `input_dir`
///
/// A failing file is reported and the loop moves on.
fn run_batch<T>(
    input_dir: &Path,
    output_dir: &Path,
    reporter: &dyn Reporter,
    mut step: impl FnMut(&Path) -> Result<T>,
    mut on_success: impl FnMut(&mut BatchSummary, T),
) -> Result<BatchSummary> {
    fs::create_dir_all(output_dir)?;
    let files = collect_dicom_files(input_dir)?;
    info!("Found {} DICOM files in {}", files.len(), input_dir.display());

    let mut summary = BatchSummary::default();
    for path in files {
        match step(&path) {
            Ok(value) => {
                reporter.report(Event::FileProcessed { path: path.clone() });
                summary.succeeded.push(path);
                on_success(&mut summary, value);
            }
            Err(e) => {
                let reason = e.to_string();
                reporter.report(Event::FileFailed {
                    path: path.clone(),
                    reason: reason.clone(),
                });
                summary.failed.push(FailedFile { path, reason });
            }
        }
    }

    info!(
        "Batch done: {} succeeded, {} failed",
        summary.succeeded.len(),
        summary.failed.len()
    );
    Ok(summary)
}

/// Decomposes every DICOM file of `input_dir` into `output_dir`
///
/// # Errors
///
/// Returns an error only if a directory cannot be read or created.
/// Per-file failures are collected in [`BatchSummary::failed`].
pub fn extract_folder(
    input_dir: &Path,
    output_dir: &Path,
    options: ExtractOptions,
    reporter: &dyn Reporter,
) -> Result<BatchSummary> {
    let extractor = ComponentExtractor::new(options, reporter);
    run_batch(
        input_dir,
        output_dir,
        reporter,
        |path| extractor.extract_file(path, output_dir),
        |_, _| {},
    )
}

/// Decomposes, rebuilds and verifies every DICOM file of `input_dir`
///
/// # Errors
///
/// Returns an error only if a directory cannot be read or created.
pub fn process_folder(
    input_dir: &Path,
    output_dir: &Path,
    options: ExtractOptions,
    reporter: &dyn Reporter,
) -> Result<BatchSummary> {
    run_batch(
        input_dir,
        output_dir,
        reporter,
        |path| process_file(path, output_dir, options, reporter),
        |summary, processed| summary.comparisons.push(processed.comparison),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::open_dicom;
    use crate::report::MemoryReporter;
    use crate::testing::{fixture_dataset, write_dataset, write_fixture, FixtureOptions};
    use crate::types::transfer_syntax::{
        EXPLICIT_VR_BIG_ENDIAN, EXPLICIT_VR_LITTLE_ENDIAN, IMPLICIT_VR_LITTLE_ENDIAN,
    };
    use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
    use rstest::rstest;
    use tempfile::TempDir;

    fn strs(values: &[&str]) -> PrimitiveValue {
        PrimitiveValue::Strs(values.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_collect_dicom_files() {
        let dir = TempDir::new().unwrap();
        write_fixture(dir.path(), "b.DCM", &FixtureOptions::default());
        write_fixture(dir.path(), "a.dicom", &FixtureOptions::default());
        write_fixture(dir.path(), "headerless", &FixtureOptions::default());
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();
        fs::write(dir.path().join("README"), "no magic here").unwrap();
        fs::create_dir(dir.path().join("nested.dcm")).unwrap();

        let files = collect_dicom_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.dicom", "b.DCM", "headerless"]);
    }

    #[test]
    fn test_is_dicom_file() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(dir.path(), "x", &FixtureOptions::default());
        assert!(is_dicom_file(&path));
        assert!(!is_dicom_file(&dir.path().join("missing")));
    }

    #[test]
    fn test_batch_fault_isolation() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_fixture(input.path(), "one.dcm", &FixtureOptions::default());
        write_fixture(input.path(), "two.dcm", &FixtureOptions::default());
        fs::write(input.path().join("broken.dcm"), b"definitely not DICOM").unwrap();

        let reporter = MemoryReporter::new();
        let summary = extract_folder(
            input.path(),
            output.path(),
            ExtractOptions::default(),
            &reporter,
        )
        .unwrap();

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.succeeded.len(), 2);
        assert_eq!(summary.failed.len(), 1);
        assert!(summary.failed[0].path.ends_with("broken.dcm"));
        assert!(output.path().join("one_metadata.json").is_file());
        assert!(output.path().join("two_metadata.json").is_file());

        let failures = reporter
            .events()
            .iter()
            .filter(|e| matches!(e, Event::FileFailed { .. }))
            .count();
        assert_eq!(failures, 1);
    }

    #[test]
    fn test_process_folder() {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        write_fixture(input.path(), "scan.dcm", &FixtureOptions::default());
        fs::write(input.path().join("broken.dcm"), [0u8; 200]).unwrap();

        let reporter = MemoryReporter::new();
        let summary = process_folder(
            input.path(),
            output.path(),
            ExtractOptions::default(),
            &reporter,
        )
        .unwrap();

        assert_eq!(summary.succeeded.len(), 1);
        assert_eq!(summary.failed.len(), 1);
        assert_eq!(summary.comparisons.len(), 1);
        assert_eq!(summary.identical_count(), 1);
        assert!(output.path().join("scan_recombined.dcm").is_file());
    }

    #[test]
    fn test_missing_input_dir() {
        let output = TempDir::new().unwrap();
        let reporter = MemoryReporter::new();
        let result = extract_folder(
            &output.path().join("absent"),
            output.path(),
            ExtractOptions::default(),
            &reporter,
        );
        assert!(result.is_err());
    }

    #[rstest]
    #[case(EXPLICIT_VR_LITTLE_ENDIAN)]
    #[case(IMPLICIT_VR_LITTLE_ENDIAN)]
    #[case(EXPLICIT_VR_BIG_ENDIAN)]
    fn test_round_trip_keeps_blank_numeric_components(#[case] transfer_syntax: &str) {
        let input = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let mut dataset = fixture_dataset(&FixtureOptions::default());
        // WindowCenter `40\`, WindowWidth `\400`, ImagesInAcquisition `\2`
        dataset.put(DataElement::new(Tag(0x0028, 0x1050), VR::DS, strs(&["40", ""])));
        dataset.put(DataElement::new(Tag(0x0028, 0x1051), VR::DS, strs(&["", "400"])));
        dataset.put(DataElement::new(Tag(0x0020, 0x1002), VR::IS, strs(&["", "2"])));
        let source = write_dataset(input.path(), "scan.dcm", transfer_syntax, 0, dataset);

        let reporter = MemoryReporter::new();
        let processed = process_file(&source, output.path(), ExtractOptions::default(), &reporter)
            .unwrap();

        let comparison = &processed.comparison;
        assert!(comparison.error.is_none(), "{:?}", comparison.error);
        assert!(comparison.is_identical, "{:?}", comparison.data_differences);
        assert!(comparison.pixel_data_identical);

        let rebuilt = open_dicom(&output.path().join("scan_recombined.dcm")).unwrap();
        let center = rebuilt.element(Tag(0x0028, 0x1050)).unwrap().to_str().unwrap();
        assert_eq!(center.trim_end(), "40\\");
        assert!(!center.contains("NaN"));
    }
}
