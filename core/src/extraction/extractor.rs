use crate::error::Result;
use crate::model::value::{binary_bytes, classify, element_record};
use crate::model::{
    compression_ratio, BinaryFileRecord, CompressionInfo, EncodingInfo, MetaRecord,
    MetadataDocument, BINARY_PLACEHOLDER,
};
use crate::report::{Event, Reporter};
use crate::types::transfer_syntax::{
    is_compressed, is_implicit_vr, is_little_endian, transfer_syntax_name,
};
use crate::types::{ExtractionMode, PixelFormat, ValueClass};
use dicom_core::header::Header;
use dicom_object::{DefaultDicomObject, InMemDicomObject};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use super::file_meta::{meta_elements, MetaValue};
use super::pixel::{payload_path, write_payload, PixelArchive};
use super::{file_transfer_syntax, image_info, open_dicom, relative_to};
use super::sequences::{capture_sequences, IconTarget};
use super::tags::{is_essential, is_private, tag_file_stem, tag_key, PIXEL_DATA};

/// Length of the file preamble
pub const PREAMBLE_LEN: usize = 128;

/// How a file is decomposed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractOptions {
    pub mode: ExtractionMode,
    pub pixel_format: PixelFormat,
}

impl ExtractOptions {
    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_pixel_format(mut self, pixel_format: PixelFormat) -> Self {
        self.pixel_format = pixel_format;
        self
    }
}

/// Files produced for one source file
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub metadata_path: PathBuf,
    /// `None` when the data set has no Pixel Data
    pub pixel_path: Option<PathBuf>,
    pub binary_dir: Option<PathBuf>,
    pub document: MetadataDocument,
}

/// Splits DICOM files into a metadata document and binary payloads
///
/// # Example
///
/// ```no_run
/// use dcmsplit_core::{ComponentExtractor, ExtractOptions, ExtractionMode, LogReporter};
/// use std::path::Path;
///
/// let reporter = LogReporter;
/// let extractor = ComponentExtractor::new(
///     ExtractOptions::default().with_mode(ExtractionMode::Standard),
///     &reporter,
/// );
/// let output = extractor
///     .extract_file(Path::new("scan.dcm"), Path::new("out"))
///     .unwrap();
/// println!("{}", output.metadata_path.display());
/// ```
pub struct ComponentExtractor<'a> {
    options: ExtractOptions,
    reporter: &'a dyn Reporter,
}

impl<'a> ComponentExtractor<'a> {
    pub fn new(options: ExtractOptions, reporter: &'a dyn Reporter) -> Self {
        Self { options, reporter }
    }

    pub fn options(&self) -> ExtractOptions {
        self.options
    }

    /// Decomposes one file into `out_dir`
    ///
    /// Output files are named after the source file stem.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed as DICOM or an output
    /// file cannot be written.
    pub fn extract_file(&self, path: &Path, out_dir: &Path) -> Result<ExtractionOutput> {
        fs::create_dir_all(out_dir)?;

        let obj = open_dicom(path)?;
        let preamble = read_preamble(path)?;
        let original_file_size = fs::metadata(path)?.len();
        let base = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dicom".to_string());

        let output = self.extract_dataset(
            &obj,
            preamble.as_ref(),
            original_file_size,
            &base,
            out_dir,
        )?;
        if output.pixel_path.is_none() {
            self.reporter.report(Event::MissingPixelData {
                path: path.to_path_buf(),
            });
        }
        Ok(output)
    }

    /// Decomposes an already parsed file
    ///
    /// # Arguments
    ///
    /// * `obj` - Parsed file with its meta group
    /// * `preamble` - The 128 preamble bytes, when the source had one
    /// * `original_file_size` - Size of the source file in bytes
    /// * `base` - Stem used to name every output file
    /// * `out_dir` - Destination directory, must exist
    pub fn extract_dataset(
        &self,
        obj: &DefaultDicomObject,
        preamble: Option<&[u8; PREAMBLE_LEN]>,
        original_file_size: u64,
        base: &str,
        out_dir: &Path,
    ) -> Result<ExtractionOutput> {
        let mode = self.options.mode;
        let dataset: &InMemDicomObject = obj;
        let mut document = MetadataDocument::default();

        // 1. Transfer syntax and image geometry
        let ts_uid = file_transfer_syntax(obj);
        let compressed = is_compressed(&ts_uid);
        let image_info = image_info(dataset);

        // 2. Output locations
        let binary_dir = if mode.writes_binary() {
            let dir = out_dir.join(format!("{}_binary", base));
            fs::create_dir_all(&dir)?;
            Some(dir)
        } else {
            None
        };

        let preamble_file = match preamble {
            Some(bytes) if mode == ExtractionMode::Full && bytes.iter().any(|b| *b != 0) => {
                let name = format!("{}_preamble.bin", base);
                fs::write(out_dir.join(&name), bytes)?;
                Some(name)
            }
            _ => None,
        };

        // 3. Pixel payload
        let mut pixel_path = None;
        let mut pixel_data_size = 0_u64;
        let mut theoretical_size = 0_u64;
        if let Ok(pixel) = dataset.element(PIXEL_DATA) {
            let bytes = binary_bytes(pixel.value());
            pixel_data_size = bytes.len() as u64;
            theoretical_size = image_info.theoretical_uncompressed_size();

            let path = payload_path(out_dir, base, self.options.pixel_format);
            let archive = PixelArchive::new(bytes, &image_info, &ts_uid, compressed);
            write_payload(&path, &archive, self.options.pixel_format)?;
            pixel_path = Some(path);
        }
        let ratio = compression_ratio(compressed, theoretical_size, pixel_data_size);

        // 4. Sequences, with icon binaries in standard and full modes
        let icon = binary_dir.as_deref().map(|dir| IconTarget {
            binary_dir: dir,
            out_dir,
        });
        let captured = capture_sequences(dataset, icon)?;
        document.sequence_data = captured.sequence_data;
        document.icon_data = captured.icon_data;

        // 5. File meta group
        for element in meta_elements(obj.meta()) {
            let key = tag_key(element.tag);
            let value = element
                .value
                .as_text()
                .unwrap_or_else(|| BINARY_PLACEHOLDER.to_string());
            document.file_meta_info.insert(
                element.keyword(),
                MetaRecord {
                    tag: [element.tag.group(), element.tag.element()],
                    vr: element.vr.to_string().to_owned(),
                    value,
                },
            );

            if let (MetaValue::Bytes(bytes), Some(dir), ExtractionMode::Full) =
                (&element.value, &binary_dir, mode)
            {
                let path = dir.join(format!("meta_{}.bin", tag_file_stem(element.tag)));
                fs::write(&path, bytes)?;
                document.raw_meta_info.insert(
                    key,
                    BinaryFileRecord {
                        binary_file: relative_to(out_dir, &path),
                        length: bytes.len(),
                        vr: None,
                    },
                );
            }
        }

        // 6. Top-level data elements
        for elem in dataset {
            let tag = elem.tag();
            if tag == PIXEL_DATA {
                continue;
            }
            let private = is_private(tag);
            let class = classify(elem);

            if mode == ExtractionMode::Minimal && private {
                continue;
            }
            if mode == ExtractionMode::Standard && class == ValueClass::Binary && !is_essential(tag)
            {
                continue;
            }

            if class == ValueClass::Binary {
                if let Some(dir) = &binary_dir {
                    let bytes = binary_bytes(elem.value());
                    let path = dir.join(format!("{}.bin", tag_file_stem(tag)));
                    fs::write(&path, &bytes)?;
                    document.binary_data_info.insert(
                        tag_key(tag),
                        BinaryFileRecord {
                            binary_file: relative_to(out_dir, &path),
                            length: bytes.len(),
                            vr: Some(elem.vr().to_string().to_owned()),
                        },
                    );
                }
            }

            let record = element_record(elem, class);
            if private && mode == ExtractionMode::Full {
                document.private_tags.insert(tag_key(tag), record.clone());
            }
            document.data_elements.insert(tag_key(tag), record);
        }

        // 7. Encoding and compression summary
        document.encoding_info = EncodingInfo {
            is_little_endian: is_little_endian(&ts_uid),
            is_implicit_vr: is_implicit_vr(&ts_uid),
            has_preamble: preamble.is_some(),
            preamble_file,
        };
        document.compression_info = CompressionInfo {
            transfer_syntax_name: transfer_syntax_name(&ts_uid),
            transfer_syntax_uid: ts_uid,
            is_compressed: compressed,
            original_file_size,
            compressed_pixel_data_size: pixel_data_size,
            theoretical_uncompressed_size: theoretical_size,
            compression_ratio: ratio,
            extraction_mode: mode,
            pixel_format: self.options.pixel_format,
        };
        document.image_info = image_info;

        self.reporter.report(Event::CompressionStats {
            transfer_syntax: document.compression_info.transfer_syntax_name.clone(),
            is_compressed: compressed,
            pixel_data_size,
            theoretical_size,
            ratio,
        });

        // 8. Metadata document
        let metadata_path = out_dir.join(format!("{}_metadata.json", base));
        document.write_to_file(&metadata_path)?;

        Ok(ExtractionOutput {
            metadata_path,
            pixel_path,
            binary_dir,
            document,
        })
    }
}

/// Reads the preamble of a file when it carries the `DICM` magic
///
/// Returns `None` for files without preamble or shorter than 132 bytes.
pub fn read_preamble(path: &Path) -> Result<Option<[u8; PREAMBLE_LEN]>> {
    let mut file = File::open(path)?;
    let mut buffer = [0u8; PREAMBLE_LEN + 4];
    let mut filled = 0;
    while filled < buffer.len() {
        match file.read(&mut buffer[filled..])? {
            0 => return Ok(None),
            n => filled += n,
        }
    }

    if &buffer[PREAMBLE_LEN..] != b"DICM" {
        return Ok(None);
    }
    let mut preamble = [0u8; PREAMBLE_LEN];
    preamble.copy_from_slice(&buffer[..PREAMBLE_LEN]);
    Ok(Some(preamble))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::MemoryReporter;
    use crate::testing::{
        write_fixture, FixtureOptions, PRIVATE_BLOB_TAG, SLICE_THICKNESS_TAG,
    };
    use rstest::rstest;
    use serde_json::json;
    use tempfile::TempDir;

    fn extract(
        options: ExtractOptions,
        fixture: FixtureOptions,
    ) -> (TempDir, ExtractionOutput, MemoryReporter) {
        let dir = TempDir::new().unwrap();
        let source = write_fixture(dir.path(), "scan.dcm", &fixture);
        let reporter = MemoryReporter::new();
        let output = ComponentExtractor::new(options, &reporter)
            .extract_file(&source, &dir.path().join("out"))
            .unwrap();
        (dir, output, reporter)
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.mode, ExtractionMode::Full);
        assert_eq!(options.pixel_format, PixelFormat::Raw);
        let options = options
            .with_mode(ExtractionMode::Minimal)
            .with_pixel_format(PixelFormat::Pickle);
        assert_eq!(options.mode, ExtractionMode::Minimal);
        assert_eq!(options.pixel_format, PixelFormat::Pickle);
    }

    #[test]
    fn test_uncompressed_scenario() {
        let (_dir, output, reporter) =
            extract(ExtractOptions::default(), FixtureOptions::default());
        let info = &output.document.compression_info;

        assert!(!info.is_compressed);
        assert_eq!(info.compressed_pixel_data_size, 524_288);
        assert_eq!(info.theoretical_uncompressed_size, 524_288);
        assert_eq!(info.compression_ratio, 1.0);
        assert_eq!(output.document.image_info.rows, 512);

        let pixel_path = output.pixel_path.unwrap();
        assert!(pixel_path.ends_with("scan_pixels.raw"));
        assert_eq!(fs::metadata(&pixel_path).unwrap().len(), 524_288);
        assert!(output.metadata_path.ends_with("scan_metadata.json"));
        assert!(reporter
            .events()
            .iter()
            .any(|e| matches!(e, Event::CompressionStats { .. })));
    }

    #[test]
    fn test_numeric_literal_recorded() {
        let (_dir, output, _) = extract(ExtractOptions::default(), FixtureOptions::default());
        let record = &output.document.data_elements[&tag_key(SLICE_THICKNESS_TAG)];
        assert_eq!(record.value, json!(70));
        assert_eq!(record.original_format, Some(json!("70")));
        assert!(!output.document.data_elements.contains_key("(7FE0,0010)"));
    }

    #[test]
    fn test_full_mode_outputs() {
        let fixture = FixtureOptions {
            preamble_byte: 0xAB,
            ..FixtureOptions::default()
        };
        let (dir, output, _) = extract(ExtractOptions::default(), fixture);
        let doc = &output.document;
        let key = tag_key(PRIVATE_BLOB_TAG);

        assert!(doc.private_tags.contains_key(&key));
        let binary = &doc.binary_data_info[&key];
        assert_eq!(binary.binary_file, "scan_binary/0029_1010.bin");
        assert_eq!(
            fs::read(dir.path().join("out").join(&binary.binary_file)).unwrap(),
            crate::testing::PRIVATE_BLOB.to_vec()
        );

        assert!(doc.raw_meta_info.contains_key("(0002,0001)"));
        assert_eq!(doc.file_meta_info["FileMetaInformationVersion"].value, BINARY_PLACEHOLDER);
        assert_eq!(doc.encoding_info.preamble_file.as_deref(), Some("scan_preamble.bin"));
        assert!(doc.encoding_info.has_preamble);
        assert!(!doc.icon_data.is_empty());
    }

    #[test]
    fn test_zero_preamble_not_written() {
        let (_dir, output, _) = extract(ExtractOptions::default(), FixtureOptions::default());
        assert!(output.document.encoding_info.has_preamble);
        assert_eq!(output.document.encoding_info.preamble_file, None);
    }

    #[rstest]
    #[case(ExtractionMode::Minimal, false, false, false)]
    #[case(ExtractionMode::Standard, true, false, true)]
    #[case(ExtractionMode::Full, true, true, true)]
    fn test_mode_scope(
        #[case] mode: ExtractionMode,
        #[case] has_binary_dir: bool,
        #[case] has_private_blob: bool,
        #[case] has_icon: bool,
    ) {
        let (_dir, output, _) = extract(
            ExtractOptions::default().with_mode(mode),
            FixtureOptions::default(),
        );
        let doc = &output.document;
        let key = tag_key(PRIVATE_BLOB_TAG);

        assert_eq!(output.binary_dir.is_some(), has_binary_dir);
        assert_eq!(doc.data_elements.contains_key(&key), has_private_blob);
        assert_eq!(doc.binary_data_info.contains_key(&key), has_private_blob);
        assert_eq!(!doc.icon_data.is_empty(), has_icon);
        assert_eq!(!doc.private_tags.is_empty(), mode == ExtractionMode::Full);
        assert_eq!(doc.compression_info.extraction_mode, mode);
        // sequences are captured in every mode
        assert!(doc.sequence_data.contains_key("(0088,0200)"));
    }

    #[test]
    fn test_compressed_payload() {
        let fixture = FixtureOptions {
            compressed: true,
            ..FixtureOptions::default()
        };
        let (_dir, output, _) = extract(
            ExtractOptions::default().with_pixel_format(PixelFormat::Pickle),
            fixture,
        );
        let info = &output.document.compression_info;

        assert!(info.is_compressed);
        assert_eq!(info.transfer_syntax_name, "JPEG Baseline (Process 1)");
        assert!(info.compressed_pixel_data_size > 0);
        let expected = info.theoretical_uncompressed_size as f64 / info.compressed_pixel_data_size as f64;
        assert!((info.compression_ratio - expected).abs() < 1e-9);
        assert!(output.pixel_path.unwrap().ends_with("scan_pixels.p"));
    }

    #[test]
    fn test_missing_pixel_data_warns() {
        let fixture = FixtureOptions {
            with_pixel_data: false,
            ..FixtureOptions::default()
        };
        let (_dir, output, reporter) = extract(ExtractOptions::default(), fixture);
        assert!(output.pixel_path.is_none());
        assert_eq!(output.document.compression_info.compressed_pixel_data_size, 0);
        assert_eq!(output.document.compression_info.compression_ratio, 1.0);
        assert!(reporter
            .events()
            .iter()
            .any(|e| matches!(e, Event::MissingPixelData { .. })));
    }

    #[test]
    fn test_unreadable_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.dcm");
        fs::write(&path, b"not a dicom file").unwrap();
        let reporter = MemoryReporter::new();
        let result = ComponentExtractor::new(ExtractOptions::default(), &reporter)
            .extract_file(&path, dir.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_read_preamble() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("p.dcm");
        let mut bytes = vec![7u8; PREAMBLE_LEN];
        bytes.extend_from_slice(b"DICM");
        fs::write(&path, &bytes).unwrap();
        assert_eq!(read_preamble(&path).unwrap(), Some([7u8; PREAMBLE_LEN]));

        fs::write(&path, b"short").unwrap();
        assert_eq!(read_preamble(&path).unwrap(), None);
    }
}
