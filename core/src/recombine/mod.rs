//! Component Recombiner
//!
//! Rebuilds a DICOM file from a metadata document, its companion binary
//! files and the pixel payload.

pub mod elements;
pub mod meta;
pub mod pixel;
pub mod sequences;
pub mod writer;

use crate::error::{DcmSplitError, Result};
use crate::extraction::pixel::read_payload;
use crate::extraction::tags::tag_key;
use crate::model::{ElementRecord, MetadataDocument};
use crate::report::{Event, Reporter};
use dicom_core::Tag;
use dicom_object::mem::InMemElement;
use dicom_object::InMemDicomObject;
use std::fs;
use std::path::{Path, PathBuf};

pub use meta::{build_file_meta, generate_uid};
pub use sequences::ItemRebuilder;
pub use writer::write_dicom_file;

use elements::{record_tag, record_vr, restore_binary_element, restore_value_element};
use pixel::pixel_element;

/// Outcome of one recombination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecombineSummary {
    pub output_path: PathBuf,
    /// Top-level elements written, Pixel Data included
    pub elements_written: usize,
    /// Elements left out at any depth
    pub elements_skipped: usize,
}

/// Rebuilds DICOM files from their extracted components
pub struct Recombiner<'a> {
    reporter: &'a dyn Reporter,
}

impl<'a> Recombiner<'a> {
    pub fn new(reporter: &'a dyn Reporter) -> Self {
        Self { reporter }
    }

    /// Rebuilds one file
    ///
    /// Relative paths recorded in the document are resolved against the
    /// directory holding `metadata_path`.
    ///
    /// # Arguments
    ///
    /// * `metadata_path` - The `<base>_metadata.json` document
    /// * `pixel_path` - Pixel payload (`.raw` or `.p`), `None` to omit Pixel Data
    /// * `output_path` - File to write
    ///
    /// # Errors
    ///
    /// Returns an error if the document is unreadable, the pixel payload is
    /// invalid, the transfer syntax is not supported, or writing fails.
    /// Individual elements that cannot be rebuilt are reported and skipped.
    pub fn recombine(
        &self,
        metadata_path: &Path,
        pixel_path: Option<&Path>,
        output_path: &Path,
    ) -> Result<RecombineSummary> {
        let doc = MetadataDocument::read_from_file(metadata_path)?;
        let base_dir = metadata_path.parent().unwrap_or_else(|| Path::new("."));
        let pixels = pixel_path.map(read_payload).transpose()?;
        self.recombine_document(&doc, base_dir, pixels.as_deref(), output_path)
    }

    /// Rebuilds a file from an already loaded document
    pub fn recombine_document(
        &self,
        doc: &MetadataDocument,
        base_dir: &Path,
        pixels: Option<&[u8]>,
        output_path: &Path,
    ) -> Result<RecombineSummary> {
        // 1. File meta group and preamble
        let meta = build_file_meta(doc, base_dir)?;
        let preamble = self.load_preamble(doc, base_dir);

        // 2. Data set elements, sequences and binaries
        let mut obj = InMemDicomObject::new_empty();
        let mut rebuilder = ItemRebuilder::new(base_dir, &doc.icon_data, self.reporter);
        let mut skipped = 0;

        for (key, record) in &doc.data_elements {
            let tag = record_tag(record);
            let restored = if record.is_sequence_placeholder() {
                let items = doc.sequence_data.get(key).map(Vec::as_slice).unwrap_or_default();
                Ok(rebuilder.sequence_element(tag, items))
            } else if record.is_binary_placeholder() {
                self.restore_binary(doc, base_dir, key, record)
            } else {
                restore_value_element(record)
            };

            match restored {
                Ok(elem) => {
                    obj.put(elem);
                }
                Err(e) => {
                    skipped += 1;
                    self.skip(tag, e.to_string());
                }
            }
        }

        // 3. Pixel payload
        if let Some(payload) = pixels {
            obj.put(pixel_element(
                payload,
                &doc.compression_info.transfer_syntax_uid,
                &doc.image_info,
            )?);
        }

        // 4. Write
        let elements_written = obj.iter().count();
        let file = obj.with_exact_meta(meta);
        write_dicom_file(output_path, &preamble, &file)?;

        let summary = RecombineSummary {
            output_path: output_path.to_path_buf(),
            elements_written,
            elements_skipped: skipped + rebuilder.skipped(),
        };
        self.reporter.report(Event::Recombined {
            path: summary.output_path.clone(),
            elements: summary.elements_written,
            skipped: summary.elements_skipped,
        });
        Ok(summary)
    }

    fn restore_binary(
        &self,
        doc: &MetadataDocument,
        base_dir: &Path,
        key: &str,
        record: &ElementRecord,
    ) -> Result<InMemElement> {
        let tag = record_tag(record);
        let entry = doc
            .binary_data_info
            .get(key)
            .ok_or_else(|| DcmSplitError::restoration(tag, "no binary file recorded"))?;
        restore_binary_element(tag, record_vr(record)?, entry, base_dir)
    }

    /// The recorded preamble, or 128 zero bytes
    fn load_preamble(&self, doc: &MetadataDocument, base_dir: &Path) -> [u8; 128] {
        let mut preamble = [0u8; 128];
        let Some(name) = &doc.encoding_info.preamble_file else {
            return preamble;
        };

        match fs::read(base_dir.join(name)) {
            Ok(bytes) if bytes.len() == preamble.len() => preamble.copy_from_slice(&bytes),
            Ok(bytes) => self.reporter.report(Event::Info(format!(
                "Preamble file {} has {} bytes, using zeros",
                name,
                bytes.len()
            ))),
            Err(e) => self.reporter.report(Event::Info(format!(
                "Cannot read preamble file {}: {}, using zeros",
                name, e
            ))),
        }
        preamble
    }

    fn skip(&self, tag: Tag, reason: String) {
        log::debug!("Element {} not restored", tag_key(tag));
        self.reporter.report(Event::ElementSkipped { tag, reason });
    }
}
