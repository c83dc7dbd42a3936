//! Component Extractor
//!
//! Splits a DICOM file into `<base>_metadata.json`, the pixel payload and
//! the `<base>_binary/` directory of externalized element values.

pub mod extractor;
pub mod file_meta;
pub mod pixel;
pub mod sequences;
pub mod tags;

use crate::error::Result;
use crate::model::ImageInfo;
use crate::types::transfer_syntax::{normalize_uid, IMPLICIT_VR_LITTLE_ENDIAN};
use dicom_object::file::ReadPreamble;
use dicom_object::{DefaultDicomObject, InMemDicomObject, OpenFileOptions};
use std::path::Path;

pub use extractor::{read_preamble, ComponentExtractor, ExtractOptions, ExtractionOutput};
pub use pixel::{read_payload, PixelArchive};
pub use tags::*;

/// Opens a DICOM file, with or without preamble
///
/// # Errors
///
/// Returns [`crate::DcmSplitError::Dicom`] if the file cannot be parsed.
pub fn open_dicom(path: &Path) -> Result<DefaultDicomObject> {
    Ok(OpenFileOptions::new()
        .read_preamble(ReadPreamble::Auto)
        .open_file(path)?)
}

/// Transfer syntax UID of an opened file
///
/// An empty UID is read as implicit VR little endian.
pub fn file_transfer_syntax(obj: &DefaultDicomObject) -> String {
    match normalize_uid(&obj.meta().transfer_syntax) {
        "" => IMPLICIT_VR_LITTLE_ENDIAN.to_string(),
        uid => uid.to_string(),
    }
}

/// Pixel geometry of a data set, with DICOM defaults for absent attributes
pub fn image_info(dataset: &InMemDicomObject) -> ImageInfo {
    ImageInfo {
        rows: get_u32_value(dataset, ROWS).unwrap_or(0),
        columns: get_u32_value(dataset, COLUMNS).unwrap_or(0),
        samples_per_pixel: get_u32_value(dataset, SAMPLES_PER_PIXEL).unwrap_or(1),
        bits_allocated: get_u32_value(dataset, BITS_ALLOCATED).unwrap_or(0),
        number_of_frames: get_u32_value(dataset, NUMBER_OF_FRAMES).unwrap_or(1),
    }
}

/// `path` relative to `root` as a forward-slash string
pub(crate) fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
