//! Pixel payload files
//!
//! The payload is written either as the bare bytes (`<base>_pixels.raw`) or
//! as a self-describing [`PixelArchive`] (`<base>_pixels.p`) that carries the
//! image geometry and transfer syntax next to the bytes.

use crate::error::{DcmSplitError, Result};
use crate::model::ImageInfo;
use crate::types::PixelFormat;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Pixel bytes bundled with what is needed to interpret them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelArchive {
    pub data: Vec<u8>,
    pub rows: u32,
    pub columns: u32,
    pub samples_per_pixel: u32,
    pub bits_allocated: u32,
    pub number_of_frames: u32,
    pub transfer_syntax_uid: String,
    pub is_compressed: bool,
}

impl PixelArchive {
    pub fn new(data: Vec<u8>, info: &ImageInfo, transfer_syntax_uid: &str, is_compressed: bool) -> Self {
        Self {
            data,
            rows: info.rows,
            columns: info.columns,
            samples_per_pixel: info.samples_per_pixel,
            bits_allocated: info.bits_allocated,
            number_of_frames: info.number_of_frames,
            transfer_syntax_uid: transfer_syntax_uid.to_string(),
            is_compressed,
        }
    }
}

/// Path of the pixel payload file for `base` in `out_dir`
pub fn payload_path(out_dir: &Path, base: &str, format: PixelFormat) -> PathBuf {
    out_dir.join(format!("{}_pixels.{}", base, format.extension()))
}

/// Writes a pixel payload in the requested format
///
/// # Arguments
///
/// * `path` - Destination file, usually from [`payload_path`]
/// * `archive` - Payload and its geometry; only `data` is kept for `raw`
/// * `format` - On-disk format
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialized.
pub fn write_payload(path: &Path, archive: &PixelArchive, format: PixelFormat) -> Result<()> {
    match format {
        PixelFormat::Raw => fs::write(path, &archive.data)?,
        PixelFormat::Pickle => {
            let mut writer = BufWriter::new(File::create(path)?);
            bincode::serialize_into(&mut writer, archive)?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Reads the payload bytes back, picking the format from the extension
///
/// `.p` files are archives; anything else is taken as raw bytes.
///
/// # Errors
///
/// Returns [`DcmSplitError::MissingPixelData`] for an empty payload.
pub fn read_payload(path: &Path) -> Result<Vec<u8>> {
    let is_archive = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case(PixelFormat::Pickle.extension()))
        .unwrap_or(false);

    let data = if is_archive {
        read_archive(path)?.data
    } else {
        fs::read(path)?
    };
    if data.is_empty() {
        return Err(DcmSplitError::MissingPixelData(path.display().to_string()));
    }
    Ok(data)
}

/// Reads a [`PixelArchive`] file
pub fn read_archive(path: &Path) -> Result<PixelArchive> {
    let reader = BufReader::new(File::open(path)?);
    bincode::deserialize_from(reader).map_err(|e| {
        DcmSplitError::InvalidValue(format!(
            "{} is not a pixel archive: {}",
            path.display(),
            e
        ))
    })
}
