use crate::error::Result;
use crate::extraction::tags::PIXEL_DATA;
use crate::extraction::{file_transfer_syntax, image_info, open_dicom};
use crate::model::value::binary_bytes;
use crate::model::{compression_ratio, ImageInfo};
use crate::types::transfer_syntax::{is_compressed, transfer_syntax_name};
use std::fs;
use std::path::{Path, PathBuf};

/// Compression details of one file
#[derive(Debug, Clone, PartialEq)]
pub struct CompressionAnalysis {
    pub file_path: PathBuf,
    pub file_size: u64,
    pub transfer_syntax_uid: String,
    pub compression_type: String,
    pub is_compressed: bool,
    pub image: ImageInfo,
    pub theoretical_uncompressed_size: u64,
    /// Bytes of Pixel Data as stored, item stream included when encapsulated
    pub compressed_pixel_size: u64,
    pub compression_ratio: f64,
}

/// Analyzes the pixel compression of a DICOM file
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn analyze_compression(path: &Path) -> Result<CompressionAnalysis> {
    let obj = open_dicom(path)?;
    let file_size = fs::metadata(path)?.len();

    let transfer_syntax_uid = file_transfer_syntax(&obj);
    let compressed = is_compressed(&transfer_syntax_uid);
    let image = image_info(&obj);
    let theoretical = image.theoretical_uncompressed_size();
    let pixel_size = obj
        .element(PIXEL_DATA)
        .map(|elem| binary_bytes(elem.value()).len() as u64)
        .unwrap_or(0);

    Ok(CompressionAnalysis {
        file_path: path.to_path_buf(),
        file_size,
        compression_type: transfer_syntax_name(&transfer_syntax_uid),
        transfer_syntax_uid,
        is_compressed: compressed,
        image,
        theoretical_uncompressed_size: theoretical,
        compressed_pixel_size: pixel_size,
        compression_ratio: compression_ratio(compressed, theoretical, pixel_size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{compressed_payload, write_fixture, FixtureOptions};
    use tempfile::TempDir;

    #[test]
    fn test_uncompressed_file() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(dir.path(), "a.dcm", &FixtureOptions::default());
        let analysis = analyze_compression(&path).unwrap();

        assert_eq!(analysis.compression_type, "Explicit VR Little Endian (Uncompressed)");
        assert!(!analysis.is_compressed);
        assert_eq!(analysis.theoretical_uncompressed_size, 524_288);
        assert_eq!(analysis.compressed_pixel_size, 524_288);
        assert_eq!(analysis.compression_ratio, 1.0);
        assert_eq!(analysis.file_size, fs::metadata(&path).unwrap().len());
    }

    #[test]
    fn test_compressed_file_ratio() {
        let dir = TempDir::new().unwrap();
        let fixture = FixtureOptions {
            compressed: true,
            ..FixtureOptions::default()
        };
        let path = write_fixture(dir.path(), "c.dcm", &fixture);
        let analysis = analyze_compression(&path).unwrap();

        let payload = compressed_payload().len() as u64;
        assert!(analysis.is_compressed);
        assert_eq!(analysis.compressed_pixel_size, payload);
        assert!((analysis.compression_ratio - 524_288.0 / payload as f64).abs() < 1e-9);
    }

    #[test]
    fn test_unreadable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.dcm");
        fs::write(&path, [0u8; 10]).unwrap();
        assert!(analyze_compression(&path).is_err());
    }
}
