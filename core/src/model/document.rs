use crate::error::Result;
use crate::types::{ExtractionMode, PixelFormat};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Placeholder stored in place of an externalized binary value
pub const BINARY_PLACEHOLDER: &str = "BINARY_DATA";

/// Placeholder stored for a top-level sequence whose items live in `SequenceData`
pub const SEQUENCE_PLACEHOLDER: &str = "SEQUENCE_DATA";

/// A sequence item: tag key to element record
pub type SequenceItem = BTreeMap<String, ElementRecord>;

/// JSON intermediate representation of one DICOM file
///
/// Written once by the extractor, read-only afterwards. All maps are
/// ordered so that serialization is stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MetadataDocument {
    #[serde(default)]
    pub file_meta_info: BTreeMap<String, MetaRecord>,
    #[serde(default)]
    pub data_elements: BTreeMap<String, ElementRecord>,
    #[serde(default)]
    pub binary_data_info: BTreeMap<String, BinaryFileRecord>,
    #[serde(default)]
    pub sequence_data: BTreeMap<String, Vec<SequenceItem>>,
    #[serde(default)]
    pub raw_meta_info: BTreeMap<String, BinaryFileRecord>,
    #[serde(default)]
    pub private_tags: BTreeMap<String, ElementRecord>,
    #[serde(default)]
    pub icon_data: BTreeMap<String, BinaryFileRecord>,
    #[serde(default)]
    pub encoding_info: EncodingInfo,
    #[serde(default)]
    pub compression_info: CompressionInfo,
    #[serde(default)]
    pub image_info: ImageInfo,
}

/// One file meta group element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaRecord {
    pub tag: [u16; 2],
    #[serde(rename = "VR")]
    pub vr: String,
    pub value: String,
}

/// One data set element
///
/// `value` is a JSON string, number, list, `null`, or one of the
/// [`BINARY_PLACEHOLDER`] / [`SEQUENCE_PLACEHOLDER`] tokens.
/// Records inside `SequenceData` carry nested sequence items inline in
/// `items`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementRecord {
    pub tag: [u16; 2],
    #[serde(rename = "VR")]
    pub vr: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub is_private: bool,
    pub value: JsonValue,
    /// Exact source literal(s) of numeric VRs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_format: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<SequenceItem>>,
}

impl ElementRecord {
    /// Whether the value was replaced by the binary placeholder
    pub fn is_binary_placeholder(&self) -> bool {
        self.value.as_str() == Some(BINARY_PLACEHOLDER)
    }

    /// Whether the value was replaced by the sequence placeholder
    pub fn is_sequence_placeholder(&self) -> bool {
        self.value.as_str() == Some(SEQUENCE_PLACEHOLDER)
    }
}

/// Index entry for an externalized binary file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryFileRecord {
    /// Path relative to the directory holding the metadata document
    pub binary_file: String,
    pub length: usize,
    #[serde(rename = "VR", default, skip_serializing_if = "Option::is_none")]
    pub vr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingInfo {
    pub is_little_endian: bool,
    #[serde(rename = "is_implicit_VR")]
    pub is_implicit_vr: bool,
    pub has_preamble: bool,
    pub preamble_file: Option<String>,
}

impl Default for EncodingInfo {
    fn default() -> Self {
        Self {
            is_little_endian: true,
            is_implicit_vr: true,
            has_preamble: false,
            preamble_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionInfo {
    #[serde(rename = "TransferSyntaxUID")]
    pub transfer_syntax_uid: String,
    #[serde(rename = "TransferSyntaxName")]
    pub transfer_syntax_name: String,
    #[serde(rename = "IsCompressed")]
    pub is_compressed: bool,
    #[serde(rename = "OriginalFileSize")]
    pub original_file_size: u64,
    #[serde(rename = "CompressedPixelDataSize")]
    pub compressed_pixel_data_size: u64,
    #[serde(rename = "TheoreticalUncompressedSize")]
    pub theoretical_uncompressed_size: u64,
    #[serde(rename = "CompressionRatio")]
    pub compression_ratio: f64,
    #[serde(rename = "ExtractionMode")]
    pub extraction_mode: ExtractionMode,
    #[serde(rename = "PixelFormat")]
    pub pixel_format: PixelFormat,
}

impl Default for CompressionInfo {
    fn default() -> Self {
        Self {
            transfer_syntax_uid: crate::types::transfer_syntax::IMPLICIT_VR_LITTLE_ENDIAN
                .to_string(),
            transfer_syntax_name: String::new(),
            is_compressed: false,
            original_file_size: 0,
            compressed_pixel_data_size: 0,
            theoretical_uncompressed_size: 0,
            compression_ratio: 1.0,
            extraction_mode: ExtractionMode::default(),
            pixel_format: PixelFormat::default(),
        }
    }
}

/// Pixel geometry of the main image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageInfo {
    pub rows: u32,
    pub columns: u32,
    pub samples_per_pixel: u32,
    pub bits_allocated: u32,
    pub number_of_frames: u32,
}

impl Default for ImageInfo {
    fn default() -> Self {
        Self {
            rows: 0,
            columns: 0,
            samples_per_pixel: 1,
            bits_allocated: 0,
            number_of_frames: 1,
        }
    }
}

impl ImageInfo {
    /// Expected size in bytes of the uncompressed pixel data
    ///
    /// rows × columns × samples per pixel × (bits allocated / 8) × frames
    pub fn theoretical_uncompressed_size(&self) -> u64 {
        self.rows as u64
            * self.columns as u64
            * self.samples_per_pixel as u64
            * (self.bits_allocated / 8) as u64
            * self.number_of_frames as u64
    }

    /// Size in bytes of a single uncompressed frame
    pub fn expected_frame_size(&self) -> u64 {
        self.rows as u64
            * self.columns as u64
            * self.samples_per_pixel as u64
            * (self.bits_allocated / 8) as u64
    }
}

/// Compression ratio of a pixel payload
///
/// theoretical / actual when compressed and the payload is not empty,
/// 1.0 otherwise.
pub fn compression_ratio(is_compressed: bool, theoretical: u64, actual: u64) -> f64 {
    if is_compressed && actual > 0 {
        theoretical as f64 / actual as f64
    } else {
        1.0
    }
}

impl MetadataDocument {
    /// Writes the document as pretty-printed UTF-8 JSON
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a document previously written by [`MetadataDocument::write_to_file`]
    pub fn read_from_file(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
