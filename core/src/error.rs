use dicom_core::Tag;
use thiserror::Error;

/// Result type for dcmsplit operations
pub type Result<T> = std::result::Result<T, DcmSplitError>;

/// Error types for dcmsplit operations
#[derive(Error, Debug)]
pub enum DcmSplitError {
    /// File could not be read as DICOM
    #[error("DICOM error: {0}")]
    Dicom(String),

    /// DICOM file could not be written
    #[error("DICOM write error: {0}")]
    Write(String),

    /// File meta group could not be built
    #[error("File meta error: {0}")]
    Meta(String),

    /// Invalid element value
    #[error("Invalid value: {0}")]
    InvalidValue(String),

    /// The dataset has no Pixel Data element
    #[error("No pixel data found in {0}")]
    MissingPixelData(String),

    /// A single element could not be rebuilt
    #[error("Could not restore element {tag}: {reason}")]
    ElementRestoration { tag: Tag, reason: String },

    /// Transfer syntax is not known to the encoder
    #[error("Unsupported transfer syntax: {0}")]
    UnsupportedTransferSyntax(String),

    /// Metadata document (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Pixel archive (de)serialization error
    #[error("Pixel archive error: {0}")]
    Archive(#[from] bincode::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DcmSplitError {
    /// Builds an element restoration error for the given tag
    pub fn restoration(tag: Tag, reason: impl Into<String>) -> Self {
        DcmSplitError::ElementRestoration {
            tag,
            reason: reason.into(),
        }
    }
}

impl From<String> for DcmSplitError {
    fn from(s: String) -> Self {
        DcmSplitError::InvalidValue(s)
    }
}

impl From<&str> for DcmSplitError {
    fn from(s: &str) -> Self {
        DcmSplitError::InvalidValue(s.to_string())
    }
}

// Convert dicom-object errors
impl From<dicom_object::ReadError> for DcmSplitError {
    fn from(e: dicom_object::ReadError) -> Self {
        DcmSplitError::Dicom(format!("{}", e))
    }
}

impl From<dicom_object::WriteError> for DcmSplitError {
    fn from(e: dicom_object::WriteError) -> Self {
        DcmSplitError::Write(format!("{}", e))
    }
}

impl From<dicom_object::meta::Error> for DcmSplitError {
    fn from(e: dicom_object::meta::Error) -> Self {
        DcmSplitError::Meta(format!("{}", e))
    }
}

impl From<dicom_core::value::ConvertValueError> for DcmSplitError {
    fn from(e: dicom_core::value::ConvertValueError) -> Self {
        DcmSplitError::InvalidValue(format!("{}", e))
    }
}
