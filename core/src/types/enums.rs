use serde::{Deserialize, Serialize};
use std::fmt;

/// Level of detail captured by the component extractor
///
/// Ordered from least to most complete: every element kept by a lower
/// mode is also kept by the higher ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Metadata and pixel data only, private tags dropped
    Minimal,
    /// Adds essential binary data and the icon thumbnail
    Standard,
    /// Every element, including private tags, raw file meta and preamble
    #[default]
    Full,
}

impl ExtractionMode {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            ExtractionMode::Minimal => "minimal",
            ExtractionMode::Standard => "standard",
            ExtractionMode::Full => "full",
        }
    }

    /// Whether binary elements are written to a `<base>_binary/` directory
    pub fn writes_binary(&self) -> bool {
        !matches!(self, ExtractionMode::Minimal)
    }
}

impl fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// On-disk format of the pixel payload file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// Flat bytes (`<base>_pixels.raw`)
    #[default]
    Raw,
    /// Serialized archive with inline geometry (`<base>_pixels.p`)
    Pickle,
}

impl PixelFormat {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            PixelFormat::Raw => "raw",
            PixelFormat::Pickle => "pickle",
        }
    }

    /// File extension of the pixel payload, without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            PixelFormat::Raw => "raw",
            PixelFormat::Pickle => "p",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Serialization strategy chosen for a data element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueClass {
    /// Scalar or multi-valued text, stored as JSON strings
    Plain,
    /// Numeric VR, stored with its exact source literal
    Numeric,
    /// Nested items, captured recursively
    Sequence,
    /// Opaque bytes, externalized to a companion file
    Binary,
    /// The main Pixel Data element, routed to the pixel payload file
    PixelData,
}

impl ValueClass {
    /// Whether values of this class are opaque bytes
    pub fn is_binary(&self) -> bool {
        matches!(self, ValueClass::Binary | ValueClass::PixelData)
    }
}

/// Size accounting bucket used by the tag size analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TagCategory {
    Standard,
    Private,
    Sequences,
    Binary,
    PixelData,
}

impl TagCategory {
    /// All categories in report order
    pub const ALL: [TagCategory; 5] = [
        TagCategory::Standard,
        TagCategory::Private,
        TagCategory::Sequences,
        TagCategory::Binary,
        TagCategory::PixelData,
    ];

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            TagCategory::Standard => "Standard",
            TagCategory::Private => "Private",
            TagCategory::Sequences => "Sequences",
            TagCategory::Binary => "Binary",
            TagCategory::PixelData => "Pixel Data",
        }
    }
}

impl fmt::Display for TagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}
