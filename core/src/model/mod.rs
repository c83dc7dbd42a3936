//! Metadata document model and the shared element machinery
//!
//! - [`document`]: serde model of the `<base>_metadata.json` document
//! - [`value`]: VR classification and element ⇄ record conversion
//! - [`walk`]: bottom-up traversal of nested data sets
//! - [`encapsulated`]: item stream codec for compressed pixel data

pub mod document;
pub mod encapsulated;
pub mod value;
pub mod walk;

pub use document::{
    compression_ratio, BinaryFileRecord, CompressionInfo, ElementRecord, EncodingInfo, ImageInfo,
    MetaRecord, MetadataDocument, SequenceItem, BINARY_PLACEHOLDER, SEQUENCE_PLACEHOLDER,
};
pub use encapsulated::Encapsulated;
pub use value::{classify, element_record, record_to_primitive};
pub use walk::{walk_dataset, DatasetVisitor, ItemPath};
