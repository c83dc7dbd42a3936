//! Core type definitions for DICOM decomposition
//!
//! This module provides the fundamental types used throughout the dcmsplit library:
//! - [`ExtractionMode`]: How much of a file the extractor externalizes
//! - [`PixelFormat`]: On-disk format of the pixel payload
//! - [`ValueClass`]: Serialization strategy chosen per data element
//! - [`TagCategory`]: Size accounting buckets for the tag size analysis
//! - [`FormattedNumber`]: A numeric value paired with its exact source literal
//! - [`transfer_syntax`]: Transfer syntax names and encoding predicates

mod enums;
mod formatted_number;
pub mod transfer_syntax;

pub use enums::{ExtractionMode, PixelFormat, TagCategory, ValueClass};
pub use formatted_number::FormattedNumber;
