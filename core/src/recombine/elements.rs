use crate::error::{DcmSplitError, Result};
use crate::model::value::{primitive_from_le_bytes, record_to_primitive};
use crate::model::{BinaryFileRecord, ElementRecord};
use dicom_core::{DataElement, Tag, VR};
use dicom_object::mem::InMemElement;
use std::fs;
use std::path::Path;

/// Tag of a record
pub fn record_tag(record: &ElementRecord) -> Tag {
    Tag(record.tag[0], record.tag[1])
}

/// VR of a record
///
/// # Errors
///
/// Returns an error if the VR is not a known two-letter code.
pub fn record_vr(record: &ElementRecord) -> Result<VR> {
    record
        .vr
        .parse::<VR>()
        .map_err(|_| DcmSplitError::restoration(record_tag(record), format!("unknown VR '{}'", record.vr)))
}

/// Rebuilds a plain or numeric element from its record
pub fn restore_value_element(record: &ElementRecord) -> Result<InMemElement> {
    let tag = record_tag(record);
    let vr = record_vr(record)?;
    Ok(DataElement::new(tag, vr, record_to_primitive(record, vr)?))
}

/// Rebuilds a binary element from its companion file
///
/// # Errors
///
/// Returns an error if the file cannot be read or its length differs from
/// the recorded one.
pub fn restore_binary_element(
    tag: Tag,
    vr: VR,
    entry: &BinaryFileRecord,
    base_dir: &Path,
) -> Result<InMemElement> {
    let path = base_dir.join(&entry.binary_file);
    let bytes = fs::read(&path).map_err(|e| {
        DcmSplitError::restoration(tag, format!("cannot read {}: {}", path.display(), e))
    })?;
    if bytes.len() != entry.length {
        return Err(DcmSplitError::restoration(
            tag,
            format!(
                "{} holds {} bytes, expected {}",
                entry.binary_file,
                bytes.len(),
                entry.length
            ),
        ));
    }
    Ok(DataElement::new(tag, vr, primitive_from_le_bytes(vr, &bytes)))
}
