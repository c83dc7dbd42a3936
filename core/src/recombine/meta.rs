use crate::error::Result;
use crate::extraction::tags::{
    tag_key, FILE_META_INFORMATION_VERSION, IMPLEMENTATION_CLASS_UID, IMPLEMENTATION_VERSION_NAME,
    MEDIA_STORAGE_SOP_CLASS_UID, MEDIA_STORAGE_SOP_INSTANCE_UID, PRIVATE_INFORMATION,
    PRIVATE_INFORMATION_CREATOR_UID, RECEIVING_APPLICATION_ENTITY_TITLE,
    SENDING_APPLICATION_ENTITY_TITLE, SOP_CLASS_UID, SOP_INSTANCE_UID,
    SOURCE_APPLICATION_ENTITY_TITLE,
};
use crate::model::{MetadataDocument, BINARY_PLACEHOLDER};
use dicom_core::Tag;
use dicom_object::meta::{FileMetaTable, FileMetaTableBuilder};
use log::debug;
use std::fs;
use std::path::Path;
use uuid::Uuid;

/// Generates a fresh UID under the `2.25` UUID root
pub fn generate_uid() -> String {
    format!("2.25.{}", Uuid::new_v4().as_u128())
}

/// Text value of a meta element recorded in the document
fn meta_text(doc: &MetadataDocument, tag: Tag) -> Option<String> {
    doc.file_meta_info
        .values()
        .find(|record| record.tag == [tag.group(), tag.element()])
        .map(|record| record.value.trim_end_matches(['\0', ' ']).to_string())
        .filter(|value| !value.is_empty() && value != BINARY_PLACEHOLDER)
}

/// Text value of a top-level data element recorded in the document
fn element_text(doc: &MetadataDocument, tag: Tag) -> Option<String> {
    doc.data_elements
        .get(&tag_key(tag))
        .and_then(|record| record.value.as_str())
        .map(|value| value.trim_end_matches(['\0', ' ']).to_string())
        .filter(|value| !value.is_empty())
}

/// Bytes of a binary meta element saved in `RawMetaInfo`
fn raw_meta_bytes(doc: &MetadataDocument, base_dir: &Path, tag: Tag) -> Result<Option<Vec<u8>>> {
    match doc.raw_meta_info.get(&tag_key(tag)) {
        Some(record) => Ok(Some(fs::read(base_dir.join(&record.binary_file))?)),
        None => Ok(None),
    }
}

/// Rebuilds the file meta group of a document
///
/// # Algorithm
///
/// 1. Transfer syntax always comes from `CompressionInfo`
/// 2. SOP class and instance fall back to the data set values, then to a
///    generated UID; the implementation class UID is generated when absent
/// 3. Optional text elements are copied when recorded
/// 4. Binary elements are read back from their `RawMetaInfo` files
///
/// # Errors
///
/// Returns an error if a raw meta file cannot be read or the table cannot
/// be built.
pub fn build_file_meta(doc: &MetadataDocument, base_dir: &Path) -> Result<FileMetaTable> {
    let sop_class = meta_text(doc, MEDIA_STORAGE_SOP_CLASS_UID)
        .or_else(|| element_text(doc, SOP_CLASS_UID))
        .unwrap_or_else(|| {
            debug!("No media storage SOP class UID recorded, generating one");
            generate_uid()
        });
    let sop_instance = meta_text(doc, MEDIA_STORAGE_SOP_INSTANCE_UID)
        .or_else(|| element_text(doc, SOP_INSTANCE_UID))
        .unwrap_or_else(generate_uid);
    let implementation_class = meta_text(doc, IMPLEMENTATION_CLASS_UID).unwrap_or_else(generate_uid);

    let mut builder = FileMetaTableBuilder::new()
        .media_storage_sop_class_uid(sop_class)
        .media_storage_sop_instance_uid(sop_instance)
        .transfer_syntax(doc.compression_info.transfer_syntax_uid.as_str())
        .implementation_class_uid(implementation_class);

    if let Some(value) = meta_text(doc, IMPLEMENTATION_VERSION_NAME) {
        builder = builder.implementation_version_name(value);
    }
    if let Some(value) = meta_text(doc, SOURCE_APPLICATION_ENTITY_TITLE) {
        builder = builder.source_application_entity_title(value);
    }
    if let Some(value) = meta_text(doc, SENDING_APPLICATION_ENTITY_TITLE) {
        builder = builder.sending_application_entity_title(value);
    }
    if let Some(value) = meta_text(doc, RECEIVING_APPLICATION_ENTITY_TITLE) {
        builder = builder.receiving_application_entity_title(value);
    }
    if let Some(value) = meta_text(doc, PRIVATE_INFORMATION_CREATOR_UID) {
        builder = builder.private_information_creator_uid(value);
    }

    if let Some(bytes) = raw_meta_bytes(doc, base_dir, FILE_META_INFORMATION_VERSION)? {
        if let [major, minor] = bytes[..] {
            builder = builder.information_version([major, minor]);
        }
    }
    if let Some(bytes) = raw_meta_bytes(doc, base_dir, PRIVATE_INFORMATION)? {
        builder = builder.private_information(bytes);
    }

    Ok(builder.build()?)
}
