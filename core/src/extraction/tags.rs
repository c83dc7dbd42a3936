use dicom_core::dictionary::{DataDictionary, DataDictionaryEntry};
use dicom_core::Tag;
use dicom_dictionary_std::StandardDataDictionary;
use dicom_object::InMemDicomObject;

// File Meta Information Tags
pub const FILE_META_GROUP_LENGTH: Tag = Tag(0x0002, 0x0000);
pub const FILE_META_INFORMATION_VERSION: Tag = Tag(0x0002, 0x0001);
pub const MEDIA_STORAGE_SOP_CLASS_UID: Tag = Tag(0x0002, 0x0002);
pub const MEDIA_STORAGE_SOP_INSTANCE_UID: Tag = Tag(0x0002, 0x0003);
pub const TRANSFER_SYNTAX_UID: Tag = Tag(0x0002, 0x0010);
pub const IMPLEMENTATION_CLASS_UID: Tag = Tag(0x0002, 0x0012);
pub const IMPLEMENTATION_VERSION_NAME: Tag = Tag(0x0002, 0x0013);
pub const SOURCE_APPLICATION_ENTITY_TITLE: Tag = Tag(0x0002, 0x0016);
pub const SENDING_APPLICATION_ENTITY_TITLE: Tag = Tag(0x0002, 0x0017);
pub const RECEIVING_APPLICATION_ENTITY_TITLE: Tag = Tag(0x0002, 0x0018);
pub const PRIVATE_INFORMATION_CREATOR_UID: Tag = Tag(0x0002, 0x0100);
pub const PRIVATE_INFORMATION: Tag = Tag(0x0002, 0x0102);

// SOP Identification Tags
pub const SOP_CLASS_UID: Tag = Tag(0x0008, 0x0016);
pub const SOP_INSTANCE_UID: Tag = Tag(0x0008, 0x0018);

// Image Geometry Tags
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
pub const ROWS: Tag = Tag(0x0028, 0x0010);
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);

// Binary Payload Tags
pub const ICON_IMAGE_SEQUENCE: Tag = Tag(0x0088, 0x0200);
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);

/// Elements kept in standard mode even when they hold binary data
///
/// Patient/study/series identification, image geometry, and the
/// MR and CT acquisition parameters.
pub const ESSENTIAL_TAGS: &[Tag] = &[
    Tag(0x0010, 0x0020), // PatientID
    Tag(0x0010, 0x0010), // PatientName
    Tag(0x0010, 0x0030), // PatientBirthDate
    Tag(0x0010, 0x0040), // PatientSex
    Tag(0x0020, 0x000D), // StudyInstanceUID
    Tag(0x0020, 0x0010), // StudyID
    Tag(0x0008, 0x0020), // StudyDate
    Tag(0x0008, 0x0030), // StudyTime
    Tag(0x0020, 0x000E), // SeriesInstanceUID
    Tag(0x0020, 0x0011), // SeriesNumber
    Tag(0x0008, 0x0021), // SeriesDate
    Tag(0x0008, 0x0031), // SeriesTime
    Tag(0x0020, 0x0032), // ImagePositionPatient
    Tag(0x0020, 0x0037), // ImageOrientationPatient
    Tag(0x0020, 0x1041), // SliceLocation
    Tag(0x0028, 0x0030), // PixelSpacing
    Tag(0x0018, 0x0050), // SliceThickness
    Tag(0x0018, 0x0088), // SpacingBetweenSlices
    Tag(0x0018, 0x0081), // EchoTime
    Tag(0x0018, 0x0080), // RepetitionTime
    Tag(0x0018, 0x0087), // MagneticFieldStrength
    Tag(0x0018, 0x1314), // FlipAngle
    Tag(0x0018, 0x0060), // KVP
    Tag(0x0018, 0x1150), // ExposureTime
    Tag(0x0018, 0x1151), // XRayTubeCurrent
];

/// Whether a tag belongs to a private group (odd group number)
pub fn is_private(tag: Tag) -> bool {
    tag.group() % 2 == 1
}

/// Whether a tag is kept by standard mode regardless of its value class
pub fn is_essential(tag: Tag) -> bool {
    ESSENTIAL_TAGS.contains(&tag)
}

/// Canonical document key for a tag: `(GGGG,EEEE)`
pub fn tag_key(tag: Tag) -> String {
    format!("({:04X},{:04X})", tag.group(), tag.element())
}

/// Companion file name for a binary element: `GGGG_EEEE`
pub fn tag_file_stem(tag: Tag) -> String {
    format!("{:04x}_{:04x}", tag.group(), tag.element())
}

/// Parses a tag from its document key
///
/// Accepts `(0008,0016)`, `(0008, 0016)`, `0008,0016` and `00080016`.
pub fn parse_tag_key(key: &str) -> Option<Tag> {
    let cleaned: String = key
        .chars()
        .filter(|c| !matches!(c, '(' | ')' | ' '))
        .collect();
    let (group, element) = match cleaned.split_once(',') {
        Some((g, e)) => (g.to_string(), e.to_string()),
        None if cleaned.len() == 8 && cleaned.is_ascii() => {
            (cleaned[..4].to_string(), cleaned[4..].to_string())
        }
        None => return None,
    };
    let group = u16::from_str_radix(&group, 16).ok()?;
    let element = u16::from_str_radix(&element, 16).ok()?;
    Some(Tag(group, element))
}

/// Standard dictionary keyword of a tag, empty when unknown
pub fn keyword_of(tag: Tag) -> String {
    if is_private(tag) {
        return String::new();
    }
    StandardDataDictionary
        .by_tag(tag)
        .map(|entry| entry.alias().to_string())
        .unwrap_or_default()
}

/// Helper to get an unsigned integer value from DICOM tag
///
/// Returns `None` if the tag is not present or cannot be converted to u32
pub fn get_u32_value(dcm: &InMemDicomObject, tag: Tag) -> Option<u32> {
    dcm.element(tag)
        .ok()
        .and_then(|elem| elem.to_int::<u32>().ok())
}
