use dicom_core::header::Header;
use dicom_core::value::PrimitiveValue;
use dicom_core::{Tag, VR};
use dicom_object::meta::FileMetaTable;

use super::tags::{keyword_of, tag_key};

/// Value of a file meta element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Text(String),
    Bytes(Vec<u8>),
    Long(u32),
}

impl MetaValue {
    fn from_primitive(value: &PrimitiveValue) -> Self {
        match value {
            PrimitiveValue::U32(v) if v.len() == 1 => MetaValue::Long(v[0]),
            PrimitiveValue::U8(bytes) => MetaValue::Bytes(bytes.to_vec()),
            other => MetaValue::Text(other.to_str().trim_end_matches(['\0', ' ']).to_string()),
        }
    }

    /// Encoded value length, padded to even
    pub fn encoded_len(&self) -> usize {
        let len = match self {
            MetaValue::Text(s) => s.len(),
            MetaValue::Bytes(b) => b.len(),
            MetaValue::Long(_) => 4,
        };
        len + len % 2
    }

    /// Document form of the value
    pub fn as_text(&self) -> Option<String> {
        match self {
            MetaValue::Text(s) => Some(s.clone()),
            MetaValue::Long(v) => Some(v.to_string()),
            MetaValue::Bytes(_) => None,
        }
    }
}

/// One element of the file meta group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaElement {
    pub tag: Tag,
    pub vr: VR,
    pub value: MetaValue,
}

impl MetaElement {
    /// Dictionary keyword, or the tag key when unknown
    pub fn keyword(&self) -> String {
        let keyword = keyword_of(self.tag);
        if keyword.is_empty() {
            tag_key(self.tag)
        } else {
            keyword
        }
    }

    /// Bytes taken by the element in the always explicit VR LE meta group
    pub fn encoded_size(&self) -> usize {
        let header = match self.vr {
            VR::OB | VR::UN => 12,
            _ => 8,
        };
        header + self.value.encoded_len()
    }
}

/// Elements of a file meta table in tag order
///
/// Optional elements are listed only when present.
pub fn meta_elements(meta: &FileMetaTable) -> Vec<MetaElement> {
    meta.clone()
        .into_element_iter()
        .filter_map(|elem| {
            let value = elem.value().primitive().map(MetaValue::from_primitive)?;
            Some(MetaElement {
                tag: elem.tag(),
                vr: elem.vr(),
                value,
            })
        })
        .collect()
}
