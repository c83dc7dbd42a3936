use crate::error::Result;
use crate::model::value::{binary_bytes, element_record};
use crate::model::walk::{walk_dataset, DatasetVisitor, ItemPath};
use crate::model::{BinaryFileRecord, ElementRecord, SequenceItem, SEQUENCE_PLACEHOLDER};
use crate::types::ValueClass;
use dicom_core::header::Header;
use dicom_object::mem::InMemElement;
use dicom_object::InMemDicomObject;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::relative_to;
use super::tags::{tag_file_stem, tag_key, ICON_IMAGE_SEQUENCE, PIXEL_DATA};

/// Where icon binaries go when they are extracted
pub struct IconTarget<'a> {
    /// The `<base>_binary` directory
    pub binary_dir: &'a Path,
    /// Directory the recorded paths are relative to
    pub out_dir: &'a Path,
}

/// Sequence records and icon files of one data set
#[derive(Debug, Default)]
pub struct CapturedSequences {
    pub sequence_data: BTreeMap<String, Vec<SequenceItem>>,
    pub icon_data: BTreeMap<String, BinaryFileRecord>,
}

/// Captures every top-level sequence of `obj` as nested records
///
/// Binary leaves become placeholders carrying their length. When `icon` is
/// given, the binary leaves of the first Icon Image Sequence item are also
/// written out as `GGGG_EEEE.bin` (`GGGG_EEEE_icon.bin` for its pixel data).
///
/// # Errors
///
/// Returns an error if an icon file cannot be written.
pub fn capture_sequences(
    obj: &InMemDicomObject,
    icon: Option<IconTarget<'_>>,
) -> Result<CapturedSequences> {
    let mut collector = SequenceCollector {
        icon,
        icon_data: BTreeMap::new(),
    };

    let mut sequence_data = BTreeMap::new();
    for (key, record) in walk_dataset(obj, &mut collector)? {
        sequence_data.insert(key, record.items.unwrap_or_default());
    }

    Ok(CapturedSequences {
        sequence_data,
        icon_data: collector.icon_data,
    })
}

struct SequenceCollector<'a> {
    icon: Option<IconTarget<'a>>,
    icon_data: BTreeMap<String, BinaryFileRecord>,
}

impl SequenceCollector<'_> {
    fn write_icon_leaf(&mut self, elem: &InMemElement) -> Result<()> {
        let Some(target) = &self.icon else {
            return Ok(());
        };

        let suffix = if elem.tag() == PIXEL_DATA { "_icon" } else { "" };
        let path = target
            .binary_dir
            .join(format!("{}{}.bin", tag_file_stem(elem.tag()), suffix));
        let bytes = binary_bytes(elem.value());
        fs::write(&path, &bytes)?;

        self.icon_data.insert(
            tag_key(elem.tag()),
            BinaryFileRecord {
                binary_file: relative_to(target.out_dir, &path),
                length: bytes.len(),
                vr: Some(elem.vr().to_string().to_owned()),
            },
        );
        Ok(())
    }
}

fn is_icon_item(path: &ItemPath) -> bool {
    matches!(path, [(tag, 0)] if *tag == ICON_IMAGE_SEQUENCE)
}

impl DatasetVisitor for SequenceCollector<'_> {
    type Output = (String, ElementRecord);

    fn leaf(
        &mut self,
        path: &ItemPath,
        elem: &InMemElement,
        class: ValueClass,
    ) -> Result<Option<Self::Output>> {
        // top-level leaves are the extractor's business
        if path.is_empty() {
            return Ok(None);
        }

        if class.is_binary() && is_icon_item(path) {
            self.write_icon_leaf(elem)?;
        }

        Ok(Some((tag_key(elem.tag()), element_record(elem, class))))
    }

    fn sequence(
        &mut self,
        _path: &ItemPath,
        elem: &InMemElement,
        items: Vec<Vec<Self::Output>>,
    ) -> Result<Option<Self::Output>> {
        let mut record = element_record(elem, ValueClass::Sequence);
        record.value = JsonValue::String(SEQUENCE_PLACEHOLDER.to_string());
        record.items_count = Some(items.len());
        record.items = Some(
            items
                .into_iter()
                .map(|item| item.into_iter().collect::<SequenceItem>())
                .collect(),
        );
        Ok(Some((tag_key(elem.tag()), record)))
    }
}
