//! Rebuilding nested sequences from `SequenceData`
//!
//! Sequences are always written back with undefined length; the item
//! contents are what must survive.

use crate::error::{DcmSplitError, Result};
use crate::extraction::tags::{tag_key, ICON_IMAGE_SEQUENCE};
use crate::model::{BinaryFileRecord, ElementRecord, SequenceItem};
use crate::report::{Event, Reporter};
use dicom_core::value::DataSetSequence;
use dicom_core::{DataElement, Tag, VR};
use dicom_object::mem::InMemElement;
use dicom_object::InMemDicomObject;
use std::collections::BTreeMap;
use std::path::Path;

use super::elements::{record_tag, record_vr, restore_binary_element, restore_value_element};

/// Turns sequence records back into nested data sets
///
/// Elements that cannot be rebuilt are reported and left out of their
/// item; the rest of the item is kept.
pub struct ItemRebuilder<'a> {
    base_dir: &'a Path,
    icon_data: &'a BTreeMap<String, BinaryFileRecord>,
    reporter: &'a dyn Reporter,
    skipped: usize,
}

impl<'a> ItemRebuilder<'a> {
    pub fn new(
        base_dir: &'a Path,
        icon_data: &'a BTreeMap<String, BinaryFileRecord>,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            base_dir,
            icon_data,
            reporter,
            skipped: 0,
        }
    }

    /// Number of elements left out so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Rebuilds a whole sequence element
    pub fn sequence_element(&mut self, tag: Tag, items: &[SequenceItem]) -> InMemElement {
        let items = self.rebuild_items(tag, items, 0);
        DataElement::new(tag, VR::SQ, DataSetSequence::from(items))
    }

    /// Rebuilds the items of the sequence `seq_tag` found at `depth`
    ///
    /// Binary leaves are restored only in the first item of a top-level
    /// Icon Image Sequence, from the icon files.
    pub fn rebuild_items(
        &mut self,
        seq_tag: Tag,
        items: &[SequenceItem],
        depth: usize,
    ) -> Vec<InMemDicomObject> {
        let mut rebuilt = Vec::with_capacity(items.len());

        for (index, item) in items.iter().enumerate() {
            let is_icon = depth == 0 && index == 0 && seq_tag == ICON_IMAGE_SEQUENCE;
            let mut obj = InMemDicomObject::new_empty();

            for record in item.values() {
                match self.rebuild_record(record, is_icon, depth) {
                    Ok(elem) => {
                        obj.put(elem);
                    }
                    Err(e) => {
                        self.skipped += 1;
                        self.reporter.report(Event::ElementSkipped {
                            tag: record_tag(record),
                            reason: e.to_string(),
                        });
                    }
                }
            }
            rebuilt.push(obj);
        }

        rebuilt
    }

    fn rebuild_record(
        &mut self,
        record: &ElementRecord,
        is_icon: bool,
        depth: usize,
    ) -> Result<InMemElement> {
        let tag = record_tag(record);

        if record.is_sequence_placeholder() {
            let items = record.items.as_deref().unwrap_or_default();
            let nested = self.rebuild_items(tag, items, depth + 1);
            return Ok(DataElement::new(tag, VR::SQ, DataSetSequence::from(nested)));
        }

        if record.is_binary_placeholder() {
            let entry = self
                .icon_data
                .get(&tag_key(tag))
                .filter(|_| is_icon)
                .ok_or_else(|| {
                    DcmSplitError::restoration(tag, "binary value inside a sequence was not extracted")
                })?;
            return restore_binary_element(tag, record_vr(record)?, entry, self.base_dir);
        }

        restore_value_element(record)
    }
}
