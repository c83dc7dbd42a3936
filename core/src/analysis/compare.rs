use crate::error::Result;
use crate::extraction::file_meta::meta_elements;
use crate::extraction::open_dicom;
use crate::extraction::tags::{tag_key, PIXEL_DATA};
use crate::model::value::{binary_bytes, classify};
use dicom_core::header::Header;
use dicom_core::value::Value;
use dicom_core::Tag;
use dicom_object::mem::InMemElement;
use dicom_object::InMemDicomObject;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// A data element whose normalized value differs between two files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueDifference {
    /// Location of the element, e.g. `(0008,1140)[0].(0008,1150)`
    pub path: String,
    pub tag: Tag,
    pub original: String,
    pub recombined: String,
}

/// Outcome of comparing an original file with its recombined copy
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparisonResult {
    pub original_file: PathBuf,
    pub recombined_file: PathBuf,
    pub original_size: u64,
    pub recombined_size: u64,
    /// Top-level tags only present in the original
    pub missing_tags: Vec<Tag>,
    /// Top-level tags only present in the recombined file
    pub extra_tags: Vec<Tag>,
    pub value_differences: Vec<ValueDifference>,
    pub pixel_data_identical: bool,
    pub meta_differences: Vec<String>,
    /// Every data set difference, nested ones included, in readable form
    pub data_differences: Vec<String>,
    pub is_identical: bool,
    pub error: Option<String>,
}

impl ComparisonResult {
    fn failed(original: &Path, recombined: &Path, reason: String) -> Self {
        Self {
            original_file: original.to_path_buf(),
            recombined_file: recombined.to_path_buf(),
            error: Some(reason),
            ..Self::default()
        }
    }

    /// Total number of differences found
    pub fn difference_count(&self) -> usize {
        self.meta_differences.len() + self.data_differences.len()
    }
}

/// Value text with trailing NUL and space padding removed
fn normalized(elem: &InMemElement) -> String {
    match elem.to_str() {
        Ok(text) => text.trim_end_matches(['\0', ' ']).to_string(),
        Err(_) => String::new(),
    }
}

/// Walks two data sets side by side and collects their differences
#[derive(Default)]
struct Differ {
    missing_tags: Vec<Tag>,
    extra_tags: Vec<Tag>,
    value_differences: Vec<ValueDifference>,
    data_differences: Vec<String>,
}

impl Differ {
    fn compare_level(
        &mut self,
        original: &InMemDicomObject,
        recombined: &InMemDicomObject,
        prefix: &str,
    ) {
        let tags = |obj: &InMemDicomObject| -> BTreeSet<Tag> {
            obj.iter()
                .map(|e| e.tag())
                .filter(|tag| *tag != PIXEL_DATA)
                .collect()
        };
        let original_tags = tags(original);
        let recombined_tags = tags(recombined);
        let top_level = prefix.is_empty();

        for tag in original_tags.difference(&recombined_tags) {
            if top_level {
                self.missing_tags.push(*tag);
            }
            self.data_differences
                .push(format!("{}{} missing from recombined file", prefix, tag_key(*tag)));
        }
        for tag in recombined_tags.difference(&original_tags) {
            if top_level {
                self.extra_tags.push(*tag);
            }
            self.data_differences
                .push(format!("{}{} only in recombined file", prefix, tag_key(*tag)));
        }

        for tag in original_tags.intersection(&recombined_tags) {
            if let (Ok(a), Ok(b)) = (original.element(*tag), recombined.element(*tag)) {
                self.compare_element(a, b, prefix);
            }
        }
    }

    fn compare_element(
        &mut self,
        original: &InMemElement,
        recombined: &InMemElement,
        prefix: &str,
    ) {
        let path = format!("{}{}", prefix, tag_key(original.tag()));

        match (original.value(), recombined.value()) {
            (Value::Sequence(a), Value::Sequence(b)) => {
                if a.items().len() != b.items().len() {
                    self.data_differences.push(format!(
                        "{}: {} items != {} items",
                        path,
                        a.items().len(),
                        b.items().len()
                    ));
                }
                for (index, (x, y)) in a.items().iter().zip(b.items()).enumerate() {
                    self.compare_level(x, y, &format!("{}[{}].", path, index));
                }
            }
            _ if classify(original).is_binary() || classify(recombined).is_binary() => {}
            _ => {
                let a = normalized(original);
                let b = normalized(recombined);
                if a != b {
                    self.data_differences.push(format!("{}: '{}' != '{}'", path, a, b));
                    self.value_differences.push(ValueDifference {
                        path,
                        tag: original.tag(),
                        original: a,
                        recombined: b,
                    });
                }
            }
        }
    }
}

fn pixel_bytes(obj: &InMemDicomObject) -> Option<Vec<u8>> {
    obj.element(PIXEL_DATA).ok().map(|e| binary_bytes(e.value()))
}

fn compare_files(original: &Path, recombined: &Path) -> Result<ComparisonResult> {
    let a = open_dicom(original)?;
    let b = open_dicom(recombined)?;

    let a_meta = meta_elements(a.meta());
    let b_meta = meta_elements(b.meta());
    let mut meta_differences = Vec::new();
    for element in &a_meta {
        match b_meta.iter().find(|other| other.tag == element.tag) {
            None => meta_differences.push(format!("{} missing", element.keyword())),
            // binary meta values are only checked for presence
            Some(other) => {
                if let (Some(a), Some(b)) = (element.value.as_text(), other.value.as_text()) {
                    if a != b {
                        meta_differences.push(format!("{}: '{}' != '{}'", element.keyword(), a, b));
                    }
                }
            }
        }
    }
    for element in b_meta.iter().filter(|e| !a_meta.iter().any(|o| o.tag == e.tag)) {
        meta_differences.push(format!("{} only in recombined file", element.keyword()));
    }

    let mut differ = Differ::default();
    differ.compare_level(&a, &b, "");

    let pixel_data_identical = match (pixel_bytes(&a), pixel_bytes(&b)) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    };

    let is_identical = pixel_data_identical
        && meta_differences.is_empty()
        && differ.data_differences.is_empty();

    Ok(ComparisonResult {
        original_file: original.to_path_buf(),
        recombined_file: recombined.to_path_buf(),
        original_size: fs::metadata(original)?.len(),
        recombined_size: fs::metadata(recombined)?.len(),
        missing_tags: differ.missing_tags,
        extra_tags: differ.extra_tags,
        value_differences: differ.value_differences,
        pixel_data_identical,
        meta_differences,
        data_differences: differ.data_differences,
        is_identical,
        error: None,
    })
}

/// Compares an original DICOM file with its recombined copy
///
/// Binary values are not compared, except Pixel Data which must match
/// byte for byte. Text is compared without trailing padding. Any failure
/// to read either file is reported in [`ComparisonResult::error`].
pub fn compare_dicom_files(original: &Path, recombined: &Path) -> ComparisonResult {
    match compare_files(original, recombined) {
        Ok(result) => result,
        Err(e) => {
            log::warn!(
                "Cannot compare {} with {}: {}",
                original.display(),
                recombined.display(),
                e
            );
            ComparisonResult::failed(original, recombined, e.to_string())
        }
    }
}
