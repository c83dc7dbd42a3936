use crate::error::Result;
use crate::extraction::file_meta::meta_elements;
use crate::extraction::tags::{is_private, keyword_of, tag_key};
use crate::extraction::{file_transfer_syntax, open_dicom};
use crate::model::value::binary_bytes;
use crate::model::{walk_dataset, DatasetVisitor, ItemPath};
use crate::types::transfer_syntax::is_implicit_vr;
use crate::types::{TagCategory, ValueClass};
use dicom_core::header::{HasLength, Header};
use dicom_core::value::Value;
use dicom_core::VR;
use dicom_object::mem::InMemElement;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Item and delimitation headers are always 8 bytes
const ITEM_HEADER_LEN: u64 = 8;

/// Encoded size of one top-level element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSize {
    pub tag: String,
    pub name: String,
    pub size: u64,
}

/// Byte accounting of a file by tag category
#[derive(Debug, Clone, PartialEq)]
pub struct TagSizeAnalysis {
    pub file_path: PathBuf,
    pub file_size: u64,
    /// Elements of each category, largest first
    pub categories: BTreeMap<TagCategory, Vec<TagSize>>,
    pub total_tag_size: u64,
    /// Bytes not attributed to any element: preamble, magic code, padding
    pub overhead: i64,
}

impl TagSizeAnalysis {
    /// Sum of the element sizes of a category
    pub fn category_total(&self, category: TagCategory) -> u64 {
        self.categories
            .get(&category)
            .map(|tags| tags.iter().map(|t| t.size).sum())
            .unwrap_or(0)
    }

    /// Share of the file taken by a category, in percent
    pub fn category_percent(&self, category: TagCategory) -> f64 {
        if self.file_size == 0 {
            return 0.0;
        }
        self.category_total(category) as f64 * 100.0 / self.file_size as f64
    }
}

/// Size of an element header under the given encoding
pub fn header_len(vr: VR, implicit_vr: bool) -> u64 {
    if implicit_vr {
        return 8;
    }
    match vr {
        VR::OB
        | VR::OD
        | VR::OF
        | VR::OL
        | VR::OV
        | VR::OW
        | VR::SQ
        | VR::SV
        | VR::UC
        | VR::UN
        | VR::UR
        | VR::UT
        | VR::UV => 12,
        _ => 8,
    }
}

/// Computes encoded element sizes bottom-up and buckets the top-level ones
struct SizeCollector {
    implicit_vr: bool,
    categories: BTreeMap<TagCategory, Vec<TagSize>>,
}

impl SizeCollector {
    fn record(&mut self, path: &ItemPath, elem: &InMemElement, class: ValueClass, size: u64) {
        if !path.is_empty() {
            return;
        }
        let tag = elem.tag();
        let category = match class {
            ValueClass::Sequence => TagCategory::Sequences,
            ValueClass::PixelData => TagCategory::PixelData,
            ValueClass::Binary => TagCategory::Binary,
            _ if is_private(tag) => TagCategory::Private,
            _ => TagCategory::Standard,
        };
        self.categories.entry(category).or_default().push(TagSize {
            tag: tag_key(tag),
            name: keyword_of(tag),
            size,
        });
    }

    fn header(&self, elem: &InMemElement) -> u64 {
        header_len(elem.vr(), self.implicit_vr)
    }
}

impl DatasetVisitor for SizeCollector {
    type Output = u64;

    fn leaf(
        &mut self,
        path: &ItemPath,
        elem: &InMemElement,
        class: ValueClass,
    ) -> Result<Option<u64>> {
        let value_len = match (elem.length().get(), elem.value()) {
            (Some(len), _) => len as u64,
            // encapsulated item stream plus the sequence delimiter
            (None, value @ Value::PixelSequence(_)) => {
                binary_bytes(value).len() as u64 + ITEM_HEADER_LEN
            }
            (None, Value::Primitive(p)) => p.calculate_byte_len() as u64,
            (None, Value::Sequence(_)) => 0,
        };
        let size = self.header(elem) + value_len;
        self.record(path, elem, class, size);
        Ok(Some(size))
    }

    fn sequence(
        &mut self,
        path: &ItemPath,
        elem: &InMemElement,
        items: Vec<Vec<u64>>,
    ) -> Result<Option<u64>> {
        let value_len = match elem.length().get() {
            Some(len) => len as u64,
            None => {
                items
                    .iter()
                    .map(|item| ITEM_HEADER_LEN + item.iter().sum::<u64>() + ITEM_HEADER_LEN)
                    .sum::<u64>()
                    + ITEM_HEADER_LEN
            }
        };
        let size = self.header(elem) + value_len;
        self.record(path, elem, ValueClass::Sequence, size);
        Ok(Some(size))
    }
}

/// Attributes the bytes of a DICOM file to its top-level elements
///
/// File meta elements count as standard tags. Whatever is left over,
/// preamble and magic code included, is reported as overhead.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn analyze_tag_sizes(path: &Path) -> Result<TagSizeAnalysis> {
    let obj = open_dicom(path)?;
    let file_size = fs::metadata(path)?.len();

    let mut collector = SizeCollector {
        implicit_vr: is_implicit_vr(&file_transfer_syntax(&obj)),
        categories: BTreeMap::new(),
    };

    let mut meta_total = 0;
    let standard = collector.categories.entry(TagCategory::Standard).or_default();
    for element in meta_elements(obj.meta()) {
        meta_total += element.encoded_size() as u64;
        standard.push(TagSize {
            tag: tag_key(element.tag),
            name: element.keyword(),
            size: element.encoded_size() as u64,
        });
    }

    let sizes = walk_dataset(&obj, &mut collector)?;
    let mut categories = collector.categories;
    for tags in categories.values_mut() {
        tags.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.tag.cmp(&b.tag)));
    }

    let total_tag_size = meta_total + sizes.iter().sum::<u64>();

    Ok(TagSizeAnalysis {
        file_path: path.to_path_buf(),
        file_size,
        categories,
        total_tag_size,
        overhead: file_size as i64 - total_tag_size as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{write_fixture, FixtureOptions, PRIVATE_BLOB_TAG};
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case(VR::OB, false, 12)]
    #[case(VR::SQ, false, 12)]
    #[case(VR::UT, false, 12)]
    #[case(VR::US, false, 8)]
    #[case(VR::DS, false, 8)]
    #[case(VR::OB, true, 8)]
    fn test_header_len(#[case] vr: VR, #[case] implicit: bool, #[case] expected: u64) {
        assert_eq!(header_len(vr, implicit), expected);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn test_sizes_account_for_file(#[case] implicit_vr: bool) {
        let dir = TempDir::new().unwrap();
        let fixture = FixtureOptions {
            implicit_vr,
            ..FixtureOptions::default()
        };
        let path = write_fixture(dir.path(), "scan.dcm", &fixture);
        let analysis = analyze_tag_sizes(&path).unwrap();

        let by_category: u64 = TagCategory::ALL
            .iter()
            .map(|c| analysis.category_total(*c))
            .sum();
        assert_eq!(by_category, analysis.total_tag_size);
        assert_eq!(
            analysis.total_tag_size as i64 + analysis.overhead,
            analysis.file_size as i64
        );
        // preamble and magic code, nothing else is unattributed
        assert!((0..=132).contains(&analysis.overhead), "{}", analysis.overhead);
    }

    #[test]
    fn test_categories() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(dir.path(), "scan.dcm", &FixtureOptions::default());
        let analysis = analyze_tag_sizes(&path).unwrap();

        assert_eq!(analysis.category_total(TagCategory::PixelData), 524_288 + 12);

        let binary = &analysis.categories[&TagCategory::Binary];
        assert_eq!(binary.len(), 1);
        assert_eq!(binary[0].tag, tag_key(PRIVATE_BLOB_TAG));
        assert_eq!(binary[0].size, 12 + 6);

        let sequences = &analysis.categories[&TagCategory::Sequences];
        assert_eq!(sequences.len(), 2);
        assert!(sequences[0].size >= sequences[1].size);

        let private = &analysis.categories[&TagCategory::Private];
        assert!(private.iter().all(|t| t.tag.starts_with("(0029,")));
        assert_eq!(private.len(), 2);

        let standard = &analysis.categories[&TagCategory::Standard];
        assert!(standard.iter().any(|t| t.name == "TransferSyntaxUID"));
        assert!(standard.iter().any(|t| t.name == "PatientName"));
    }

    #[test]
    fn test_unreadable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("x.dcm");
        fs::write(&path, b"not dicom").unwrap();
        assert!(analyze_tag_sizes(&path).is_err());
    }
}
