//! Recursive traversal of a data set tree
//!
//! [`walk_dataset`] folds a data set bottom-up: leaves are handed to the
//! visitor as they are met, and each sequence is handed over after all of
//! its items have been folded, together with the per-item results. The
//! extractor builds its sequence records with it and the analyzer its
//! element sizes, so both agree on how an element is classified.

use crate::error::Result;
use crate::model::value::classify;
use crate::types::ValueClass;
use dicom_core::header::Header;
use dicom_core::value::Value;
use dicom_core::Tag;
use dicom_object::mem::InMemElement;
use dicom_object::InMemDicomObject;

/// Position of an element in the tree
///
/// Each entry is an enclosing sequence tag with the index of the item
/// the element lives in. Empty for top-level elements.
pub type ItemPath = [(Tag, usize)];

/// Callbacks for [`walk_dataset`]
pub trait DatasetVisitor {
    type Output;

    /// Called for every non-sequence element
    ///
    /// Returning `None` drops the element from the folded result.
    fn leaf(
        &mut self,
        path: &ItemPath,
        elem: &InMemElement,
        class: ValueClass,
    ) -> Result<Option<Self::Output>>;

    /// Called for every sequence element once its items are folded
    fn sequence(
        &mut self,
        path: &ItemPath,
        elem: &InMemElement,
        items: Vec<Vec<Self::Output>>,
    ) -> Result<Option<Self::Output>>;
}

/// Folds every element of `obj` with `visitor`, in data set order
pub fn walk_dataset<V: DatasetVisitor>(
    obj: &InMemDicomObject,
    visitor: &mut V,
) -> Result<Vec<V::Output>> {
    let mut path = Vec::new();
    walk_level(obj, visitor, &mut path)
}

fn walk_level<V: DatasetVisitor>(
    obj: &InMemDicomObject,
    visitor: &mut V,
    path: &mut Vec<(Tag, usize)>,
) -> Result<Vec<V::Output>> {
    let mut outputs = Vec::new();

    for elem in obj {
        let class = classify(elem);
        let folded = match (class, elem.value()) {
            (ValueClass::Sequence, Value::Sequence(seq)) => {
                let mut items = Vec::with_capacity(seq.items().len());
                for (index, item) in seq.items().iter().enumerate() {
                    path.push((elem.tag(), index));
                    let result = walk_level(item, visitor, path);
                    path.pop();
                    items.push(result?);
                }
                visitor.sequence(path.as_slice(), elem, items)?
            }
            (ValueClass::Sequence, _) => visitor.sequence(path.as_slice(), elem, Vec::new())?,
            _ => visitor.leaf(path.as_slice(), elem, class)?,
        };
        outputs.extend(folded);
    }

    Ok(outputs)
}
