//! Value model: VR classification and element ⇄ document conversion
//!
//! Every element is assigned one [`ValueClass`]. The class decides how the
//! element is written to the metadata document and how it is read back:
//!
//! | Class | Document value | Rebuilt as |
//! |---|---|---|
//! | Plain | string, list of strings, or `null` | `Strs` / `Tags` |
//! | Numeric | number(s) + `original_format` literal(s) | typed numbers or `Strs` |
//! | Binary | `"BINARY_DATA"` + companion file | typed words from LE bytes |
//! | Sequence | `"SEQUENCE_DATA"` + `SequenceData` items | nested data sets |

use crate::error::{DcmSplitError, Result};
use crate::extraction::tags::{keyword_of, parse_tag_key, tag_key, is_private, PIXEL_DATA};
use crate::model::document::{ElementRecord, BINARY_PLACEHOLDER, SEQUENCE_PLACEHOLDER};
use crate::model::encapsulated::Encapsulated;
use crate::types::{FormattedNumber, ValueClass};
use dicom_core::header::Header;
use dicom_core::value::{PrimitiveValue, Value, C};
use dicom_core::{Tag, VR};
use dicom_object::mem::{InMemElement, InMemFragment};
use dicom_object::InMemDicomObject;
use serde_json::{Number, Value as JsonValue};

/// Whether a VR always holds opaque bytes
pub fn is_binary_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::OB | VR::OD | VR::OF | VR::OL | VR::OV | VR::OW | VR::UN
    )
}

/// Whether a VR holds numbers whose literal must be preserved
pub fn is_numeric_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::DS | VR::IS | VR::FL | VR::FD | VR::SL | VR::SS | VR::UL | VR::US | VR::SV | VR::UV
    )
}

/// Whether a VR is encoded as text
pub fn is_text_vr(vr: VR) -> bool {
    matches!(
        vr,
        VR::AE
            | VR::AS
            | VR::CS
            | VR::DA
            | VR::DS
            | VR::DT
            | VR::IS
            | VR::LO
            | VR::LT
            | VR::PN
            | VR::SH
            | VR::ST
            | VR::TM
            | VR::UC
            | VR::UI
            | VR::UR
            | VR::UT
    )
}

/// Classifies an element into its serialization strategy
///
/// Pixel Data always takes the dedicated pixel path, SQ is always a
/// sequence, opaque bytes are binary unless the VR is textual, and the
/// numeric VRs keep their literals.
pub fn classify(elem: &InMemElement) -> ValueClass {
    if elem.tag() == PIXEL_DATA {
        return ValueClass::PixelData;
    }
    match elem.value() {
        Value::Sequence(_) => ValueClass::Sequence,
        Value::PixelSequence(_) => ValueClass::Binary,
        Value::Primitive(value) => classify_primitive(elem.vr(), value),
    }
}

/// Classifies a primitive value under the given VR
pub fn classify_primitive(vr: VR, value: &PrimitiveValue) -> ValueClass {
    if vr == VR::SQ {
        ValueClass::Sequence
    } else if is_binary_vr(vr) {
        ValueClass::Binary
    } else if is_numeric_vr(vr) {
        ValueClass::Numeric
    } else if matches!(value, PrimitiveValue::U8(_)) && !is_text_vr(vr) {
        ValueClass::Binary
    } else {
        ValueClass::Plain
    }
}

/// Bytes of a binary value in little endian order
///
/// Encapsulated values are returned as their item stream.
pub fn binary_bytes(value: &Value<InMemDicomObject, InMemFragment>) -> Vec<u8> {
    match value {
        Value::Primitive(p) => primitive_le_bytes(p),
        Value::PixelSequence(seq) => Encapsulated {
            offset_table: seq.offset_table().to_vec(),
            fragments: seq.fragments().to_vec(),
        }
        .encode(),
        Value::Sequence(_) => Vec::new(),
    }
}

/// Bytes of a primitive value in little endian order
pub fn primitive_le_bytes(value: &PrimitiveValue) -> Vec<u8> {
    fn le<T: Copy, const N: usize>(values: &[T], f: impl Fn(T) -> [u8; N]) -> Vec<u8> {
        values.iter().flat_map(|v| f(*v)).collect()
    }

    match value {
        PrimitiveValue::Empty => Vec::new(),
        PrimitiveValue::U8(v) => v.to_vec(),
        PrimitiveValue::U16(v) => le(v, u16::to_le_bytes),
        PrimitiveValue::I16(v) => le(v, i16::to_le_bytes),
        PrimitiveValue::U32(v) => le(v, u32::to_le_bytes),
        PrimitiveValue::I32(v) => le(v, i32::to_le_bytes),
        PrimitiveValue::U64(v) => le(v, u64::to_le_bytes),
        PrimitiveValue::I64(v) => le(v, i64::to_le_bytes),
        PrimitiveValue::F32(v) => le(v, f32::to_le_bytes),
        PrimitiveValue::F64(v) => le(v, f64::to_le_bytes),
        other => other.to_bytes().into_owned(),
    }
}

/// Rebuilds a binary value from little endian bytes
///
/// Word-oriented VRs get their natural word type back so that big endian
/// transfer syntaxes re-encode them correctly.
pub fn primitive_from_le_bytes(vr: VR, bytes: &[u8]) -> PrimitiveValue {
    if bytes.is_empty() {
        return PrimitiveValue::Empty;
    }
    match vr {
        VR::OW if bytes.len() % 2 == 0 => PrimitiveValue::U16(
            bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect(),
        ),
        VR::OL if bytes.len() % 4 == 0 => PrimitiveValue::U32(
            bytes
                .chunks_exact(4)
                .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        VR::OF if bytes.len() % 4 == 0 => PrimitiveValue::F32(
            bytes
                .chunks_exact(4)
                .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        ),
        VR::OD if bytes.len() % 8 == 0 => PrimitiveValue::F64(
            bytes
                .chunks_exact(8)
                .map(|c| f64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                .collect(),
        ),
        VR::OV if bytes.len() % 8 == 0 => PrimitiveValue::U64(
            bytes
                .chunks_exact(8)
                .map(|c| u64::from_le_bytes([c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]]))
                .collect(),
        ),
        _ => PrimitiveValue::U8(bytes.iter().copied().collect()),
    }
}

/// Exact text of each value of a numeric element
///
/// Text VRs keep their string verbatim, binary VRs use the shortest
/// round-trip `Display` form.
pub fn numeric_literals(value: &PrimitiveValue) -> Vec<String> {
    fn display<T: ToString>(values: &[T]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    match value {
        PrimitiveValue::Empty => Vec::new(),
        PrimitiveValue::Strs(v) => v.to_vec(),
        PrimitiveValue::Str(s) => s.split('\\').map(str::to_string).collect(),
        PrimitiveValue::U8(v) => display(v),
        PrimitiveValue::U16(v) => display(v),
        PrimitiveValue::I16(v) => display(v),
        PrimitiveValue::U32(v) => display(v),
        PrimitiveValue::I32(v) => display(v),
        PrimitiveValue::U64(v) => display(v),
        PrimitiveValue::I64(v) => display(v),
        PrimitiveValue::F32(v) => display(v),
        PrimitiveValue::F64(v) => display(v),
        other => other.to_multi_str().to_vec(),
    }
}

/// JSON number for a literal: integers stay integers, the rest are floats
///
/// Returns the literal as a string when it is not a number at all.
fn literal_to_json(literal: &str) -> JsonValue {
    let trimmed = literal.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return JsonValue::Number(i.into());
    }
    if let Ok(u) = trimmed.parse::<u64>() {
        return JsonValue::Number(u.into());
    }
    match trimmed.parse::<f64>() {
        Ok(f) => Number::from_f64(f)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Err(_) => JsonValue::String(literal.to_string()),
    }
}

/// Collapses a list into a scalar when it holds a single value
fn scalar_or_list(mut values: Vec<JsonValue>) -> JsonValue {
    match values.len() {
        0 => JsonValue::Null,
        1 => values.remove(0),
        _ => JsonValue::Array(values),
    }
}

/// Document value of a plain element
pub fn plain_to_json(value: &PrimitiveValue) -> JsonValue {
    match value {
        PrimitiveValue::Empty => JsonValue::Null,
        PrimitiveValue::Tags(tags) => scalar_or_list(
            tags.iter()
                .map(|t| JsonValue::String(tag_key(*t)))
                .collect(),
        ),
        PrimitiveValue::U8(_) => JsonValue::String(value.to_str().into_owned()),
        other => scalar_or_list(
            other
                .to_multi_str()
                .iter()
                .map(|s| JsonValue::String(s.clone()))
                .collect(),
        ),
    }
}

/// Builds the document record of a non-sequence element
///
/// Binary values are replaced by the placeholder and their length.
pub fn element_record(elem: &InMemElement, class: ValueClass) -> ElementRecord {
    let tag = elem.tag();
    let mut record = ElementRecord {
        tag: [tag.group(), tag.element()],
        vr: elem.vr().to_string().to_owned(),
        keyword: keyword_of(tag),
        is_private: is_private(tag),
        value: JsonValue::Null,
        original_format: None,
        items_count: None,
        binary_length: None,
        items: None,
    };

    match (class, elem.value()) {
        (ValueClass::Binary | ValueClass::PixelData, value) => {
            record.value = JsonValue::String(BINARY_PLACEHOLDER.to_string());
            record.binary_length = Some(binary_bytes(value).len());
        }
        (ValueClass::Sequence, value) => {
            record.value = JsonValue::String(SEQUENCE_PLACEHOLDER.to_string());
            record.items_count = Some(value.items().map(|items| items.len()).unwrap_or(0));
        }
        (ValueClass::Numeric, Value::Primitive(value)) => {
            let literals = numeric_literals(value);
            record.value = scalar_or_list(literals.iter().map(|l| literal_to_json(l)).collect());
            record.original_format = match literals.len() {
                0 => None,
                _ => Some(scalar_or_list(
                    literals.into_iter().map(JsonValue::String).collect(),
                )),
            };
        }
        (_, Value::Primitive(value)) => {
            record.value = plain_to_json(value);
        }
        (_, _) => {
            record.value = JsonValue::String(BINARY_PLACEHOLDER.to_string());
        }
    }

    record
}

/// Parses bracketed list text such as `[1, 2.5]` or `['DERIVED', 'PRIMARY']`
///
/// Returns `None` when the text is not bracketed.
pub fn parse_bracketed_list(text: &str) -> Option<Vec<String>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(
        inner
            .split(',')
            .map(|part| {
                let part = part.trim();
                part.strip_prefix('\'')
                    .and_then(|p| p.strip_suffix('\''))
                    .or_else(|| part.strip_prefix('"').and_then(|p| p.strip_suffix('"')))
                    .unwrap_or(part)
                    .to_string()
            })
            .collect(),
    )
}

/// Flattens a document value into its list of components
///
/// Bracketed list text is expanded when `expand_brackets` is set.
fn json_components(value: &JsonValue, expand_brackets: bool) -> Vec<JsonValue> {
    match value {
        JsonValue::Null => Vec::new(),
        JsonValue::Array(values) => values.clone(),
        JsonValue::String(s) if expand_brackets => match parse_bracketed_list(s) {
            Some(parts) => parts.into_iter().map(JsonValue::String).collect(),
            None => vec![value.clone()],
        },
        other => vec![other.clone()],
    }
}

fn json_text(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

/// Formatted numbers of a numeric record, pairing values with literals
pub fn record_numbers(record: &ElementRecord) -> Vec<FormattedNumber> {
    let values = json_components(&record.value, true);
    let literals = record
        .original_format
        .as_ref()
        .map(|f| json_components(f, true))
        .unwrap_or_default();

    let count = values.len().max(literals.len());
    (0..count)
        .map(|i| {
            let literal = literals.get(i).or_else(|| values.get(i)).map(json_text);
            let literal = literal.unwrap_or_default();
            let value = match values.get(i) {
                Some(JsonValue::Number(n)) => n.as_f64(),
                Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .or_else(|| literal.trim().parse::<f64>().ok())
            .unwrap_or(f64::NAN);
            FormattedNumber::new(value, literal)
        })
        .collect()
}

fn parse_numbers<T: std::str::FromStr>(tag: Tag, texts: &[String]) -> Result<C<T>> {
    texts
        .iter()
        .map(|t| {
            t.trim().parse::<T>().map_err(|_| {
                DcmSplitError::restoration(tag, format!("'{}' is not a valid number", t))
            })
        })
        .collect()
}

/// Rebuilds the primitive value of a plain or numeric record
pub fn record_to_primitive(record: &ElementRecord, vr: VR) -> Result<PrimitiveValue> {
    let tag = Tag(record.tag[0], record.tag[1]);

    if record.value.is_null() && record.original_format.is_none() {
        return Ok(PrimitiveValue::Empty);
    }

    if is_numeric_vr(vr) {
        let texts: Vec<String> = record_numbers(record).iter().map(|n| n.render()).collect();
        if texts.is_empty() {
            return Ok(PrimitiveValue::Empty);
        }
        return Ok(match vr {
            VR::US => PrimitiveValue::U16(parse_numbers(tag, &texts)?),
            VR::SS => PrimitiveValue::I16(parse_numbers(tag, &texts)?),
            VR::UL => PrimitiveValue::U32(parse_numbers(tag, &texts)?),
            VR::SL => PrimitiveValue::I32(parse_numbers(tag, &texts)?),
            VR::UV => PrimitiveValue::U64(parse_numbers(tag, &texts)?),
            VR::SV => PrimitiveValue::I64(parse_numbers(tag, &texts)?),
            VR::FL => PrimitiveValue::F32(parse_numbers(tag, &texts)?),
            VR::FD => PrimitiveValue::F64(parse_numbers(tag, &texts)?),
            _ => PrimitiveValue::Strs(texts.into_iter().collect()),
        });
    }

    if vr == VR::AT {
        let tags: Option<C<Tag>> = json_components(&record.value, true)
            .iter()
            .map(|v| parse_tag_key(&json_text(v)))
            .collect();
        return tags
            .map(PrimitiveValue::Tags)
            .ok_or_else(|| DcmSplitError::restoration(tag, "invalid attribute tag value"));
    }

    let texts: C<String> = json_components(&record.value, vr == VR::CS)
        .iter()
        .map(json_text)
        .collect();
    if texts.is_empty() {
        return Ok(PrimitiveValue::Empty);
    }
    Ok(PrimitiveValue::Strs(texts))
}
