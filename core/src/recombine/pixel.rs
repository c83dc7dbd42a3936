use crate::error::Result;
use crate::extraction::tags::PIXEL_DATA;
use crate::model::{Encapsulated, ImageInfo};
use crate::model::value::primitive_from_le_bytes;
use crate::types::transfer_syntax::is_encapsulated;
use dicom_core::value::{PixelFragmentSequence, Value};
use dicom_core::{DataElement, VR};
use dicom_object::mem::InMemElement;

/// Builds the Pixel Data element from its payload
///
/// Encapsulated transfer syntaxes get their fragments back under OB;
/// native data is OW for samples wider than 8 bits and OB otherwise.
///
/// # Errors
///
/// Returns an error if an encapsulated payload is not a valid item stream.
pub fn pixel_element(payload: &[u8], transfer_syntax: &str, image: &ImageInfo) -> Result<InMemElement> {
    if is_encapsulated(transfer_syntax) {
        let Encapsulated {
            offset_table,
            fragments,
        } = Encapsulated::decode(payload)?;
        let sequence = PixelFragmentSequence::new(offset_table, fragments);
        return Ok(DataElement::new(PIXEL_DATA, VR::OB, Value::PixelSequence(sequence)));
    }

    // Not OW for every native payload: OW words need an even byte count,
    // and 8-bit samples are OB in the source files
    let vr = if image.bits_allocated > 8 && payload.len() % 2 == 0 {
        VR::OW
    } else {
        VR::OB
    };
    Ok(DataElement::new(PIXEL_DATA, vr, primitive_from_le_bytes(vr, payload)))
}
