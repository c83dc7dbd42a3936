//! Synthetic DICOM files for tests

use crate::extraction::tags::{ICON_IMAGE_SEQUENCE, PIXEL_DATA};
use crate::model::Encapsulated;
use crate::recombine::write_dicom_file;
use crate::types::transfer_syntax::{EXPLICIT_VR_LITTLE_ENDIAN, IMPLICIT_VR_LITTLE_ENDIAN};
use dicom_core::value::{DataSetSequence, PixelFragmentSequence, Value};
use dicom_core::{DataElement, PrimitiveValue, Tag, VR};
use dicom_object::meta::FileMetaTableBuilder;
use dicom_object::InMemDicomObject;
use std::path::{Path, PathBuf};

pub const JPEG_BASELINE: &str = "1.2.840.10008.1.2.4.50";
pub const CT_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.2";
pub const SOP_INSTANCE: &str = "1.2.826.0.1.3680043.8.498.1";

pub const SLICE_THICKNESS_TAG: Tag = Tag(0x0018, 0x0050);
pub const SPACING_TAG: Tag = Tag(0x0018, 0x0088);
pub const PRIVATE_CREATOR_TAG: Tag = Tag(0x0029, 0x0010);
pub const PRIVATE_BLOB_TAG: Tag = Tag(0x0029, 0x1010);
pub const PRIVATE_BLOB: &[u8] = &[0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01];

/// What the fixture file looks like
#[derive(Debug, Clone)]
pub struct FixtureOptions {
    /// Byte repeated over the preamble
    pub preamble_byte: u8,
    /// JPEG Baseline with encapsulated fragments instead of native pixels
    pub compressed: bool,
    /// Implicit VR little endian instead of explicit
    pub implicit_vr: bool,
    pub with_pixel_data: bool,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            preamble_byte: 0,
            compressed: false,
            implicit_vr: false,
            with_pixel_data: true,
        }
    }
}

fn put(obj: &mut InMemDicomObject, tag: Tag, vr: VR, value: PrimitiveValue) {
    obj.put(DataElement::new(tag, vr, value));
}

fn strs(values: &[&str]) -> PrimitiveValue {
    PrimitiveValue::Strs(values.iter().map(|s| s.to_string()).collect())
}

fn icon_item() -> InMemDicomObject {
    let mut icon = InMemDicomObject::new_empty();
    put(&mut icon, Tag(0x0028, 0x0002), VR::US, PrimitiveValue::from(1_u16));
    put(&mut icon, Tag(0x0028, 0x0004), VR::CS, PrimitiveValue::from("MONOCHROME2"));
    put(&mut icon, Tag(0x0028, 0x0010), VR::US, PrimitiveValue::from(4_u16));
    put(&mut icon, Tag(0x0028, 0x0011), VR::US, PrimitiveValue::from(4_u16));
    put(&mut icon, Tag(0x0028, 0x0100), VR::US, PrimitiveValue::from(8_u16));
    put(&mut icon, Tag(0x0028, 0x0101), VR::US, PrimitiveValue::from(8_u16));
    put(&mut icon, Tag(0x0028, 0x0102), VR::US, PrimitiveValue::from(7_u16));
    put(&mut icon, Tag(0x0028, 0x0103), VR::US, PrimitiveValue::from(0_u16));
    put(
        &mut icon,
        PIXEL_DATA,
        VR::OB,
        PrimitiveValue::U8((0..16_u8).map(|v| v * 16).collect()),
    );
    icon
}

fn referenced_item() -> InMemDicomObject {
    let mut item = InMemDicomObject::new_empty();
    put(&mut item, Tag(0x0008, 0x1150), VR::UI, PrimitiveValue::from(CT_IMAGE_STORAGE));
    put(&mut item, Tag(0x0008, 0x1155), VR::UI, PrimitiveValue::from("1.2.826.0.1.3680043.8.498.2"));
    item
}

/// The fixture data set: a 512×512 16-bit CT slice
pub fn fixture_dataset(options: &FixtureOptions) -> InMemDicomObject {
    let mut obj = InMemDicomObject::new_empty();
    put(&mut obj, Tag(0x0008, 0x0008), VR::CS, strs(&["ORIGINAL", "PRIMARY", "AXIAL"]));
    put(&mut obj, Tag(0x0008, 0x0016), VR::UI, PrimitiveValue::from(CT_IMAGE_STORAGE));
    put(&mut obj, Tag(0x0008, 0x0018), VR::UI, PrimitiveValue::from(SOP_INSTANCE));
    put(&mut obj, Tag(0x0008, 0x0060), VR::CS, PrimitiveValue::from("CT"));
    obj.put(DataElement::new(
        Tag(0x0008, 0x1140),
        VR::SQ,
        DataSetSequence::from(vec![referenced_item()]),
    ));
    put(&mut obj, Tag(0x0010, 0x0010), VR::PN, PrimitiveValue::from("Doe^Jane"));
    put(&mut obj, Tag(0x0010, 0x0020), VR::LO, PrimitiveValue::from("PID001"));
    put(&mut obj, SLICE_THICKNESS_TAG, VR::DS, PrimitiveValue::from("70"));
    put(&mut obj, SPACING_TAG, VR::DS, PrimitiveValue::from("1.0e-012"));
    put(
        &mut obj,
        Tag(0x0018, 0x9087),
        VR::FD,
        PrimitiveValue::F64([1000.5].into_iter().collect()),
    );
    put(&mut obj, Tag(0x0020, 0x0013), VR::IS, PrimitiveValue::from("7"));
    put(&mut obj, Tag(0x0028, 0x0002), VR::US, PrimitiveValue::from(1_u16));
    put(&mut obj, Tag(0x0028, 0x0004), VR::CS, PrimitiveValue::from("MONOCHROME2"));
    put(&mut obj, Tag(0x0028, 0x0010), VR::US, PrimitiveValue::from(512_u16));
    put(&mut obj, Tag(0x0028, 0x0011), VR::US, PrimitiveValue::from(512_u16));
    put(&mut obj, Tag(0x0028, 0x0030), VR::DS, strs(&["0.5", "0.5"]));
    put(&mut obj, Tag(0x0028, 0x0100), VR::US, PrimitiveValue::from(16_u16));
    put(&mut obj, Tag(0x0028, 0x0101), VR::US, PrimitiveValue::from(12_u16));
    put(&mut obj, Tag(0x0028, 0x0102), VR::US, PrimitiveValue::from(11_u16));
    put(&mut obj, Tag(0x0028, 0x0103), VR::US, PrimitiveValue::from(0_u16));
    put(&mut obj, Tag(0x0028, 0x1052), VR::DS, PrimitiveValue::from("-1024"));
    put(&mut obj, Tag(0x0028, 0x1053), VR::DS, PrimitiveValue::from("1"));
    put(&mut obj, PRIVATE_CREATOR_TAG, VR::LO, PrimitiveValue::from("DCMSPLIT TEST"));
    put(
        &mut obj,
        PRIVATE_BLOB_TAG,
        VR::OB,
        PrimitiveValue::U8(PRIVATE_BLOB.iter().copied().collect()),
    );
    put(&mut obj, Tag(0x0029, 0x1011), VR::LO, PrimitiveValue::from("private note"));
    obj.put(DataElement::new(
        ICON_IMAGE_SEQUENCE,
        VR::SQ,
        DataSetSequence::from(vec![icon_item()]),
    ));

    if options.with_pixel_data {
        if options.compressed {
            let fragments = vec![vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9]];
            obj.put(DataElement::new(
                PIXEL_DATA,
                VR::OB,
                Value::PixelSequence(PixelFragmentSequence::new(vec![0_u32], fragments)),
            ));
        } else {
            let pixels: Vec<u16> = (0..512 * 512).map(|i| (i % 4096) as u16).collect();
            put(&mut obj, PIXEL_DATA, VR::OW, PrimitiveValue::U16(pixels.into()));
        }
    }

    obj
}

/// Writes the fixture file `name` into `dir` and returns its path
pub fn write_fixture(dir: &Path, name: &str, options: &FixtureOptions) -> PathBuf {
    let transfer_syntax = if options.compressed {
        JPEG_BASELINE
    } else if options.implicit_vr {
        IMPLICIT_VR_LITTLE_ENDIAN
    } else {
        EXPLICIT_VR_LITTLE_ENDIAN
    };
    write_dataset(
        dir,
        name,
        transfer_syntax,
        options.preamble_byte,
        fixture_dataset(options),
    )
}

/// Writes `dataset` under the given transfer syntax with fixture meta
pub fn write_dataset(
    dir: &Path,
    name: &str,
    transfer_syntax: &str,
    preamble_byte: u8,
    dataset: InMemDicomObject,
) -> PathBuf {
    let meta = FileMetaTableBuilder::new()
        .media_storage_sop_class_uid(CT_IMAGE_STORAGE)
        .media_storage_sop_instance_uid(SOP_INSTANCE)
        .transfer_syntax(transfer_syntax)
        .implementation_class_uid("1.2.826.0.1.3680043.8.498")
        .implementation_version_name("DCMSPLIT01")
        .build()
        .expect("fixture meta");

    let file = dataset.with_exact_meta(meta);
    let path = dir.join(name);
    write_dicom_file(&path, &[preamble_byte; 128], &file).expect("fixture write");
    path
}

/// Item stream of the compressed fixture pixel data
pub fn compressed_payload() -> Vec<u8> {
    Encapsulated {
        offset_table: vec![0],
        fragments: vec![vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9]],
    }
    .encode()
}
