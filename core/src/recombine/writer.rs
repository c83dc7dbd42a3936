use crate::error::{DcmSplitError, Result};
use crate::types::transfer_syntax::{is_known, normalize_uid};
use dicom_object::{FileDicomObject, InMemDicomObject};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes a complete DICOM file with the given preamble
///
/// Layout: preamble, `DICM`, file meta group, then the data set encoded in
/// the transfer syntax named by the meta group.
///
/// # Errors
///
/// Returns [`DcmSplitError::UnsupportedTransferSyntax`] when the encoder
/// does not know the transfer syntax, or a write error.
pub fn write_dicom_file(
    path: &Path,
    preamble: &[u8; 128],
    file: &FileDicomObject<InMemDicomObject>,
) -> Result<()> {
    let ts = normalize_uid(&file.meta().transfer_syntax);
    if !is_known(ts) {
        return Err(DcmSplitError::UnsupportedTransferSyntax(ts.to_string()));
    }

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(preamble)?;
    writer.write_all(b"DICM")?;
    file.write_meta(&mut writer)?;
    file.write_dataset(&mut writer)?;
    writer.flush()?;
    Ok(())
}
