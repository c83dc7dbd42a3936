//! Transfer syntax lookup backed by the dicom-rs registry
//!
//! A syntax counts as uncompressed when the registry knows it and it needs
//! no codec. Everything else, unknown UIDs included, counts as compressed.

use dicom::encoding::transfer_syntax::{Endianness, TransferSyntaxIndex};
use dicom::encoding::TransferSyntax;
use dicom::transfer_syntax::TransferSyntaxRegistry;

/// Implicit VR Little Endian, the DICOM default transfer syntax
pub const IMPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2";
/// Explicit VR Little Endian
pub const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
/// Explicit VR Big Endian (retired)
pub const EXPLICIT_VR_BIG_ENDIAN: &str = "1.2.840.10008.1.2.2";
/// Deflated Explicit VR Little Endian
pub const DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1.99";

/// Strips the trailing null padding UIDs may carry
pub fn normalize_uid(uid: &str) -> &str {
    uid.trim_end_matches(['\0', ' '])
}

/// Applies `f` to the registry entry of a transfer syntax
fn with_entry<T>(uid: &str, f: impl FnOnce(&TransferSyntax) -> T) -> Option<T> {
    TransferSyntaxRegistry.get(normalize_uid(uid)).map(f)
}

/// Whether the transfer syntax is known to the registry
pub fn is_known(uid: &str) -> bool {
    with_entry(uid, |_| ()).is_some()
}

/// Returns the display name of a transfer syntax
///
/// Codec-free syntaxes get an `(Uncompressed)` suffix. Unknown UIDs are
/// reported as `Unknown (<uid>)`.
pub fn transfer_syntax_name(uid: &str) -> String {
    with_entry(uid, |ts| {
        if ts.is_codec_free() {
            format!("{} (Uncompressed)", ts.name())
        } else {
            ts.name().to_string()
        }
    })
    .unwrap_or_else(|| format!("Unknown ({})", normalize_uid(uid)))
}

/// Whether pixel data under this transfer syntax is compressed
pub fn is_compressed(uid: &str) -> bool {
    !with_entry(uid, |ts| ts.is_codec_free()).unwrap_or(false)
}

/// Whether pixel data under this transfer syntax is stored as
/// encapsulated fragments rather than a native value
///
/// Deflate compresses the whole data set, so its pixel data stays native.
pub fn is_encapsulated(uid: &str) -> bool {
    is_compressed(uid) && normalize_uid(uid) != DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN
}

/// Whether the data set is encoded little endian
///
/// Unknown syntaxes are assumed little endian.
pub fn is_little_endian(uid: &str) -> bool {
    with_entry(uid, |ts| ts.endianness() == Endianness::Little).unwrap_or(true)
}

/// Whether the data set uses implicit VR encoding
///
/// The registry does not expose VR explicitness; Implicit VR Little
/// Endian is the only implicit syntax.
pub fn is_implicit_vr(uid: &str) -> bool {
    normalize_uid(uid) == IMPLICIT_VR_LITTLE_ENDIAN
}
