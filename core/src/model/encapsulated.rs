//! Item stream codec for encapsulated pixel data
//!
//! Compressed pixel data is held by dicom-rs as a basic offset table plus
//! a list of fragments. On disk it is the item stream that follows the
//! Pixel Data header: one `(FFFE,E000)` item for the offset table, then one
//! per fragment, each with a little endian 32-bit length. That stream is
//! what the pixel payload file holds.

use crate::error::{DcmSplitError, Result};

const ITEM_TAG: [u8; 4] = [0xFE, 0xFF, 0x00, 0xE0];
const SEQUENCE_DELIMITER_TAG: [u8; 4] = [0xFE, 0xFF, 0xDD, 0xE0];

/// Offset table and fragments of encapsulated pixel data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Encapsulated {
    pub offset_table: Vec<u32>,
    pub fragments: Vec<Vec<u8>>,
}

impl Encapsulated {
    /// Encodes the item stream (offset table item first, no delimiter)
    pub fn encode(&self) -> Vec<u8> {
        let table_len = self.offset_table.len() * 4;
        let fragments_len: usize = self.fragments.iter().map(|f| f.len() + 8).sum();
        let mut out = Vec::with_capacity(8 + table_len + fragments_len);

        out.extend_from_slice(&ITEM_TAG);
        out.extend_from_slice(&(table_len as u32).to_le_bytes());
        for offset in &self.offset_table {
            out.extend_from_slice(&offset.to_le_bytes());
        }

        for fragment in &self.fragments {
            out.extend_from_slice(&ITEM_TAG);
            out.extend_from_slice(&(fragment.len() as u32).to_le_bytes());
            out.extend_from_slice(fragment);
        }
        out
    }

    /// Decodes an item stream produced by [`Encapsulated::encode`]
    ///
    /// A trailing sequence delimitation item is accepted and ignored.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut items = Vec::new();
        let mut pos = 0;

        while pos < bytes.len() {
            let header = bytes
                .get(pos..pos + 8)
                .ok_or_else(|| invalid(format!("truncated item header at offset {}", pos)))?;
            let tag = &header[..4];
            let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
            pos += 8;

            if tag == SEQUENCE_DELIMITER_TAG {
                break;
            }
            if tag != ITEM_TAG {
                return Err(invalid(format!("unexpected item tag at offset {}", pos - 8)));
            }

            let body = bytes
                .get(pos..pos + len)
                .ok_or_else(|| invalid(format!("item at offset {} overruns payload", pos - 8)))?;
            items.push(body.to_vec());
            pos += len;
        }

        let mut items = items.into_iter();
        let table = items
            .next()
            .ok_or_else(|| invalid("missing basic offset table item".to_string()))?;
        if table.len() % 4 != 0 {
            return Err(invalid(format!(
                "basic offset table length {} is not a multiple of 4",
                table.len()
            )));
        }
        let offset_table = table
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();

        Ok(Self {
            offset_table,
            fragments: items.collect(),
        })
    }
}

fn invalid(reason: String) -> DcmSplitError {
    DcmSplitError::InvalidValue(format!("encapsulated pixel data: {}", reason))
}
