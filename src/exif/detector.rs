//! Container detection — locating the EXIF payload inside a JPEG.
//!
//! A JPEG file is a sequence of `FF xx` marker segments. EXIF metadata lives
//! in an APP1 (`FF E1`) segment whose payload starts with the signature
//! `Exif\0\0`, followed by a self-contained TIFF block. This module scans
//! the segment chain up to the start of entropy-coded image data and returns
//! the byte range of that TIFF block.
//!
//! Absence of metadata is a normal outcome here, not an error. Malformed
//! segment lengths (a declared length running past the end of the buffer)
//! are treated the same way: the detector gives up and reports "absent"
//! rather than failing the caller's pipeline.

/// Byte range of the TIFF payload inside the source buffer.
///
/// `offset` points past the `Exif\0\0` signature, so `bytes[offset..offset + len]`
/// is a complete TIFF block starting with the byte-order marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataBlock {
    pub offset: usize,
    pub len: usize,
}

const MARKER_PREFIX: u8 = 0xFF;
const SOI: u8 = 0xD8; // Start of image.
const EOI: u8 = 0xD9; // End of image.
const SOS: u8 = 0xDA; // Start of scan — entropy-coded data follows.
const APP1: u8 = 0xE1; // EXIF, XMP.
const RST0: u8 = 0xD0;
const RST7: u8 = 0xD7;
const TEM: u8 = 0x01;

const EXIF_SIGNATURE: &[u8] = b"Exif\0\0";

/// Markers that carry no length field.
fn is_standalone_marker(marker: u8) -> bool {
    matches!(marker, SOI | EOI | TEM) || (RST0..=RST7).contains(&marker)
}

/// Locate the EXIF payload inside a JPEG buffer.
///
/// Returns `None` when the buffer is not a JPEG, carries no EXIF APP1
/// segment before image data begins, or the segment chain is malformed.
pub fn find_metadata_block(data: &[u8]) -> Option<MetadataBlock> {
    if data.len() < 4 || data[0] != MARKER_PREFIX || data[1] != SOI {
        return None;
    }

    let mut pos = 2;
    while pos < data.len() {
        // Markers may be preceded by fill bytes (repeated 0xFF).
        if data[pos] != MARKER_PREFIX {
            log::debug!("lost marker sync at byte {pos}; treating as no metadata");
            return None;
        }
        while pos < data.len() && data[pos] == MARKER_PREFIX {
            pos += 1;
        }
        if pos >= data.len() {
            return None;
        }

        let marker = data[pos];
        pos += 1;

        // Image data (or end of image) — nothing after this can be EXIF.
        if marker == SOS || marker == EOI {
            return None;
        }

        if is_standalone_marker(marker) {
            continue;
        }

        // Segment length includes its own two bytes.
        if pos + 2 > data.len() {
            return None;
        }
        let seg_len = u16::from_be_bytes([data[pos], data[pos + 1]]) as usize;
        if seg_len < 2 || pos + seg_len > data.len() {
            log::debug!("segment {marker:#04x} declares length {seg_len} past end of buffer");
            return None;
        }

        if marker == APP1 {
            let payload = &data[pos + 2..pos + seg_len];
            if payload.len() > EXIF_SIGNATURE.len() && payload.starts_with(EXIF_SIGNATURE) {
                return Some(MetadataBlock {
                    offset: pos + 2 + EXIF_SIGNATURE.len(),
                    len: payload.len() - EXIF_SIGNATURE.len(),
                });
            }
            // APP1 can also carry XMP; keep scanning.
        }

        pos += seg_len;
    }

    None
}
