//! Strip re-encoding — producing a metadata-free copy of an image.
//!
//! The guarantee here is structural, not scrub-based: the raster is fully
//! decoded to pixels (the decode path reads pixel data only, never ancillary
//! segments) and re-encoded as a fresh JPEG. Nothing from an EXIF, XMP, or
//! IPTC segment can survive into the output because the encoder is never
//! shown any of it.
//!
//! The trade-off is recompression: the operation is lossy on pixel fidelity
//! and the output can be larger than the input. Both facts are surfaced in
//! [`StrippedImage`] rather than hidden.

use image::codecs::jpeg::JpegEncoder;
use serde::Serialize;

use crate::error::ScrubError;
use crate::pipeline::ImageBuffer;

/// Re-encode quality used by the strip operation.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Suffix inserted before the extension of the suggested output filename.
pub const DEFAULT_CLEAN_SUFFIX: &str = "-clean";

/// Output of the strip re-encoder.
#[derive(Debug, Clone, Serialize)]
pub struct StrippedImage {
    /// The re-encoded JPEG bytes.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// `<original-stem><suffix>.jpg`.
    pub suggested_filename: String,
    /// `original size − output size`; negative when re-encoding grew the file.
    pub saved_bytes: i64,
    /// `round(saved_bytes / original size × 100)`.
    pub saved_percent: i32,
}

/// Decode the raster and re-encode it as a clean JPEG.
///
/// The only failure mode is the codec: an undecodable raster surfaces as
/// [`ScrubError::RasterDecode`] and leaves the original untouched. The
/// output is always JPEG regardless of the input container, so the
/// suggested filename always ends in `.jpg`.
pub fn strip_to_jpeg(
    buffer: &ImageBuffer,
    quality: u8,
    suffix: &str,
) -> Result<StrippedImage, ScrubError> {
    let decoded = image::load_from_memory(&buffer.bytes).map_err(ScrubError::RasterDecode)?;

    // JPEG has no alpha; flatten everything to RGB before encoding.
    let rgb = decoded.to_rgb8();

    let mut bytes = Vec::with_capacity(buffer.bytes.len());
    let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)
        .map_err(ScrubError::RasterEncode)?;

    let original_size = buffer.bytes.len() as i64;
    let saved_bytes = original_size - bytes.len() as i64;
    let saved_percent = if original_size == 0 {
        0
    } else {
        ((saved_bytes as f64 / original_size as f64) * 100.0).round() as i32
    };

    log::debug!(
        "{}: {} -> {} bytes ({saved_percent}%)",
        buffer.name,
        original_size,
        bytes.len()
    );

    Ok(StrippedImage {
        bytes,
        suggested_filename: suggested_filename(&buffer.name, suffix),
        saved_bytes,
        saved_percent,
    })
}

/// `photo.jpeg` → `photo-clean.jpg`; a name without a stem falls back to `image`.
fn suggested_filename(name: &str, suffix: &str) -> String {
    let stem = std::path::Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{stem}{suffix}.jpg")
}
