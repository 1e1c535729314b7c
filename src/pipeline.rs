//! High-level processing pipeline.
//!
//! One invocation owns one [`ImageBuffer`] and produces exactly one terminal
//! outcome per operation: a [`MetadataReport`] from [`scan_metadata`], a
//! [`StrippedImage`] from [`strip_image`], or an error. The two outputs
//! share only the original byte buffer as input — neither depends on the
//! other. No state is shared between invocations, so concurrent pipelines
//! need no locking; if a caller races two invocations, ignoring the stale
//! result is the caller's job.
//!
//! Metadata scanning is synchronous over the in-memory buffer. The only
//! suspension points are the I/O boundaries: reading source bytes
//! ([`ImageBuffer::from_file`]) and the raster codec, which [`strip_image`]
//! runs on a blocking worker.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::ScrubError;
use crate::exif::{self, MetadataReport};
use crate::strip::{self, StrippedImage};

/// Supported image extensions for batch collection.
///
/// The metadata path only understands the JPEG container; the other formats
/// still go through the strip path, whose codec handles them.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// An in-memory image plus its declared identity.
///
/// Immutable once submitted; owned by one pipeline invocation and discarded
/// when its outputs have been consumed.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub bytes: Vec<u8>,
    /// Declared filename, used to derive the clean-copy name.
    pub name: String,
    /// Declared MIME type; informational, the codec sniffs the real format.
    pub mime_type: String,
}

impl ImageBuffer {
    pub fn new(bytes: Vec<u8>, name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            name: name.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Read a file into a buffer, deriving name and MIME type from the path.
    pub async fn from_file(path: &Path) -> Result<Self, ScrubError> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = mime_for_path(path).to_string();
        Ok(Self { bytes, name, mime_type })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// MIME type from a file extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        _ => "image/jpeg",
    }
}

/// Scan a buffer for EXIF metadata. Never fails.
///
/// A missing EXIF segment, an unrecognized byte order, and a fully corrupt
/// directory set all collapse to the same user-visible "no metadata" report;
/// the distinction is kept in debug logs only.
pub fn scan_metadata(buffer: &ImageBuffer) -> MetadataReport {
    let Some(block) = exif::find_metadata_block(&buffer.bytes) else {
        log::debug!("{}: no EXIF segment", buffer.name);
        return MetadataReport::no_metadata();
    };
    log::debug!(
        "{}: EXIF block at offset {}, {} bytes",
        buffer.name,
        block.offset,
        block.len
    );
    let dirs = exif::parse_directories(&buffer.bytes[block.offset..block.offset + block.len]);
    exif::build_report(&dirs)
}

/// Produce a metadata-free copy of the buffer.
///
/// Takes the buffer by value: the invocation owns it, and the codec work
/// moves to a blocking worker. Raster decode failure is the one error that
/// reaches the caller.
pub async fn strip_image(
    buffer: ImageBuffer,
    config: &Config,
) -> Result<StrippedImage, ScrubError> {
    let quality = config.strip.jpeg_quality;
    let suffix = config.strip.clean_suffix.clone();
    tokio::task::spawn_blocking(move || strip::strip_to_jpeg(&buffer, quality, &suffix)).await?
}

/// The result of processing one file: its report, and the clean copy if one
/// was requested and produced.
#[derive(Debug)]
pub struct ProcessResult {
    pub path: PathBuf,
    pub report: MetadataReport,
    pub stripped: Option<StrippedImage>,
    /// Where the clean copy was (or, under dry run, would be) written.
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
}

/// Read, scan, and optionally strip one file, writing the clean copy next
/// to the original (or into `output.directory`).
///
/// Parse-level problems never land in `error`; only I/O and codec failures
/// do. Under `output.dry_run` the strip still runs so the size delta can be
/// reported, but nothing is written.
pub async fn process_file(path: &Path, config: &Config, strip: bool) -> ProcessResult {
    let mut result = ProcessResult {
        path: path.to_path_buf(),
        report: MetadataReport::no_metadata(),
        stripped: None,
        output_path: None,
        error: None,
    };

    let buffer = match ImageBuffer::from_file(path).await {
        Ok(buffer) => buffer,
        Err(e) => {
            result.error = Some(format!("Failed to read file: {e}"));
            return result;
        }
    };

    result.report = scan_metadata(&buffer);

    if !strip {
        return result;
    }

    let stripped = match strip_image(buffer, config).await {
        Ok(stripped) => stripped,
        Err(e) => {
            result.error = Some(format!("Failed to strip: {e}"));
            return result;
        }
    };

    let output_path = output_path_for(path, &stripped.suggested_filename, config);
    if config.output.dry_run {
        log::info!(
            "dry run — would write {} ({} bytes)",
            output_path.display(),
            stripped.bytes.len()
        );
    } else if let Err(e) = tokio::fs::write(&output_path, &stripped.bytes).await {
        result.error = Some(format!("Failed to write {}: {e}", output_path.display()));
        return result;
    }

    result.output_path = Some(output_path);
    result.stripped = Some(stripped);
    result
}

/// Clean-copy destination: the configured output directory, or the source's.
fn output_path_for(source: &Path, filename: &str, config: &Config) -> PathBuf {
    match &config.output.directory {
        Some(dir) => Path::new(dir).join(filename),
        None => source
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(filename),
    }
}

/// Collect supported image files from a mix of file and directory paths.
///
/// Directories are walked recursively (following symlinks); unsupported
/// files are skipped with a warning.
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

/// Check if a file has a supported image extension.
fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
