//! # exif-scrub
//!
//! Privacy-focused EXIF inspection and removal — report what metadata an
//! image carries (GPS position, camera identity, exposure settings) and
//! produce a clean copy with none of it.
//!
//! ## Quick Start
//!
//! The simplest way to use the library is through the pipeline module, which
//! handles the full read → scan → strip → write flow:
//!
//! ```rust,no_run
//! use exif_scrub::config::Config;
//! use exif_scrub::pipeline::{collect_images, process_file};
//! use std::path::PathBuf;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load(Some("config.json".as_ref()))?;
//!
//!     // Collect supported image files from paths (files or directories)
//!     let images = collect_images(&[PathBuf::from("./photos")]);
//!
//!     for path in &images {
//!         let result = process_file(path, &config, true).await;
//!
//!         if let Some(ref err) = result.error {
//!             eprintln!("Error processing {}: {err}", path.display());
//!             continue;
//!         }
//!         if result.report.has_sensitive_data {
//!             println!("{}: sensitive metadata found", path.display());
//!         }
//!         if let Some(ref out) = result.output_path {
//!             println!("  Clean copy: {}", out.display());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Lower-Level Usage
//!
//! The scan and strip stages can be driven individually on in-memory
//! buffers, which is how a caller that never touches the filesystem
//! (a server handling uploads, say) would use the crate:
//!
//! ```rust,no_run
//! use exif_scrub::config::Config;
//! use exif_scrub::pipeline::{scan_metadata, strip_image, ImageBuffer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bytes = std::fs::read("photo.jpg")?;
//!     let buffer = ImageBuffer::new(bytes, "photo.jpg", "image/jpeg");
//!
//!     // 1. Report what the image carries. This never fails: an image
//!     //    without metadata yields a single "no metadata" entry.
//!     let report = scan_metadata(&buffer);
//!     for entry in &report.entries {
//!         println!("{}: {}", entry.label, entry.value);
//!     }
//!
//!     // 2. Produce a metadata-free JPEG copy.
//!     let stripped = strip_image(buffer, &Config::default()).await?;
//!     std::fs::write(&stripped.suggested_filename, &stripped.bytes)?;
//!     println!("saved {} bytes ({}%)", stripped.saved_bytes, stripped.saved_percent);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Scan | Strip |
//! |--------|------|-------|
//! | JPEG (`.jpg`, `.jpeg`) | EXIF APP1 | re-encoded JPEG |
//! | PNG (`.png`) | no (reported as no metadata) | re-encoded JPEG |
//! | WebP (`.webp`) | no (reported as no metadata) | re-encoded JPEG |
//!
//! The strip output is always JPEG: the raster is decoded to pixels and
//! re-encoded from scratch, so no ancillary segment of the input can
//! survive into the output.
//!
//! ## Modules
//!
//! - [`config`] — Configuration types and loading/saving
//! - [`error`] — The crate error type
//! - [`exif`] — EXIF segment detection, TIFF/IFD parsing, tag interpretation, report building
//! - [`pipeline`] — High-level processing pipeline and image collection
//! - [`strip`] — Strip re-encoder producing metadata-free JPEG copies

pub mod config;
pub mod error;
pub mod exif;
pub mod pipeline;
pub mod strip;
