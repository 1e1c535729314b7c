use thiserror::Error;

/// Terminal failures a pipeline invocation can surface to the caller.
///
/// Metadata parse problems are recovered inside the EXIF walker and never
/// appear here — a clean, truncated, or garbled EXIF block all produce a
/// report. Only file I/O and the raster codec can abort an operation.
#[derive(Debug, Error)]
pub enum ScrubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode image raster: {0}")]
    RasterDecode(#[source] image::ImageError),

    #[error("failed to re-encode image: {0}")]
    RasterEncode(#[source] image::ImageError),

    #[error("re-encode worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, ScrubError>;
