//! Error kinds surfaced by the conversion pipeline

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Input or output format the pipeline does not handle
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Zero, negative, or out-of-range target dimensions
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Request-level invariant violation (empty size list, quality out
    /// of range)
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("destination not writable: {}", path.display())]
    UnwritableDestination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source image is corrupt or unreadable
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    /// Encoder rejected the image/format pairing
    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("clipboard does not hold an image: {0}")]
    Clipboard(String),
}

/// Failure modes of the URL downloader. Each is reported distinctly;
/// none is retried automatically.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("download timed out")]
    Timeout,

    #[error("server returned status {0}")]
    BadStatus(u16),

    #[error("URL does not point to an image (content type: {0})")]
    BadContentType(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("connection failed: {0}")]
    Transport(String),
}
