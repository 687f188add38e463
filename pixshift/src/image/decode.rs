//! Image decoding

use image::{DynamicImage, ImageFormat};

use crate::error::{Error, Result};

/// Decode an image from memory
pub fn decode(data: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(data).map_err(classify)
}

/// Detect the container format from magic bytes
pub fn sniff_format(data: &[u8]) -> Result<ImageFormat> {
    image::guess_format(data).map_err(classify)
}

/// Containers the decoder does not handle (HEIC among them) are
/// unsupported formats; everything else is a corrupt source.
fn classify(err: image::ImageError) -> Error {
    match err {
        image::ImageError::Unsupported(unsupported) => {
            Error::UnsupportedFormat(unsupported.to_string())
        }
        other => Error::Decode(other),
    }
}
