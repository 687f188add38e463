//! Image processing pipeline: decode, resize, encode

mod decode;
mod encode;
mod transform;

pub use decode::{decode, sniff_format};
pub use encode::{
    compress_to_ico, compress_to_jpeg, compress_to_png, compress_to_webp, effective_webp_quality,
    encode, EncodeOptions, PngCompression, WEBP_MAX_QUALITY,
};
pub use transform::{clamp_for_ico, resize, ResizeMode, ICO_MAX_DIMENSION};

mod dpi;

use serde::{Deserialize, Serialize};

/// The closed set of output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Png,
    Jpeg,
    Jpg,
    WebP,
    Ico,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Jpg => "jpg",
            OutputFormat::WebP => "webp",
            OutputFormat::Ico => "ico",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpeg => "JPEG",
            OutputFormat::Jpg => "JPG",
            OutputFormat::WebP => "WebP",
            OutputFormat::Ico => "ICO",
        }
    }

    /// Whether DPI metadata can be embedded in the encoded stream
    pub fn supports_dpi(&self) -> bool {
        matches!(
            self,
            OutputFormat::Png | OutputFormat::Jpeg | OutputFormat::Jpg
        )
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug)]
pub struct ParseFormatError(String);

impl std::fmt::Display for ParseFormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("Unsupported output format: ")?;
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseFormatError {}

impl TryFrom<&str> for OutputFormat {
    type Error = ParseFormatError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" => Ok(OutputFormat::Jpeg),
            "jpg" => Ok(OutputFormat::Jpg),
            "webp" => Ok(OutputFormat::WebP),
            "ico" => Ok(OutputFormat::Ico),
            _ => Err(ParseFormatError(s.to_string())),
        }
    }
}
