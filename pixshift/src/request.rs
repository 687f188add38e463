//! Conversion requests: all options made explicit, no ambient state

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::image::{OutputFormat, ResizeMode};
use crate::size::SizeSpec;
use crate::source::SourceImage;
use crate::units;

pub const QUALITY_MIN: u8 = 1;
pub const QUALITY_MAX: u8 = 100;

/// What the orchestrator does when a single size fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchPolicy {
    /// Abort the whole batch on the first per-item error
    FailFast,
    /// Record the error as a line item and keep going
    ContinueOnError,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        BatchPolicy::FailFast
    }
}

/// Everything a Convert or Preview action needs. Constructed fresh per
/// action; the source image is shared read-only with the worker.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source: Arc<SourceImage>,
    pub format: OutputFormat,
    pub sizes: Vec<SizeSpec>,
    pub quality: u8,
    pub dpi: u16,
    pub resize_mode: ResizeMode,
    pub policy: BatchPolicy,
}

impl ConversionRequest {
    pub fn new(source: SourceImage, format: OutputFormat, sizes: Vec<SizeSpec>) -> Self {
        ConversionRequest {
            source: Arc::new(source),
            format,
            sizes,
            quality: 90,
            dpi: 300,
            resize_mode: ResizeMode::Stretch,
            policy: BatchPolicy::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            return Err(Error::InvalidRequest(
                "at least one target size is required".to_string(),
            ));
        }
        if !(QUALITY_MIN..=QUALITY_MAX).contains(&self.quality) {
            return Err(Error::InvalidRequest(format!(
                "quality {} outside {QUALITY_MIN}-{QUALITY_MAX}",
                self.quality
            )));
        }
        units::validate_dpi(self.dpi)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size::SizePreset;

    fn source() -> SourceImage {
        let img = image::DynamicImage::new_rgb8(8, 8);
        let mut buf = Vec::new();
        crate::image::compress_to_png(&img, &mut buf, crate::image::PngCompression::Fast)
            .unwrap();
        SourceImage::from_bytes(&buf, "test").unwrap()
    }

    #[test]
    fn empty_size_list_is_invalid() {
        let request = ConversionRequest::new(source(), OutputFormat::Png, vec![]);
        assert!(matches!(
            request.validate(),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn quality_and_dpi_ranges_are_enforced() {
        let mut request = ConversionRequest::new(
            source(),
            OutputFormat::Png,
            vec![SizeSpec::Preset(SizePreset::Px128)],
        );
        assert!(request.validate().is_ok());

        request.quality = 0;
        assert!(request.validate().is_err());

        request.quality = 90;
        request.dpi = 30;
        assert!(request.validate().is_err());
    }
}
