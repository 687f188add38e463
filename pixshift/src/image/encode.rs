//! Format encoders: PNG, JPEG, WebP, ICO

use image::{DynamicImage, ExtendedColorType, RgbImage};
use serde::{Deserialize, Serialize};
use webp::WebPMemory;

use super::{dpi, OutputFormat, ICO_MAX_DIMENSION};
use crate::error::{Error, Result};

/// WebP quality is capped for encode speed regardless of the request
pub const WEBP_MAX_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PngCompression {
    Fast,
    Default,
    Best,
}

impl PngCompression {
    /// Map the 1-100 quality scale onto compression effort: higher
    /// quality means less compression and a larger file.
    pub fn from_quality(quality: u8) -> Self {
        if quality >= 90 {
            PngCompression::Fast
        } else if quality >= 70 {
            PngCompression::Default
        } else {
            PngCompression::Best
        }
    }
}

/// Encoder settings shared by every size in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub format: OutputFormat,
    pub quality: u8,
    pub dpi: u16,
}

pub fn effective_webp_quality(quality: u8) -> u8 {
    quality.min(WEBP_MAX_QUALITY)
}

/// Compress an image to JPEG format with the specified quality
pub fn compress_to_jpeg<W>(img: &DynamicImage, writer: &mut W, quality: u8) -> Result<()>
where
    W: std::io::Write,
{
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);

    encoder
        .encode_image(img)
        .map_err(|e| Error::Encode(format!("JPEG: {e}")))
}

/// Compress an image to PNG format with the specified compression level
pub fn compress_to_png<W>(
    img: &DynamicImage,
    writer: &mut W,
    compression: PngCompression,
) -> Result<()>
where
    W: std::io::Write,
{
    use image::codecs::png::{CompressionType, FilterType, PngEncoder};
    use image::ImageEncoder;

    let compression_type = match compression {
        PngCompression::Fast => CompressionType::Fast,
        PngCompression::Default => CompressionType::Default,
        PngCompression::Best => CompressionType::Best,
    };

    let encoder = PngEncoder::new_with_quality(writer, compression_type, FilterType::Adaptive);

    encoder
        .write_image(
            img.as_bytes(),
            img.width(),
            img.height(),
            img.color().into(),
        )
        .map_err(|e| Error::Encode(format!("PNG: {e}")))
}

/// Compress an image to WebP format with the specified quality
pub fn compress_to_webp(img: &DynamicImage, quality: u8) -> Result<WebPMemory> {
    let img = DynamicImage::from(img.to_rgb8());
    let encoder = webp::Encoder::from_image(&img)
        .map_err(|e| Error::Encode(format!("WebP: {e}")))?;
    Ok(encoder.encode(f32::from(quality)))
}

/// Compress an image to ICO format. Dimensions must already be within
/// the 256x256 container limit.
pub fn compress_to_ico<W>(img: &DynamicImage, writer: &mut W) -> Result<()>
where
    W: std::io::Write,
{
    use image::codecs::ico::IcoEncoder;
    use image::ImageEncoder;

    let (width, height) = (img.width(), img.height());
    if width > ICO_MAX_DIMENSION || height > ICO_MAX_DIMENSION {
        return Err(Error::InvalidDimension(format!(
            "{width}x{height} exceeds the ICO limit of \
             {ICO_MAX_DIMENSION}x{ICO_MAX_DIMENSION}"
        )));
    }

    let rgba = img.to_rgba8();
    IcoEncoder::new(writer)
        .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(|e| Error::Encode(format!("ICO: {e}")))
}

/// Encode an image per the format policy table, normalizing color mode
/// first. Returns the encoded stream plus human-readable notes about
/// any adjustments made (capped quality, omitted metadata).
pub fn encode(img: &DynamicImage, opts: &EncodeOptions) -> Result<(Vec<u8>, Vec<String>)> {
    let (width, height) = (img.width(), img.height());
    let mut buffer = Vec::with_capacity((width * height) as usize);
    let mut notes = Vec::new();

    match opts.format {
        OutputFormat::Png => {
            let img = DynamicImage::ImageRgba8(img.to_rgba8());
            compress_to_png(&img, &mut buffer, PngCompression::from_quality(opts.quality))?;
            dpi::embed_png_dpi(&mut buffer, opts.dpi);
        }
        OutputFormat::Jpeg | OutputFormat::Jpg => {
            // JPEG rejects alpha; flatten onto white before encoding
            let img = DynamicImage::ImageRgb8(flatten_onto_white(img));
            compress_to_jpeg(&img, &mut buffer, opts.quality)?;
            dpi::embed_jpeg_dpi(&mut buffer, opts.dpi);
        }
        OutputFormat::WebP => {
            let quality = effective_webp_quality(opts.quality);
            if quality != opts.quality {
                notes.push(format!("quality capped at {WEBP_MAX_QUALITY}"));
            }
            // WebP carries no DPI metadata; omitted silently
            let webp_data = compress_to_webp(img, quality)?;
            buffer.extend_from_slice(&webp_data);
        }
        OutputFormat::Ico => {
            // quality and DPI are ignored for ICO
            compress_to_ico(img, &mut buffer)?;
        }
    }

    log::trace!(
        "encoded {width}x{height} as {}: {} bytes",
        opts.format,
        buffer.len()
    );

    Ok((buffer, notes))
}

fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (out, px) in rgb.pixels_mut().zip(rgba.pixels()) {
        let alpha = u16::from(px[3]);
        for channel in 0..3 {
            let blended = u16::from(px[channel]) * alpha + 255 * (255 - alpha);
            out[channel] = (blended / 255) as u8;
        }
    }
    rgb
}
