//! Resize engine: stretch, crop, and fit against a target box

use fast_image_resize as fr;
use fr::images::Image as FrImage;
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Largest dimension the ICO container handles reliably
pub const ICO_MAX_DIMENSION: u32 = 256;

/// Policy for reconciling source aspect ratio with the target box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeMode {
    /// Scale to exact dimensions, may distort aspect ratio
    Stretch,
    /// Scale to cover the target box, center-crop the excess
    Crop,
    /// Scale to fit inside the target box, pad the remainder
    Fit,
}

impl ResizeMode {
    pub fn name(&self) -> &'static str {
        match self {
            ResizeMode::Stretch => "stretch",
            ResizeMode::Crop => "crop",
            ResizeMode::Fit => "fit",
        }
    }
}

impl std::fmt::Display for ResizeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Resize to exactly `width` x `height` according to `mode`.
///
/// `transparent_pad` selects the fill for Fit padding: transparent for
/// alpha-capable output formats, opaque white otherwise.
pub fn resize(
    img: &DynamicImage,
    width: u32,
    height: u32,
    mode: ResizeMode,
    transparent_pad: bool,
) -> Result<DynamicImage> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimension(format!(
            "target dimensions must be positive, got {width}x{height}"
        )));
    }

    let rgba = img.to_rgba8();
    let (src_width, src_height) = rgba.dimensions();

    let result = match mode {
        ResizeMode::Stretch => scale_exact(&rgba, width, height),
        ResizeMode::Crop => {
            let width_ratio = f64::from(width) / f64::from(src_width);
            let height_ratio = f64::from(height) / f64::from(src_height);
            let ratio = width_ratio.max(height_ratio);

            // Cover the box; ceil so the crop never runs short
            let scaled_width = ((f64::from(src_width) * ratio).ceil() as u32).max(width);
            let scaled_height = ((f64::from(src_height) * ratio).ceil() as u32).max(height);

            let scaled = scale_exact(&rgba, scaled_width, scaled_height);
            let x_offset = (scaled_width - width) / 2;
            let y_offset = (scaled_height - height) / 2;
            imageops::crop_imm(&scaled, x_offset, y_offset, width, height).to_image()
        }
        ResizeMode::Fit => {
            let width_ratio = f64::from(width) / f64::from(src_width);
            let height_ratio = f64::from(height) / f64::from(src_height);
            let ratio = width_ratio.min(height_ratio);

            let inner_width = ((f64::from(src_width) * ratio).round() as u32)
                .clamp(1, width);
            let inner_height = ((f64::from(src_height) * ratio).round() as u32)
                .clamp(1, height);

            let scaled = scale_exact(&rgba, inner_width, inner_height);

            let fill = if transparent_pad {
                Rgba([255, 255, 255, 0])
            } else {
                Rgba([255, 255, 255, 255])
            };
            let mut canvas = RgbaImage::from_pixel(width, height, fill);
            let x_offset = (width - inner_width) / 2;
            let y_offset = (height - inner_height) / 2;
            imageops::overlay(&mut canvas, &scaled, x_offset.into(), y_offset.into());
            canvas
        }
    };

    Ok(DynamicImage::ImageRgba8(result))
}

/// Shrink dimensions proportionally so both fit under the ICO cap
pub fn clamp_for_ico(width: u32, height: u32) -> (u32, u32) {
    if width <= ICO_MAX_DIMENSION && height <= ICO_MAX_DIMENSION {
        return (width, height);
    }

    if width > height {
        let scaled = (u64::from(height) * u64::from(ICO_MAX_DIMENSION) / u64::from(width)) as u32;
        (ICO_MAX_DIMENSION, scaled.max(1))
    } else {
        let scaled = (u64::from(width) * u64::from(ICO_MAX_DIMENSION) / u64::from(height)) as u32;
        (scaled.max(1), ICO_MAX_DIMENSION)
    }
}

fn scale_exact(img: &RgbaImage, target_width: u32, target_height: u32) -> RgbaImage {
    let (width, height) = img.dimensions();
    if (width, height) == (target_width, target_height) {
        return img.clone();
    }

    // Choose algorithm based on scaling direction
    let algorithm = if target_width < width || target_height < height {
        // Downscaling: Lanczos3 preserves detail
        fr::ResizeAlg::Convolution(fr::FilterType::Lanczos3)
    } else {
        // Upscaling: CatmullRom gives smoother results
        fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom)
    };

    let src_buffer = img.as_raw().clone();
    let src_image = FrImage::from_vec_u8(width, height, src_buffer, fr::PixelType::U8x4).unwrap();

    let mut dst_buffer =
        vec![0u8; target_width as usize * target_height as usize * 4];
    let mut dst_image =
        FrImage::from_slice_u8(target_width, target_height, &mut dst_buffer, fr::PixelType::U8x4)
            .unwrap();

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(
            &src_image,
            &mut dst_image,
            Some(&fr::ResizeOptions::new().resize_alg(algorithm)),
        )
        .unwrap();

    RgbaImage::from_raw(target_width, target_height, dst_buffer).unwrap()
}
