//! Conversion engine: one resize + encode operation per requested size

use crate::error::Result;
use crate::image::{self, clamp_for_ico, EncodeOptions, OutputFormat, ResizeMode};
use crate::size::ResolvedSize;
use crate::source::SourceImage;

/// One encoded output, ready for persistence or preview
#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub file_name: String,
    pub data: Vec<u8>,
    pub dimensions: (u32, u32),
    pub format: OutputFormat,
    pub notes: Vec<String>,
}

impl ConvertedImage {
    pub fn report(&self) -> ItemReport {
        ItemReport {
            file_name: self.file_name.clone(),
            dimensions: self.dimensions,
            encoded_len: self.data.len(),
            notes: self.notes.clone(),
        }
    }
}

/// Lightweight per-item summary published over the progress channel
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub file_name: String,
    pub dimensions: (u32, u32),
    pub encoded_len: usize,
    pub notes: Vec<String>,
}

/// Output files are named from the requested size, even when the
/// content was clamped afterwards (ICO).
pub fn output_file_name(stem: &str, size: ResolvedSize, format: OutputFormat) -> String {
    let extension = format.extension();
    match size {
        ResolvedSize::Original => format!("{stem}.{extension}"),
        ResolvedSize::Exact { width, height } => {
            format!("{stem}_{width}x{height}.{extension}")
        }
    }
}

/// Resize and encode a single size
pub fn convert_one(
    source: &SourceImage,
    size: ResolvedSize,
    mode: ResizeMode,
    opts: &EncodeOptions,
) -> Result<ConvertedImage> {
    let file_name = output_file_name(source.stem(), size, opts.format);
    let transparent_pad = matches!(opts.format, OutputFormat::Png | OutputFormat::Ico);
    let mut notes = Vec::new();

    let processed = match size {
        ResolvedSize::Original => {
            let (width, height) = source.dimensions();
            if opts.format == OutputFormat::Ico {
                let (clamped_width, clamped_height) = clamp_for_ico(width, height);
                if (clamped_width, clamped_height) != (width, height) {
                    notes.push(format!("downscaled to {clamped_width}x{clamped_height}"));
                    // proportional clamp, so stretch keeps the aspect ratio
                    image::resize(
                        source.image(),
                        clamped_width,
                        clamped_height,
                        ResizeMode::Stretch,
                        transparent_pad,
                    )?
                } else {
                    source.image().clone()
                }
            } else {
                source.image().clone()
            }
        }
        ResolvedSize::Exact { width, height } => {
            let (target_width, target_height) = if opts.format == OutputFormat::Ico {
                let clamped = clamp_for_ico(width, height);
                if clamped != (width, height) {
                    notes.push(format!("downscaled to {}x{}", clamped.0, clamped.1));
                }
                clamped
            } else {
                (width, height)
            };
            image::resize(source.image(), target_width, target_height, mode, transparent_pad)?
        }
    };

    let (data, mut encode_notes) = image::encode(&processed, opts)?;
    notes.append(&mut encode_notes);

    log::trace!("converted {file_name}");

    Ok(ConvertedImage {
        file_name,
        data,
        dimensions: (processed.width(), processed.height()),
        format: opts.format,
        notes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(width: u32, height: u32) -> SourceImage {
        let img = ::image::DynamicImage::new_rgb8(width, height);
        let mut buf = Vec::new();
        crate::image::compress_to_png(&img, &mut buf, crate::image::PngCompression::Fast)
            .unwrap();
        SourceImage::from_bytes(&buf, "sample").unwrap()
    }

    fn opts(format: OutputFormat) -> EncodeOptions {
        EncodeOptions {
            format,
            quality: 90,
            dpi: 300,
        }
    }

    #[test]
    fn names_follow_requested_size() {
        assert_eq!(
            output_file_name(
                "cat",
                ResolvedSize::Exact {
                    width: 128,
                    height: 128
                },
                OutputFormat::WebP
            ),
            "cat_128x128.webp"
        );
        assert_eq!(
            output_file_name("cat", ResolvedSize::Original, OutputFormat::Png),
            "cat.png"
        );
    }

    #[test]
    fn ico_request_above_cap_is_downscaled_and_noted() {
        let converted = convert_one(
            &source(800, 800),
            ResolvedSize::Exact {
                width: 512,
                height: 512,
            },
            ResizeMode::Stretch,
            &opts(OutputFormat::Ico),
        )
        .unwrap();

        assert_eq!(converted.dimensions, (256, 256));
        assert_eq!(converted.file_name, "sample_512x512.ico");
        assert!(converted
            .notes
            .iter()
            .any(|note| note.contains("downscaled to 256x256")));
    }

    #[test]
    fn original_size_passes_through() {
        let converted = convert_one(
            &source(64, 48),
            ResolvedSize::Original,
            ResizeMode::Stretch,
            &opts(OutputFormat::Png),
        )
        .unwrap();

        assert_eq!(converted.dimensions, (64, 48));
        assert_eq!(converted.file_name, "sample.png");
        assert!(converted.notes.is_empty());
    }

    #[test]
    fn exact_size_is_honored() {
        let converted = convert_one(
            &source(200, 100),
            ResolvedSize::Exact {
                width: 50,
                height: 50,
            },
            ResizeMode::Crop,
            &opts(OutputFormat::Jpg),
        )
        .unwrap();
        assert_eq!(converted.dimensions, (50, 50));
    }
}
