//! DPI metadata embedding for encoded PNG and JPEG streams.
//!
//! The encoders themselves don't write physical density, so the pHYs
//! chunk (PNG) and JFIF density fields (JPEG) are patched into the
//! encoded bytes afterwards.

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

// signature + IHDR (length + type + 13 data bytes + crc)
const PNG_IHDR_END: usize = 8 + 4 + 4 + 13 + 4;

const INCHES_PER_METER: f64 = 39.370_078_740_157_48;

/// Insert a pHYs chunk right after IHDR.
///
/// Leaves the stream untouched if it doesn't start with a PNG
/// signature and IHDR chunk.
pub(super) fn embed_png_dpi(png: &mut Vec<u8>, dpi: u16) {
    if png.len() < PNG_IHDR_END
        || png[..8] != PNG_SIGNATURE
        || &png[12..16] != b"IHDR"
    {
        log::debug!("unexpected PNG layout, skipping pHYs chunk");
        return;
    }

    let pixels_per_meter = (f64::from(dpi) * INCHES_PER_METER).round() as u32;

    let mut chunk = Vec::with_capacity(21);
    chunk.extend_from_slice(&9u32.to_be_bytes());
    chunk.extend_from_slice(b"pHYs");
    chunk.extend_from_slice(&pixels_per_meter.to_be_bytes());
    chunk.extend_from_slice(&pixels_per_meter.to_be_bytes());
    chunk.push(1); // unit: meter

    // CRC covers the chunk type and data, not the length
    let crc = crc32fast::hash(&chunk[4..]);
    chunk.extend_from_slice(&crc.to_be_bytes());

    png.splice(PNG_IHDR_END..PNG_IHDR_END, chunk);
}

/// Rewrite the JFIF APP0 density fields to dots-per-inch.
///
/// Layout after SOI: APP0 marker (2), length (2), "JFIF\0" (5),
/// version (2), units (1), x density (2), y density (2).
pub(super) fn embed_jpeg_dpi(jpeg: &mut [u8], dpi: u16) {
    if jpeg.len() < 18
        || jpeg[..2] != [0xFF, 0xD8]
        || jpeg[2..4] != [0xFF, 0xE0]
        || &jpeg[6..11] != b"JFIF\0"
    {
        log::debug!("no JFIF APP0 header, skipping density patch");
        return;
    }

    let density = dpi.to_be_bytes();
    jpeg[13] = 1; // units: dots per inch
    jpeg[14..16].copy_from_slice(&density);
    jpeg[16..18].copy_from_slice(&density);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phys_chunk_lands_after_ihdr() {
        let img = image::DynamicImage::new_rgba8(4, 4);
        let mut buf = Vec::new();
        crate::image::compress_to_png(&img, &mut buf, crate::image::PngCompression::Default)
            .unwrap();

        embed_png_dpi(&mut buf, 300);
        assert_eq!(&buf[PNG_IHDR_END + 4..PNG_IHDR_END + 8], b"pHYs");
        // 300 dpi = 11811 pixels per meter
        assert_eq!(
            buf[PNG_IHDR_END + 8..PNG_IHDR_END + 12],
            11811u32.to_be_bytes()
        );

        // decoder still accepts the patched stream
        assert!(image::load_from_memory(&buf).is_ok());
    }

    #[test]
    fn jfif_density_is_patched_in_place() {
        let img = image::DynamicImage::new_rgb8(4, 4);
        let mut buf = Vec::new();
        crate::image::compress_to_jpeg(&img, &mut buf, 90).unwrap();

        embed_jpeg_dpi(&mut buf, 300);
        assert_eq!(buf[13], 1);
        assert_eq!(buf[14..16], 300u16.to_be_bytes());
        assert_eq!(buf[16..18], 300u16.to_be_bytes());
        assert!(image::load_from_memory(&buf).is_ok());
    }

    #[test]
    fn non_png_bytes_are_left_alone() {
        let mut data = b"not a png at all".to_vec();
        let before = data.clone();
        embed_png_dpi(&mut data, 300);
        assert_eq!(data, before);
    }
}
