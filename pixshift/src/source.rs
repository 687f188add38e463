//! Input acquisition: local files, dropped payloads, clipboard, URLs.
//!
//! Every producer normalizes to a [`SourceImage`]: a decoded pixel
//! buffer plus the original file stem and detected container format.

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::error::{Error, NetworkError, Result};
use crate::output::safe_file_stem;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Some hosts refuse requests without a browser-looking agent
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Cap on downloaded payloads (64 MiB)
const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

const SUPPORTED_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "bmp", "webp", "gif", "ico", "tiff", "heic",
];

const FALLBACK_STEM: &str = "image";

/// A decoded input image. Immutable once created; the orchestrator
/// shares it read-only with the worker thread.
#[derive(Debug, Clone)]
pub struct SourceImage {
    image: DynamicImage,
    stem: String,
    format: ImageFormat,
}

impl SourceImage {
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn stem(&self) -> &str {
        &self.stem
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    /// Load from a local file. Also serves drag-and-drop payloads,
    /// which arrive as paths.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::UnsupportedFormat(extension));
        }

        let data = std::fs::read(path).map_err(|e| {
            Error::Decode(image::ImageError::IoError(e))
        })?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_STEM.to_string());

        Self::from_bytes(&data, &stem)
    }

    /// Decode an in-memory payload
    pub fn from_bytes(data: &[u8], stem: &str) -> Result<Self> {
        let format = crate::image::sniff_format(data)?;
        let image = crate::image::decode(data)?;

        log::debug!(
            "loaded {} ({:?}, {}x{})",
            stem,
            format,
            image.width(),
            image.height()
        );

        Ok(SourceImage {
            image,
            stem: safe_file_stem(stem),
            format,
        })
    }

    /// Grab the image currently on the system clipboard
    pub fn from_clipboard() -> Result<Self> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;
        let pasted = clipboard
            .get_image()
            .map_err(|e| Error::Clipboard(e.to_string()))?;

        let image = RgbaImage::from_raw(
            pasted.width as u32,
            pasted.height as u32,
            pasted.bytes.into_owned(),
        )
        .ok_or_else(|| Error::Clipboard("malformed clipboard pixel buffer".to_string()))?;

        Ok(SourceImage {
            image: DynamicImage::ImageRgba8(image),
            stem: "clipboard_image".to_string(),
            format: ImageFormat::Png,
        })
    }

    /// Download an image over HTTP(S). One attempt, no retries; each
    /// failure mode is reported distinctly.
    pub fn from_url(url: &str) -> Result<Self> {
        Self::from_url_with_timeout(url, DOWNLOAD_TIMEOUT)
    }

    /// [`from_url`](Self::from_url) with an explicit timeout
    pub fn from_url_with_timeout(url: &str, timeout: Duration) -> Result<Self> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(NetworkError::InvalidUrl(url.to_string()).into());
        }

        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        let response = agent
            .get(url)
            .set("User-Agent", USER_AGENT)
            .call()
            .map_err(classify_ureq_error)?;

        let content_type = response
            .header("content-type")
            .unwrap_or_default()
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if !content_type.starts_with("image/") {
            return Err(NetworkError::BadContentType(content_type).into());
        }

        let mut data = Vec::new();
        response
            .into_reader()
            .take(MAX_DOWNLOAD_BYTES)
            .read_to_end(&mut data)
            .map_err(|e| classify_io_error(&e))?;

        let stem = stem_from_url(url);
        log::info!("downloaded {} bytes from {url}", data.len());

        Self::from_bytes(&data, &stem)
    }
}

fn classify_ureq_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(code, _) => NetworkError::BadStatus(code).into(),
        ureq::Error::Transport(transport) => {
            if transport_is_timeout(&transport) {
                NetworkError::Timeout.into()
            } else {
                NetworkError::Transport(transport.to_string()).into()
            }
        }
    }
}

fn transport_is_timeout(transport: &ureq::Transport) -> bool {
    use std::error::Error as _;

    let mut source = transport.source();
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ) {
                return true;
            }
        }
        source = err.source();
    }
    false
}

fn classify_io_error(err: &std::io::Error) -> Error {
    match err.kind() {
        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock => {
            NetworkError::Timeout.into()
        }
        _ => NetworkError::Transport(err.to_string()).into(),
    }
}

/// Derive a file stem from the URL path, falling back to a fixed name
/// for extension-less URLs
fn stem_from_url(url: &str) -> String {
    let path = url
        .split(['?', '#'])
        .next()
        .unwrap_or(url)
        .rsplit('/')
        .next()
        .unwrap_or_default();

    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");

    if stem.is_empty() {
        "downloaded_image".to_string()
    } else {
        safe_file_stem(stem)
    }
}
