pub mod config;
pub mod convert;
pub mod error;
pub mod image;
pub mod orchestrator;
pub mod output;
pub mod preview;
pub mod request;
pub mod size;
pub mod source;
pub mod units;

// Re-export commonly used types
pub use convert::{ConvertedImage, ItemReport};
pub use error::{Error, NetworkError, Result};
pub use image::{EncodeOptions, OutputFormat, PngCompression, ResizeMode};
pub use orchestrator::{BatchOutcome, CancelToken, JobState, ProgressEvent};
pub use request::{BatchPolicy, ConversionRequest};
pub use size::{ResolvedSize, SizePreset, SizeSpec};
pub use source::SourceImage;
pub use units::Unit;
