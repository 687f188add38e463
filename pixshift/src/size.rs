//! Requested output sizes: presets, custom dimensions, unit resolution

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::error::{Error, Result};
use crate::units::{self, Unit};

/// Hard cap on a requested axis, in pixels
pub const MAX_DIMENSION: u32 = 10_000;

/// Named size options offered to the user
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
pub enum SizePreset {
    Px16,
    Px32,
    Px48,
    Px128,
    Px150,
    Px192,
    Px512,
}

impl SizePreset {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    pub fn name(&self) -> &'static str {
        match self {
            SizePreset::Px16 => "16x16",
            SizePreset::Px32 => "32x32",
            SizePreset::Px48 => "48x48",
            SizePreset::Px128 => "128x128",
            SizePreset::Px150 => "150x150",
            SizePreset::Px192 => "192x192",
            SizePreset::Px512 => "512x512",
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            SizePreset::Px16 => (16, 16),
            SizePreset::Px32 => (32, 32),
            SizePreset::Px48 => (48, 48),
            SizePreset::Px128 => (128, 128),
            SizePreset::Px150 => (150, 150),
            SizePreset::Px192 => (192, 192),
            SizePreset::Px512 => (512, 512),
        }
    }
}

#[derive(Debug)]
pub struct ParsePresetError(String);

impl std::fmt::Display for ParsePresetError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("Invalid size preset: ")?;
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParsePresetError {}

impl TryFrom<&str> for SizePreset {
    type Error = ParsePresetError;

    fn try_from(s: &str) -> std::result::Result<Self, Self::Error> {
        match s {
            "16x16" => Ok(SizePreset::Px16),
            "32x32" => Ok(SizePreset::Px32),
            "48x48" => Ok(SizePreset::Px48),
            "128x128" => Ok(SizePreset::Px128),
            "150x150" => Ok(SizePreset::Px150),
            "192x192" => Ok(SizePreset::Px192),
            "512x512" => Ok(SizePreset::Px512),
            _ => Err(ParsePresetError(s.to_string())),
        }
    }
}

/// One requested output dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SizeSpec {
    /// Keep the source's native dimensions
    Original,
    Preset(SizePreset),
    Custom { width: f64, height: f64, unit: Unit },
}

/// A SizeSpec with units applied, ready for the resize engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedSize {
    Original,
    Exact { width: u32, height: u32 },
}

impl SizeSpec {
    /// Resolve to pixel dimensions through DPI
    pub fn resolve(&self, dpi: u16) -> Result<ResolvedSize> {
        match self {
            SizeSpec::Original => Ok(ResolvedSize::Original),
            SizeSpec::Preset(preset) => {
                let (width, height) = preset.dimensions();
                Ok(ResolvedSize::Exact { width, height })
            }
            SizeSpec::Custom {
                width,
                height,
                unit,
            } => {
                let width = units::to_pixels(*width, *unit, dpi)?;
                let height = units::to_pixels(*height, *unit, dpi)?;
                if width > MAX_DIMENSION || height > MAX_DIMENSION {
                    return Err(Error::InvalidDimension(format!(
                        "{width}x{height} exceeds the {MAX_DIMENSION} px per-axis limit"
                    )));
                }
                Ok(ResolvedSize::Exact { width, height })
            }
        }
    }
}

impl std::fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeSpec::Original => f.write_str("original"),
            SizeSpec::Preset(preset) => f.write_str(preset.name()),
            SizeSpec::Custom {
                width,
                height,
                unit,
            } => write!(f, "{width}x{height} {unit}"),
        }
    }
}
