//! Physical unit to pixel conversion

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DPI_MIN: u16 = 72;
pub const DPI_MAX: u16 = 600;

const CM_PER_INCH: f64 = 2.54;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    Pixel,
    Cm,
    Inch,
}

impl Unit {
    pub fn name(&self) -> &'static str {
        match self {
            Unit::Pixel => "px",
            Unit::Cm => "cm",
            Unit::Inch => "in",
        }
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub fn validate_dpi(dpi: u16) -> Result<()> {
    if !(DPI_MIN..=DPI_MAX).contains(&dpi) {
        return Err(Error::InvalidDimension(format!(
            "DPI {dpi} outside supported range {DPI_MIN}-{DPI_MAX}"
        )));
    }
    Ok(())
}

/// Convert a length in the given unit to a whole pixel count.
///
/// Pixel values pass through unchanged; cm and inch are scaled by DPI
/// and rounded to the nearest pixel.
pub fn to_pixels(value: f64, unit: Unit, dpi: u16) -> Result<u32> {
    validate_dpi(dpi)?;

    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidDimension(format!(
            "length must be positive, got {value}"
        )));
    }

    let pixels = match unit {
        Unit::Pixel => value.round(),
        Unit::Cm => (value / CM_PER_INCH * f64::from(dpi)).round(),
        Unit::Inch => (value * f64::from(dpi)).round(),
    };

    if pixels < 1.0 {
        return Err(Error::InvalidDimension(format!(
            "{value} {unit} at {dpi} DPI rounds to zero pixels"
        )));
    }

    Ok(pixels as u32)
}
