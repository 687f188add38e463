//! Persisted application defaults.
//!
//! These only seed a fresh `ConversionRequest`; nothing reads them
//! during a conversion run.

use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::image::{OutputFormat, ResizeMode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Last directory the user saved into
    pub output_dir: Option<PathBuf>,
    pub format: OutputFormat,
    pub quality: u8,
    pub dpi: u16,
    pub resize_mode: ResizeMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            format: OutputFormat::Png,
            quality: 90,
            dpi: 300,
            resize_mode: ResizeMode::Stretch,
        }
    }
}

impl AppConfig {
    pub fn load() -> Option<Self> {
        let config_path = Self::config_path()?;

        fs::read_to_string(&config_path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
    }

    pub fn save(&self) -> Option<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).ok()?;
        }

        serde_json::to_string_pretty(self)
            .ok()
            .and_then(|json| fs::write(&config_path, json).ok())
    }

    fn config_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        Some(home.join(".config").join("pixshift").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_json() {
        let config = AppConfig {
            output_dir: Some(PathBuf::from("/tmp/out")),
            format: OutputFormat::WebP,
            quality: 75,
            dpi: 150,
            resize_mode: ResizeMode::Fit,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
