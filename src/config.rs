//! Configuration file handling for id-verify.
//!
//! Loads configuration from `~/.config/id-verify/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::camera::{CameraSettings, Resolution};

/// Configuration file structure for id-verify.
/// Loaded from ~/.config/id-verify/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraSection,
    #[serde(default)]
    pub capture: CaptureSection,
    #[serde(default)]
    pub gemini: GeminiSection,
}

#[derive(Debug, Deserialize, Default)]
pub struct CameraSection {
    /// Device index override for the front camera
    pub front_device: Option<u32>,
    /// Device index override for the back camera
    pub back_device: Option<u32>,
    /// Preferred resolution as WIDTHxHEIGHT, e.g. "1280x720"
    pub resolution: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CaptureSection {
    /// JPEG quality for captured stills (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for CaptureSection {
    fn default() -> Self {
        Self {
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct GeminiSection {
    /// Model name override
    pub model: Option<String>,
}

fn default_jpeg_quality() -> u8 {
    85
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.clone(),
                source: e,
            })?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Build camera settings from the config, warning on a malformed
    /// resolution string rather than failing.
    pub fn camera_settings(&self) -> CameraSettings {
        let mut settings = CameraSettings {
            jpeg_quality: self.capture.jpeg_quality,
            front_device: self.camera.front_device,
            back_device: self.camera.back_device,
            ..CameraSettings::default()
        };
        if let Some(value) = &self.camera.resolution {
            match Resolution::parse(value) {
                Some(resolution) => settings.resolution = resolution,
                None => log::warn!("ignoring malformed resolution '{}' in config", value),
            }
        }
        settings
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        })
        .join("id-verify")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = Config::load(Some(Path::new("/nonexistent/id-verify.toml"))).unwrap();
        assert!(config.camera.front_device.is_none());
        assert!(config.camera.back_device.is_none());
        assert_eq!(config.capture.jpeg_quality, 85);
        assert!(config.gemini.model.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [camera]
            front_device = 1
            back_device = 0
            resolution = "640x480"

            [capture]
            jpeg_quality = 70

            [gemini]
            model = "gemini-custom"
            "#,
        )
        .unwrap();

        assert_eq!(config.camera.front_device, Some(1));
        assert_eq!(config.camera.back_device, Some(0));
        assert_eq!(config.capture.jpeg_quality, 70);
        assert_eq!(config.gemini.model.as_deref(), Some("gemini-custom"));

        let settings = config.camera_settings();
        assert_eq!(settings.resolution, Resolution::MEDIUM);
        assert_eq!(settings.jpeg_quality, 70);
        assert_eq!(settings.front_device, Some(1));
    }

    #[test]
    fn test_partial_config_uses_section_defaults() {
        let config: Config = toml::from_str("[camera]\nfront_device = 2\n").unwrap();
        assert_eq!(config.camera.front_device, Some(2));
        assert_eq!(config.capture.jpeg_quality, 85);
    }

    #[test]
    fn test_malformed_resolution_falls_back_to_default() {
        let config: Config = toml::from_str("[camera]\nresolution = \"bogus\"\n").unwrap();
        let settings = config.camera_settings();
        assert_eq!(settings.resolution, Resolution::default());
    }
}
