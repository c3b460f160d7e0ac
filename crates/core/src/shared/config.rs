use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    BASE_URL_ENV, COUNTDOWN_START, DEFAULT_BASE_URL, DEFAULT_CAMERA_DEVICE,
    DEFAULT_CAMERA_FORMAT, DEFAULT_JPEG_QUALITY, FLASH_DURATION, REQUEST_TIMEOUT, TICK_INTERVAL,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Capture device selection, passed through to libavdevice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Device path or name, e.g. `/dev/video0` or `0`.
    pub device: String,
    /// libavdevice input format; `None` picks the platform default.
    pub input_format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub framerate: Option<u32>,
    /// Serve this image instead of opening a device.
    pub still_image: Option<PathBuf>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: DEFAULT_CAMERA_DEVICE.to_string(),
            input_format: None,
            width: Some(1280),
            height: Some(720),
            framerate: None,
            still_image: None,
        }
    }
}

impl CameraConfig {
    pub fn input_format(&self) -> &str {
        self.input_format.as_deref().unwrap_or(DEFAULT_CAMERA_FORMAT)
    }
}

/// Kiosk settings. Every field has a default so partial files are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    /// Root of the scoring service; endpoint paths are joined onto it.
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub countdown_start: u32,
    pub tick_interval_ms: u64,
    pub flash_duration_ms: u64,
    pub jpeg_quality: u8,
    pub camera: CameraConfig,
    /// Static headers sent with every request (e.g. tunnel bypass headers).
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT.as_secs(),
            countdown_start: COUNTDOWN_START,
            tick_interval_ms: TICK_INTERVAL.as_millis() as u64,
            flash_duration_ms: FLASH_DURATION.as_millis() as u64,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            camera: CameraConfig::default(),
            extra_headers: BTreeMap::new(),
        }
    }
}

impl KioskConfig {
    /// `~/.config/SmileBooth/config.json` or the platform equivalent.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|d| d.join("SmileBooth").join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Loads the default config file, falling back to defaults when it is
    /// missing or unreadable.
    pub fn load() -> Self {
        let Ok(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config file: {e}");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        fs::write(path, json).map_err(|e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Applies `SMILEBOOTH_BASE_URL` when set and non-empty.
    pub fn apply_env(&mut self) {
        self.apply_base_url_override(std::env::var(BASE_URL_ENV).ok());
    }

    fn apply_base_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|v| !v.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url '{}': {e}", self.base_url)))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Invalid(format!(
                "base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".into(),
            ));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be positive".into()));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn flash_duration(&self) -> Duration {
        Duration::from_millis(self.flash_duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = KioskConfig::default();
        assert_eq!(config.countdown_start, 3);
        assert_eq!(config.tick_interval(), Duration::from_millis(1000));
        assert_eq!(config.flash_duration(), Duration::from_millis(200));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.json");
        let mut config = KioskConfig::default();
        config.base_url = "https://scores.example.com/".into();
        config
            .extra_headers
            .insert("ngrok-skip-browser-warning".into(), "false".into());

        config.save_to(&path).unwrap();
        let loaded = KioskConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{ "base_url": "http://10.0.0.2:9000/" }"#).unwrap();

        let loaded = KioskConfig::load_from(&path).unwrap();
        assert_eq!(loaded.base_url, "http://10.0.0.2:9000/");
        assert_eq!(loaded.countdown_start, 3);
        assert_eq!(loaded.camera, CameraConfig::default());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            KioskConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            KioskConfig::load_from(&tmp.path().join("absent.json")),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_base_url_override() {
        let mut config = KioskConfig::default();
        config.apply_base_url_override(Some("  https://tunnel.example.org/ ".into()));
        assert_eq!(config.base_url, "https://tunnel.example.org/");

        config.apply_base_url_override(Some("   ".into()));
        assert_eq!(config.base_url, "https://tunnel.example.org/");

        config.apply_base_url_override(None);
        assert_eq!(config.base_url, "https://tunnel.example.org/");
    }

    #[rstest]
    #[case::not_a_url(|c: &mut KioskConfig| c.base_url = "not a url".into())]
    #[case::ftp_scheme(|c: &mut KioskConfig| c.base_url = "ftp://example.com/".into())]
    #[case::zero_timeout(|c: &mut KioskConfig| c.request_timeout_secs = 0)]
    #[case::zero_tick(|c: &mut KioskConfig| c.tick_interval_ms = 0)]
    #[case::zero_quality(|c: &mut KioskConfig| c.jpeg_quality = 0)]
    #[case::quality_too_high(|c: &mut KioskConfig| c.jpeg_quality = 101)]
    fn test_validate_rejects(#[case] mutate: fn(&mut KioskConfig)) {
        let mut config = KioskConfig::default();
        mutate(&mut config);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_camera_input_format_defaults_to_platform() {
        let camera = CameraConfig::default();
        assert_eq!(camera.input_format(), DEFAULT_CAMERA_FORMAT);

        let custom = CameraConfig {
            input_format: Some("avfoundation".into()),
            ..CameraConfig::default()
        };
        assert_eq!(custom.input_format(), "avfoundation");
    }
}
