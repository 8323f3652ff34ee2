//! Typed startup configuration.
//!
//! The whole configuration is resolved and validated once at startup and then
//! passed by reference into the components that need it. Malformed values are
//! rejected here, never deep inside a capture or matching call.

use crate::capture::CaptureRegion;
use crate::device::{ActionDelays, DeviceEndpoint};
use crate::mapping::Resolution;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    ParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    pub capture: CaptureConfig,
    pub device: DeviceConfig,
    pub matching: MatchingConfig,
    pub automation: AutomationConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    /// Capture rectangle in physical display coordinates. `None` captures the
    /// full primary display.
    pub region: Option<CaptureRegion>,
    /// Optional downscale target. Both dimensions must be set together; all
    /// downstream coordinates are then expressed in this output space.
    pub output_width: Option<u32>,
    pub output_height: Option<u32>,
    /// Upper bound on capture rate, enforced by blocking between grabs.
    pub max_fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            region: None,
            output_width: None,
            output_height: None,
            max_fps: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    pub host: String,
    pub port: u16,
    /// Path to the adb binary; plain "adb" resolves through PATH.
    pub adb_path: String,
    pub tap_delay_ms: u64,
    pub swipe_delay_ms: u64,
    pub text_delay_ms: u64,
    pub key_delay_ms: u64,
    /// Native resolution of the target device, used to map frame coordinates
    /// into device coordinates before issuing input events.
    pub target_width: u32,
    pub target_height: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5555,
            adb_path: "adb".to_string(),
            tap_delay_ms: 100,
            swipe_delay_ms: 300,
            text_delay_ms: 100,
            key_delay_ms: 100,
            target_width: 1280,
            target_height: 720,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatchingConfig {
    /// Similarity threshold in [0, 1] for template matches.
    pub threshold: f32,
    /// Directory of template images, one marker per file, named by file stem.
    pub template_dir: String,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: 0.8,
            template_dir: "templates".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutomationConfig {
    /// Pause between search cycles while a template is not on screen.
    pub poll_interval_ms: u64,
    /// Pause after a successful action, letting the target UI settle.
    pub cooldown_ms: u64,
    /// Search deadline used by the continuous watch mode.
    pub default_timeout_secs: u64,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 500,
            cooldown_ms: 3000,
            default_timeout_secs: 10,
        }
    }
}

impl BotConfig {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config: BotConfig =
            toml::from_str(&raw).map_err(|source| ConfigError::ParseFailed {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(region) = &self.capture.region
            && (region.width == 0 || region.height == 0)
        {
            return Err(ConfigError::InvalidValue {
                field: "capture.region",
                reason: format!("region must be non-empty, got {}x{}", region.width, region.height),
            });
        }
        match (self.capture.output_width, self.capture.output_height) {
            (Some(w), Some(h)) if w == 0 || h == 0 => {
                return Err(ConfigError::InvalidValue {
                    field: "capture.output_width/output_height",
                    reason: format!("output size must be non-zero, got {w}x{h}"),
                });
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(ConfigError::InvalidValue {
                    field: "capture.output_width/output_height",
                    reason: "output_width and output_height must be set together".to_string(),
                });
            }
            _ => {}
        }
        if self.capture.max_fps == 0 {
            return Err(ConfigError::InvalidValue {
                field: "capture.max_fps",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.matching.threshold) {
            return Err(ConfigError::InvalidValue {
                field: "matching.threshold",
                reason: format!("must be within [0, 1], got {}", self.matching.threshold),
            });
        }
        if self.device.target_width == 0 || self.device.target_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "device.target_width/target_height",
                reason: format!(
                    "target resolution must be non-zero, got {}x{}",
                    self.device.target_width, self.device.target_height
                ),
            });
        }
        if self.automation.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "automation.poll_interval_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn endpoint(&self) -> DeviceEndpoint {
        DeviceEndpoint::new(&self.device.host, self.device.port)
    }

    pub fn delays(&self) -> ActionDelays {
        ActionDelays {
            tap: Duration::from_millis(self.device.tap_delay_ms),
            swipe: Duration::from_millis(self.device.swipe_delay_ms),
            text: Duration::from_millis(self.device.text_delay_ms),
            key: Duration::from_millis(self.device.key_delay_ms),
        }
    }

    pub fn target_resolution(&self) -> Resolution {
        Resolution::new(self.device.target_width, self.device.target_height)
    }

    pub fn output_size(&self) -> Option<(u32, u32)> {
        match (self.capture.output_width, self.capture.output_height) {
            (Some(w), Some(h)) => Some((w, h)),
            _ => None,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.automation.poll_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.automation.cooldown_ms)
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_secs(self.automation.default_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: BotConfig = toml::from_str("").unwrap();
        config.validate().unwrap();

        assert_eq!(config.device.host, "127.0.0.1");
        assert_eq!(config.device.port, 5555);
        assert_eq!(config.capture.max_fps, 30);
        assert_eq!(config.matching.threshold, 0.8);
        assert_eq!(config.automation.poll_interval_ms, 500);
        assert!(config.capture.region.is_none());
        assert!(config.output_size().is_none());
    }

    #[test]
    fn full_config_parses() {
        let raw = r#"
            [capture]
            region = { left = 100, top = 100, width = 1280, height = 720 }
            output_width = 640
            output_height = 360
            max_fps = 30

            [device]
            host = "127.0.0.1"
            port = 5555
            target_width = 1280
            target_height = 720

            [matching]
            threshold = 0.75
            template_dir = "data/templates"

            [automation]
            poll_interval_ms = 500
            cooldown_ms = 2000
            default_timeout_secs = 5
        "#;
        let config: BotConfig = toml::from_str(raw).unwrap();
        config.validate().unwrap();

        assert_eq!(config.output_size(), Some((640, 360)));
        assert_eq!(config.endpoint().serial(), "127.0.0.1:5555");
        assert_eq!(config.matching.threshold, 0.75);
        let region = config.capture.region.unwrap();
        assert_eq!((region.left, region.top), (100, 100));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let raw = r#"
            [matching]
            treshold = 0.9
        "#;
        assert!(toml::from_str::<BotConfig>(raw).is_err());
    }

    #[test]
    fn out_of_range_threshold_fails_validation() {
        let mut config = BotConfig::default();
        config.matching.threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "matching.threshold",
                ..
            }
        ));
    }

    #[test]
    fn zero_target_resolution_fails_validation() {
        let mut config = BotConfig::default();
        config.device.target_width = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn mismatched_output_size_fails_validation() {
        let mut config = BotConfig::default();
        config.capture.output_width = Some(640);
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_region_fails_validation() {
        let mut config = BotConfig::default();
        config.capture.region = Some(CaptureRegion {
            left: 0,
            top: 0,
            width: 0,
            height: 100,
        });
        assert!(config.validate().is_err());
    }
}
