use std::path::Path;
use std::time::Duration;

use common::file_format::{ConfigFormat, FileExtensionError};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Format(#[from] FileExtensionError),
    #[error("YAML config is malformed")]
    Yaml(#[from] serde_yml::Error),
    #[error("JSON config is malformed")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FanConfig {
    /// `None` for an unbounded channel. `Some(1)` is the closest thing to a
    /// rendezvous channel.
    pub channel_capacity: Option<usize>,
    pub stall_deadline_ms: u64,
    /// Test-only lock hold time for `SharedCounter::increment`.
    pub increment_hold_ms: Option<u64>,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            channel_capacity: Some(1),
            stall_deadline_ms: 1000,
            increment_hold_ms: None,
        }
    }
}

impl FanConfig {
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        match format {
            ConfigFormat::Yaml => Self::from_yaml_str(&text),
            ConfigFormat::Json => Self::from_json_str(&text),
        }
    }

    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_yml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.channel_capacity == Some(0) {
            return Err(ConfigError::Invalid {
                field: "channel_capacity",
                message: "must be at least 1, or omitted for unbounded".to_string(),
            });
        }
        if self.stall_deadline_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "stall_deadline_ms",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn stall_deadline(&self) -> Duration {
        Duration::from_millis(self.stall_deadline_ms)
    }

    pub fn increment_hold(&self) -> Option<Duration> {
        self.increment_hold_ms
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
    }
}
