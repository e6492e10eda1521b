use crate::http::RequestDescriptor;
use faceid_core::DEFAULT_MATCH_THRESHOLD;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
const DEFAULT_MODEL_DIR: &str = "/models";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Session configuration, supplied by the embedding application.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Request for the reference face image (default method GET).
    pub reference: RequestDescriptor,
    /// Request issued after a match (default method POST).
    pub validation: RequestDescriptor,
    /// Total time allowed for a match once the camera is active.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Cadence of the live comparison loop.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Maximum Euclidean distance (exclusive) for a match.
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,
    /// Location of the detector and recognition model assets.
    #[serde(default = "default_model_dir")]
    pub model_dir: String,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_match_threshold() -> f32 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_model_dir() -> String {
    DEFAULT_MODEL_DIR.to_string()
}

impl SessionConfig {
    /// Build the single-URL configuration: GET the reference, POST to validate,
    /// no headers or bodies.
    pub fn from_urls(reference_url: impl Into<String>, validate_url: impl Into<String>) -> Self {
        Self {
            reference: RequestDescriptor::get(reference_url),
            validation: RequestDescriptor::post(validate_url),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            model_dir: DEFAULT_MODEL_DIR.to_string(),
        }
    }

    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    /// Apply `FACEID_*` environment variable overrides. Unparseable values
    /// are ignored.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        if let Some(v) = parse_var(&lookup, "FACEID_TIMEOUT_MS") {
            self.timeout_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "FACEID_TICK_INTERVAL_MS") {
            self.tick_interval_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "FACEID_MATCH_THRESHOLD") {
            self.match_threshold = v;
        }
        if let Some(v) = lookup("FACEID_MODEL_DIR") {
            self.model_dir = v;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_interval_ms",
                reason: "must be greater than zero".into(),
            });
        }
        if !self.match_threshold.is_finite() || self.match_threshold <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "match_threshold",
                reason: format!("must be a positive number, got {}", self.match_threshold),
            });
        }
        if self.reference.url.is_empty() {
            return Err(ConfigError::Invalid {
                field: "reference.url",
                reason: "must not be empty".into(),
            });
        }
        if self.validation.url.is_empty() {
            return Err(ConfigError::Invalid {
                field: "validation.url",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.parse().ok())
}
