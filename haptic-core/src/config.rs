//! Engine configuration (haptic.toml)
//!
//! Values come from, in order of precedence:
//!
//! 1. `HAPTIC_*` environment variables
//! 2. A TOML file (`HAPTIC_CONFIG` or an explicit path)
//! 3. Built-in defaults

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HapticError, HapticResult};

/// What to do with intensity, sharpness or duration values outside their range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangePolicy {
    /// Clamp into range and log a warning
    #[default]
    Clamp,
    /// Fail the call with `OutOfRange`
    Reject,
}

impl std::str::FromStr for RangePolicy {
    type Err = HapticError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(RangePolicy::Clamp),
            "reject" => Ok(RangePolicy::Reject),
            other => Err(HapticError::Config(format!(
                "Unknown range policy '{}' (expected 'clamp' or 'reject')",
                other
            ))),
        }
    }
}

/// Haptic engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticConfig {
    /// Out-of-range handling
    pub range_policy: RangePolicy,
    /// Longest accepted pulse (s)
    pub max_pulse_secs: f64,
    /// Most pulses accepted in one pattern
    pub max_pattern_pulses: usize,
    /// Largest opaque pattern payload (bytes)
    pub max_data_len: usize,
    /// Cancel current playback before each new request
    pub cancel_before_play: bool,
}

impl Default for HapticConfig {
    fn default() -> Self {
        Self {
            range_policy: RangePolicy::Clamp,
            max_pulse_secs: 30.0,
            max_pattern_pulses: 1024,
            max_data_len: 1024 * 1024,
            cancel_before_play: true,
        }
    }
}

impl HapticConfig {
    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> HapticResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| HapticError::Config(format!("Failed to parse haptic.toml: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file path
    pub fn from_file(path: &Path) -> HapticResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HapticError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// Defaults, then `HAPTIC_CONFIG` file if set, then `HAPTIC_*` overrides
    pub fn from_env() -> HapticResult<Self> {
        let base = match std::env::var("HAPTIC_CONFIG") {
            Ok(path) if !path.is_empty() => Self::from_file(Path::new(&path))?,
            _ => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `HAPTIC_*` overrides from an arbitrary lookup
    pub fn with_overrides<F>(mut self, lookup: F) -> HapticResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("HAPTIC_RANGE_POLICY") {
            self.range_policy = v.parse()?;
        }
        if let Some(v) = lookup("HAPTIC_MAX_PULSE_SECS") {
            self.max_pulse_secs = parse_var("HAPTIC_MAX_PULSE_SECS", &v)?;
        }
        if let Some(v) = lookup("HAPTIC_MAX_PATTERN_PULSES") {
            self.max_pattern_pulses = parse_var("HAPTIC_MAX_PATTERN_PULSES", &v)?;
        }
        if let Some(v) = lookup("HAPTIC_MAX_DATA_LEN") {
            self.max_data_len = parse_var("HAPTIC_MAX_DATA_LEN", &v)?;
        }
        if let Some(v) = lookup("HAPTIC_CANCEL_BEFORE_PLAY") {
            self.cancel_before_play = parse_var("HAPTIC_CANCEL_BEFORE_PLAY", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> HapticResult<()> {
        if !self.max_pulse_secs.is_finite() || self.max_pulse_secs <= 0.0 {
            return Err(HapticError::Config(
                "max_pulse_secs must be a positive number".into(),
            ));
        }

        if self.max_pattern_pulses == 0 {
            return Err(HapticError::Config(
                "max_pattern_pulses must be at least 1".into(),
            ));
        }

        if self.max_data_len == 0 {
            return Err(HapticError::Config("max_data_len must be at least 1".into()));
        }

        Ok(())
    }

    pub fn to_toml(&self) -> HapticResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| HapticError::Config(format!("Failed to serialize config: {}", e)))
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> HapticResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| HapticError::Config(format!("Invalid value for {}: '{}'", key, value)))
}
