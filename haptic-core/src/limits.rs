//! Parameter range checks applied before anything reaches a backend

use tracing::warn;

use crate::config::{HapticConfig, RangePolicy};
use crate::error::{HapticError, HapticResult};
use crate::types::{Composition, Pattern, PrimitiveStep, Pulse};

/// Range limits derived from [`HapticConfig`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub policy: RangePolicy,
    pub max_pulse_secs: f64,
    pub max_pattern_pulses: usize,
    pub max_data_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self::from(&HapticConfig::default())
    }
}

impl From<&HapticConfig> for Limits {
    fn from(config: &HapticConfig) -> Self {
        Self {
            policy: config.range_policy,
            max_pulse_secs: config.max_pulse_secs,
            max_pattern_pulses: config.max_pattern_pulses,
            max_data_len: config.max_data_len,
        }
    }
}

impl Limits {
    /// Returns the pulse with every field inside its range.
    ///
    /// Non-finite values are rejected under any policy.
    pub fn check_pulse(&self, pulse: &Pulse) -> HapticResult<Pulse> {
        Ok(Pulse {
            duration_secs: self.check_value("duration", pulse.duration_secs, 0.0, self.max_pulse_secs)?,
            intensity: self.check_value("intensity", f64::from(pulse.intensity), 0.0, 1.0)? as f32,
            sharpness: self.check_value("sharpness", f64::from(pulse.sharpness), 0.0, 1.0)? as f32,
        })
    }

    pub fn check_pattern(&self, pattern: &Pattern) -> HapticResult<Pattern> {
        if pattern.len() > self.max_pattern_pulses {
            return Err(HapticError::PatternTooLong {
                len: pattern.len(),
                max: self.max_pattern_pulses,
            });
        }

        pattern
            .iter()
            .enumerate()
            .map(|(i, pulse)| {
                self.check_pulse(pulse).map_err(|e| match e {
                    HapticError::InvalidParameter(msg) => {
                        HapticError::InvalidParameter(format!("pulse {}: {}", i, msg))
                    }
                    HapticError::OutOfRange(msg) => {
                        HapticError::OutOfRange(format!("pulse {}: {}", i, msg))
                    }
                    other => other,
                })
            })
            .collect()
    }

    pub fn check_data(&self, bytes: &[u8]) -> HapticResult<()> {
        if bytes.len() > self.max_data_len {
            return Err(HapticError::DataTooLarge {
                len: bytes.len(),
                max: self.max_data_len,
            });
        }
        Ok(())
    }

    pub fn check_composition(&self, composition: &Composition) -> HapticResult<Composition> {
        if composition.len() > self.max_pattern_pulses {
            return Err(HapticError::PatternTooLong {
                len: composition.len(),
                max: self.max_pattern_pulses,
            });
        }

        let steps = composition
            .steps()
            .iter()
            .map(|step| {
                let scale = self.check_value("scale", f64::from(step.scale), 0.0, 1.0)? as f32;
                Ok(PrimitiveStep { scale, ..*step })
            })
            .collect::<HapticResult<Vec<_>>>()?;

        Ok(Composition::new(steps))
    }

    fn check_value(&self, name: &str, value: f64, min: f64, max: f64) -> HapticResult<f64> {
        if !value.is_finite() {
            return Err(HapticError::InvalidParameter(format!(
                "{} must be finite, got {}",
                name, value
            )));
        }

        if (min..=max).contains(&value) {
            return Ok(value);
        }

        match self.policy {
            RangePolicy::Clamp => {
                let clamped = value.clamp(min, max);
                warn!(parameter = name, value, clamped, "haptic parameter clamped");
                Ok(clamped)
            }
            RangePolicy::Reject => Err(HapticError::OutOfRange(format!(
                "{} {} outside [{}, {}]",
                name, value, min, max
            ))),
        }
    }
}
