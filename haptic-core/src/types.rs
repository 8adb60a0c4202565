//! Haptic data types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{HapticError, HapticResult};

/// A single haptic event.
///
/// Values are stored exactly as the caller provided them; range checks
/// happen in [`Limits`](crate::limits::Limits) when the pulse is played.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pulse {
    /// Duration in seconds
    pub duration_secs: f64,
    /// Normalized intensity [0.0, 1.0]
    pub intensity: f32,
    /// Normalized sharpness [0.0, 1.0]
    #[serde(default = "default_sharpness")]
    pub sharpness: f32,
}

fn default_sharpness() -> f32 {
    0.5
}

impl Pulse {
    pub fn new(duration_secs: f64, intensity: f32, sharpness: f32) -> Self {
        Self {
            duration_secs,
            intensity,
            sharpness,
        }
    }

    /// Pulse with no intensity, used as a gap between pulses
    pub fn silence(duration_secs: f64) -> Self {
        Self::new(duration_secs, 0.0, 0.0)
    }

    /// Zero-duration pulses produce no playback
    pub fn is_empty(&self) -> bool {
        self.duration_secs == 0.0
    }

    pub fn duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.duration_secs.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Returns a copy with intensity scaled by `weight` and capped at 1.0
    pub fn scaled(&self, weight: f64) -> Self {
        let intensity = (f64::from(self.intensity) * weight).clamp(0.0, 1.0) as f32;
        Self { intensity, ..*self }
    }
}

/// Ordered sequence of pulses played back to back
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    pulses: Vec<Pulse>,
}

impl Pattern {
    pub fn new(pulses: Vec<Pulse>) -> Self {
        Self { pulses }
    }

    pub fn single(pulse: Pulse) -> Self {
        Self { pulses: vec![pulse] }
    }

    /// Builds a pattern from index-aligned slices.
    ///
    /// All three slices must have the same length.
    pub fn from_parallel(
        durations: &[f64],
        intensities: &[f32],
        sharpnesses: &[f32],
    ) -> HapticResult<Self> {
        if durations.len() != intensities.len() || durations.len() != sharpnesses.len() {
            return Err(HapticError::LengthMismatch(format!(
                "durations={}, intensities={}, sharpnesses={}",
                durations.len(),
                intensities.len(),
                sharpnesses.len()
            )));
        }

        let pulses = durations
            .iter()
            .zip(intensities)
            .zip(sharpnesses)
            .map(|((&d, &i), &s)| Pulse::new(d, i, s))
            .collect();

        Ok(Self { pulses })
    }

    /// Parses a JSON array of pulses
    pub fn from_json(json: &str) -> HapticResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| HapticError::InvalidParameter(format!("Invalid pattern JSON: {}", e)))
    }

    pub fn to_json(&self) -> HapticResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| HapticError::InvalidParameter(format!("Pattern serialization failed: {}", e)))
    }

    pub fn push(&mut self, pulse: Pulse) {
        self.pulses.push(pulse);
    }

    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    pub fn len(&self) -> usize {
        self.pulses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pulses.is_empty()
    }

    /// Sum of all pulse durations
    pub fn total_duration(&self) -> Duration {
        self.pulses
            .iter()
            .fold(Duration::ZERO, |acc, p| acc.saturating_add(p.duration()))
    }

    /// Copy of this pattern with every intensity scaled by `weight`
    pub fn scaled(&self, weight: f64) -> Self {
        Self {
            pulses: self.pulses.iter().map(|p| p.scaled(weight)).collect(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pulse> {
        self.pulses.iter()
    }
}

impl From<Vec<Pulse>> for Pattern {
    fn from(pulses: Vec<Pulse>) -> Self {
        Self::new(pulses)
    }
}

impl FromIterator<Pulse> for Pattern {
    fn from_iter<I: IntoIterator<Item = Pulse>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = &'a Pulse;
    type IntoIter = std::slice::Iter<'a, Pulse>;

    fn into_iter(self) -> Self::IntoIter {
        self.pulses.iter()
    }
}

/// 2D direction for spatialized playback on multi-actuator devices.
///
/// `x > 0` points right, `y > 0` points to the top of the device.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Direction {
    pub x: f64,
    pub y: f64,
}

impl Direction {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// A zero or non-finite vector carries no direction
    pub fn is_valid(&self) -> bool {
        let m = self.magnitude();
        m.is_finite() && m > 0.0
    }
}

/// Predefined haptic effects
///
/// Discriminants match the Android `VibrationEffect.Composition` ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum Primitive {
    Click = 1,
    Thud = 2,
    Spin = 3,
    QuickRise = 4,
    SlowRise = 5,
    QuickFall = 6,
    Tick = 7,
    LowTick = 8,
}

impl Primitive {
    pub const ALL: [Primitive; 8] = [
        Primitive::Click,
        Primitive::Thud,
        Primitive::Spin,
        Primitive::QuickRise,
        Primitive::SlowRise,
        Primitive::QuickFall,
        Primitive::Tick,
        Primitive::LowTick,
    ];

    pub fn id(self) -> i32 {
        self as i32
    }

    pub fn from_id(id: i32) -> HapticResult<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| HapticError::InvalidParameter(format!("Unknown primitive id {}", id)))
    }
}

/// One primitive inside a [`Composition`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimitiveStep {
    pub primitive: Primitive,
    /// Strength [0.0, 1.0]
    pub scale: f32,
    /// Delay before this step starts (ms)
    #[serde(default)]
    pub delay_ms: u32,
}

impl PrimitiveStep {
    pub fn new(primitive: Primitive, scale: f32, delay_ms: u32) -> Self {
        Self {
            primitive,
            scale,
            delay_ms,
        }
    }
}

/// Sequence of predefined primitives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Composition {
    steps: Vec<PrimitiveStep>,
}

impl Composition {
    pub fn new(steps: Vec<PrimitiveStep>) -> Self {
        Self { steps }
    }

    /// Builds a composition from the index-aligned arrays used by the C API
    pub fn from_parallel(ids: &[i32], scales: &[f32], delays_ms: &[i32]) -> HapticResult<Self> {
        if ids.len() != scales.len() || ids.len() != delays_ms.len() {
            return Err(HapticError::LengthMismatch(format!(
                "ids={}, scales={}, delays={}",
                ids.len(),
                scales.len(),
                delays_ms.len()
            )));
        }

        let mut steps = Vec::with_capacity(ids.len());
        for ((&id, &scale), &delay) in ids.iter().zip(scales).zip(delays_ms) {
            let delay_ms = u32::try_from(delay)
                .map_err(|_| HapticError::OutOfRange(format!("Negative delay {}ms", delay)))?;
            steps.push(PrimitiveStep::new(Primitive::from_id(id)?, scale, delay_ms));
        }

        Ok(Self { steps })
    }

    pub fn then(mut self, primitive: Primitive, scale: f32, delay_ms: u32) -> Self {
        self.steps.push(PrimitiveStep::new(primitive, scale, delay_ms));
        self
    }

    pub fn steps(&self) -> &[PrimitiveStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Distinct primitives in first-use order
    pub fn primitives(&self) -> Vec<Primitive> {
        let mut seen = Vec::new();
        for step in &self.steps {
            if !seen.contains(&step.primitive) {
                seen.push(step.primitive);
            }
        }
        seen
    }
}
