//! Timings/amplitudes waveform conversion
//!
//! Vibrator APIs without a sharpness axis take a pattern as two
//! index-aligned arrays: segment length in milliseconds and amplitude
//! in `0..=255` (0 = motor off). Sharpness is dropped in this form.

use serde::{Deserialize, Serialize};

use crate::types::{Pattern, Pulse};

pub const MAX_AMPLITUDE: u8 = 255;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Waveform {
    pub timings_ms: Vec<u64>,
    pub amplitudes: Vec<u8>,
}

impl Waveform {
    pub fn from_pattern(pattern: &Pattern) -> Self {
        let (timings_ms, amplitudes) = pattern
            .iter()
            .map(|p| (duration_ms(p), amplitude(p.intensity)))
            .unzip();
        Self {
            timings_ms,
            amplitudes,
        }
    }

    pub fn from_pulse(pulse: &Pulse) -> Self {
        Self {
            timings_ms: vec![duration_ms(pulse)],
            amplitudes: vec![amplitude(pulse.intensity)],
        }
    }

    pub fn len(&self) -> usize {
        self.timings_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timings_ms.is_empty()
    }

    pub fn total_ms(&self) -> u64 {
        self.timings_ms.iter().fold(0u64, |acc, t| acc.saturating_add(*t))
    }
}

fn duration_ms(pulse: &Pulse) -> u64 {
    (pulse.duration_secs.max(0.0) * 1000.0).round() as u64
}

/// Maps intensity [0, 1] to 0..=255; any non-zero intensity stays audible
pub fn amplitude(intensity: f32) -> u8 {
    if intensity.is_nan() || intensity <= 0.0 {
        return 0;
    }
    let scaled = (intensity.min(1.0) * f32::from(MAX_AMPLITUDE)).round() as u8;
    scaled.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amplitude_mapping() {
        assert_eq!(amplitude(0.0), 0);
        assert_eq!(amplitude(1.0), 255);
        assert_eq!(amplitude(0.5), 128);
        assert_eq!(amplitude(0.001), 1);
        assert_eq!(amplitude(-0.3), 0);
        assert_eq!(amplitude(f32::NAN), 0);
    }

    #[test]
    fn test_from_pattern() {
        let pattern: Pattern = vec![
            Pulse::new(0.1, 1.0, 0.2),
            Pulse::silence(0.05),
            Pulse::new(0.0125, 0.25, 0.9),
        ]
        .into();

        let wf = Waveform::from_pattern(&pattern);
        assert_eq!(wf.timings_ms, vec![100, 50, 13]);
        assert_eq!(wf.amplitudes, vec![255, 0, 64]);
        assert_eq!(wf.total_ms(), 163);
        assert_eq!(wf.len(), 3);
    }

    #[test]
    fn test_empty_pattern() {
        let wf = Waveform::from_pattern(&Pattern::default());
        assert!(wf.is_empty());
        assert_eq!(wf.total_ms(), 0);
    }

    #[test]
    fn test_from_pulse() {
        let wf = Waveform::from_pulse(&Pulse::new(0.25, 0.8, 0.0));
        assert_eq!(wf.timings_ms, vec![250]);
        assert_eq!(wf.amplitudes, vec![204]);
    }
}
