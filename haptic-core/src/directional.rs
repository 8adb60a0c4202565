//! Per-actuator weighting for directional playback
//!
//! Actuators are split in two halves. The first half is driven by the
//! left and top components of the direction, the second half by the
//! right and bottom components.

use crate::types::{Direction, Pattern};

/// One actuator's share of a directional request
#[derive(Debug, Clone, PartialEq)]
pub struct ActuatorTrack {
    pub actuator: usize,
    pub weight: f64,
    pub pattern: Pattern,
}

/// Weight for each actuator index.
///
/// Returns `None` when there is nothing to spread: fewer than two
/// actuators or no usable direction.
pub fn actuator_weights(direction: Direction, actuators: usize) -> Option<Vec<f64>> {
    if actuators < 2 || !direction.is_valid() {
        return None;
    }

    let magnitude = direction.magnitude();
    let left = (-direction.x).max(0.0) / magnitude;
    let right = direction.x.max(0.0) / magnitude;
    let top = direction.y.max(0.0) / magnitude;
    let bottom = (-direction.y).max(0.0) / magnitude;

    let midpoint = actuators / 2;
    let half = (actuators / 2) as f64;

    let weights = (0..actuators)
        .map(|i| {
            if i < midpoint {
                left / midpoint as f64 + top / half
            } else {
                right / (actuators - midpoint) as f64 + bottom / half
            }
        })
        .collect();

    Some(weights)
}

/// Splits a pattern into weighted tracks, skipping silent actuators
pub fn spread(pattern: &Pattern, direction: Direction, actuators: usize) -> Option<Vec<ActuatorTrack>> {
    let weights = actuator_weights(direction, actuators)?;

    let tracks = weights
        .into_iter()
        .enumerate()
        .filter(|(_, w)| *w > 0.0)
        .map(|(actuator, weight)| ActuatorTrack {
            actuator,
            weight,
            pattern: pattern.scaled(weight),
        })
        .collect();

    Some(tracks)
}
