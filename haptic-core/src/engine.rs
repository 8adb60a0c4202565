//! Caller-owned haptic engine handle
//!
//! ```text
//!              initialize()
//!   ┌───────────────┐ ─────────────▶ ┌─────────┐
//!   │ Uninitialized │                │  Ready  │ ◀── vibrate_*(), cancel()
//!   └───────────────┘ ◀───────────── └─────────┘
//!                        dispose()
//! ```
//!
//! - `initialize` while ready and `dispose` while uninitialized are no-ops.
//! - Every playback call made while uninitialized fails with
//!   [`HapticError::NotInitialized`] and never reaches the backend.
//! - Calls are serialized through one mutex; the handle is `Send + Sync`.
//! - Backend methods run with that mutex held. A backend must not call
//!   back into the same engine.
//! - A new request replaces the current one (the backend is cancelled
//!   first unless `cancel_before_play` is off).
//! - Playback calls return once the backend has accepted the request.

use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::{HapticBackend, NullBackend};
use crate::config::HapticConfig;
use crate::directional;
use crate::error::{HapticError, HapticResult};
use crate::limits::Limits;
use crate::types::{Composition, Direction, Pattern, Primitive, Pulse};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Uninitialized,
    Ready,
}

/// Counters kept across the engine's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Requests handed to the backend
    pub requests: u64,
    /// Requests skipped as no-ops (empty pattern, zero duration, empty data)
    pub skipped: u64,
    /// Requests rejected by validation or the backend
    pub failures: u64,
    /// Successful `initialize` transitions
    pub sessions: u64,
}

#[derive(Debug)]
struct EngineInner {
    backend: Box<dyn HapticBackend>,
    state: EngineState,
    stats: EngineStats,
}

/// Handle to one native haptic engine
#[derive(Debug)]
pub struct HapticEngine {
    inner: Mutex<EngineInner>,
    config: HapticConfig,
    limits: Limits,
}

impl Default for HapticEngine {
    fn default() -> Self {
        Self::new(Box::new(NullBackend))
    }
}

impl HapticEngine {
    /// Creates an engine with default configuration
    pub fn new(backend: Box<dyn HapticBackend>) -> Self {
        let config = HapticConfig::default();
        Self {
            inner: Mutex::new(EngineInner {
                backend,
                state: EngineState::Uninitialized,
                stats: EngineStats::default(),
            }),
            limits: Limits::from(&config),
            config,
        }
    }

    pub fn with_config(backend: Box<dyn HapticBackend>, config: HapticConfig) -> HapticResult<Self> {
        config.validate()?;
        let mut engine = Self::new(backend);
        engine.limits = Limits::from(&config);
        engine.config = config;
        Ok(engine)
    }

    pub fn config(&self) -> &HapticConfig {
        &self.config
    }

    pub fn state(&self) -> HapticResult<EngineState> {
        Ok(self.lock()?.state)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state(), Ok(EngineState::Ready))
    }

    pub fn stats(&self) -> HapticResult<EngineStats> {
        Ok(self.lock()?.stats)
    }

    pub fn backend_name(&self) -> HapticResult<String> {
        Ok(self.lock()?.backend.name().to_string())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn initialize(&self) -> HapticResult<()> {
        let mut inner = self.lock()?;
        if inner.state == EngineState::Ready {
            debug!(backend = inner.backend.name(), "haptic engine already initialized");
            return Ok(());
        }

        if let Err(e) = inner.backend.acquire() {
            warn!(backend = inner.backend.name(), error = %e, "haptic backend acquire failed");
            return Err(match e {
                HapticError::BackendUnavailable(_) => e,
                other => HapticError::BackendUnavailable(other.to_string()),
            });
        }

        inner.state = EngineState::Ready;
        inner.stats.sessions += 1;
        info!(backend = inner.backend.name(), "haptic engine initialized");
        Ok(())
    }

    /// Releases the backend. Safe to call at any time.
    pub fn dispose(&self) -> HapticResult<()> {
        let mut inner = self.lock()?;
        if inner.state == EngineState::Uninitialized {
            return Ok(());
        }

        if let Err(e) = inner.backend.cancel() {
            warn!(backend = inner.backend.name(), error = %e, "cancel during dispose failed");
        }
        if let Err(e) = inner.backend.release() {
            warn!(backend = inner.backend.name(), error = %e, "haptic backend release failed");
        }

        inner.state = EngineState::Uninitialized;
        info!(backend = inner.backend.name(), "haptic engine disposed");
        Ok(())
    }

    pub fn cancel(&self) -> HapticResult<()> {
        let mut inner = self.ready()?;
        inner.backend.cancel()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PLAYBACK
    // ═══════════════════════════════════════════════════════════════════════════

    /// Plays one pulse. A zero duration is accepted and plays nothing.
    pub fn vibrate_one_shot(&self, duration_secs: f64, intensity: f32, sharpness: f32) -> HapticResult<()> {
        self.vibrate_pulse(&Pulse::new(duration_secs, intensity, sharpness))
    }

    pub fn vibrate_pulse(&self, pulse: &Pulse) -> HapticResult<()> {
        let mut inner = self.ready()?;
        let pulse = track(&mut inner, self.limits.check_pulse(pulse))?;

        if pulse.is_empty() {
            debug!("zero-duration one-shot skipped");
            inner.stats.skipped += 1;
            return Ok(());
        }

        debug!(
            duration_secs = pulse.duration_secs,
            intensity = pulse.intensity,
            sharpness = pulse.sharpness,
            "one-shot"
        );
        self.dispatch(&mut inner, |backend| backend.play_pulse(&pulse))
    }

    /// Plays pulses in order. An empty pattern is a no-op.
    pub fn vibrate_pattern(&self, pattern: &Pattern) -> HapticResult<()> {
        let mut inner = self.ready()?;
        if pattern.is_empty() {
            inner.stats.skipped += 1;
            return Ok(());
        }

        let pattern = track(&mut inner, self.limits.check_pattern(pattern))?;
        debug!(pulses = pattern.len(), total_ms = pattern.total_duration().as_millis() as u64, "pattern");
        self.dispatch(&mut inner, |backend| backend.play_pattern(&pattern))
    }

    /// Index-aligned form of [`vibrate_pattern`](Self::vibrate_pattern)
    pub fn vibrate_pattern_parallel(
        &self,
        durations: &[f64],
        intensities: &[f32],
        sharpnesses: &[f32],
    ) -> HapticResult<()> {
        let pattern = match Pattern::from_parallel(durations, intensities, sharpnesses) {
            Ok(pattern) => pattern,
            Err(e) => {
                let mut inner = self.ready()?;
                return track(&mut inner, Err(e));
            }
        };
        self.vibrate_pattern(&pattern)
    }

    /// Passes an opaque encoded pattern to the backend byte for byte.
    /// Empty data is a no-op.
    pub fn vibrate_pattern_from_data(&self, bytes: &[u8]) -> HapticResult<()> {
        let mut inner = self.ready()?;
        if bytes.is_empty() {
            inner.stats.skipped += 1;
            return Ok(());
        }

        track(&mut inner, self.limits.check_data(bytes))?;
        debug!(len = bytes.len(), "pattern data");
        self.dispatch(&mut inner, |backend| backend.play_data(bytes))
    }

    pub fn vibrate_directional_one_shot(&self, pulse: &Pulse, direction: Direction) -> HapticResult<()> {
        self.vibrate_directional(Pattern::single(*pulse), direction, true)
    }

    pub fn vibrate_directional_pattern(&self, pattern: &Pattern, direction: Direction) -> HapticResult<()> {
        self.vibrate_directional(pattern.clone(), direction, false)
    }

    fn vibrate_directional(&self, pattern: Pattern, direction: Direction, one_shot: bool) -> HapticResult<()> {
        let mut inner = self.ready()?;
        if pattern.is_empty() {
            inner.stats.skipped += 1;
            return Ok(());
        }

        let pattern = track(&mut inner, self.limits.check_pattern(&pattern))?;
        if one_shot && pattern.pulses()[0].is_empty() {
            debug!("zero-duration one-shot skipped");
            inner.stats.skipped += 1;
            return Ok(());
        }

        let actuators = inner.backend.actuator_count();

        match directional::spread(&pattern, direction, actuators) {
            Some(tracks) if !tracks.is_empty() => {
                debug!(actuators, tracks = tracks.len(), x = direction.x, y = direction.y, "directional");
                self.dispatch(&mut inner, |backend| backend.play_parallel(&tracks))
            }
            _ => {
                debug!(actuators, "directional request falls back to plain playback");
                if one_shot {
                    let pulse = pattern.pulses()[0];
                    self.dispatch(&mut inner, |backend| backend.play_pulse(&pulse))
                } else {
                    self.dispatch(&mut inner, |backend| backend.play_pattern(&pattern))
                }
            }
        }
    }

    /// False when the engine is not ready
    pub fn supports_primitive(&self, primitive: Primitive) -> bool {
        match self.lock() {
            Ok(inner) => inner.state == EngineState::Ready && inner.backend.supports_primitive(primitive),
            Err(_) => false,
        }
    }

    /// Plays predefined primitives. Nothing is played unless the backend
    /// supports every primitive in the composition.
    pub fn vibrate_composition(&self, composition: &Composition) -> HapticResult<()> {
        let mut inner = self.ready()?;
        if composition.is_empty() {
            inner.stats.skipped += 1;
            return Ok(());
        }

        let composition = track(&mut inner, self.limits.check_composition(composition))?;
        let unsupported: Vec<Primitive> = composition
            .primitives()
            .into_iter()
            .filter(|p| !inner.backend.supports_primitive(*p))
            .collect();

        if !unsupported.is_empty() {
            return track(
                &mut inner,
                Err(HapticError::Unsupported(format!("primitives {:?}", unsupported))),
            );
        }

        debug!(steps = composition.len(), "composition");
        self.dispatch(&mut inner, |backend| backend.play_composition(&composition))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════════

    fn lock(&self) -> HapticResult<MutexGuard<'_, EngineInner>> {
        Ok(self.inner.lock()?)
    }

    fn ready(&self) -> HapticResult<MutexGuard<'_, EngineInner>> {
        let inner = self.lock()?;
        if inner.state != EngineState::Ready {
            return Err(HapticError::NotInitialized);
        }
        Ok(inner)
    }

    fn dispatch<F>(&self, inner: &mut EngineInner, play: F) -> HapticResult<()>
    where
        F: FnOnce(&mut dyn HapticBackend) -> HapticResult<()>,
    {
        if self.config.cancel_before_play {
            if let Err(e) = inner.backend.cancel() {
                warn!(backend = inner.backend.name(), error = %e, "cancel before play failed");
            }
        }

        match play(inner.backend.as_mut()) {
            Ok(()) => {
                inner.stats.requests += 1;
                Ok(())
            }
            Err(e) => {
                warn!(backend = inner.backend.name(), error = %e, "haptic playback failed");
                inner.stats.failures += 1;
                Err(e)
            }
        }
    }
}

/// Counts validation failures before handing the result back
fn track<T>(inner: &mut EngineInner, result: HapticResult<T>) -> HapticResult<T> {
    if result.is_err() {
        inner.stats.failures += 1;
    }
    result
}
