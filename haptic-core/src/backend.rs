//! Native haptic engine backends
//!
//! The engine never talks to hardware itself. Everything below the
//! [`HapticBackend`] trait is supplied by the host: a platform vibrator
//! service, a C function table (see `haptic-ffi`), or one of the
//! in-process backends defined here.
//!
//! | Backend | Purpose |
//! |---------|---------|
//! | [`NullBackend`] | Accepts and discards every request |
//! | [`RecordingBackend`] | Keeps every request in a shared [`CallLog`] |

use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::directional::ActuatorTrack;
use crate::error::{HapticError, HapticResult};
use crate::types::{Composition, Pattern, Primitive, Pulse};

/// Seam between [`HapticEngine`](crate::engine::HapticEngine) and a native haptics service.
///
/// Implementations receive only validated values. They must copy any
/// data they keep; borrowed slices are only valid for the call.
pub trait HapticBackend: Send + Debug {
    /// Backend name (for logs)
    fn name(&self) -> &str;

    /// Opens the native handle
    fn acquire(&mut self) -> HapticResult<()>;

    /// Closes the native handle, stopping any playback
    fn release(&mut self) -> HapticResult<()>;

    /// Stops current playback
    fn cancel(&mut self) -> HapticResult<()>;

    fn play_pulse(&mut self, pulse: &Pulse) -> HapticResult<()>;

    fn play_pattern(&mut self, pattern: &Pattern) -> HapticResult<()>;

    /// Passes an opaque, vendor-encoded pattern through unchanged
    fn play_data(&mut self, bytes: &[u8]) -> HapticResult<()>;

    /// Number of independently drivable actuators
    fn actuator_count(&self) -> usize {
        1
    }

    /// Starts one track per actuator at the same instant
    fn play_parallel(&mut self, _tracks: &[ActuatorTrack]) -> HapticResult<()> {
        Err(HapticError::Unsupported(format!(
            "{} cannot drive actuators independently",
            self.name()
        )))
    }

    fn supports_primitive(&self, _primitive: Primitive) -> bool {
        false
    }

    fn play_composition(&mut self, _composition: &Composition) -> HapticResult<()> {
        Err(HapticError::Unsupported(format!(
            "{} has no predefined primitives",
            self.name()
        )))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NULL BACKEND
// ═══════════════════════════════════════════════════════════════════════════════

/// Backend for devices without a vibrator: every request succeeds silently
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

impl HapticBackend for NullBackend {
    fn name(&self) -> &str {
        "null"
    }

    fn acquire(&mut self) -> HapticResult<()> {
        Ok(())
    }

    fn release(&mut self) -> HapticResult<()> {
        Ok(())
    }

    fn cancel(&mut self) -> HapticResult<()> {
        Ok(())
    }

    fn play_pulse(&mut self, _pulse: &Pulse) -> HapticResult<()> {
        Ok(())
    }

    fn play_pattern(&mut self, _pattern: &Pattern) -> HapticResult<()> {
        Ok(())
    }

    fn play_data(&mut self, _bytes: &[u8]) -> HapticResult<()> {
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDING BACKEND
// ═══════════════════════════════════════════════════════════════════════════════

/// One request observed by a [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum BackendCall {
    Acquire,
    Release,
    Cancel,
    Pulse { pulse: Pulse },
    Pattern { pattern: Pattern },
    Data { bytes: Vec<u8> },
    Parallel { tracks: Vec<(usize, Pattern)> },
    Composition { composition: Composition },
}

impl BackendCall {
    /// Whether this call starts playback
    pub fn is_playback(&self) -> bool {
        !matches!(self, BackendCall::Acquire | BackendCall::Release | BackendCall::Cancel)
    }
}

/// Shared view of the calls made to a [`RecordingBackend`]
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl CallLog {
    fn push(&self, call: BackendCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn playback_calls(&self) -> Vec<BackendCall> {
        self.calls().into_iter().filter(BackendCall::is_playback).collect()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

/// In-memory backend that records every request.
///
/// Used for previews and tests. Failure injection covers the two
/// native failure points: acquiring the handle and starting playback.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    log: CallLog,
    actuators: usize,
    primitives: Vec<Primitive>,
    fail_acquire: Option<String>,
    fail_playback: Option<String>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self {
            log: CallLog::default(),
            actuators: 1,
            primitives: Vec::new(),
            fail_acquire: None,
            fail_playback: None,
        }
    }

    pub fn with_actuators(mut self, actuators: usize) -> Self {
        self.actuators = actuators.max(1);
        self
    }

    pub fn with_primitives(mut self, primitives: &[Primitive]) -> Self {
        self.primitives = primitives.to_vec();
        self
    }

    /// `acquire` fails with `BackendUnavailable`
    pub fn failing_acquire(mut self, reason: impl Into<String>) -> Self {
        self.fail_acquire = Some(reason.into());
        self
    }

    /// Every playback call fails with `Backend`
    pub fn failing_playback(mut self, reason: impl Into<String>) -> Self {
        self.fail_playback = Some(reason.into());
        self
    }

    /// Handle to the call log; stays valid after the backend is boxed
    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    fn record_playback(&self, call: BackendCall) -> HapticResult<()> {
        if let Some(reason) = &self.fail_playback {
            return Err(HapticError::Backend(reason.clone()));
        }
        self.log.push(call);
        Ok(())
    }
}

impl HapticBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn acquire(&mut self) -> HapticResult<()> {
        if let Some(reason) = &self.fail_acquire {
            return Err(HapticError::BackendUnavailable(reason.clone()));
        }
        self.log.push(BackendCall::Acquire);
        Ok(())
    }

    fn release(&mut self) -> HapticResult<()> {
        self.log.push(BackendCall::Release);
        Ok(())
    }

    fn cancel(&mut self) -> HapticResult<()> {
        self.log.push(BackendCall::Cancel);
        Ok(())
    }

    fn play_pulse(&mut self, pulse: &Pulse) -> HapticResult<()> {
        self.record_playback(BackendCall::Pulse { pulse: *pulse })
    }

    fn play_pattern(&mut self, pattern: &Pattern) -> HapticResult<()> {
        self.record_playback(BackendCall::Pattern {
            pattern: pattern.clone(),
        })
    }

    fn play_data(&mut self, bytes: &[u8]) -> HapticResult<()> {
        self.record_playback(BackendCall::Data {
            bytes: bytes.to_vec(),
        })
    }

    fn actuator_count(&self) -> usize {
        self.actuators
    }

    fn play_parallel(&mut self, tracks: &[ActuatorTrack]) -> HapticResult<()> {
        if self.actuators < 2 {
            return Err(HapticError::Unsupported("single actuator".into()));
        }
        self.record_playback(BackendCall::Parallel {
            tracks: tracks
                .iter()
                .map(|t| (t.actuator, t.pattern.clone()))
                .collect(),
        })
    }

    fn supports_primitive(&self, primitive: Primitive) -> bool {
        self.primitives.contains(&primitive)
    }

    fn play_composition(&mut self, composition: &Composition) -> HapticResult<()> {
        self.record_playback(BackendCall::Composition {
            composition: composition.clone(),
        })
    }
}
