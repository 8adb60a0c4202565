//! # haptic-core: native haptics binding surface
//!
//! Validated pulse/pattern model and a caller-owned engine handle in front
//! of a platform haptics service. The service itself (waveform synthesis,
//! scheduling, motor control) lives behind the [`HapticBackend`] trait.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 HapticEngine                  │
//! │  initialize / dispose / cancel                │
//! │  vibrate_one_shot / vibrate_pattern / data    │
//! │  directional / composition                    │
//! │        │                                      │
//! │        ├── Limits (RangePolicy, HapticConfig) │
//! │        └── directional::spread                │
//! └───────────────────────────────────────────────┘
//!                        ↓
//!              HapticBackend (trait)
//!        NullBackend · RecordingBackend · FFI vtable
//!                        ↓
//!           Platform vibrator / haptic engine
//! ```
//!
//! ## Example
//!
//! ```rust
//! use haptic_core::{HapticEngine, Pattern, Pulse, RecordingBackend};
//!
//! # fn main() -> Result<(), haptic_core::HapticError> {
//! let backend = RecordingBackend::new();
//! let log = backend.log();
//! let engine = HapticEngine::new(Box::new(backend));
//!
//! engine.initialize()?;
//! engine.vibrate_one_shot(0.05, 0.8, 0.4)?;
//! engine.vibrate_pattern(&Pattern::new(vec![
//!     Pulse::new(0.1, 1.0, 0.2),
//!     Pulse::silence(0.05),
//!     Pulse::new(0.1, 0.5, 0.9),
//! ]))?;
//! engine.dispose()?;
//!
//! assert_eq!(log.playback_calls().len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod directional;
pub mod engine;
pub mod error;
pub mod limits;
pub mod types;
pub mod waveform;

pub use backend::{BackendCall, CallLog, HapticBackend, NullBackend, RecordingBackend};
pub use config::{HapticConfig, RangePolicy};
pub use directional::ActuatorTrack;
pub use engine::{EngineState, EngineStats, HapticEngine};
pub use error::{HapticError, HapticResult};
pub use limits::Limits;
pub use types::{Composition, Direction, Pattern, Primitive, PrimitiveStep, Pulse};
pub use waveform::Waveform;
