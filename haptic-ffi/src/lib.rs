//! # haptic-ffi: C ABI for haptic-core
//!
//! Builds as `cdylib`/`staticlib`. The matching header is
//! `include/haptic.h`.
//!
//! ```c
//! HapticHandle *engine = haptic_engine_new(&platform_vtable);
//! if (haptic_initialize(engine) != HAPTIC_OK) {
//!     char msg[256];
//!     haptic_last_error_message(msg, sizeof msg);
//! }
//! haptic_vibrate_one_shot(engine, 0.05, 0.8f, 0.4f);
//! haptic_dispose(engine);
//! haptic_engine_free(engine);
//! ```
//!
//! Differences from a bare void-returning binding:
//!
//! - The engine is an explicit handle, not process-wide state.
//! - Every call returns a [`HapticStatus`]; the text of the last failure
//!   is available per thread.
//! - Patterns are passed as an array of [`HapticPulse`] records; the
//!   three-array form remains as `haptic_vibrate_pattern_arrays`.

pub mod api;
pub mod backend;
pub mod status;

pub use api::*;
pub use backend::{ForeignBackend, HapticPrimitiveStep, HapticPulse, HapticTrack, HapticVTable};
pub use status::{FfiError, FfiResult, HapticStatus};

#[cfg(test)]
mod tests;
