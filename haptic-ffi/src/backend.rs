//! Host-supplied native backend
//!
//! The host fills a [`HapticVTable`] with function pointers into its
//! platform haptics service. Every callback receives `user_data` first
//! and returns `0` on success. Callbacks left as `NULL` are treated as
//! no-ops (`acquire`, `release`, `cancel`) or as unsupported features
//! (everything else).

use std::ffi::c_void;
use std::fmt;

use haptic_core::{ActuatorTrack, Composition, HapticBackend, HapticError, HapticResult, Pattern, Primitive, Pulse};

/// C mirror of [`Pulse`]
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticPulse {
    pub duration: f64,
    pub intensity: f32,
    pub sharpness: f32,
}

impl From<HapticPulse> for Pulse {
    fn from(p: HapticPulse) -> Self {
        Pulse::new(p.duration, p.intensity, p.sharpness)
    }
}

impl From<&Pulse> for HapticPulse {
    fn from(p: &Pulse) -> Self {
        Self {
            duration: p.duration_secs,
            intensity: p.intensity,
            sharpness: p.sharpness,
        }
    }
}

/// C mirror of [`PrimitiveStep`](haptic_core::PrimitiveStep)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HapticPrimitiveStep {
    pub primitive_id: i32,
    pub scale: f32,
    pub delay_ms: u32,
}

/// One actuator's pulses in a parallel request
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HapticTrack {
    pub actuator: u32,
    pub pulses: *const HapticPulse,
    pub count: usize,
}

pub type StatusFn = unsafe extern "C" fn(user_data: *mut c_void) -> i32;

/// Host callbacks behind one engine handle.
///
/// Callbacks run while the engine lock is held. A callback must not call
/// any `haptic_*` function on the same handle; doing so deadlocks.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct HapticVTable {
    pub user_data: *mut c_void,
    pub acquire: Option<StatusFn>,
    pub release: Option<StatusFn>,
    pub cancel: Option<StatusFn>,
    pub play_pulse: Option<unsafe extern "C" fn(*mut c_void, f64, f32, f32) -> i32>,
    pub play_pattern: Option<unsafe extern "C" fn(*mut c_void, *const HapticPulse, usize) -> i32>,
    pub play_data: Option<unsafe extern "C" fn(*mut c_void, *const u8, usize) -> i32>,
    pub actuator_count: Option<unsafe extern "C" fn(*mut c_void) -> u32>,
    pub supports_primitive: Option<unsafe extern "C" fn(*mut c_void, i32) -> bool>,
    pub play_composition: Option<unsafe extern "C" fn(*mut c_void, *const HapticPrimitiveStep, usize) -> i32>,
    pub play_parallel: Option<unsafe extern "C" fn(*mut c_void, *const HapticTrack, usize) -> i32>,
    /// Called once when the engine is freed
    pub destroy: Option<unsafe extern "C" fn(*mut c_void)>,
}

/// [`HapticBackend`] over a host [`HapticVTable`]
pub struct ForeignBackend {
    vtable: HapticVTable,
}

// The host promises that `user_data` and its callbacks may be used from
// whichever thread holds the engine lock.
unsafe impl Send for ForeignBackend {}

impl fmt::Debug for ForeignBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForeignBackend")
            .field("user_data", &self.vtable.user_data)
            .finish()
    }
}

impl ForeignBackend {
    /// # Safety
    ///
    /// Every non-null callback must be safe to call with `vtable.user_data`
    /// until `destroy` runs.
    pub unsafe fn new(vtable: HapticVTable) -> Self {
        Self { vtable }
    }

    fn check(&self, callback: &str, code: i32) -> HapticResult<()> {
        if code == 0 {
            Ok(())
        } else {
            Err(HapticError::Backend(format!("{} returned {}", callback, code)))
        }
    }

    fn unsupported(&self, callback: &str) -> HapticError {
        HapticError::Unsupported(format!("host did not provide {}", callback))
    }
}

impl Drop for ForeignBackend {
    fn drop(&mut self) {
        if let Some(destroy) = self.vtable.destroy {
            unsafe { destroy(self.vtable.user_data) };
        }
    }
}

impl HapticBackend for ForeignBackend {
    fn name(&self) -> &str {
        "foreign"
    }

    fn acquire(&mut self) -> HapticResult<()> {
        match self.vtable.acquire {
            Some(acquire) => {
                let code = unsafe { acquire(self.vtable.user_data) };
                if code == 0 {
                    Ok(())
                } else {
                    Err(HapticError::BackendUnavailable(format!("acquire returned {}", code)))
                }
            }
            None => Ok(()),
        }
    }

    fn release(&mut self) -> HapticResult<()> {
        match self.vtable.release {
            Some(release) => self.check("release", unsafe { release(self.vtable.user_data) }),
            None => Ok(()),
        }
    }

    fn cancel(&mut self) -> HapticResult<()> {
        match self.vtable.cancel {
            Some(cancel) => self.check("cancel", unsafe { cancel(self.vtable.user_data) }),
            None => Ok(()),
        }
    }

    fn play_pulse(&mut self, pulse: &Pulse) -> HapticResult<()> {
        match self.vtable.play_pulse {
            Some(play) => {
                let code = unsafe {
                    play(self.vtable.user_data, pulse.duration_secs, pulse.intensity, pulse.sharpness)
                };
                self.check("play_pulse", code)
            }
            None if self.vtable.play_pattern.is_some() => self.play_pattern(&Pattern::single(*pulse)),
            None => Err(self.unsupported("play_pulse")),
        }
    }

    fn play_pattern(&mut self, pattern: &Pattern) -> HapticResult<()> {
        let play = self.vtable.play_pattern.ok_or_else(|| self.unsupported("play_pattern"))?;
        let pulses: Vec<HapticPulse> = pattern.iter().map(HapticPulse::from).collect();
        let code = unsafe { play(self.vtable.user_data, pulses.as_ptr(), pulses.len()) };
        self.check("play_pattern", code)
    }

    fn play_data(&mut self, bytes: &[u8]) -> HapticResult<()> {
        let play = self.vtable.play_data.ok_or_else(|| self.unsupported("play_data"))?;
        let code = unsafe { play(self.vtable.user_data, bytes.as_ptr(), bytes.len()) };
        self.check("play_data", code)
    }

    fn actuator_count(&self) -> usize {
        match self.vtable.actuator_count {
            Some(count) => (unsafe { count(self.vtable.user_data) }).max(1) as usize,
            None => 1,
        }
    }

    fn play_parallel(&mut self, tracks: &[ActuatorTrack]) -> HapticResult<()> {
        let play = self.vtable.play_parallel.ok_or_else(|| self.unsupported("play_parallel"))?;

        let pulses: Vec<Vec<HapticPulse>> = tracks
            .iter()
            .map(|t| t.pattern.iter().map(HapticPulse::from).collect())
            .collect();
        let c_tracks = tracks
            .iter()
            .zip(&pulses)
            .map(|(t, p)| {
                let actuator = u32::try_from(t.actuator)
                    .map_err(|_| HapticError::OutOfRange(format!("actuator index {}", t.actuator)))?;
                Ok(HapticTrack {
                    actuator,
                    pulses: p.as_ptr(),
                    count: p.len(),
                })
            })
            .collect::<HapticResult<Vec<_>>>()?;

        let code = unsafe { play(self.vtable.user_data, c_tracks.as_ptr(), c_tracks.len()) };
        self.check("play_parallel", code)
    }

    fn supports_primitive(&self, primitive: Primitive) -> bool {
        match self.vtable.supports_primitive {
            Some(supports) => unsafe { supports(self.vtable.user_data, primitive.id()) },
            None => false,
        }
    }

    fn play_composition(&mut self, composition: &Composition) -> HapticResult<()> {
        let play = self
            .vtable
            .play_composition
            .ok_or_else(|| self.unsupported("play_composition"))?;

        let steps: Vec<HapticPrimitiveStep> = composition
            .steps()
            .iter()
            .map(|s| HapticPrimitiveStep {
                primitive_id: s.primitive.id(),
                scale: s.scale,
                delay_ms: s.delay_ms,
            })
            .collect();
        let code = unsafe { play(self.vtable.user_data, steps.as_ptr(), steps.len()) };
        self.check("play_composition", code)
    }
}
