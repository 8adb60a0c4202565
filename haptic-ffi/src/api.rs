//! `extern "C"` entry points
//!
//! Every function takes the engine handle explicitly, returns a
//! [`HapticStatus`] and never lets a panic unwind into the caller.
//! Pointer arguments are only read during the call.

use std::ffi::{CStr, c_char, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::ptr;

use haptic_core::{
    Composition, Direction, HapticBackend, HapticConfig, HapticEngine, HapticError, NullBackend, Pattern,
    Primitive, Pulse,
};
use tracing_subscriber::EnvFilter;

use crate::backend::{ForeignBackend, HapticPulse, HapticVTable};
use crate::status::{FfiError, FfiResult, HapticStatus, clear_last_error, last_error, report};

/// Opaque engine handle handed to C callers
pub struct HapticHandle {
    engine: HapticEngine,
}

impl HapticHandle {
    pub fn engine(&self) -> &HapticEngine {
        &self.engine
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Runs `f` against the handle, converting errors and panics to a status.
///
/// # Safety
///
/// `handle` must be NULL or a live handle from `haptic_engine_new*` that
/// is not freed during the call.
unsafe fn with_engine<F>(handle: *const HapticHandle, f: F) -> HapticStatus
where
    F: FnOnce(&HapticEngine) -> FfiResult<()>,
{
    clear_last_error();
    let result = catch_unwind(AssertUnwindSafe(|| {
        let handle = unsafe { handle.as_ref() }.ok_or(FfiError::NullHandle)?;
        f(&handle.engine)
    }));

    match result {
        Ok(Ok(())) => HapticStatus::Ok,
        Ok(Err(e)) => report(e),
        Err(payload) => report(FfiError::Panic(panic_message(payload.as_ref()))),
    }
}

/// Borrows `len` elements; an empty request never touches `ptr`
///
/// # Safety
///
/// A non-null `ptr` must point to `len` initialized elements.
unsafe fn slice_arg<'a, T>(name: &str, ptr: *const T, len: usize) -> FfiResult<&'a [T]> {
    if len == 0 {
        return Ok(&[]);
    }
    if len.checked_mul(size_of::<T>()).is_none_or(|bytes| bytes > isize::MAX as usize) {
        return Err(HapticError::OutOfRange(format!("{} count {} exceeds the address space", name, len)).into());
    }
    if ptr.is_null() {
        return Err(HapticError::InvalidParameter(format!("{} is NULL with count {}", name, len)).into());
    }
    if !ptr.is_aligned() {
        return Err(HapticError::InvalidParameter(format!("{} is misaligned", name)).into());
    }
    Ok(unsafe { std::slice::from_raw_parts(ptr, len) })
}

fn count_arg(count: i32) -> FfiResult<usize> {
    usize::try_from(count)
        .map_err(|_| HapticError::InvalidParameter(format!("negative count {}", count)).into())
}

/// Rejects counts above the pattern cap before any element is read
fn pattern_len_arg(engine: &HapticEngine, count: usize) -> FfiResult<usize> {
    let max = engine.config().max_pattern_pulses;
    if count > max {
        return Err(HapticError::PatternTooLong { len: count, max }.into());
    }
    Ok(count)
}

fn data_len_arg(engine: &HapticEngine, len: usize) -> FfiResult<usize> {
    let max = engine.config().max_data_len;
    if len > max {
        return Err(HapticError::DataTooLarge { len, max }.into());
    }
    Ok(len)
}

fn backend_from(vtable: *const HapticVTable) -> Box<dyn HapticBackend> {
    // Safety: the caller passes either NULL or a valid table.
    match unsafe { vtable.as_ref() } {
        Some(vtable) => Box::new(unsafe { ForeignBackend::new(*vtable) }),
        None => Box::new(NullBackend),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HANDLE LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════════════

/// Creates an engine over the host backend. A NULL `vtable` selects a
/// backend that silently accepts every request.
///
/// # Safety
///
/// `vtable` must be NULL or point to a valid [`HapticVTable`]; it is copied.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_engine_new(vtable: *const HapticVTable) -> *mut HapticHandle {
    clear_last_error();
    match catch_unwind(AssertUnwindSafe(|| {
        let engine = HapticEngine::new(backend_from(vtable));
        Box::into_raw(Box::new(HapticHandle { engine }))
    })) {
        Ok(handle) => handle,
        Err(payload) => {
            report(FfiError::Panic(panic_message(payload.as_ref())));
            ptr::null_mut()
        }
    }
}

/// Like [`haptic_engine_new`] with settings from a TOML file.
/// A NULL `config_path` loads from the `HAPTIC_*` environment.
/// Returns NULL on error; see `haptic_last_error_message`.
///
/// # Safety
///
/// `vtable` as in [`haptic_engine_new`]; `config_path` must be NULL or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_engine_new_with_config(
    vtable: *const HapticVTable,
    config_path: *const c_char,
) -> *mut HapticHandle {
    clear_last_error();
    let result = catch_unwind(AssertUnwindSafe(|| -> FfiResult<*mut HapticHandle> {
        let config = if config_path.is_null() {
            HapticConfig::from_env()?
        } else {
            let path = unsafe { CStr::from_ptr(config_path) }
                .to_str()
                .map_err(|_| HapticError::InvalidParameter("config path is not UTF-8".into()))?;
            HapticConfig::from_file(Path::new(path))?
        };
        let engine = HapticEngine::with_config(backend_from(vtable), config)?;
        Ok(Box::into_raw(Box::new(HapticHandle { engine })))
    }));

    match result {
        Ok(Ok(handle)) => handle,
        Ok(Err(e)) => {
            report(e);
            ptr::null_mut()
        }
        Err(payload) => {
            report(FfiError::Panic(panic_message(payload.as_ref())));
            ptr::null_mut()
        }
    }
}

/// Disposes the engine, frees it and runs the vtable's `destroy`.
/// NULL is ignored.
///
/// # Safety
///
/// `handle` must come from `haptic_engine_new*` and not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_engine_free(handle: *mut HapticHandle) {
    if handle.is_null() {
        return;
    }
    let handle = unsafe { Box::from_raw(handle) };
    let _ = catch_unwind(AssertUnwindSafe(move || {
        if let Err(e) = handle.engine.dispose() {
            tracing::warn!(error = %e, "dispose during free failed");
        }
        drop(handle);
    }));
}

/// # Safety
///
/// `handle` must be NULL or a live handle from `haptic_engine_new*`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_initialize(handle: *const HapticHandle) -> HapticStatus {
    unsafe { with_engine(handle, |engine| Ok(engine.initialize()?)) }
}

/// # Safety
///
/// `handle` must be NULL or a live handle from `haptic_engine_new*`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_dispose(handle: *const HapticHandle) -> HapticStatus {
    unsafe { with_engine(handle, |engine| Ok(engine.dispose()?)) }
}

/// # Safety
///
/// `handle` must be NULL or a live handle from `haptic_engine_new*`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_cancel(handle: *const HapticHandle) -> HapticStatus {
    unsafe { with_engine(handle, |engine| Ok(engine.cancel()?)) }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLAYBACK
// ═══════════════════════════════════════════════════════════════════════════════

/// # Safety
///
/// `handle` must be NULL or a live handle from `haptic_engine_new*`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_vibrate_one_shot(
    handle: *const HapticHandle,
    duration: f64,
    intensity: f32,
    sharpness: f32,
) -> HapticStatus {
    unsafe {
        with_engine(handle, |engine| {
            Ok(engine.vibrate_one_shot(duration, intensity, sharpness)?)
        })
    }
}

/// # Safety
///
/// `pulses` must be NULL or point to `count` pulses.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_vibrate_pattern(
    handle: *const HapticHandle,
    pulses: *const HapticPulse,
    count: usize,
) -> HapticStatus {
    unsafe {
        with_engine(handle, |engine| {
            let count = pattern_len_arg(engine, count)?;
            let pulses = slice_arg("pulses", pulses, count)?;
            let pattern: Pattern = pulses.iter().map(|p| Pulse::from(*p)).collect();
            Ok(engine.vibrate_pattern(&pattern)?)
        })
    }
}

/// Parallel-array form kept for hosts that still pass three arrays.
///
/// # Safety
///
/// Each array must be NULL or hold at least `count` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_vibrate_pattern_arrays(
    handle: *const HapticHandle,
    durations: *const f64,
    intensities: *const f32,
    sharpnesses: *const f32,
    count: i32,
) -> HapticStatus {
    unsafe {
        with_engine(handle, |engine| {
            let count = pattern_len_arg(engine, count_arg(count)?)?;
            let durations = slice_arg("durations", durations, count)?;
            let intensities = slice_arg("intensities", intensities, count)?;
            let sharpnesses = slice_arg("sharpnesses", sharpnesses, count)?;
            Ok(engine.vibrate_pattern_parallel(durations, intensities, sharpnesses)?)
        })
    }
}

/// # Safety
///
/// `bytes` must be NULL or point to `len` readable bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_vibrate_pattern_from_data(
    handle: *const HapticHandle,
    bytes: *const c_void,
    len: usize,
) -> HapticStatus {
    unsafe {
        with_engine(handle, |engine| {
            let len = data_len_arg(engine, len)?;
            let bytes = slice_arg("bytes", bytes.cast::<u8>(), len)?;
            Ok(engine.vibrate_pattern_from_data(bytes)?)
        })
    }
}

/// # Safety
///
/// `handle` must be NULL or a live handle from `haptic_engine_new*`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_vibrate_directional_one_shot(
    handle: *const HapticHandle,
    duration: f64,
    intensity: f32,
    sharpness: f32,
    direction_x: f64,
    direction_y: f64,
) -> HapticStatus {
    unsafe {
        with_engine(handle, |engine| {
            let pulse = Pulse::new(duration, intensity, sharpness);
            Ok(engine.vibrate_directional_one_shot(&pulse, Direction::new(direction_x, direction_y))?)
        })
    }
}

/// # Safety
///
/// `pulses` must be NULL or point to `count` pulses.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_vibrate_directional_pattern(
    handle: *const HapticHandle,
    pulses: *const HapticPulse,
    count: usize,
    direction_x: f64,
    direction_y: f64,
) -> HapticStatus {
    unsafe {
        with_engine(handle, |engine| {
            let count = pattern_len_arg(engine, count)?;
            let pulses = slice_arg("pulses", pulses, count)?;
            let pattern: Pattern = pulses.iter().map(|p| Pulse::from(*p)).collect();
            Ok(engine.vibrate_directional_pattern(&pattern, Direction::new(direction_x, direction_y))?)
        })
    }
}

/// False for unknown ids, NULL handles and engines that are not initialized
///
/// # Safety
///
/// `handle` must be NULL or a live handle from `haptic_engine_new*`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_is_primitive_supported(handle: *const HapticHandle, primitive_id: i32) -> bool {
    let mut supported = false;
    let status = unsafe {
        with_engine(handle, |engine| {
            let primitive = Primitive::from_id(primitive_id)?;
            supported = engine.supports_primitive(primitive);
            Ok(())
        })
    };
    status.is_ok() && supported
}

/// Plays predefined primitives; nothing plays unless every id is supported.
///
/// # Safety
///
/// Each array must be NULL or hold at least `count` elements.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_vibrate_predefined(
    handle: *const HapticHandle,
    primitive_ids: *const i32,
    scales: *const f64,
    delays_ms: *const i32,
    count: i32,
) -> HapticStatus {
    unsafe {
        with_engine(handle, |engine| {
            let count = pattern_len_arg(engine, count_arg(count)?)?;
            let ids = slice_arg("primitive_ids", primitive_ids, count)?;
            let scales = slice_arg("scales", scales, count)?;
            let delays = slice_arg("delays_ms", delays_ms, count)?;

            let scales: Vec<f32> = scales.iter().map(|s| *s as f32).collect();
            let composition = Composition::from_parallel(ids, &scales, delays)?;
            Ok(engine.vibrate_composition(&composition)?)
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Copies the calling thread's last error into `buf` (NUL-terminated,
/// truncated to `cap`). Returns the full message length, 0 if none.
///
/// # Safety
///
/// `buf` must be NULL or writable for `cap` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn haptic_last_error_message(buf: *mut c_char, cap: usize) -> usize {
    let Some(message) = last_error() else {
        if !buf.is_null() && cap > 0 {
            unsafe { *buf = 0 };
        }
        return 0;
    };

    let bytes = message.as_bytes();
    if !buf.is_null() && cap > 0 {
        let n = bytes.len().min(cap - 1);
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr().cast::<c_char>(), buf, n);
            *buf.add(n) = 0;
        }
    }
    bytes.len()
}

/// Installs a stderr log subscriber filtered by `HAPTIC_LOG`
/// (default `warn`). Later calls do nothing.
#[unsafe(no_mangle)]
pub extern "C" fn haptic_init_logging() -> HapticStatus {
    let filter = EnvFilter::try_from_env("HAPTIC_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    HapticStatus::Ok
}
