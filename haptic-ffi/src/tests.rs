//! C ABI tests driven through a Rust-side host vtable

use std::ffi::{CString, c_char, c_void};
use std::ptr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::*;

// ═══════════════════════════════════════════════════════════════════════════════
// TEST HOST
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct Host {
    events: Mutex<Vec<String>>,
    pulses: Mutex<Vec<HapticPulse>>,
    data: Mutex<Vec<u8>>,
    tracks: Mutex<Vec<(u32, usize)>>,
    steps: Mutex<Vec<HapticPrimitiveStep>>,
    actuators: u32,
    fail_acquire: bool,
    destroyed: AtomicBool,
}

impl Host {
    fn event(&self, name: &str) {
        self.events.lock().unwrap().push(name.to_string());
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn playback_events(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.starts_with("play"))
            .collect()
    }

    fn vtable(&self) -> HapticVTable {
        HapticVTable {
            user_data: self as *const Host as *mut c_void,
            acquire: Some(acquire),
            release: Some(release),
            cancel: Some(cancel),
            play_pulse: Some(play_pulse),
            play_pattern: Some(play_pattern),
            play_data: Some(play_data),
            actuator_count: Some(actuator_count),
            supports_primitive: Some(supports_primitive),
            play_composition: Some(play_composition),
            play_parallel: Some(play_parallel),
            destroy: Some(destroy),
        }
    }
}

unsafe fn host<'a>(user_data: *mut c_void) -> &'a Host {
    unsafe { &*(user_data as *const Host) }
}

unsafe extern "C" fn acquire(user_data: *mut c_void) -> i32 {
    let host = unsafe { host(user_data) };
    if host.fail_acquire {
        return 13;
    }
    host.event("acquire");
    0
}

unsafe extern "C" fn release(user_data: *mut c_void) -> i32 {
    unsafe { host(user_data) }.event("release");
    0
}

unsafe extern "C" fn cancel(user_data: *mut c_void) -> i32 {
    unsafe { host(user_data) }.event("cancel");
    0
}

unsafe extern "C" fn play_pulse(user_data: *mut c_void, duration: f64, intensity: f32, sharpness: f32) -> i32 {
    let host = unsafe { host(user_data) };
    host.event("play_pulse");
    host.pulses.lock().unwrap().push(HapticPulse {
        duration,
        intensity,
        sharpness,
    });
    0
}

unsafe extern "C" fn play_pattern(user_data: *mut c_void, pulses: *const HapticPulse, count: usize) -> i32 {
    let host = unsafe { host(user_data) };
    host.event("play_pattern");
    let pulses = unsafe { std::slice::from_raw_parts(pulses, count) };
    host.pulses.lock().unwrap().extend_from_slice(pulses);
    0
}

unsafe extern "C" fn play_data(user_data: *mut c_void, bytes: *const u8, len: usize) -> i32 {
    let host = unsafe { host(user_data) };
    host.event("play_data");
    let bytes = unsafe { std::slice::from_raw_parts(bytes, len) };
    host.data.lock().unwrap().extend_from_slice(bytes);
    0
}

unsafe extern "C" fn actuator_count(user_data: *mut c_void) -> u32 {
    unsafe { host(user_data) }.actuators
}

unsafe extern "C" fn supports_primitive(_user_data: *mut c_void, primitive_id: i32) -> bool {
    primitive_id == 1 || primitive_id == 7
}

unsafe extern "C" fn play_composition(
    user_data: *mut c_void,
    steps: *const HapticPrimitiveStep,
    count: usize,
) -> i32 {
    let host = unsafe { host(user_data) };
    host.event("play_composition");
    let steps = unsafe { std::slice::from_raw_parts(steps, count) };
    host.steps.lock().unwrap().extend_from_slice(steps);
    0
}

unsafe extern "C" fn play_parallel(user_data: *mut c_void, tracks: *const HapticTrack, count: usize) -> i32 {
    let host = unsafe { host(user_data) };
    host.event("play_parallel");
    let tracks = unsafe { std::slice::from_raw_parts(tracks, count) };
    host.tracks
        .lock()
        .unwrap()
        .extend(tracks.iter().map(|t| (t.actuator, t.count)));
    0
}

unsafe extern "C" fn destroy(user_data: *mut c_void) {
    unsafe { host(user_data) }.destroyed.store(true, Ordering::SeqCst);
}

fn last_error_string() -> String {
    let mut buf = [0 as c_char; 256];
    let len = unsafe { haptic_last_error_message(buf.as_mut_ptr(), buf.len()) };
    let text = unsafe { std::ffi::CStr::from_ptr(buf.as_ptr()) };
    assert_eq!(text.to_bytes().len(), len.min(255));
    text.to_string_lossy().into_owned()
}

fn ready_engine(host: &Host) -> *mut HapticHandle {
    let vtable = host.vtable();
    let engine = unsafe { haptic_engine_new(&vtable) };
    assert!(!engine.is_null());
    assert_eq!(unsafe { haptic_initialize(engine) }, HapticStatus::Ok);
    engine
}

// ═══════════════════════════════════════════════════════════════════════════════
// LIFECYCLE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_initialize_dispose_initialize_free() {
    let host = Host::default();
    let engine = ready_engine(&host);

    unsafe {
        assert_eq!(haptic_dispose(engine), HapticStatus::Ok);
        assert_eq!(haptic_dispose(engine), HapticStatus::Ok);
        assert_eq!(haptic_initialize(engine), HapticStatus::Ok);
        haptic_engine_free(engine);
    }

    assert_eq!(
        host.events(),
        vec!["acquire", "cancel", "release", "acquire", "cancel", "release"]
    );
    assert!(host.destroyed.load(Ordering::SeqCst));
}

#[test]
fn test_free_null_is_ignored() {
    unsafe { haptic_engine_free(ptr::null_mut()) };
}

#[test]
fn test_null_handle() {
    unsafe {
        assert_eq!(haptic_initialize(ptr::null()), HapticStatus::NullHandle);
        assert_eq!(haptic_vibrate_one_shot(ptr::null(), 0.1, 1.0, 0.5), HapticStatus::NullHandle);
        assert!(!haptic_is_primitive_supported(ptr::null(), 1));
    }
    assert_eq!(last_error_string(), "Null engine handle");
}

#[test]
fn test_acquire_failure() {
    let host = Host {
        fail_acquire: true,
        ..Default::default()
    };
    let vtable = host.vtable();

    unsafe {
        let engine = haptic_engine_new(&vtable);
        assert_eq!(haptic_initialize(engine), HapticStatus::BackendUnavailable);
        assert!(last_error_string().contains("acquire returned 13"));
        assert_eq!(haptic_vibrate_one_shot(engine, 0.1, 1.0, 0.5), HapticStatus::NotInitialized);
        haptic_engine_free(engine);
    }
    assert!(host.events().is_empty());
}

#[test]
fn test_null_vtable_accepts_requests() {
    unsafe {
        let engine = haptic_engine_new(ptr::null());
        assert_eq!(haptic_initialize(engine), HapticStatus::Ok);
        assert_eq!(haptic_vibrate_one_shot(engine, 0.1, 1.0, 0.5), HapticStatus::Ok);
        assert_eq!(haptic_vibrate_pattern_from_data(engine, b"x".as_ptr().cast(), 1), HapticStatus::Ok);
        haptic_engine_free(engine);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLAYBACK
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_vibrate_before_initialize() {
    let host = Host::default();
    let vtable = host.vtable();

    unsafe {
        let engine = haptic_engine_new(&vtable);
        assert_eq!(haptic_vibrate_one_shot(engine, 0.1, 1.0, 0.5), HapticStatus::NotInitialized);
        assert!(last_error_string().contains("not initialized"));
        haptic_engine_free(engine);
    }
    assert!(host.playback_events().is_empty());
}

#[test]
fn test_one_shot() {
    let host = Host::default();
    let engine = ready_engine(&host);

    unsafe {
        assert_eq!(haptic_vibrate_one_shot(engine, 0.0, 1.0, 1.0), HapticStatus::Ok);
        assert_eq!(haptic_vibrate_one_shot(engine, 0.05, 0.6, 0.2), HapticStatus::Ok);
        haptic_engine_free(engine);
    }

    assert_eq!(host.playback_events(), vec!["play_pulse"]);
    assert_eq!(
        host.pulses.lock().unwrap().as_slice(),
        &[HapticPulse {
            duration: 0.05,
            intensity: 0.6,
            sharpness: 0.2
        }]
    );
}

#[test]
fn test_empty_pattern_never_reads_pointer() {
    let host = Host::default();
    let engine = ready_engine(&host);

    unsafe {
        assert_eq!(haptic_vibrate_pattern(engine, ptr::null(), 0), HapticStatus::Ok);
        assert_eq!(
            haptic_vibrate_pattern_arrays(engine, ptr::null(), ptr::null(), ptr::null(), 0),
            HapticStatus::Ok
        );
        assert_eq!(haptic_vibrate_pattern_from_data(engine, ptr::null(), 0), HapticStatus::Ok);
        haptic_engine_free(engine);
    }
    assert!(host.playback_events().is_empty());
}

#[test]
fn test_pattern_null_pointer_with_count() {
    let host = Host::default();
    let engine = ready_engine(&host);

    unsafe {
        assert_eq!(haptic_vibrate_pattern(engine, ptr::null(), 3), HapticStatus::InvalidArgument);
        assert!(last_error_string().contains("pulses is NULL"));
        assert_eq!(
            haptic_vibrate_pattern_from_data(engine, ptr::null(), 8),
            HapticStatus::InvalidArgument
        );
        haptic_engine_free(engine);
    }
    assert!(host.playback_events().is_empty());
}

#[test]
fn test_oversized_count_rejected_before_read() {
    let host = Host::default();
    let engine = ready_engine(&host);
    let one = [HapticPulse {
        duration: 0.1,
        intensity: 1.0,
        sharpness: 0.5,
    }];
    let durations = [0.1];
    let levels = [1.0f32];

    unsafe {
        assert_eq!(
            haptic_vibrate_pattern(engine, one.as_ptr(), 1usize << 36),
            HapticStatus::OutOfRange
        );
        assert!(last_error_string().contains("Pattern too long"));

        assert_eq!(
            haptic_vibrate_directional_pattern(engine, one.as_ptr(), usize::MAX, 1.0, 0.0),
            HapticStatus::OutOfRange
        );
        assert_eq!(
            haptic_vibrate_pattern_arrays(
                engine,
                durations.as_ptr(),
                levels.as_ptr(),
                levels.as_ptr(),
                i32::MAX
            ),
            HapticStatus::OutOfRange
        );

        let ids = [1];
        let scales = [1.0];
        let delays = [0];
        assert_eq!(
            haptic_vibrate_predefined(engine, ids.as_ptr(), scales.as_ptr(), delays.as_ptr(), i32::MAX),
            HapticStatus::OutOfRange
        );

        let byte = [0u8];
        assert_eq!(
            haptic_vibrate_pattern_from_data(engine, byte.as_ptr().cast(), usize::MAX),
            HapticStatus::OutOfRange
        );
        haptic_engine_free(engine);
    }
    assert!(host.playback_events().is_empty());
    assert!(host.pulses.lock().unwrap().is_empty());
}

#[test]
fn test_count_cap_follows_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("haptic.toml");
    std::fs::write(&path, "max_pattern_pulses = 2\n").unwrap();
    let c_path = CString::new(path.to_str().unwrap()).unwrap();
    let pulses = [HapticPulse {
        duration: 0.01,
        intensity: 0.5,
        sharpness: 0.5,
    }; 3];

    unsafe {
        let engine = haptic_engine_new_with_config(ptr::null(), c_path.as_ptr());
        assert_eq!(haptic_initialize(engine), HapticStatus::Ok);
        assert_eq!(haptic_vibrate_pattern(engine, pulses.as_ptr(), 2), HapticStatus::Ok);
        assert_eq!(haptic_vibrate_pattern(engine, pulses.as_ptr(), 3), HapticStatus::OutOfRange);
        haptic_engine_free(engine);
    }
}

#[test]
fn test_pattern_records() {
    let host = Host::default();
    let engine = ready_engine(&host);
    let pulses = [
        HapticPulse {
            duration: 0.1,
            intensity: 1.0,
            sharpness: 0.3,
        },
        HapticPulse {
            duration: 0.05,
            intensity: 0.0,
            sharpness: 0.0,
        },
    ];

    unsafe {
        assert_eq!(
            haptic_vibrate_pattern(engine, pulses.as_ptr(), pulses.len()),
            HapticStatus::Ok
        );
        haptic_engine_free(engine);
    }
    assert_eq!(host.pulses.lock().unwrap().as_slice(), &pulses);
}

#[test]
fn test_pattern_arrays() {
    let host = Host::default();
    let engine = ready_engine(&host);
    let durations = [0.1, 0.2];
    let intensities = [0.5f32, 1.0];
    let sharpnesses = [0.0f32, 0.9];

    unsafe {
        assert_eq!(
            haptic_vibrate_pattern_arrays(
                engine,
                durations.as_ptr(),
                intensities.as_ptr(),
                ptr::null(),
                2
            ),
            HapticStatus::InvalidArgument
        );
        assert!(last_error_string().contains("sharpnesses"));

        assert_eq!(
            haptic_vibrate_pattern_arrays(
                engine,
                durations.as_ptr(),
                intensities.as_ptr(),
                sharpnesses.as_ptr(),
                -1
            ),
            HapticStatus::InvalidArgument
        );

        assert_eq!(
            haptic_vibrate_pattern_arrays(
                engine,
                durations.as_ptr(),
                intensities.as_ptr(),
                sharpnesses.as_ptr(),
                2
            ),
            HapticStatus::Ok
        );
        haptic_engine_free(engine);
    }

    assert_eq!(host.playback_events(), vec!["play_pattern"]);
    assert_eq!(host.pulses.lock().unwrap().len(), 2);
}

#[test]
fn test_nan_rejected() {
    let host = Host::default();
    let engine = ready_engine(&host);

    unsafe {
        assert_eq!(
            haptic_vibrate_one_shot(engine, f64::NAN, 1.0, 0.5),
            HapticStatus::InvalidArgument
        );
        haptic_engine_free(engine);
    }
}

#[test]
fn test_data_passed_unchanged() {
    let host = Host::default();
    let engine = ready_engine(&host);
    let payload: Vec<u8> = (0u8..=255).collect();

    unsafe {
        assert_eq!(
            haptic_vibrate_pattern_from_data(engine, payload.as_ptr().cast(), payload.len()),
            HapticStatus::Ok
        );
        haptic_engine_free(engine);
    }
    assert_eq!(*host.data.lock().unwrap(), payload);
}

#[test]
fn test_directional_uses_parallel_tracks() {
    let host = Host {
        actuators: 4,
        ..Default::default()
    };
    let engine = ready_engine(&host);

    unsafe {
        assert_eq!(
            haptic_vibrate_directional_one_shot(engine, 0.1, 1.0, 0.5, 0.0, -1.0),
            HapticStatus::Ok
        );
        haptic_engine_free(engine);
    }

    assert_eq!(host.playback_events(), vec!["play_parallel"]);
    assert_eq!(*host.tracks.lock().unwrap(), vec![(2, 1), (3, 1)]);
}

#[test]
fn test_predefined_primitives() {
    let host = Host::default();
    let vtable = host.vtable();

    unsafe {
        let engine = haptic_engine_new(&vtable);
        assert!(!haptic_is_primitive_supported(engine, 1));
        assert_eq!(haptic_initialize(engine), HapticStatus::Ok);
        assert!(haptic_is_primitive_supported(engine, 1));
        assert!(!haptic_is_primitive_supported(engine, 2));
        assert!(!haptic_is_primitive_supported(engine, 99));

        let ids = [1, 2];
        let scales = [1.0, 0.5];
        let delays = [0, 30];
        assert_eq!(
            haptic_vibrate_predefined(engine, ids.as_ptr(), scales.as_ptr(), delays.as_ptr(), 2),
            HapticStatus::Unsupported
        );

        let ids = [1, 7];
        assert_eq!(
            haptic_vibrate_predefined(engine, ids.as_ptr(), scales.as_ptr(), delays.as_ptr(), 2),
            HapticStatus::Ok
        );
        haptic_engine_free(engine);
    }

    assert_eq!(host.playback_events(), vec!["play_composition"]);
    assert_eq!(
        host.steps.lock().unwrap().as_slice(),
        &[
            HapticPrimitiveStep {
                primitive_id: 1,
                scale: 1.0,
                delay_ms: 0
            },
            HapticPrimitiveStep {
                primitive_id: 7,
                scale: 0.5,
                delay_ms: 30
            },
        ]
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTICS & CONFIG
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_last_error_truncation() {
    unsafe { haptic_initialize(ptr::null()) };

    let mut buf = [0x7f as c_char; 5];
    let len = unsafe { haptic_last_error_message(buf.as_mut_ptr(), buf.len()) };
    assert_eq!(len, "Null engine handle".len());
    assert_eq!(buf[4], 0);
    assert_eq!(buf[0] as u8, b'N');

    assert_eq!(unsafe { haptic_last_error_message(ptr::null_mut(), 0) }, len);
}

#[test]
fn test_success_clears_last_error() {
    unsafe {
        haptic_initialize(ptr::null());
        let engine = haptic_engine_new(ptr::null());
        assert_eq!(haptic_initialize(engine), HapticStatus::Ok);
        assert_eq!(haptic_last_error_message(ptr::null_mut(), 0), 0);
        haptic_engine_free(engine);
    }
}

#[test]
fn test_engine_with_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("haptic.toml");
    std::fs::write(&path, "range_policy = \"reject\"\n").unwrap();
    let c_path = CString::new(path.to_str().unwrap()).unwrap();

    unsafe {
        let engine = haptic_engine_new_with_config(ptr::null(), c_path.as_ptr());
        assert!(!engine.is_null());
        assert_eq!(haptic_initialize(engine), HapticStatus::Ok);
        assert_eq!(haptic_vibrate_one_shot(engine, 0.1, 2.0, 0.5), HapticStatus::OutOfRange);
        haptic_engine_free(engine);
    }
}

#[test]
fn test_engine_with_missing_config_file() {
    let c_path = CString::new("/nonexistent/haptic.toml").unwrap();
    let engine = unsafe { haptic_engine_new_with_config(ptr::null(), c_path.as_ptr()) };
    assert!(engine.is_null());
    assert!(last_error_string().contains("Failed to read"));
}

#[test]
fn test_init_logging_is_idempotent() {
    assert_eq!(haptic_init_logging(), HapticStatus::Ok);
    assert_eq!(haptic_init_logging(), HapticStatus::Ok);
}
