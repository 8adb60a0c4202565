//! Status codes and per-thread last-error message

use std::cell::RefCell;

use haptic_core::HapticError;
use thiserror::Error;

/// Result of every C entry point
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticStatus {
    Ok = 0,
    NotInitialized = 1,
    InvalidArgument = 2,
    OutOfRange = 3,
    Unsupported = 4,
    BackendUnavailable = 5,
    BackendFailure = 6,
    NullHandle = 7,
    Panic = 8,
}

impl HapticStatus {
    pub fn is_ok(self) -> bool {
        self == HapticStatus::Ok
    }
}

impl From<&HapticError> for HapticStatus {
    fn from(err: &HapticError) -> Self {
        match err {
            HapticError::NotInitialized => HapticStatus::NotInitialized,
            HapticError::InvalidParameter(_)
            | HapticError::LengthMismatch(_)
            | HapticError::Config(_) => HapticStatus::InvalidArgument,
            HapticError::OutOfRange(_)
            | HapticError::PatternTooLong { .. }
            | HapticError::DataTooLarge { .. } => HapticStatus::OutOfRange,
            HapticError::Unsupported(_) => HapticStatus::Unsupported,
            HapticError::BackendUnavailable(_) => HapticStatus::BackendUnavailable,
            HapticError::Backend(_) | HapticError::Poisoned => HapticStatus::BackendFailure,
        }
    }
}

/// Failures that exist only at the C boundary
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FfiError {
    #[error("Null engine handle")]
    NullHandle,

    #[error("Panic inside haptic call: {0}")]
    Panic(String),

    #[error(transparent)]
    Haptic(#[from] HapticError),
}

impl FfiError {
    pub fn status(&self) -> HapticStatus {
        match self {
            FfiError::NullHandle => HapticStatus::NullHandle,
            FfiError::Panic(_) => HapticStatus::Panic,
            FfiError::Haptic(e) => HapticStatus::from(e),
        }
    }
}

pub type FfiResult<T> = Result<T, FfiError>;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

pub fn set_last_error(message: String) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

pub fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Records the error for `haptic_last_error_message` and returns its status
pub fn report(err: FfiError) -> HapticStatus {
    let status = err.status();
    tracing::debug!(?status, error = %err, "haptic call failed");
    set_last_error(err.to_string());
    status
}
