//! Haptic engine errors

use thiserror::Error;

pub type HapticResult<T> = Result<T, HapticError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum HapticError {
    #[error("Haptic engine not initialized")]
    NotInitialized,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Length mismatch: {0}")]
    LengthMismatch(String),

    #[error("Pattern too long: {len} pulses (max {max})")]
    PatternTooLong { len: usize, max: usize },

    #[error("Pattern data too large: {len} bytes (max {max})")]
    DataTooLarge { len: usize, max: usize },

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Engine lock poisoned")]
    Poisoned,
}

impl HapticError {
    /// Errors caused by the caller's arguments rather than by the backend
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            HapticError::InvalidParameter(_)
                | HapticError::OutOfRange(_)
                | HapticError::LengthMismatch(_)
                | HapticError::PatternTooLong { .. }
                | HapticError::DataTooLarge { .. }
        )
    }
}

impl<T> From<std::sync::PoisonError<T>> for HapticError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        HapticError::Poisoned
    }
}
