//! Error taxonomy for calibration and measurement
//!
//! Every variant is recoverable by further user input; nothing here is fatal
//! to the host process.

/// Recoverable conditions reported by the measurement engine
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasureError {
    /// Known reference length was zero, negative or not a number
    #[error("known reference length must be greater than zero (got {0})")]
    InvalidReferenceLength(f64),

    /// No positive scale is available yet
    #[error("no reference scale has been calibrated")]
    Uncalibrated,

    /// Completion requested before the minimum point count was collected
    #[error("measurement needs at least {required} points (have {actual})")]
    InsufficientPoints { required: usize, actual: usize },

    /// Volume depth was negative or not a number
    #[error("volume depth must be zero or greater (got {0})")]
    InvalidVolumeDepth(f64),

    /// Command is not accepted in the current interaction mode
    #[error("{command} is not available while {mode}")]
    IllegalTransition { command: &'static str, mode: &'static str },
}

/// Result type for measurement operations
pub type MeasureResult<T> = Result<T, MeasureError>;
