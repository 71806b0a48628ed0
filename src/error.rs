//! Custom error types for the rig controller.
//!
//! This module defines the error types used across the crate with the
//! `thiserror` crate. The taxonomy is deliberately small:
//!
//! - **`CalibrationError`**: A rejected calibration. This is always
//!   recoverable; the activation path retries with a fixed backoff until a
//!   calibration passes the sanity check.
//! - **`RigError`**: A fault surfaced by a hardware backend (sensor, trigger
//!   line, enable switch). The scripted and simulated backends shipped with
//!   this crate are infallible, but the trait seam returns `Result` so a real
//!   I/O-backed rig can report bus or wiring failures.
//! - **`ControllerError`**: The top-level error returned by the control loop,
//!   consolidating the above plus transcript I/O.
//!
//! Note that an unresponsive system under test is *not* an error: the
//! detection poll has no timeout by design and simply never returns. See
//! [`crate::controller`] for the rationale.

use thiserror::Error;

/// Convenience alias for results using the controller error type.
pub type Result<T> = std::result::Result<T, ControllerError>;

/// A calibration attempt that was measured but rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationError {
    /// The derived threshold fell below the configured floor.
    ///
    /// A too-low threshold normally means something is wrong with the sensor,
    /// e.g. a loose connection or too much ambient light washing out the
    /// dark/bright contrast. The threshold is kept as `i32` because a
    /// sufficiently broken reading pair can drive the midpoint negative.
    #[error("low threshold: {threshold} is below the minimum of {minimum}")]
    ThresholdTooLow {
        /// The rejected midpoint value.
        threshold: i32,
        /// The configured sanity floor.
        minimum: u16,
    },
}

/// A fault reported by a hardware backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RigError {
    /// The brightness sensor could not be read.
    #[error("sensor fault: {0}")]
    Sensor(String),

    /// The click trigger line could not be driven.
    #[error("trigger fault: {0}")]
    Trigger(String),

    /// The enable switch could not be sampled.
    #[error("enable switch fault: {0}")]
    Switch(String),
}

/// Primary error type for the controller loop.
#[derive(Error, Debug)]
pub enum ControllerError {
    /// Configuration validation failed.
    ///
    /// Values parsed fine but are logically broken, e.g. an empty pacing
    /// range or a threshold floor above the sensor scale.
    #[error("configuration error: {0}")]
    Config(String),

    /// A calibration was rejected.
    ///
    /// Only ever observed by callers that invoke
    /// [`crate::calibration::Calibration::measure`] directly; the controller
    /// itself retries rejected calibrations indefinitely.
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// A hardware backend reported a fault.
    #[error(transparent)]
    Rig(#[from] RigError),

    /// Writing to the transcript channel failed.
    #[error("transcript I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The controller reached the measuring state without a stored
    /// calibration. Indicates a state machine bug, not an operational fault.
    #[error("device enabled without a calibration")]
    NotCalibrated,
}
