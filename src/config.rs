//! Controller configuration.
//!
//! Every hardware-tuned constant of the reference rig (settle delays, poll
//! intervals, the threshold sanity floor, the pacing range) is a field here
//! rather than a hardcoded value, since none of them is universal: they were
//! tuned for one particular photoresistor circuit and display. The defaults
//! reproduce the reference rig exactly.
//!
//! Durations are stored as integer milliseconds, matching how the timing
//! constants are naturally expressed, with accessor methods that convert to
//! [`Duration`] for the control loop.

use crate::error::ControllerError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable constants for the measurement loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Full-scale sensor reading (10-bit ADC on the reference rig).
    pub sensor_max: u16,

    /// Minimum acceptable calibration threshold.
    ///
    /// A threshold below this floor indicates a sensor fault or excessive
    /// ambient light, and the calibration is rejected.
    pub threshold_min: u16,

    /// Hold time after driving the trigger during calibration, letting the
    /// display stabilize before a brightness level is trusted.
    pub calibration_settle_ms: u64,

    /// Delay between calibration attempts after a rejection.
    pub calibration_retry_backoff_ms: u64,

    /// Hold time between detecting the brightness crossing and releasing the
    /// trigger, so the display visibly reverts.
    pub release_settle_ms: u64,

    /// Poll interval while waiting for the display to read dark again after
    /// the trigger is released.
    pub reset_poll_interval_ms: u64,

    /// Poll interval for the enable switch while the device is disabled.
    pub disabled_poll_interval_ms: u64,

    /// Lower bound (inclusive) of the random inter-trial delay.
    pub pacing_min_ms: u64,

    /// Upper bound (exclusive) of the random inter-trial delay.
    pub pacing_max_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            sensor_max: 1023,
            threshold_min: 100,
            calibration_settle_ms: 500,
            calibration_retry_backoff_ms: 1000,
            release_settle_ms: 500,
            reset_poll_interval_ms: 500,
            disabled_poll_interval_ms: 100,
            pacing_min_ms: 100,
            pacing_max_ms: 1000,
        }
    }
}

impl ControllerConfig {
    /// Calibration settle hold as a [`Duration`].
    pub fn calibration_settle(&self) -> Duration {
        Duration::from_millis(self.calibration_settle_ms)
    }

    /// Backoff between rejected calibration attempts as a [`Duration`].
    pub fn calibration_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.calibration_retry_backoff_ms)
    }

    /// Trigger release settle hold as a [`Duration`].
    pub fn release_settle(&self) -> Duration {
        Duration::from_millis(self.release_settle_ms)
    }

    /// Display reset poll interval as a [`Duration`].
    pub fn reset_poll_interval(&self) -> Duration {
        Duration::from_millis(self.reset_poll_interval_ms)
    }

    /// Disabled-state switch poll interval as a [`Duration`].
    pub fn disabled_poll_interval(&self) -> Duration {
        Duration::from_millis(self.disabled_poll_interval_ms)
    }

    /// Checks that the configuration is semantically usable.
    pub fn validate(&self) -> Result<(), ControllerError> {
        if self.pacing_min_ms >= self.pacing_max_ms {
            return Err(ControllerError::Config(format!(
                "pacing range [{}, {}) ms is empty",
                self.pacing_min_ms, self.pacing_max_ms
            )));
        }
        if self.threshold_min > self.sensor_max {
            return Err(ControllerError::Config(format!(
                "threshold_min {} exceeds sensor_max {}",
                self.threshold_min, self.sensor_max
            )));
        }
        if self.calibration_settle_ms == 0 {
            return Err(ControllerError::Config(
                "calibration_settle_ms must be non-zero".into(),
            ));
        }
        if self.release_settle_ms == 0 {
            return Err(ControllerError::Config(
                "release_settle_ms must be non-zero".into(),
            ));
        }
        if self.reset_poll_interval_ms == 0 {
            return Err(ControllerError::Config(
                "reset_poll_interval_ms must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
