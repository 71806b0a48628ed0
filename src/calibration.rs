//! Brightness calibration.
//!
//! Calibration runs on every activation of the rig: it samples the sensor
//! with the display dark, triggers a click so the display turns bright,
//! samples again, and uses the integer midpoint of the two readings as the
//! detection threshold. Readings follow the photoresistor's response (bright
//! reads lower than dark), so during a trial, crossing *below* the threshold
//! means the display lit up.
//!
//! The measured levels and the derived threshold are written to the
//! transcript as comments so they end up in the same log file as the data,
//! and a threshold below the configured floor rejects the calibration --
//! that normally means a loose sensor connection or too much ambient light.

use crate::config::ControllerConfig;
use crate::error::{CalibrationError, ControllerError};
use crate::hardware::{Clock, Rig};
use crate::transcript::Transcript;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{debug, warn};

/// One activation's brightness calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calibration {
    /// Sensor reading with the display dark (trigger released).
    pub black_level: u16,
    /// Sensor reading with the display bright (trigger held).
    pub white_level: u16,
    /// Detection threshold: readings strictly below it count as bright.
    pub threshold: u16,
}

impl Calibration {
    /// Measures a calibration on the given rig.
    ///
    /// Preconditions: the trigger line is released and the display is in its
    /// dark state. The routine asserts the trigger for one settle period to
    /// capture the bright level, then releases it and waits another settle
    /// period so the display is dark again when the caller proceeds.
    ///
    /// The threshold is `black - (black - white) / 2`: the integer midpoint,
    /// biased toward the black level on odd differences. Rejects with
    /// [`CalibrationError::ThresholdTooLow`] if the midpoint falls below
    /// `config.threshold_min`.
    pub fn measure<R, C, W>(
        rig: &mut R,
        clock: &C,
        config: &ControllerConfig,
        transcript: &mut Transcript<W>,
    ) -> Result<Self, ControllerError>
    where
        R: Rig,
        C: Clock,
        W: Write,
    {
        let black_level = rig.read_brightness()?;

        rig.set_click(true)?;
        rig.set_click_led(true)?;
        clock.sleep(config.calibration_settle());
        let white_level = rig.read_brightness()?;

        rig.set_click(false)?;
        rig.set_click_led(false)?;
        clock.sleep(config.calibration_settle());

        // Signed math: a broken sensor can report white above black, which
        // would underflow unsigned arithmetic.
        let threshold =
            i32::from(black_level) - (i32::from(black_level) - i32::from(white_level)) / 2;

        transcript.comment("black", black_level)?;
        transcript.comment("white", white_level)?;
        transcript.comment("threshold", threshold)?;
        debug!(black_level, white_level, threshold, "calibration measured");

        if threshold < i32::from(config.threshold_min) {
            transcript.note("error: low threshold")?;
            warn!(threshold, minimum = config.threshold_min, "calibration rejected");
            return Err(CalibrationError::ThresholdTooLow {
                threshold,
                minimum: config.threshold_min,
            }
            .into());
        }

        Ok(Self {
            black_level,
            white_level,
            // Bounded by the larger of the two u16 readings, so the cast
            // cannot truncate; negatives were rejected above.
            threshold: threshold as u16,
        })
    }
}
