//! Activation state machine and trial loop.
//!
//! The controller is the single actor in the system. One [`Controller`]
//! struct owns all mutable state -- device state, the current calibration,
//! the pacing generator, the rig backend, the clock, and the transcript --
//! and [`Controller::tick`] advances it by exactly one top-level loop
//! iteration:
//!
//! 1. Sample the enable switch. If off, discard any calibration, idle for
//!    one poll interval, and return.
//! 2. On the disabled-to-enabled edge, measure a calibration, retrying with
//!    a fixed backoff until one passes the sanity check. Exactly one
//!    calibration is taken per activation; a stale threshold is never
//!    reused.
//! 3. Run one trial: assert the click, busy-poll the sensor until a reading
//!    crosses below the threshold, and report the elapsed microseconds.
//!    After a settle hold, release the click and poll until the display is
//!    confirmed dark again.
//! 4. Sleep a random inter-trial delay and return.
//!
//! The detection poll deliberately has **no timeout**: if the system under
//! test never responds, the loop stalls forever. The rig is designed to run
//! unattended and has no fatal path; a hang is observable from the outside
//! (no new transcript lines) and is preferable to a spurious sample. The
//! enable switch is likewise only observed between trials -- a trial in
//! flight always runs to completion.

use crate::calibration::Calibration;
use crate::config::ControllerConfig;
use crate::error::{ControllerError, Result};
use crate::hardware::{Clock, Rig};
use crate::pacing::Pacing;
use crate::transcript::Transcript;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Activation state of the rig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Switch off: no calibration held, no trial activity.
    Disabled,
    /// Switch on: calibrated and measuring.
    Enabled,
}

/// One measurement cycle, recorded entirely within a single loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trial {
    /// Timestamp taken immediately after the click was asserted.
    pub started_at: Duration,
    /// Timestamp of the observed threshold crossing.
    pub detected_at: Duration,
}

impl Trial {
    /// End-to-end latency of this trial.
    pub fn latency(&self) -> Duration {
        self.detected_at.saturating_sub(self.started_at)
    }
}

/// What a single [`Controller::tick`] accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The switch reads off; the controller idled for one poll interval.
    Idle,
    /// A trial completed with the given latency.
    Measured(Duration),
}

/// The measurement loop: state, calibration, pacing, and the hardware seam,
/// bundled into one explicit single-instance object.
#[derive(Debug)]
pub struct Controller<R, C, W>
where
    R: Rig,
    C: Clock,
    W: Write,
{
    config: ControllerConfig,
    state: DeviceState,
    calibration: Option<Calibration>,
    pacing: Pacing,
    rig: R,
    clock: C,
    transcript: Transcript<W>,
}

impl<R, C, W> Controller<R, C, W>
where
    R: Rig,
    C: Clock,
    W: Write,
{
    /// Builds a controller in the `Disabled` state.
    ///
    /// Fails if the configuration does not validate. The device must be
    /// enabled through its switch before any trial runs.
    pub fn new(
        config: ControllerConfig,
        rig: R,
        clock: C,
        pacing: Pacing,
        transcript: Transcript<W>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: DeviceState::Disabled,
            calibration: None,
            pacing,
            rig,
            clock,
            transcript,
        })
    }

    /// Current activation state.
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// The calibration taken on the current activation, if enabled.
    pub fn calibration(&self) -> Option<&Calibration> {
        self.calibration.as_ref()
    }

    /// Tears the controller apart, returning the rig backend, the clock,
    /// and the transcript. Used by tests to inspect the event log and the
    /// emitted lines after a run.
    pub fn into_parts(self) -> (R, C, Transcript<W>) {
        (self.rig, self.clock, self.transcript)
    }

    /// Runs the loop forever. Only backend or transcript faults return.
    pub fn run(&mut self) -> Result<()> {
        loop {
            self.tick()?;
        }
    }

    /// Runs the loop until `samples` trials have been measured.
    pub fn run_for(&mut self, samples: u64) -> Result<()> {
        let mut measured = 0;
        while measured < samples {
            if let TickOutcome::Measured(_) = self.tick()? {
                measured += 1;
            }
        }
        Ok(())
    }

    /// Advances the loop by one top-level iteration.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        if !self.rig.is_enabled()? {
            if self.state == DeviceState::Enabled {
                info!("switch off, discarding calibration");
            }
            self.state = DeviceState::Disabled;
            self.calibration = None;
            self.clock.sleep(self.config.disabled_poll_interval());
            return Ok(TickOutcome::Idle);
        }

        if self.state == DeviceState::Disabled {
            let calibration = self.calibrate_until_accepted()?;
            info!(
                black = calibration.black_level,
                white = calibration.white_level,
                threshold = calibration.threshold,
                "activated"
            );
            self.calibration = Some(calibration);
            self.state = DeviceState::Enabled;
        }

        let threshold = self
            .calibration
            .as_ref()
            .ok_or(ControllerError::NotCalibrated)?
            .threshold;

        let trial = self.run_trial(threshold)?;
        let pause = self
            .pacing
            .draw(self.config.pacing_min_ms, self.config.pacing_max_ms);
        debug!(
            latency_us = trial.latency().as_micros() as u64,
            pause_ms = pause.as_millis() as u64,
            "trial complete"
        );
        self.clock.sleep(pause);
        Ok(TickOutcome::Measured(trial.latency()))
    }

    /// Measures calibrations until one passes the sanity check.
    ///
    /// Rejections are never escalated: the routine backs off for the
    /// configured interval and tries again, indefinitely. Only genuine
    /// backend or transcript faults propagate.
    fn calibrate_until_accepted(&mut self) -> Result<Calibration> {
        loop {
            match Calibration::measure(
                &mut self.rig,
                &self.clock,
                &self.config,
                &mut self.transcript,
            ) {
                Ok(calibration) => return Ok(calibration),
                Err(ControllerError::Calibration(err)) => {
                    warn!(%err, "retrying calibration");
                    self.clock.sleep(self.config.calibration_retry_backoff());
                }
                Err(other) => return Err(other),
            }
        }
    }

    /// Runs one trigger/detect cycle against the given threshold.
    ///
    /// Asserts the click and timestamps the start, then busy-polls the
    /// sensor with no artificial delay until a reading falls below the
    /// threshold. The sample is emitted at the moment of detection. After a
    /// settle hold the click is released, and the routine polls coarsely
    /// until the display reads dark again, guaranteeing the next trial
    /// starts from a reset display.
    ///
    /// This poll has no timeout; see the module docs.
    fn run_trial(&mut self, threshold: u16) -> Result<Trial> {
        self.rig.set_click(true)?;
        self.rig.set_click_led(true)?;
        let started_at = self.clock.now();

        loop {
            if self.rig.read_brightness()? < threshold {
                break;
            }
        }
        let detected_at = self.clock.now();
        self.rig.set_detect_led(true)?;

        let trial = Trial {
            started_at,
            detected_at,
        };
        self.transcript.sample(trial.latency())?;

        self.clock.sleep(self.config.release_settle());
        self.rig.set_click(false)?;
        self.rig.set_click_led(false)?;

        while self.rig.read_brightness()? < threshold {
            self.clock.sleep(self.config.reset_poll_interval());
        }
        self.rig.set_detect_led(false)?;

        Ok(trial)
    }
}
