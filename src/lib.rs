//! # Latency Rig Controller Library
//!
//! This crate implements the controller core of an end-to-end input-to-display
//! latency measurement rig. The rig electromechanically triggers a click on a
//! device under test (via an optocoupler wired into a modified input device),
//! waits for the device's display to switch from a dark to a bright state, and
//! detects that change with a photoresistor taped to the screen. The elapsed
//! time between triggering the click and the brightness crossing a calibrated
//! threshold is the end-to-end latency, reported in microseconds.
//!
//! ## Crate Structure
//!
//! - **`calibration`**: Measures dark/bright sensor levels and derives the
//!   detection threshold, with a sanity check against sensor faults and
//!   ambient light.
//! - **`config`**: The [`ControllerConfig`] struct holding every
//!   hardware-tuned constant (settle times, poll intervals, pacing range,
//!   threshold floor) with the reference rig's values as defaults.
//! - **`controller`**: The [`Controller`] state machine and trial loop: the
//!   enable/disable handling, calibration retry on activation, and the
//!   trigger/detect measurement cycle.
//! - **`error`**: Centralized error types built with `thiserror`.
//! - **`hardware`**: Injectable traits for the physical rig (brightness
//!   sensor, click trigger, enable switch, status LEDs) and for time
//!   (monotonic clock), plus scripted and simulated backends so the entire
//!   loop runs without hardware.
//! - **`pacing`**: Seeded uniform-random inter-trial delay, used to avoid
//!   accidental synchronization with periodic behavior in the system under
//!   test.
//! - **`transcript`**: The line-oriented output channel: `#`-prefixed
//!   diagnostic comments interleaved with bare-integer latency samples.

pub mod calibration;
pub mod config;
pub mod controller;
pub mod error;
pub mod hardware;
pub mod pacing;
pub mod transcript;

pub use calibration::Calibration;
pub use config::ControllerConfig;
pub use controller::{Controller, DeviceState, TickOutcome, Trial};
pub use error::{CalibrationError, ControllerError, RigError};
pub use pacing::Pacing;
pub use transcript::Transcript;
