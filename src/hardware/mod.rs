//! Hardware seam for the measurement rig.
//!
//! The control loop never touches pins directly; it talks to a set of small
//! capability traits so the same loop runs against real hardware, against the
//! deterministic [`scripted::ScriptedRig`] in tests, and against the
//! real-time [`simulated::SimulatedRig`] in the demo binary. All I/O is
//! synchronous and blocking: the design is a single-threaded polling loop
//! with no interrupts and no async callbacks, so the traits stay plain
//! functions returning `Result`.
//!
//! Brightness readings follow the photoresistor's response: more light means
//! lower resistance, so a bright display reads *lower* than a dark one.
//! Threshold comparisons throughout the crate are written against raw
//! readings, not against perceptual brightness.

pub mod clock;
pub mod scripted;
pub mod simulated;

pub use clock::{Clock, SystemClock, VirtualClock};
pub use scripted::{LoggedEvent, RigEvent, ScriptedRig};
pub use simulated::SimulatedRig;

use crate::error::RigError;

/// A pollable light-level sensor on a bounded integer scale.
pub trait BrightnessSensor {
    /// Samples the raw sensor reading. Lower is brighter.
    fn read_brightness(&mut self) -> Result<u16, RigError>;
}

/// The actuation output that simulates a physical click on the device under
/// test. There is no acknowledgment channel; success is inferred purely from
/// the brightness feedback loop.
pub trait ClickTrigger {
    /// Asserts (`true`) or releases (`false`) the click line.
    fn set_click(&mut self, on: bool) -> Result<(), RigError>;
}

/// The external on/off switch gating trial activity.
pub trait EnableSwitch {
    /// Samples the enable input.
    fn is_enabled(&mut self) -> Result<bool, RigError>;
}

/// Status LEDs on the rig: one lit while the click is asserted, one lit
/// while the display reads bright. Purely cosmetic; headless backends keep
/// the no-op defaults.
pub trait IndicatorLeds {
    /// Drives the click indicator LED.
    fn set_click_led(&mut self, _on: bool) -> Result<(), RigError> {
        Ok(())
    }

    /// Drives the threshold-crossing indicator LED.
    fn set_detect_led(&mut self, _on: bool) -> Result<(), RigError> {
        Ok(())
    }
}

/// Umbrella trait for a complete rig backend.
pub trait Rig: BrightnessSensor + ClickTrigger + EnableSwitch + IndicatorLeds {}

impl<T: BrightnessSensor + ClickTrigger + EnableSwitch + IndicatorLeds> Rig for T {}
