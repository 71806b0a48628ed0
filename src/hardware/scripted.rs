//! Deterministic scripted rig for tests.
//!
//! [`ScriptedRig`] stands in for the optocoupler, photoresistor, and enable
//! switch, driven entirely by a [`VirtualClock`]. The display stimulus is
//! modeled as a pending brightness transition: a fixed `response_delay`
//! after the click is asserted the sensor settles at the bright level, and a
//! fixed `revert_delay` after release it returns to the dark level. Each
//! sensor poll advances virtual time by `read_cost`, so the otherwise
//! unbounded detection poll terminates after a computable number of
//! iterations and the measured latency equals the scripted delay to within
//! one read cost.
//!
//! The rig additionally supports:
//!
//! - an enable schedule expressed as virtual-time windows, for exercising
//!   the activation state machine;
//! - a sensor-fault window during which readings are replaced wholesale, for
//!   exercising calibration rejection and retry;
//! - an event log of trigger and LED edges with timestamps, for asserting
//!   trial ordering properties.

use super::clock::{Clock, VirtualClock};
use super::{BrightnessSensor, ClickTrigger, EnableSwitch, IndicatorLeds};
use crate::error::RigError;
use std::ops::Range;
use std::time::Duration;

/// A logged rig-side edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigEvent {
    /// Click line driven to the given state.
    Click(bool),
    /// Click indicator LED driven to the given state.
    ClickLed(bool),
    /// Detect indicator LED driven to the given state.
    DetectLed(bool),
}

/// A [`RigEvent`] with the virtual time at which it occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoggedEvent {
    /// Virtual timestamp of the edge.
    pub at: Duration,
    /// The edge itself.
    pub event: RigEvent,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    at_micros: u64,
    lit: bool,
}

/// Scripted hardware backend driven by a [`VirtualClock`].
#[derive(Debug)]
pub struct ScriptedRig {
    clock: VirtualClock,
    dark_level: u16,
    bright_level: u16,
    response_delay: Duration,
    revert_delay: Duration,
    read_cost: Duration,
    /// `None` means always enabled.
    enable_windows: Option<Vec<Range<u64>>>,
    fault_until_micros: Option<u64>,
    fault_dark_level: u16,
    fault_bright_level: u16,
    lit: bool,
    pending: Option<Pending>,
    events: Vec<LoggedEvent>,
}

impl ScriptedRig {
    /// Creates a rig with representative levels: dark 620, bright 310, a
    /// 3 ms stimulus response, a 5 ms revert, and a 1 µs sensor read cost.
    pub fn new(clock: VirtualClock) -> Self {
        Self {
            clock,
            dark_level: 620,
            bright_level: 310,
            response_delay: Duration::from_millis(3),
            revert_delay: Duration::from_millis(5),
            read_cost: Duration::from_micros(1),
            enable_windows: None,
            fault_until_micros: None,
            fault_dark_level: 0,
            fault_bright_level: 0,
            lit: false,
            pending: None,
            events: Vec::new(),
        }
    }

    /// Sets the steady dark/bright sensor levels.
    pub fn with_levels(mut self, dark: u16, bright: u16) -> Self {
        self.dark_level = dark;
        self.bright_level = bright;
        self
    }

    /// Sets the click-to-bright stimulus latency.
    pub fn with_response_delay(mut self, delay: Duration) -> Self {
        self.response_delay = delay;
        self
    }

    /// Sets the release-to-dark revert latency.
    pub fn with_revert_delay(mut self, delay: Duration) -> Self {
        self.revert_delay = delay;
        self
    }

    /// Sets the virtual time consumed by each sensor poll.
    pub fn with_read_cost(mut self, cost: Duration) -> Self {
        self.read_cost = cost;
        self
    }

    /// Restricts the enable switch to the given virtual-time windows
    /// (microseconds). Outside every window the switch reads off. An empty
    /// list means permanently disabled.
    pub fn with_enable_windows(mut self, windows: Vec<Range<u64>>) -> Self {
        self.enable_windows = Some(windows);
        self
    }

    /// Replaces sensor readings with the given levels until `until` on the
    /// virtual timeline, simulating a faulty or washed-out sensor.
    pub fn with_sensor_fault_until(mut self, until: Duration, dark: u16, bright: u16) -> Self {
        self.fault_until_micros = Some(until.as_micros() as u64);
        self.fault_dark_level = dark;
        self.fault_bright_level = bright;
        self
    }

    /// The edges logged so far, in order.
    pub fn events(&self) -> &[LoggedEvent] {
        &self.events
    }

    /// Timestamps of click asserts, in order.
    pub fn click_assert_times(&self) -> Vec<Duration> {
        self.events
            .iter()
            .filter(|e| e.event == RigEvent::Click(true))
            .map(|e| e.at)
            .collect()
    }

    fn settle_pending(&mut self) {
        let now = self.clock.now_micros();
        if let Some(pending) = self.pending {
            if pending.at_micros <= now {
                self.lit = pending.lit;
                self.pending = None;
            }
        }
    }

    fn log(&mut self, event: RigEvent) {
        self.events.push(LoggedEvent {
            at: self.clock.now(),
            event,
        });
    }
}

impl BrightnessSensor for ScriptedRig {
    fn read_brightness(&mut self) -> Result<u16, RigError> {
        self.clock.advance(self.read_cost);
        self.settle_pending();
        let faulted = self
            .fault_until_micros
            .is_some_and(|until| self.clock.now_micros() < until);
        let (dark, bright) = if faulted {
            (self.fault_dark_level, self.fault_bright_level)
        } else {
            (self.dark_level, self.bright_level)
        };
        Ok(if self.lit { bright } else { dark })
    }
}

impl ClickTrigger for ScriptedRig {
    fn set_click(&mut self, on: bool) -> Result<(), RigError> {
        self.settle_pending();
        self.log(RigEvent::Click(on));
        let delay = if on {
            self.response_delay
        } else {
            self.revert_delay
        };
        self.pending = Some(Pending {
            at_micros: self.clock.now_micros() + delay.as_micros() as u64,
            lit: on,
        });
        Ok(())
    }
}

impl EnableSwitch for ScriptedRig {
    fn is_enabled(&mut self) -> Result<bool, RigError> {
        let now = self.clock.now_micros();
        Ok(match &self.enable_windows {
            None => true,
            Some(windows) => windows.iter().any(|w| w.contains(&now)),
        })
    }
}

impl IndicatorLeds for ScriptedRig {
    fn set_click_led(&mut self, on: bool) -> Result<(), RigError> {
        self.log(RigEvent::ClickLed(on));
        Ok(())
    }

    fn set_detect_led(&mut self, on: bool) -> Result<(), RigError> {
        self.log(RigEvent::DetectLed(on));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_until_response_delay_elapses() {
        let clock = VirtualClock::new();
        let mut rig = ScriptedRig::new(clock.clone())
            .with_levels(600, 300)
            .with_response_delay(Duration::from_millis(2));

        assert_eq!(rig.read_brightness().unwrap(), 600);
        rig.set_click(true).unwrap();
        assert_eq!(rig.read_brightness().unwrap(), 600, "still dark 1 µs in");
        clock.advance(Duration::from_millis(2));
        assert_eq!(rig.read_brightness().unwrap(), 300);
    }

    #[test]
    fn test_reverts_to_dark_after_release() {
        let clock = VirtualClock::new();
        let mut rig = ScriptedRig::new(clock.clone()).with_levels(600, 300);

        rig.set_click(true).unwrap();
        clock.advance(Duration::from_millis(10));
        assert_eq!(rig.read_brightness().unwrap(), 300);

        rig.set_click(false).unwrap();
        assert_eq!(rig.read_brightness().unwrap(), 300, "reverting takes time");
        clock.advance(Duration::from_millis(10));
        assert_eq!(rig.read_brightness().unwrap(), 600);
    }

    #[test]
    fn test_release_supersedes_stale_transition() {
        // A release shortly after an assert must first settle the assert's
        // pending edge, then schedule the revert from the released state.
        let clock = VirtualClock::new();
        let mut rig = ScriptedRig::new(clock.clone())
            .with_levels(600, 300)
            .with_response_delay(Duration::from_millis(1))
            .with_revert_delay(Duration::from_millis(1));

        rig.set_click(true).unwrap();
        clock.advance(Duration::from_millis(5));
        rig.set_click(false).unwrap();
        clock.advance(Duration::from_millis(5));
        assert_eq!(rig.read_brightness().unwrap(), 600);
    }

    #[test]
    fn test_reads_advance_virtual_time() {
        let clock = VirtualClock::new();
        let mut rig = ScriptedRig::new(clock.clone()).with_read_cost(Duration::from_micros(7));
        rig.read_brightness().unwrap();
        rig.read_brightness().unwrap();
        assert_eq!(clock.now_micros(), 14);
    }

    #[test]
    fn test_enable_windows() {
        let clock = VirtualClock::new();
        let mut rig = ScriptedRig::new(clock.clone()).with_enable_windows(vec![1000..2000]);

        assert!(!rig.is_enabled().unwrap());
        clock.advance(Duration::from_micros(1500));
        assert!(rig.is_enabled().unwrap());
        clock.advance(Duration::from_micros(1000));
        assert!(!rig.is_enabled().unwrap());
    }

    #[test]
    fn test_sensor_fault_window() {
        let clock = VirtualClock::new();
        let mut rig = ScriptedRig::new(clock.clone())
            .with_levels(600, 300)
            .with_sensor_fault_until(Duration::from_millis(1), 80, 60);

        assert_eq!(rig.read_brightness().unwrap(), 80);
        clock.advance(Duration::from_millis(2));
        assert_eq!(rig.read_brightness().unwrap(), 600);
    }

    #[test]
    fn test_event_log_records_click_edges() {
        let clock = VirtualClock::new();
        let mut rig = ScriptedRig::new(clock.clone());
        rig.set_click(true).unwrap();
        clock.advance(Duration::from_millis(1));
        rig.set_click(false).unwrap();

        let asserts = rig.click_assert_times();
        assert_eq!(asserts, vec![Duration::ZERO]);
        assert_eq!(rig.events().len(), 2);
        assert_eq!(rig.events()[1].event, RigEvent::Click(false));
    }
}
