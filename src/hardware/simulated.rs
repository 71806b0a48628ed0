//! Real-time simulated rig for the demo binary.
//!
//! [`SimulatedRig`] behaves like a plausible physical setup on the real
//! clock: the display goes bright a configurable latency (base plus uniform
//! jitter) after the click is asserted, reverts a fixed delay after release,
//! and sensor readings carry a few counts of seeded noise. This lets the full
//! controller loop run end-to-end, producing a realistic transcript, with no
//! hardware attached.

use super::{BrightnessSensor, ClickTrigger, EnableSwitch, IndicatorLeds};
use crate::error::RigError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};
use tracing::trace;

/// Software stand-in for the optocoupler/photoresistor rig.
#[derive(Debug)]
pub struct SimulatedRig {
    rng: ChaCha8Rng,
    dark_level: u16,
    bright_level: u16,
    noise_counts: u16,
    latency_base: Duration,
    latency_jitter: Duration,
    revert_delay: Duration,
    lit: bool,
    pending: Option<(Instant, bool)>,
}

impl SimulatedRig {
    /// Creates a rig with representative levels (dark 620, bright 310,
    /// ±4 counts of noise), a 35 ms ± 10 ms stimulus latency, and a 40 ms
    /// revert.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            dark_level: 620,
            bright_level: 310,
            noise_counts: 4,
            latency_base: Duration::from_millis(35),
            latency_jitter: Duration::from_millis(10),
            revert_delay: Duration::from_millis(40),
            lit: false,
            pending: None,
        }
    }

    /// Sets the simulated stimulus latency: `base` plus a uniform draw from
    /// `[0, jitter]`.
    pub fn with_latency(mut self, base: Duration, jitter: Duration) -> Self {
        self.latency_base = base;
        self.latency_jitter = jitter;
        self
    }

    /// Sets the steady dark/bright sensor levels.
    pub fn with_levels(mut self, dark: u16, bright: u16) -> Self {
        self.dark_level = dark;
        self.bright_level = bright;
        self
    }

    fn settle_pending(&mut self) {
        if let Some((at, lit)) = self.pending {
            if Instant::now() >= at {
                self.lit = lit;
                self.pending = None;
            }
        }
    }

    fn noisy(&mut self, level: u16) -> u16 {
        let spread = i32::from(self.noise_counts);
        let noise = if spread > 0 {
            self.rng.gen_range(-spread..=spread)
        } else {
            0
        };
        (i32::from(level) + noise).clamp(0, 1023) as u16
    }
}

impl BrightnessSensor for SimulatedRig {
    fn read_brightness(&mut self) -> Result<u16, RigError> {
        self.settle_pending();
        let level = if self.lit {
            self.bright_level
        } else {
            self.dark_level
        };
        Ok(self.noisy(level))
    }
}

impl ClickTrigger for SimulatedRig {
    fn set_click(&mut self, on: bool) -> Result<(), RigError> {
        self.settle_pending();
        let delay = if on {
            let jitter_micros = self.latency_jitter.as_micros() as u64;
            let jitter = if jitter_micros > 0 {
                Duration::from_micros(self.rng.gen_range(0..=jitter_micros))
            } else {
                Duration::ZERO
            };
            self.latency_base + jitter
        } else {
            self.revert_delay
        };
        trace!(on, delay_us = delay.as_micros() as u64, "click edge");
        self.pending = Some((Instant::now() + delay, on));
        Ok(())
    }
}

impl EnableSwitch for SimulatedRig {
    fn is_enabled(&mut self) -> Result<bool, RigError> {
        Ok(true)
    }
}

impl IndicatorLeds for SimulatedRig {}
