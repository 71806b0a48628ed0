//! Randomized inter-trial pacing.
//!
//! Trials are separated by a delay drawn uniformly at random from a fixed
//! range so the rig never accidentally synchronizes with periodic behavior
//! in the system under test (display refresh, input polling, compositor
//! ticks). The generator is a seeded `ChaCha8Rng`: given the same seed it
//! reproduces the same delay sequence, which keeps measurement runs
//! replayable and tests deterministic.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Seeded uniform delay generator.
#[derive(Debug)]
pub struct Pacing {
    rng: ChaCha8Rng,
    seed: u64,
}

impl Pacing {
    /// Creates a generator from an explicit seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Creates a generator from OS entropy, keeping the drawn seed
    /// observable so it can be recorded in the transcript.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::thread_rng().gen())
    }

    /// The seed this generator was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draws a delay uniformly from `[min_ms, max_ms)` milliseconds.
    ///
    /// Callers must ensure `min_ms < max_ms`; the controller validates its
    /// pacing range at construction.
    pub fn draw(&mut self, min_ms: u64, max_ms: u64) -> Duration {
        Duration::from_millis(self.rng.gen_range(min_ms..max_ms))
    }
}
