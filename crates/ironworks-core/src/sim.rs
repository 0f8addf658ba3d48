//! Simulation clock and state hashing.

use crate::fixed::{Fixed64, Money, Ticks};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Clock state tracked by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimState {
    /// Steps executed so far, forced steps included.
    pub tick: Ticks,
    /// Completed days.
    pub day: u64,
    /// Seconds elapsed in the current day.
    pub day_timer: Fixed64,
}

impl SimState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            day: 0,
            day_timer: Fixed64::ZERO,
        }
    }

    /// Advance the day clock by `dt`. Returns true when a day boundary is
    /// crossed; the timer then restarts at zero.
    pub fn advance_day(&mut self, dt: Fixed64, day_length: Fixed64) -> bool {
        self.day_timer += dt;
        if self.day_timer >= day_length {
            self.day_timer = Fixed64::ZERO;
            self.day += 1;
            true
        } else {
            false
        }
    }
}

impl Default for SimState {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tick report
// ---------------------------------------------------------------------------

/// Summary of one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Number of buildings that ran their tick.
    pub buildings_ticked: usize,
    /// Money debited during the step.
    pub spent: Money,
    /// Money credited by sales during the step.
    pub earned: Money,
    /// Whether the step closed a day.
    pub day_ended: bool,
}

// ---------------------------------------------------------------------------
// State hash
// ---------------------------------------------------------------------------

/// A deterministic hash of simulation state for comparing two runs.
///
/// Uses FNV-1a (64-bit). Not cryptographic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_i64(&mut self, v: i64) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_fixed64(&mut self, v: Fixed64) {
        self.write(&v.to_bits().to_le_bytes());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}
