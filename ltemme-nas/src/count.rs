//! NAS COUNT management
//!
//! COUNT is a 24-bit value per direction: a 16-bit overflow counter above an
//! 8-bit sequence number (SQN). The SQN travels in full-form security
//! headers; the SERVICE REQUEST carries only its low 5 bits.
//!
//! The stored value is the next COUNT expected (uplink) or to be used
//! (downlink). A received SQN below the stored one advances the overflow
//! part, as in TS 24.301 Section 4.4.3.1. Counters never wrap: passing
//! [`COUNT_MAX`] is a hard failure that requires a new security context.

use thiserror::Error;
use tracing::debug;

use crate::enums::Direction;

/// Highest COUNT a context may reach
pub const COUNT_MAX: u32 = 0x00FF_FFFF - 5;

/// Default freshness window for received sequence numbers
pub const DEFAULT_FRESHNESS_WINDOW: u8 = 5;

const FULL_SQN_MASK: u32 = 0xFF;
const SHORT_SQN_MASK: u32 = 0x1F;

/// The counter would pass [`COUNT_MAX`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("NAS COUNT overflow")]
pub struct CounterOverflow;

/// Full-form freshness: `(sqn - current) mod 256 < window`
pub fn is_fresh_full(current: u32, received_sqn: u8, window: u8) -> bool {
    received_sqn.wrapping_sub((current & FULL_SQN_MASK) as u8) < window
}

/// Short-form freshness: `(sqn - current) mod 32 < window`
pub fn is_fresh_short(current: u32, received_sqn: u8, window: u8) -> bool {
    let diff = (received_sqn as u32).wrapping_sub(current & SHORT_SQN_MASK) & SHORT_SQN_MASK;
    diff < window as u32
}

fn estimate(current: u32, received_sqn: u32, mask: u32) -> u32 {
    let count = (current & !mask & 0x00FF_FFFF) | (received_sqn & mask);
    // TS 24.301 4.4.3.1: a SQN below the stored one means the sender wrapped
    if received_sqn & mask < current & mask {
        count + mask + 1
    } else {
        count
    }
}

/// COUNT for a received full-form SQN: stored overflow bits with the SQN
pub fn estimate_full(current: u32, received_sqn: u8) -> u32 {
    estimate(current, received_sqn as u32, FULL_SQN_MASK)
}

/// COUNT for a received 5-bit SQN: stored high 19 bits with the SQN
pub fn estimate_short(current: u32, received_sqn: u8) -> u32 {
    estimate(current, received_sqn as u32, SHORT_SQN_MASK)
}

/// Uplink and downlink COUNT with a freshness window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterManager {
    counts: [u32; 2],
    window: u8,
}

impl Default for CounterManager {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterManager {
    /// Both counters at zero, default window
    pub fn new() -> Self {
        Self::with_window(DEFAULT_FRESHNESS_WINDOW)
    }

    /// Both counters at zero with a custom freshness window
    pub fn with_window(window: u8) -> Self {
        Self { counts: [0, 0], window }
    }

    /// Freshness window
    pub fn window(&self) -> u8 {
        self.window
    }

    /// Stored COUNT for `direction`
    pub fn get(&self, direction: Direction) -> u32 {
        self.counts[direction.index()]
    }

    /// Last COUNT received or sent, one below the stored value
    pub fn last_count(&self, direction: Direction) -> u32 {
        self.get(direction).saturating_sub(1)
    }

    /// Set the stored COUNT, e.g. when restoring a context
    pub fn set(&mut self, direction: Direction, count: u32) -> Result<(), CounterOverflow> {
        self.commit(direction, count)
    }

    /// Zero both counters
    pub fn reset(&mut self) {
        self.counts = [0, 0];
    }

    fn commit(&mut self, direction: Direction, next: u32) -> Result<(), CounterOverflow> {
        if next > COUNT_MAX {
            debug!(?direction, next, "NAS COUNT would pass its limit");
            return Err(CounterOverflow);
        }
        self.counts[direction.index()] = next;
        Ok(())
    }

    /// Advance by one.
    pub fn increment(&mut self, direction: Direction) -> Result<(), CounterOverflow> {
        let next = self.get(direction) + 1;
        self.commit(direction, next)
    }

    /// Resynchronise to a validated full-form SQN, then advance by one.
    pub fn accept_full(&mut self, direction: Direction, received_sqn: u8) -> Result<(), CounterOverflow> {
        let next = estimate_full(self.get(direction), received_sqn) + 1;
        self.commit(direction, next)
    }

    /// Resynchronise the low 5 bits to a validated short SQN, then advance by one.
    pub fn accept_short(&mut self, direction: Direction, received_sqn: u8) -> Result<(), CounterOverflow> {
        let next = estimate_short(self.get(direction), received_sqn) + 1;
        self.commit(direction, next)
    }

    /// Whether a full-form SQN is inside the window for `direction`
    pub fn is_fresh_full(&self, direction: Direction, received_sqn: u8) -> bool {
        is_fresh_full(self.get(direction), received_sqn, self.window)
    }

    /// Whether a 5-bit SQN is inside the window for `direction`
    pub fn is_fresh_short(&self, direction: Direction, received_sqn: u8) -> bool {
        is_fresh_short(self.get(direction), received_sqn, self.window)
    }
}
