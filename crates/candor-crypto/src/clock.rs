//! Injectable time source.
//!
//! Survey windows are the only time-based gate in the ledger, and every
//! public operation reads the clock at most once. Swapping the source lets
//! tests drive the clock manually instead of sleeping through submission
//! windows.

use candor_core::{CandorError, Result};
use parking_lot::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Abstract clock collaborator.
///
/// Implementations must produce monotonically non-decreasing Unix
/// timestamps in seconds. The ledger never caches a reading across
/// operations.
pub trait TimeSource: Send + Sync {
    /// Get the current Unix timestamp in seconds
    fn current_timestamp(&self) -> Result<u64>;

    /// Advance time by N seconds (no-op for real clocks)
    fn advance(&self, _seconds: u64) -> Result<()> {
        Ok(())
    }

    /// Jump to an absolute time (simulated clocks only)
    fn set_time(&self, _timestamp: u64) -> Result<()> {
        Err(CandorError::clock(
            "time travel not supported by this time source",
        ))
    }
}

/// Real system clock (production use)
#[derive(Debug, Clone, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    /// Create a new system time source
    pub fn new() -> Self {
        SystemTimeSource
    }
}

impl TimeSource for SystemTimeSource {
    fn current_timestamp(&self) -> Result<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| CandorError::clock(format!("system time is before Unix epoch: {e}")))
    }
}

/// Manually driven clock for deterministic tests.
///
/// Time only moves when the test moves it, so window-gating behavior can be
/// pinned to exact instants.
#[derive(Debug)]
pub struct SimulatedTimeSource {
    current: Mutex<u64>,
}

impl SimulatedTimeSource {
    /// Create a simulated clock starting at the given timestamp
    pub fn new(initial_timestamp: u64) -> Self {
        SimulatedTimeSource {
            current: Mutex::new(initial_timestamp),
        }
    }
}

impl TimeSource for SimulatedTimeSource {
    fn current_timestamp(&self) -> Result<u64> {
        Ok(*self.current.lock())
    }

    fn advance(&self, seconds: u64) -> Result<()> {
        let mut current = self.current.lock();
        *current = current.saturating_add(seconds);
        Ok(())
    }

    fn set_time(&self, timestamp: u64) -> Result<()> {
        *self.current.lock() = timestamp;
        Ok(())
    }
}
