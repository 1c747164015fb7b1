//! Mock I2S transmitter for host-side testing
//!
//! Implements [`platform::I2sTransmitter`] without any hardware dependency.
//! Records configuration, triggers and a signature of every accepted block.

use embassy_time::{Duration, Timer};
use platform::{ConfigError, I2sTransmitter, I2sTrigger, StreamConfig, WriteError};

use super::signature;

/// Blocks whose signature is kept; later writes are only counted.
pub const MOCK_I2S_HISTORY: usize = 256;

/// Mock transmitter: records all calls for test assertions.
#[derive(Debug, Default)]
pub struct MockI2s {
    /// Config from the last `configure`
    pub config: Option<StreamConfig>,
    /// Total blocks accepted
    pub writes: usize,
    /// Total interleaved samples accepted
    pub samples_written: usize,
    /// Signature (sample 2) of each accepted block, oldest first
    pub signatures: heapless::Vec<i16, MOCK_I2S_HISTORY>,
    /// Triggers in the order they were issued
    pub triggers: heapless::Vec<I2sTrigger, 16>,
    /// Simulated time for the queue to accept one block
    pub accept_delay: Duration,
    /// Fail every write with [`WriteError::Io`] once this many blocks were accepted
    pub fail_after: Option<usize>,
}

impl MockI2s {
    /// Create a mock that accepts every block immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept each block only after `delay`.
    pub fn with_accept_delay(mut self, delay: Duration) -> Self {
        self.accept_delay = delay;
        self
    }

    /// Fail writes once `n` blocks were accepted.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Whether a [`I2sTrigger::Start`] was issued.
    pub fn started(&self) -> bool {
        self.triggers.contains(&I2sTrigger::Start)
    }
}

impl I2sTransmitter for MockI2s {
    async fn configure(&mut self, config: &StreamConfig) -> Result<(), ConfigError> {
        self.config = Some(*config);
        Ok(())
    }

    async fn write(&mut self, block: &[i16]) -> Result<(), WriteError> {
        if self.fail_after.is_some_and(|n| self.writes >= n) {
            return Err(WriteError::Io);
        }
        if self.accept_delay > Duration::from_ticks(0) {
            Timer::after(self.accept_delay).await;
        }
        self.writes = self.writes.saturating_add(1);
        self.samples_written = self.samples_written.saturating_add(block.len());
        // History is bounded; overflow only drops signatures.
        let _ = self.signatures.push(signature(block));
        Ok(())
    }

    async fn trigger(&mut self, trigger: I2sTrigger) -> Result<(), WriteError> {
        let _ = self.triggers.push(trigger);
        Ok(())
    }
}
