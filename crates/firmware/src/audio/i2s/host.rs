//! Real-time paced I2S transmitter for the desktop emulator.
//!
//! Models a transmit queue `block_count` blocks deep that plays one block per
//! block duration once started. `write` suspends while the queue is full, so
//! the engine runs at the same pace it would against the SAI. Underruns
//! (queue ran dry while started) are counted, and tone changes are logged.

use embassy_time::{Duration, Instant, Timer};
use platform::{ConfigError, I2sTransmitter, I2sTrigger, StreamConfig, WriteError};
use selcall::Waveform;

use super::signature;

/// Host transmitter paced by the configured block duration.
#[derive(Debug, Default)]
pub struct HostI2s {
    block_duration: Option<Duration>,
    depth: u32,
    started: bool,
    pending: u32,
    queue_end: Option<Instant>,
    labels: &'static [Waveform],
    last_signature: Option<i16>,
    /// Blocks accepted
    pub blocks: u64,
    /// Times the queue ran dry while started
    pub underruns: u32,
}

impl HostI2s {
    /// Create an unconfigured transmitter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Name tone changes after these waveforms in the log.
    pub fn with_labels(mut self, labels: &'static [Waveform]) -> Self {
        self.labels = labels;
        self
    }

    fn backlog(&self) -> Option<Duration> {
        self.block_duration?.checked_mul(self.depth)
    }

    fn note_block(&mut self, block: &[i16]) {
        let sig = signature(block);
        if self.last_signature == Some(sig) {
            return;
        }
        self.last_signature = Some(sig);
        match self
            .labels
            .iter()
            .find(|w| w.samples().get(1).copied() == Some(sig))
        {
            Some(w) => tracing::info!(tone = %w.id(), block = self.blocks, "tone change"),
            None => tracing::info!(signature = sig, block = self.blocks, "tone change"),
        }
    }
}

impl I2sTransmitter for HostI2s {
    async fn configure(&mut self, config: &StreamConfig) -> Result<(), ConfigError> {
        let depth =
            u32::try_from(config.pool.block_count).map_err(|_| ConfigError::InvalidParameter)?;
        let block_duration = config.block_duration();
        if block_duration == Duration::from_ticks(0) {
            return Err(ConfigError::InvalidParameter);
        }
        self.block_duration = Some(block_duration);
        self.depth = depth;
        self.started = false;
        self.pending = 0;
        self.queue_end = None;
        tracing::info!(
            block_ms = block_duration.as_millis(),
            depth,
            "host I2S configured"
        );
        Ok(())
    }

    async fn write(&mut self, block: &[i16]) -> Result<(), WriteError> {
        let dur = self.block_duration.ok_or(WriteError::NotReady)?;

        if self.started {
            let backlog = self.backlog().ok_or(WriteError::Io)?;
            let now = Instant::now();
            let end = match self.queue_end {
                Some(end) if end > now => end,
                _ => {
                    self.underruns = self.underruns.saturating_add(1);
                    tracing::debug!(underruns = self.underruns, "host I2S underrun");
                    now
                }
            };
            // Room opens when the queue holds less than `depth` blocks.
            if let Some(room_at) = end.checked_sub(backlog) {
                if room_at > now {
                    Timer::at(room_at).await;
                }
            }
            self.queue_end = Some(end.checked_add(dur).ok_or(WriteError::Io)?);
        } else {
            if self.pending >= self.depth {
                return Err(WriteError::Io);
            }
            self.pending = self.pending.saturating_add(1);
        }

        self.note_block(block);
        self.blocks = self.blocks.saturating_add(1);
        Ok(())
    }

    async fn trigger(&mut self, trigger: I2sTrigger) -> Result<(), WriteError> {
        let dur = self.block_duration.ok_or(WriteError::NotReady)?;
        match trigger {
            I2sTrigger::Start => {
                let queued = dur.checked_mul(self.pending).ok_or(WriteError::Io)?;
                self.queue_end = Instant::now().checked_add(queued);
                self.pending = 0;
                self.started = true;
                tracing::info!("host I2S started");
            }
            I2sTrigger::Drain | I2sTrigger::Drop => {
                self.started = false;
                self.pending = 0;
                self.queue_end = None;
                tracing::info!(
                    blocks = self.blocks,
                    underruns = self.underruns,
                    "host I2S stopped"
                );
            }
        }
        Ok(())
    }
}
