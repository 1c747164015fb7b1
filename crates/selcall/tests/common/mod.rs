//! Shared fixtures: a scripted sink and constant-valued waveforms.
#![allow(dead_code)]

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};
use platform::{AudioSink, ConfigError, OutputLevel, StreamConfig, WriteError};
use selcall::{BlockConsumed, Waveform};

/// Samples per synthetic waveform.
pub const L: usize = 8;
/// Interleaved samples per synthetic block.
pub const CAP: usize = 2 * L;
/// Blocks per synthetic pool.
pub const N: usize = 4;

/// `L` copies of `v`, so every sample of a block identifies its tone.
pub fn constant(v: i16) -> Waveform {
    let samples: &'static [i16] = Box::leak(vec![v; L].into_boxed_slice());
    Waveform::new(u16::try_from(v).unwrap(), samples)
}

/// Everything the engine asked of the sink, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Configure,
    SetLevel(OutputLevel),
    StartOutput,
    /// Accepted write, tagged with the block's signature
    Write(i16),
    /// Rejected write, tagged with the block's signature
    FailedWrite(i16),
    Trigger,
}

/// Sink that takes `cost` per write and signals completion on success.
///
/// A block's signature is its third sample (left channel of frame 1). For
/// constant waveforms that is the constant; for generated tones it is the
/// second table entry, which differs per frequency.
pub struct ScriptedSink<'p> {
    pub cost: Duration,
    pub fail_on: Option<i16>,
    pub fail_configure: Option<ConfigError>,
    pub calls: Vec<Call>,
    pub config: Option<StreamConfig>,
    completions: Option<Sender<'p, NoopRawMutex, BlockConsumed, N>>,
}

impl<'p> ScriptedSink<'p> {
    pub fn new(cost: Duration) -> Self {
        Self {
            cost,
            fail_on: None,
            fail_configure: None,
            calls: Vec::new(),
            config: None,
            completions: None,
        }
    }

    pub fn with_completions(mut self, sender: Sender<'p, NoopRawMutex, BlockConsumed, N>) -> Self {
        self.completions = Some(sender);
        self
    }

    pub fn failing_on(mut self, signature: i16) -> Self {
        self.fail_on = Some(signature);
        self
    }

    /// Signatures of accepted writes, in order.
    pub fn written(&self) -> Vec<i16> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Write(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn failed(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::FailedWrite(_)))
            .count()
    }
}

pub fn signature(block: &[i16]) -> i16 {
    block.get(2).copied().unwrap_or(0)
}

impl AudioSink for ScriptedSink<'_> {
    async fn configure(&mut self, config: &StreamConfig) -> Result<(), ConfigError> {
        self.calls.push(Call::Configure);
        if let Some(e) = self.fail_configure {
            return Err(e);
        }
        self.config = Some(*config);
        Ok(())
    }

    async fn set_output_level(&mut self, level: OutputLevel) -> Result<(), ConfigError> {
        self.calls.push(Call::SetLevel(level));
        Ok(())
    }

    async fn start_output(&mut self) -> Result<(), ConfigError> {
        self.calls.push(Call::StartOutput);
        Ok(())
    }

    async fn write(&mut self, block: &[i16], _timeout: Duration) -> Result<(), WriteError> {
        let sig = signature(block);
        if self.fail_on == Some(sig) {
            self.calls.push(Call::FailedWrite(sig));
            return Err(WriteError::Io);
        }
        if self.cost == Duration::from_ticks(0) {
            embassy_futures::yield_now().await;
        } else {
            Timer::after(self.cost).await;
        }
        self.calls.push(Call::Write(sig));
        if let Some(tx) = &self.completions {
            tx.try_send(BlockConsumed).unwrap();
        }
        Ok(())
    }

    async fn trigger_start(&mut self) -> Result<(), WriteError> {
        self.calls.push(Call::Trigger);
        Ok(())
    }
}
