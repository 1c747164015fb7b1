//! [`CodecSink`]: a DAC control interface and an I2S transmitter presented to
//! the tone engine as one [`AudioSink`].
//!
//! The sink owns the parts of the output contract neither half knows about:
//!
//! - writes before a successful `configure` are rejected with
//!   [`WriteError::NotReady`]
//! - every write is bounded by the caller's timeout
//! - each block the transmitter accepts is reported to the block pool as a
//!   [`BlockConsumed`] event, in submission order

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{with_timeout, Duration};
use platform::{
    AudioCodec, AudioSink, ConfigError, I2sTransmitter, I2sTrigger, OutputLevel, StreamConfig,
    WriteError,
};
use selcall::BlockConsumed;

/// Codec + transmitter composed into an [`AudioSink`].
pub struct CodecSink<'p, C, T, M: RawMutex, const N: usize> {
    codec: C,
    tx: T,
    completions: Sender<'p, M, BlockConsumed, N>,
    configured: bool,
    accepted: u32,
    codec_faults: u32,
}

impl<'p, C, T, M, const N: usize> CodecSink<'p, C, T, M, N>
where
    C: AudioCodec,
    T: I2sTransmitter,
    M: RawMutex,
{
    /// Compose `codec` and `tx`. Accepted blocks are reported on `completions`
    /// (normally [`selcall::BlockPool::completion_sender`]).
    pub fn new(codec: C, tx: T, completions: Sender<'p, M, BlockConsumed, N>) -> Self {
        Self {
            codec,
            tx,
            completions,
            configured: false,
            accepted: 0,
            codec_faults: 0,
        }
    }

    /// Whether `configure` has succeeded.
    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Blocks accepted by the transmitter so far.
    pub fn accepted(&self) -> u32 {
        self.accepted
    }

    /// Codec control operations that failed on the bus so far.
    pub fn codec_faults(&self) -> u32 {
        self.codec_faults
    }

    /// The codec half.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// The transmitter half.
    pub fn transmitter(&self) -> &T {
        &self.tx
    }

    /// Mute the codec and drop whatever is still queued on the transmitter.
    ///
    /// The sink must be configured again before the next write.
    pub async fn shutdown(&mut self) -> Result<(), ConfigError> {
        self.configured = false;
        if self.tx.trigger(I2sTrigger::Drop).await.is_err() {
            warn!("I2S drop trigger failed during shutdown");
        }
        match self.codec.stop_output().await {
            Ok(()) => Ok(()),
            Err(_) => Err(self.codec_fault("stop_output")),
        }
    }

    /// Split back into the codec and transmitter.
    pub fn into_parts(self) -> (C, T) {
        (self.codec, self.tx)
    }

    fn codec_fault(&mut self, op: &'static str) -> ConfigError {
        self.codec_faults = self.codec_faults.saturating_add(1);
        warn!("codec {} failed on the control bus ({} so far)", op, self.codec_faults);
        ConfigError::Codec
    }
}


impl<C, T, M, const N: usize> AudioSink for CodecSink<'_, C, T, M, N>
where
    C: AudioCodec,
    T: I2sTransmitter,
    M: RawMutex,
{
    async fn configure(&mut self, config: &StreamConfig) -> Result<(), ConfigError> {
        self.configured = false;
        config.validate()?;

        if self.codec.configure(config).await.is_err() {
            return Err(self.codec_fault("configure"));
        }
        self.tx.configure(config).await?;

        info!(
            "Audio sink configured: {} Hz, {} blocks of {} bytes",
            config.sample_rate.get(),
            config.pool.block_count,
            config.block_bytes
        );
        self.configured = true;
        Ok(())
    }

    async fn set_output_level(&mut self, level: OutputLevel) -> Result<(), ConfigError> {
        match self.codec.set_output_level(level).await {
            Ok(()) => Ok(()),
            Err(_) => Err(self.codec_fault("set_output_level")),
        }
    }

    async fn start_output(&mut self) -> Result<(), ConfigError> {
        match self.codec.start_output().await {
            Ok(()) => Ok(()),
            Err(_) => Err(self.codec_fault("start_output")),
        }
    }

    async fn write(&mut self, block: &[i16], timeout: Duration) -> Result<(), WriteError> {
        if !self.configured {
            return Err(WriteError::NotReady);
        }
        with_timeout(timeout, self.tx.write(block))
            .await
            .map_err(|_| WriteError::Timeout)??;

        self.accepted = self.accepted.wrapping_add(1);
        if self.completions.try_send(BlockConsumed).is_err() {
            // Cannot happen while the pool holds at most N blocks in flight.
            warn!("Completion queue full; block {} not reported", self.accepted);
        }
        Ok(())
    }

    async fn trigger_start(&mut self) -> Result<(), WriteError> {
        if !self.configured {
            return Err(WriteError::NotReady);
        }
        self.tx.trigger(I2sTrigger::Start).await
    }
}
