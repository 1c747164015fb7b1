//! Engine bootstrap: configure the sink, prime the pool, start the stream,
//! then hand over to the sequencer.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;
use platform::{AudioSink, LevelDb, OutputLevel, SampleRateHz, StreamConfig};

use crate::cancel::CancelToken;
use crate::deadline;
use crate::error::EngineError;
use crate::fill::check_fits;
use crate::pool::BlockPool;
use crate::sequencer::{Sequencer, SELCALL_TONES};
use crate::stream::{StreamDriver, StreamTiming};
use crate::waveform::tones;

/// Runtime knobs. [`Default`] gives the reference board behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Stream rate (48 kHz)
    pub sample_rate: SampleRateHz,
    /// Bound on one block write (2000 ms)
    pub write_timeout: Duration,
    /// Transmit window per tone (100 ms)
    pub tone_window: Duration,
    /// Quiet time after each tone (10 ms)
    pub settle: Duration,
    /// Pause between calls (1 s)
    pub cycle_pause: Duration,
    /// Wait between codec configuration and level setting (1 s)
    pub codec_settle: Duration,
    /// Output level applied at startup (-50 dB, unmuted)
    pub output_level: OutputLevel,
    /// Enable the codec output stage before triggering the stream
    pub start_codec_output: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRateHz::HZ_48000,
            write_timeout: Duration::from_millis(2000),
            tone_window: Duration::from_millis(100),
            settle: Duration::from_millis(10),
            cycle_pause: Duration::from_secs(1),
            codec_settle: Duration::from_secs(1),
            output_level: OutputLevel::unmuted(LevelDb::from_db(-50)),
            start_codec_output: true,
        }
    }
}

impl EngineConfig {
    /// Set the per-block write timeout.
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    /// Set the per-tone transmit window.
    #[must_use]
    pub fn with_tone_window(mut self, window: Duration) -> Self {
        self.tone_window = window;
        self
    }

    /// Set the post-tone settle delay.
    #[must_use]
    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = settle;
        self
    }

    /// Set the pause between calls.
    #[must_use]
    pub fn with_cycle_pause(mut self, pause: Duration) -> Self {
        self.cycle_pause = pause;
        self
    }

    /// Set the codec settle delay.
    #[must_use]
    pub fn with_codec_settle(mut self, settle: Duration) -> Self {
        self.codec_settle = settle;
        self
    }

    /// Set the startup output level.
    #[must_use]
    pub fn with_output_level(mut self, level: OutputLevel) -> Self {
        self.output_level = level;
        self
    }

    /// Skip (or keep) enabling the codec output stage.
    #[must_use]
    pub fn with_start_codec_output(mut self, start: bool) -> Self {
        self.start_codec_output = start;
        self
    }

    /// Stream description for a pool of `N` blocks of `CAP` samples.
    pub fn stream_config<const N: usize, const CAP: usize>(&self) -> StreamConfig {
        StreamConfig::stereo_16bit(
            self.sample_rate,
            N,
            CAP.saturating_mul(core::mem::size_of::<i16>()),
            self.write_timeout,
        )
    }

    /// Timing for the stream driver.
    pub fn timing(&self) -> StreamTiming {
        StreamTiming {
            write_timeout: self.write_timeout,
            settle: self.settle,
        }
    }
}

/// A started engine: sink configured, stream running, sequencer at tone 1.
pub struct SelcallEngine<'p, 'a, S, M: RawMutex, const N: usize, const CAP: usize> {
    sink: S,
    driver: StreamDriver<'p, 'a, M, N, CAP>,
    sequencer: Sequencer<SELCALL_TONES>,
}

impl<'p, 'a, S, M, const N: usize, const CAP: usize> SelcallEngine<'p, 'a, S, M, N, CAP>
where
    S: AudioSink,
    M: RawMutex,
{
    /// Bring the output path up and start streaming the priming tone.
    ///
    /// 1. Check every waveform fits a block and the pool matches the stream.
    /// 2. Configure the sink.
    /// 3. Wait `codec_settle`, then set the output level.
    /// 4. Fill every block with the priming tone.
    /// 5. Enable the codec output (unless disabled).
    /// 6. Queue the first block and trigger the transmitter.
    ///
    /// Nothing is retried. On error the sink is dropped and no stream runs.
    ///
    /// # Errors
    ///
    /// [`EngineError::Capacity`], [`EngineError::Config`] or
    /// [`EngineError::Write`] from the step that failed;
    /// [`EngineError::Cancelled`] if cancelled at any wait.
    pub async fn start(
        mut sink: S,
        pool: &'p BlockPool<'a, M, N, CAP>,
        config: EngineConfig,
        cancel: &CancelToken<M>,
    ) -> Result<Self, EngineError> {
        let sequencer = Sequencer::selcall(config.tone_window, config.cycle_pause);
        check_fits(&tones::PRIMING, CAP)?;
        for entry in sequencer.entries() {
            check_fits(&entry.waveform, CAP)?;
        }

        let stream = config.stream_config::<N, CAP>();
        stream.validate()?;
        info!(
            "audio: {} Hz, {} blocks of {} bytes",
            stream.sample_rate.get(),
            stream.pool.block_count,
            stream.block_bytes
        );
        sink.configure(&stream).await?;

        deadline::sleep(config.codec_settle, cancel).await?;
        sink.set_output_level(config.output_level).await?;

        for _ in 0..N {
            let mut block = pool.allocate(cancel).await?;
            block.refill(&tones::PRIMING);
            pool.release(block);
        }
        debug!("pool primed with {}", tones::PRIMING.id());

        if config.start_codec_output {
            sink.start_output().await?;
        }

        let first = pool.allocate(cancel).await?;
        let written = sink.write(first.samples(), config.write_timeout).await;
        match written {
            Ok(()) => pool.dispatch(first),
            Err(e) => {
                pool.release(first);
                return Err(e.into());
            }
        }
        sink.trigger_start().await?;
        info!("audio: stream started");

        Ok(Self {
            sink,
            driver: StreamDriver::new(pool, config.timing()),
            sequencer,
        })
    }

    /// Play the selective call forever, until cancelled.
    ///
    /// # Errors
    ///
    /// Only non-recoverable errors; per-tone write failures are logged and
    /// skipped, and cancellation returns `Ok(())`.
    pub async fn run(&mut self, cancel: &CancelToken<M>) -> Result<(), EngineError> {
        self.sequencer
            .run(&self.driver, &mut self.sink, cancel)
            .await
    }

    /// Sink, for inspection.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Sequencer, for inspection.
    pub fn sequencer(&self) -> &Sequencer<SELCALL_TONES> {
        &self.sequencer
    }

    /// Tear down and return the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Task body: start the engine and run it until cancelled.
///
/// A startup failure is logged and returned; the engine stays inert.
///
/// # Errors
///
/// The startup error, or a non-recoverable error from the sequencer.
pub async fn run_selcall<S, M, const N: usize, const CAP: usize>(
    sink: S,
    pool: &BlockPool<'_, M, N, CAP>,
    config: EngineConfig,
    cancel: &CancelToken<M>,
) -> Result<(), EngineError>
where
    S: AudioSink,
    M: RawMutex,
{
    let mut engine = match SelcallEngine::start(sink, pool, config, cancel).await {
        Ok(engine) => engine,
        Err(EngineError::Cancelled) => {
            info!("audio: cancelled during startup");
            return Ok(());
        }
        Err(e) => {
            error!("audio: init failed: {}", e);
            return Err(e);
        }
    };
    engine.run(cancel).await
}
