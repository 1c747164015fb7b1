//! Stream driver: keeps the sink fed with one tone for a bounded window.

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;
use platform::AudioSink;

use crate::cancel::CancelToken;
use crate::deadline::{self, Deadline};
use crate::error::EngineError;
use crate::pool::BlockPool;
use crate::waveform::Waveform;

/// Timing shared by every tone window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamTiming {
    /// Bound on one block write
    pub write_timeout: Duration,
    /// Pause after a window before the next tone starts
    pub settle: Duration,
}

/// Counters for one tone window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToneReport {
    /// Blocks accepted by the sink
    pub submissions: u32,
    /// Blocks rewritten because they held another tone
    pub refills: u32,
}

/// Moves blocks from the pool into an [`AudioSink`].
pub struct StreamDriver<'p, 'a, M: RawMutex, const N: usize, const CAP: usize> {
    pool: &'p BlockPool<'a, M, N, CAP>,
    timing: StreamTiming,
}

impl<'p, 'a, M: RawMutex, const N: usize, const CAP: usize> StreamDriver<'p, 'a, M, N, CAP> {
    /// Driver over `pool`.
    pub fn new(pool: &'p BlockPool<'a, M, N, CAP>, timing: StreamTiming) -> Self {
        Self { pool, timing }
    }

    /// Pool the driver draws from.
    pub fn pool(&self) -> &'p BlockPool<'a, M, N, CAP> {
        self.pool
    }

    /// Timing in use.
    pub fn timing(&self) -> StreamTiming {
        self.timing
    }

    /// Transmit `waveform` until `window` has elapsed, then settle.
    ///
    /// Blocks are taken in cursor order. A block is rewritten only when it
    /// holds a different tone, so within one window the ring keeps re-sending
    /// the same contents: that repetition is what sustains the tone. In-flight
    /// blocks are never touched.
    ///
    /// The window is checked before each allocation, so the last block may
    /// start just before the deadline and finish after it.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Write`] on the first failed write. The block goes back
    ///   to the pool and nothing more is sent for this tone.
    /// - [`EngineError::Cancelled`] if `cancel` fires at any wait.
    pub async fn play_tone<S: AudioSink>(
        &self,
        sink: &mut S,
        waveform: &Waveform,
        window: Duration,
        cancel: &CancelToken<M>,
    ) -> Result<ToneReport, EngineError> {
        let deadline = Deadline::after(window);
        let mut report = ToneReport::default();

        while !deadline.expired() {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let mut block = self.pool.allocate(cancel).await?;
            if block.content() != Some(waveform.id()) {
                block.refill(waveform);
                report.refills = report.refills.saturating_add(1);
            }

            let outcome = select(
                sink.write(block.samples(), self.timing.write_timeout),
                cancel.cancelled(),
            )
            .await;
            match outcome {
                Either::First(Ok(())) => {
                    self.pool.dispatch(block);
                    report.submissions = report.submissions.saturating_add(1);
                }
                Either::First(Err(e)) => {
                    self.pool.release(block);
                    return Err(e.into());
                }
                Either::Second(()) => {
                    self.pool.release(block);
                    return Err(EngineError::Cancelled);
                }
            }
        }

        deadline::sleep(self.timing.settle, cancel).await?;
        Ok(report)
    }
}
