//! Tone sequencer: the five-tone call, a pause, repeat.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Duration;
use platform::{AudioSink, WriteError};

use crate::cancel::CancelToken;
use crate::deadline;
use crate::error::EngineError;
use crate::stream::{StreamDriver, ToneReport};
use crate::waveform::{tones, Waveform};

/// Tones in one selective call.
pub const SELCALL_TONES: usize = 5;

/// One tone and how long to transmit it.
#[derive(Debug, Clone, Copy)]
pub struct ToneEntry {
    /// Tone to play
    pub waveform: Waveform,
    /// Transmit window
    pub window: Duration,
}

/// Where the sequencer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequencerState {
    /// Next step plays entry `n`
    Playing(usize),
    /// Next step is the inter-cycle pause
    Pausing,
}

/// What to do next.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    /// Play `entry`, the `index`-th tone of the cycle
    Play {
        /// Position within the cycle
        index: usize,
        /// Tone and window
        entry: ToneEntry,
    },
    /// Stay silent for the given time, then start over
    Pause(Duration),
}

/// Result of one tone within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToneOutcome {
    /// Not reached in this cycle
    Pending,
    /// Window ran to its end
    Completed(ToneReport),
    /// Window ended early on a write error
    Aborted(WriteError),
}

/// Per-tone outcomes of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport<const LEN: usize> {
    /// Outcome per entry, in sequence order
    pub outcomes: [ToneOutcome; LEN],
}

impl<const LEN: usize> CycleReport<LEN> {
    fn new() -> Self {
        Self {
            outcomes: [ToneOutcome::Pending; LEN],
        }
    }

    /// Tones that ran their whole window.
    pub fn completed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ToneOutcome::Completed(_)))
            .count()
    }

    /// Tones cut short by a write error.
    pub fn aborted(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ToneOutcome::Aborted(_)))
            .count()
    }
}

/// Cycles through `LEN` tone entries and a pause, forever.
pub struct Sequencer<const LEN: usize> {
    entries: [ToneEntry; LEN],
    pause: Duration,
    state: SequencerState,
    cycles: u32,
}

impl Sequencer<SELCALL_TONES> {
    /// 852 → 1393 → 1020 → 2100 → 1153 Hz, each for `window`, then `pause`.
    pub fn selcall(window: Duration, pause: Duration) -> Self {
        Self::new(
            tones::SELCALL_SEQUENCE.map(|waveform| ToneEntry { waveform, window }),
            pause,
        )
    }
}

impl<const LEN: usize> Sequencer<LEN> {
    /// Sequencer positioned on the first entry.
    pub fn new(entries: [ToneEntry; LEN], pause: Duration) -> Self {
        Self {
            entries,
            pause,
            state: SequencerState::Playing(0),
            cycles: 0,
        }
    }

    /// Entries in play order.
    pub fn entries(&self) -> &[ToneEntry; LEN] {
        &self.entries
    }

    /// Current state.
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Full cycles finished so far.
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Advance the state machine by one step.
    pub fn next_step(&mut self) -> Step {
        match self.state {
            SequencerState::Playing(index) => match self.entries.get(index) {
                Some(&entry) => {
                    let next = index.saturating_add(1);
                    self.state = if next < LEN {
                        SequencerState::Playing(next)
                    } else {
                        SequencerState::Pausing
                    };
                    Step::Play { index, entry }
                }
                None => self.pause_step(),
            },
            SequencerState::Pausing => self.pause_step(),
        }
    }

    fn pause_step(&mut self) -> Step {
        self.state = SequencerState::Playing(0);
        self.cycles = self.cycles.wrapping_add(1);
        Step::Pause(self.pause)
    }

    /// Play every tone of one cycle, then the pause.
    ///
    /// A write error aborts only the tone it happened in; the next tone starts
    /// as scheduled.
    ///
    /// # Errors
    ///
    /// [`EngineError::Cancelled`] if cancelled at any wait. Other errors from
    /// the driver are passed up unchanged.
    pub async fn run_cycle<S, M, const N: usize, const CAP: usize>(
        &mut self,
        driver: &StreamDriver<'_, '_, M, N, CAP>,
        sink: &mut S,
        cancel: &CancelToken<M>,
    ) -> Result<CycleReport<LEN>, EngineError>
    where
        S: AudioSink,
        M: RawMutex,
    {
        let mut report = CycleReport::new();
        loop {
            match self.next_step() {
                Step::Play { index, entry } => {
                    let outcome = match driver
                        .play_tone(sink, &entry.waveform, entry.window, cancel)
                        .await
                    {
                        Ok(tone) => {
                            debug!(
                                "tone {}: {} blocks, {} refills",
                                entry.waveform.id(),
                                tone.submissions,
                                tone.refills
                            );
                            ToneOutcome::Completed(tone)
                        }
                        Err(EngineError::Write(e)) => {
                            warn!("tone {} aborted: {}", entry.waveform.id(), e);
                            ToneOutcome::Aborted(e)
                        }
                        Err(e) => return Err(e),
                    };
                    if let Some(slot) = report.outcomes.get_mut(index) {
                        *slot = outcome;
                    }
                }
                Step::Pause(pause) => {
                    deadline::sleep(pause, cancel).await?;
                    return Ok(report);
                }
            }
        }
    }

    /// Run cycles until cancelled.
    ///
    /// # Errors
    ///
    /// Any error other than cancellation. Cancellation returns `Ok(())`.
    pub async fn run<S, M, const N: usize, const CAP: usize>(
        &mut self,
        driver: &StreamDriver<'_, '_, M, N, CAP>,
        sink: &mut S,
        cancel: &CancelToken<M>,
    ) -> Result<(), EngineError>
    where
        S: AudioSink,
        M: RawMutex,
    {
        loop {
            match self.run_cycle(driver, sink, cancel).await {
                Ok(report) => {
                    debug!(
                        "cycle {}: {} completed, {} aborted",
                        self.cycles,
                        report.completed(),
                        report.aborted()
                    );
                }
                Err(EngineError::Cancelled) => {
                    info!("sequencer cancelled after {} cycles", self.cycles);
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
    }
}
