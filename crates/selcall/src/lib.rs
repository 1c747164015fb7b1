//! Selective-call tone streaming engine
//!
//! Streams the five-tone selective call (852, 1393, 1020, 2100, 1153 Hz) to
//! an [`AudioSink`](platform::AudioSink) through a fixed pool of DMA-aligned
//! blocks, forever, until cancelled.
//!
//! # Data flow
//!
//! ```text
//! Sequencer ──tone──▶ StreamDriver ──allocate──▶ BlockPool
//!                         │  fill (mono → L/R)        ▲
//!                         ▼                           │ BlockConsumed
//!                     AudioSink::write ───────────────┘
//! ```
//!
//! # Modules
//!
//! - [`waveform`] - build-time generated tone tables
//! - [`pool`] - the N-block pool and its ownership protocol
//! - [`fill`] - mono → interleaved stereo
//! - [`stream`] - one tone window against the sink
//! - [`sequencer`] - the call / pause state machine
//! - [`engine`] - startup sequence and the task body
//!
//! # Features
//!
//! - `defmt`: log through defmt (hardware)
//! - `tracing`: log through tracing (host)
//! - `std`: `std::error::Error` impls
//!
//! # Example
//!
//! ```no_run
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! use selcall::{run_selcall, AudioBlock, CancelToken, EngineConfig, SelcallPool, BLOCK_CAPACITY};
//!
//! async fn task<S: platform::AudioSink>(sink: S) {
//!     let mut storage = [(); selcall::NUM_BLOCKS].map(|()| AudioBlock::<BLOCK_CAPACITY>::new());
//!     let pool = SelcallPool::<NoopRawMutex>::new(&mut storage);
//!     let cancel = CancelToken::new();
//!     let _ = run_selcall(sink, &pool, EngineConfig::default(), &cancel).await;
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::await_holding_lock)] // blocking Mutex must never span an .await
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::new_without_default)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

// Must come first: the logging macros are textually scoped.
mod fmt;

pub mod cancel;
pub mod deadline;
pub mod engine;
pub mod error;
pub mod fill;
pub mod pool;
pub mod sequencer;
pub mod stream;
pub mod waveform;

pub use cancel::CancelToken;
pub use deadline::Deadline;
pub use engine::{run_selcall, EngineConfig, SelcallEngine};
pub use error::{Cancelled, CapacityError, EngineError};
pub use pool::{AudioBlock, BlockConsumed, BlockHandle, BlockPool, PoolCensus, SlotState};
pub use sequencer::{CycleReport, Sequencer, SequencerState, Step, ToneEntry, ToneOutcome};
pub use stream::{StreamDriver, StreamTiming, ToneReport};
pub use waveform::{Waveform, WaveformId};

/// Blocks in the pool.
pub const NUM_BLOCKS: usize = 4;

/// Interleaved samples per block: one tone table duplicated to stereo.
pub const BLOCK_CAPACITY: usize = 2 * waveform::tones::TONE_LEN;

/// The pool geometry the engine is built for.
pub type SelcallPool<'a, M> = BlockPool<'a, M, NUM_BLOCKS, BLOCK_CAPACITY>;
