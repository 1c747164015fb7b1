//! Hardware Abstraction Layer (HAL) for the selective-call tone generator
//!
//! This crate provides the trait-based audio output abstraction the tone
//! engine streams into, plus the validated domain types shared by the engine
//! and the board drivers. It enables development and testing without
//! physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate)
//!         ↓
//! Tone engine (selcall crate)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Abstractions
//!
//! - [`AudioSink`] - what the engine streams blocks into
//! - [`AudioCodec`] - DAC control (I2C)
//! - [`I2sTransmitter`] - serial audio transmit queue (SAI + DMA)
//!
//! # Features
//!
//! - `std`: Enable standard library support (`std::error::Error` impls)
//! - `defmt`: Enable `defmt::Format` derives
//!
//! # Example
//!
//! ```no_run
//! use embassy_time::Duration;
//! use platform::{AudioSink, WriteError};
//!
//! async fn push<S: AudioSink>(sink: &mut S, block: &[i16]) -> Result<(), WriteError> {
//!     sink.write(block, Duration::from_millis(2000)).await
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors — callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

pub mod audio;
pub mod audio_config;
pub mod audio_types;
pub mod config;

// Re-export main high-level traits
pub use audio::{AudioCodec, AudioSink, ConfigError, I2sTransmitter, I2sTrigger, WriteError};
pub use audio_config::{I2sFormat, PoolDescriptor, StreamConfig};
pub use audio_types::{AttenuationRegister, LevelDb, OutputLevel, SampleRateHz};
