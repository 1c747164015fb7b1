//! Selcall tone generator firmware
//!
//! Board support for the selective-call tone engine on STM32H7 with an
//! ES9038Q2M DAC.
//!
//! # Architecture
//!
//! ```text
//! Application (main.rs / examples/selcall_emulator.rs)
//!         ↓
//! selcall engine (sequencer, stream driver, block pool)
//!         ↓  platform::AudioSink
//! CodecSink = AudioCodec (I2C control) + I2sTransmitter (SAI / DMA)
//!         ↓
//! Platform HAL (Embassy, STM32)
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for STM32H7 target (embassy, embedded HAL, defmt)
//! - `emulator` - Build for desktop testing (tokio, tracing)
//! - `std` - Enable standard library (for emulator and testing)
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```
//!
//! ## Emulator Target
//!
//! ```bash
//! cargo run -p firmware --example selcall_emulator --features emulator -- 5
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline (allow println in tests via clippy.toml)
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::unused_async)]

// Must come first: the logging macros are textually scoped.
mod fmt;

pub mod audio;
pub mod boot;

// Re-export key types
pub use audio::{CodecSink, MockCodec, MockI2s};

#[cfg(feature = "hardware")]
pub use audio::SaiTransmitter;

#[cfg(feature = "emulator")]
pub use audio::HostI2s;

pub use audio::Es9038q2mDriver;
