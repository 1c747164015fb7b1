//! Audio subsystem: DAC control, I2S transmit, and their composition
//!
//! Vertically sliced: one sub-directory per hardware component.
//!
//! # Structure
//!
//! - `dac/` - DAC drivers (`Es9038q2mDriver` over I2C, `MockCodec` for tests)
//! - `i2s/` - I2S transmitters (`SaiTransmitter` on hardware, `HostI2s` for the
//!   emulator, `MockI2s` for tests)
//! - `codec_sink` - [`CodecSink`], the [`platform::AudioSink`] the tone engine
//!   streams into
//! - `clock_math` - PLL3 divider derivation for the SAI master clock
//!
//! # Dependency Injection
//!
//! The engine targets the [`platform::AudioSink`] trait. Concrete parts are
//! injected at the call site:
//!
//! ```rust,ignore
//! // Hardware:
//! let sink = CodecSink::new(
//!     Es9038q2mDriver::new(i2c3),
//!     SaiTransmitter::new(build_sai),
//!     pool.completion_sender(),
//! );
//! // Tests:
//! let sink = CodecSink::new(MockCodec::new(), MockI2s::new(), pool.completion_sender());
//! ```

pub mod clock_math;
pub mod codec_sink;
pub mod dac;
pub mod i2s;

pub use codec_sink::CodecSink;

pub use dac::es9038q2m::Es9038q2mDriver;
pub use dac::mock::MockCodec;

#[cfg(feature = "hardware")]
pub use i2s::sai::SaiTransmitter;

#[cfg(feature = "emulator")]
pub use i2s::host::HostI2s;

pub use i2s::mock::MockI2s;
