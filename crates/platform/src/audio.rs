//! Audio output abstraction
//!
//! Three traits describe the output path:
//!
//! - [`AudioSink`] is what the tone engine streams into. It bundles codec
//!   setup and the I2S transmit queue behind one configure / write / trigger
//!   contract.
//! - [`AudioCodec`] is the control side of the DAC (reset, format, level).
//! - [`I2sTransmitter`] is the data side (SAI / I2S peripheral + DMA).
//!
//! The firmware composes a codec and a transmitter into an [`AudioSink`];
//! host tests implement [`AudioSink`] directly.

use embassy_time::Duration;

use crate::audio_config::StreamConfig;
use crate::audio_types::OutputLevel;

/// Sink consumed by the streaming engine.
///
/// `write` submits one block of interleaved stereo samples into the transmit
/// queue. Blocks are consumed strictly in submission order. A write that is not
/// accepted within `timeout` fails with [`WriteError::Timeout`].
pub trait AudioSink {
    /// Apply the stream configuration to codec and transmitter.
    fn configure(
        &mut self,
        config: &StreamConfig,
    ) -> impl core::future::Future<Output = Result<(), ConfigError>>;

    /// Set the analog output level.
    fn set_output_level(
        &mut self,
        level: OutputLevel,
    ) -> impl core::future::Future<Output = Result<(), ConfigError>>;

    /// Enable the codec's analog output stage.
    fn start_output(&mut self) -> impl core::future::Future<Output = Result<(), ConfigError>>;

    /// Queue one block for transmission.
    fn write(
        &mut self,
        block: &[i16],
        timeout: Duration,
    ) -> impl core::future::Future<Output = Result<(), WriteError>>;

    /// Start the transmitter clocking out queued blocks.
    fn trigger_start(&mut self) -> impl core::future::Future<Output = Result<(), WriteError>>;
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    fn configure(
        &mut self,
        config: &StreamConfig,
    ) -> impl core::future::Future<Output = Result<(), ConfigError>> {
        S::configure(self, config)
    }

    fn set_output_level(
        &mut self,
        level: OutputLevel,
    ) -> impl core::future::Future<Output = Result<(), ConfigError>> {
        S::set_output_level(self, level)
    }

    fn start_output(&mut self) -> impl core::future::Future<Output = Result<(), ConfigError>> {
        S::start_output(self)
    }

    fn write(
        &mut self,
        block: &[i16],
        timeout: Duration,
    ) -> impl core::future::Future<Output = Result<(), WriteError>> {
        S::write(self, block, timeout)
    }

    fn trigger_start(&mut self) -> impl core::future::Future<Output = Result<(), WriteError>> {
        S::trigger_start(self)
    }
}

/// Codec control interface (I2C side of the DAC).
pub trait AudioCodec {
    /// Bus-level error type
    type Error: core::fmt::Debug;

    /// Reset the codec and program format and clocking for `config`.
    fn configure(
        &mut self,
        config: &StreamConfig,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Program output attenuation and mute.
    fn set_output_level(
        &mut self,
        level: OutputLevel,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Unmute the output stage.
    fn start_output(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Mute the output stage.
    fn stop_output(&mut self) -> impl core::future::Future<Output = Result<(), Self::Error>>;
}

/// I2S transmit interface (SAI / DMA side).
pub trait I2sTransmitter {
    /// Configure frame format and queue depth.
    fn configure(
        &mut self,
        config: &StreamConfig,
    ) -> impl core::future::Future<Output = Result<(), ConfigError>>;

    /// Hand one block to the transmit queue. Completes once the block has been
    /// accepted (copied or consumed) by the peripheral.
    fn write(
        &mut self,
        block: &[i16],
    ) -> impl core::future::Future<Output = Result<(), WriteError>>;

    /// Issue a stream trigger.
    fn trigger(
        &mut self,
        trigger: I2sTrigger,
    ) -> impl core::future::Future<Output = Result<(), WriteError>>;
}

/// Stream state transitions understood by [`I2sTransmitter::trigger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2sTrigger {
    /// Begin clocking out queued blocks.
    Start,
    /// Finish the queued blocks, then stop.
    Drain,
    /// Stop immediately and discard queued blocks.
    Drop,
}

/// Configuration-time errors. Fatal for the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Codec or transmitter device not ready
    NotReady,
    /// Parameter outside the supported range (block size, pool geometry, rate)
    InvalidParameter,
    /// Bit depth / channel count / frame format not supported
    UnsupportedFormat,
    /// Codec rejected the configuration (bus error)
    Codec,
    /// Transmitter rejected the configuration
    Stream,
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotReady => write!(f, "Audio device not ready"),
            Self::InvalidParameter => write!(f, "Invalid stream parameter"),
            Self::UnsupportedFormat => write!(f, "Unsupported stream format"),
            Self::Codec => write!(f, "Codec configuration failed"),
            Self::Stream => write!(f, "I2S stream configuration failed"),
        }
    }
}

/// Per-block write errors. Recoverable: the engine abandons the current tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WriteError {
    /// Transmit queue did not accept the block within the timeout
    Timeout,
    /// Stream not configured or already stopped
    NotReady,
    /// Transmitter reported an error (underrun, bus fault)
    Io,
}

#[cfg(feature = "std")]
impl std::error::Error for WriteError {}

impl core::fmt::Display for WriteError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Timeout => write!(f, "I2S write timed out"),
            Self::NotReady => write!(f, "I2S stream not ready"),
            Self::Io => write!(f, "I2S transmit error"),
        }
    }
}
