//! Audio stream configuration.
//!
//! [`StreamConfig`] is the single description of the PCM stream handed to
//! [`AudioSink::configure`](crate::AudioSink::configure): sample format,
//! frame format, the geometry of the block pool backing the transmit queue
//! and the per-block write timeout.
//!
//! # Clock Chain
//!
//! The codec is an I2S slave; the SAI drives every clock:
//!
//! ```text
//! PLL3 → SAI1 kernel clock
//!   → MCLK_A (PE2, AF6) = 256 × fs
//!   → SCK_A  (PE5, AF6) = bit_depth × channels × fs
//!   → FS_A   (PE4, AF6) = fs
//! ```
//!
//! For 48 kHz / 16-bit stereo: MCLK = 12.288 MHz, BCLK = 1.536 MHz.

use embassy_time::Duration;

use crate::audio::ConfigError;
use crate::audio_types::SampleRateHz;

/// Only 16-bit samples are streamed.
pub const SUPPORTED_BIT_DEPTH: u8 = 16;

/// Only interleaved stereo is streamed.
pub const SUPPORTED_CHANNELS: u8 = 2;

/// ES9038Q2M in slave mode expects MCLK = 256 × fs.
pub const MCLK_FS_RATIO: u32 = 256;

/// Serial frame format on the I2S data line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2sFormat {
    /// Philips I2S: data delayed one BCLK after the LRCLK edge
    Philips,
    /// Left-justified: MSB on the LRCLK edge
    LeftJustified,
}

/// Memory pool backing the transmit queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PoolDescriptor {
    /// Number of blocks the queue may hold
    pub block_count: usize,
    /// Size of one block in bytes
    pub block_bytes: usize,
}

/// PCM stream configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamConfig {
    /// Frame rate
    pub sample_rate: SampleRateHz,
    /// Bits per sample (16)
    pub bit_depth: u8,
    /// Interleaved channels per frame (2)
    pub channels: u8,
    /// Serial frame format
    pub format: I2sFormat,
    /// Bytes per block written to the sink
    pub block_bytes: usize,
    /// Pool the blocks come from
    pub pool: PoolDescriptor,
    /// Upper bound on how long one write may wait for queue space
    pub timeout: Duration,
}

impl StreamConfig {
    /// 48 kHz / 16-bit / stereo Philips I2S over `block_count` blocks of
    /// `block_bytes` bytes.
    #[must_use]
    pub fn stereo_16bit(
        sample_rate: SampleRateHz,
        block_count: usize,
        block_bytes: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            sample_rate,
            bit_depth: SUPPORTED_BIT_DEPTH,
            channels: SUPPORTED_CHANNELS,
            format: I2sFormat::Philips,
            block_bytes,
            pool: PoolDescriptor {
                block_count,
                block_bytes,
            },
            timeout,
        }
    }

    /// Check the configuration against what the output path supports.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::UnsupportedFormat`] for anything but 16-bit stereo.
    /// - [`ConfigError::InvalidParameter`] for an empty pool, a block that is
    ///   not a whole number of frames, or a pool block size that differs from
    ///   `block_bytes`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bit_depth != SUPPORTED_BIT_DEPTH || self.channels != SUPPORTED_CHANNELS {
            return Err(ConfigError::UnsupportedFormat);
        }
        let frame = self.frame_bytes();
        if self.pool.block_count == 0
            || self.block_bytes == 0
            || self.block_bytes.checked_rem(frame) != Some(0)
            || self.pool.block_bytes != self.block_bytes
        {
            return Err(ConfigError::InvalidParameter);
        }
        Ok(())
    }

    /// Bytes per frame (one sample for every channel).
    #[must_use]
    pub fn frame_bytes(&self) -> usize {
        usize::from(self.bit_depth / 8).saturating_mul(usize::from(self.channels))
    }

    /// Frames carried by one block.
    #[must_use]
    pub fn frames_per_block(&self) -> usize {
        self.block_bytes.checked_div(self.frame_bytes()).unwrap_or(0)
    }

    /// Play time of one block at the configured rate.
    #[must_use]
    pub fn block_duration(&self) -> Duration {
        let frames = u64::try_from(self.frames_per_block()).unwrap_or(u64::MAX);
        let micros = frames
            .saturating_mul(1_000_000)
            .checked_div(u64::from(self.sample_rate.get()))
            .unwrap_or(0);
        Duration::from_micros(micros)
    }

    /// Bit clock (BCLK) frequency in Hz.
    ///
    /// For 16-bit / 2ch / 48 kHz: 1 536 000 Hz.
    #[must_use]
    pub fn bclk_hz(&self) -> u32 {
        u32::from(self.bit_depth)
            .saturating_mul(u32::from(self.channels))
            .saturating_mul(self.sample_rate.get())
    }

    /// Master clock (MCLK) frequency in Hz.
    #[must_use]
    pub fn mclk_hz(&self) -> u32 {
        self.sample_rate.get().saturating_mul(MCLK_FS_RATIO)
    }
}

/// I2C control addresses.
///
/// All addresses are 7-bit (the embedded-hal standard convention).
pub struct I2cAddresses;

impl I2cAddresses {
    /// ES9038Q2M DAC I2C control address with ADDR tied low.
    ///
    /// Wire address: 0x90 (write) / 0x91 (read).
    pub const ES9038Q2M_DAC: u8 = 0x48;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn reference() -> StreamConfig {
        // 480 frames × 4 bytes: 10 ms at 48 kHz.
        StreamConfig::stereo_16bit(SampleRateHz::HZ_48000, 4, 1920, Duration::from_millis(2000))
    }

    #[test]
    fn reference_config_is_valid() {
        assert_eq!(reference().validate(), Ok(()));
    }

    #[test]
    fn reference_block_is_10ms() {
        let cfg = reference();
        assert_eq!(cfg.frames_per_block(), 480);
        assert_eq!(cfg.block_duration(), Duration::from_millis(10));
    }

    #[test]
    fn bclk_is_1_536_mhz() {
        assert_eq!(reference().bclk_hz(), 1_536_000);
    }

    #[test]
    fn mclk_is_12_288_mhz() {
        assert_eq!(reference().mclk_hz(), 12_288_000);
    }

    #[test]
    fn mclk_bclk_ratio_is_power_of_two() {
        let cfg = reference();
        assert!((cfg.mclk_hz() / cfg.bclk_hz()).is_power_of_two());
    }

    #[test]
    fn rejects_24_bit() {
        let mut cfg = reference();
        cfg.bit_depth = 24;
        assert_eq!(cfg.validate(), Err(ConfigError::UnsupportedFormat));
    }

    #[test]
    fn rejects_mono() {
        let mut cfg = reference();
        cfg.channels = 1;
        assert_eq!(cfg.validate(), Err(ConfigError::UnsupportedFormat));
    }

    #[test]
    fn rejects_partial_frame_blocks() {
        let mut cfg = reference();
        cfg.block_bytes = 1922;
        cfg.pool.block_bytes = 1922;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidParameter));
    }

    #[test]
    fn rejects_empty_pool() {
        let mut cfg = reference();
        cfg.pool.block_count = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidParameter));
    }

    #[test]
    fn rejects_pool_block_mismatch() {
        let mut cfg = reference();
        cfg.pool.block_bytes = 960;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidParameter));
    }

    #[test]
    fn dac_i2c_address_is_0x48() {
        assert_eq!(I2cAddresses::ES9038Q2M_DAC, 0x48);
    }
}
