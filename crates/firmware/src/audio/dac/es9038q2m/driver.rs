//! ES9038Q2M control driver
//!
//! Communicates with the chip via I²C. Uses the `embedded_hal_async::i2c::I2c`
//! trait so it is HAL-agnostic while remaining async; host tests drive it
//! with `embedded-hal-mock`.
//!
//! # I²C Address
//!
//! | ADDR pin | Address |
//! |----------|---------|
//! | GND      | `0x48`  |
//! | VDD      | `0x49`  |

use embedded_hal_async::i2c::I2c;
use platform::audio_config::I2cAddresses;
use platform::audio_types::{I2cAddr, I2cBus3};
use platform::{AttenuationRegister, AudioCodec, I2sFormat, OutputLevel, StreamConfig};

use super::registers::{
    INPUT_I2S_16BIT, INPUT_LJ_16BIT, MASTER_MODE_SLAVE, REG_INPUT_CONFIG, REG_MASTER_MODE,
    REG_SYSTEM, REG_VOLUME_CTRL, REG_VOLUME_LEFT, REG_VOLUME_RIGHT, SYSTEM_SOFT_RESET,
    VOLUME_CTRL_INDIVIDUAL_CHANNELS,
};

/// Errors from the ES9038Q2M driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Es9038q2mError<E> {
    /// I²C transaction failed
    I2c(E),
    /// Stream format the chip is not set up for (only 16-bit stereo)
    UnsupportedFormat,
}

impl<E: core::fmt::Debug> core::fmt::Display for Es9038q2mError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2c(e) => write!(f, "ES9038Q2M I2C error: {e:?}"),
            Self::UnsupportedFormat => write!(f, "ES9038Q2M: unsupported stream format"),
        }
    }
}

/// ES9038Q2M DAC driver
pub struct Es9038q2mDriver<I> {
    i2c: I,
    addr: I2cAddr<I2cBus3>,
    level: OutputLevel,
}

impl<I: I2c> Es9038q2mDriver<I> {
    /// Create a driver at the default address (ADDR pin = GND).
    ///
    /// `i2c` must be a configured async I²C peripheral pointing at the chip.
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, I2cAddr::new(I2cAddresses::ES9038Q2M_DAC))
    }

    /// Create a driver at an explicit address.
    pub fn with_address(i2c: I, addr: I2cAddr<I2cBus3>) -> Self {
        Self {
            i2c,
            addr,
            level: OutputLevel::MUTED,
        }
    }

    /// Level restored by `start_output`.
    pub fn level(&self) -> OutputLevel {
        self.level
    }

    /// Give back the bus.
    pub fn release(self) -> I {
        self.i2c
    }

    /// Write a single register over I²C.
    async fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), Es9038q2mError<I::Error>> {
        self.i2c
            .write(self.addr.get(), &[reg, value])
            .await
            .map_err(Es9038q2mError::I2c)
    }

    /// Program the same attenuation on both channels.
    async fn write_attenuation(
        &mut self,
        att: AttenuationRegister,
    ) -> Result<(), Es9038q2mError<I::Error>> {
        self.write_reg(REG_VOLUME_LEFT, att.get()).await?;
        self.write_reg(REG_VOLUME_RIGHT, att.get()).await
    }

    fn input_config(config: &StreamConfig) -> Result<u8, Es9038q2mError<I::Error>> {
        if config.bit_depth != 16 || config.channels != 2 {
            return Err(Es9038q2mError::UnsupportedFormat);
        }
        Ok(match config.format {
            I2sFormat::Philips => INPUT_I2S_16BIT,
            I2sFormat::LeftJustified => INPUT_LJ_16BIT,
        })
    }
}

impl<I: I2c> AudioCodec for Es9038q2mDriver<I> {
    type Error = Es9038q2mError<I::Error>;

    async fn configure(&mut self, config: &StreamConfig) -> Result<(), Self::Error> {
        let input = Self::input_config(config)?;
        info!("Configuring ES9038Q2M at {} Hz", config.sample_rate.get());

        // Mute before reset so nothing on the bus comes through at 0 dB.
        self.write_attenuation(AttenuationRegister::MUTE).await?;
        self.write_reg(REG_SYSTEM, SYSTEM_SOFT_RESET).await?;
        // Reset restored the 0 dB default.
        self.write_attenuation(AttenuationRegister::MUTE).await?;

        self.write_reg(REG_INPUT_CONFIG, input).await?;
        // Slave: the STM32 SAI drives all clocks.
        self.write_reg(REG_MASTER_MODE, MASTER_MODE_SLAVE).await?;
        self.write_reg(REG_VOLUME_CTRL, VOLUME_CTRL_INDIVIDUAL_CHANNELS)
            .await?;

        debug!("ES9038Q2M configured, output muted");
        Ok(())
    }

    async fn set_output_level(&mut self, level: OutputLevel) -> Result<(), Self::Error> {
        self.level = level;
        self.write_attenuation(AttenuationRegister::from_level(level))
            .await
    }

    async fn start_output(&mut self) -> Result<(), Self::Error> {
        self.write_attenuation(AttenuationRegister::from_level(self.level))
            .await
    }

    async fn stop_output(&mut self) -> Result<(), Self::Error> {
        self.write_attenuation(AttenuationRegister::MUTE).await
    }
}
