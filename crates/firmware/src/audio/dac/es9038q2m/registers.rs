//! ES9038Q2M register map
//!
//! Source: ESS Technology ES9038Q2M Datasheet v1.4
//! <https://www.esstech.com/wp-content/uploads/2022/09/ES9038Q2M-Datasheet-v1.4.pdf>
//!
//! # Key I²C Constraints
//!
//! ## Power-on and post-reset volume state
//! The chip powers up with REG_VOLUME_LEFT (0x04) and REG_VOLUME_RIGHT (0x05)
//! set to 0x00 (0 dB = loudest), and a soft reset restores that default. Any
//! audio present on the I²S bus is passed through at full volume. The driver
//! writes VOLUME_MUTE (0xFF) to both volume registers before the soft reset
//! and again straight after it.
//!
//! ## REG_VOLUME_CTRL (0x09)
//! Writing 0x00 puts the chip into individual-channel volume control, so that
//! REG_VOLUME_LEFT / REG_VOLUME_RIGHT take effect.
//!
//! ## REG_INPUT_CONFIG (0x01)
//! - bits \[7:6\] serial word length: 0b00 = 16-bit
//! - bits \[5:4\] serial format: 0b00 = I²S (Philips), 0b01 = left-justified
//! - bits \[3:0\] input select: 0b0000 = serial PCM

// ---------------------------------------------------------------------------
// Register addresses
// ---------------------------------------------------------------------------

/// System register: bit 0 = soft reset (self-clearing)
pub const REG_SYSTEM: u8 = 0x00;

/// Input configuration: word length, serial format, input select
pub const REG_INPUT_CONFIG: u8 = 0x01;

/// Volume attenuation, left channel
///
/// 0x00 = 0 dB (loudest), 0xFF = mute. One LSB = 0.5 dB.
pub const REG_VOLUME_LEFT: u8 = 0x04;

/// Volume attenuation, right channel (same encoding as REG_VOLUME_LEFT)
pub const REG_VOLUME_RIGHT: u8 = 0x05;

/// Master mode / sync configuration
pub const REG_MASTER_MODE: u8 = 0x07;

/// Volume control mode
pub const REG_VOLUME_CTRL: u8 = 0x09;

// ---------------------------------------------------------------------------
// Register field values
// ---------------------------------------------------------------------------

/// System register: initiate soft reset (self-clearing)
pub const SYSTEM_SOFT_RESET: u8 = 0x01;

/// Master mode: I²S slave (STM32 SAI drives MCLK/BCLK/LRCLK)
pub const MASTER_MODE_SLAVE: u8 = 0x00;

/// Input config: 16-bit, I²S (Philips), serial PCM input
pub const INPUT_I2S_16BIT: u8 = 0b0000_0000;

/// Input config: 16-bit, left-justified, serial PCM input
pub const INPUT_LJ_16BIT: u8 = 0b0001_0000;

/// Volume: mute (maximum attenuation)
pub const VOLUME_MUTE: u8 = 0xFF;

/// Volume control: use the per-channel registers
pub const VOLUME_CTRL_INDIVIDUAL_CHANNELS: u8 = 0x00;
