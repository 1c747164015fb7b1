//! Audio domain newtypes for compile-time safety.
//!
//! These zero-cost abstractions prevent common errors:
//! - `SampleRateHz`: validates 8000–768000 Hz range
//! - `LevelDb`: output level in 0.5 dB steps, never above 0 dB
//! - `AttenuationRegister`: ES9038Q2M-specific, derived from an `OutputLevel` only
//! - `I2cAddr<Bus>`: phantom type binds address to correct bus

use core::marker::PhantomData;

// ── Error type ───────────────────────────────────────────────────────────────

/// Error returned when a value is out of the valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

/// Sample rate in Hz, validated to the range supported by the ES9038Q2M.
///
/// Valid range: 8000–768000 Hz (8 kHz to 768 kHz PCM).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported sample rate: 8000 Hz (telephony).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported sample rate: 768000 Hz (ES9038Q2M PCM max).
    pub const MAX_HZ: u32 = 768_000;

    /// 48 kHz, the rate the tone tables are generated for.
    pub const HZ_48000: Self = Self(48_000);

    /// Create a `SampleRateHz`, returning an error if out of 8000–768000 Hz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8000` or `hz > 768000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if hz < Self::MIN_HZ || hz > Self::MAX_HZ {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        } else {
            Ok(Self(hz))
        }
    }

    /// Return the sample rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

// ── LevelDb ──────────────────────────────────────────────────────────────────

/// Output level relative to full scale, in 0.5 dB steps.
///
/// Always `<= 0 dB` (the codec attenuates, it never amplifies) and
/// `>= -127.5 dB` (the deepest ES9038Q2M attenuation step).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct LevelDb(i16);

impl LevelDb {
    /// 0 dB, full scale.
    pub const FULL_SCALE: Self = Self(0);

    /// -127.5 dB, the quietest representable level.
    pub const FLOOR: Self = Self(-255);

    /// Level from whole decibels, clamped to `[-127.5, 0]` dB.
    #[must_use]
    pub const fn from_db(db: i16) -> Self {
        Self::from_half_db(db.saturating_mul(2))
    }

    /// Level from half-decibel steps, clamped to `[-255, 0]`.
    #[must_use]
    pub const fn from_half_db(half_db: i16) -> Self {
        if half_db > 0 {
            Self::FULL_SCALE
        } else if half_db < Self::FLOOR.0 {
            Self::FLOOR
        } else {
            Self(half_db)
        }
    }

    /// Level in half-decibel steps (`-100` is -50 dB).
    #[must_use]
    pub const fn half_db(self) -> i16 {
        self.0
    }
}

/// Output level as applied to the codec: attenuation plus mute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputLevel {
    /// Output muted regardless of `level`
    pub muted: bool,
    /// Attenuation applied while unmuted
    pub level: LevelDb,
}

impl OutputLevel {
    /// Muted output.
    pub const MUTED: Self = Self {
        muted: true,
        level: LevelDb::FLOOR,
    };

    /// Unmuted output at `level`.
    #[must_use]
    pub const fn unmuted(level: LevelDb) -> Self {
        Self {
            muted: false,
            level,
        }
    }
}

// ── AttenuationRegister ──────────────────────────────────────────────────────

/// ES9038Q2M attenuation register value (0x00 = 0 dB, 0xFF = mute).
///
/// One LSB is 0.5 dB of attenuation, so -50 dB is register 100.
/// This type can only be constructed from an [`OutputLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct AttenuationRegister(u8);

impl AttenuationRegister {
    /// Register value that mutes the channel.
    pub const MUTE: Self = Self(0xFF);

    /// Convert an output level to an attenuation register value.
    #[must_use]
    pub fn from_level(level: OutputLevel) -> Self {
        if level.muted {
            return Self::MUTE;
        }
        // half_db is in [-255, 0], so its negation fits in a u8.
        let steps = level.level.half_db().unsigned_abs();
        Self(u8::try_from(steps).unwrap_or(u8::MAX))
    }

    /// Return the raw register value.
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

// ── I2C bus phantom types ────────────────────────────────────────────────────

/// Phantom type for I2C bus 3 (ES9038Q2M DAC: address 0x48).
#[derive(Debug, Clone, Copy)]
pub struct I2cBus3;

// ── I2cAddr ──────────────────────────────────────────────────────────────────

/// I2C 7-bit address bound to a specific bus via phantom type.
///
/// ## Reserved I2C addresses (I2C specification):
/// - 0x00–0x07: reserved (general call, CBUS, etc.)
/// - 0x78–0x7F: reserved (10-bit address prefix, device ID, etc.)
///
/// ```rust
/// use platform::audio_types::{I2cAddr, I2cBus3};
///
/// let dac_addr: I2cAddr<I2cBus3> = I2cAddr::new(0x48);
/// assert_eq!(dac_addr.get(), 0x48);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cAddr<Bus> {
    addr: u8,
    _bus: PhantomData<Bus>,
}

impl<Bus> I2cAddr<Bus> {
    /// Create an I2C address without checking reserved ranges.
    ///
    /// Use this only when the address is a known hardware-fixed constant.
    #[must_use]
    pub const fn new(addr: u8) -> Self {
        Self {
            addr,
            _bus: PhantomData,
        }
    }

    /// Create an I2C address, rejecting I2C-reserved ranges.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `addr <= 0x07` or `addr >= 0x78`.
    pub fn try_new(addr: u8) -> Result<Self, OutOfRangeError> {
        if addr <= 0x07 || addr >= 0x78 {
            Err(OutOfRangeError {
                value: u32::from(addr),
                min: 0x08,
                max: 0x77,
            })
        } else {
            Ok(Self::new(addr))
        }
    }

    /// Return the 7-bit I2C address.
    #[must_use]
    pub fn get(self) -> u8 {
        self.addr
    }
}
