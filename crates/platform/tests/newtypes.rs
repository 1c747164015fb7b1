//! Type system enforcement tests for audio domain newtypes.
//! These newtypes prevent common embedded audio configuration bugs at compile time.
#![allow(clippy::unwrap_used)]

// ── LevelDb ──────────────────────────────────────────────────────────────────

#[test]
fn level_db_from_db_doubles_into_half_steps() {
    use platform::audio_types::LevelDb;
    assert_eq!(LevelDb::from_db(-50).half_db(), -100);
    assert_eq!(LevelDb::from_db(0).half_db(), 0);
}

#[test]
fn level_db_never_exceeds_full_scale() {
    use platform::audio_types::LevelDb;
    assert_eq!(LevelDb::from_half_db(1), LevelDb::FULL_SCALE);
    assert_eq!(LevelDb::from_db(i16::MAX), LevelDb::FULL_SCALE);
}

#[test]
fn level_db_saturates_at_floor() {
    use platform::audio_types::LevelDb;
    assert_eq!(LevelDb::from_db(i16::MIN), LevelDb::FLOOR);
    assert_eq!(LevelDb::FLOOR.half_db(), -255);
}

#[test]
fn level_db_is_two_bytes() {
    use platform::audio_types::LevelDb;
    assert_eq!(core::mem::size_of::<LevelDb>(), 2);
}

// ── AttenuationRegister ──────────────────────────────────────────────────────

#[test]
fn attenuation_register_full_scale_is_zero() {
    use platform::audio_types::{AttenuationRegister, LevelDb, OutputLevel};
    // ES9038Q2M: register 0x00 = 0 dB (no attenuation)
    let att = AttenuationRegister::from_level(OutputLevel::unmuted(LevelDb::FULL_SCALE));
    assert_eq!(att.get(), 0, "0 dB should give 0 attenuation");
}

#[test]
fn attenuation_register_minus_50db_is_100() {
    use platform::audio_types::{AttenuationRegister, LevelDb, OutputLevel};
    // 0.5 dB per LSB
    let att = AttenuationRegister::from_level(OutputLevel::unmuted(LevelDb::from_db(-50)));
    assert_eq!(att.get(), 100);
}

#[test]
fn attenuation_register_muted_is_0xff() {
    use platform::audio_types::{AttenuationRegister, OutputLevel};
    let att = AttenuationRegister::from_level(OutputLevel::MUTED);
    assert_eq!(att.get(), 0xFF, "muted output should give 0xFF attenuation");
}

#[test]
fn attenuation_register_is_one_byte() {
    use platform::audio_types::AttenuationRegister;
    assert_eq!(core::mem::size_of::<AttenuationRegister>(), 1);
}

// ── SampleRateHz ─────────────────────────────────────────────────────────────

#[test]
fn sample_rate_hz_rejects_zero() {
    use platform::audio_types::SampleRateHz;
    assert!(SampleRateHz::new(0).is_err());
}

#[test]
fn sample_rate_hz_rejects_below_minimum() {
    use platform::audio_types::SampleRateHz;
    // Minimum meaningful sample rate: 8000 Hz
    assert!(SampleRateHz::new(7999).is_err());
}

#[test]
fn sample_rate_hz_accepts_standard_rates() {
    use platform::audio_types::SampleRateHz;
    assert!(SampleRateHz::new(44100).is_ok());
    assert!(SampleRateHz::new(48000).is_ok());
    assert!(SampleRateHz::new(96000).is_ok());
}

#[test]
fn sample_rate_hz_rejects_above_maximum() {
    use platform::audio_types::SampleRateHz;
    // ES9038Q2M max: 768 kHz PCM
    assert!(SampleRateHz::new(768_001).is_err());
}

#[test]
fn sample_rate_hz_48k_constant_matches_new() {
    use platform::audio_types::SampleRateHz;
    assert_eq!(SampleRateHz::HZ_48000, SampleRateHz::new(48_000).unwrap());
}

// ── I2cAddr phantom type ──────────────────────────────────────────────────────

#[test]
fn i2c_addr_dac_address_is_correct() {
    use platform::audio_types::{I2cAddr, I2cBus3};
    // ES9038Q2M DAC is on I2C3, address 0x48 (ADDR pin pulled low)
    let addr: I2cAddr<I2cBus3> = I2cAddr::new(0x48);
    assert_eq!(addr.get(), 0x48);
}

#[test]
fn i2c_addr_is_zero_cost_abstraction() {
    use platform::audio_types::{I2cAddr, I2cBus3};
    // PhantomData ensures no runtime overhead
    assert_eq!(core::mem::size_of::<I2cAddr<I2cBus3>>(), 1);
}

#[test]
fn i2c_addr_rejects_reserved_addresses() {
    use platform::audio_types::{I2cAddr, I2cBus3};
    // I2C reserved addresses: 0x00-0x07 and 0x78-0x7F
    assert!(I2cAddr::<I2cBus3>::try_new(0x00).is_err());
    assert!(I2cAddr::<I2cBus3>::try_new(0x07).is_err());
    assert!(I2cAddr::<I2cBus3>::try_new(0x78).is_err());
    assert!(I2cAddr::<I2cBus3>::try_new(0x7F).is_err());
}

#[test]
fn i2c_addr_accepts_valid_7bit_range() {
    use platform::audio_types::{I2cAddr, I2cBus3};
    assert!(I2cAddr::<I2cBus3>::try_new(0x08).is_ok());
    assert!(I2cAddr::<I2cBus3>::try_new(0x48).is_ok());
    assert!(I2cAddr::<I2cBus3>::try_new(0x77).is_ok());
}
