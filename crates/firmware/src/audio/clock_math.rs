//! PLL3 audio clock divider calculations for SAI1 MCLK generation.
//!
//! The STM32H743 PLL3 generates the master clock (MCLK) for SAI1 Block A.
//! The tone stream runs at 48 kHz / 256 fs, so MCLK must be 12.288 MHz.
//!
//! # Clock Source
//!
//! PLL3 uses the internal HSI oscillator (64 MHz) as its source. HSI is
//! available immediately on power-on without crystal startup delay.
//!
//! # Clock Tree
//!
//!   HSI (64 MHz) -> PLL3M (div 4) -> VCO_IN (16 MHz)
//!                                  -> VCO_OUT (x49 = 784 MHz)
//!                                    -> PLL3P (div 64) = 12.25 MHz   [no FRACN]
//!                                    -> PLL3P (div 64) = 12.288 MHz  [FRACN=1245]
//!                                       |
//!                                    SAI1_MCLK_A (PE2, AF6) -> ES9038Q2M
//!
//! # PLL3 Formula
//!
//!   VCO_INPUT  = HSI / PLL3M
//!   VCO_OUTPUT = VCO_INPUT * (PLL3N + PLL3FRACN / 8192)
//!   PLL3P_CLK  = VCO_OUTPUT / PLL3P    <- SAI1 MCLK
//!
//! # Finding 12.288 MHz
//!
//! Target: 12 288 000 Hz = 256 x 48 000 Hz
//!
//! Step 1 -- Integer-only (no FRACN):
//!   HSI / M = 64 MHz / 4 = 16 MHz     (VCO input, 1-16 MHz per RM0433 S8.7.14)
//!   VCO     = 16 MHz x 49 = 784 MHz   (192-836 MHz VCO range)
//!   PLL3P   = 784 MHz / 64 = 12.25 MHz
//!   Error   = 38 000 Hz = 3092 ppm    (audible: every tone would be flat)
//!
//! Step 2 -- Adding FRACN:
//!   N + FRACN/8192 = 12 288 000 x 4 x 64 / 64 000 000 = 49.152
//!   N = 49,  FRACN = round(0.152 x 8192) = round(1245.18) = 1245
//!
//! Step 3 -- Verify (full-precision integer arithmetic):
//!   PLL3P_HZ = 64 000 000 x (49 x 8192 + 1245) / (4 x 8192 x 64)
//!            = 64 000 000 x 402 629 / 2 097 152
//!            = 12 287 994 Hz
//!   Error = 6 Hz  (< 1 ppm)
//!
//! References:
//! - STM32H7 RM0433 Rev 9, S8.7.14 (PLL configuration, VCO ranges)
//! - STM32H7 RM0433 Rev 9, S8.7.15 (fractional PLL, FRACN field)
//! - ES9038Q2M datasheet, S6.3.1 (MCLK / fs ratio requirements)
//! - firmware::boot::build_embassy_config() -- actual hardware wiring

pub use platform::audio_config::MCLK_FS_RATIO;

/// HSI oscillator frequency (Hz) -- internal 64 MHz RC oscillator on STM32H743.
pub const HSI_HZ: u32 = 64_000_000;

/// SAI1 Block A sample rate (Hz).
pub const SAMPLE_RATE_HZ: u32 = 48_000;

/// Target MCLK: 256 x 48 000 = 12 288 000 Hz.
pub const MCLK_TARGET_HZ: u32 = 12_288_000;

/// PLL3 M predivider: HSI / 4 = 16 MHz VCO input.
/// Corresponds to PllPreDiv::DIV4 in embassy-stm32.
pub const PLL3_M: u32 = 4;

/// PLL3 N multiplier: VCO = 16 MHz x 49 = 784 MHz.
/// Corresponds to PllMul::MUL49 in embassy-stm32.
pub const PLL3_N: u32 = 49;

/// PLL3 P divider: MCLK base = 784 MHz / 64 = 12.25 MHz.
/// Corresponds to PllDiv::DIV64 in embassy-stm32.
pub const PLL3_P: u32 = 64;

/// PLL3 fractional part (0-8191, 13-bit RCC_PLL3FRACR.FRACN field).
///
/// embassy-stm32 0.1.x does not expose FRACN through the Pll struct.
/// Apply via PAC after init: RCC.pll3fracr().write(|w| w.set_fracn(PLL3_FRACN as u16))
pub const PLL3_FRACN: u32 = 1245;

/// Computed PLL3P clock (SAI MCLK) in Hz using full-precision u128 arithmetic.
// The intermediate u128 arithmetic prevents overflow; the final value (≈12 MHz) fits in u32.
#[allow(clippy::cast_possible_truncation)]
pub const PLL3P_HZ_APPROX: u32 = (HSI_HZ as u128
    * (PLL3_N as u128 * 8192 + PLL3_FRACN as u128)
    / (PLL3_M as u128 * 8192 * PLL3_P as u128)) as u32;

/// Maximum allowed MCLK error (Hz): ~10 ppm at 12.288 MHz.
pub const MCLK_MAX_ERROR_HZ: u32 = 125;

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;
    use selcall::{EngineConfig, BLOCK_CAPACITY, NUM_BLOCKS};

    /// RM0433 S8.7.14: VCO input must be in range 1-16 MHz.
    #[test]
    fn pll3_m_divider_gives_valid_vco_input() {
        let vco_input = HSI_HZ / PLL3_M;
        assert!((1_000_000..=16_000_000).contains(&vco_input), "VCO input {vco_input} Hz");
    }

    /// RM0433 S8.7.14: PLL3 VCO output must be in range 192-836 MHz.
    #[test]
    fn pll3_n_gives_valid_vco_output() {
        let vco_output = HSI_HZ / PLL3_M * PLL3_N;
        assert!((192_000_000..=836_000_000).contains(&vco_output), "VCO output {vco_output} Hz");
    }

    #[test]
    fn pll3p_produces_mclk_within_tolerance() {
        let diff = i64::from(PLL3P_HZ_APPROX) - i64::from(MCLK_TARGET_HZ);
        assert!(
            diff.unsigned_abs() <= u64::from(MCLK_MAX_ERROR_HZ),
            "PLL3P {PLL3P_HZ_APPROX} Hz differs from {MCLK_TARGET_HZ} Hz by {diff} Hz"
        );
        assert_eq!(PLL3P_HZ_APPROX, 12_287_994);
    }

    /// The SAI clock must match what the engine asks the sink for.
    #[test]
    fn mclk_target_matches_engine_stream() {
        let stream = EngineConfig::default().stream_config::<NUM_BLOCKS, BLOCK_CAPACITY>();
        assert_eq!(stream.sample_rate.get(), SAMPLE_RATE_HZ);
        assert_eq!(stream.mclk_hz(), MCLK_TARGET_HZ);
        assert_eq!(SAMPLE_RATE_HZ * MCLK_FS_RATIO, MCLK_TARGET_HZ);
    }

    /// RM0433 S8.7.15: FRACN is 13-bit, valid range 0-8191.
    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn pll3_fracn_in_valid_range() {
        assert!(PLL3_FRACN < 8192);
    }
}
