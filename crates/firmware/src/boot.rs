//! Hardware boot sequence for the selcall tone generator.
//!
//! Initialization order (MUST be respected):
//!   1. RCC: PLL1 for the core, PLL3 for the SAI master clock
//!   2. PLL3 FRACN trim + SAI1 kernel clock select (PAC writes)
//!   3. IWDG armed
//!   4. I2C3 (ES9038Q2M control bus)
//!   5. Block pool placed in static memory
//!   6. Selcall task spawned (configures codec + SAI1, primes, streams)
//!
//! Everything above `hardware` is pure data and host-testable.

/// Ordered list of boot sequence steps for documentation and testing.
///
/// # Correctness Invariants
///
/// - PLL3 must be running and trimmed before SAI1 is built, or MCLK is off
///   by ~3000 ppm and every tone is flat.
/// - The watchdog is armed before the tone task starts so a wedged I2C or
///   DMA transfer resets the board.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. RCC: PLL1 400 MHz system clock, PLL3P for SAI1 MCLK",
    "2. PLL3 FRACN trim to 12.288 MHz, SAI1 kernel clock = PLL3P",
    "3. IWDG: arm watchdog before any task runs",
    "4. I2C3: ES9038Q2M control bus at 400 kHz",
    "5. Block pool: static storage in DMA-reachable RAM",
    "6. Selcall task: configure codec + SAI1, prime, trigger, stream",
];

/// IWDG timeout. The main loop pets the watchdog once per second.
pub const WATCHDOG_TIMEOUT_MS: u32 = 8_000;

/// IWDG timeout in microseconds, as `IndependentWatchdog::new` expects.
pub const fn watchdog_timeout_us() -> u32 {
    WATCHDOG_TIMEOUT_MS.saturating_mul(1_000)
}

/// I2C3 bus speed for codec control (Hz).
pub const CODEC_I2C_HZ: u32 = 400_000;

// ── RCC clock configuration ───────────────────────────────────────────────────

/// Build the `embassy_stm32::Config` for the tone generator.
///
/// # Clock Tree (HSI → 400 MHz core)
///
/// HSI (64 MHz) → PLL1 (prediv=4, mul=50) → PLL1_P = 400 MHz (sys)
/// AHB prescaler: DIV2 → 200 MHz
/// APB1/2/3/4:    DIV2 → 100 MHz (I2C3 kernel clock)
/// PLL3: source=HSI, prediv=4, mul=49 → VCO=784 MHz
///   PLL3P: DIV64 → 12.25 MHz, trimmed to 12.288 MHz by FRACN
///
/// See [`crate::audio::clock_math`] for the derivation.
#[cfg(feature = "hardware")]
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();

    // ── Oscillators ─────────────────────────────────────────────────────────
    config.rcc.hsi = Some(HSIPrescaler::DIV1);
    config.rcc.csi = true;

    // ── PLL1: system clock ───────────────────────────────────────────────────
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2), // 400 MHz system clock
        divq: None,
        divr: None,
    });

    // ── PLL3: SAI1 master clock ──────────────────────────────────────────────
    config.rcc.pll3 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,  // clock_math::PLL3_M
        mul: PllMul::MUL49,       // clock_math::PLL3_N
        divp: Some(PllDiv::DIV64), // clock_math::PLL3_P
        divq: None,
        divr: None,
    });

    // ── System clock + bus prescalers ────────────────────────────────────────
    config.rcc.sys = Sysclk::PLL1_P; // 400 MHz
    config.rcc.ahb_pre = AHBPrescaler::DIV2; // 200 MHz
    config.rcc.apb1_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb2_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb3_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb4_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.voltage_scale = VoltageScale::Scale1;

    config
}

// ── Hardware-only init ────────────────────────────────────────────────────────

#[cfg(feature = "hardware")]
pub mod hardware {
    //! Register writes embassy-stm32 0.1 does not expose.

    use embassy_stm32::pac;

    use crate::audio::clock_math::PLL3_FRACN;

    /// Trim PLL3 to 12.288 MHz and route PLL3P to the SAI1 kernel clock.
    ///
    /// Call right after `embassy_stm32::init()`, before SAI1 is built.
    // TODO: confirm on a board that FRACN latches without toggling PLL3FRACEN.
    #[allow(clippy::cast_possible_truncation)] // FRACN is 13-bit
    pub fn apply_audio_clock_trim() {
        pac::RCC
            .pll3fracr()
            .write(|w| w.set_fracn(PLL3_FRACN as u16));
        pac::RCC
            .d2ccip1r()
            .modify(|w| w.set_sai1sel(pac::rcc::vals::Saisel::PLL3_P));
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use selcall::EngineConfig;

    #[test]
    fn test_boot_sequence_clocks_before_sai() {
        let steps = BOOT_SEQUENCE_STEPS;
        let pll3 = steps
            .iter()
            .position(|s| s.contains("FRACN"))
            .expect("PLL3 trim step required");
        let sai = steps
            .iter()
            .position(|s| s.contains("Selcall task"))
            .expect("task step required");
        assert!(pll3 < sai, "PLL3 must be trimmed before SAI1 is built");
    }

    #[test]
    fn test_boot_watchdog_armed_before_task() {
        let steps = BOOT_SEQUENCE_STEPS;
        let wdg = steps.iter().position(|s| s.contains("IWDG")).unwrap();
        let task = steps.iter().position(|s| s.contains("Selcall task")).unwrap();
        assert!(wdg < task);
    }

    #[test]
    fn test_watchdog_outlasts_longest_engine_wait() {
        // Longest single wait inside the selcall task.
        let cfg = EngineConfig::default();
        let longest = [cfg.write_timeout, cfg.codec_settle, cfg.cycle_pause]
            .into_iter()
            .max()
            .unwrap();
        assert!(u64::from(WATCHDOG_TIMEOUT_MS) > longest.as_millis());
        assert_eq!(watchdog_timeout_us(), 8_000_000);
    }
}
