//! SAI1 block A transmitter: 16-bit stereo I2S out of a DMA ring buffer.
//!
//! # Hardware: SAI1 Block A (master), 16-bit I2S, 48 kHz, PLL3 MCLK = 12.288 MHz
//!
//! ## SAI1 Pin Assignments (STM32H743ZI LQFP-144)
//!   - PE2  → SAI1_MCLK_A  (master clock out, 256×fs)
//!   - PE4  → SAI1_FS_A    (frame sync / L/R clock)
//!   - PE5  → SAI1_SCK_A   (bit clock)
//!   - PE6  → SAI1_SD_A    (serial data out)
//!
//! The ring buffer must live in memory DMA1 can reach (AXI SRAM, not DTCM);
//! `memory.x` maps RAM to AXI SRAM for that reason.
//!
//! Reference: STM32H7 RM0433 Rev 9, section 52 (SAI), section 16 (DMA).

#![allow(clippy::doc_markdown)] // hardware signal names (e.g. SAI1_SD_A) read better as plain text

use embassy_stm32::peripherals::SAI1;
use embassy_stm32::sai::Sai;
use platform::{ConfigError, I2sTransmitter, I2sTrigger, StreamConfig, WriteError};
use selcall::BLOCK_CAPACITY;

use super::recovery::TxRecovery;

/// Concrete SAI driver type used by the board.
pub type SaiTx = Sai<'static, SAI1, u16>;

/// [`I2sTransmitter`] over SAI1 block A.
///
/// The driver is constructed lazily by `build` on `configure`, and again
/// whenever the ring has to be recovered (see [`super::recovery`]).
pub struct SaiTransmitter {
    sai: Option<SaiTx>,
    build: fn() -> SaiTx,
    staging: [u16; BLOCK_CAPACITY],
    recovery: TxRecovery,
    started: bool,
}

impl SaiTransmitter {
    /// `build` must construct SAI1 block A on its ring buffer. It is only
    /// called while no previous driver instance is alive.
    pub fn new(build: fn() -> SaiTx) -> Self {
        Self {
            sai: None,
            build,
            staging: [0; BLOCK_CAPACITY],
            recovery: TxRecovery::new(),
            started: false,
        }
    }

    /// Drop the current driver (resetting the peripheral) and build a new one.
    fn rebuild(&mut self) {
        // The old instance must be gone before `build` borrows the ring again.
        self.sai = None;
        self.sai = Some((self.build)());
        self.recovery.on_rebuilt();
        debug!("SAI1 rebuilt");
    }

    async fn push(&mut self, len: usize) -> Result<(), ()> {
        let (Some(sai), Some(samples)) = (self.sai.as_mut(), self.staging.get(..len)) else {
            return Err(());
        };
        sai.write(samples).await.map_err(|_| ())?;
        if self.started {
            // A rebuilt ring waits for an explicit start.
            sai.start();
        }
        Ok(())
    }
}

impl I2sTransmitter for SaiTransmitter {
    async fn configure(&mut self, config: &StreamConfig) -> Result<(), ConfigError> {
        if config.bit_depth != 16 || config.channels != 2 {
            return Err(ConfigError::UnsupportedFormat);
        }
        if config.block_bytes > BLOCK_CAPACITY.saturating_mul(2) {
            return Err(ConfigError::InvalidParameter);
        }
        self.started = false;
        self.rebuild();
        info!("SAI1 configured: {} Hz, BCLK {} Hz", config.sample_rate.get(), config.bclk_hz());
        Ok(())
    }

    async fn write(&mut self, block: &[i16]) -> Result<(), WriteError> {
        if self.sai.is_none() {
            return Err(WriteError::NotReady);
        }
        let len = block.len().min(BLOCK_CAPACITY);
        for (dst, src) in self.staging.iter_mut().zip(block) {
            *dst = u16::from_ne_bytes(src.to_ne_bytes());
        }

        if self.recovery.needs_rebuild() {
            self.rebuild();
        }
        if self.push(len).await.is_ok() {
            return Ok(());
        }

        warn!("SAI1 ring overrun; rebuilding");
        self.recovery.on_write_error();
        self.rebuild();
        if self.push(len).await.is_ok() {
            return Ok(());
        }
        self.recovery.on_write_error();
        Err(WriteError::Io)
    }

    async fn trigger(&mut self, trigger: I2sTrigger) -> Result<(), WriteError> {
        match trigger {
            I2sTrigger::Start => {
                let sai = self.sai.as_mut().ok_or(WriteError::NotReady)?;
                sai.start();
                self.started = true;
            }
            I2sTrigger::Drain | I2sTrigger::Drop => {
                // Dropping the driver resets the peripheral and stops DMA.
                self.sai = None;
                self.started = false;
            }
        }
        Ok(())
    }
}
