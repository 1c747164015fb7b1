//! Transmit-ring recovery state.
//!
//! # Background: Embassy Issue #3205
//!
//! Source: <https://github.com/embassy-rs/embassy/issues/3205>
//!
//! Once the SAI DMA ring overruns, every later `write()` fails immediately.
//! The only way out is to drop the driver (the peripheral resets on `Drop`)
//! and construct it again.
//!
//! The tone engine stops writing between tones and during the pause between
//! calls, so the ring *will* overrun on hardware. On a failed write the
//! transmitter rebuilds the driver and retries the block once. If the retry
//! fails too it reports [`platform::WriteError::Io`] (the engine abandons that
//! tone) and rebuilds again before the next write.
//!
//! [`TxRecovery`] tracks that decision without holding any embassy-stm32 type,
//! so it is testable on the host.

/// Ring health as seen by the transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxRecovery {
    /// Writes are reaching the ring.
    #[default]
    Healthy,
    /// The ring failed; rebuild the driver before the next write.
    NeedsRebuild {
        /// Failed writes since the last rebuild (saturating)
        failures: u8,
    },
}

impl TxRecovery {
    /// Create a new state machine in the [`Healthy`][Self::Healthy] state.
    pub fn new() -> Self {
        Self::Healthy
    }

    /// Whether the driver must be dropped and constructed again.
    pub fn needs_rebuild(&self) -> bool {
        matches!(self, Self::NeedsRebuild { .. })
    }

    /// Record a failed ring write.
    pub fn on_write_error(&mut self) {
        *self = Self::NeedsRebuild {
            failures: match self {
                Self::NeedsRebuild { failures } => failures.saturating_add(1),
                Self::Healthy => 1,
            },
        };
    }

    /// Record that the driver was rebuilt. No-op when healthy.
    pub fn on_rebuilt(&mut self) {
        *self = Self::Healthy;
    }

    /// Failures since the last rebuild, 0 when healthy.
    pub fn failures(&self) -> u8 {
        match self {
            Self::NeedsRebuild { failures } => *failures,
            Self::Healthy => 0,
        }
    }
}
