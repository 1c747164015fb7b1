//! Engine error taxonomy

use platform::{ConfigError, WriteError};

/// A suspension point was interrupted by [`CancelToken::cancel`](crate::CancelToken::cancel).
///
/// Cooperative shutdown, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cancelled;

impl core::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Operation cancelled")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Cancelled {}

/// Waveform does not fit a block once duplicated to stereo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapacityError {
    /// Mono samples in the waveform
    pub waveform_len: usize,
    /// Interleaved samples a block holds
    pub block_capacity: usize,
}

impl core::fmt::Display for CapacityError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "Waveform of {} samples does not fit a {}-sample stereo block",
            self.waveform_len, self.block_capacity
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CapacityError {}

/// Anything that stops a tone, a cycle or the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineError {
    /// Sink configuration failed; fatal at startup
    Config(ConfigError),
    /// A block write failed; aborts the current tone
    Write(WriteError),
    /// A waveform is too long for the pool's blocks
    Capacity(CapacityError),
    /// Cancelled while waiting
    Cancelled,
}

impl core::fmt::Display for EngineError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration failed: {e}"),
            Self::Write(e) => write!(f, "Write failed: {e}"),
            Self::Capacity(e) => write!(f, "{e}"),
            Self::Cancelled => write!(f, "Engine cancelled"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EngineError {}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<WriteError> for EngineError {
    fn from(e: WriteError) -> Self {
        Self::Write(e)
    }
}

impl From<CapacityError> for EngineError {
    fn from(e: CapacityError) -> Self {
        Self::Capacity(e)
    }
}

impl From<Cancelled> for EngineError {
    fn from(_: Cancelled) -> Self {
        Self::Cancelled
    }
}
