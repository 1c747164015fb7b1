//! I2S transmit side of the audio path.
//!
//! - `sai` - SAI1 block A with DMA (`hardware` feature)
//! - `host` - real-time paced sink for the desktop emulator (`emulator` feature)
//! - `mock` - recording mock for host tests (always available)
//! - `recovery` - when the SAI ring has to be rebuilt
//!
//! All implement [`platform::I2sTransmitter`].

pub mod mock;
pub mod recovery;

#[cfg(feature = "emulator")]
pub mod host;

#[cfg(feature = "hardware")]
pub mod sai;

/// Sample 2 of a block: the left channel of frame 1.
///
/// Tests and the emulator use it to tell tone blocks apart; frame 0 of a
/// zero-phase tone is always 0.
pub(crate) fn signature(block: &[i16]) -> i16 {
    block.get(2).copied().unwrap_or(0)
}
