//! Mono → interleaved stereo block filling.

use crate::error::CapacityError;
use crate::waveform::Waveform;

/// Reject a waveform whose stereo image would not fit `capacity` samples.
///
/// # Errors
///
/// [`CapacityError`] when `2 × waveform.len() > capacity`.
pub fn check_fits(waveform: &Waveform, capacity: usize) -> Result<(), CapacityError> {
    let needed = waveform.len().checked_mul(2);
    match needed {
        Some(n) if n <= capacity => Ok(()),
        _ => Err(CapacityError {
            waveform_len: waveform.len(),
            block_capacity: capacity,
        }),
    }
}

/// Write `waveform` into `block` as L/R pairs.
///
/// Sample `i` lands at `2i` and `2i + 1`. Everything past `2 × len` is
/// zeroed, so nothing of the block's previous contents survives. Samples that
/// do not fit are dropped; callers check with [`check_fits`] first.
pub fn fill(block: &mut [i16], waveform: &Waveform) {
    let mut frames = block.chunks_exact_mut(2);
    for (frame, &sample) in (&mut frames).zip(waveform.samples()) {
        frame.fill(sample);
    }
    for frame in &mut frames {
        frame.fill(0);
    }
    frames.into_remainder().fill(0);
}
