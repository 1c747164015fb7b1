//! Precomputed single-frequency waveform tables.

/// Identity of a waveform: its nominal frequency in Hz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WaveformId(pub u16);

impl core::fmt::Display for WaveformId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} Hz", self.0)
    }
}

/// Read-only mono sample sequence, valid for the life of the program.
#[derive(Debug, Clone, Copy)]
pub struct Waveform {
    id: WaveformId,
    samples: &'static [i16],
}

impl Waveform {
    /// Wrap a static table as the waveform for `frequency_hz`.
    #[must_use]
    pub const fn new(frequency_hz: u16, samples: &'static [i16]) -> Self {
        Self {
            id: WaveformId(frequency_hz),
            samples,
        }
    }

    /// Identity used to tag block contents.
    #[must_use]
    pub const fn id(&self) -> WaveformId {
        self.id
    }

    /// Mono samples.
    #[must_use]
    pub const fn samples(&self) -> &'static [i16] {
        self.samples
    }

    /// Number of mono samples (L).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` for an empty table.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Build-time generated tone tables (48 kHz, 10 ms each).
pub mod tones {
    use super::Waveform;

    include!(concat!(env!("OUT_DIR"), "/selcall_tones.rs"));

    /// Written into every block before the stream starts.
    pub const PRIMING: Waveform = Waveform::new(697, &TONE_697_SAMPLES);

    /// First tone of the call.
    pub const TONE_852: Waveform = Waveform::new(852, &TONE_852_SAMPLES);
    /// Second tone of the call.
    pub const TONE_1393: Waveform = Waveform::new(1393, &TONE_1393_SAMPLES);
    /// Third tone of the call.
    pub const TONE_1020: Waveform = Waveform::new(1020, &TONE_1020_SAMPLES);
    /// Fourth tone of the call.
    pub const TONE_2100: Waveform = Waveform::new(2100, &TONE_2100_SAMPLES);
    /// Fifth tone of the call.
    pub const TONE_1153: Waveform = Waveform::new(1153, &TONE_1153_SAMPLES);

    /// The five-tone selective call, in transmission order.
    pub const SELCALL_SEQUENCE: [Waveform; 5] =
        [TONE_852, TONE_1393, TONE_1020, TONE_2100, TONE_1153];
}
