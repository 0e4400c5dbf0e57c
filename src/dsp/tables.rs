//! Read-only lookup data shared by the oscillators and the LFO.
//!
//! The synth treats both lookups as opaque collaborators: the voice registry
//! only ever asks "what frequency is this pitch?" and the LFO only ever asks
//! "what is the table value at this index?".

use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::lfo::bipolar_to_unipolar;

/// Number of entries in every LFO wave table.
pub const TABLE_SIZE: usize = 128;

/// Highest pitch the frequency lookup accepts.
pub const MAX_PITCH: u8 = 127;

/// Equal-tempered frequency for a MIDI pitch (A4 = 69 = 440 Hz).
///
/// Pitches above 127 are clamped.
#[inline]
pub fn frequency_for_pitch(pitch: u8) -> f32 {
    let pitch = pitch.min(MAX_PITCH);
    440.0 * 2.0_f32.powf((pitch as f32 - 69.0) / 12.0)
}

/// Frequency multiplier for a detune expressed in cents (100 cents = 1 semitone).
#[inline]
pub fn cents_to_ratio(cents: f32) -> f32 {
    if cents == 0.0 {
        1.0
    } else {
        2.0_f32.powf(cents / 1200.0)
    }
}

/// Shape stored in a [`WaveTableData`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveTable {
    /// Unipolar triangle rising from 1/64 to 1.0 and falling back to 0.0.
    #[default]
    Triangle,
    /// Unipolar sine, 0.0 to 1.0 centred on 0.5.
    Sine,
}

/// A fixed 128-entry unipolar table, built once and then only read.
#[derive(Debug, Clone)]
pub struct WaveTableData {
    shape: WaveTable,
    samples: [f32; TABLE_SIZE],
}

impl WaveTableData {
    pub fn new(shape: WaveTable) -> Self {
        let mut samples = [0.0; TABLE_SIZE];
        let half = (TABLE_SIZE / 2) as f32;

        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = match shape {
                // i < 64: (i + 1) / 64, afterwards mirrored down to exactly 0
                WaveTable::Triangle => {
                    if i < TABLE_SIZE / 2 {
                        (i as f32 + 1.0) / half
                    } else {
                        (TABLE_SIZE - 1 - i) as f32 / half
                    }
                }
                WaveTable::Sine => bipolar_to_unipolar((TAU * i as f32 / TABLE_SIZE as f32).sin()),
            };
        }

        Self { shape, samples }
    }

    /// Table value at `index`; indices past the end wrap around.
    #[inline]
    pub fn sample(&self, index: usize) -> f32 {
        self.samples[index % TABLE_SIZE]
    }

    pub fn shape(&self) -> WaveTable {
        self.shape
    }
}
