//! Table-driven low frequency oscillator used to sweep the filter cutoff.

/*
Accumulator LFO
===============

The LFO reads a fixed 128-entry unipolar table (see `dsp/tables.rs`) through
an accumulator instead of a phase in 0..1:

    index        = floor(accumulator / samples_per_entry)
    accumulator += rate_hz
    if accumulator > sample_rate { accumulator -= sample_rate }

with `samples_per_entry = sample_rate / 128`.

The accumulator wraps at the SAMPLE RATE, not at the table length. Since it
advances by `rate_hz` per sample, one trip through the table takes
`sample_rate / rate_hz` samples, i.e. exactly one period of `rate_hz`. The
wrap bound therefore only depends on the sample rate the LFO was built for;
call `set_sample_rate` whenever the host changes it.

Because the wrap test is `>` rather than `>=`, the accumulator can sit exactly
on `sample_rate`, which would index entry 128. The index is clamped to the
last table entry.


Typical LFO Frequencies
-----------------------

    0.1 - 0.5 Hz    Slow sweeps, gradual filter movement
    0.5 - 2 Hz      Classic "wah" motion
    2 - 10 Hz       Fast wobble, the top of the usable range here
*/

use crate::dsp::tables::{WaveTable, WaveTableData, TABLE_SIZE};

/// Slowest LFO rate in Hz.
pub const MIN_LFO_RATE: f32 = 0.1;
/// Fastest LFO rate in Hz.
pub const MAX_LFO_RATE: f32 = 10.0;

/// Convert bipolar signal (-1.0 to +1.0) to unipolar (0.0 to 1.0).
#[inline]
pub fn bipolar_to_unipolar(bipolar: f32) -> f32 {
    (bipolar + 1.0) * 0.5
}

/// Map a normalized (0.0 - 1.0) host value onto the LFO rate range.
#[inline]
pub fn rate_from_normalized(normalized: f32) -> f32 {
    MIN_LFO_RATE + normalized.clamp(0.0, 1.0) * (MAX_LFO_RATE - MIN_LFO_RATE)
}

#[derive(Debug, Clone)]
pub struct TableLfo {
    table: WaveTableData,
    rate: f32,
    accumulator: f32,
    sample_rate: f32,
    samples_per_entry: f32,
}

impl TableLfo {
    pub fn new(shape: WaveTable, sample_rate: f32) -> Self {
        let sample_rate = sample_rate.max(1.0);
        Self {
            table: WaveTableData::new(shape),
            rate: MIN_LFO_RATE,
            accumulator: 0.0,
            sample_rate,
            samples_per_entry: sample_rate / TABLE_SIZE as f32,
        }
    }

    pub fn triangle(sample_rate: f32) -> Self {
        Self::new(WaveTable::Triangle, sample_rate)
    }

    pub fn sine(sample_rate: f32) -> Self {
        Self::new(WaveTable::Sine, sample_rate)
    }

    /// Read the table at the current position, then advance.
    #[inline]
    pub fn peek(&mut self) -> f32 {
        let index = if self.accumulator == 0.0 {
            0
        } else {
            ((self.accumulator / self.samples_per_entry) as usize).min(TABLE_SIZE - 1)
        };

        self.accumulator += self.rate;
        if self.accumulator > self.sample_rate {
            self.accumulator -= self.sample_rate;
        }

        self.table.sample(index)
    }

    /// Set the rate in Hz, clamped to [`MIN_LFO_RATE`, `MAX_LFO_RATE`].
    pub fn set_rate(&mut self, rate_hz: f32) {
        self.rate = rate_hz.clamp(MIN_LFO_RATE, MAX_LFO_RATE);
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    pub fn set_accumulator(&mut self, accumulator: f32) {
        self.accumulator = accumulator.clamp(0.0, self.sample_rate);
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        self.samples_per_entry = self.sample_rate / TABLE_SIZE as f32;
        self.accumulator = self.accumulator.min(self.sample_rate);
    }

    pub fn shape(&self) -> WaveTable {
        self.table.shape()
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}
