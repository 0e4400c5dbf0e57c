/*
Resonant Two-Pole Low-Pass
==========================

| stage            | input                  | output                   |
| ---------------- | ---------------------- | ------------------------ |
| coefficients     | cutoff, resonance, sr  | a1, a2, a3, b1, b2       |
| difference eq.   | x[n], x[n-1], x[n-2]   | y[n] (uses y[n-1], y[n-2]) |

The filter is a classic bilinear-transform biquad. With

    c  = 1 / tan(π · cutoff / sample_rate)

the coefficients are

    a1 = 1 / (1 + r·c + c²)
    a2 = 2·a1
    a3 = a1
    b1 = 2·(1 - c²)·a1
    b2 = (1 - r·c + c²)·a1

where `r` is the resonance term (smaller r = sharper peak at the corner).
Every channel keeps its own two-input / two-output history:

    y[n] = a1·x[n] + a2·x[n-1] + a3·x[n-2] - b1·y[n-1] - b2·y[n-2]

The tangent pre-warp is undefined at Nyquist, so the cutoff is always kept
strictly below `sample_rate / 2`.


LFO Sweep
---------

With an LFO attached and a non-zero depth, the cutoff is replaced every
sample by

    top    = min(FILTER_MAX_FREQ / 2, cutoff)
    range  = (top - FILTER_MIN_FREQ) · depth
    swept  = top - range + lfo · range

and the coefficients are recomputed for every sample. Each channel replays
the same LFO segment so stereo channels see an identical sweep. Removing the
LFO (or setting depth to zero) falls back to the cached static coefficients.
*/

use std::f32::consts::{FRAC_1_SQRT_2, PI};

use crate::dsp::lfo::TableLfo;

pub const FILTER_MIN_FREQ: f32 = 50.0;
pub const FILTER_MAX_FREQ: f32 = 12_000.0;
pub const FILTER_MIN_RESONANCE: f32 = 0.1;
pub const FILTER_MAX_RESONANCE: f32 = FRAC_1_SQRT_2;

/// Channel registers every filter starts with.
pub const DEFAULT_CHANNELS: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Coefficients {
    pub a1: f32,
    pub a2: f32,
    pub a3: f32,
    pub b1: f32,
    pub b2: f32,
}

impl Coefficients {
    #[inline]
    pub fn low_pass(cutoff: f32, resonance: f32, sample_rate: f32) -> Self {
        let c = 1.0 / (PI * cutoff / sample_rate).tan();
        let a1 = 1.0 / (1.0 + resonance * c + c * c);

        Self {
            a1,
            a2: 2.0 * a1,
            a3: a1,
            b1: 2.0 * (1.0 - c * c) * a1,
            b2: (1.0 - resonance * c + c * c) * a1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ChannelHistory {
    in1: f32,
    in2: f32,
    out1: f32,
    out2: f32,
}

impl ChannelHistory {
    #[inline]
    fn next_sample(&mut self, input: f32, k: &Coefficients) -> f32 {
        let output =
            k.a1 * input + k.a2 * self.in1 + k.a3 * self.in2 - k.b1 * self.out1 - k.b2 * self.out2;

        self.in2 = self.in1;
        self.in1 = input;
        self.out2 = self.out1;
        self.out1 = output;

        output
    }
}

pub struct ResonantFilter {
    cutoff: f32,
    resonance: f32,
    sample_rate: f32,
    coefficients: Coefficients,
    channels: Vec<ChannelHistory>,

    lfo: Option<TableLfo>,
    lfo_depth: f32,
    swept_cutoff: f32,
}

impl ResonantFilter {
    pub fn new(sample_rate: f32, channels: usize) -> Self {
        let mut filter = Self {
            cutoff: FILTER_MAX_FREQ * 0.5,
            resonance: FILTER_MIN_RESONANCE,
            sample_rate: sample_rate.max(1.0),
            coefficients: Coefficients::default(),
            channels: vec![ChannelHistory::default(); channels.max(DEFAULT_CHANNELS)],
            lfo: None,
            lfo_depth: 0.0,
            swept_cutoff: FILTER_MAX_FREQ * 0.5,
        };
        filter.set_cutoff(FILTER_MAX_FREQ * 0.5);
        filter
    }

    /// Map normalized host values onto cutoff and resonance, recomputing only
    /// on change.
    pub fn update_properties(&mut self, cutoff_normalized: f32, resonance_normalized: f32) {
        let cutoff = FILTER_MIN_FREQ.max(cutoff_normalized * FILTER_MAX_FREQ);
        let resonance = FILTER_MIN_RESONANCE.max(resonance_normalized * FILTER_MAX_RESONANCE);

        if self.cutoff != cutoff || self.resonance != resonance {
            self.resonance = resonance.min(FILTER_MAX_RESONANCE);
            self.set_cutoff(cutoff);
        }
    }

    /// Set the cutoff in Hz, clamped to the valid range and below Nyquist.
    pub fn set_cutoff(&mut self, frequency: f32) {
        self.cutoff = self.clamp_cutoff(frequency);
        self.calculate_parameters();
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(FILTER_MIN_RESONANCE, FILTER_MAX_RESONANCE);
        self.calculate_parameters();
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate.max(1.0);
        if let Some(lfo) = self.lfo.as_mut() {
            lfo.set_sample_rate(self.sample_rate);
        }
        // re-clamp against the new Nyquist
        self.set_cutoff(self.cutoff);
    }

    /// Attach (`Some`) or detach (`None`) the cutoff LFO.
    pub fn set_lfo(&mut self, lfo: Option<TableLfo>) {
        self.lfo = lfo;
        self.swept_cutoff = self.cutoff;
    }

    pub fn lfo(&self) -> Option<&TableLfo> {
        self.lfo.as_ref()
    }

    pub fn lfo_mut(&mut self) -> Option<&mut TableLfo> {
        self.lfo.as_mut()
    }

    pub fn set_lfo_depth(&mut self, depth: f32) {
        self.lfo_depth = depth.clamp(0.0, 1.0);
    }

    pub fn lfo_depth(&self) -> f32 {
        self.lfo_depth
    }

    pub fn has_active_lfo(&self) -> bool {
        self.lfo.is_some() && self.lfo_depth > 0.0
    }

    /// Cutoff the last processed sample actually used.
    pub fn current_cutoff(&self) -> f32 {
        if self.has_active_lfo() {
            self.swept_cutoff
        } else {
            self.cutoff
        }
    }

    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    /// Run the filter over the first `block_size` samples of every channel.
    ///
    /// More buffers than registers grows the registers, which allocates.
    pub fn process<B: AsMut<[f32]>>(&mut self, buffers: &mut [B], block_size: usize) {
        if buffers.len() > self.channels.len() {
            self.channels.resize(buffers.len(), ChannelHistory::default());
        }

        let Self {
            cutoff,
            resonance,
            sample_rate,
            coefficients,
            channels,
            lfo,
            lfo_depth,
            swept_cutoff,
        } = self;

        let sweep = match lfo.as_mut() {
            Some(lfo) if *lfo_depth > 0.0 => Some(lfo),
            _ => None,
        };

        match sweep {
            None => {
                for (buffer, history) in buffers.iter_mut().zip(channels.iter_mut()) {
                    let buffer = buffer.as_mut();
                    let len = block_size.min(buffer.len());
                    for sample in &mut buffer[..len] {
                        *sample = history.next_sample(*sample, coefficients);
                    }
                }
            }

            Some(lfo) => {
                let top = (FILTER_MAX_FREQ * 0.5).min(*cutoff);
                let range = (top - FILTER_MIN_FREQ).max(0.0) * *lfo_depth;
                let bottom = top - range;
                let start = lfo.accumulator();

                for (buffer, history) in buffers.iter_mut().zip(channels.iter_mut()) {
                    lfo.set_accumulator(start);

                    let buffer = buffer.as_mut();
                    let len = block_size.min(buffer.len());
                    for sample in &mut buffer[..len] {
                        *swept_cutoff = bottom + lfo.peek() * range;
                        let k = Coefficients::low_pass(*swept_cutoff, *resonance, *sample_rate);
                        *sample = history.next_sample(*sample, &k);
                    }
                }
            }
        }

        debug_assert!(buffers
            .iter_mut()
            .all(|b| b.as_mut().iter().all(|s| s.is_finite())));
    }

    /// Clear every channel's delay registers and rewind the LFO.
    pub fn reset(&mut self) {
        for history in &mut self.channels {
            *history = ChannelHistory::default();
        }
        if let Some(lfo) = self.lfo.as_mut() {
            lfo.reset();
        }
    }

    fn clamp_cutoff(&self, frequency: f32) -> f32 {
        let nyquist = self.sample_rate * 0.5;
        let mut cutoff = frequency.clamp(FILTER_MIN_FREQ, FILTER_MAX_FREQ);
        if cutoff >= nyquist {
            cutoff = nyquist - 1.0;
        }
        cutoff.max(1.0)
    }

    fn calculate_parameters(&mut self) {
        self.coefficients = Coefficients::low_pass(self.cutoff, self.resonance, self.sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::tables::WaveTable;
    use std::f32::consts::TAU;

    fn sine(frequency: f32, sample_rate: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (TAU * frequency * i as f32 / sample_rate).sin())
            .collect()
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len() / 2;
        buffer[skip..].iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut filter = ResonantFilter::new(48_000.0, 1);
        filter.set_cutoff(500.0);
        filter.set_resonance(FILTER_MAX_RESONANCE);

        let mut buffers = vec![vec![1.0f32; 4096]];
        filter.process(&mut buffers, 4096);

        let last = buffers[0][4095];
        assert!((last - 1.0).abs() < 0.01, "expected unity DC gain, got {last}");
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let sample_rate = 48_000.0;
        let mut filter = ResonantFilter::new(sample_rate, 1);
        filter.set_cutoff(500.0);
        filter.set_resonance(FILTER_MAX_RESONANCE);

        let mut buffers = vec![sine(5_000.0, sample_rate, 1024)];
        filter.process(&mut buffers, 1024);

        let peak = peak_after_transient(&buffers[0]);
        assert!(peak < 0.1, "Expected high freq attenuation, got peak: {peak}");
    }

    #[test]
    fn test_lower_resonance_term_boosts_corner() {
        let sample_rate = 48_000.0;
        let cutoff = 1_000.0;

        let mut filter = ResonantFilter::new(sample_rate, 1);
        filter.set_cutoff(cutoff);

        filter.set_resonance(FILTER_MAX_RESONANCE);
        let mut broad = vec![sine(cutoff, sample_rate, 4096)];
        filter.process(&mut broad, 4096);

        filter.reset();
        filter.set_resonance(FILTER_MIN_RESONANCE);
        let mut sharp = vec![sine(cutoff, sample_rate, 4096)];
        filter.process(&mut sharp, 4096);

        let broad_peak = peak_after_transient(&broad[0]);
        let sharp_peak = peak_after_transient(&sharp[0]);
        assert!(
            sharp_peak > broad_peak * 2.0,
            "expected resonant peak, broad={broad_peak}, sharp={sharp_peak}"
        );
    }

    #[test]
    fn test_cutoff_is_clamped() {
        let mut filter = ResonantFilter::new(44_100.0, 2);

        filter.set_cutoff(100_000.0);
        assert_eq!(filter.cutoff(), FILTER_MAX_FREQ);

        filter.set_cutoff(1.0);
        assert_eq!(filter.cutoff(), FILTER_MIN_FREQ);

        let mut low_rate = ResonantFilter::new(16_000.0, 2);
        low_rate.set_cutoff(100_000.0);
        assert!(low_rate.cutoff() < 8_000.0);
        assert_eq!(low_rate.cutoff(), 7_999.0);
    }

    #[test]
    fn test_resonance_is_clamped() {
        let mut filter = ResonantFilter::new(44_100.0, 2);
        filter.set_resonance(5.0);
        assert_eq!(filter.resonance(), FILTER_MAX_RESONANCE);
        filter.set_resonance(-1.0);
        assert_eq!(filter.resonance(), FILTER_MIN_RESONANCE);
    }

    #[test]
    fn test_update_properties_maps_normalized_values() {
        let mut filter = ResonantFilter::new(44_100.0, 2);
        filter.update_properties(0.5, 1.0);
        assert_eq!(filter.cutoff(), 6_000.0);
        assert_eq!(filter.resonance(), FILTER_MAX_RESONANCE);

        filter.update_properties(0.0, 0.0);
        assert_eq!(filter.cutoff(), FILTER_MIN_FREQ);
        assert_eq!(filter.resonance(), FILTER_MIN_RESONANCE);
    }

    #[test]
    fn test_lfo_sweeps_cutoff_and_detaching_restores_it() {
        let sample_rate = 44_100.0;
        let mut filter = ResonantFilter::new(sample_rate, 2);
        filter.set_cutoff(4_000.0);

        let mut lfo = TableLfo::new(WaveTable::Triangle, sample_rate);
        lfo.set_rate(10.0);
        filter.set_lfo(Some(lfo));
        filter.set_lfo_depth(1.0);

        let mut seen = Vec::new();
        for _ in 0..64 {
            let mut buffers = vec![vec![0.25f32; 64], vec![0.25f32; 64]];
            filter.process(&mut buffers, 64);
            seen.push(filter.current_cutoff());
            assert!(buffers.iter().flatten().all(|s| s.is_finite()));
        }

        let min = seen.iter().cloned().fold(f32::MAX, f32::min);
        let max = seen.iter().cloned().fold(0.0f32, f32::max);
        assert!(min >= FILTER_MIN_FREQ && max <= 4_000.0);
        assert!(max - min > 1_000.0, "cutoff barely moved: {min}..{max}");

        let coefficients = filter.coefficients();
        filter.set_lfo(None);
        assert_eq!(filter.current_cutoff(), 4_000.0);
        assert_eq!(filter.coefficients(), coefficients);
    }

    #[test]
    fn test_every_buffer_is_filtered() {
        let sample_rate = 44_100.0;
        let channels = DEFAULT_CHANNELS + 2;
        let mut filter = ResonantFilter::new(sample_rate, 1);
        filter.set_cutoff(200.0);

        // Nyquist-rate square wave
        let input: Vec<f32> = (0..256).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let mut buffers = vec![input; channels];
        filter.process(&mut buffers, 256);

        for buffer in &buffers {
            assert!(buffer[255].abs() < 0.05, "channel left unfiltered");
            assert_eq!(buffer, &buffers[0]);
        }
    }

    #[test]
    fn test_channels_see_identical_sweep() {
        let sample_rate = 44_100.0;
        let mut filter = ResonantFilter::new(sample_rate, 2);
        filter.set_lfo(Some(TableLfo::sine(sample_rate)));
        filter.set_lfo_depth(0.8);

        let input = sine(440.0, sample_rate, 256);
        let mut buffers = vec![input.clone(), input];
        filter.process(&mut buffers, 256);

        assert_eq!(buffers[0], buffers[1]);
    }
}
