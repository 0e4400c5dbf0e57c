//! Chip-style oscillator waveforms.

/*
Pulse and Triangle
==================

The voice oscillator only knows two shapes, mirroring the limited waveform set
of an 8-bit sound chip:

PULSE (with pulse-width modulation)
    A square wave whose duty cycle is swept by a slow internal sine. The
    comparison threshold moves between 0 and 2π:

        width = sin((sample_index + pwm_counter) / 0x4800) * π / 1.05
        out   = phase < π - width ? +A : -A

    `phase` runs in radians (0..2π). `pwm_counter` advances once per rendered
    sample and persists across blocks so the sweep is continuous.

TRIANGLE
    A rectified parabolic approximation of a triangle, phase in 0..1:

        t   = phase * 4 - 1           (first half)
        out = |1 - t²|
        t   = phase * 4 - 3           (second half)
        out = |t² - 1|

    The output is unipolar. It only plays while the ring modulator is engaged,
    which multiplies it by a ±0.5 square carrier.

Both shapes share the same `phase` field on a voice. Switching waveform
mid-note simply re-wraps the phase into the new domain.
*/

use std::f32::consts::{PI, TAU};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Peak amplitude of the pulse wave (0.075, boosted 4x).
pub const PULSE_AMPLITUDE: f32 = 0.075 * 4.0;

/// Maximum deviation of the pulse comparison threshold.
pub const PWM_DEPTH: f32 = PI / 1.05;

/// Divisor applied to the PWM sweep argument.
pub const PWM_PERIOD: f32 = 0x4800 as f32;

// One full cycle of the PWM sweep, in counter steps.
const PWM_WRAP: f32 = TAU * PWM_PERIOD;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Pulse,
    Triangle,
}

/// Per-voice oscillator state, persisted across blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct OscillatorState {
    pub phase: f32,
    pub pwm_counter: f32,
}

impl OscillatorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render one raw sample and advance the phase.
    ///
    /// `sample_index` is the position inside the current block; it feeds the
    /// pulse-width sweep.
    #[inline]
    pub fn next_sample(
        &mut self,
        waveform: Waveform,
        frequency: f32,
        sample_index: usize,
        sample_rate: f32,
    ) -> f32 {
        match waveform {
            Waveform::Pulse => self.next_pulse(frequency, sample_index, sample_rate),
            Waveform::Triangle => self.next_triangle(frequency, sample_rate),
        }
    }

    #[inline]
    fn next_pulse(&mut self, frequency: f32, sample_index: usize, sample_rate: f32) -> f32 {
        self.pwm_counter += 1.0;
        if self.pwm_counter >= PWM_WRAP {
            self.pwm_counter -= PWM_WRAP;
        }

        let sweep = sample_index as f32 + self.pwm_counter;
        let width = (sweep / PWM_PERIOD).sin() * PWM_DEPTH;
        let amp = if self.phase < PI - width {
            PULSE_AMPLITUDE
        } else {
            -PULSE_AMPLITUDE
        };

        self.phase += TAU * frequency / sample_rate;
        if self.phase > TAU {
            self.phase = self.phase.rem_euclid(TAU);
        }

        amp
    }

    #[inline]
    fn next_triangle(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let phase = self.phase;
        let amp = if phase < 0.5 {
            let t = phase * 4.0 - 1.0;
            1.0 - t * t
        } else {
            let t = phase * 4.0 - 3.0;
            t * t - 1.0
        };

        self.phase += frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= self.phase.floor();
        }

        amp.abs()
    }
}
