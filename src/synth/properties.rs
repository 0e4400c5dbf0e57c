//! Host-facing parameter set and the per-voice properties derived from it.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{
    envelope::EnvelopeShape,
    filter::{FILTER_MAX_FREQ, FILTER_MAX_RESONANCE, FILTER_MIN_FREQ, FILTER_MIN_RESONANCE},
    lfo::MAX_LFO_RATE,
};

/// Widest pitch bend, in semitones either way.
pub const MAX_PITCH_BEND_RANGE: f32 = 12.0;

/// Frequency multiplier for a bend of `amount` (-1..1) over `range` semitones.
#[inline]
pub fn pitch_bend_multiplier(amount: f32, range: f32) -> f32 {
    let semitones = amount.clamp(-1.0, 1.0) * range.clamp(0.0, MAX_PITCH_BEND_RANGE);
    2.0f32.powf(semitones / 12.0)
}

/// Properties shared by every voice of a [`Synthesizer`](super::Synthesizer).
///
/// Envelope shape is read when a note starts (release when it stops), the
/// rest is read while rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthProperties {
    pub envelope: EnvelopeShape,
    /// Frequency multiplier applied to every voice.
    pub pitch_bend: f32,
    /// Glide time, 0.0 - 1.0 of the maximum envelope length. Zero disables.
    pub portamento: f32,
    /// Ring modulator rate, 0.0 - 1.0. Zero bypasses the ring modulator.
    pub ring_mod_rate: f32,
    /// Ring modulator fine offset, 0.0 - 1.0 (up to 100 Hz).
    pub ring_mod_fine: f32,
    pub ring_mod_feedback: f32,
}

impl Default for SynthProperties {
    fn default() -> Self {
        Self {
            envelope: EnvelopeShape::default(),
            pitch_bend: 1.0,
            portamento: 0.0,
            ring_mod_rate: 0.0,
            ring_mod_fine: 0.0,
            ring_mod_feedback: 0.0,
        }
    }
}

impl From<&EngineParameters> for SynthProperties {
    fn from(params: &EngineParameters) -> Self {
        Self {
            envelope: EnvelopeShape::new(params.attack, params.decay, params.sustain, params.release),
            pitch_bend: pitch_bend_multiplier(params.pitch_bend, params.pitch_bend_range),
            portamento: params.portamento.clamp(0.0, 1.0),
            ring_mod_rate: params.ring_mod_rate.clamp(0.0, 1.0),
            ring_mod_fine: params.ring_mod_fine.clamp(0.0, 1.0),
            ring_mod_feedback: params.ring_mod_feedback.clamp(0.0, 1.0),
        }
    }
}

/// The flat parameter set a host drives, in engineering units.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineParameters {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    /// Hz
    pub cutoff: f32,
    pub resonance: f32,
    /// Hz, zero switches the filter LFO off
    pub lfo_rate: f32,
    pub lfo_depth: f32,
    pub ring_mod_rate: f32,
    /// Not host-automatable; set from patches.
    pub ring_mod_fine: f32,
    pub ring_mod_feedback: f32,
    /// -1.0 - 1.0
    pub pitch_bend: f32,
    /// semitones
    pub pitch_bend_range: f32,
    pub portamento: f32,
    pub bypass: bool,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            attack: 0.0,
            decay: 0.0,
            sustain: 1.0,
            release: 0.0,
            cutoff: FILTER_MAX_FREQ * 0.5,
            resonance: FILTER_MAX_RESONANCE,
            lfo_rate: 0.0,
            lfo_depth: 0.0,
            ring_mod_rate: 0.0,
            ring_mod_fine: 0.0,
            ring_mod_feedback: 0.0,
            pitch_bend: 0.0,
            pitch_bend_range: 2.0,
            portamento: 0.0,
            bypass: false,
        }
    }
}

impl EngineParameters {
    /// Apply a host-normalized (0.0 - 1.0) value.
    pub fn set(&mut self, parameter: Parameter, normalized: f32) {
        let value = parameter.from_normalized(normalized);
        match parameter {
            Parameter::Attack => self.attack = value,
            Parameter::Decay => self.decay = value,
            Parameter::Sustain => self.sustain = value,
            Parameter::Release => self.release = value,
            Parameter::Cutoff => self.cutoff = value,
            Parameter::Resonance => self.resonance = value,
            Parameter::LfoRate => self.lfo_rate = value,
            Parameter::LfoDepth => self.lfo_depth = value,
            Parameter::RingModRate => self.ring_mod_rate = value,
            Parameter::PitchBend => self.pitch_bend = value,
            Parameter::PitchBendRange => self.pitch_bend_range = value,
            Parameter::Portamento => self.portamento = value,
            Parameter::Bypass => self.bypass = value >= 0.5,
        }
    }

    /// Current value of `parameter`, host-normalized.
    pub fn get(&self, parameter: Parameter) -> f32 {
        let value = match parameter {
            Parameter::Attack => self.attack,
            Parameter::Decay => self.decay,
            Parameter::Sustain => self.sustain,
            Parameter::Release => self.release,
            Parameter::Cutoff => self.cutoff,
            Parameter::Resonance => self.resonance,
            Parameter::LfoRate => self.lfo_rate,
            Parameter::LfoDepth => self.lfo_depth,
            Parameter::RingModRate => self.ring_mod_rate,
            Parameter::PitchBend => self.pitch_bend,
            Parameter::PitchBendRange => self.pitch_bend_range,
            Parameter::Portamento => self.portamento,
            Parameter::Bypass => {
                if self.bypass {
                    1.0
                } else {
                    0.0
                }
            }
        };
        parameter.to_normalized(value)
    }

    /// Pull every field back into its range.
    pub fn sanitized(self) -> Self {
        let clamp = |p: Parameter, v: f32| {
            let (min, max) = p.range();
            if v.is_finite() {
                v.clamp(min, max)
            } else {
                min
            }
        };

        let unit = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };

        Self {
            attack: clamp(Parameter::Attack, self.attack),
            decay: clamp(Parameter::Decay, self.decay),
            sustain: clamp(Parameter::Sustain, self.sustain),
            release: clamp(Parameter::Release, self.release),
            cutoff: clamp(Parameter::Cutoff, self.cutoff),
            resonance: clamp(Parameter::Resonance, self.resonance),
            lfo_rate: clamp(Parameter::LfoRate, self.lfo_rate),
            lfo_depth: clamp(Parameter::LfoDepth, self.lfo_depth),
            ring_mod_rate: clamp(Parameter::RingModRate, self.ring_mod_rate),
            ring_mod_fine: unit(self.ring_mod_fine),
            ring_mod_feedback: unit(self.ring_mod_feedback),
            pitch_bend: clamp(Parameter::PitchBend, self.pitch_bend),
            pitch_bend_range: clamp(Parameter::PitchBendRange, self.pitch_bend_range),
            portamento: clamp(Parameter::Portamento, self.portamento),
            bypass: self.bypass,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parameter {
    Attack,
    Decay,
    Sustain,
    Release,
    Cutoff,
    Resonance,
    LfoRate,
    LfoDepth,
    RingModRate,
    PitchBend,
    PitchBendRange,
    Portamento,
    Bypass,
}

impl Parameter {
    pub const ALL: [Parameter; 13] = [
        Parameter::Attack,
        Parameter::Decay,
        Parameter::Sustain,
        Parameter::Release,
        Parameter::Cutoff,
        Parameter::Resonance,
        Parameter::LfoRate,
        Parameter::LfoDepth,
        Parameter::RingModRate,
        Parameter::PitchBend,
        Parameter::PitchBendRange,
        Parameter::Portamento,
        Parameter::Bypass,
    ];

    /// Inclusive value range in engineering units.
    pub fn range(self) -> (f32, f32) {
        match self {
            Parameter::Cutoff => (FILTER_MIN_FREQ, FILTER_MAX_FREQ),
            Parameter::Resonance => (FILTER_MIN_RESONANCE, FILTER_MAX_RESONANCE),
            Parameter::LfoRate => (0.0, MAX_LFO_RATE),
            Parameter::PitchBend => (-1.0, 1.0),
            Parameter::PitchBendRange => (0.0, MAX_PITCH_BEND_RANGE),
            _ => (0.0, 1.0),
        }
    }

    /// Map a host-normalized value into engineering units.
    ///
    /// Cutoff and resonance scale the maximum and floor at the minimum, so
    /// the bottom of the knob is flat rather than linear.
    pub fn from_normalized(self, normalized: f32) -> f32 {
        let n = if normalized.is_finite() {
            normalized.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (min, max) = self.range();

        match self {
            Parameter::Cutoff | Parameter::Resonance => min.max(n * max),
            Parameter::Bypass => n.round(),
            _ => min + n * (max - min),
        }
    }

    pub fn to_normalized(self, value: f32) -> f32 {
        let (min, max) = self.range();
        let value = value.clamp(min, max);

        match self {
            Parameter::Cutoff | Parameter::Resonance => value / max,
            _ => (value - min) / (max - min),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Parameter::Attack => "Attack",
            Parameter::Decay => "Decay",
            Parameter::Sustain => "Sustain",
            Parameter::Release => "Release",
            Parameter::Cutoff => "Cutoff",
            Parameter::Resonance => "Resonance",
            Parameter::LfoRate => "LFO rate",
            Parameter::LfoDepth => "LFO depth",
            Parameter::RingModRate => "Ring mod rate",
            Parameter::PitchBend => "Pitch bend",
            Parameter::PitchBendRange => "Pitch bend range",
            Parameter::Portamento => "Portamento",
            Parameter::Bypass => "Bypass",
        }
    }
}
