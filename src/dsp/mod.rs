//! Low-level DSP primitives used by the synthesizer and the engine.
//!
//! These components are allocation-free on the per-sample path and safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math; note bookkeeping lives in [`crate::synth`].

/// Per-voice attack/decay/sustain/release envelope.
pub mod envelope;
/// Resonant two-pole low-pass with an optional cutoff LFO.
pub mod filter;
/// Portamento glide and pitch history.
pub mod glide;
/// Table-driven LFO.
pub mod lfo;
/// Pulse (PWM) and triangle oscillators.
pub mod oscillator;
/// Square-carrier ring modulator with feedback.
pub mod ringmod;
/// Pitch lookup and LFO wave tables.
pub mod tables;

pub use envelope::{Envelope, EnvelopeShape, EnvelopeStage};
pub use filter::ResonantFilter;
pub use glide::Portamento;
pub use lfo::TableLfo;
pub use oscillator::{OscillatorState, Waveform};
pub use ringmod::RingModulator;
pub use tables::{frequency_for_pitch, WaveTable};
