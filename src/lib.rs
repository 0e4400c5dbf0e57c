pub mod dsp;
pub mod engine; // Synth + post-processing chain driven by the host
pub mod io;
pub mod synth; // Voice registry, arpeggiator and portamento

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Length of a full-scale envelope phase or glide, in seconds.
pub const MAX_ENVELOPE_SECONDS: f32 = 1.0;

/// Number of samples a normalized time of 1.0 spans at `sample_rate`.
#[inline]
pub fn max_envelope_samples(sample_rate: f32) -> f32 {
    (MAX_ENVELOPE_SECONDS * sample_rate).round().max(1.0)
}

pub use engine::{EngineConfig, SidEngine};
