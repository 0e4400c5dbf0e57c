//! Real-world scenario benchmarks.
//!
//! These run the full synthesizer and engine the way a host would, with
//! chords large enough to engage the arpeggiator.

mod engine;
mod synth;

pub use engine::bench_engine;
pub use synth::bench_synth;
