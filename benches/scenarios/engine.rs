//! Benchmarks for the whole engine: synth, ring modulator and filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sidsynth::{
    io::AudioOutput,
    synth::{EngineParameters, Parameter},
    EngineConfig, SidEngine,
};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");
    let config = EngineConfig {
        sample_rate: 48_000.0,
        ..Default::default()
    };

    for &size in BLOCK_SIZES {
        let mut output = AudioOutput::new(2, size);

        let mut plain = SidEngine::new(config);
        plain.set_parameters(EngineParameters {
            sustain: 0.8,
            release: 0.2,
            cutoff: 3_000.0,
            ..Default::default()
        });
        plain.note_on(57, 0.9, 0.0);
        group.bench_with_input(BenchmarkId::new("single_note", size), &size, |b, _| {
            b.iter(|| {
                plain.process_block(black_box(&mut output));
            })
        });

        // every stage engaged: arpeggio, ring mod and the swept filter
        let mut full = SidEngine::new(config);
        full.set_parameter(Parameter::RingModRate, 0.02);
        full.set_parameter(Parameter::LfoRate, 0.3);
        full.set_parameter(Parameter::LfoDepth, 0.7);
        for pitch in [48, 52, 55, 59] {
            full.note_on(pitch, 0.9, 0.0);
        }
        group.bench_with_input(BenchmarkId::new("full_chain", size), &size, |b, _| {
            b.iter(|| {
                full.process_block(black_box(&mut output));
            })
        });
    }

    group.finish();
}
