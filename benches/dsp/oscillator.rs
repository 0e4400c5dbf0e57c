//! Benchmarks for the pulse and triangle oscillators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sidsynth::dsp::oscillator::{OscillatorState, Waveform};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in [("pulse", Waveform::Pulse), ("triangle", Waveform::Triangle)] {
            let mut osc = OscillatorState::new();
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    for (i, sample) in buffer.iter_mut().enumerate() {
                        *sample = osc.next_sample(waveform, black_box(440.0), i, SAMPLE_RATE);
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
