//! Benchmarks for the per-voice ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sidsynth::dsp::envelope::{Envelope, EnvelopeShape};
use sidsynth::max_envelope_samples;

use crate::BLOCK_SIZES;

fn render(env: &mut Envelope, buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = env.next_sample();
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");
    let max_samples = max_envelope_samples(48_000.0);

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::new(&EnvelopeShape::new(1.0, 0.1, 0.7, 0.3), max_samples);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| {
                render(black_box(&mut env), black_box(&mut buffer));
            })
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::new(&EnvelopeShape::new(0.001, 0.001, 0.7, 0.3), max_samples);
        for _ in 0..200 {
            env.next_sample();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| {
                render(black_box(&mut env), black_box(&mut buffer));
            })
        });

        // Release phase (ramping down)
        let mut env = Envelope::new(&EnvelopeShape::new(0.001, 0.001, 0.7, 1.0), max_samples);
        for _ in 0..200 {
            env.next_sample();
        }
        env.release(1.0, max_samples);
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| {
                render(black_box(&mut env), black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
