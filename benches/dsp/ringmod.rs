//! Benchmarks for the ring modulator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sidsynth::dsp::ringmod::RingModulator;

use crate::BLOCK_SIZES;

pub fn bench_ringmod(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/ringmod");

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.05).sin()).collect();
        let mut buffers = vec![input.clone(), input.clone()];

        let mut ring = RingModulator::new(48_000.0);
        ring.set_rate(0.1);
        ring.set_feedback(0.5);
        group.bench_with_input(BenchmarkId::new("stereo_feedback", size), &size, |b, _| {
            b.iter(|| {
                for buffer in buffers.iter_mut() {
                    buffer.copy_from_slice(&input);
                }
                ring.apply(black_box(&mut buffers), size);
            })
        });
    }

    group.finish();
}
