//! Benchmarks for the resonant low-pass, static and LFO-swept.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sidsynth::dsp::{filter::ResonantFilter, lfo::TableLfo};

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        let mut filter = ResonantFilter::new(SAMPLE_RATE, 2);
        filter.set_cutoff(1_000.0);
        filter.set_resonance(0.3);
        let mut buffers = vec![input.clone(), input.clone()];
        group.bench_with_input(BenchmarkId::new("static", size), &size, |b, _| {
            b.iter(|| {
                for buffer in buffers.iter_mut() {
                    buffer.copy_from_slice(&input);
                }
                filter.process(black_box(&mut buffers), size);
            })
        });

        // coefficients recomputed every sample
        let mut filter = ResonantFilter::new(SAMPLE_RATE, 2);
        filter.set_cutoff(4_000.0);
        let mut lfo = TableLfo::sine(SAMPLE_RATE);
        lfo.set_rate(2.0);
        filter.set_lfo(Some(lfo));
        filter.set_lfo_depth(0.8);
        let mut buffers = vec![input.clone(), input.clone()];
        group.bench_with_input(BenchmarkId::new("lfo_swept", size), &size, |b, _| {
            b.iter(|| {
                for buffer in buffers.iter_mut() {
                    buffer.copy_from_slice(&input);
                }
                filter.process(black_box(&mut buffers), size);
            })
        });
    }

    group.finish();
}
