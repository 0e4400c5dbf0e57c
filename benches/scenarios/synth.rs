//! Benchmarks for the voice registry render loop.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use sidsynth::dsp::envelope::EnvelopeShape;
use sidsynth::synth::{SynthProperties, Synthesizer};

use crate::BLOCK_SIZES;

fn synth_with(props: SynthProperties, pitches: &[u8]) -> Synthesizer {
    let mut synth = Synthesizer::new(16);
    synth.init(48_000.0, 120.0);
    synth.update_properties(&props);
    for &pitch in pitches {
        synth.note_on(pitch, 0.8, 0.0);
    }
    synth
}

pub fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synth");
    let sustained = SynthProperties {
        envelope: EnvelopeShape::new(0.01, 0.1, 0.7, 0.2),
        ..Default::default()
    };

    for &size in BLOCK_SIZES {
        let mut buffers = vec![vec![0.0f32; size]; 2];

        // two voices: plain polyphony, pulse waveform
        let mut duo = synth_with(sustained, &[48, 55]);
        group.bench_with_input(BenchmarkId::new("duo_pulse", size), &size, |b, _| {
            b.iter(|| {
                duo.synthesize(black_box(&mut buffers), size);
            })
        });

        // four held keys collapse onto one arpeggiated carrier
        let mut chord = synth_with(sustained, &[60, 64, 67, 71]);
        group.bench_with_input(BenchmarkId::new("arpeggio_chord", size), &size, |b, _| {
            b.iter(|| {
                chord.synthesize(black_box(&mut buffers), size);
            })
        });

        // triangle waveform through the ring modulator
        let ringed = SynthProperties {
            ring_mod_rate: 0.05,
            ..sustained
        };
        let mut ring = synth_with(ringed, &[45, 52]);
        group.bench_with_input(BenchmarkId::new("ring_modulated", size), &size, |b, _| {
            b.iter(|| {
                ring.synthesize(black_box(&mut buffers), size);
            })
        });
    }

    group.finish();
}
