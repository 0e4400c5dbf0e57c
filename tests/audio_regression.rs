use sidsynth::{
    io::AudioOutput,
    synth::{EngineParameters, Parameter},
    EngineConfig, SidEngine,
};

fn collect(output: &AudioOutput) -> Vec<f32> {
    output
        .buffers
        .iter()
        .flat_map(|c| c.iter())
        .copied()
        .collect()
}

#[test]
fn renders_silence_with_empty_scene() {
    let config = EngineConfig::default();
    let mut engine = SidEngine::new(config);
    let mut output = AudioOutput::default();

    assert!(!engine.process_block(&mut output));
    assert_eq!(output.channels(), config.channels);

    let samples = collect(&output);
    assert!(!samples.is_empty());
    assert!(samples.iter().all(|s| *s == 0.0));
}

#[test]
fn renders_bounded_audio_for_a_note() {
    let mut engine = SidEngine::new(EngineConfig::default());
    engine.set_parameters(EngineParameters {
        attack: 0.01,
        sustain: 0.8,
        release: 0.1,
        ..Default::default()
    });
    engine.note_on(57, 1.0, 0.0);

    let mut output = AudioOutput::new(2, 512);
    let mut samples = Vec::new();
    for _ in 0..8 {
        assert!(engine.process_block(&mut output));
        samples.extend(collect(&output));
    }

    assert!(samples.iter().any(|s| s.abs() > 0.0));
    assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 1.0));
}

#[test]
fn full_chain_stays_finite_and_decays_to_silence() {
    let mut engine = SidEngine::new(EngineConfig::default());
    engine.set_parameter(Parameter::Release, 0.05);
    engine.set_parameter(Parameter::Resonance, 0.0);
    engine.set_parameter(Parameter::RingModRate, 0.01);
    engine.set_parameter(Parameter::LfoRate, 0.4);
    engine.set_parameter(Parameter::LfoDepth, 1.0);

    for pitch in [48, 52, 55, 60] {
        engine.note_on(pitch, 0.8, 0.0);
    }

    let mut output = AudioOutput::new(2, 256);
    for _ in 0..32 {
        engine.process_block(&mut output);
        assert!(collect(&output).iter().all(|s| s.is_finite()));
    }

    for pitch in [48, 52, 55, 60] {
        engine.note_off(pitch);
    }
    for _ in 0..32 {
        engine.process_block(&mut output);
    }
    assert_eq!(engine.synth().voice_count(), 0);

    engine.reset();
    assert!(!engine.process_block(&mut output));
    assert!(collect(&output).iter().all(|s| *s == 0.0));
}
