//! The complete signal chain a host drives once per audio block.
//!
//! ```text
//! messages ─→ parameters ─→ Synthesizer ─→ RingModulator ─→ ResonantFilter ─→ out
//! ```
//!
//! Messages queued since the previous block are drained first; parameter
//! changes take effect for the whole block (last value wins).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use log::debug;

use crate::{
    dsp::{filter::ResonantFilter, lfo::TableLfo},
    io::{converter::midi_to_synth, midi::MidiEvent, AudioOutput},
    synth::{
        message::{MessageReceiver, SynthMessage},
        properties::{EngineParameters, Parameter, SynthProperties},
        synthesizer::{Synthesizer, MAX_VOICES},
    },
};

/// Block size used when the caller hands over empty output buffers.
pub const DEFAULT_BLOCK_SIZE: usize = 512;

const MIN_SAMPLE_RATE: f32 = 8_000.0;
const MAX_SAMPLE_RATE: f32 = 192_000.0;
const MIN_TEMPO: f32 = 20.0;
const MAX_TEMPO: f32 = 999.0;
const MAX_CHANNELS: usize = 8;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub tempo: f32,
    pub max_voices: usize,
    pub channels: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            tempo: 120.0,
            max_voices: 16,
            channels: 2,
        }
    }
}

impl EngineConfig {
    /// Clamp every field into a usable range.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let sample_rate = if self.sample_rate.is_finite() {
            self.sample_rate.clamp(MIN_SAMPLE_RATE, MAX_SAMPLE_RATE)
        } else {
            defaults.sample_rate
        };
        let tempo = if self.tempo.is_finite() {
            self.tempo.clamp(MIN_TEMPO, MAX_TEMPO)
        } else {
            defaults.tempo
        };

        Self {
            sample_rate,
            tempo,
            max_voices: self.max_voices.clamp(1, MAX_VOICES),
            channels: self.channels.clamp(1, MAX_CHANNELS),
        }
    }
}

pub struct SidEngine {
    config: EngineConfig,
    synth: Synthesizer,
    filter: ResonantFilter,
    parameters: EngineParameters,
    applied: Option<EngineParameters>,
    receiver: Option<Box<dyn MessageReceiver + Send>>,
}

impl SidEngine {
    pub fn new(config: EngineConfig) -> Self {
        let config = config.sanitized();

        let mut synth = Synthesizer::new(config.max_voices);
        synth.init(config.sample_rate, config.tempo);

        let mut engine = Self {
            config,
            synth,
            filter: ResonantFilter::new(config.sample_rate, config.channels),
            parameters: EngineParameters::default(),
            applied: None,
            receiver: None,
        };
        engine.apply_parameters();

        debug!(
            "engine ready: {} Hz, {} channels, {} voices",
            config.sample_rate, config.channels, config.max_voices
        );
        engine
    }

    pub fn with_receiver(config: EngineConfig, receiver: Box<dyn MessageReceiver + Send>) -> Self {
        let mut engine = Self::new(config);
        engine.receiver = Some(receiver);
        engine
    }

    pub fn set_receiver(&mut self, receiver: Box<dyn MessageReceiver + Send>) {
        self.receiver = Some(receiver);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn synth(&self) -> &Synthesizer {
        &self.synth
    }

    pub fn filter(&self) -> &ResonantFilter {
        &self.filter
    }

    pub fn parameters(&self) -> &EngineParameters {
        &self.parameters
    }

    pub fn set_parameters(&mut self, parameters: EngineParameters) {
        self.parameters = parameters.sanitized();
    }

    /// Apply a host-normalized (0.0 - 1.0) parameter value.
    pub fn set_parameter(&mut self, parameter: Parameter, normalized: f32) {
        self.parameters.set(parameter, normalized);
    }

    pub fn set_tempo(&mut self, tempo: f32) {
        self.config.tempo = tempo;
        self.config = self.config.sanitized();
        self.synth.set_tempo(self.config.tempo);
    }

    pub fn note_on(&mut self, pitch: u8, velocity: f32, tuning_cents: f32) {
        self.apply_parameters();
        self.synth.note_on(pitch, velocity, tuning_cents);
    }

    pub fn note_off(&mut self, pitch: u8) {
        self.apply_parameters();
        self.synth.note_off(pitch);
    }

    pub fn handle_midi(&mut self, event: MidiEvent, channel: u8) {
        if let Some(message) = midi_to_synth(event, channel) {
            self.handle_message(message);
        }
    }

    pub fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn {
                pitch,
                velocity,
                tuning_cents,
            } => self.note_on(pitch, velocity, tuning_cents),
            SynthMessage::NoteOff { pitch } => self.note_off(pitch),
            SynthMessage::SetParameter { parameter, value } => self.set_parameter(parameter, value),
            SynthMessage::Tempo { bpm } => self.set_tempo(bpm),
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    /// Release every held key.
    pub fn all_notes_off(&mut self) {
        self.apply_parameters();
        while let Some(pitch) = self
            .synth
            .voices()
            .iter()
            .find(|v| !v.is_released())
            .map(|v| v.pitch())
        {
            self.synth.note_off(pitch);
        }
    }

    /// Render into a host output buffer, allocating it on first use.
    pub fn process_block(&mut self, output: &mut AudioOutput) -> bool {
        if output.buffers.is_empty() {
            *output = AudioOutput::new(self.config.channels, DEFAULT_BLOCK_SIZE);
        }
        let block_size = output.block_size();
        self.process(&mut output.buffers, block_size)
    }

    /// Render `block_size` frames. Returns `false` for a silent block.
    pub fn process<B: AsMut<[f32]>>(&mut self, outputs: &mut [B], block_size: usize) -> bool {
        self.drain_messages();
        self.apply_parameters();

        let has_content = self.synth.synthesize(outputs, block_size);

        if self.parameters.bypass {
            for output in outputs.iter_mut() {
                let output = output.as_mut();
                let len = block_size.min(output.len());
                output[..len].fill(0.0);
            }
            return false;
        }

        self.filter.process(outputs, block_size);
        has_content
    }

    /// Stop all: dispose every voice and clear the effect memories.
    pub fn reset(&mut self) {
        self.synth.reset();
        self.filter.reset();
    }

    fn drain_messages(&mut self) {
        let Some(mut receiver) = self.receiver.take() else {
            return;
        };
        while let Some(message) = receiver.pop() {
            self.handle_message(message);
        }
        self.receiver = Some(receiver);
    }

    fn apply_parameters(&mut self) {
        let params = self.parameters;
        if self.applied == Some(params) {
            return;
        }

        self.synth.update_properties(&SynthProperties::from(&params));

        self.filter.set_cutoff(params.cutoff);
        self.filter.set_resonance(params.resonance);

        if params.lfo_rate > 0.0 {
            if self.filter.lfo().is_none() {
                self.filter
                    .set_lfo(Some(TableLfo::sine(self.config.sample_rate)));
            }
            if let Some(lfo) = self.filter.lfo_mut() {
                lfo.set_rate(params.lfo_rate);
            }
            self.filter.set_lfo_depth(params.lfo_depth);
        } else if self.filter.lfo().is_some() {
            self.filter.set_lfo(None);
        }

        self.applied = Some(params);
    }
}

impl Default for SidEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
