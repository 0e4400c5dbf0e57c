/*
Voice Registry
==============

The synthesizer owns every sounding voice, turns note events into voice
creation and retirement, and renders the voices into the output block.

    note_on ──→ retire old owner of pitch ──→ glide takeover? ──→ new voice
                                                  │                  │
                                                  └──── return       ↓
                                                             arpeggiator update

    note_off ──→ pop glide history? ──→ release (or retire) ──→ arpeggiator update

Identity
--------

Voices are identified by a `VoiceId`, never by pitch. Portamento moves a
voice from one pitch to another while keeping its id, so pitch is just a
mutable attribute. At most one voice owns any given pitch.

Render Order
------------

Voices are rendered newest first. A voice whose release finishes mid-block
stops contributing at that sample and is disposed once the block is done:

    for voice in voices.rev():
        muted & released     → advance envelope only
        muted & held         → skip
        otherwise            → per sample:
                                   arpeggio step (carrier), or
                                   glide step when not arpeggiating
                                   oscillator(frequency × pitch bend)
                                   × envelope × volume → every channel

The summed block then runs through the ring modulator.

While the arpeggiator is active it owns every held voice's frequency, so any
glide in flight is settled onto its target instead of stepping.
*/

use log::{debug, warn};

use crate::{
    dsp::{
        oscillator::Waveform,
        ringmod::RingModulator,
        tables::MAX_PITCH,
    },
    max_envelope_samples,
    synth::{
        arpeggiator::Arpeggiator,
        properties::SynthProperties,
        voice::{Voice, VoiceId},
    },
};

/// Upper bound on the voice pool.
pub const MAX_VOICES: usize = 256;

pub const DEFAULT_SAMPLE_RATE: f32 = 44_100.0;
pub const DEFAULT_TEMPO: f32 = 120.0;

pub struct Synthesizer {
    voices: Vec<Voice>,
    max_voices: usize,
    next_id: VoiceId,
    age_counter: u64,

    properties: SynthProperties,
    arpeggiator: Arpeggiator,
    ring_modulator: RingModulator,

    sample_rate: f32,
    tempo: f32,
    max_envelope_samples: f32,

    disposals: Vec<VoiceId>,
}

impl Synthesizer {
    pub fn new(max_voices: usize) -> Self {
        let max_voices = max_voices.clamp(1, MAX_VOICES);

        let mut synth = Self {
            voices: Vec::with_capacity(max_voices),
            max_voices,
            next_id: VoiceId(0),
            age_counter: 0,
            properties: SynthProperties::default(),
            arpeggiator: Arpeggiator::new(max_voices),
            ring_modulator: RingModulator::new(DEFAULT_SAMPLE_RATE),
            sample_rate: DEFAULT_SAMPLE_RATE,
            tempo: DEFAULT_TEMPO,
            max_envelope_samples: max_envelope_samples(DEFAULT_SAMPLE_RATE),
            disposals: Vec::with_capacity(max_voices),
        };
        synth.init(DEFAULT_SAMPLE_RATE, DEFAULT_TEMPO);
        synth
    }

    /// Configure sample rate and tempo. Voices already sounding keep the
    /// increments they were started with.
    pub fn init(&mut self, sample_rate: f32, tempo: f32) {
        self.sample_rate = if sample_rate.is_finite() && sample_rate > 0.0 {
            sample_rate
        } else {
            DEFAULT_SAMPLE_RATE
        };
        self.ring_modulator.set_sample_rate(self.sample_rate);
        self.set_tempo(tempo);
    }

    /// Recompute the tempo-derived step length and the envelope scale.
    pub fn set_tempo(&mut self, tempo: f32) {
        self.tempo = if tempo.is_finite() && tempo > 0.0 {
            tempo
        } else {
            DEFAULT_TEMPO
        };
        self.max_envelope_samples = max_envelope_samples(self.sample_rate);
        self.arpeggiator.set_timing(self.sample_rate, self.tempo);

        debug!(
            "timing: {} Hz, {} BPM, arpeggio step {} samples",
            self.sample_rate,
            self.tempo,
            self.arpeggiator.step_duration()
        );
    }

    pub fn update_properties(&mut self, properties: &SynthProperties) {
        self.properties = *properties;
        self.ring_modulator.set_rate(properties.ring_mod_rate);
        self.ring_modulator.set_fine(properties.ring_mod_fine);
        self.ring_modulator.set_feedback(properties.ring_mod_feedback);
    }

    pub fn note_on(&mut self, pitch: u8, velocity: f32, tuning_cents: f32) {
        let pitch = pitch.min(MAX_PITCH);

        if let Some(index) = self.voices.iter().position(|v| v.pitch == pitch) {
            self.retire(index);
            self.update_arpeggiator();
        }

        let glide_steps = self.glide_steps();
        if glide_steps > 0 {
            let arpeggiating = self.arpeggiator.is_active();
            if let Some(voice) = self
                .voices
                .iter_mut()
                .find(|v| !v.released && !v.is_gliding())
            {
                let previous = voice.pitch;
                voice.portamento.push_history(previous);
                voice.glide_to(pitch, glide_steps);
                if arpeggiating {
                    voice.portamento.settle(&mut voice.frequency);
                }

                debug!(
                    "voice {:?} glides {} -> {} over {} samples",
                    voice.id(),
                    previous,
                    pitch,
                    glide_steps
                );
                return;
            }
        }

        if self.voices.len() >= self.max_voices {
            self.steal_voice();
        }

        let id = self.allocate_id();
        let voice = Voice::new(
            id,
            pitch,
            velocity,
            tuning_cents,
            &self.properties.envelope,
            self.max_envelope_samples,
            self.age_counter,
        );
        self.age_counter += 1;
        self.voices.push(voice);

        debug!("voice {:?} on pitch {}", id, pitch);

        self.update_arpeggiator();
    }

    pub fn note_off(&mut self, pitch: u8) {
        let pitch = pitch.min(MAX_PITCH);

        let glide_steps = self.glide_steps();
        if glide_steps > 0 {
            for voice in &mut self.voices {
                voice.portamento.forget(pitch);
            }
            if self.restore_previous_pitch(pitch, glide_steps) {
                return;
            }
        }

        let Some(index) = self
            .voices
            .iter()
            .position(|v| v.pitch == pitch && !v.released)
        else {
            return;
        };

        let release = self.properties.envelope.release;
        if release <= 0.0 || self.voices[index].envelope.sustain() <= 0.0 {
            self.retire(index);
            self.update_arpeggiator();
            return;
        }

        let voice = &mut self.voices[index];
        voice.release(release, self.max_envelope_samples);
        let id = voice.id();
        debug!("voice {:?} released", id);

        self.arpeggiator.disarm(id);
        self.update_arpeggiator();
    }

    /// Render `block_size` frames into every channel of `outputs`.
    ///
    /// Returns `false` when no voice exists and the block is silent.
    pub fn synthesize<B: AsMut<[f32]>>(&mut self, outputs: &mut [B], block_size: usize) -> bool {
        let mut block_size = block_size;
        for output in outputs.iter_mut() {
            let output = output.as_mut();
            block_size = block_size.min(output.len());
        }
        for output in outputs.iter_mut() {
            output.as_mut()[..block_size].fill(0.0);
        }

        if self.voices.is_empty() {
            return false;
        }

        let waveform = if self.ring_modulator.is_active() {
            Waveform::Triangle
        } else {
            Waveform::Pulse
        };

        let arpeggiating = self.arpeggiator.is_active();
        if arpeggiating {
            self.arpeggiator.collect_frequencies(&self.voices);
        }

        let pitch_bend = self.properties.pitch_bend;
        let sample_rate = self.sample_rate;
        self.disposals.clear();

        for voice in self.voices.iter_mut().rev() {
            if voice.muted {
                if voice.released {
                    for _ in 0..block_size {
                        voice.envelope.next_sample();
                        if voice.envelope.is_disposed() {
                            self.disposals.push(voice.id());
                            break;
                        }
                    }
                }
                continue;
            }

            for i in 0..block_size {
                if arpeggiating {
                    self.arpeggiator.step(voice);
                } else {
                    voice.portamento.step(&mut voice.frequency);
                }

                let raw = voice.oscillator.next_sample(
                    waveform,
                    voice.frequency * pitch_bend,
                    i,
                    sample_rate,
                );

                if voice.arpeggio_offset > 0 {
                    voice.arpeggio_offset -= 1;
                }

                let sample = raw * voice.envelope.next_sample() * voice.volume();
                for output in outputs.iter_mut() {
                    output.as_mut()[i] += sample;
                }

                if voice.envelope.is_disposed() {
                    self.disposals.push(voice.id());
                    break;
                }
            }
        }

        if !self.disposals.is_empty() {
            for i in 0..self.disposals.len() {
                let id = self.disposals[i];
                if let Some(index) = self.voices.iter().position(|v| v.id() == id) {
                    self.retire(index);
                }
            }
            self.update_arpeggiator();
        }

        self.ring_modulator.apply(outputs, block_size);

        debug_assert!(outputs
            .iter_mut()
            .all(|o| o.as_mut()[..block_size].iter().all(|s| s.is_finite())));

        true
    }

    /// Dispose every voice and silence the ring modulator's memory.
    pub fn reset(&mut self) {
        if !self.voices.is_empty() {
            debug!("reset: disposing {} voices", self.voices.len());
        }
        self.voices.clear();
        self.disposals.clear();
        self.arpeggiator.clear();
        self.ring_modulator.reset();
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    /// Live voices in registry order, oldest first.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn voice_for_pitch(&self, pitch: u8) -> Option<&Voice> {
        self.voices.iter().find(|v| v.pitch == pitch)
    }

    pub fn is_arpeggiating(&self) -> bool {
        self.arpeggiator.is_active()
    }

    pub fn arpeggiated_ids(&self) -> &[VoiceId] {
        self.arpeggiator.armed()
    }

    pub fn step_duration(&self) -> u32 {
        self.arpeggiator.step_duration()
    }

    pub fn properties(&self) -> &SynthProperties {
        &self.properties
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn tempo(&self) -> f32 {
        self.tempo
    }

    pub fn max_envelope_samples(&self) -> f32 {
        self.max_envelope_samples
    }

    /// Glide length in samples; zero when portamento is off.
    pub fn glide_steps(&self) -> u32 {
        (self.properties.portamento * self.max_envelope_samples).round() as u32
    }

    pub fn ring_modulator(&self) -> &RingModulator {
        &self.ring_modulator
    }

    /// Hand the voice owning `pitch` back to the key held before it.
    fn restore_previous_pitch(&mut self, pitch: u8, glide_steps: u32) -> bool {
        let Some(owner) = self
            .voices
            .iter()
            .find(|v| v.pitch == pitch && !v.released)
            .map(Voice::id)
        else {
            return false;
        };

        loop {
            let Some(index) = self.index_of(owner) else {
                return false;
            };
            let Some(previous) = self.voices[index].portamento.pop_history() else {
                return false;
            };

            // a released voice may still sit on that pitch
            match self.voices.iter().position(|v| v.pitch == previous) {
                Some(other) if self.voices[other].released => self.retire(other),
                Some(_) => continue,
                None => {}
            }

            let Some(index) = self.index_of(owner) else {
                return false;
            };
            let voice = &mut self.voices[index];
            voice.glide_to(previous, glide_steps);
            if self.arpeggiator.is_active() {
                voice.portamento.settle(&mut voice.frequency);
            }
            debug!("voice {:?} returns to pitch {}", owner, previous);
            return true;
        }
    }

    fn index_of(&self, id: VoiceId) -> Option<usize> {
        self.voices.iter().position(|v| v.id() == id)
    }

    fn retire(&mut self, index: usize) {
        let voice = self.voices.remove(index);
        self.arpeggiator.disarm(voice.id());
        debug!("voice {:?} disposed (pitch {})", voice.id(), voice.pitch);
    }

    fn steal_voice(&mut self) {
        let index = self
            .voices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.released)
            .min_by_key(|(_, v)| v.age())
            .map(|(index, _)| index)
            .unwrap_or(0);

        warn!(
            "voice pool full ({}), stealing voice {:?}",
            self.max_voices,
            self.voices[index].id()
        );
        self.retire(index);
    }

    fn allocate_id(&mut self) -> VoiceId {
        loop {
            let id = self.next_id;
            self.next_id = id.next();
            if self.index_of(id).is_none() {
                return id;
            }
        }
    }

    fn update_arpeggiator(&mut self) {
        let was_active = self.arpeggiator.is_active();
        if self.arpeggiator.update(&mut self.voices) {
            self.arpeggiator.set_timing(self.sample_rate, self.tempo);
            debug!(
                "arpeggiator on: {} voices, step {} samples",
                self.arpeggiator.armed().len(),
                self.arpeggiator.step_duration()
            );
        } else if was_active && !self.arpeggiator.is_active() {
            debug!("arpeggiator off");
        }
    }
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::{
        envelope::EnvelopeShape,
        tables::{cents_to_ratio, frequency_for_pitch},
    };

    const BLOCK: usize = 256;

    fn synth_with(props: SynthProperties) -> Synthesizer {
        let mut synth = Synthesizer::new(16);
        synth.init(44_100.0, 120.0);
        synth.update_properties(&props);
        synth
    }

    fn render(synth: &mut Synthesizer, blocks: usize) -> Vec<f32> {
        let mut out = Vec::with_capacity(blocks * BLOCK);
        let mut buffers = vec![vec![0.0f32; BLOCK]; 2];
        for _ in 0..blocks {
            synth.synthesize(&mut buffers, BLOCK);
            out.extend_from_slice(&buffers[0]);
        }
        out
    }

    #[test]
    fn silent_without_voices() {
        let mut synth = Synthesizer::default();
        let mut buffers = vec![vec![1.0f32; BLOCK]; 2];
        assert!(!synth.synthesize(&mut buffers, BLOCK));
        assert!(buffers.iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn same_pitch_retires_previous_owner() {
        let mut synth = synth_with(SynthProperties::default());
        synth.note_on(60, 1.0, 0.0);
        let first = synth.voices()[0].id();
        synth.note_on(60, 0.5, 0.0);

        assert_eq!(synth.voice_count(), 1);
        assert_ne!(synth.voices()[0].id(), first);
    }

    #[test]
    fn zero_release_note_off_removes_voice() {
        let mut synth = synth_with(SynthProperties::default());
        synth.note_on(72, 1.0, 0.0);
        synth.note_off(72);
        assert_eq!(synth.voice_count(), 0);
    }

    #[test]
    fn unknown_note_off_is_ignored() {
        let mut synth = synth_with(SynthProperties::default());
        synth.note_on(60, 1.0, 0.0);
        synth.note_off(61);
        assert_eq!(synth.voice_count(), 1);
    }

    #[test]
    fn released_voice_is_disposed_after_tail() {
        let props = SynthProperties {
            envelope: EnvelopeShape::new(0.0, 0.0, 1.0, 0.01),
            ..Default::default()
        };
        let mut synth = synth_with(props);
        synth.note_on(60, 1.0, 0.0);
        render(&mut synth, 1);
        synth.note_off(60);
        assert_eq!(synth.voice_count(), 1);
        assert!(synth.voices()[0].is_released());

        // 441 samples of release
        render(&mut synth, 3);
        assert_eq!(synth.voice_count(), 0);
    }

    #[test]
    fn pool_steals_oldest_released_voice() {
        let props = SynthProperties {
            envelope: EnvelopeShape::new(0.0, 0.0, 1.0, 1.0),
            ..Default::default()
        };
        let mut synth = Synthesizer::new(2);
        synth.update_properties(&props);

        synth.note_on(60, 1.0, 0.0);
        synth.note_on(62, 1.0, 0.0);
        synth.note_off(60);
        synth.note_on(64, 1.0, 0.0);

        let pitches: Vec<u8> = synth.voices().iter().map(|v| v.pitch()).collect();
        assert_eq!(pitches, vec![62, 64]);
    }

    #[test]
    fn ids_skip_live_voices_when_wrapping() {
        let mut synth = synth_with(SynthProperties::default());
        synth.note_on(60, 1.0, 0.0);
        synth.next_id = synth.voices()[0].id();
        synth.note_on(61, 1.0, 0.0);

        let ids: Vec<VoiceId> = synth.voices().iter().map(|v| v.id()).collect();
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn ring_mod_switches_to_triangle_and_stays_finite() {
        let props = SynthProperties {
            ring_mod_rate: 0.2,
            ..Default::default()
        };
        let mut synth = synth_with(props);
        synth.note_on(48, 1.0, 0.0);
        let out = render(&mut synth, 8);

        assert!(out.iter().all(|s| s.is_finite()));
        assert!(out.iter().any(|&s| s != 0.0));
    }

    #[test]
    fn arpeggio_carrier_cycles_through_held_pitches() {
        let mut synth = synth_with(SynthProperties::default());
        synth.set_tempo(480.0);
        for pitch in [60, 64, 67] {
            synth.note_on(pitch, 1.0, 0.0);
        }
        assert!(synth.is_arpeggiating());

        let step = synth.step_duration() as usize;
        let expected: Vec<f32> = [60, 64, 67].iter().map(|&p| frequency_for_pitch(p)).collect();

        let mut seen = Vec::new();
        let mut buffers = vec![vec![0.0f32; 1]];
        for _ in 0..(step * 6) {
            synth.synthesize(&mut buffers, 1);
            let frequency = synth.voices()[0].frequency();
            if seen.last() != Some(&frequency) {
                seen.push(frequency);
            }
        }

        assert_eq!(seen.len(), 6);
        for frequency in &seen {
            assert!(expected.contains(frequency));
        }
    }

    #[test]
    fn tempo_change_keeps_running_envelope() {
        let props = SynthProperties {
            envelope: EnvelopeShape::new(0.5, 0.0, 1.0, 0.0),
            ..Default::default()
        };
        let mut synth = synth_with(props);
        synth.note_on(60, 1.0, 0.0);
        render(&mut synth, 4);
        let before = synth.voices()[0].envelope_level();

        synth.init(96_000.0, 60.0);
        render(&mut synth, 1);
        let after = synth.voices()[0].envelope_level();

        // still on the 44.1 kHz slope: 256 more samples of 1/22050
        let expected = before + BLOCK as f32 / 22_050.0;
        assert!((after - expected).abs() < 1e-3, "{after} vs {expected}");
    }

    #[test]
    fn reset_silences_everything() {
        let mut synth = synth_with(SynthProperties::default());
        for pitch in [60, 62, 64, 65] {
            synth.note_on(pitch, 1.0, 0.0);
        }
        synth.reset();

        assert_eq!(synth.voice_count(), 0);
        assert!(!synth.is_arpeggiating());
        assert!(synth.arpeggiated_ids().is_empty());
        let mut buffers = vec![vec![0.0f32; BLOCK]];
        assert!(!synth.synthesize(&mut buffers, BLOCK));
    }

    #[test]
    fn ring_settings_reach_the_modulator() {
        let props = SynthProperties {
            ring_mod_rate: 0.1,
            ring_mod_fine: 0.5,
            ring_mod_feedback: 1.0,
            ..Default::default()
        };
        let synth = synth_with(props);

        assert!(synth.ring_modulator().is_active());
        assert_eq!(synth.ring_modulator().fine(), 0.5);
        assert!((synth.ring_modulator().feedback() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn glide_keeps_the_voice_detune() {
        let props = SynthProperties {
            portamento: 0.01,
            ..Default::default()
        };
        let mut synth = synth_with(props);
        synth.note_on(60, 1.0, 50.0);
        synth.note_on(64, 1.0, 0.0);
        render(&mut synth, 2);

        let detuned = frequency_for_pitch(64) * cents_to_ratio(50.0);
        assert_eq!(synth.voice_count(), 1);
        assert_eq!(synth.voices()[0].frequency(), detuned);

        synth.note_off(64);
        render(&mut synth, 2);
        assert_eq!(
            synth.voices()[0].frequency(),
            frequency_for_pitch(60) * cents_to_ratio(50.0)
        );
    }

    #[test]
    fn arpeggio_carrier_does_not_glide() {
        let props = SynthProperties {
            portamento: 0.01,
            ..Default::default()
        };
        let mut synth = synth_with(props);

        // 64 and 72 are glided onto the voices started by 60 and 67
        for pitch in [60, 64, 67, 72, 76] {
            synth.note_on(pitch, 1.0, 0.0);
        }
        assert_eq!(synth.voice_count(), 3);
        assert!(synth.is_arpeggiating());
        assert!(synth.voices().iter().all(|v| !v.is_gliding()));

        let expected: Vec<f32> = [64, 72, 76].iter().map(|&p| frequency_for_pitch(p)).collect();
        let mut buffers = vec![vec![0.0f32; 1]];
        for _ in 0..(synth.step_duration() as usize * 3) {
            synth.synthesize(&mut buffers, 1);
            let carrier = synth.voices().iter().find(|v| !v.is_muted());
            let frequency = carrier.map(|v| v.frequency()).unwrap_or_default();
            assert!(expected.contains(&frequency), "carrier at {frequency} Hz");
        }
    }
}
