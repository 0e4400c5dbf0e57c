//! Tempo-synced arpeggiator.

/*
Arpeggiation
============

With three or more keys held, the synthesizer stops sounding them as separate
voices. Instead a single "carrier" voice stays audible and its frequency is
stepped through the base frequencies of every held voice:

    held:      C   E   G                 armed = [C, E, G]
    carrier:   C ─ E ─ G ─ C ─ E ─ G ─ ...
               └─┘ step_duration samples

The set of voices taking part is an explicit ordered list of ids ("armed"),
in registry order. Voices join it when arpeggiation is (re)computed and leave
it as soon as they are released, so the list only ever holds unreleased ids.

Step duration follows the host tempo. One beat is divided by a subdivision
chosen per tempo bracket so the cycle never crawls or blurs:

    tempo >= 400 BPM    4
    tempo >= 200 BPM    8
    tempo >= 120 BPM   16
    tempo >=  50 BPM   32
    tempo >=  40 BPM   64
    slower            128
*/

use crate::synth::voice::{Voice, VoiceId};

/// Unreleased voices needed before arpeggiation kicks in.
pub const ARPEGGIATOR_THRESHOLD: usize = 3;

/// Beat subdivision used for a given tempo.
pub fn subdivision_for_tempo(tempo: f32) -> u32 {
    if tempo >= 400.0 {
        4
    } else if tempo >= 200.0 {
        8
    } else if tempo >= 120.0 {
        16
    } else if tempo >= 50.0 {
        32
    } else if tempo >= 40.0 {
        64
    } else {
        128
    }
}

/// Samples between two arpeggio steps, never less than one.
pub fn step_duration(sample_rate: f32, tempo: f32) -> u32 {
    let samples_per_beat = (sample_rate * 60.0 / tempo.max(1.0)).round() as u32;
    (samples_per_beat / subdivision_for_tempo(tempo)).max(1)
}

#[derive(Debug, Clone)]
pub struct Arpeggiator {
    active: bool,
    armed: Vec<VoiceId>,
    frequencies: Vec<f32>,
    step_duration: u32,
}

impl Arpeggiator {
    pub fn new(capacity: usize) -> Self {
        Self {
            active: false,
            armed: Vec::with_capacity(capacity),
            frequencies: Vec::with_capacity(capacity),
            step_duration: 1,
        }
    }

    pub fn set_timing(&mut self, sample_rate: f32, tempo: f32) {
        self.step_duration = step_duration(sample_rate, tempo);
    }

    pub fn step_duration(&self) -> u32 {
        self.step_duration
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ids cycled through by the carrier, in registry order.
    pub fn armed(&self) -> &[VoiceId] {
        &self.armed
    }

    /// Drop a voice from the cycle, e.g. once it is released.
    pub fn disarm(&mut self, id: VoiceId) {
        self.armed.retain(|&armed| armed != id);
    }

    /// Recompute activation and mute flags from the current voice set.
    ///
    /// Returns `true` when arpeggiation has just switched on.
    pub fn update(&mut self, voices: &mut [Voice]) -> bool {
        let unreleased = voices.iter().filter(|v| !v.released).count();
        let was_active = self.active;
        self.active = unreleased >= ARPEGGIATOR_THRESHOLD;

        if self.active {
            let mut carrier_found = false;
            for voice in voices.iter_mut() {
                if voice.released {
                    voice.muted = true;
                    continue;
                }

                voice.muted = carrier_found;
                carrier_found = true;
                // the arpeggio owns the frequency from here on
                voice.portamento.settle(&mut voice.frequency);

                if !self.armed.contains(&voice.id()) {
                    self.armed.push(voice.id());
                }
            }
        } else {
            self.armed.clear();
            for voice in voices.iter_mut() {
                voice.muted = false;
                if was_active {
                    voice.arpeggio_offset = 0;
                    voice.arpeggio_index = 0;
                    if !voice.portamento.is_gliding() {
                        voice.frequency = voice.base_frequency;
                    }
                }
            }
        }

        !was_active && self.active
    }

    /// Snapshot the armed voices' base frequencies for the coming block.
    pub(crate) fn collect_frequencies(&mut self, voices: &[Voice]) {
        self.frequencies.clear();
        for id in &self.armed {
            if let Some(voice) = voices.iter().find(|v| v.id() == *id) {
                self.frequencies.push(voice.base_frequency);
            }
        }
    }

    /// Advance the carrier to the next armed frequency once its step ran out.
    #[inline]
    pub(crate) fn step(&self, voice: &mut Voice) {
        if voice.arpeggio_offset == 0 && !self.frequencies.is_empty() {
            voice.arpeggio_index = (voice.arpeggio_index + 1) % self.frequencies.len();
            voice.frequency = self.frequencies[voice.arpeggio_index];
            voice.arpeggio_offset = self.step_duration;
        }
    }

    pub fn clear(&mut self) {
        self.active = false;
        self.armed.clear();
        self.frequencies.clear();
    }
}
