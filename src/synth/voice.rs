use crate::dsp::{
    envelope::{Envelope, EnvelopeShape},
    glide::Portamento,
    oscillator::OscillatorState,
    tables::{cents_to_ratio, frequency_for_pitch},
};

/// Stable handle of a voice. Pitch can change under portamento, the id never
/// does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub u16);

impl VoiceId {
    /// The id after this one, wrapping at the end of the range.
    pub fn next(self) -> Self {
        VoiceId(self.0.wrapping_add(1))
    }
}

/// A single sounding note.
#[derive(Debug, Clone)]
pub struct Voice {
    id: VoiceId,
    pub(crate) pitch: u8,
    volume: f32,
    /// Detune factor from the note's tuning offset, kept across glides.
    tuning_ratio: f32,

    pub(crate) base_frequency: f32,
    pub(crate) frequency: f32,
    pub(crate) oscillator: OscillatorState,

    pub(crate) released: bool,
    pub(crate) muted: bool,

    pub(crate) arpeggio_offset: u32,
    pub(crate) arpeggio_index: usize,

    pub(crate) portamento: Portamento,
    pub(crate) envelope: Envelope,

    age: u64,
}

impl Voice {
    pub fn new(
        id: VoiceId,
        pitch: u8,
        velocity: f32,
        tuning_cents: f32,
        shape: &EnvelopeShape,
        max_envelope_samples: f32,
        age: u64,
    ) -> Self {
        let tuning_ratio = cents_to_ratio(tuning_cents);
        let base_frequency = frequency_for_pitch(pitch) * tuning_ratio;

        Self {
            id,
            pitch,
            volume: velocity.clamp(0.0, 1.0),
            tuning_ratio,
            base_frequency,
            frequency: base_frequency,
            oscillator: OscillatorState::new(),
            released: false,
            muted: false,
            arpeggio_offset: 0,
            arpeggio_index: 0,
            portamento: Portamento::new(),
            envelope: Envelope::new(shape, max_envelope_samples),
            age,
        }
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn pitch(&self) -> u8 {
        self.pitch
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_gliding(&self) -> bool {
        self.portamento.is_gliding()
    }

    pub fn portamento(&self) -> &Portamento {
        &self.portamento
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    /// Creation order stamp; lower is older.
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Hand the voice over to `pitch`, gliding from the current frequency.
    pub(crate) fn glide_to(&mut self, pitch: u8, steps: u32) {
        let target = frequency_for_pitch(pitch) * self.tuning_ratio;
        self.pitch = pitch;
        self.base_frequency = target;
        self.portamento.start(self.frequency, target, steps);
    }

    /// Mark the voice released and ramp its envelope down from sustain.
    pub(crate) fn release(&mut self, release: f32, max_envelope_samples: f32) {
        self.released = true;
        self.envelope.release(release, max_envelope_samples);
    }
}
