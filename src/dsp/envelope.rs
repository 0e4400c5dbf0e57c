/*
Per-Voice ADSR Envelope
=======================

Every voice carries its own linear attack/decay/sustain/release generator.
Shape parameters are normalized (0.0 to 1.0) and read from the synth
properties when a note starts (attack/decay/sustain) or stops (release).

Vocabulary
----------

  level         The envelope's current output value (0.0 to 1.0). Multiplies
                the oscillator sample.

  duration      Length of a phase in samples:
                    duration = normalized_time * max_envelope_samples
                where max_envelope_samples is one second of audio at the
                configured sample rate.

  increment     Per-sample change of `level`, precomputed when the phase is
                entered so the render loop never divides:
                    attack  = 1.0 / max(1, attack_duration)
                    decay   = (1.0 - sustain) / max(1, decay_duration)
                    release = sustain / max(1, release_duration)

The flooring at one sample keeps zero-length phases from producing NaN.


The State Machine
-----------------

    ┌────────┐  level=1   ┌───────┐  level=S  ┌─────────┐
    │ Attack │ ─────────→ │ Decay │ ────────→ │ Sustain │
    └────────┘            └───────┘           └─────────┘
         │                    │                    │
         │      release()     │                    │
         └──────────┬─────────┴────────────────────┘
                    ↓
              ┌─────────┐  level<0   ┌──────────┐
              │ Release │ ─────────→ │ Disposed │
              └─────────┘            └──────────┘

Attack is skipped when its duration is zero. Decay only runs when its
duration is non-zero and sustain is below 1.0.

Release pre-empts every other stage and always ramps from the SUSTAIN level
down to zero, even when attack or decay had not completed yet. The first
sample whose computed level drops below zero renders silence and moves the
envelope to Disposed; the voice registry then drops the voice.

Increments captured at phase entry are never touched afterwards, so changing
the sample rate or tempo mid-note cannot corrupt an envelope in flight.
*/

/// Stage of the per-voice envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Attack,
    Decay,
    Sustain,
    Release,
    Disposed,
}

/// Normalized envelope shape shared by all voices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeShape {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeShape {
    pub fn new(attack: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: attack.clamp(0.0, 1.0),
            decay: decay.clamp(0.0, 1.0),
            sustain: sustain.clamp(0.0, 1.0),
            release: release.clamp(0.0, 1.0),
        }
    }
}

impl Default for EnvelopeShape {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, 0.0)
    }
}

#[derive(Debug, Clone)]
pub struct Envelope {
    attack: f32,
    decay: f32,
    sustain: f32,
    release: f32,

    stage: EnvelopeStage,
    level: f32,

    attack_value: f32,
    attack_increment: f32,
    decay_increment: f32,
    release_value: f32,
    release_increment: f32,
}

impl Envelope {
    /// Seed a fresh envelope for a note-on.
    ///
    /// Release is left unset; it is captured from the properties at note-off
    /// so that the latest release time applies.
    pub fn new(shape: &EnvelopeShape, max_envelope_samples: f32) -> Self {
        let attack_duration = max_envelope_samples * shape.attack;
        let decay_duration = max_envelope_samples * shape.decay;

        let mut env = Self {
            attack: shape.attack,
            decay: shape.decay,
            sustain: shape.sustain,
            release: 0.0,

            stage: EnvelopeStage::Attack,
            level: 1.0,

            attack_value: 0.0,
            attack_increment: 1.0 / attack_duration.max(1.0),
            decay_increment: (1.0 - shape.sustain) / decay_duration.max(1.0),
            release_value: 0.0,
            release_increment: 0.0,
        };

        if env.attack > 0.0 {
            env.level = 0.0;
        } else {
            env.stage = env.stage_after_attack();
        }
        env
    }

    fn does_decay(&self) -> bool {
        self.decay > 0.0 && self.sustain < 1.0
    }

    fn stage_after_attack(&self) -> EnvelopeStage {
        if self.does_decay() {
            EnvelopeStage::Decay
        } else {
            EnvelopeStage::Sustain
        }
    }

    /// Enter the release stage. Has no effect once release has started.
    pub fn release(&mut self, release: f32, max_envelope_samples: f32) {
        if matches!(self.stage, EnvelopeStage::Release | EnvelopeStage::Disposed) {
            return;
        }

        if self.sustain <= 0.0 {
            self.level = 0.0;
            self.stage = EnvelopeStage::Disposed;
            return;
        }

        self.release = release.clamp(0.0, 1.0);
        let release_duration = max_envelope_samples * self.release;
        self.release_value = 0.0;
        self.release_increment = self.sustain / release_duration.max(1.0);
        self.stage = EnvelopeStage::Release;
    }

    /// Advance by one sample and return the gain to apply to it.
    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        match self.stage {
            EnvelopeStage::Attack => {
                self.level = self.attack_value;
                self.attack_value += self.attack_increment;

                if self.attack_value >= 1.0 {
                    self.stage = self.stage_after_attack();
                }
            }

            EnvelopeStage::Decay => {
                self.level -= self.decay_increment;

                if self.level <= self.sustain {
                    self.level = self.sustain;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.sustain;
            }

            EnvelopeStage::Release => {
                let level = self.sustain - self.release_value;
                self.release_value += self.release_increment;

                if level < 0.0 {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Disposed;
                } else {
                    self.level = level;
                }
            }

            EnvelopeStage::Disposed => {
                self.level = 0.0;
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn sustain(&self) -> f32 {
        self.sustain
    }

    pub fn is_released(&self) -> bool {
        matches!(self.stage, EnvelopeStage::Release | EnvelopeStage::Disposed)
    }

    pub fn is_disposed(&self) -> bool {
        self.stage == EnvelopeStage::Disposed
    }
}
