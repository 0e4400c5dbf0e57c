//! Shared state types for UI communication
//!
//! Designed for real-time safety: static data is sent once at init,
//! dynamic updates are allocation-free.

use sidsynth::SidEngine;

use crate::sequencer::Sequencer;

/// Voices shown in the voice table.
pub const MAX_DISPLAYED_VOICES: usize = 16;

/// Commands sent from UI thread to audio thread
#[derive(Clone, Copy, Debug)]
pub enum ControlMessage {
    /// Toggle play/pause
    TogglePlayback,
    /// Stop all voices and rewind
    Panic,
    ToggleRingMod,
    ToggleFilterLfo,
    ToggleGlide,
}

/// Static state sent once at initialization (can allocate)
#[derive(Clone)]
pub struct UiStateInit {
    /// Patch name from the file, or "default"
    pub patch_name: String,
    /// Tempo in BPM
    pub tempo: f32,
    /// Sixteenth-note ticks in one loop of the demo phrase
    pub loop_ticks: u32,
    /// Audio sample rate in Hz
    pub sample_rate: f32,
}

/// Snapshot of one voice (Copy, no allocations)
#[derive(Clone, Copy, Debug, Default)]
pub struct VoiceSnapshot {
    pub pitch: u8,
    pub frequency: f32,
    pub level: f32,
    pub muted: bool,
    pub released: bool,
    pub gliding: bool,
}

/// Dynamic state update sent from audio thread (allocation-free, Copy)
#[derive(Clone, Copy, Debug)]
pub struct UiStateUpdate {
    /// Current position in ticks
    pub tick_position: u32,
    /// Whether playback is active
    pub is_playing: bool,
    pub arpeggiating: bool,
    pub step_duration: u32,
    pub ring_mod: bool,
    pub filter_lfo: bool,
    pub glide: bool,
    /// Cutoff used by the last rendered sample, Hz
    pub cutoff: f32,
    pub voices: [VoiceSnapshot; MAX_DISPLAYED_VOICES],
    /// Total live voices, may exceed the displayed ones
    pub voice_count: u8,
}

impl UiStateUpdate {
    /// Create a new update with default values
    pub fn new() -> Self {
        Self {
            tick_position: 0,
            is_playing: true,
            arpeggiating: false,
            step_duration: 0,
            ring_mod: false,
            filter_lfo: false,
            glide: false,
            cutoff: 0.0,
            voices: [VoiceSnapshot::default(); MAX_DISPLAYED_VOICES],
            voice_count: 0,
        }
    }

    /// Capture engine and transport state after a callback.
    pub fn capture(engine: &SidEngine, sequencer: &Sequencer) -> Self {
        let synth = engine.synth();
        let params = engine.parameters();

        let mut update = Self {
            tick_position: sequencer.tick_position(),
            is_playing: sequencer.is_playing(),
            arpeggiating: synth.is_arpeggiating(),
            step_duration: synth.step_duration(),
            ring_mod: params.ring_mod_rate > 0.0,
            filter_lfo: engine.filter().has_active_lfo(),
            glide: params.portamento > 0.0,
            cutoff: engine.filter().current_cutoff(),
            voice_count: synth.voice_count().min(u8::MAX as usize) as u8,
            ..Self::new()
        };

        for (slot, voice) in update.voices.iter_mut().zip(synth.voices()) {
            *slot = VoiceSnapshot {
                pitch: voice.pitch(),
                frequency: voice.frequency(),
                level: voice.envelope_level(),
                muted: voice.is_muted(),
                released: voice.is_released(),
                gliding: voice.is_gliding(),
            };
        }

        update
    }

    pub fn displayed_voices(&self) -> &[VoiceSnapshot] {
        let count = (self.voice_count as usize).min(MAX_DISPLAYED_VOICES);
        &self.voices[..count]
    }
}

impl Default for UiStateUpdate {
    fn default() -> Self {
        Self::new()
    }
}
