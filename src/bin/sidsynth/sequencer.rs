//! Sequencer - sample-accurate playback of the demo phrase
//!
//! The Sequencer runs in the audio thread. The callback asks it how many
//! frames remain until the next note boundary, renders exactly that many,
//! and then lets the sequencer fire whatever became due. Nothing here
//! allocates.

use sidsynth::SidEngine;

/// Sixteenth notes per beat.
pub const TICKS_PER_BEAT: u32 = 4;

/// Notes that can be held at once by the phrase.
const MAX_ACTIVE: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct NoteEvent {
    /// Start, in sixteenth-note ticks from the loop start
    pub tick: u32,
    pub pitch: u8,
    /// Length in ticks
    pub length: u32,
    pub velocity: f32,
}

const fn note(tick: u32, pitch: u8, length: u32) -> NoteEvent {
    NoteEvent {
        tick,
        pitch,
        length,
        velocity: 0.8,
    }
}

/// Four bars: a bassline, overlapping legato lines (glide when portamento is
/// on), then three- and four-note chords that engage the arpeggiator.
/// Sorted by tick.
pub static DEMO_PHRASE: &[NoteEvent] = &[
    // bar 1
    note(0, 45, 2),
    note(2, 45, 2),
    note(4, 57, 2),
    note(6, 45, 2),
    note(8, 43, 2),
    note(10, 43, 2),
    note(12, 55, 2),
    note(14, 43, 2),
    // bar 2: each note overlaps the next
    note(16, 69, 5),
    note(20, 72, 5),
    note(24, 76, 3),
    note(26, 74, 6),
    // bar 3
    note(32, 57, 8),
    note(32, 60, 8),
    note(32, 64, 8),
    note(40, 53, 8),
    note(40, 57, 8),
    note(40, 60, 8),
    // bar 4
    note(48, 55, 8),
    note(48, 59, 8),
    note(48, 62, 8),
    note(56, 52, 8),
    note(56, 56, 8),
    note(56, 59, 8),
    note(56, 64, 8),
];

/// Loop length in ticks.
pub const DEMO_LOOP_TICKS: u32 = 64;

pub struct Sequencer {
    phrase: &'static [NoteEvent],
    loop_ticks: u32,
    samples_per_tick: f64,
    /// Samples since the loop start
    position: u64,
    /// Next phrase event to start
    next_event: usize,
    /// Held notes: (pitch, sample at which to release)
    active: [Option<(u8, u64)>; MAX_ACTIVE],
    playing: bool,
}

impl Sequencer {
    pub fn new(tempo: f32, sample_rate: f32) -> Self {
        Self::with_phrase(DEMO_PHRASE, DEMO_LOOP_TICKS, tempo, sample_rate)
    }

    pub fn with_phrase(
        phrase: &'static [NoteEvent],
        loop_ticks: u32,
        tempo: f32,
        sample_rate: f32,
    ) -> Self {
        Self {
            phrase,
            loop_ticks: loop_ticks.max(1),
            samples_per_tick: Self::compute_samples_per_tick(tempo, sample_rate),
            position: 0,
            next_event: 0,
            active: [None; MAX_ACTIVE],
            playing: true,
        }
    }

    fn compute_samples_per_tick(tempo: f32, sample_rate: f32) -> f64 {
        // ticks per second = (bpm / 60) * ticks per beat
        let ticks_per_second = (tempo.max(1.0) as f64 / 60.0) * TICKS_PER_BEAT as f64;
        sample_rate as f64 / ticks_per_second
    }

    fn sample_of(&self, tick: u32) -> u64 {
        (tick as f64 * self.samples_per_tick).round() as u64
    }

    fn loop_samples(&self) -> u64 {
        self.sample_of(self.loop_ticks).max(1)
    }

    pub fn loop_ticks(&self) -> u32 {
        self.loop_ticks
    }

    pub fn tick_position(&self) -> u32 {
        (self.position as f64 / self.samples_per_tick) as u32
    }

    /// Frames until the next note starts, ends or the loop wraps.
    pub fn frames_until_next_event(&self) -> usize {
        if !self.playing {
            return usize::MAX;
        }

        let mut next = self.loop_samples();
        if let Some(event) = self.phrase.get(self.next_event) {
            next = next.min(self.sample_of(event.tick));
        }
        for &(_, off) in self.active.iter().flatten() {
            next = next.min(off);
        }

        next.saturating_sub(self.position) as usize
    }

    /// Fire every note-off and note-on due at the current position.
    pub fn dispatch(&mut self, engine: &mut SidEngine) {
        if !self.playing {
            return;
        }

        if self.position >= self.loop_samples() {
            self.release_all(engine);
            self.position -= self.loop_samples();
            self.next_event = 0;
        }

        // offs first so a retriggered pitch starts fresh
        for slot in self.active.iter_mut() {
            if let Some((pitch, off)) = *slot {
                if off <= self.position {
                    engine.note_off(pitch);
                    *slot = None;
                }
            }
        }

        while let Some(event) = self.phrase.get(self.next_event) {
            if self.sample_of(event.tick) > self.position {
                break;
            }
            engine.note_on(event.pitch, event.velocity, 0.0);

            let off = self.sample_of(event.tick + event.length);
            if let Some(slot) = self.active.iter_mut().find(|s| s.is_none()) {
                *slot = Some((event.pitch, off));
            }
            self.next_event += 1;
        }
    }

    pub fn advance(&mut self, frames: usize) {
        if self.playing {
            self.position += frames as u64;
        }
    }

    /// Release every note the sequencer is holding.
    pub fn release_all(&mut self, engine: &mut SidEngine) {
        for slot in self.active.iter_mut() {
            if let Some((pitch, _)) = slot.take() {
                engine.note_off(pitch);
            }
        }
    }

    /// Back to the loop start with nothing held.
    pub fn rewind(&mut self) {
        self.position = 0;
        self.next_event = 0;
        self.active = [None; MAX_ACTIVE];
    }

    pub fn toggle(&mut self) {
        self.playing = !self.playing;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }
}
