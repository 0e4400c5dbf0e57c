#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::synth::properties::Parameter;

/// Control events delivered to the audio thread.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn {
        pitch: u8,
        /// 0.0 - 1.0
        velocity: f32,
        tuning_cents: f32,
    },
    NoteOff {
        pitch: u8,
    },
    /// Host-normalized (0.0 - 1.0) parameter value.
    SetParameter {
        parameter: Parameter,
        value: f32,
    },
    Tempo {
        bpm: f32,
    },
    AllNotesOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Plain queue, mostly for tests and offline rendering.
impl MessageReceiver for std::collections::VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
