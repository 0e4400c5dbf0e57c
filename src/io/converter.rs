use crate::{
    io::midi::MidiEvent,
    synth::{message::SynthMessage, properties::Parameter},
};

/// "All notes off" channel mode message.
const CC_ALL_NOTES_OFF: u8 = 123;

pub fn midi_to_synth(midi: MidiEvent, channel_filter: u8) -> Option<SynthMessage> {
    if midi.channel() != channel_filter {
        return None;
    }

    match midi {
        MidiEvent::NoteOn { key, velocity, .. } if velocity > 0 => Some(SynthMessage::NoteOn {
            pitch: key,
            velocity: velocity as f32 / 127.0,
            tuning_cents: 0.0,
        }),
        MidiEvent::NoteOn { key, .. } | MidiEvent::NoteOff { key, .. } => {
            Some(SynthMessage::NoteOff { pitch: key })
        }
        MidiEvent::PitchBend { value, .. } => Some(SynthMessage::SetParameter {
            parameter: Parameter::PitchBend,
            value: (value as f32 / 8192.0).clamp(-1.0, 1.0) * 0.5 + 0.5,
        }),
        MidiEvent::ControlChange {
            controller: CC_ALL_NOTES_OFF,
            ..
        } => Some(SynthMessage::AllNotesOff),
        _ => None,
    }
}
