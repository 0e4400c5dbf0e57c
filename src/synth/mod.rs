// Purpose: voice registry, arpeggiator, portamento and host parameters
// This layer sits above the DSP primitives and owns all note bookkeeping

pub mod arpeggiator;
pub mod message;
pub mod properties;
pub mod synthesizer;
pub mod voice;

pub use message::{MessageReceiver, SynthMessage};
pub use properties::{EngineParameters, Parameter, SynthProperties};
pub use synthesizer::Synthesizer;
pub use voice::{Voice, VoiceId};
