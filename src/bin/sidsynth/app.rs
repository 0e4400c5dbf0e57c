//! sidsynth - audio setup and the realtime callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use sidsynth::{SidEngine, MAX_BLOCK_SIZE};

use super::patch::{Patch, SwitchPresets};
use super::sequencer::Sequencer;
use super::ui::{ControlMessage, UiApp, UiStateInit, UiStateUpdate};

/// State updates buffered between UI frames.
const STATE_QUEUE_SIZE: usize = 64;
const CONTROL_QUEUE_SIZE: usize = 32;

pub struct SidSynth {
    patch: Patch,
}

impl SidSynth {
    pub fn new(patch: Patch) -> Self {
        Self { patch }
    }

    /// Open the default output, start the demo loop and hand the terminal
    /// to the UI until it quits.
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let config = device
            .default_output_config()
            .wrap_err("failed to fetch default output config")?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let mut engine = SidEngine::new(self.patch.engine_config(sample_rate, channels));
        engine.set_parameters(self.patch.parameters);
        let mut sequencer = Sequencer::new(engine.config().tempo, sample_rate);
        let presets = self.patch.presets;

        let ui_init = UiStateInit {
            patch_name: self.patch.name.clone(),
            tempo: engine.config().tempo,
            loop_ticks: sequencer.loop_ticks(),
            sample_rate,
        };

        // about a second of mono audio for the scope and spectrum
        let (mut audio_tx, audio_rx) = RingBuffer::<f32>::new(sample_rate as usize);
        let (mut state_tx, state_rx) = RingBuffer::<UiStateUpdate>::new(STATE_QUEUE_SIZE);
        let (control_tx, mut control_rx) = RingBuffer::<ControlMessage>::new(CONTROL_QUEUE_SIZE);

        let mut scratch = vec![vec![0.0f32; MAX_BLOCK_SIZE]; engine.config().channels];

        let stream = device.build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                while let Ok(message) = control_rx.pop() {
                    handle_control(message, &mut engine, &mut sequencer, &presets);
                }

                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    // events land on the first frame of a sub-block
                    sequencer.dispatch(&mut engine);

                    let frames_to_render = (total_frames - frames_written)
                        .min(MAX_BLOCK_SIZE)
                        .min(sequencer.frames_until_next_event().max(1));

                    engine.process(&mut scratch, frames_to_render);
                    sequencer.advance(frames_to_render);

                    let out_off = frames_written * channels;
                    for i in 0..frames_to_render {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = scratch[ch % scratch.len()][i];
                        }
                        let _ = audio_tx.push(scratch[0][i]);
                    }

                    frames_written += frames_to_render;
                }

                let _ = state_tx.push(UiStateUpdate::capture(&engine, &sequencer));
            },
            |err| eprintln!("Audio error: {}", err),
            None,
        )?;

        stream.play()?;

        let mut terminal = ratatui::init();
        let result = UiApp::new(audio_rx, state_rx, control_tx, ui_init).run(&mut terminal);
        ratatui::restore();

        result
    }
}

fn handle_control(
    message: ControlMessage,
    engine: &mut SidEngine,
    sequencer: &mut Sequencer,
    presets: &SwitchPresets,
) {
    let mut params = *engine.parameters();

    match message {
        ControlMessage::TogglePlayback => {
            sequencer.toggle();
            if !sequencer.is_playing() {
                sequencer.release_all(engine);
            }
            return;
        }
        ControlMessage::Panic => {
            engine.reset();
            sequencer.rewind();
            return;
        }
        ControlMessage::ToggleRingMod => {
            params.ring_mod_rate = switch(params.ring_mod_rate, presets.ring_mod_rate);
        }
        ControlMessage::ToggleFilterLfo => {
            params.lfo_rate = switch(params.lfo_rate, presets.lfo_rate);
            params.lfo_depth = if params.lfo_rate > 0.0 {
                presets.lfo_depth
            } else {
                0.0
            };
        }
        ControlMessage::ToggleGlide => {
            params.portamento = switch(params.portamento, presets.portamento);
        }
    }

    engine.set_parameters(params);
}

/// Off when on, preset when off.
fn switch(current: f32, preset: f32) -> f32 {
    if current > 0.0 {
        0.0
    } else {
        preset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sidsynth::EngineConfig;

    #[test]
    fn switches_flip_between_zero_and_preset() {
        let mut engine = SidEngine::new(EngineConfig::default());
        let mut sequencer = Sequencer::new(120.0, 44_100.0);
        let presets = SwitchPresets::default();

        handle_control(ControlMessage::ToggleGlide, &mut engine, &mut sequencer, &presets);
        assert_eq!(engine.parameters().portamento, presets.portamento);
        handle_control(ControlMessage::ToggleGlide, &mut engine, &mut sequencer, &presets);
        assert_eq!(engine.parameters().portamento, 0.0);

        handle_control(ControlMessage::ToggleFilterLfo, &mut engine, &mut sequencer, &presets);
        assert_eq!(engine.parameters().lfo_depth, presets.lfo_depth);
    }

    #[test]
    fn panic_silences_and_rewinds() {
        let mut engine = SidEngine::new(EngineConfig::default());
        let mut sequencer = Sequencer::new(120.0, 44_100.0);
        let presets = SwitchPresets::default();

        sequencer.dispatch(&mut engine);
        sequencer.advance(10_000);
        assert!(engine.synth().voice_count() > 0);

        handle_control(ControlMessage::Panic, &mut engine, &mut sequencer, &presets);
        assert_eq!(engine.synth().voice_count(), 0);
        assert_eq!(sequencer.tick_position(), 0);
    }
}
