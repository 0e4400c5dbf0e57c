//! TUI module for sidsynth
//!
//! Real-time view of the engine: transport, live voices, oscilloscope and
//! spectrum. Keys are forwarded to the audio thread as control messages.

mod spectrum;
pub mod state;
mod transport;
mod voices;
mod waveform;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use std::time::Duration;

pub use state::{ControlMessage, UiStateInit, UiStateUpdate};

use spectrum::{render_spectrum, SpectrumAnalyzer};
use transport::{render_transport, AudioStats};
use voices::render_voices;
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

pub struct UiApp {
    /// Ring buffer receiver for audio samples
    audio_rx: Consumer<f32>,
    /// Ring buffer receiver for UI state updates
    state_rx: Consumer<UiStateUpdate>,
    /// Commands to the audio thread
    control_tx: Producer<ControlMessage>,
    static_state: UiStateInit,
    /// Current UI state (latest received)
    current_state: UiStateUpdate,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        audio_rx: Consumer<f32>,
        state_rx: Consumer<UiStateUpdate>,
        control_tx: Producer<ControlMessage>,
        static_state: UiStateInit,
    ) -> Self {
        let spectrum = SpectrumAnalyzer::new(VIS_BUFFER_SIZE, static_state.sample_rate);
        Self {
            audio_rx,
            state_rx,
            control_tx,
            static_state,
            current_state: UiStateUpdate::new(),
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.poll_state();

            terminal.draw(|frame| self.render(frame))?;

            // Handle keyboard input (non-blocking, ~60fps)
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        Ok(())
    }

    /// Keep the last VIS_BUFFER_SIZE samples and refresh the spectrum.
    fn poll_audio(&mut self) {
        let mut received = false;
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            received = true;
        }

        if received {
            if self.audio_buffer.len() > VIS_BUFFER_SIZE {
                let excess = self.audio_buffer.len() - VIS_BUFFER_SIZE;
                self.audio_buffer.drain(0..excess);
            }
            self.spectrum.update(&self.audio_buffer);
        }
    }

    fn poll_state(&mut self) {
        // Keep only the latest state
        while let Ok(state) = self.state_rx.pop() {
            self.current_state = state;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let message = match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char(' ') => ControlMessage::TogglePlayback,
            KeyCode::Char('r') | KeyCode::Char('R') => ControlMessage::Panic,
            KeyCode::Char('m') | KeyCode::Char('M') => ControlMessage::ToggleRingMod,
            KeyCode::Char('l') | KeyCode::Char('L') => ControlMessage::ToggleFilterLfo,
            KeyCode::Char('g') | KeyCode::Char('G') => ControlMessage::ToggleGlide,
            _ => return,
        };

        // a full queue means the audio thread is stalled; dropping is fine
        let _ = self.control_tx.push(message);
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Transport bar
                Constraint::Min(6),     // Voices
                Constraint::Length(10), // Scope + spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(frame.area());

        let stats = AudioStats::from_buffer(&self.audio_buffer);
        render_transport(frame, chunks[0], &self.static_state, &self.current_state, &stats);

        render_voices(frame, chunks[1], &self.current_state);

        let scopes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);
        render_waveform(frame, scopes[0], &self.audio_buffer);
        render_spectrum(frame, scopes[1], &self.spectrum, self.current_state.cutoff);

        let help = Paragraph::new(
            " [Q] Quit  [Space] Play/Pause  [R] Panic  [M] Ring mod  [L] Filter LFO  [G] Glide",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
