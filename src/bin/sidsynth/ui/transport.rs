//! Transport bar widget - tempo, play state, position, effect switches and
//! audio stats

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{UiStateInit, UiStateUpdate};

/// Sixteenth-note ticks per bar in 4/4.
const TICKS_PER_BAR: u32 = 16;

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

fn switch(label: &str, on: bool) -> Span<'static> {
    let color = if on { Color::Green } else { Color::DarkGray };
    Span::styled(format!("{label}  "), Style::default().fg(color))
}

/// Render the transport bar
pub fn render_transport(
    frame: &mut Frame,
    area: Rect,
    static_state: &UiStateInit,
    dynamic_state: &UiStateUpdate,
    audio_stats: &AudioStats,
) {
    let block = Block::default()
        .title(format!(" sidsynth - {} ", static_state.patch_name))
        .borders(Borders::ALL);

    let current_bar = dynamic_state.tick_position / TICKS_PER_BAR + 1;
    let current_beat = (dynamic_state.tick_position % TICKS_PER_BAR) / 4 + 1;

    let play_symbol = if dynamic_state.is_playing { "▶" } else { "⏸" };
    let play_state_str = if dynamic_state.is_playing { "Playing" } else { "Paused" };

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {:.0}  ", static_state.tempo),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} {}  ", play_symbol, play_state_str),
            Style::default().fg(if dynamic_state.is_playing {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::styled(
            format!("Bar {} | Beat {}  ", current_bar, current_beat),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!(
                "{}/{}  {:.1}kHz  ",
                dynamic_state.tick_position,
                static_state.loop_ticks,
                static_state.sample_rate / 1000.0
            ),
            Style::default().fg(Color::DarkGray),
        ),
        switch("RING", dynamic_state.ring_mod),
        switch("LFO", dynamic_state.filter_lfo),
        switch("GLIDE", dynamic_state.glide),
        switch("ARP", dynamic_state.arpeggiating),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
