//! Voice table - one row per live voice

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Row, Table},
    Frame,
};

use super::UiStateUpdate;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Width of the envelope level bar, in cells.
const LEVEL_WIDTH: usize = 20;

fn note_name(pitch: u8) -> String {
    let octave = pitch as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[pitch as usize % 12], octave)
}

fn level_bar(level: f32) -> String {
    let filled = (level.clamp(0.0, 1.0) * LEVEL_WIDTH as f32).round() as usize;
    format!("{}{}", "█".repeat(filled), "·".repeat(LEVEL_WIDTH - filled))
}

pub fn render_voices(frame: &mut Frame, area: Rect, state: &UiStateUpdate) {
    let title = if state.arpeggiating {
        format!(
            " Voices ({})  arpeggio step {} samples ",
            state.voice_count, state.step_duration
        )
    } else {
        format!(" Voices ({}) ", state.voice_count)
    };

    let rows = state.displayed_voices().iter().map(|voice| {
        let (status, color) = if voice.released {
            ("release", Color::DarkGray)
        } else if voice.muted {
            ("armed", Color::Blue)
        } else if voice.gliding {
            ("glide", Color::Magenta)
        } else {
            ("hold", Color::Green)
        };

        Row::new(vec![
            note_name(voice.pitch),
            format!("{:>8.2} Hz", voice.frequency),
            level_bar(voice.level),
            status.to_string(),
        ])
        .style(Style::default().fg(color))
    });

    let widths = [
        Constraint::Length(5),
        Constraint::Length(12),
        Constraint::Length(LEVEL_WIDTH as u16 + 1),
        Constraint::Min(8),
    ];

    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Note", "Frequency", "Envelope", "State"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title(title).borders(Borders::ALL));

    frame.render_widget(table, area);
}
