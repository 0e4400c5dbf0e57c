//! Triggered oscilloscope
//!
//! Pulse waves drift across a free-running scope, so the trace starts at the
//! first rising zero crossing in the older half of the buffer and shows half
//! a buffer from there.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Index of the first rising zero crossing within `search`, or 0.
fn trigger_point(samples: &[f32], search: usize) -> usize {
    samples
        .windows(2)
        .take(search)
        .position(|w| w[0] <= 0.0 && w[1] > 0.0)
        .map_or(0, |i| i + 1)
}

fn scope_trace(samples: &[f32]) -> Vec<(f64, f64)> {
    let window = samples.len() / 2;
    if window == 0 {
        return Vec::new();
    }
    let start = trigger_point(samples, samples.len() - window);

    samples[start..start + window]
        .iter()
        .enumerate()
        .map(|(i, &s)| (i as f64 / window as f64, s as f64))
        .collect()
}

pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    // vertical range follows the signal so quiet patches stay readable
    let peak = audio_buffer
        .iter()
        .fold(0.0f32, |acc, &x| acc.max(x.abs()))
        .max(0.1) as f64;

    let trace = scope_trace(audio_buffer);
    let zero = [(0.0, 0.0), (1.0, 0.0)];

    let datasets = vec![
        Dataset::default()
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(&zero),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&trace),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .title(format!(" Scope  ±{:.2} ", peak))
                .borders(Borders::ALL),
        )
        .x_axis(Axis::default().bounds([0.0, 1.0]))
        .y_axis(Axis::default().bounds([-peak, peak]));

    frame.render_widget(chart, area);
}
