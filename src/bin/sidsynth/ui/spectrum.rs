//! Spectrum analyzer widget
//!
//! FFT of the mono mix on log-spaced bins, with the live filter cutoff
//! drawn as a marker so the LFO sweep is visible.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::{f32::consts::TAU, sync::Arc};

/// Number of frequency bins to display
const SPECTRUM_BINS: usize = 48;

/// Lowest displayed frequency, Hz
const MIN_DISPLAY_FREQ: f32 = 20.0;

/// Floor of the magnitude axis, dB
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    /// Hann window coefficients
    window: Vec<f32>,
    /// (frequency Hz, FFT bin index) per displayed point
    bins: Vec<(f64, usize)>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// Current spectrum data: (log10 frequency, magnitude dB)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size and must match the scope buffer.
    pub fn new(buffer_len: usize, sample_rate: f32) -> Self {
        let buffer_len = buffer_len.max(2);
        let fft = FftPlanner::new().plan_fft_forward(buffer_len);

        let denom = (buffer_len - 1) as f32;
        let window = (0..buffer_len)
            .map(|i| 0.5 * (1.0 - (TAU * i as f32 / denom).cos()))
            .collect();

        // Log-spaced points from 20 Hz to Nyquist
        let max_freq = (sample_rate * 0.5).min(20_000.0).max(MIN_DISPLAY_FREQ + 1.0);
        let ratio = (max_freq / MIN_DISPLAY_FREQ) as f64;
        let last_bin = buffer_len / 2 - 1;

        let bins: Vec<(f64, usize)> = (0..SPECTRUM_BINS)
            .map(|i| {
                let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
                let freq = MIN_DISPLAY_FREQ as f64 * ratio.powf(t);
                let index = (freq * buffer_len as f64 / sample_rate as f64).round() as usize;
                (freq, index.min(last_bin))
            })
            .collect();

        let spectrum = bins.iter().map(|&(f, _)| (f.log10(), FLOOR_DB)).collect();

        Self {
            window,
            bins,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            spectrum,
        }
    }

    /// Recompute from the latest scope buffer; other lengths are ignored.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((bin, sample), w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *bin = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (point, &(_, index)) in self.spectrum.iter_mut().zip(&self.bins) {
            let bin = self.scratch[index];
            let power = (bin.re * bin.re + bin.im * bin.im).max(1e-12);
            point.1 = (10.0 * (power as f64).log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    /// Horizontal bounds in log10 Hz.
    pub fn bounds(&self) -> [f64; 2] {
        let first = self.spectrum.first().map_or(0.0, |p| p.0);
        let last = self.spectrum.last().map_or(1.0, |p| p.0);
        [first, last.max(first + f64::EPSILON)]
    }
}

/// Render the spectrum analyzer widget
pub fn render_spectrum(frame: &mut Frame, area: Rect, analyzer: &SpectrumAnalyzer, cutoff: f32) {
    let block = Block::default()
        .title(format!(" Spectrum  cutoff {:.0} Hz ", cutoff))
        .borders(Borders::ALL);

    let spectrum = analyzer.data();
    let max_db = spectrum.iter().map(|(_, db)| *db).fold(FLOOR_DB, f64::max);
    let top = max_db.max(0.0) + 10.0;

    let cutoff_x = (cutoff.max(1.0) as f64).log10();
    let marker = [(cutoff_x, FLOOR_DB), (cutoff_x, top)];

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(spectrum),
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Yellow))
            .data(&marker),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(
            Axis::default()
                .bounds(analyzer.bounds())
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, top])
                .labels(vec!["-100", "-60", "-20", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
