//! Spectrum analyzer widget
//!
//! FFT magnitude spectrum of the visualization buffer, sampled at
//! log-spaced frequencies so the musical range gets most of the width.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Number of frequency bins to display
const SPECTRUM_BINS: usize = 48;

const MIN_FREQ: f64 = 20.0;
const FLOOR_DB: f64 = -100.0;

pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    /// Hann window coefficients, one per input sample
    window: Vec<f32>,
    scratch: Vec<Complex<f32>>,
    /// FFT bin index backing each displayed frequency
    bin_indices: Vec<usize>,
    /// Current spectrum data: (frequency_hz, magnitude_db)
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    /// `buffer_len` is the FFT size and must match the buffer passed to
    /// [`update`](Self::update).
    pub fn new(buffer_len: usize, sample_rate: f64) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(buffer_len);

        // Hann window - reduces spectral leakage
        let denom = (buffer_len.max(2) - 1) as f32;
        let window = (0..buffer_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        // Log-spaced frequencies from 20 Hz to Nyquist
        let max_freq = (sample_rate / 2.0).max(MIN_FREQ + 1.0);
        let ratio = max_freq / MIN_FREQ;
        let half = (buffer_len / 2).max(1);
        let mut bin_indices = Vec::with_capacity(SPECTRUM_BINS);
        let mut spectrum = Vec::with_capacity(SPECTRUM_BINS);
        for i in 0..SPECTRUM_BINS {
            let t = i as f64 / (SPECTRUM_BINS - 1) as f64;
            let freq = MIN_FREQ * ratio.powf(t);
            let index = (freq * buffer_len as f64 / sample_rate).round() as usize;
            bin_indices.push(index.min(half - 1));
            spectrum.push((freq, FLOOR_DB));
        }

        Self {
            fft,
            window,
            scratch: vec![Complex::new(0.0, 0.0); buffer_len],
            bin_indices,
            spectrum,
        }
    }

    /// Recompute the spectrum from a fresh block of samples.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for (slot, (&sample, &coeff)) in self
            .scratch
            .iter_mut()
            .zip(buffer.iter().zip(self.window.iter()))
        {
            *slot = Complex::new(sample * coeff, 0.0);
        }
        self.fft.process(&mut self.scratch);

        for (&index, (_, magnitude_db)) in self.bin_indices.iter().zip(self.spectrum.iter_mut()) {
            let bin = self.scratch[index];
            let power = (bin.re * bin.re + bin.im * bin.im).max(1e-12) as f64;
            *magnitude_db = (10.0 * power.log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }
}

/// Four tick labels spread evenly over the y-axis bounds, so they line up
/// with where ratatui actually places them.
fn db_labels(lo: f64, hi: f64) -> Vec<String> {
    (0..4)
        .map(|i| format!("{:.0}", lo + (hi - lo) * i as f64 / 3.0))
        .collect()
}

pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let max_freq = spectrum.iter().map(|(f, _)| *f).fold(1.0, f64::max);
    let max_db = spectrum.iter().map(|(_, db)| *db).fold(FLOOR_DB, f64::max);
    let top_db = max_db.max(0.0) + 10.0;

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, max_freq])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, top_db])
                .labels(db_labels(FLOOR_DB, top_db))
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_labels_track_the_axis_bounds() {
        assert_eq!(db_labels(-100.0, 20.0), ["-100", "-60", "-20", "20"]);
        assert_eq!(db_labels(-100.0, 10.0), ["-100", "-63", "-27", "10"]);
    }
}
