//! Oscilloscope widget: the rendered signal with the envelope overlaid.
//!
//! The cyan trace is the raw audio tap. The magenta rails mirror the
//! voice's current automated gain around zero, so the attack, decay and
//! release ramps stay readable even when the carrier fills the pane.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Chart points for the signal trace, x normalized to [0, 1].
fn trace_points(samples: &[f32]) -> Vec<(f64, f64)> {
    let span = samples.len().max(1) as f64;
    samples
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64 / span, f64::from(sample)))
        .collect()
}

/// A horizontal rail at `level`, spanning the whole pane.
fn rail(level: f64) -> [(f64, f64); 2] {
    [(0.0, level), (1.0, level)]
}

pub fn render_waveform(frame: &mut Frame, area: Rect, samples: &[f32], gain_now: f32) {
    let block = Block::default()
        .title(format!(" Scope  gain {:.2} ", gain_now))
        .borders(Borders::ALL);

    let trace = trace_points(samples);
    let level = f64::from(gain_now.clamp(0.0, 1.0));
    let upper = rail(level);
    let lower = rail(-level);

    let rail_style = Style::default().fg(Color::Magenta);
    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(rail_style)
            .data(&upper),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(rail_style)
            .data(&lower),
        Dataset::default()
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Cyan))
            .data(&trace),
    ];

    let axis = |bounds: [f64; 2]| {
        Axis::default()
            .bounds(bounds)
            .style(Style::default().fg(Color::DarkGray))
    };
    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(axis([0.0, 1.0]))
        .y_axis(axis([-1.0, 1.0]));

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_spans_the_unit_interval() {
        let points = trace_points(&[0.5, -0.5, 0.25, 0.0]);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0], (0.0, 0.5));
        assert_eq!(points[3], (0.75, 0.0));
    }

    #[test]
    fn rails_mirror_the_gain_level() {
        assert_eq!(rail(0.5), [(0.0, 0.5), (1.0, 0.5)]);
        assert_eq!(rail(-0.5), [(0.0, -0.5), (1.0, -0.5)]);
    }
}
