//! Voice parameter pane - envelope times, waveform, pitch, note state.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use retrig::engine::GraphEngine;
use retrig::voice::EnvelopeVoice;

pub fn render_params(
    frame: &mut Frame,
    area: Rect,
    voice: &EnvelopeVoice<GraphEngine>,
    note_held: bool,
) {
    let block = Block::default().title(" retrig ").borders(Borders::ALL);

    let (state_symbol, state_str, state_color) = if note_held {
        ("▶", "Held", Color::Green)
    } else {
        ("·", "Released", Color::Yellow)
    };

    let envelope = Line::from(vec![
        Span::styled(
            format!(" A: {:.2}s  ", voice.attack),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("D: {:.2}s  ", voice.decay),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("S: {:.2}  ", voice.sustain),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("R: {:.2}s  ", voice.release),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("  {} {:.1} Hz  ", voice.waveform().label(), voice.frequency()),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("  {} {}", state_symbol, state_str),
            Style::default().fg(state_color),
        ),
    ]);

    let paragraph = Paragraph::new(vec![envelope]).block(block);
    frame.render_widget(paragraph, area);
}
