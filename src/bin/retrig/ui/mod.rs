//! TUI for the envelope voice demo
//!
//! Top pane shows the live voice parameters, the middle pane is an
//! oscilloscope on the rendered output, the bottom pane a spectrum.

mod params;
mod spectrum;
mod waveform;

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use retrig::engine::GraphEngine;
use retrig::graph::{AudioGraph, GainNode};
use retrig::voice::EnvelopeVoice;

use params::render_params;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use waveform::render_waveform;

/// Audio visualization buffer size
const VIS_BUFFER_SIZE: usize = 1024;

/// Seconds added or removed per duration keypress.
const DURATION_STEP: f64 = 0.05;

/// Gain added or removed per sustain keypress.
const SUSTAIN_STEP: f32 = 0.05;

/// One equal-tempered semitone.
const SEMITONE: f32 = 1.059_463_1;

/// UI application state
pub struct UiApp {
    engine: GraphEngine,
    voice: EnvelopeVoice<GraphEngine>,
    /// Ring buffer receiver for rendered audio samples
    audio_rx: Consumer<f32>,
    /// Audio sample buffer for visualization
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    /// Whether the spacebar note is currently held
    note_held: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        engine: GraphEngine,
        voice: EnvelopeVoice<GraphEngine>,
        audio_rx: Consumer<f32>,
    ) -> Self {
        let spectrum = SpectrumAnalyzer::new(VIS_BUFFER_SIZE, engine.sample_rate());
        Self {
            engine,
            voice,
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum,
            note_held: false,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.spectrum.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            // Non-blocking input poll, ~60fps
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

    /// Shift everything the audio thread produced since the last frame
    /// into the scope buffer. The buffer stays at `VIS_BUFFER_SIZE`, with
    /// the newest sample always at the back.
    fn poll_audio(&mut self) {
        let buffer = &mut self.audio_buffer;
        while let Ok(sample) = self.audio_rx.pop() {
            buffer.rotate_left(1);
            buffer[VIS_BUFFER_SIZE - 1] = sample;
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        let now = self.engine.current_time();
        let voice = &mut self.voice;

        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => {
                if self.note_held {
                    voice.trigger_off(now);
                } else {
                    voice.trigger_on(now);
                }
                self.note_held = !self.note_held;
            }
            KeyCode::Char('w') => {
                voice.set_waveform(voice.waveform().next());
            }
            KeyCode::Char('a') => voice.attack = (voice.attack - DURATION_STEP).max(0.0),
            KeyCode::Char('A') => voice.attack += DURATION_STEP,
            KeyCode::Char('d') => voice.decay = (voice.decay - DURATION_STEP).max(0.0),
            KeyCode::Char('D') => voice.decay += DURATION_STEP,
            KeyCode::Char('s') => voice.sustain = (voice.sustain - SUSTAIN_STEP).max(0.0),
            KeyCode::Char('S') => voice.sustain = (voice.sustain + SUSTAIN_STEP).min(1.0),
            KeyCode::Char('r') => voice.release = (voice.release - DURATION_STEP).max(0.0),
            KeyCode::Char('R') => voice.release += DURATION_STEP,
            KeyCode::Char('-') => {
                let hz = voice.frequency() / SEMITONE;
                voice.set_frequency(hz.max(20.0));
            }
            KeyCode::Char('=') | KeyCode::Char('+') => {
                let hz = voice.frequency() * SEMITONE;
                voice.set_frequency(hz.min(10_000.0));
            }
            _ => {}
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Voice parameters
                Constraint::Min(8),     // Oscilloscope
                Constraint::Length(10), // Spectrum
                Constraint::Length(1),  // Help bar
            ])
            .split(area);

        let gain_now = self
            .voice
            .output()
            .gain()
            .value_at(self.engine.current_time());

        render_params(frame, chunks[0], &self.voice, self.note_held);
        render_waveform(frame, chunks[1], &self.audio_buffer, gain_now);
        render_spectrum(frame, chunks[2], self.spectrum.data());

        let help = Paragraph::new(
            " [Space] Note on/off  [a/A d/D s/S r/R] Envelope  [w] Waveform  [-/+] Pitch  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_audio_keeps_the_newest_samples_in_order() {
        let engine = GraphEngine::new(48_000.0);
        let voice = EnvelopeVoice::new(&engine);
        let (mut tx, rx) = rtrb::RingBuffer::new(VIS_BUFFER_SIZE * 2);
        let mut app = UiApp::new(engine, voice, rx);

        for i in 0..VIS_BUFFER_SIZE + 8 {
            tx.push(i as f32).unwrap();
        }
        app.poll_audio();

        assert_eq!(app.audio_buffer.len(), VIS_BUFFER_SIZE);
        assert_eq!(app.audio_buffer[0], 8.0, "oldest surviving sample");
        assert_eq!(
            app.audio_buffer[VIS_BUFFER_SIZE - 1],
            (VIS_BUFFER_SIZE + 7) as f32,
            "newest sample sits at the back"
        );
    }
}
