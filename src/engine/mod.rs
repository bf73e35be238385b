//! A concrete audio graph: scheduled automation in, sample blocks out.
//!
//! `GraphEngine` implements the [`graph`] service traits for offline
//! rendering and for feeding a realtime output stream. The control thread
//! holds voices and enqueues automation; the render thread (an audio
//! callback, a test, a bounce loop) calls [`GraphEngine::render`] and the
//! engine interprets the schedules sample by sample on its own clock.
//!
//! The engine also exposes the bookkeeping the voice invariants are tested
//! against: scheduled automation events, generator start/stop times, and a
//! counter of single-shot contract violations.
//!
//! [`graph`]: crate::graph

/// Timestamped set/ramp/cancel schedules for control values.
pub mod automation;

use std::sync::{Arc, Mutex};

use crate::graph::{AudioGraph, AudioParam, GainNode, GeneratorNode, Waveform};
use automation::{AutomationEvent, Timeline};

/// Shared-handle audio graph implementation.
///
/// Clones alias the same engine, so one handle can live in every voice
/// while another drives the audio callback.
#[derive(Clone)]
pub struct GraphEngine {
    shared: Arc<Mutex<EngineState>>,
}

struct EngineState {
    sample_rate: f64,
    /// Frames rendered so far; `current_time = frame / sample_rate`.
    frame: u64,
    generators: Vec<GeneratorState>,
    gains: Vec<GainState>,
    /// Single-shot misuses rejected at the node boundary.
    violations: u32,
}

struct GeneratorState {
    waveform: Waveform,
    frequency: f32,
    phase: f32,
    started_at: Option<f64>,
    stopped_at: Option<f64>,
}

impl GeneratorState {
    fn new() -> Self {
        Self {
            waveform: Waveform::Sine,
            frequency: 440.0,
            phase: 0.0,
            started_at: None,
            stopped_at: None,
        }
    }

    fn audible_at(&self, t: f64) -> bool {
        match self.started_at {
            Some(start) if t >= start => self.stopped_at.map_or(true, |stop| t < stop),
            _ => false,
        }
    }

    /// Produce one sample and advance the phase accumulator.
    fn advance(&mut self, t: f64, sample_rate: f64) -> f32 {
        if !self.audible_at(t) {
            return 0.0;
        }
        let sample = waveform_sample(self.waveform, self.phase);
        self.phase = (self.phase + self.frequency / sample_rate as f32).fract();
        sample
    }
}

struct GainState {
    timeline: Timeline,
    /// Generator indices feeding this gain.
    sources: Vec<usize>,
    to_destination: bool,
}

/// Read-only view of one generator's settings and schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorSnapshot {
    pub waveform: Waveform,
    pub frequency: f32,
    pub started_at: Option<f64>,
    pub stopped_at: Option<f64>,
}

impl GeneratorSnapshot {
    /// `(started_at, stopped_at)` in one tuple, for terse assertions.
    pub fn schedule(&self) -> (Option<f64>, Option<f64>) {
        (self.started_at, self.stopped_at)
    }
}

impl GraphEngine {
    pub fn new(sample_rate: f64) -> Self {
        Self {
            shared: Arc::new(Mutex::new(EngineState {
                sample_rate,
                frame: 0,
                generators: Vec::new(),
                gains: Vec::new(),
                violations: 0,
            })),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.shared.lock().unwrap().sample_rate
    }

    /// Render the next `out.len()` mono frames, advancing the clock.
    ///
    /// Every gain wired to the destination contributes the sum of its
    /// source generators multiplied by its automated gain value.
    pub fn render(&self, out: &mut [f32]) {
        let mut locked = self.shared.lock().unwrap();
        let EngineState {
            sample_rate,
            frame,
            generators,
            gains,
            ..
        } = &mut *locked;
        let sample_rate = *sample_rate;

        for sample_out in out.iter_mut() {
            let t = *frame as f64 / sample_rate;
            let mut mixed = 0.0;

            for gain in gains.iter() {
                if !gain.to_destination {
                    continue;
                }
                let mut signal = 0.0;
                for &source in &gain.sources {
                    signal += generators[source].advance(t, sample_rate);
                }
                mixed += gain.timeline.value_at(t) * signal;
            }

            *sample_out = mixed;
            *frame += 1;
        }
    }

    /// Number of generator nodes ever created.
    pub fn generator_count(&self) -> usize {
        self.shared.lock().unwrap().generators.len()
    }

    /// Number of gain nodes ever created.
    pub fn gain_count(&self) -> usize {
        self.shared.lock().unwrap().gains.len()
    }

    /// Single-shot contract violations (double start, stop without start)
    /// rejected so far. A correct caller keeps this at zero.
    pub fn contract_violations(&self) -> u32 {
        self.shared.lock().unwrap().violations
    }

    /// Snapshots of every generator ever created, in creation order.
    pub fn generator_snapshots(&self) -> Vec<GeneratorSnapshot> {
        self.shared
            .lock()
            .unwrap()
            .generators
            .iter()
            .map(|g| GeneratorSnapshot {
                waveform: g.waveform,
                frequency: g.frequency,
                started_at: g.started_at,
                stopped_at: g.stopped_at,
            })
            .collect()
    }
}

impl AudioGraph for GraphEngine {
    type Generator = EngineGenerator;
    type Gain = EngineGain;

    fn current_time(&self) -> f64 {
        let state = self.shared.lock().unwrap();
        state.frame as f64 / state.sample_rate
    }

    fn create_generator(&self) -> EngineGenerator {
        let mut state = self.shared.lock().unwrap();
        state.generators.push(GeneratorState::new());
        EngineGenerator {
            shared: Arc::clone(&self.shared),
            id: state.generators.len() - 1,
        }
    }

    fn create_gain(&self) -> EngineGain {
        let mut state = self.shared.lock().unwrap();
        state.gains.push(GainState {
            // Gain defaults to unity, like a freshly created gain node.
            timeline: Timeline::new(1.0),
            sources: Vec::new(),
            to_destination: false,
        });
        let id = state.gains.len() - 1;
        EngineGain {
            id,
            param: EngineParam {
                shared: Arc::clone(&self.shared),
                gain_id: id,
            },
        }
    }

    fn connect(&self, source: &EngineGenerator, dest: &EngineGain) {
        let mut state = self.shared.lock().unwrap();
        let sources = &mut state.gains[dest.id].sources;
        if !sources.contains(&source.id) {
            sources.push(source.id);
        }
    }

    fn connect_to_destination(&self, source: &EngineGain) {
        self.shared.lock().unwrap().gains[source.id].to_destination = true;
    }
}

/// Handle to one single-shot generator node.
pub struct EngineGenerator {
    shared: Arc<Mutex<EngineState>>,
    id: usize,
}

impl GeneratorNode for EngineGenerator {
    fn set_waveform(&mut self, waveform: Waveform) {
        self.shared.lock().unwrap().generators[self.id].waveform = waveform;
    }

    fn set_frequency(&mut self, hz: f32) {
        self.shared.lock().unwrap().generators[self.id].frequency = hz;
    }

    fn start(&mut self, at: f64) {
        let mut state = self.shared.lock().unwrap();
        let generator = &mut state.generators[self.id];
        if generator.started_at.is_some() {
            state.violations += 1;
            return;
        }
        generator.started_at = Some(at);
    }

    fn stop(&mut self, at: f64) {
        let mut state = self.shared.lock().unwrap();
        let generator = &mut state.generators[self.id];
        if generator.started_at.is_none() || generator.stopped_at.is_some() {
            state.violations += 1;
            return;
        }
        generator.stopped_at = Some(at);
    }
}

/// Handle to one persistent gain node.
pub struct EngineGain {
    id: usize,
    param: EngineParam,
}

impl EngineGain {
    /// Stable node identity, for asserting output-port invariance.
    pub fn node_id(&self) -> usize {
        self.id
    }
}

impl GainNode for EngineGain {
    type Param = EngineParam;

    fn gain(&self) -> &EngineParam {
        &self.param
    }
}

/// Automation handle on a gain node's control value.
#[derive(Clone)]
pub struct EngineParam {
    shared: Arc<Mutex<EngineState>>,
    gain_id: usize,
}

impl EngineParam {
    /// The pending schedule, in execution order.
    pub fn scheduled(&self) -> Vec<AutomationEvent> {
        self.timeline(|t| t.events().to_vec())
    }

    /// Evaluate the automated value at time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        self.timeline(|timeline| timeline.value_at(t))
    }

    fn timeline<R>(&self, f: impl FnOnce(&Timeline) -> R) -> R {
        f(&self.shared.lock().unwrap().gains[self.gain_id].timeline)
    }
}

impl AudioParam for EngineParam {
    fn set_value_at_time(&self, value: f32, at: f64) {
        self.shared.lock().unwrap().gains[self.gain_id]
            .timeline
            .set_value_at(value, at);
    }

    fn linear_ramp_to_value_at_time(&self, value: f32, at: f64) {
        self.shared.lock().unwrap().gains[self.gain_id]
            .timeline
            .ramp_to_at(value, at);
    }

    fn cancel_scheduled_values(&self, from: f64) {
        self.shared.lock().unwrap().gains[self.gain_id]
            .timeline
            .cancel_from(from);
    }
}

fn waveform_sample(waveform: Waveform, phase: f32) -> f32 {
    match waveform {
        Waveform::Sine => (std::f32::consts::TAU * phase).sin(),
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => {
            let shifted = (phase + 0.75).fract();
            4.0 * (shifted - 0.5).abs() - 1.0
        }
        Waveform::Sawtooth => 2.0 * phase - 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 1_000.0;

    fn audible_generator(engine: &GraphEngine, gain: &EngineGain, hz: f32) -> EngineGenerator {
        let mut generator = engine.create_generator();
        generator.set_frequency(hz);
        engine.connect(&generator, gain);
        engine.connect_to_destination(gain);
        generator
    }

    #[test]
    fn clock_advances_one_frame_per_rendered_sample() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        assert_eq!(engine.current_time(), 0.0);

        let mut block = vec![0.0; 250];
        engine.render(&mut block);

        assert_eq!(engine.current_time(), 0.25);
    }

    #[test]
    fn unstarted_generator_renders_silence() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let gain = engine.create_gain();
        let _generator = audible_generator(&engine, &gain, 100.0);

        let mut block = vec![0.0; 128];
        engine.render(&mut block);

        assert!(block.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn generator_is_audible_only_inside_its_schedule() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let gain = engine.create_gain();
        let mut generator = audible_generator(&engine, &gain, 100.0);
        generator.start(0.1);
        generator.stop(0.3);

        let mut block = vec![0.0; 500];
        engine.render(&mut block);

        assert!(block[..100].iter().all(|s| *s == 0.0), "silent before start");
        assert!(
            block[110..290].iter().any(|s| s.abs() > 0.1),
            "audible between start and stop"
        );
        assert!(block[300..].iter().all(|s| *s == 0.0), "silent after stop");
    }

    #[test]
    fn sine_output_matches_the_phase_formula() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let gain = engine.create_gain();
        let mut generator = audible_generator(&engine, &gain, 50.0);
        generator.start(0.0);

        let mut block = vec![0.0; 64];
        engine.render(&mut block);

        let n = 7;
        let expected = (std::f32::consts::TAU * 50.0 * n as f32 / SAMPLE_RATE as f32).sin();
        assert!(
            (block[n] - expected).abs() < 1e-5,
            "expected {expected}, got {}",
            block[n]
        );
    }

    #[test]
    fn gain_automation_scales_the_signal() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let gain = engine.create_gain();
        // 125 Hz over a 1 kHz clock lands the phase exactly on 0.25, so
        // the sampled sine reaches its true peak.
        let mut generator = audible_generator(&engine, &gain, 125.0);
        generator.start(0.0);
        gain.gain().set_value_at_time(0.0, 0.0);
        gain.gain().set_value_at_time(0.25, 0.2);

        let mut block = vec![0.0; 400];
        engine.render(&mut block);

        assert!(block[..200].iter().all(|s| *s == 0.0), "muted while gain is 0");
        let peak = block[200..].iter().fold(0.0_f32, |acc, s| acc.max(s.abs()));
        assert!((peak - 0.25).abs() < 0.01, "peak {peak} should sit at the gain value");
    }

    #[test]
    fn single_shot_misuse_is_rejected_and_counted() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let mut first = engine.create_generator();
        first.start(0.0);
        first.start(1.0);
        assert_eq!(engine.contract_violations(), 1, "double start");

        let mut second = engine.create_generator();
        second.stop(1.0);
        assert_eq!(engine.contract_violations(), 2, "stop before start");

        first.stop(2.0);
        first.stop(3.0);
        assert_eq!(engine.contract_violations(), 3, "double stop");

        let snapshots = engine.generator_snapshots();
        assert_eq!(snapshots[0].schedule(), (Some(0.0), Some(2.0)));
        assert_eq!(snapshots[1].schedule(), (None, None));
    }

    #[test]
    fn waveform_samples_cover_the_expected_extremes() {
        assert_eq!(waveform_sample(Waveform::Square, 0.25), 1.0);
        assert_eq!(waveform_sample(Waveform::Square, 0.75), -1.0);
        assert_eq!(waveform_sample(Waveform::Sawtooth, 0.0), -1.0);
        assert_eq!(waveform_sample(Waveform::Sawtooth, 0.5), 0.0);
        assert!((waveform_sample(Waveform::Triangle, 0.25) - 1.0).abs() < 1e-6);
        assert!(waveform_sample(Waveform::Triangle, 0.5).abs() < 1e-6);
        assert!((waveform_sample(Waveform::Triangle, 0.75) + 1.0).abs() < 1e-6);
        assert!(waveform_sample(Waveform::Sine, 0.0).abs() < 1e-6);
    }
}
