use crate::graph::{AudioGraph, AudioParam, GainNode, Waveform};
use crate::voice::lifecycle::GeneratorLifecycle;

/// A gated voice: the same disposable-generator pattern as
/// [`EnvelopeVoice`], without the envelope.
///
/// `start` snaps the gain to 1, `stop` snaps it to 0, and the generator is
/// replaced on every start following a stop. Useful when the signal should
/// simply be on or off - a test tone, a drone, a metronome tick source.
///
/// [`EnvelopeVoice`]: crate::voice::EnvelopeVoice
pub struct GateVoice<G: AudioGraph> {
    lifecycle: GeneratorLifecycle<G>,
    output: G::Gain,
}

impl<G: AudioGraph> GateVoice<G> {
    pub fn new(graph: &G) -> Self {
        Self {
            lifecycle: GeneratorLifecycle::new(graph.clone()),
            output: graph.create_gain(),
        }
    }

    /// The voice's stable output port.
    pub fn output(&self) -> &G::Gain {
        &self.output
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.lifecycle.set_waveform(waveform);
    }

    pub fn waveform(&self) -> Waveform {
        self.lifecycle.waveform()
    }

    pub fn set_frequency(&mut self, hz: f32) {
        self.lifecycle.set_frequency(hz);
    }

    pub fn frequency(&self) -> f32 {
        self.lifecycle.frequency()
    }

    /// Open the gate at time `at`: ensure a live generator, start it, and
    /// snap the gain to 1.
    pub fn start(&mut self, at: f64) {
        self.lifecycle.ensure_live(&self.output);
        self.lifecycle.start(at);
        self.output.gain().set_value_at_time(1.0, at);
    }

    /// Close the gate at time `at`: snap the gain to 0 and schedule the
    /// generator stop. No-op when no generator was ever created.
    pub fn stop(&mut self, at: f64) {
        if !self.lifecycle.has_generator() {
            return;
        }
        self.lifecycle.stop(at);
        self.output.gain().set_value_at_time(0.0, at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::automation::AutomationKind;
    use crate::engine::GraphEngine;

    const SAMPLE_RATE: f64 = 48_000.0;

    #[test]
    fn start_opens_the_gate_and_starts_the_generator() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let mut voice = GateVoice::new(&engine);
        voice.set_frequency(100.0);

        voice.start(0.25);

        let events = voice.output().gain().scheduled();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time, 0.25);
        assert_eq!(events[0].kind, AutomationKind::SetValue(1.0));

        let (started, stopped) = engine.generator_snapshots()[0].schedule();
        assert_eq!(started, Some(0.25));
        assert_eq!(stopped, None);
    }

    #[test]
    fn stop_closes_the_gate_in_sync_with_the_generator() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let mut voice = GateVoice::new(&engine);

        voice.start(0.0);
        voice.stop(2.0);

        let events = voice.output().gain().scheduled();
        assert_eq!(events.last().unwrap().kind, AutomationKind::SetValue(0.0));
        assert_eq!(events.last().unwrap().time, 2.0);

        let (_, stopped) = engine.generator_snapshots()[0].schedule();
        assert_eq!(stopped, Some(2.0));
    }

    #[test]
    fn stop_without_start_is_a_no_op() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let mut voice: GateVoice<GraphEngine> = GateVoice::new(&engine);

        voice.stop(1.0);

        assert_eq!(engine.generator_count(), 0);
        assert!(voice.output().gain().scheduled().is_empty());
    }

    #[test]
    fn restart_after_stop_replaces_the_generator() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let mut voice = GateVoice::new(&engine);

        voice.start(0.0);
        voice.stop(1.0);
        voice.start(2.0);

        assert_eq!(engine.generator_count(), 2);
        assert_eq!(engine.contract_violations(), 0);
        let snapshots = engine.generator_snapshots();
        assert_eq!(snapshots[0].schedule(), (Some(0.0), Some(1.0)));
        assert_eq!(snapshots[1].schedule(), (Some(2.0), None));
    }
}
