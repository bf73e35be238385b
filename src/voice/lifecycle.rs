use crate::graph::{AudioGraph, GeneratorNode, Waveform};

/*
Generator Lifecycle
===================

Generator nodes are single-shot: once stopped they can never be restarted,
and starting one twice is a contract violation against the host graph. A
voice, on the other hand, is triggered over and over for its whole life.
This module bridges the two by managing an owned slot that always hands the
voice a playable node.

The slot is a tagged state, not a nullable handle plus a boolean, so the
illegal states (restarting a stopped node, stopping a node twice) simply
cannot be expressed:

    Absent ──ensure_live──> Armed ──start──> Running ──stop──> Stopping
      ^                                                           │
      └────────────── ensure_live replaces the node ──────────────┘

  Absent    no node has been created yet
  Armed     a fresh node exists, connected but not started
  Running   the node has been started and not stopped
  Stopping  a stop is scheduled; the node must be replaced before reuse

Waveform and frequency live on the lifecycle, not on the node: the node is
disposable, the settings are not, so they are re-applied to every fresh
node at creation time.
*/

enum GeneratorSlot<N> {
    Absent,
    Armed(N),
    Running(N),
    Stopping(N),
}

/// Owns a generator node slot and guarantees every `start` lands on a
/// live, not-yet-started node.
pub struct GeneratorLifecycle<G: AudioGraph> {
    graph: G,
    slot: GeneratorSlot<G::Generator>,
    waveform: Waveform,
    frequency: f32,
}

impl<G: AudioGraph> GeneratorLifecycle<G> {
    pub fn new(graph: G) -> Self {
        Self {
            graph,
            slot: GeneratorSlot::Absent,
            waveform: Waveform::Sine,
            frequency: 440.0,
        }
    }

    /// Waveform for the current and all future generator nodes.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
        if let GeneratorSlot::Armed(node) | GeneratorSlot::Running(node) = &mut self.slot {
            node.set_waveform(waveform);
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Frequency for the current and all future generator nodes.
    pub fn set_frequency(&mut self, hz: f32) {
        self.frequency = hz;
        if let GeneratorSlot::Armed(node) | GeneratorSlot::Running(node) = &mut self.slot {
            node.set_frequency(hz);
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// True once a generator has been created and not yet replaced.
    ///
    /// Used by voices to turn "trigger-off before any trigger-on" into a
    /// pure no-op.
    pub fn has_generator(&self) -> bool {
        !matches!(self.slot, GeneratorSlot::Absent)
    }

    /// Make sure the slot holds a playable node.
    ///
    /// Creates a fresh generator, re-applies the retained waveform and
    /// frequency, and connects it into `dest` whenever the slot is empty or
    /// holds a stopping node. Idempotent between stops.
    pub fn ensure_live(&mut self, dest: &G::Gain) {
        if matches!(
            self.slot,
            GeneratorSlot::Armed(_) | GeneratorSlot::Running(_)
        ) {
            return;
        }
        let mut node = self.graph.create_generator();
        node.set_waveform(self.waveform);
        node.set_frequency(self.frequency);
        self.graph.connect(&node, dest);
        self.slot = GeneratorSlot::Armed(node);
    }

    /// Start the armed node at time `at`.
    ///
    /// A node that is already running stays running: the second trigger of
    /// an overlapping retrigger reuses the sounding generator and leaves
    /// the audible restart to the gain envelope.
    pub fn start(&mut self, at: f64) {
        match std::mem::replace(&mut self.slot, GeneratorSlot::Absent) {
            GeneratorSlot::Armed(mut node) => {
                node.start(at);
                self.slot = GeneratorSlot::Running(node);
            }
            other => self.slot = other,
        }
    }

    /// Schedule the running node to stop at time `at` and mark the slot
    /// for replacement.
    ///
    /// No-op when nothing was ever started: an armed node is discarded
    /// outright (the host forbids stop-before-start), a stopping node
    /// already has its stop scheduled, an absent slot has nothing to stop.
    pub fn stop(&mut self, at: f64) {
        match std::mem::replace(&mut self.slot, GeneratorSlot::Absent) {
            GeneratorSlot::Running(mut node) => {
                node.stop(at);
                self.slot = GeneratorSlot::Stopping(node);
            }
            GeneratorSlot::Armed(_) => {}
            other => self.slot = other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::GraphEngine;
    use crate::graph::AudioGraph;

    const SAMPLE_RATE: f64 = 48_000.0;

    #[test]
    fn ensure_live_is_idempotent() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let dest = engine.create_gain();
        let mut lifecycle = GeneratorLifecycle::new(engine.clone());

        lifecycle.ensure_live(&dest);
        lifecycle.ensure_live(&dest);
        lifecycle.ensure_live(&dest);

        assert_eq!(engine.generator_count(), 1, "repeated ensure_live must not allocate");
    }

    #[test]
    fn stop_marks_slot_for_replacement() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let dest = engine.create_gain();
        let mut lifecycle = GeneratorLifecycle::new(engine.clone());

        lifecycle.ensure_live(&dest);
        lifecycle.start(0.0);
        lifecycle.stop(1.0);
        lifecycle.ensure_live(&dest);

        assert_eq!(engine.generator_count(), 2, "a stopped node must be replaced");
        assert_eq!(engine.contract_violations(), 0);
    }

    #[test]
    fn stop_without_start_is_a_no_op() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let mut lifecycle: GeneratorLifecycle<GraphEngine> =
            GeneratorLifecycle::new(engine.clone());

        lifecycle.stop(0.5);

        assert_eq!(engine.generator_count(), 0);
        assert_eq!(engine.contract_violations(), 0);
    }

    #[test]
    fn settings_survive_node_replacement() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let dest = engine.create_gain();
        let mut lifecycle = GeneratorLifecycle::new(engine.clone());
        lifecycle.set_waveform(Waveform::Sawtooth);
        lifecycle.set_frequency(110.0);

        lifecycle.ensure_live(&dest);
        lifecycle.start(0.0);
        lifecycle.stop(0.1);
        lifecycle.ensure_live(&dest);

        let replacement = engine.generator_snapshots().pop().unwrap();
        assert_eq!(replacement.waveform, Waveform::Sawtooth);
        assert_eq!(replacement.frequency, 110.0);
    }

    #[test]
    fn start_twice_never_reaches_the_node() {
        let engine = GraphEngine::new(SAMPLE_RATE);
        let dest = engine.create_gain();
        let mut lifecycle = GeneratorLifecycle::new(engine.clone());

        lifecycle.ensure_live(&dest);
        lifecycle.start(0.0);
        lifecycle.ensure_live(&dest);
        lifecycle.start(0.2);

        assert_eq!(engine.generator_count(), 1, "running node must be reused");
        assert_eq!(engine.contract_violations(), 0, "second start must not hit the node");
    }
}
