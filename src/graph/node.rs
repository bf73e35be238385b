#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
The Audio Graph Contract
========================

Everything in this crate schedules against a shared audio graph that exposes:

  - node factories: one-shot signal generators and persistent gain nodes
  - a connection primitive wiring a generator's output into a gain node
  - a monotonic clock (`current_time`) shared by every node
  - timestamped automation on control values: set, linear ramp, cancel
  - start/stop scheduling on generators

Two rules of that contract shape the whole crate:

  1. Generator nodes are single-shot. `start` may be called once, `stop`
     once after that. A stopped generator can never be restarted - it can
     only be thrown away and replaced. `voice::GeneratorLifecycle` exists
     to hide exactly this.

  2. Automation events on one control value execute in timestamp order no
     matter what order they were scheduled in, and `cancel_scheduled_values`
     removes every not-yet-executed event at or after a timestamp. This is
     what makes "cancel and reschedule" a safe retrigger primitive: the
     last caller wins from its timestamp forward.

Timestamps are seconds on the shared clock. Scheduling in the past or with
non-finite times is the graph implementation's problem, not validated here.
*/

/// Waveform shapes a generator node can produce.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

impl Waveform {
    /// Cycle to the next waveform (sine → square → triangle → sawtooth → sine).
    pub fn next(self) -> Self {
        match self {
            Waveform::Sine => Waveform::Square,
            Waveform::Square => Waveform::Triangle,
            Waveform::Triangle => Waveform::Sawtooth,
            Waveform::Sawtooth => Waveform::Sine,
        }
    }

    /// Human-readable name, for UI labels.
    pub fn label(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
        }
    }
}

/// A control value supporting timestamped automation.
///
/// Events at distinct timestamps execute in timestamp order regardless of
/// scheduling order. Methods take `&self`: implementations hand out cheap
/// handles into shared graph state.
pub trait AudioParam {
    /// Jump to `value` at time `at` and hold it.
    fn set_value_at_time(&self, value: f32, at: f64);

    /// Ramp linearly from the previous event's landing point to `value`,
    /// arriving exactly at time `at`.
    fn linear_ramp_to_value_at_time(&self, value: f32, at: f64);

    /// Remove every scheduled event with timestamp at or after `from`.
    fn cancel_scheduled_values(&self, from: f64);
}

/// A one-shot signal source.
///
/// `start` may be called at most once per node, `stop` at most once after
/// that. Violating this is a contract violation against the host graph,
/// never silently absorbed here.
pub trait GeneratorNode {
    fn set_waveform(&mut self, waveform: Waveform);
    fn set_frequency(&mut self, hz: f32);

    /// Schedule the node to begin producing signal at time `at`.
    fn start(&mut self, at: f64);

    /// Schedule the node to go silent at time `at`. The node keeps running
    /// until then; the stop is scheduled, not immediate.
    fn stop(&mut self, at: f64);
}

/// A persistent node multiplying its input by an automatable gain value.
pub trait GainNode {
    type Param: AudioParam;

    /// The gain control value.
    fn gain(&self) -> &Self::Param;
}

/// Handle to the shared audio graph.
///
/// Clones are cheap aliases of the same graph, so a handle can be stored in
/// every voice without threading lifetimes through the call tree.
pub trait AudioGraph: Clone {
    type Generator: GeneratorNode;
    type Gain: GainNode;

    /// The monotonic scheduling clock, in seconds.
    fn current_time(&self) -> f64;

    fn create_generator(&self) -> Self::Generator;
    fn create_gain(&self) -> Self::Gain;

    /// Wire a generator's output into a gain node's input.
    fn connect(&self, source: &Self::Generator, dest: &Self::Gain);

    /// Wire a gain node's output into the graph's final destination.
    fn connect_to_destination(&self, source: &Self::Gain);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waveform_cycle_visits_all_shapes() {
        let mut wave = Waveform::Sine;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(wave);
            wave = wave.next();
        }
        assert_eq!(wave, Waveform::Sine, "cycle should wrap around");
        seen.dedup();
        assert_eq!(seen.len(), 4, "cycle should visit each shape once");
    }
}
