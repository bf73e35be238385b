use crate::graph::{AudioGraph, AudioParam, GainNode, Waveform};
use crate::voice::lifecycle::GeneratorLifecycle;

/*
Envelope Voice
==============

A voice pairs a disposable generator with one persistent gain node and
shapes the gain with a scheduled ADSR envelope:

  Gain
   1.0 ┐     ╱╲
       │    ╱  ╲___________
   S   │   ╱               ╲
       │  ╱                 ╲
   0.0 └─╱───────────────────╲──→ Time
       Attack Decay  Sustain  Release

The envelope is never driven by timers or callbacks. A trigger computes
every ramp timestamp up front and submits the whole shape as one batch of
automation events; the graph's clock then executes them sample-accurately.
Retriggering works by cancellation: events at or after the new trigger time
are removed before the new shape is installed, so the latest trigger wins
from its timestamp forward.

Phase transitions (attack → decay → sustain) happen purely because the
scheduled ramps land; the voice itself keeps no phase state. The only state
it carries is the generator lifecycle slot.
*/

/// A retriggerable voice applying an ADSR gain envelope to a one-shot
/// generator.
///
/// The gain node is created once and never replaced, so [`output`] can be
/// wired into a larger graph a single time and the voice retriggered
/// indefinitely.
///
/// [`output`]: EnvelopeVoice::output
pub struct EnvelopeVoice<G: AudioGraph> {
    /// Attack duration in seconds. Takes effect on the next trigger-on.
    pub attack: f64,
    /// Decay duration in seconds. Takes effect on the next trigger-on.
    pub decay: f64,
    /// Sustain level in linear gain. Takes effect on the next trigger-on.
    pub sustain: f32,
    /// Release duration in seconds. Takes effect on the next trigger-off.
    pub release: f64,

    lifecycle: GeneratorLifecycle<G>,
    output: G::Gain,
}

impl<G: AudioGraph> EnvelopeVoice<G> {
    /// Create a voice on the given graph.
    ///
    /// Defaults: attack 0.5 s, decay 0.5 s, sustain 0.5, release 1 s.
    pub fn new(graph: &G) -> Self {
        let output = graph.create_gain();
        Self {
            attack: 0.5,
            decay: 0.5,
            sustain: 0.5,
            release: 1.0,
            lifecycle: GeneratorLifecycle::new(graph.clone()),
            output,
        }
    }

    /// The voice's stable output port. Identity never changes, even though
    /// the internal generator is replaced on every retrigger.
    pub fn output(&self) -> &G::Gain {
        &self.output
    }

    /// Waveform for the current and all future generator nodes.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.lifecycle.set_waveform(waveform);
    }

    pub fn waveform(&self) -> Waveform {
        self.lifecycle.waveform()
    }

    /// Frequency for the current and all future generator nodes.
    pub fn set_frequency(&mut self, hz: f32) {
        self.lifecycle.set_frequency(hz);
    }

    pub fn frequency(&self) -> f32 {
        self.lifecycle.frequency()
    }

    /// Begin a note at time `at`.
    ///
    /// Ensures a live generator, discards all gain automation at or after
    /// `at` (a stale release or attack in flight loses from here on), then
    /// schedules the full attack→decay→sustain shape and starts the
    /// generator. Negative durations are treated as zero, sustain is
    /// clamped to [0, 1].
    pub fn trigger_on(&mut self, at: f64) {
        let attack = self.attack.max(0.0);
        let decay = self.decay.max(0.0);
        let sustain = self.sustain.clamp(0.0, 1.0);

        self.lifecycle.ensure_live(&self.output);

        let gain = self.output.gain();
        gain.cancel_scheduled_values(at);
        // Pin the ramp start to zero so the shape is deterministic no
        // matter what value a prior phase left behind.
        gain.set_value_at_time(0.0, at);
        gain.linear_ramp_to_value_at_time(1.0, at + attack);
        gain.linear_ramp_to_value_at_time(sustain, at + attack + decay);

        self.lifecycle.start(at);
    }

    /// Release the note at time `at`.
    ///
    /// Ramps the gain linearly to zero, arriving at `at + release`, and
    /// schedules the generator stop at the ramp's end, not at `at` - the
    /// generator must keep producing signal through the release tail. A
    /// trigger-off before any trigger-on is a complete no-op.
    pub fn trigger_off(&mut self, at: f64) {
        if !self.lifecycle.has_generator() {
            return;
        }
        let release = self.release.max(0.0);
        self.output
            .gain()
            .linear_ramp_to_value_at_time(0.0, at + release);
        self.lifecycle.stop(at + release);
    }
}
