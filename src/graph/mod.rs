//! The audio-graph service the voices are built against.
//!
//! Voices never talk to a concrete audio backend. They are handed a graph
//! handle at construction (dependency injection, not ambient globals) and
//! speak to it through the traits in `node`: node factories, wiring, a
//! shared scheduling clock, and timestamped parameter automation.

/// Core traits and the generator waveform type.
pub mod node;

pub use node::{AudioGraph, AudioParam, GainNode, GeneratorNode, Waveform};
