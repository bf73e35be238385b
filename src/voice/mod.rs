//! Triggerable voices built on one-shot generator nodes.
//!
//! A generator node can be started once and stopped once, then it is dead.
//! The types here hide that: `GeneratorLifecycle` replaces dead nodes
//! transparently, `EnvelopeVoice` layers a scheduled ADSR gain envelope on
//! top, and `GateVoice` is the minimal start/stop variant. All of them keep
//! one persistent gain node as a stable output port, so a voice is wired
//! into the graph once and retriggered forever.

/// ADSR-enveloped voice with trigger-on/trigger-off semantics.
pub mod envelope;
/// Plain gated voice: start/stop with hard gain gating.
pub mod gate;
/// Create-on-demand, discard-after-stop generator management.
pub mod lifecycle;

pub use envelope::EnvelopeVoice;
pub use gate::GateVoice;
pub use lifecycle::GeneratorLifecycle;
