#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Automation Timeline
===================

One control value, one ordered list of scheduled events. The timeline is
the piece that turns "enqueue ramps now, hear them later" into a value the
renderer can evaluate at any sample time.

Evaluation rules:

  SetValue(v) @ t        the value jumps to v at t and holds
  LinearRampTo(v) @ t    the value moves in a straight line from the
                         previous event's landing point to v, arriving
                         exactly at t, then holds

Before the first event the value is the timeline's initial value. A ramp
with no event before it interpolates from the initial value anchored at
time zero.

Insertion keeps events sorted by timestamp; events sharing a timestamp keep
their scheduling order. Cancellation removes everything at or after a
timestamp, which gives retriggering its "last caller wins from here" shape.
*/

/// What a scheduled event does when its timestamp is reached.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutomationKind {
    /// Jump to the value and hold.
    SetValue(f32),
    /// Arrive at the value via a linear ramp from the previous event.
    LinearRampTo(f32),
}

impl AutomationKind {
    /// The value this event lands on at its timestamp.
    pub fn target(self) -> f32 {
        match self {
            AutomationKind::SetValue(v) | AutomationKind::LinearRampTo(v) => v,
        }
    }
}

/// A single scheduled automation event.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutomationEvent {
    /// Timestamp in seconds on the graph clock.
    pub time: f64,
    pub kind: AutomationKind,
}

/// Ordered automation schedule for one control value.
#[derive(Debug, Clone)]
pub struct Timeline {
    initial: f32,
    events: Vec<AutomationEvent>,
}

impl Timeline {
    pub fn new(initial: f32) -> Self {
        Self {
            initial,
            events: Vec::new(),
        }
    }

    /// Schedule a jump to `value` at time `at`.
    pub fn set_value_at(&mut self, value: f32, at: f64) {
        self.insert(AutomationEvent {
            time: at,
            kind: AutomationKind::SetValue(value),
        });
    }

    /// Schedule a linear ramp landing on `value` at time `at`.
    pub fn ramp_to_at(&mut self, value: f32, at: f64) {
        self.insert(AutomationEvent {
            time: at,
            kind: AutomationKind::LinearRampTo(value),
        });
    }

    /// Remove every event with timestamp at or after `from`.
    pub fn cancel_from(&mut self, from: f64) {
        self.events.retain(|event| event.time < from);
    }

    /// The scheduled events, in execution order.
    pub fn events(&self) -> &[AutomationEvent] {
        &self.events
    }

    /// Evaluate the control value at time `t`.
    pub fn value_at(&self, t: f64) -> f32 {
        let mut value = self.initial;
        let mut anchor = 0.0_f64;

        for event in &self.events {
            if event.time <= t {
                value = event.kind.target();
                anchor = event.time;
                continue;
            }
            if let AutomationKind::LinearRampTo(target) = event.kind {
                if event.time > anchor {
                    let frac = ((t - anchor) / (event.time - anchor)) as f32;
                    value += (target - value) * frac.clamp(0.0, 1.0);
                } else {
                    value = target;
                }
            }
            break;
        }

        value
    }

    // Stable on equal timestamps: new events go after existing ones.
    fn insert(&mut self, event: AutomationEvent) {
        let index = self.events.partition_point(|e| e.time <= event.time);
        self.events.insert(index, event);
    }
}
