//! Motion events for lifecycle notifications.
//!
//! Alongside the per-binding callbacks, the engine records what happened in
//! an event queue that the host can poll after each scroll or frame:
//!
//! ```ignore
//! engine.on_scroll()?;
//! engine.frame(1.0 / 60.0)?;
//!
//! for event in engine.drain_events() {
//!     match event {
//!         MotionEvent::TriggerEntered { binding, direction } => { /* ... */ }
//!         MotionEvent::TimelineCompleted { timeline } => { /* ... */ }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! Destroying a binding or timeline purges its pending events, so nothing
//! about a torn-down handle is observed afterwards.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::types::{BindingHandle, ScrollDirection, TimelineHandle};

/// Event emitted by a `ScrollTimelineEngine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MotionEvent {
    /// A binding's trigger entered.
    TriggerEntered {
        binding: BindingHandle,
        timeline: TimelineHandle,
        direction: ScrollDirection,
    },
    /// A binding's trigger left.
    TriggerLeft {
        binding: BindingHandle,
        timeline: TimelineHandle,
        direction: ScrollDirection,
    },
    /// Forward playback reached the end.
    TimelineCompleted { timeline: TimelineHandle },
    /// Reverse playback reached the start.
    TimelineReversed { timeline: TimelineHandle },
    /// A pinned element was fixed in the viewport.
    Pinned { binding: BindingHandle },
    /// A pinned element returned to normal flow.
    Unpinned { binding: BindingHandle },
}

impl MotionEvent {
    /// Binding this event concerns, if any.
    pub fn binding(&self) -> Option<BindingHandle> {
        match self {
            Self::TriggerEntered { binding, .. }
            | Self::TriggerLeft { binding, .. }
            | Self::Pinned { binding }
            | Self::Unpinned { binding } => Some(*binding),
            Self::TimelineCompleted { .. } | Self::TimelineReversed { .. } => None,
        }
    }

    /// Timeline this event concerns, if any.
    pub fn timeline(&self) -> Option<TimelineHandle> {
        match self {
            Self::TriggerEntered { timeline, .. }
            | Self::TriggerLeft { timeline, .. }
            | Self::TimelineCompleted { timeline }
            | Self::TimelineReversed { timeline } => Some(*timeline),
            Self::Pinned { .. } | Self::Unpinned { .. } => None,
        }
    }

    pub fn is_trigger(&self) -> bool {
        matches!(self, Self::TriggerEntered { .. } | Self::TriggerLeft { .. })
    }
}

/// Queue for collecting motion events between polls.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<MotionEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: MotionEvent) {
        self.events.push_back(event);
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn pop(&mut self) -> Option<MotionEvent> {
        self.events.pop_front()
    }

    pub fn peek(&self) -> Option<&MotionEvent> {
        self.events.front()
    }

    /// Drain all events from the queue, returning an iterator.
    pub fn drain(&mut self) -> impl Iterator<Item = MotionEvent> + '_ {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Pending events about `binding`.
    pub fn events_for_binding(&self, binding: BindingHandle) -> Vec<&MotionEvent> {
        self.events
            .iter()
            .filter(|e| e.binding() == Some(binding))
            .collect()
    }

    /// Drop pending events about `binding`.
    pub fn purge_binding(&mut self, binding: BindingHandle) {
        self.events.retain(|e| e.binding() != Some(binding));
    }

    /// Drop pending events about `timeline`.
    pub fn purge_timeline(&mut self, timeline: TimelineHandle) {
        self.events.retain(|e| e.timeline() != Some(timeline));
    }
}
