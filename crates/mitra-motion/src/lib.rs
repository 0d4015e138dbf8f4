//! Scroll-synchronized animation timelines for the EcoMitra pitch pages.
//!
//! This crate provides:
//! - **Tweens and Timelines**: property changes sharing one seekable cursor
//! - **Easing Functions**: CSS curves, power curves and back overshoot
//! - **Scroll Bindings**: fixed or element-anchored ranges, scrubbed or
//!   trigger-played, optionally pinned
//! - **Motion Events**: trigger, playback and pin notifications
//!
//! # Architecture
//!
//! ```text
//! ScrollTimelineEngine
//!   ├── Timelines (tweens + progress cursor)
//!   ├── Bindings (scroll range, scrub state, trigger, callbacks)
//!   ├── PinCoordinator (reserved scroll distance per pinned element)
//!   └── EventQueue
//!
//! Renderer / Scroller / ViewportObserver
//!   └── Host collaborators; `headless` has in-memory versions
//! ```

pub mod easing;
pub mod engine;
pub mod error;
pub mod events;
pub mod headless;
pub mod host;
pub mod interpolate;
pub mod pin;
pub mod scroll;
pub mod timeline;
pub mod trigger;
pub mod tween;
pub mod types;

pub use easing::{EaseMode, EasingFunction};
pub use engine::{BindOptions, EdgeCallback, ProgressCallback, ScrollTimelineEngine};
pub use error::{MotionError, RenderError, Result};
pub use events::{EventQueue, MotionEvent};
pub use headless::{HeadlessScene, ManualObserver, ManualScroller};
pub use host::{IntersectionEvent, ObserverToken, Renderer, Scroller, ViewportObserver};
pub use interpolate::Interpolate;
pub use pin::{PinCoordinator, PinRegion};
pub use scroll::{Anchor, Edge, RangeEnd, ResolvedRange, ScrollRange, ScrubState};
pub use timeline::{PlaybackEdge, Timeline, TimelineConfig};
pub use trigger::{ToggleAction, ToggleActions, Trigger, TriggerState, TriggerTransition};
pub use tween::{ScheduledTween, Tween};
pub use types::{
    AnimatableTransform, AnimatableValue, BindingHandle, Handle, PlayDirection, PlaybackState,
    PropertyPath, Rect, ScrollDirection, Size, TargetId, TimelineHandle,
};

pub use mitra_config::MotionConfig;

/// Everything a page module needs to author motion.
pub mod prelude {
    pub use crate::easing::{EaseMode, EasingFunction};
    pub use crate::engine::{BindOptions, ScrollTimelineEngine};
    pub use crate::error::{MotionError, Result};
    pub use crate::events::MotionEvent;
    pub use crate::host::{IntersectionEvent, Renderer, Scroller, ViewportObserver};
    pub use crate::scroll::ScrollRange;
    pub use crate::timeline::TimelineConfig;
    pub use crate::trigger::ToggleActions;
    pub use crate::tween::Tween;
    pub use crate::types::{
        AnimatableTransform, AnimatableValue, BindingHandle, PlayDirection, Rect,
        ScrollDirection, Size, TargetId, TimelineHandle,
    };
    pub use mitra_config::MotionConfig;
}
