//! Contracts the engine consumes from the page layer.
//!
//! The engine never touches pixels, layout or the scroll position directly.
//! A host supplies three collaborators:
//!
//! ```text
//!   Scroller ──offset/viewport──► ScrollTimelineEngine ──set_property──► Renderer
//!                                        ▲                 apply_fixed_placement
//!   ViewportObserver ──ratio/direction───┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::types::{AnimatableValue, PropertyPath, Rect, ScrollDirection, Size, TargetId};

/// Mutable visual properties of DOM nodes or scene-graph objects.
pub trait Renderer {
    /// Write one property of a target.
    fn set_property(
        &mut self,
        target: &TargetId,
        path: &PropertyPath,
        value: &AnimatableValue,
    ) -> Result<(), RenderError>;

    /// Read the current value of a property.
    fn get_property(
        &self,
        target: &TargetId,
        path: &PropertyPath,
    ) -> Result<AnimatableValue, RenderError>;

    /// Hold a target at a fixed viewport rectangle, or return it to normal
    /// document flow when `placement` is `None`.
    fn apply_fixed_placement(
        &mut self,
        target: &TargetId,
        placement: Option<Rect>,
    ) -> Result<(), RenderError>;

    /// Document-space layout box of a target.
    fn measure(&self, target: &TargetId) -> Result<Rect, RenderError>;
}

/// Token identifying one observation registered with a `ViewportObserver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObserverToken(pub u64);

/// Visibility change reported for an observed element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IntersectionEvent {
    /// Fraction of the element inside the viewport, `0.0..=1.0`.
    pub ratio: f64,
    /// Scroll direction at the time of the change.
    pub direction: ScrollDirection,
}

impl IntersectionEvent {
    pub fn new(ratio: f64, direction: ScrollDirection) -> Self {
        Self { ratio, direction }
    }
}

/// Reports element visibility transitions.
///
/// Events for a token are delivered by the host through
/// `ScrollTimelineEngine::on_intersection`.
pub trait ViewportObserver {
    /// Start observing `target`, reporting crossings of `threshold`.
    fn observe(&mut self, target: &TargetId, threshold: f64) -> ObserverToken;

    /// Stop observing. Unknown tokens are ignored.
    fn unobserve(&mut self, token: ObserverToken);
}

/// Source of the scroll offset and viewport size.
pub trait Scroller {
    /// Current vertical scroll offset in CSS pixels.
    fn current_offset(&self) -> f64;

    /// Current viewport size.
    fn viewport(&self) -> Size;
}
