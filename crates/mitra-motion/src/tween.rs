//! Tweens: single property changes placed on a timeline.
//!
//! A `Tween` describes what changes (target, property, endpoints, easing).
//! Where it sits on the timeline is decided by `Timeline::add_tween`, which
//! wraps it in a `ScheduledTween`.
//!
//! Either endpoint may be omitted and is captured when the owning timeline
//! first activates:
//!
//! ```
//! use mitra_motion::tween::Tween;
//! use mitra_motion::types::AnimatableValue;
//!
//! // Animate from wherever the title is now to fully visible.
//! let reveal = Tween::to("intro-title", "opacity", AnimatableValue::f64(1.0));
//!
//! // Start hidden and settle on the authored value.
//! let pop = Tween::from("cta-btn", "scale", AnimatableValue::f64(0.98));
//!
//! // Both ends explicit.
//! let grow = Tween::from_to(
//!     "model",
//!     "scale",
//!     AnimatableValue::splat3(0.9),
//!     AnimatableValue::splat3(1.03),
//! );
//! # let _ = (reveal, pop, grow);
//! ```

use serde::{Deserialize, Serialize};

use crate::easing::EasingFunction;
use crate::interpolate::Interpolate;
use crate::types::{AnimatableValue, PropertyPath, TargetId};

/// A change to one property of one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub target: TargetId,
    pub property: PropertyPath,
    /// Start value; captured at activation when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<AnimatableValue>,
    /// End value; the target's authored value when `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<AnimatableValue>,
    #[serde(default)]
    pub easing: EasingFunction,
}

impl Tween {
    /// Animate from the current value to `to`.
    pub fn to(
        target: impl Into<TargetId>,
        property: impl Into<PropertyPath>,
        to: AnimatableValue,
    ) -> Self {
        Self {
            target: target.into(),
            property: property.into(),
            from: None,
            to: Some(to),
            easing: EasingFunction::default(),
        }
    }

    /// Animate from `from` to the current value.
    pub fn from(
        target: impl Into<TargetId>,
        property: impl Into<PropertyPath>,
        from: AnimatableValue,
    ) -> Self {
        Self {
            target: target.into(),
            property: property.into(),
            from: Some(from),
            to: None,
            easing: EasingFunction::default(),
        }
    }

    /// Animate between two explicit values.
    pub fn from_to(
        target: impl Into<TargetId>,
        property: impl Into<PropertyPath>,
        from: AnimatableValue,
        to: AnimatableValue,
    ) -> Self {
        Self {
            target: target.into(),
            property: property.into(),
            from: Some(from),
            to: Some(to),
            easing: EasingFunction::default(),
        }
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Same tween, aimed at a different target. Used by staggers.
    pub fn retarget(&self, target: TargetId) -> Self {
        Self {
            target,
            ..self.clone()
        }
    }
}

/// A tween placed on a timeline, in timeline time units.
#[derive(Debug, Clone)]
pub struct ScheduledTween {
    pub tween: Tween,
    pub offset: f64,
    pub duration: f64,
    /// Endpoints after lazy capture.
    pub(crate) resolved: Option<(AnimatableValue, AnimatableValue)>,
}

impl ScheduledTween {
    pub(crate) fn new(tween: Tween, offset: f64, duration: f64) -> Self {
        Self {
            tween,
            offset,
            duration,
            resolved: None,
        }
    }

    pub fn end(&self) -> f64 {
        self.offset + self.duration
    }

    /// Local eased factor at timeline time `time`.
    ///
    /// Before the interval this is 0, after it 1.
    pub fn factor_at(&self, time: f64) -> f64 {
        let local = if self.duration <= 0.0 {
            if time >= self.offset { 1.0 } else { 0.0 }
        } else {
            ((time - self.offset) / self.duration).clamp(0.0, 1.0)
        };
        self.tween.easing.evaluate(local)
    }

    /// Value at timeline time `time`, or `None` before endpoints are captured.
    pub fn value_at(&self, time: f64) -> Option<AnimatableValue> {
        let (from, to) = self.resolved.as_ref()?;
        // Boundaries return the stored endpoints so snapped values are exact.
        if time < self.offset {
            return Some(from.clone());
        }
        if time >= self.end() {
            return Some(to.clone());
        }
        Some(from.interpolate(to, self.factor_at(time)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduled(offset: f64, duration: f64) -> ScheduledTween {
        let mut tween = ScheduledTween::new(
            Tween::from_to(
                "hero",
                "opacity",
                AnimatableValue::f64(0.0),
                AnimatableValue::f64(1.0),
            )
            .with_easing(EasingFunction::Linear),
            offset,
            duration,
        );
        tween.resolved = Some((AnimatableValue::f64(0.0), AnimatableValue::f64(1.0)));
        tween
    }

    #[test]
    fn test_builders() {
        let tween = Tween::to("hero", "opacity", AnimatableValue::f64(1.0));
        assert!(tween.from.is_none());
        assert_eq!(tween.to, Some(AnimatableValue::f64(1.0)));
        assert_eq!(tween.target, TargetId::from("hero"));

        let tween = Tween::from("hero", "opacity", AnimatableValue::f64(0.0));
        assert!(tween.to.is_none());
    }

    #[test]
    fn test_value_snaps_outside_interval() {
        let tween = scheduled(1.0, 2.0);
        assert_eq!(tween.value_at(0.0), Some(AnimatableValue::f64(0.0)));
        assert_eq!(tween.value_at(2.0), Some(AnimatableValue::f64(0.5)));
        assert_eq!(tween.value_at(3.5), Some(AnimatableValue::f64(1.0)));
    }

    #[test]
    fn test_zero_duration_is_a_step() {
        let tween = scheduled(1.0, 0.0);
        assert_eq!(tween.value_at(0.99), Some(AnimatableValue::f64(0.0)));
        assert_eq!(tween.value_at(1.0), Some(AnimatableValue::f64(1.0)));
    }

    #[test]
    fn test_unresolved_has_no_value() {
        let tween = ScheduledTween::new(
            Tween::to("hero", "opacity", AnimatableValue::f64(1.0)),
            0.0,
            1.0,
        );
        assert!(tween.value_at(0.5).is_none());
    }

    #[test]
    fn test_retarget_keeps_values() {
        let tween = Tween::to("card-1", "opacity", AnimatableValue::f64(1.0))
            .with_easing(EasingFunction::cubic_out());
        let moved = tween.retarget(TargetId::from("card-2"));
        assert_eq!(moved.target, TargetId::from("card-2"));
        assert_eq!(moved.easing, tween.easing);
        assert_eq!(moved.to, tween.to);
    }

    #[test]
    fn test_serialization_skips_missing_endpoints() {
        let tween = Tween::to("hero", "opacity", AnimatableValue::f64(1.0));
        let json = serde_json::to_string(&tween).unwrap();
        assert!(!json.contains("\"from\""));
        let parsed: Tween = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tween);
    }
}
