//! Core motion types and data structures.
//!
//! This module defines the fundamental types shared by the engine:
//! - `TimelineHandle` / `BindingHandle`: Handles returned to the page layer
//! - `TargetId` / `PropertyPath`: Non-owning references to render targets
//! - `AnimatableValue`: Enum for all animatable property values
//! - `Rect` / `Size`: Layout geometry reported by the renderer and scroller

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a timeline owned by a `ScrollTimelineEngine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimelineHandle(pub u64);

/// Handle to a scroll binding owned by a `ScrollTimelineEngine`.
///
/// Handles are allocated in increasing order, so ordering by handle is
/// registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BindingHandle(pub u64);

/// Either kind of handle, accepted by `destroy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Handle {
    Timeline(TimelineHandle),
    Binding(BindingHandle),
}

impl From<TimelineHandle> for Handle {
    fn from(handle: TimelineHandle) -> Self {
        Self::Timeline(handle)
    }
}

impl From<BindingHandle> for Handle {
    fn from(handle: BindingHandle) -> Self {
        Self::Binding(handle)
    }
}

/// Non-owning reference to a render target (a DOM node or scene-graph object).
///
/// The page layer creates and destroys targets; the engine only names them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub String);

impl TargetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TargetId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for TargetId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Dotted path to a property on a render target, e.g. `opacity`,
/// `rotation.y` or `material.u_hover`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyPath(pub String);

impl PropertyPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the dot-separated segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    pub fn opacity() -> Self {
        Self::new("opacity")
    }

    pub fn transform() -> Self {
        Self::new("transform")
    }

    pub fn position() -> Self {
        Self::new("position")
    }

    pub fn rotation() -> Self {
        Self::new("rotation")
    }

    pub fn scale() -> Self {
        Self::new("scale")
    }
}

impl From<&str> for PropertyPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Axis-aligned rectangle in CSS pixels.
///
/// Rectangles returned by `Renderer::measure` are in document space: `y` is
/// the distance from the top of the document, independent of scroll.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Viewport or content size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Direction of the most recent scroll movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    /// Scrolling down the page (offset increasing).
    #[default]
    Forward,
    /// Scrolling back up the page (offset decreasing).
    Backward,
}

/// Playback direction of a wall-clock driven timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayDirection {
    #[default]
    Forward,
    Reverse,
}

impl PlayDirection {
    pub fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Reverse => -1.0,
        }
    }
}

/// Current playback state of a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Not advancing with wall-clock time.
    #[default]
    Paused,
    /// Advancing on every frame tick.
    Playing,
    /// Reached a bound while playing and stopped.
    Finished,
}

/// 2D transform for position, scale, and rotation animation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimatableTransform {
    pub translate_x: f64,
    pub translate_y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// Rotation in radians.
    pub rotate: f64,
}

impl Default for AnimatableTransform {
    fn default() -> Self {
        Self {
            translate_x: 0.0,
            translate_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            rotate: 0.0,
        }
    }
}

impl AnimatableTransform {
    pub fn translate(x: f64, y: f64) -> Self {
        Self {
            translate_x: x,
            translate_y: y,
            ..Self::default()
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale_x = scale;
        self.scale_y = scale;
        self
    }
}

/// Enum representing all animatable value types.
///
/// This enum wraps the different types of values that can be animated,
/// allowing timelines to handle them uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimatableValue {
    /// Numeric value (opacity, progress-bar scale, shader uniform, ...)
    F64 { value: f64 },
    /// 2D vector.
    Vec2 { value: [f64; 2] },
    /// 3D vector (scene object position, rotation or scale).
    Vec3 { value: [f64; 3] },
    /// RGBA color value in linear premultiplied space.
    Color { rgba: [f32; 4] },
    /// 2D transform (translate, scale, rotate).
    Transform {
        #[serde(flatten)]
        transform: AnimatableTransform,
    },
}

impl AnimatableValue {
    pub fn f64(value: f64) -> Self {
        Self::F64 { value }
    }

    pub fn vec3(x: f64, y: f64, z: f64) -> Self {
        Self::Vec3 { value: [x, y, z] }
    }

    /// Uniform 3D vector, handy for scale.
    pub fn splat3(v: f64) -> Self {
        Self::Vec3 { value: [v, v, v] }
    }

    /// Try to extract an f64 value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64 { value } => Some(*value),
            _ => None,
        }
    }

    /// Try to extract a 3D vector.
    pub fn as_vec3(&self) -> Option<[f64; 3]> {
        match self {
            Self::Vec3 { value } => Some(*value),
            _ => None,
        }
    }

    /// Try to extract a transform.
    pub fn as_transform(&self) -> Option<AnimatableTransform> {
        match self {
            Self::Transform { transform } => Some(*transform),
            _ => None,
        }
    }

    /// Name of the variant, used in mismatch diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::F64 { .. } => "f64",
            Self::Vec2 { .. } => "vec2",
            Self::Vec3 { .. } => "vec3",
            Self::Color { .. } => "color",
            Self::Transform { .. } => "transform",
        }
    }

    /// Whether two values can be interpolated with each other.
    pub fn same_kind(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_ordering_is_registration_order() {
        let mut handles = vec![BindingHandle(3), BindingHandle(1), BindingHandle(2)];
        handles.sort();
        assert_eq!(handles, vec![BindingHandle(1), BindingHandle(2), BindingHandle(3)]);
    }

    #[test]
    fn test_property_path_segments() {
        let path = PropertyPath::new("material.u_hover");
        assert_eq!(path.segments().collect::<Vec<_>>(), vec!["material", "u_hover"]);
        assert_eq!(PropertyPath::opacity().as_str(), "opacity");
    }

    #[test]
    fn test_value_kinds() {
        let a = AnimatableValue::f64(1.0);
        let b = AnimatableValue::f64(2.0);
        let c = AnimatableValue::splat3(1.0);
        assert!(a.same_kind(&b));
        assert!(!a.same_kind(&c));
        assert_eq!(c.kind(), "vec3");
        assert_eq!(c.as_vec3(), Some([1.0, 1.0, 1.0]));
        assert_eq!(a.as_vec3(), None);
    }

    #[test]
    fn test_value_serialization() {
        let value = AnimatableValue::Transform {
            transform: AnimatableTransform::translate(-640.0, 0.0),
        };
        let json = serde_json::to_string(&value).unwrap();
        assert!(json.contains("\"type\":\"transform\""));
        assert!(json.contains("translate_x"));
        let parsed: AnimatableValue = serde_json::from_str(&json).unwrap();
        assert_eq!(value, parsed);
    }

    #[test]
    fn test_handle_serialization() {
        let handle = Handle::from(BindingHandle(7));
        let json = serde_json::to_string(&handle).unwrap();
        assert_eq!(json, r#"{"kind":"binding","id":7}"#);
    }

    #[test]
    fn test_rect_bottom() {
        let rect = Rect::new(0.0, 1200.0, 800.0, 600.0);
        assert_eq!(rect.bottom(), 1800.0);
    }
}
