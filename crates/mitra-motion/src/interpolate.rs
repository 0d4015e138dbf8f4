//! Interpolation for animatable values.
//!
//! This module provides the `Interpolate` trait and implementations for all
//! animatable value types. Color interpolation is done per component in
//! linear premultiplied space.

use crate::types::{AnimatableTransform, AnimatableValue};

/// Trait for types that can be interpolated between two values.
pub trait Interpolate: Sized {
    /// Interpolate between self and another value.
    ///
    /// When t = 0.0, returns self.
    /// When t = 1.0, returns to.
    /// Eased factors may fall outside `[0, 1]`; the result extrapolates.
    fn interpolate(&self, to: &Self, t: f64) -> Self;
}

#[inline]
fn lerp_f64(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[inline]
fn lerp_f32(from: f32, to: f32, t: f64) -> f32 {
    from + (to - from) * t as f32
}

impl Interpolate for f64 {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        lerp_f64(*self, *to, t)
    }
}

impl<const N: usize> Interpolate for [f64; N] {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        std::array::from_fn(|i| lerp_f64(self[i], to[i], t))
    }
}

impl Interpolate for [f32; 4] {
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        [
            lerp_f32(self[0], to[0], t),
            lerp_f32(self[1], to[1], t),
            lerp_f32(self[2], to[2], t),
            lerp_f32(self[3], to[3], t),
        ]
    }
}

impl Interpolate for AnimatableTransform {
    /// Each component (translate, scale, rotate) is interpolated independently.
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        Self {
            translate_x: lerp_f64(self.translate_x, to.translate_x, t),
            translate_y: lerp_f64(self.translate_y, to.translate_y, t),
            scale_x: lerp_f64(self.scale_x, to.scale_x, t),
            scale_y: lerp_f64(self.scale_y, to.scale_y, t),
            rotate: lerp_f64(self.rotate, to.rotate, t),
        }
    }
}

impl Interpolate for AnimatableValue {
    /// Both values must be of the same variant. If they differ, returns self
    /// unchanged; timelines reject mismatched tweens before sampling.
    fn interpolate(&self, to: &Self, t: f64) -> Self {
        match (self, to) {
            (Self::F64 { value: from }, Self::F64 { value: to_val }) => Self::F64 {
                value: from.interpolate(to_val, t),
            },
            (Self::Vec2 { value: from }, Self::Vec2 { value: to_val }) => Self::Vec2 {
                value: from.interpolate(to_val, t),
            },
            (Self::Vec3 { value: from }, Self::Vec3 { value: to_val }) => Self::Vec3 {
                value: from.interpolate(to_val, t),
            },
            (Self::Color { rgba: from }, Self::Color { rgba: to_val }) => Self::Color {
                rgba: from.interpolate(to_val, t),
            },
            (Self::Transform { transform: from }, Self::Transform { transform: to_val }) => {
                Self::Transform {
                    transform: from.interpolate(to_val, t),
                }
            }
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 0.0001;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_f64_interpolation() {
        assert!(approx_eq(0.0_f64.interpolate(&100.0, 0.0), 0.0));
        assert!(approx_eq(0.0_f64.interpolate(&100.0, 0.5), 50.0));
        assert!(approx_eq(0.0_f64.interpolate(&100.0, 1.0), 100.0));
        // Overshoot from back easing extrapolates
        assert!(approx_eq(0.0_f64.interpolate(&100.0, 1.1), 110.0));
    }

    #[test]
    fn test_vec3_interpolation() {
        let from = [0.9, 0.9, 0.9];
        let to = [1.03, 1.03, 1.03];
        let mid = from.interpolate(&to, 0.5);
        for c in mid {
            assert!(approx_eq(c, 0.965));
        }
    }

    #[test]
    fn test_color_interpolation() {
        let from: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
        let to: [f32; 4] = [1.0, 0.5, 0.0, 1.0];
        let mid = from.interpolate(&to, 0.5);
        assert!((mid[0] - 0.5).abs() < 1e-6);
        assert!((mid[1] - 0.25).abs() < 1e-6);
        assert!((mid[3] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_transform_interpolation() {
        let from = AnimatableTransform::default();
        let to = AnimatableTransform::translate(-640.0, 0.0).with_scale(2.0);
        let mid = from.interpolate(&to, 0.25);
        assert!(approx_eq(mid.translate_x, -160.0));
        assert!(approx_eq(mid.scale_x, 1.25));
        assert!(approx_eq(mid.scale_y, 1.25));
    }

    #[test]
    fn test_value_mismatch_returns_self() {
        let from = AnimatableValue::f64(1.0);
        let to = AnimatableValue::splat3(2.0);
        assert_eq!(from.interpolate(&to, 0.5), from);
    }
}
