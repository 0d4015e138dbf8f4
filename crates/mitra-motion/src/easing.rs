//! Easing functions for timeline tweens.
//!
//! This module implements the timing curves used across the pitch pages:
//! - Linear (`none`)
//! - Ease, EaseIn, EaseOut, EaseInOut (standard CSS curves)
//! - CubicBezier (custom bezier curves)
//! - Power curves (`power1.out`, `power3.inOut`, ...)
//! - Back curves with overshoot (`back.out(1.2)`)
//!
//! # Usage
//!
//! ```
//! use mitra_motion::easing::{EasingFunction, EaseMode};
//!
//! let ease: EasingFunction = "power3.out".parse().unwrap();
//! assert_eq!(ease, EasingFunction::Power { power: 3, mode: EaseMode::Out });
//!
//! let overshoot: EasingFunction = "back.out(1.2)".parse().unwrap();
//! assert!(overshoot.evaluate(0.8) > 1.0);
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::MotionError;

/// Overshoot used by `back` curves when none is given.
pub const DEFAULT_BACK_OVERSHOOT: f64 = 1.70158;

/// Which end of the interval a curve eases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EaseMode {
    /// Slow start, accelerating.
    In,
    /// Fast start, decelerating.
    #[default]
    Out,
    /// Slow start and end, fast middle.
    InOut,
}

/// Easing function for tween timing.
///
/// Easing functions map a linear progress value (0.0 to 1.0) to an eased
/// output value. Every curve satisfies `f(0) = 0` and `f(1) = 1`; back
/// curves overshoot between the endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,

    /// CSS `ease` - equivalent to `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,

    /// CSS `ease-in` - equivalent to `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,

    /// CSS `ease-out` - equivalent to `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,

    /// CSS `ease-in-out` - equivalent to `cubic-bezier(0.42, 0, 0.58, 1)`.
    EaseInOut,

    /// Custom cubic bezier curve.
    /// x values must be in [0, 1], y values can be any float.
    CubicBezier { x1: f64, y1: f64, x2: f64, y2: f64 },

    /// Polynomial curve of degree `power + 1` (`power2` is cubic).
    Power { power: u32, mode: EaseMode },

    /// Back curve that pulls past the end value before settling.
    Back { overshoot: f64, mode: EaseMode },
}

impl Default for EasingFunction {
    fn default() -> Self {
        Self::Power {
            power: 1,
            mode: EaseMode::Out,
        }
    }
}

impl EasingFunction {
    /// Evaluate the easing function at the given progress.
    ///
    /// Input is clamped to `[0, 1]`.
    pub fn evaluate(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
            Self::Power { power, mode } => {
                let exponent = (*power + 1) as i32;
                apply_mode(*mode, t, |x| x.powi(exponent))
            }
            Self::Back { overshoot, mode } => {
                let s = *overshoot;
                apply_mode(*mode, t, |x| (s + 1.0) * x * x * x - s * x * x)
            }
        }
    }

    /// Create a custom cubic bezier easing function.
    ///
    /// # Panics
    /// Panics if x1 or x2 are outside [0, 1].
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2),
            "Bezier x values must be in [0, 1]"
        );
        Self::CubicBezier { x1, y1, x2, y2 }
    }

    /// Cubic ease-out, the workhorse of the reveal animations.
    pub fn cubic_out() -> Self {
        Self::Power {
            power: 2,
            mode: EaseMode::Out,
        }
    }

    /// Back ease-out with the given overshoot.
    pub fn back_out(overshoot: f64) -> Self {
        Self::Back {
            overshoot,
            mode: EaseMode::Out,
        }
    }
}

/// Build the in/out/in-out variant of a curve from its ease-in form.
fn apply_mode(mode: EaseMode, t: f64, ease_in: impl Fn(f64) -> f64) -> f64 {
    match mode {
        EaseMode::In => ease_in(t),
        EaseMode::Out => 1.0 - ease_in(1.0 - t),
        EaseMode::InOut => {
            if t < 0.5 {
                ease_in(t * 2.0) / 2.0
            } else {
                1.0 - ease_in((1.0 - t) * 2.0) / 2.0
            }
        }
    }
}

/// Evaluate a cubic bezier curve at time t.
///
/// Uses Newton-Raphson iteration to find the curve parameter for the input
/// progress, then evaluates the y coordinate at that point.
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, progress: f64) -> f64 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let t = solve_bezier_x(x1, x2, progress);
    bezier_y(y1, y2, t)
}

fn solve_bezier_x(x1: f64, x2: f64, target_x: f64) -> f64 {
    let mut t = target_x;

    for _ in 0..8 {
        let x = bezier_x(x1, x2, t) - target_x;
        if x.abs() < 1e-7 {
            break;
        }

        let dx = bezier_x_derivative(x1, x2, t);
        if dx.abs() < 1e-7 {
            break;
        }

        t -= x / dx;
        t = t.clamp(0.0, 1.0);
    }

    t
}

/// x(t) = 3(1-t)²t·x1 + 3(1-t)t²·x2 + t³
#[inline]
fn bezier_x(x1: f64, x2: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;

    3.0 * mt2 * t * x1 + 3.0 * mt * t2 * x2 + t3
}

#[inline]
fn bezier_y(y1: f64, y2: f64, t: f64) -> f64 {
    let t2 = t * t;
    let t3 = t2 * t;
    let mt = 1.0 - t;
    let mt2 = mt * mt;

    3.0 * mt2 * t * y1 + 3.0 * mt * t2 * y2 + t3
}

/// dx/dt = 3(1-t)²·x1 + 6(1-t)t·(x2-x1) + 3t²·(1-x2)
#[inline]
fn bezier_x_derivative(x1: f64, x2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * x1 + 6.0 * mt * t * (x2 - x1) + 3.0 * t * t * (1.0 - x2)
}

fn parse_mode(mode: Option<&str>) -> Option<EaseMode> {
    match mode {
        None | Some("out") => Some(EaseMode::Out),
        Some("in") => Some(EaseMode::In),
        Some("inOut") | Some("in_out") | Some("inout") => Some(EaseMode::InOut),
        _ => None,
    }
}

impl FromStr for EasingFunction {
    type Err = MotionError;

    /// Parse ease names as written in animation configs: `none`, `linear`,
    /// CSS keywords, `cubic-bezier(a, b, c, d)`, `power0`..`power4` and their
    /// `quad`/`cubic`/`quart`/`quint` aliases with `.in`/`.out`/`.inOut`,
    /// and `back.<mode>(<overshoot>)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || MotionError::InvalidEasing(s.to_string());
        let name = s.trim();

        match name {
            "none" | "linear" => return Ok(Self::Linear),
            "ease" => return Ok(Self::Ease),
            "ease-in" => return Ok(Self::EaseIn),
            "ease-out" => return Ok(Self::EaseOut),
            "ease-in-out" => return Ok(Self::EaseInOut),
            _ => {}
        }

        if let Some(args) = name
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let values = args
                .split(',')
                .map(|v| v.trim().parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| invalid())?;
            return match values.as_slice() {
                [x1, y1, x2, y2] if (0.0..=1.0).contains(x1) && (0.0..=1.0).contains(x2) => {
                    Ok(Self::CubicBezier {
                        x1: *x1,
                        y1: *y1,
                        x2: *x2,
                        y2: *y2,
                    })
                }
                _ => Err(invalid()),
            };
        }

        // Split an optional parameter list: `back.out(1.2)`.
        let (head, param) = match name.split_once('(') {
            Some((head, rest)) => {
                let value = rest
                    .strip_suffix(')')
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .ok_or_else(invalid)?;
                (head, Some(value))
            }
            None => (name, None),
        };
        let (family, mode) = match head.split_once('.') {
            Some((family, mode)) => (family, Some(mode)),
            None => (head, None),
        };
        let mode = parse_mode(mode).ok_or_else(invalid)?;

        let power = match family {
            "power0" => return Ok(Self::Linear),
            "power1" | "quad" => Some(1),
            "power2" | "cubic" => Some(2),
            "power3" | "quart" => Some(3),
            "power4" | "quint" | "strong" => Some(4),
            _ => None,
        };
        if let Some(power) = power {
            if param.is_some() {
                return Err(invalid());
            }
            return Ok(Self::Power { power, mode });
        }

        if family == "back" {
            return Ok(Self::Back {
                overshoot: param.unwrap_or(DEFAULT_BACK_OVERSHOOT),
                mode,
            });
        }

        Err(invalid())
    }
}
