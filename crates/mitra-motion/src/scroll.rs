//! Scroll ranges, anchors and scrub smoothing.
//!
//! A binding's scroll range is either a pair of fixed document offsets or a
//! pair of anchors relative to a trigger element:
//!
//! ```text
//!   "top 80%"   element top meets the line 80% down the viewport
//!   "top top"   element top meets viewport top
//!   "bottom top" element bottom meets viewport top
//!   "+=1000"    (end only) 1000px after the start
//! ```
//!
//! Element ranges are resolved against `Renderer::measure` and the
//! viewport, so they must be resolved again whenever layout changes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{MotionError, Result};
use crate::host::Renderer;
use crate::types::{Size, TargetId};

/// Position along one axis of an element or the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "snake_case")]
pub enum Edge {
    /// Fraction of the extent: 0 = top, 0.5 = center, 1 = bottom.
    Fraction(f64),
    /// Fixed distance from the top in CSS pixels.
    Pixels(f64),
}

impl Edge {
    pub const TOP: Self = Self::Fraction(0.0);
    pub const CENTER: Self = Self::Fraction(0.5);
    pub const BOTTOM: Self = Self::Fraction(1.0);

    /// Offset from the top of an extent of `length` pixels.
    pub fn resolve(self, length: f64) -> f64 {
        match self {
            Self::Fraction(f) => f * length,
            Self::Pixels(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = MotionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || MotionError::InvalidAnchor(format!("unknown edge `{s}`"));
        match s {
            "top" => Ok(Self::TOP),
            "center" => Ok(Self::CENTER),
            "bottom" => Ok(Self::BOTTOM),
            _ => {
                if let Some(pct) = s.strip_suffix('%') {
                    let pct: f64 = pct.parse().map_err(|_| invalid())?;
                    Ok(Self::Fraction(pct / 100.0))
                } else {
                    let px: f64 = s.strip_suffix("px").unwrap_or(s).parse().map_err(|_| invalid())?;
                    Ok(Self::Pixels(px))
                }
            }
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Fraction(v) if v == 0.0 => f.write_str("top"),
            Self::Fraction(v) if v == 0.5 => f.write_str("center"),
            Self::Fraction(v) if v == 1.0 => f.write_str("bottom"),
            Self::Fraction(v) => write!(f, "{}%", v * 100.0),
            Self::Pixels(px) => write!(f, "{px}px"),
        }
    }
}

/// Where an element edge meets a viewport edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub element: Edge,
    pub viewport: Edge,
}

impl Anchor {
    pub fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which this anchor is reached for an element whose
    /// document-space top is `element_top`.
    pub fn scroll_offset(&self, element_top: f64, element_height: f64, viewport: Size) -> f64 {
        element_top + self.element.resolve(element_height) - self.viewport.resolve(viewport.height)
    }
}

impl FromStr for Anchor {
    type Err = MotionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some(element), Some(viewport), None) => {
                Ok(Self::new(element.parse()?, viewport.parse()?))
            }
            // A single edge applies to both, like CSS.
            (Some(edge), None, None) => {
                let edge: Edge = edge.parse()?;
                Ok(Self::new(edge, edge))
            }
            _ => Err(MotionError::InvalidAnchor(format!(
                "anchor needs `<element> <viewport>`, got `{s}`"
            ))),
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.element, self.viewport)
    }
}

/// End of an element range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RangeEnd {
    /// Anchor against the trigger element.
    Anchor { anchor: Anchor },
    /// Fixed distance after the start.
    Relative { distance: f64 },
    /// Horizontal overflow of `content`: its width minus the viewport width.
    Overflow { content: TargetId },
}

impl FromStr for RangeEnd {
    type Err = MotionError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if let Some(distance) = s.trim().strip_prefix("+=") {
            let distance: f64 = distance
                .trim_end_matches("px")
                .parse()
                .map_err(|_| MotionError::InvalidAnchor(format!("bad relative end `{s}`")))?;
            return Ok(Self::Relative { distance });
        }
        Ok(Self::Anchor { anchor: s.parse()? })
    }
}

/// Scroll range a timeline is bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScrollRange {
    /// Fixed document offsets.
    Fixed { start: f64, end: f64 },
    /// Anchored to a trigger element.
    Element {
        trigger: TargetId,
        start: Anchor,
        end: RangeEnd,
    },
}

impl ScrollRange {
    pub fn fixed(start: f64, end: f64) -> Self {
        Self::Fixed { start, end }
    }

    /// Element range from anchor strings, e.g. `("top 80%", "bottom top")`
    /// or `("top top", "+=1000")`.
    pub fn element(trigger: impl Into<TargetId>, start: &str, end: &str) -> Result<Self> {
        Ok(Self::Element {
            trigger: trigger.into(),
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    /// Range that lasts as long as `content` overflows the viewport
    /// horizontally, starting when the trigger reaches `start`.
    pub fn horizontal(
        trigger: impl Into<TargetId>,
        start: &str,
        content: impl Into<TargetId>,
    ) -> Result<Self> {
        Ok(Self::Element {
            trigger: trigger.into(),
            start: start.parse()?,
            end: RangeEnd::Overflow {
                content: content.into(),
            },
        })
    }

    /// Trigger element, if the range is element based.
    pub fn trigger(&self) -> Option<&TargetId> {
        match self {
            Self::Fixed { .. } => None,
            Self::Element { trigger, .. } => Some(trigger),
        }
    }

    /// Resolve to document offsets.
    ///
    /// `shift` moves element ranges down to account for pin spacing above
    /// the trigger.
    pub fn resolve<R: Renderer + ?Sized>(
        &self,
        renderer: &R,
        viewport: Size,
        shift: f64,
    ) -> Result<ResolvedRange> {
        match self {
            Self::Fixed { start, end } => ResolvedRange::new(*start, *end),
            Self::Element {
                trigger,
                start,
                end,
            } => {
                let rect = renderer.measure(trigger)?;
                let top = rect.y + shift;
                let start = start.scroll_offset(top, rect.height, viewport);
                let end = match end {
                    RangeEnd::Anchor { anchor } => anchor.scroll_offset(top, rect.height, viewport),
                    RangeEnd::Relative { distance } => start + distance,
                    RangeEnd::Overflow { content } => {
                        let content = renderer.measure(content)?;
                        start + (content.width - viewport.width).max(0.0)
                    }
                };
                ResolvedRange::new(start, end)
            }
        }
    }
}

/// A scroll range in document offsets, `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start: f64,
    pub end: f64,
}

impl ResolvedRange {
    /// Fails with `InvalidRange` unless `start < end` and both are finite.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(MotionError::InvalidRange(format!(
                "scroll end {end} must be greater than scroll start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `offset` lies within the range, bounds included.
    pub fn contains(&self, offset: f64) -> bool {
        offset >= self.start && offset <= self.end
    }

    /// Progress of `offset` through the range, clamped to `[0, 1]`.
    pub fn progress(&self, offset: f64) -> f64 {
        ((offset - self.start) / self.length()).clamp(0.0, 1.0)
    }
}

/// Lagged catch-up of shown progress toward scroll progress.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrubState {
    pub shown: f64,
    pub target: f64,
}

impl ScrubState {
    pub fn new(progress: f64) -> Self {
        Self {
            shown: progress,
            target: progress,
        }
    }

    pub fn is_settled(&self, epsilon: f64) -> bool {
        (self.target - self.shown).abs() <= epsilon
    }

    /// Move `shown` toward `target` for a frame of `dt` seconds.
    ///
    /// Snaps and returns `true` once within `epsilon`.
    pub fn step(&mut self, factor: f64, dt: f64, epsilon: f64) -> bool {
        self.shown = smooth_toward(self.shown, self.target, factor, dt);
        if self.is_settled(epsilon) {
            self.shown = self.target;
            return true;
        }
        false
    }
}

/// `shown + (target - shown) · min(1, factor · dt)`
pub fn smooth_toward(shown: f64, target: f64, factor: f64, dt: f64) -> f64 {
    shown + (target - shown) * (factor * dt).min(1.0)
}
