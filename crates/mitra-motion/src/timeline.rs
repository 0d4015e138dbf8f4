//! Timelines: ordered tweens sharing one progress cursor.
//!
//! A timeline is authored in its own time units (the declared `duration`),
//! but it is always *driven* through normalized progress `p ∈ [0, 1]`:
//! either by scroll (`seek`) or by wall-clock playback (`play` + `tick`).
//!
//! Seeking is deterministic. The same `p` always renders the same values no
//! matter which progress values were visited before:
//!
//! - a tween whose interval contains the seek time interpolates,
//! - a tween whose interval has not started shows its start value,
//! - a tween whose interval has ended shows its end value,
//! - when several tweens animate the same property, the latest one that has
//!   started governs it (so chained `to` tweens hand off cleanly).
//!
//! # Example
//!
//! ```
//! use mitra_motion::headless::HeadlessScene;
//! use mitra_motion::timeline::{Timeline, TimelineConfig};
//! use mitra_motion::tween::Tween;
//! use mitra_motion::types::{AnimatableValue, Rect, TimelineHandle};
//!
//! let mut scene = HeadlessScene::new();
//! scene.insert_node("model", Rect::default());
//! scene.set_value("model", "rotation.y", AnimatableValue::f64(0.0));
//!
//! let mut timeline = Timeline::new(TimelineHandle(1), TimelineConfig::new(4.0)).unwrap();
//! timeline
//!     .add_tween(Tween::to("model", "rotation.y", AnimatableValue::f64(1.0)), 0.0, 2.0)
//!     .unwrap()
//!     .add_tween(Tween::to("model", "rotation.y", AnimatableValue::f64(2.0)), 2.0, 2.0)
//!     .unwrap();
//!
//! timeline.seek(0.75, &mut scene).unwrap();
//! ```

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{MotionError, Result};
use crate::host::Renderer;
use crate::tween::{ScheduledTween, Tween};
use crate::types::{
    AnimatableValue, PlayDirection, PlaybackState, PropertyPath, TargetId, TimelineHandle,
};

/// Tolerance when checking that tweens fit the declared duration.
const FIT_EPSILON: f64 = 1e-9;

/// Options recognized when creating a timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Declared total duration in timeline units.
    pub duration: f64,
    /// Whether triggers bound to this timeline may fire again after leaving.
    pub restartable: bool,
    /// Scroll scrub factor. `None` plays on trigger instead of scrubbing,
    /// `Some(0.0)` snaps to scroll progress, `Some(f)` lags behind it.
    pub scrub: Option<f64>,
    /// Pin the bound element while scroll drives the timeline.
    pub pin: bool,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            duration: 1.0,
            restartable: false,
            scrub: None,
            pin: false,
        }
    }
}

impl TimelineConfig {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Self::default()
        }
    }

    pub fn restartable(mut self, restartable: bool) -> Self {
        self.restartable = restartable;
        self
    }

    pub fn scrub(mut self, factor: f64) -> Self {
        self.scrub = Some(factor);
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pin = true;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(MotionError::InvalidRange(format!(
                "timeline duration must be positive, got {}",
                self.duration
            )));
        }
        if let Some(scrub) = self.scrub {
            if !scrub.is_finite() || scrub < 0.0 {
                return Err(MotionError::InvalidRange(format!(
                    "scrub factor must be >= 0, got {scrub}"
                )));
            }
        }
        Ok(())
    }
}

/// Bound reached by wall-clock playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackEdge {
    /// Playing forward reached progress 1.
    Completed,
    /// Playing in reverse reached progress 0.
    ReverseCompleted,
}

type PropertyKey = (TargetId, PropertyPath);

/// An ordered group of tweens sharing a single progress cursor.
#[derive(Debug, Clone)]
pub struct Timeline {
    handle: TimelineHandle,
    config: TimelineConfig,
    tweens: Vec<ScheduledTween>,
    progress: f64,
    state: PlaybackState,
    direction: PlayDirection,
    speed: f64,
    /// Renderer values read when the timeline first activated.
    captured: HashMap<PropertyKey, AnimatableValue>,
    resolved: bool,
}

impl Timeline {
    /// Create an empty timeline.
    pub fn new(handle: TimelineHandle, config: TimelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            handle,
            config,
            tweens: Vec::new(),
            progress: 0.0,
            state: PlaybackState::Paused,
            direction: PlayDirection::Forward,
            speed: 1.0,
            captured: HashMap::new(),
            resolved: false,
        })
    }

    pub fn handle(&self) -> TimelineHandle {
        self.handle
    }

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    /// Declared total duration in timeline units.
    pub fn duration(&self) -> f64 {
        self.config.duration
    }

    /// Current normalized progress.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn direction(&self) -> PlayDirection {
        self.direction
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn tweens(&self) -> &[ScheduledTween] {
        &self.tweens
    }

    /// Append a property change at `at_offset` lasting `duration`, both in
    /// timeline units.
    ///
    /// Fails with `InvalidRange` if the tween would end after the declared
    /// duration, and with `ValueMismatch` if explicit endpoints differ in kind.
    pub fn add_tween(&mut self, tween: Tween, at_offset: f64, duration: f64) -> Result<&mut Self> {
        self.check_fits(at_offset, duration)?;
        if let (Some(from), Some(to)) = (&tween.from, &tween.to) {
            if !from.same_kind(to) {
                return Err(MotionError::ValueMismatch {
                    target: tween.target.clone(),
                    property: tween.property.clone(),
                    from: from.kind(),
                    to: to.kind(),
                });
            }
        }

        self.tweens.push(ScheduledTween::new(tween, at_offset, duration));
        self.resolved = false;
        Ok(self)
    }

    /// Add `template` once per target, each copy starting `each` units after
    /// the previous one.
    ///
    /// Either every copy is added or none is.
    pub fn stagger<I, T>(
        &mut self,
        targets: I,
        template: &Tween,
        at_offset: f64,
        each: f64,
        duration: f64,
    ) -> Result<&mut Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<TargetId>,
    {
        let targets: Vec<TargetId> = targets.into_iter().map(Into::into).collect();
        if !each.is_finite() || each < 0.0 {
            return Err(MotionError::InvalidRange(format!(
                "stagger interval must be >= 0, got {each}"
            )));
        }
        if let Some(last) = targets.len().checked_sub(1) {
            self.check_fits(at_offset + each * last as f64, duration)?;
        }

        for (i, target) in targets.into_iter().enumerate() {
            self.add_tween(template.retarget(target), at_offset + each * i as f64, duration)?;
        }
        Ok(self)
    }

    fn check_fits(&self, at_offset: f64, duration: f64) -> Result<()> {
        if !at_offset.is_finite() || !duration.is_finite() || at_offset < 0.0 || duration < 0.0 {
            return Err(MotionError::InvalidRange(format!(
                "tween offset {at_offset} and duration {duration} must be finite and >= 0"
            )));
        }
        if at_offset + duration > self.config.duration + FIT_EPSILON {
            return Err(MotionError::InvalidRange(format!(
                "tween at {at_offset} lasting {duration} exceeds timeline duration {}",
                self.config.duration
            )));
        }
        Ok(())
    }

    /// Move the cursor to `p` (clamped to `[0, 1]`) and render every tween.
    pub fn seek<R: Renderer + ?Sized>(&mut self, p: f64, renderer: &mut R) -> Result<()> {
        if p.is_nan() {
            return Err(MotionError::InvalidRange("seek progress is NaN".to_string()));
        }
        self.progress = p.clamp(0.0, 1.0);
        self.render(renderer)
    }

    /// Render the values at the current cursor.
    pub fn render<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<()> {
        self.resolve(renderer)?;
        for (target, property, value) in self.sample(self.progress) {
            renderer.set_property(&target, &property, &value)?;
        }
        Ok(())
    }

    /// Values every animated property would have at progress `p`.
    ///
    /// Properties are listed in the order their first tween starts. Tweens
    /// whose endpoints have not been captured yet are skipped.
    pub fn sample(&self, p: f64) -> Vec<(TargetId, PropertyPath, AnimatableValue)> {
        let time = p.clamp(0.0, 1.0) * self.config.duration;

        let mut groups: Vec<(PropertyKey, Vec<usize>)> = Vec::new();
        let mut index: HashMap<PropertyKey, usize> = HashMap::new();
        for i in self.start_order() {
            let tween = &self.tweens[i].tween;
            let key = (tween.target.clone(), tween.property.clone());
            match index.get(&key) {
                Some(&slot) => groups[slot].1.push(i),
                None => {
                    index.insert(key.clone(), groups.len());
                    groups.push((key, vec![i]));
                }
            }
        }

        groups
            .into_iter()
            .filter_map(|((target, property), members)| {
                let governing = members
                    .iter()
                    .rev()
                    .find(|&&i| self.tweens[i].offset <= time)
                    .or_else(|| members.first())
                    .copied()?;
                let value = self.tweens[governing].value_at(time)?;
                Some((target, property, value))
            })
            .collect()
    }

    /// Tween indices ordered by start offset, insertion order breaking ties.
    fn start_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.tweens.len()).collect();
        order.sort_by(|&a, &b| self.tweens[a].offset.total_cmp(&self.tweens[b].offset));
        order
    }

    /// Capture missing endpoints.
    ///
    /// A missing start is the end of the previous tween on the same property,
    /// or the renderer's value when no earlier tween touches it. A missing
    /// end is the renderer's value. Renderer reads happen once per property
    /// and are cached, so re-resolving after `add_tween` stays deterministic.
    fn resolve<R: Renderer + ?Sized>(&mut self, renderer: &R) -> Result<()> {
        if self.resolved {
            return Ok(());
        }

        let mut chain: BTreeMap<PropertyKey, AnimatableValue> = BTreeMap::new();
        for i in self.start_order() {
            let tween = self.tweens[i].tween.clone();
            let key = (tween.target.clone(), tween.property.clone());

            let from = match tween.from {
                Some(from) => from,
                None => match chain.get(&key) {
                    Some(previous) => previous.clone(),
                    None => self.captured_value(&key, renderer)?,
                },
            };
            let to = match tween.to {
                Some(to) => to,
                None => self.captured_value(&key, renderer)?,
            };
            if !from.same_kind(&to) {
                return Err(MotionError::ValueMismatch {
                    target: key.0,
                    property: key.1,
                    from: from.kind(),
                    to: to.kind(),
                });
            }

            chain.insert(key, to.clone());
            self.tweens[i].resolved = Some((from, to));
        }

        trace!(timeline = ?self.handle, tweens = self.tweens.len(), "resolved tween endpoints");
        self.resolved = true;
        Ok(())
    }

    fn captured_value<R: Renderer + ?Sized>(
        &mut self,
        key: &PropertyKey,
        renderer: &R,
    ) -> Result<AnimatableValue> {
        if let Some(value) = self.captured.get(key) {
            return Ok(value.clone());
        }
        let value = renderer.get_property(&key.0, &key.1)?;
        self.captured.insert(key.clone(), value.clone());
        Ok(value)
    }

    /// Start wall-clock playback.
    ///
    /// `speed` is in timeline units per second. Playing toward a bound the
    /// cursor already sits on finishes immediately.
    pub fn play(&mut self, direction: PlayDirection, speed: f64) {
        self.direction = direction;
        self.speed = speed.abs();
        let at_bound = match direction {
            PlayDirection::Forward => self.progress >= 1.0,
            PlayDirection::Reverse => self.progress <= 0.0,
        };
        self.state = if at_bound {
            PlaybackState::Finished
        } else {
            PlaybackState::Playing
        };
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    /// Continue a paused playback in its previous direction.
    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.play(self.direction, self.speed);
        }
    }

    /// Advance the cursor by `dt` seconds of playback without rendering.
    ///
    /// Returns the bound reached, if any; playback stops there.
    pub fn advance(&mut self, dt: f64) -> Option<PlaybackEdge> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        let delta = self.direction.sign() * self.speed * dt / self.config.duration;
        self.progress = (self.progress + delta).clamp(0.0, 1.0);

        let edge = match self.direction {
            PlayDirection::Forward if self.progress >= 1.0 => Some(PlaybackEdge::Completed),
            PlayDirection::Reverse if self.progress <= 0.0 => Some(PlaybackEdge::ReverseCompleted),
            _ => None,
        };
        if edge.is_some() {
            self.state = PlaybackState::Finished;
        }
        edge
    }

    /// Advance playback by `dt` seconds and render.
    pub fn tick<R: Renderer + ?Sized>(
        &mut self,
        dt: f64,
        renderer: &mut R,
    ) -> Result<Option<PlaybackEdge>> {
        if self.state != PlaybackState::Playing {
            return Ok(None);
        }
        let edge = self.advance(dt);
        self.render(renderer)?;
        Ok(edge)
    }
}

static_assertions::assert_impl_all!(Timeline: Send, Sync);
