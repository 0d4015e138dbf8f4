//! Scroll timeline engine: binds timelines to scroll position and viewport
//! intersection.
//!
//! The `ScrollTimelineEngine` is the central coordinator. It handles:
//! - Creating timelines and binding them to scroll ranges
//! - Recomputing every binding's progress on scroll, resize and
//!   intersection events, in registration order
//! - Scrub smoothing and wall-clock playback on frame ticks
//! - Pin regions and their fixed placements
//! - Trigger edges, callbacks and toggle actions
//! - Synchronous teardown of everything a handle owns
//!
//! # Usage
//!
//! ```ignore
//! use mitra_motion::prelude::*;
//!
//! let mut engine = ScrollTimelineEngine::new(scene, scroller, observer, MotionConfig::default());
//!
//! let slides = engine.create_timeline(TimelineConfig::new(1.0).scrub(1.0).pinned())?;
//! engine.timeline_mut(slides)?.add_tween(
//!     Tween::to("slides-track", "transform", AnimatableValue::Transform {
//!         transform: AnimatableTransform::translate(-2560.0, 0.0),
//!     }),
//!     0.0,
//!     1.0,
//! )?;
//! let range = ScrollRange::horizontal("horizontal-slides", "top top", "slides-track")?;
//! engine.bind_to_scroll(slides, range, BindOptions::new())?;
//!
//! // Host event loop
//! engine.on_scroll()?;
//! engine.frame(1.0 / 60.0)?;
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use mitra_config::MotionConfig;
use tracing::{debug, trace, warn};

use crate::error::{MotionError, Result};
use crate::events::{EventQueue, MotionEvent};
use crate::host::{IntersectionEvent, ObserverToken, Renderer, Scroller, ViewportObserver};
use crate::pin::{PinChange, PinCoordinator};
use crate::scroll::{ResolvedRange, ScrollRange, ScrubState};
use crate::timeline::{PlaybackEdge, Timeline, TimelineConfig};
use crate::trigger::{ToggleAction, ToggleActions, Trigger, TriggerState, TriggerTransition};
use crate::types::{
    BindingHandle, Handle, PlayDirection, ScrollDirection, TargetId, TimelineHandle,
};

/// Callback fired on a trigger edge.
pub type EdgeCallback = Box<dyn FnMut(BindingHandle, ScrollDirection) + Send>;

/// Callback fired with the shown progress after every scrubbed seek.
pub type ProgressCallback = Box<dyn FnMut(BindingHandle, f64) + Send>;

/// Per-binding options for `bind_to_scroll`.
#[derive(Default)]
pub struct BindOptions {
    /// Element to pin. Defaults to the range's trigger when the timeline is
    /// configured with `pin`.
    pub pin_target: Option<TargetId>,
    /// Playback actions for trigger-played timelines.
    pub actions: ToggleActions,
    /// Intersection threshold for element triggers.
    pub threshold: Option<f64>,
    pub on_enter: Option<EdgeCallback>,
    pub on_leave: Option<EdgeCallback>,
    pub on_update: Option<ProgressCallback>,
}

impl BindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pin_target(mut self, target: impl Into<TargetId>) -> Self {
        self.pin_target = Some(target.into());
        self
    }

    pub fn actions(mut self, actions: ToggleActions) -> Self {
        self.actions = actions;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn on_enter(mut self, f: impl FnMut(BindingHandle, ScrollDirection) + Send + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    pub fn on_leave(mut self, f: impl FnMut(BindingHandle, ScrollDirection) + Send + 'static) -> Self {
        self.on_leave = Some(Box::new(f));
        self
    }

    pub fn on_update(mut self, f: impl FnMut(BindingHandle, f64) + Send + 'static) -> Self {
        self.on_update = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for BindOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindOptions")
            .field("pin_target", &self.pin_target)
            .field("actions", &self.actions)
            .field("threshold", &self.threshold)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}

/// How a binding drives its timeline.
#[derive(Debug)]
enum BindingMode {
    /// Continuous: scroll progress seeks the timeline.
    Scrub { factor: f64, state: ScrubState },
    /// One-shot: trigger edges run playback actions.
    Trigger { actions: ToggleActions },
}

struct Binding {
    timeline: TimelineHandle,
    range: ScrollRange,
    resolved: ResolvedRange,
    mode: BindingMode,
    trigger: Trigger,
    pin_target: Option<TargetId>,
    observer: Option<ObserverToken>,
    on_enter: Option<EdgeCallback>,
    on_leave: Option<EdgeCallback>,
    on_update: Option<ProgressCallback>,
}

/// Work scheduled on the frame tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum FrameSubscription {
    Playback(TimelineHandle),
    Scrub(BindingHandle),
}

/// Binds timelines to scroll and owns their lifecycle.
///
/// Thread safety: the engine is `Send` when its collaborators are, so a host
/// may move it to whichever thread drives scroll and frame events.
pub struct ScrollTimelineEngine<R, S, O> {
    renderer: R,
    scroller: S,
    observer: O,
    settings: MotionConfig,

    /// Shared counter for timeline and binding handles.
    next_id: u64,

    timelines: BTreeMap<TimelineHandle, Timeline>,

    /// Bindings in registration order.
    bindings: BTreeMap<BindingHandle, Binding>,

    observer_index: HashMap<ObserverToken, BindingHandle>,
    pins: PinCoordinator,
    frame_subscriptions: BTreeSet<FrameSubscription>,

    last_offset: f64,
    direction: ScrollDirection,

    events: EventQueue,
}

impl<R, S, O> ScrollTimelineEngine<R, S, O>
where
    R: Renderer,
    S: Scroller,
    O: ViewportObserver,
{
    /// Create an engine. Invalid settings fall back to their defaults.
    pub fn new(renderer: R, scroller: S, observer: O, settings: MotionConfig) -> Self {
        let settings = match settings.validate() {
            Ok(()) => settings,
            Err(err) => {
                warn!(%err, "invalid motion settings, using defaults for rejected values");
                settings.sanitized()
            }
        };
        let last_offset = scroller.current_offset();
        Self {
            renderer,
            scroller,
            observer,
            settings,
            next_id: 0,
            timelines: BTreeMap::new(),
            bindings: BTreeMap::new(),
            observer_index: HashMap::new(),
            pins: PinCoordinator::new(),
            frame_subscriptions: BTreeSet::new(),
            last_offset,
            direction: ScrollDirection::Forward,
            events: EventQueue::new(),
        }
    }

    pub fn settings(&self) -> &MotionConfig {
        &self.settings
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn scroller(&self) -> &S {
        &self.scroller
    }

    pub fn scroller_mut(&mut self) -> &mut S {
        &mut self.scroller
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Direction of the most recent scroll movement.
    pub fn scroll_direction(&self) -> ScrollDirection {
        self.direction
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    // ---- Timelines ----

    /// Create an empty timeline.
    pub fn create_timeline(&mut self, config: TimelineConfig) -> Result<TimelineHandle> {
        let handle = TimelineHandle(self.allocate_id());
        let timeline = Timeline::new(handle, config)?;
        debug!(?handle, duration = timeline.duration(), "created timeline");
        self.timelines.insert(handle, timeline);
        Ok(handle)
    }

    pub fn timeline(&self, handle: TimelineHandle) -> Result<&Timeline> {
        self.timelines
            .get(&handle)
            .ok_or(MotionError::StaleBinding(handle.into()))
    }

    pub fn timeline_mut(&mut self, handle: TimelineHandle) -> Result<&mut Timeline> {
        self.timelines
            .get_mut(&handle)
            .ok_or(MotionError::StaleBinding(handle.into()))
    }

    pub fn timeline_count(&self) -> usize {
        self.timelines.len()
    }

    /// Seek a timeline directly and render it.
    pub fn seek(&mut self, handle: TimelineHandle, progress: f64) -> Result<()> {
        let timeline = self
            .timelines
            .get_mut(&handle)
            .ok_or(MotionError::StaleBinding(handle.into()))?;
        timeline.seek(progress, &mut self.renderer)
    }

    /// Start wall-clock playback of a timeline at the configured speed.
    pub fn play(&mut self, handle: TimelineHandle, direction: PlayDirection) -> Result<()> {
        if !self.timelines.contains_key(&handle) {
            return Err(MotionError::StaleBinding(handle.into()));
        }
        let action = match direction {
            PlayDirection::Forward => ToggleAction::Play,
            PlayDirection::Reverse => ToggleAction::Reverse,
        };
        self.apply_action(handle, action)
    }

    pub fn pause(&mut self, handle: TimelineHandle) -> Result<()> {
        if !self.timelines.contains_key(&handle) {
            return Err(MotionError::StaleBinding(handle.into()));
        }
        self.apply_action(handle, ToggleAction::Pause)
    }

    // ---- Bindings ----

    /// Bind a timeline to a scroll range.
    ///
    /// The range is resolved immediately: an empty range fails with
    /// `InvalidRange` and a pin overlapping another pin on the same element
    /// fails with `ConflictingPin`. On success the timeline is rendered at
    /// the current scroll position.
    pub fn bind_to_scroll(
        &mut self,
        timeline: TimelineHandle,
        range: ScrollRange,
        options: BindOptions,
    ) -> Result<BindingHandle> {
        let config = self
            .timelines
            .get(&timeline)
            .ok_or(MotionError::StaleBinding(timeline.into()))?
            .config()
            .clone();

        let pin_target = match options.pin_target {
            Some(target) => Some(target),
            None if config.pin => Some(range.trigger().cloned().ok_or_else(|| {
                MotionError::InvalidRange("a pinned fixed range needs a pin target".to_string())
            })?),
            None => None,
        };

        let handle = BindingHandle(self.allocate_id());
        let resolved = self.resolve_layout(handle, &range, pin_target.as_ref())?;

        let offset = self.scroller.current_offset();
        let mode = match config.scrub {
            Some(factor) => BindingMode::Scrub {
                factor,
                state: ScrubState::new(resolved.progress(offset)),
            },
            None => BindingMode::Trigger {
                actions: options.actions,
            },
        };

        let threshold = options.threshold.unwrap_or(self.settings.default_threshold);
        let trigger = Trigger::new(threshold, config.restartable);
        let observer = match (&mode, &range) {
            (BindingMode::Trigger { .. }, ScrollRange::Element { trigger: element, .. }) => {
                let token = self.observer.observe(element, trigger.threshold());
                self.observer_index.insert(token, handle);
                Some(token)
            }
            _ => None,
        };

        debug!(?handle, ?timeline, start = resolved.start, end = resolved.end, "bound timeline to scroll");
        self.bindings.insert(
            handle,
            Binding {
                timeline,
                range,
                resolved,
                mode,
                trigger,
                pin_target,
                observer,
                on_enter: options.on_enter,
                on_leave: options.on_leave,
                on_update: options.on_update,
            },
        );

        if let Err(err) = self.mount(handle, offset) {
            self.teardown_binding(handle)?;
            return Err(err);
        }
        Ok(handle)
    }

    /// First render of a new binding.
    fn mount(&mut self, handle: BindingHandle, offset: f64) -> Result<()> {
        self.evaluate(handle, offset, self.direction)?;

        let Some(binding) = self.bindings.get_mut(&handle) else {
            return Ok(());
        };
        let timeline = self
            .timelines
            .get_mut(&binding.timeline)
            .ok_or(MotionError::StaleBinding(binding.timeline.into()))?;
        match &binding.mode {
            // Snapping scrubs were already rendered by `evaluate`.
            BindingMode::Scrub { factor, .. } if *factor <= 0.0 => {}
            BindingMode::Scrub { state, .. } => {
                timeline.seek(state.shown, &mut self.renderer)?;
                if let Some(on_update) = binding.on_update.as_mut() {
                    on_update(handle, state.shown);
                }
            }
            BindingMode::Trigger { .. } => timeline.render(&mut self.renderer)?,
        }
        Ok(())
    }

    /// Resolve a range against current layout and (re)reserve its pin.
    fn resolve_layout(
        &mut self,
        handle: BindingHandle,
        range: &ScrollRange,
        pin_target: Option<&TargetId>,
    ) -> Result<ResolvedRange> {
        let viewport = self.scroller.viewport();
        let shift = match range.trigger() {
            Some(trigger) => {
                let rect = self.renderer.measure(trigger)?;
                self.pins.spacing_before(rect.y, Some(handle))
            }
            None => 0.0,
        };
        let resolved = range.resolve(&self.renderer, viewport, shift)?;

        if let Some(target) = pin_target {
            let original = self.renderer.measure(target)?;
            let pin_shift = self.pins.spacing_before(original.y, Some(handle));
            self.pins.reserve(
                handle,
                target.clone(),
                resolved.start,
                resolved.length(),
                original,
                pin_shift,
                &mut self.renderer,
            )?;
        }
        Ok(resolved)
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    fn binding(&self, handle: BindingHandle) -> Result<&Binding> {
        self.bindings
            .get(&handle)
            .ok_or(MotionError::StaleBinding(handle.into()))
    }

    /// Resolved scroll range of a binding.
    pub fn binding_range(&self, handle: BindingHandle) -> Result<ResolvedRange> {
        Ok(self.binding(handle)?.resolved)
    }

    /// Progress currently shown by a binding's timeline.
    pub fn binding_progress(&self, handle: BindingHandle) -> Result<f64> {
        let binding = self.binding(handle)?;
        Ok(match &binding.mode {
            BindingMode::Scrub { state, .. } => state.shown,
            BindingMode::Trigger { .. } => self.timeline(binding.timeline)?.progress(),
        })
    }

    pub fn trigger_state(&self, handle: BindingHandle) -> Result<TriggerState> {
        Ok(self.binding(handle)?.trigger.state())
    }

    // ---- Teardown ----

    /// Destroy a timeline (with every binding on it) or a single binding.
    ///
    /// Callbacks, observer subscriptions, frame subscriptions, pins and
    /// pending events go with it. Unknown handles are logged and ignored.
    pub fn destroy(&mut self, handle: impl Into<Handle>) -> Result<()> {
        match handle.into() {
            Handle::Timeline(timeline) => {
                if !self.timelines.contains_key(&timeline) {
                    warn!(?timeline, "destroy called for unknown timeline");
                    return Ok(());
                }
                let owned: Vec<BindingHandle> = self
                    .bindings
                    .iter()
                    .filter(|(_, b)| b.timeline == timeline)
                    .map(|(h, _)| *h)
                    .collect();

                let mut result = Ok(());
                for binding in owned {
                    let released = self.teardown_binding(binding);
                    if result.is_ok() {
                        result = released;
                    }
                }
                self.timelines.remove(&timeline);
                self.frame_subscriptions
                    .remove(&FrameSubscription::Playback(timeline));
                self.events.purge_timeline(timeline);
                debug!(?timeline, "destroyed timeline");
                result
            }
            Handle::Binding(binding) => {
                if !self.bindings.contains_key(&binding) {
                    warn!(?binding, "destroy called for unknown binding");
                    return Ok(());
                }
                self.teardown_binding(binding)
            }
        }
    }

    /// Remove a binding and everything it owns.
    ///
    /// Every subscription is dropped before the pin's placement is restored,
    /// so a renderer failure cannot leak them.
    fn teardown_binding(&mut self, handle: BindingHandle) -> Result<()> {
        let Some(binding) = self.bindings.remove(&handle) else {
            return Ok(());
        };
        if let Some(token) = binding.observer {
            self.observer.unobserve(token);
            self.observer_index.remove(&token);
        }
        self.frame_subscriptions
            .remove(&FrameSubscription::Scrub(handle));
        self.events.purge_binding(handle);
        debug!(?handle, timeline = ?binding.timeline, "tore down binding");

        self.pins.release(handle, &mut self.renderer)?;
        Ok(())
    }

    // ---- Layout invalidation ----

    /// Re-measure one binding's range and pin distance.
    ///
    /// Unknown handles are logged and ignored. If the new layout is invalid
    /// the binding keeps its previous range.
    pub fn invalidate(&mut self, handle: BindingHandle) -> Result<()> {
        let Some(binding) = self.bindings.get(&handle) else {
            warn!(?handle, "invalidate called for unknown binding");
            return Ok(());
        };
        let range = binding.range.clone();
        let pin_target = binding.pin_target.clone();

        let resolved = self.resolve_layout(handle, &range, pin_target.as_ref())?;
        if let Some(binding) = self.bindings.get_mut(&handle) {
            trace!(?handle, start = resolved.start, end = resolved.end, "invalidated binding");
            binding.resolved = resolved;
        }
        Ok(())
    }

    /// Re-measure every binding, in registration order.
    pub fn invalidate_all(&mut self) -> Result<()> {
        let handles: Vec<BindingHandle> = self.bindings.keys().copied().collect();
        for handle in handles {
            self.invalidate(handle)?;
        }
        Ok(())
    }

    // ---- Event entry points ----

    /// Re-evaluate every binding at the scroller's current offset.
    pub fn on_scroll(&mut self) -> Result<()> {
        let offset = self.scroller.current_offset();
        if offset > self.last_offset {
            self.direction = ScrollDirection::Forward;
        } else if offset < self.last_offset {
            self.direction = ScrollDirection::Backward;
        }
        self.last_offset = offset;

        let handles: Vec<BindingHandle> = self.bindings.keys().copied().collect();
        for handle in handles {
            self.evaluate(handle, offset, self.direction)?;
        }
        Ok(())
    }

    /// The viewport changed size: re-measure everything, then re-evaluate.
    pub fn on_resize(&mut self) -> Result<()> {
        debug!(viewport = ?self.scroller.viewport(), "viewport resized");
        self.invalidate_all()?;
        self.on_scroll()
    }

    /// Deliver an intersection change for an observed element.
    ///
    /// Events for tokens whose binding was destroyed are logged and ignored.
    pub fn on_intersection(&mut self, token: ObserverToken, event: IntersectionEvent) -> Result<()> {
        let Some(&handle) = self.observer_index.get(&token) else {
            warn!(?token, "intersection event for unknown observer");
            return Ok(());
        };
        let Some(binding) = self.bindings.get_mut(&handle) else {
            warn!(?handle, "intersection event for destroyed binding");
            return Ok(());
        };

        if let Some(transition) = binding.trigger.observe_ratio(event.ratio, event.direction) {
            self.fire(handle, transition, event.direction)?;
        }
        Ok(())
    }

    /// Advance wall-clock playback and scrub smoothing by `dt` seconds.
    ///
    /// `dt` is clamped to the configured maximum frame delta.
    pub fn frame(&mut self, dt: f64) -> Result<()> {
        let dt = if dt.is_finite() {
            dt.min(self.settings.max_frame_delta).max(0.0)
        } else {
            0.0
        };

        let subscriptions: Vec<FrameSubscription> = self.frame_subscriptions.iter().copied().collect();
        for subscription in subscriptions {
            match subscription {
                FrameSubscription::Playback(timeline) => self.tick_playback(timeline, dt)?,
                FrameSubscription::Scrub(binding) => self.tick_scrub(binding, dt)?,
            }
        }
        Ok(())
    }

    /// Number of live frame-tick subscriptions.
    pub fn frame_subscription_count(&self) -> usize {
        self.frame_subscriptions.len()
    }

    fn tick_playback(&mut self, handle: TimelineHandle, dt: f64) -> Result<()> {
        let subscription = FrameSubscription::Playback(handle);
        let Some(timeline) = self.timelines.get_mut(&handle) else {
            self.frame_subscriptions.remove(&subscription);
            return Ok(());
        };

        let edge = timeline.tick(dt, &mut self.renderer)?;
        if !timeline.is_playing() {
            self.frame_subscriptions.remove(&subscription);
        }
        match edge {
            Some(PlaybackEdge::Completed) => {
                debug!(timeline = ?handle, "timeline completed");
                self.events.push(MotionEvent::TimelineCompleted { timeline: handle });
            }
            Some(PlaybackEdge::ReverseCompleted) => {
                debug!(timeline = ?handle, "timeline reversed to start");
                self.events.push(MotionEvent::TimelineReversed { timeline: handle });
            }
            None => {}
        }
        Ok(())
    }

    fn tick_scrub(&mut self, handle: BindingHandle, dt: f64) -> Result<()> {
        let subscription = FrameSubscription::Scrub(handle);
        let epsilon = self.settings.settle_epsilon;
        let Some(binding) = self.bindings.get_mut(&handle) else {
            self.frame_subscriptions.remove(&subscription);
            return Ok(());
        };
        let BindingMode::Scrub { factor, state } = &mut binding.mode else {
            self.frame_subscriptions.remove(&subscription);
            return Ok(());
        };

        let settled = state.step(*factor, dt, epsilon);
        let shown = state.shown;
        let timeline = self
            .timelines
            .get_mut(&binding.timeline)
            .ok_or(MotionError::StaleBinding(binding.timeline.into()))?;
        timeline.seek(shown, &mut self.renderer)?;
        if let Some(on_update) = binding.on_update.as_mut() {
            on_update(handle, shown);
        }
        if settled {
            trace!(?handle, shown, "scrub settled");
            self.frame_subscriptions.remove(&subscription);
        }
        Ok(())
    }

    /// Recompute one binding at `offset`.
    fn evaluate(&mut self, handle: BindingHandle, offset: f64, direction: ScrollDirection) -> Result<()> {
        if let Some(change) = self.pins.update(handle, offset, &mut self.renderer)? {
            self.events.push(match change {
                PinChange::Pinned(binding) => MotionEvent::Pinned { binding },
                PinChange::Unpinned(binding) => MotionEvent::Unpinned { binding },
            });
        }

        let Some(binding) = self.bindings.get_mut(&handle) else {
            return Ok(());
        };
        let Binding {
            timeline,
            resolved,
            mode,
            trigger,
            observer,
            on_update,
            ..
        } = binding;

        let progress = resolved.progress(offset);
        let inside = resolved.contains(offset);
        let transition = match mode {
            BindingMode::Scrub { factor, state } => {
                state.target = progress;
                if *factor <= 0.0 {
                    state.shown = progress;
                    let timeline = self
                        .timelines
                        .get_mut(&*timeline)
                        .ok_or(MotionError::StaleBinding((*timeline).into()))?;
                    timeline.seek(progress, &mut self.renderer)?;
                    if let Some(on_update) = on_update.as_mut() {
                        on_update(handle, progress);
                    }
                } else if !state.is_settled(self.settings.settle_epsilon) {
                    self.frame_subscriptions
                        .insert(FrameSubscription::Scrub(handle));
                }
                trigger.update(inside, direction)
            }
            // Element triggers are driven by the observer instead.
            BindingMode::Trigger { .. } if observer.is_none() => trigger.update(inside, direction),
            BindingMode::Trigger { .. } => None,
        };

        if let Some(transition) = transition {
            self.fire(handle, transition, direction)?;
        }
        Ok(())
    }

    /// Report a trigger edge: queue the event, run the callback, then the
    /// toggle action.
    fn fire(&mut self, handle: BindingHandle, transition: TriggerTransition, direction: ScrollDirection) -> Result<()> {
        let Some(binding) = self.bindings.get_mut(&handle) else {
            return Ok(());
        };
        let timeline = binding.timeline;

        match transition {
            TriggerTransition::Enter => {
                self.events.push(MotionEvent::TriggerEntered {
                    binding: handle,
                    timeline,
                    direction,
                });
                if let Some(on_enter) = binding.on_enter.as_mut() {
                    on_enter(handle, direction);
                }
            }
            TriggerTransition::Leave => {
                self.events.push(MotionEvent::TriggerLeft {
                    binding: handle,
                    timeline,
                    direction,
                });
                if let Some(on_leave) = binding.on_leave.as_mut() {
                    on_leave(handle, direction);
                }
            }
        }

        let action = match &binding.mode {
            BindingMode::Trigger { actions } => actions.action_for(transition, direction),
            BindingMode::Scrub { .. } => ToggleAction::None,
        };
        debug!(?handle, ?transition, ?direction, %action, "trigger fired");
        self.apply_action(timeline, action)
    }

    fn apply_action(&mut self, handle: TimelineHandle, action: ToggleAction) -> Result<()> {
        let speed = self.settings.default_speed;
        let timeline = self
            .timelines
            .get_mut(&handle)
            .ok_or(MotionError::StaleBinding(handle.into()))?;

        match action {
            ToggleAction::Play => timeline.play(PlayDirection::Forward, speed),
            ToggleAction::Reverse => timeline.play(PlayDirection::Reverse, speed),
            ToggleAction::Pause => timeline.pause(),
            ToggleAction::Resume => timeline.resume(),
            ToggleAction::Restart => {
                timeline.seek(0.0, &mut self.renderer)?;
                timeline.play(PlayDirection::Forward, speed);
            }
            ToggleAction::Reset => {
                timeline.pause();
                timeline.seek(0.0, &mut self.renderer)?;
            }
            ToggleAction::Complete => {
                timeline.pause();
                timeline.seek(1.0, &mut self.renderer)?;
            }
            ToggleAction::None => return Ok(()),
        }

        let subscription = FrameSubscription::Playback(handle);
        if timeline.is_playing() {
            self.frame_subscriptions.insert(subscription);
        } else {
            self.frame_subscriptions.remove(&subscription);
        }
        Ok(())
    }

    // ---- Layout queries ----

    /// Total scroll distance reserved by pins.
    pub fn reserved_space(&self) -> f64 {
        self.pins.reserved_space()
    }

    /// Scrollable document height for `content_height` of laid out content.
    pub fn document_height(&self, content_height: f64) -> f64 {
        self.pins.document_height(content_height)
    }

    /// Pin spacing inserted above document offset `y`. Hosts without a
    /// real layout engine add it to element boxes below a pin.
    pub fn pin_spacing_before(&self, y: f64) -> f64 {
        self.pins.spacing_before(y, None)
    }

    // ---- Events ----

    /// Drain all pending motion events.
    pub fn drain_events(&mut self) -> impl Iterator<Item = MotionEvent> + '_ {
        self.events.drain()
    }

    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }
}

impl<R, S, O> fmt::Debug for ScrollTimelineEngine<R, S, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollTimelineEngine")
            .field("timelines", &self.timelines.len())
            .field("bindings", &self.bindings.len())
            .field("pins", &self.pins.len())
            .field("frame_subscriptions", &self.frame_subscriptions.len())
            .field("pending_events", &self.events.len())
            .finish()
    }
}

static_assertions::assert_impl_all!(
    ScrollTimelineEngine<crate::headless::HeadlessScene, crate::headless::ManualScroller, crate::headless::ManualObserver>: Send
);

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::easing::EasingFunction;
    use crate::headless::{HeadlessScene, ManualObserver, ManualScroller, intersection_ratio};
    use crate::tween::Tween;
    use crate::types::{AnimatableValue, PlaybackState, Rect, Size};

    type TestEngine = ScrollTimelineEngine<HeadlessScene, ManualScroller, ManualObserver>;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn viewport() -> Size {
        Size::new(1280.0, 800.0)
    }

    fn scene() -> HeadlessScene {
        let mut scene = HeadlessScene::new();
        scene.insert_node("hero", Rect::new(0.0, 0.0, 1280.0, 800.0));
        scene.set_value("hero", "opacity", AnimatableValue::f64(1.0));
        scene.insert_node("roadmap", Rect::new(0.0, 1200.0, 1280.0, 800.0));
        scene.set_value("roadmap", "opacity", AnimatableValue::f64(1.0));
        scene.insert_node("card", Rect::new(0.0, 2400.0, 400.0, 300.0));
        scene.set_value("card", "opacity", AnimatableValue::f64(1.0));
        scene.insert_node("slides", Rect::new(0.0, 3000.0, 1280.0, 800.0));
        scene.insert_node("track", Rect::new(0.0, 3000.0, 3840.0, 800.0));
        scene.set_value("track", "position.x", AnimatableValue::f64(0.0));
        scene
    }

    fn engine() -> TestEngine {
        ScrollTimelineEngine::new(
            scene(),
            ManualScroller::new(viewport()),
            ManualObserver::new(),
            MotionConfig::default(),
        )
    }

    fn fade(engine: &mut TestEngine, target: &str, config: TimelineConfig) -> TimelineHandle {
        let handle = engine.create_timeline(config).unwrap();
        engine
            .timeline_mut(handle)
            .unwrap()
            .add_tween(
                Tween::from_to(
                    target,
                    "opacity",
                    AnimatableValue::f64(0.0),
                    AnimatableValue::f64(1.0),
                )
                .with_easing(EasingFunction::Linear),
                0.0,
                1.0,
            )
            .unwrap();
        handle
    }

    fn scroll_to(engine: &mut TestEngine, offset: f64) {
        engine.scroller_mut().scroll_to(offset);
        engine.on_scroll().unwrap();
    }

    fn opacity(engine: &TestEngine, target: &str) -> f64 {
        engine
            .renderer()
            .value(target, "opacity")
            .and_then(|v| v.as_f64())
            .unwrap()
    }

    fn counter() -> (Arc<AtomicUsize>, impl FnMut(BindingHandle, ScrollDirection) + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move |_, _| {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_fixed_range_progress() {
        let mut engine = engine();
        let tl = fade(&mut engine, "hero", TimelineConfig::new(1.0).scrub(0.0));
        let binding = engine
            .bind_to_scroll(tl, ScrollRange::fixed(0.0, 1000.0), BindOptions::new())
            .unwrap();

        scroll_to(&mut engine, 250.0);
        assert_eq!(engine.binding_progress(binding).unwrap(), 0.25);
        assert_eq!(engine.timeline(tl).unwrap().progress(), 0.25);
        assert!(approx_eq(opacity(&engine, "hero"), 0.25));

        scroll_to(&mut engine, -50.0);
        assert_eq!(engine.binding_progress(binding).unwrap(), 0.0);

        scroll_to(&mut engine, 1500.0);
        assert_eq!(engine.binding_progress(binding).unwrap(), 1.0);
        assert!(approx_eq(opacity(&engine, "hero"), 1.0));

        // Snapping never needs the frame tick.
        assert_eq!(engine.frame_subscription_count(), 0);
    }

    #[test]
    fn test_empty_range_rejected_at_bind() {
        let mut engine = engine();
        let tl = fade(&mut engine, "hero", TimelineConfig::new(1.0).scrub(0.0));
        let result = engine.bind_to_scroll(tl, ScrollRange::fixed(500.0, 500.0), BindOptions::new());
        assert!(matches!(result, Err(MotionError::InvalidRange(_))));
        assert_eq!(engine.binding_count(), 0);
    }

    #[test]
    fn test_bind_to_destroyed_timeline() {
        let mut engine = engine();
        let tl = fade(&mut engine, "hero", TimelineConfig::new(1.0));
        engine.destroy(tl).unwrap();
        assert_eq!(
            engine
                .bind_to_scroll(tl, ScrollRange::fixed(0.0, 1.0), BindOptions::new())
                .unwrap_err(),
            MotionError::StaleBinding(tl.into())
        );
        assert!(matches!(
            engine.timeline_mut(tl),
            Err(MotionError::StaleBinding(_))
        ));
    }

    #[test]
    fn test_scrub_lags_and_settles() {
        let mut engine = engine();
        let tl = fade(&mut engine, "hero", TimelineConfig::new(1.0).scrub(1.0));
        let binding = engine
            .bind_to_scroll(tl, ScrollRange::fixed(0.0, 1000.0), BindOptions::new())
            .unwrap();

        scroll_to(&mut engine, 1000.0);
        assert_eq!(engine.binding_progress(binding).unwrap(), 0.0);
        assert_eq!(engine.frame_subscription_count(), 1);

        engine.frame(0.05).unwrap();
        let shown = engine.binding_progress(binding).unwrap();
        assert!(approx_eq(shown, 0.05));
        assert!(approx_eq(opacity(&engine, "hero"), 0.05));

        // A stalled tab does not jump: the delta is clamped.
        engine.frame(10.0).unwrap();
        let after = engine.binding_progress(binding).unwrap();
        assert!(after < 1.0);
        assert!(approx_eq(after, shown + (1.0 - shown) * 0.1));

        for _ in 0..2000 {
            engine.frame(1.0 / 60.0).unwrap();
        }
        assert_eq!(engine.binding_progress(binding).unwrap(), 1.0);
        assert_eq!(engine.frame_subscription_count(), 0);
    }

    #[test]
    fn test_on_update_reports_shown_progress() {
        let mut engine = engine();
        let tl = fade(&mut engine, "hero", TimelineConfig::new(1.0).scrub(0.0));
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        engine
            .bind_to_scroll(
                tl,
                ScrollRange::fixed(0.0, 1000.0),
                BindOptions::new().on_update(move |_, p| sink.lock().unwrap().push(p)),
            )
            .unwrap();

        scroll_to(&mut engine, 500.0);
        scroll_to(&mut engine, 750.0);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.last().copied(), Some(0.75));
        assert!(seen.contains(&0.5));
    }

    #[test]
    fn test_pin_reserves_exact_distance() {
        let mut engine = engine();
        let tl = fade(&mut engine, "roadmap", TimelineConfig::new(1.0).scrub(0.0).pinned());
        let binding = engine
            .bind_to_scroll(
                tl,
                ScrollRange::element("roadmap", "top top", "+=800").unwrap(),
                BindOptions::new(),
            )
            .unwrap();

        assert_eq!(engine.reserved_space(), 800.0);
        let content = engine.renderer().content_height();
        assert_eq!(engine.document_height(content), content + 800.0);

        scroll_to(&mut engine, 1100.0);
        assert_eq!(engine.renderer().placement("roadmap"), None);

        scroll_to(&mut engine, 1600.0);
        assert_eq!(
            engine.renderer().placement("roadmap"),
            Some(Rect::new(0.0, 0.0, 1280.0, 800.0))
        );
        assert_eq!(engine.binding_progress(binding).unwrap(), 0.5);

        scroll_to(&mut engine, 2100.0);
        assert_eq!(engine.renderer().placement("roadmap"), None);

        let pins: Vec<_> = engine
            .drain_events()
            .filter(|e| matches!(e, MotionEvent::Pinned { .. } | MotionEvent::Unpinned { .. }))
            .collect();
        assert_eq!(
            pins,
            vec![
                MotionEvent::Pinned { binding },
                MotionEvent::Unpinned { binding }
            ]
        );
    }

    #[test]
    fn test_pin_spacing_shifts_later_ranges() {
        let mut engine = engine();
        let pinned = fade(&mut engine, "roadmap", TimelineConfig::new(1.0).scrub(0.0).pinned());
        engine
            .bind_to_scroll(
                pinned,
                ScrollRange::element("roadmap", "top top", "+=800").unwrap(),
                BindOptions::new(),
            )
            .unwrap();

        let below = fade(&mut engine, "card", TimelineConfig::new(1.0).scrub(0.0));
        let binding = engine
            .bind_to_scroll(
                below,
                ScrollRange::element("card", "top bottom", "bottom top").unwrap(),
                BindOptions::new(),
            )
            .unwrap();

        let range = engine.binding_range(binding).unwrap();
        assert!(approx_eq(range.start, 2400.0 + 800.0 - 800.0));
        assert!(approx_eq(range.end, 2700.0 + 800.0));
    }

    #[test]
    fn test_conflicting_pin_rejected() {
        let mut engine = engine();
        let first = fade(&mut engine, "roadmap", TimelineConfig::new(1.0).scrub(0.0).pinned());
        let owner = engine
            .bind_to_scroll(
                first,
                ScrollRange::element("roadmap", "top top", "+=800").unwrap(),
                BindOptions::new(),
            )
            .unwrap();

        let second = fade(&mut engine, "hero", TimelineConfig::new(1.0).scrub(0.0));
        let err = engine
            .bind_to_scroll(
                second,
                ScrollRange::fixed(1300.0, 1500.0),
                BindOptions::new().pin_target("roadmap"),
            )
            .unwrap_err();
        assert_eq!(
            err,
            MotionError::ConflictingPin {
                target: "roadmap".into(),
                owner,
            }
        );
        assert_eq!(engine.binding_count(), 1);
        assert_eq!(engine.reserved_space(), 800.0);
    }

    #[test]
    fn test_pinned_fixed_range_needs_target() {
        let mut engine = engine();
        let tl = fade(&mut engine, "hero", TimelineConfig::new(1.0).pinned());
        assert!(matches!(
            engine.bind_to_scroll(tl, ScrollRange::fixed(0.0, 100.0), BindOptions::new()),
            Err(MotionError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_destroy_mid_scroll_releases_pin() {
        let mut engine = engine();
        let tl = fade(&mut engine, "roadmap", TimelineConfig::new(1.0).scrub(1.0).pinned());
        engine
            .bind_to_scroll(
                tl,
                ScrollRange::element("roadmap", "top top", "+=800").unwrap(),
                BindOptions::new(),
            )
            .unwrap();
        scroll_to(&mut engine, 1500.0);
        assert!(engine.renderer().placement("roadmap").is_some());

        engine.destroy(tl).unwrap();
        assert_eq!(engine.renderer().placement("roadmap"), None);
        assert_eq!(engine.reserved_space(), 0.0);
        assert_eq!(engine.frame_subscription_count(), 0);
        assert_eq!(engine.pending_event_count(), 0);
    }

    #[test]
    fn test_restartable_trigger_fires_once_per_crossing() {
        let mut engine = engine();
        let tl = fade(&mut engine, "card", TimelineConfig::new(0.5).restartable(true));
        let (enters, on_enter) = counter();
        let (leaves, on_leave) = counter();
        engine
            .bind_to_scroll(
                tl,
                ScrollRange::fixed(1000.0, 2000.0),
                BindOptions::new().on_enter(on_enter).on_leave(on_leave),
            )
            .unwrap();

        let crossings = 12;
        for _ in 0..crossings {
            // Several scroll events on each side of the boundary.
            for offset in [900.0, 1100.0, 1300.0, 1500.0] {
                scroll_to(&mut engine, offset);
            }
            for offset in [800.0, 500.0, 700.0] {
                scroll_to(&mut engine, offset);
            }
        }

        assert_eq!(enters.load(Ordering::SeqCst), crossings);
        assert_eq!(leaves.load(Ordering::SeqCst), crossings);
    }

    #[test]
    fn test_one_shot_trigger_fires_once() {
        let mut engine = engine();
        let tl = fade(&mut engine, "card", TimelineConfig::new(0.5));
        let (enters, on_enter) = counter();
        let binding = engine
            .bind_to_scroll(
                tl,
                ScrollRange::fixed(1000.0, 2000.0),
                BindOptions::new().on_enter(on_enter),
            )
            .unwrap();

        for offset in [1500.0, 2500.0, 1500.0, 500.0, 1500.0] {
            scroll_to(&mut engine, offset);
        }
        assert_eq!(enters.load(Ordering::SeqCst), 1);
        assert_eq!(engine.trigger_state(binding).unwrap(), TriggerState::Done);
    }

    #[test]
    fn test_toggle_actions_play_and_reverse() {
        let mut engine = engine();
        let tl = fade(&mut engine, "card", TimelineConfig::new(0.5).restartable(true));
        engine
            .bind_to_scroll(
                tl,
                ScrollRange::fixed(1000.0, 2000.0),
                BindOptions::new().actions("play none none reverse".parse().unwrap()),
            )
            .unwrap();

        // Rendered at progress 0 on bind.
        assert!(approx_eq(opacity(&engine, "card"), 0.0));

        scroll_to(&mut engine, 1200.0);
        assert!(engine.timeline(tl).unwrap().is_playing());
        for _ in 0..10 {
            engine.frame(0.1).unwrap();
        }
        assert_eq!(engine.timeline(tl).unwrap().state(), PlaybackState::Finished);
        assert!(approx_eq(opacity(&engine, "card"), 1.0));
        assert_eq!(engine.frame_subscription_count(), 0);

        scroll_to(&mut engine, 900.0);
        assert_eq!(
            engine.timeline(tl).unwrap().direction(),
            PlayDirection::Reverse
        );
        for _ in 0..10 {
            engine.frame(0.1).unwrap();
        }
        assert!(approx_eq(opacity(&engine, "card"), 0.0));

        let kinds: Vec<_> = engine
            .drain_events()
            .filter(|e| !e.is_trigger())
            .collect();
        assert_eq!(
            kinds,
            vec![
                MotionEvent::TimelineCompleted { timeline: tl },
                MotionEvent::TimelineReversed { timeline: tl }
            ]
        );
    }

    #[test]
    fn test_destroy_mid_playback_stops_everything() {
        let mut engine = engine();
        let tl = fade(&mut engine, "card", TimelineConfig::new(2.0).restartable(true));
        let (enters, on_enter) = counter();
        let (leaves, on_leave) = counter();
        engine
            .bind_to_scroll(
                tl,
                ScrollRange::fixed(1000.0, 2000.0),
                BindOptions::new()
                    .actions("play none none reverse".parse().unwrap())
                    .on_enter(on_enter)
                    .on_leave(on_leave),
            )
            .unwrap();

        scroll_to(&mut engine, 1500.0);
        engine.frame(0.05).unwrap();
        assert_eq!(enters.load(Ordering::SeqCst), 1);
        assert_eq!(engine.frame_subscription_count(), 1);

        engine.destroy(tl).unwrap();
        assert_eq!(engine.frame_subscription_count(), 0);
        assert_eq!(engine.binding_count(), 0);
        assert_eq!(engine.pending_event_count(), 0);

        let writes = engine.renderer().write_count();
        for offset in [500.0, 1500.0, 2500.0, 1200.0] {
            scroll_to(&mut engine, offset);
            engine.frame(0.1).unwrap();
        }
        assert_eq!(enters.load(Ordering::SeqCst), 1);
        assert_eq!(leaves.load(Ordering::SeqCst), 0);
        assert_eq!(engine.renderer().write_count(), writes);
        assert_eq!(engine.pending_event_count(), 0);
    }

    #[test]
    fn test_stale_handles_are_ignored_by_event_entry_points() {
        let mut engine = engine();
        let tl = fade(&mut engine, "card", TimelineConfig::new(1.0));
        let binding = engine
            .bind_to_scroll(
                tl,
                ScrollRange::element("card", "top 80%", "bottom top").unwrap(),
                BindOptions::new(),
            )
            .unwrap();
        let token = engine.observer().token_for("card").unwrap();

        engine.destroy(binding).unwrap();
        assert_eq!(engine.observer().active_count(), 0);

        assert!(engine.destroy(binding).is_ok());
        assert!(engine.invalidate(binding).is_ok());
        assert!(engine
            .on_intersection(token, IntersectionEvent::new(1.0, ScrollDirection::Forward))
            .is_ok());
        assert!(engine.drain_events().next().is_none());
        assert!(matches!(
            engine.binding_range(binding),
            Err(MotionError::StaleBinding(_))
        ));
    }

    #[test]
    fn test_element_trigger_uses_observer() {
        let mut engine = engine();
        let tl = fade(&mut engine, "card", TimelineConfig::new(0.5).restartable(true));
        let (enters, on_enter) = counter();
        let binding = engine
            .bind_to_scroll(
                tl,
                ScrollRange::element("card", "top 80%", "bottom top").unwrap(),
                BindOptions::new().threshold(0.5).on_enter(on_enter),
            )
            .unwrap();
        let token = engine.observer().token_for("card").unwrap();
        assert_eq!(engine.observer().observation(token).unwrap().threshold, 0.5);

        // Scrolling alone does not drive element triggers.
        scroll_to(&mut engine, 2400.0);
        assert_eq!(enters.load(Ordering::SeqCst), 0);

        let rect = engine.renderer().measure(&"card".into()).unwrap();
        for offset in [1700.0, 1800.0, 2000.0] {
            let ratio = intersection_ratio(rect, offset, viewport());
            engine
                .on_intersection(token, IntersectionEvent::new(ratio, ScrollDirection::Forward))
                .unwrap();
        }
        assert_eq!(enters.load(Ordering::SeqCst), 1);
        assert_eq!(engine.trigger_state(binding).unwrap(), TriggerState::Active);
        assert!(engine.timeline(tl).unwrap().is_playing());
    }

    #[test]
    fn test_invalidate_all_after_resize() {
        let mut engine = engine();
        let tl = engine
            .create_timeline(TimelineConfig::new(1.0).scrub(0.0).pinned())
            .unwrap();
        engine
            .timeline_mut(tl)
            .unwrap()
            .add_tween(
                Tween::to("track", "position.x", AnimatableValue::f64(-1.0))
                    .with_easing(EasingFunction::Linear),
                0.0,
                1.0,
            )
            .unwrap();
        let binding = engine
            .bind_to_scroll(
                tl,
                ScrollRange::horizontal("slides", "top top", "track").unwrap(),
                BindOptions::new(),
            )
            .unwrap();
        assert!(approx_eq(engine.binding_range(binding).unwrap().end, 3000.0 + 2560.0));
        assert_eq!(engine.reserved_space(), 2560.0);

        // Content reflow without invalidation keeps the stale end.
        engine
            .renderer_mut()
            .set_layout("track", Rect::new(0.0, 3000.0, 5120.0, 800.0));
        scroll_to(&mut engine, 3000.0 + 1280.0);
        assert_eq!(engine.binding_progress(binding).unwrap(), 0.5);

        engine.invalidate_all().unwrap();
        assert!(approx_eq(engine.binding_range(binding).unwrap().end, 3000.0 + 3840.0));
        assert_eq!(engine.reserved_space(), 3840.0);
        engine.on_scroll().unwrap();
        assert!(approx_eq(engine.binding_progress(binding).unwrap(), 1280.0 / 3840.0));

        // A viewport resize invalidates on its own.
        engine.scroller_mut().resize(Size::new(1600.0, 900.0));
        engine.on_resize().unwrap();
        let range = engine.binding_range(binding).unwrap();
        assert!(approx_eq(range.length(), 5120.0 - 1600.0));
        assert!(approx_eq(
            engine.binding_progress(binding).unwrap(),
            1280.0 / 3520.0
        ));
        let x = engine
            .renderer()
            .value("track", "position.x")
            .and_then(|v| v.as_f64())
            .unwrap();
        assert!(approx_eq(x, -1280.0 / 3520.0));
    }

    #[test]
    fn test_reflow_moves_element_while_pinned() {
        let mut engine = engine();
        let tl = fade(&mut engine, "roadmap", TimelineConfig::new(1.0).scrub(0.0).pinned());
        engine
            .bind_to_scroll(
                tl,
                ScrollRange::element("roadmap", "top top", "+=800").unwrap(),
                BindOptions::new(),
            )
            .unwrap();

        scroll_to(&mut engine, 1600.0);
        assert_eq!(
            engine.renderer().placement("roadmap"),
            Some(Rect::new(0.0, 0.0, 1280.0, 800.0))
        );

        engine
            .renderer_mut()
            .set_layout("roadmap", Rect::new(0.0, 1200.0, 1600.0, 900.0));
        engine.invalidate_all().unwrap();
        assert_eq!(
            engine.renderer().placement("roadmap"),
            Some(Rect::new(0.0, 0.0, 1600.0, 900.0))
        );

        scroll_to(&mut engine, 1610.0);
        assert_eq!(
            engine.renderer().placement("roadmap"),
            Some(Rect::new(0.0, 0.0, 1600.0, 900.0))
        );
    }

    #[test]
    fn test_bind_renders_and_reports_once() {
        for factor in [0.0, 1.0] {
            let mut engine = engine();
            let tl = fade(&mut engine, "hero", TimelineConfig::new(1.0).scrub(factor));
            engine.scroller_mut().scroll_to(250.0);
            let (calls, _) = counter();
            let sink = Arc::clone(&calls);
            let writes_before = engine.renderer().write_count();
            engine
                .bind_to_scroll(
                    tl,
                    ScrollRange::fixed(0.0, 1000.0),
                    BindOptions::new().on_update(move |_, _| {
                        sink.fetch_add(1, Ordering::SeqCst);
                    }),
                )
                .unwrap();
            assert_eq!(calls.load(Ordering::SeqCst), 1, "scrub {factor}");
            assert_eq!(engine.renderer().write_count() - writes_before, 1, "scrub {factor}");
            assert!(approx_eq(opacity(&engine, "hero"), 0.25));
        }
    }

    #[test]
    fn test_invalid_settings_fall_back_to_defaults() {
        let settings = MotionConfig {
            max_frame_delta: -1.0,
            default_speed: f64::NAN,
            ..MotionConfig::default()
        };
        let mut engine = ScrollTimelineEngine::new(
            scene(),
            ManualScroller::new(viewport()),
            ManualObserver::new(),
            settings,
        );
        assert_eq!(engine.settings().max_frame_delta, 0.1);
        assert_eq!(engine.settings().default_speed, 1.0);

        let tl = fade(&mut engine, "hero", TimelineConfig::new(1.0));
        engine.play(tl, PlayDirection::Forward).unwrap();
        engine.frame(0.016).unwrap();
        engine.frame(f64::NAN).unwrap();
        assert!(approx_eq(engine.timeline(tl).unwrap().progress(), 0.016));
    }

    #[test]
    fn test_invalid_layout_keeps_previous_range() {
        let mut engine = engine();
        let tl = fade(&mut engine, "hero", TimelineConfig::new(1.0).scrub(0.0));
        let binding = engine
            .bind_to_scroll(
                tl,
                ScrollRange::horizontal("slides", "top top", "track").unwrap(),
                BindOptions::new(),
            )
            .unwrap();
        let before = engine.binding_range(binding).unwrap();

        engine
            .renderer_mut()
            .set_layout("track", Rect::new(0.0, 3000.0, 1000.0, 800.0));
        assert!(matches!(
            engine.invalidate(binding),
            Err(MotionError::InvalidRange(_))
        ));
        assert_eq!(engine.binding_range(binding).unwrap(), before);
    }

    #[test]
    fn test_bindings_apply_in_registration_order() {
        let mut engine = engine();
        let first = engine.create_timeline(TimelineConfig::new(1.0).scrub(0.0)).unwrap();
        engine
            .timeline_mut(first)
            .unwrap()
            .add_tween(
                Tween::from_to("hero", "opacity", AnimatableValue::f64(0.0), AnimatableValue::f64(0.2)),
                0.0,
                1.0,
            )
            .unwrap();
        let second = engine.create_timeline(TimelineConfig::new(1.0).scrub(0.0)).unwrap();
        engine
            .timeline_mut(second)
            .unwrap()
            .add_tween(
                Tween::from_to("hero", "opacity", AnimatableValue::f64(0.9), AnimatableValue::f64(0.7)),
                0.0,
                1.0,
            )
            .unwrap();
        engine
            .bind_to_scroll(first, ScrollRange::fixed(0.0, 100.0), BindOptions::new())
            .unwrap();
        engine
            .bind_to_scroll(second, ScrollRange::fixed(0.0, 100.0), BindOptions::new())
            .unwrap();

        scroll_to(&mut engine, 200.0);
        assert!(approx_eq(opacity(&engine, "hero"), 0.7));
    }

    #[test]
    fn test_missing_target_propagates() {
        let mut engine = engine();
        let tl = fade(&mut engine, "ghost", TimelineConfig::new(1.0).scrub(0.0));
        let result = engine.bind_to_scroll(tl, ScrollRange::fixed(0.0, 100.0), BindOptions::new());
        assert!(matches!(result, Err(MotionError::Render(_))));
        assert_eq!(engine.binding_count(), 0);
    }

    #[test]
    fn test_direct_playback() {
        let mut engine = engine();
        let tl = fade(&mut engine, "hero", TimelineConfig::new(0.5));
        engine.seek(tl, 0.0).unwrap();
        engine.play(tl, PlayDirection::Forward).unwrap();
        assert_eq!(engine.frame_subscription_count(), 1);

        engine.frame(0.1).unwrap();
        engine.pause(tl).unwrap();
        assert_eq!(engine.frame_subscription_count(), 0);
        assert!(approx_eq(opacity(&engine, "hero"), 0.2));

        engine.destroy(tl).unwrap();
        assert!(matches!(
            engine.play(tl, PlayDirection::Forward),
            Err(MotionError::StaleBinding(_))
        ));
    }
}
