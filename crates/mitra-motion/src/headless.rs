//! In-memory collaborators.
//!
//! `HeadlessScene`, `ManualScroller` and `ManualObserver` implement the host
//! contracts without a browser or GPU. Tests and the walkthrough binary use
//! them to drive the engine deterministically.

use std::collections::{BTreeMap, HashMap};

use crate::error::RenderError;
use crate::host::{ObserverToken, Renderer, Scroller, ViewportObserver};
use crate::types::{AnimatableValue, PropertyPath, Rect, Size, TargetId};

#[derive(Debug, Clone, Default)]
struct Node {
    layout: Rect,
    placement: Option<Rect>,
    values: BTreeMap<PropertyPath, AnimatableValue>,
}

/// Scene graph of named nodes with a layout box and property values.
#[derive(Debug, Clone, Default)]
pub struct HeadlessScene {
    nodes: BTreeMap<TargetId, Node>,
    writes: usize,
    placements: usize,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node with its document-space layout box.
    pub fn insert_node(&mut self, target: impl Into<TargetId>, layout: Rect) {
        self.nodes.insert(
            target.into(),
            Node {
                layout,
                ..Node::default()
            },
        );
    }

    pub fn remove_node(&mut self, target: impl Into<TargetId>) {
        self.nodes.remove(&target.into());
    }

    /// Change a node's layout box, as a reflow or resize would.
    /// Unknown targets are ignored.
    pub fn set_layout(&mut self, target: impl Into<TargetId>, layout: Rect) {
        if let Some(node) = self.nodes.get_mut(&target.into()) {
            node.layout = layout;
        }
    }

    /// Seed an authored property value. Unknown targets are ignored.
    pub fn set_value(
        &mut self,
        target: impl Into<TargetId>,
        path: impl Into<PropertyPath>,
        value: AnimatableValue,
    ) {
        if let Some(node) = self.nodes.get_mut(&target.into()) {
            node.values.insert(path.into(), value);
        }
    }

    pub fn value(&self, target: &str, path: &str) -> Option<&AnimatableValue> {
        self.nodes
            .get(&TargetId::from(target))?
            .values
            .get(&PropertyPath::from(path))
    }

    /// Current fixed placement of a node, `None` when in normal flow.
    pub fn placement(&self, target: &str) -> Option<Rect> {
        self.nodes.get(&TargetId::from(target))?.placement
    }

    /// Number of fixed placements currently applied.
    pub fn pinned_count(&self) -> usize {
        self.nodes.values().filter(|n| n.placement.is_some()).count()
    }

    /// Every property value, keyed by target and path.
    pub fn snapshot(&self) -> BTreeMap<(TargetId, PropertyPath), AnimatableValue> {
        self.nodes
            .iter()
            .flat_map(|(target, node)| {
                node.values
                    .iter()
                    .map(move |(path, value)| ((target.clone(), path.clone()), value.clone()))
            })
            .collect()
    }

    /// Total `set_property` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Total `apply_fixed_placement` calls so far.
    pub fn placement_count(&self) -> usize {
        self.placements
    }

    /// Height of the laid out content: the lowest node bottom.
    pub fn content_height(&self) -> f64 {
        self.nodes
            .values()
            .map(|n| n.layout.bottom())
            .fold(0.0, f64::max)
    }
}

impl Renderer for HeadlessScene {
    fn set_property(
        &mut self,
        target: &TargetId,
        path: &PropertyPath,
        value: &AnimatableValue,
    ) -> Result<(), RenderError> {
        let node = self
            .nodes
            .get_mut(target)
            .ok_or_else(|| RenderError::MissingTarget(target.clone()))?;
        node.values.insert(path.clone(), value.clone());
        self.writes += 1;
        Ok(())
    }

    fn get_property(
        &self,
        target: &TargetId,
        path: &PropertyPath,
    ) -> Result<AnimatableValue, RenderError> {
        let node = self
            .nodes
            .get(target)
            .ok_or_else(|| RenderError::MissingTarget(target.clone()))?;
        node.values
            .get(path)
            .cloned()
            .ok_or_else(|| RenderError::MissingProperty {
                target: target.clone(),
                property: path.clone(),
            })
    }

    fn apply_fixed_placement(
        &mut self,
        target: &TargetId,
        placement: Option<Rect>,
    ) -> Result<(), RenderError> {
        let node = self
            .nodes
            .get_mut(target)
            .ok_or_else(|| RenderError::MissingTarget(target.clone()))?;
        node.placement = placement;
        self.placements += 1;
        Ok(())
    }

    fn measure(&self, target: &TargetId) -> Result<Rect, RenderError> {
        self.nodes
            .get(target)
            .map(|n| n.layout)
            .ok_or_else(|| RenderError::MissingTarget(target.clone()))
    }
}

/// Scroll position and viewport set by hand.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ManualScroller {
    pub offset: f64,
    pub viewport: Size,
}

impl ManualScroller {
    pub fn new(viewport: Size) -> Self {
        Self {
            offset: 0.0,
            viewport,
        }
    }

    pub fn scroll_to(&mut self, offset: f64) {
        self.offset = offset;
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.offset += delta;
    }

    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
    }
}

impl Scroller for ManualScroller {
    fn current_offset(&self) -> f64 {
        self.offset
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}

/// Observation registered with a `ManualObserver`.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub target: TargetId,
    pub threshold: f64,
}

/// Records observations; intersection events are computed or injected by
/// the caller.
#[derive(Debug, Clone, Default)]
pub struct ManualObserver {
    next_token: u64,
    active: HashMap<ObserverToken, Observation>,
}

impl ManualObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live observations.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn observation(&self, token: ObserverToken) -> Option<&Observation> {
        self.active.get(&token)
    }

    /// Live observations sorted by token.
    pub fn observations(&self) -> Vec<(ObserverToken, Observation)> {
        let mut list: Vec<_> = self
            .active
            .iter()
            .map(|(token, obs)| (*token, obs.clone()))
            .collect();
        list.sort_by_key(|(token, _)| *token);
        list
    }

    /// Token observing `target`, if any.
    pub fn token_for(&self, target: &str) -> Option<ObserverToken> {
        self.observations()
            .into_iter()
            .find(|(_, obs)| obs.target.as_str() == target)
            .map(|(token, _)| token)
    }
}

impl ViewportObserver for ManualObserver {
    fn observe(&mut self, target: &TargetId, threshold: f64) -> ObserverToken {
        self.next_token += 1;
        let token = ObserverToken(self.next_token);
        self.active.insert(
            token,
            Observation {
                target: target.clone(),
                threshold,
            },
        );
        token
    }

    fn unobserve(&mut self, token: ObserverToken) {
        self.active.remove(&token);
    }
}

/// Fraction of `rect` (document space) visible in a viewport scrolled to
/// `offset`.
pub fn intersection_ratio(rect: Rect, offset: f64, viewport: Size) -> f64 {
    if rect.height <= 0.0 {
        return 0.0;
    }
    let top = rect.y.max(offset);
    let bottom = rect.bottom().min(offset + viewport.height);
    ((bottom - top).max(0.0) / rect.height).clamp(0.0, 1.0)
}
