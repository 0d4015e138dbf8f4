//! Headless scroll walkthrough.
//!
//! Mounts a page on an engine wired to the in-memory collaborators, scrolls
//! it top to bottom (and back, when configured) in fixed steps, and records
//! every motion event along the way. The observer's intersection events are
//! computed from the scene layout, shifted by pin spacing the way a browser
//! would lay the page out.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, ensure};
use mitra_config::MitraConfig;
use mitra_motion::headless::{ManualObserver, ManualScroller, intersection_ratio};
use mitra_motion::host::ObserverToken;
use mitra_motion::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::pages::{Engine, PageKind};

/// Frames allowed for playback and scrub lag to settle before giving up.
const MAX_SETTLE_FRAMES: usize = 10_000;

/// Motion event tagged with the scroll offset it was observed at.
#[derive(Debug, Clone, Serialize)]
pub struct StepEvent {
    pub offset: f64,
    pub event: MotionEvent,
}

#[derive(Debug, Clone, Serialize)]
pub struct WalkthroughReport {
    pub page: PageKind,
    pub viewport: Size,
    pub document_height: f64,
    pub reserved_space: f64,
    pub timelines: usize,
    pub bindings: usize,
    pub steps: usize,
    pub events: Vec<StepEvent>,
    /// Property values once the page settled at the final offset.
    pub values: BTreeMap<String, AnimatableValue>,
}

impl WalkthroughReport {
    pub fn count(&self, matches: impl Fn(&MotionEvent) -> bool) -> usize {
        self.events.iter().filter(|e| matches(&e.event)).count()
    }
}

struct Walk {
    engine: Engine,
    frame_delta: f64,
    /// Last ratio delivered per observer token.
    ratios: HashMap<ObserverToken, f64>,
    events: Vec<StepEvent>,
    steps: usize,
}

impl Walk {
    fn step(&mut self, offset: f64) -> anyhow::Result<()> {
        self.engine.scroller_mut().scroll_to(offset);
        self.engine.on_scroll()?;
        self.deliver_intersections()?;
        self.engine.frame(self.frame_delta)?;
        self.steps += 1;
        self.collect();
        Ok(())
    }

    /// Push intersection changes for every live observation.
    fn deliver_intersections(&mut self) -> anyhow::Result<()> {
        let offset = self.engine.scroller().offset;
        let viewport = self.engine.scroller().viewport;
        let direction = self.engine.scroll_direction();

        for (token, observation) in self.engine.observer().observations() {
            let mut rect = self.engine.renderer().measure(&observation.target)?;
            rect.y += self.engine.pin_spacing_before(rect.y);
            let ratio = intersection_ratio(rect, offset, viewport);
            if self.ratios.get(&token) == Some(&ratio) {
                continue;
            }
            self.ratios.insert(token, ratio);
            self.engine
                .on_intersection(token, IntersectionEvent::new(ratio, direction))?;
        }
        Ok(())
    }

    /// Run frames until no playback or scrub lag is pending.
    fn settle(&mut self) -> anyhow::Result<()> {
        let mut frames = 0;
        while self.engine.frame_subscription_count() > 0 {
            if frames == MAX_SETTLE_FRAMES {
                warn!(
                    pending = self.engine.frame_subscription_count(),
                    "motion did not settle"
                );
                break;
            }
            self.engine.frame(self.frame_delta)?;
            frames += 1;
        }
        debug!(frames, "settled");
        self.collect();
        Ok(())
    }

    fn collect(&mut self) {
        let offset = self.engine.scroller().offset;
        self.events.extend(
            self.engine
                .drain_events()
                .map(|event| StepEvent { offset, event }),
        );
    }
}

/// Scroll offsets visited: top to `bottom` in `step` increments, always
/// ending exactly at `bottom`, then back up when `round_trip` is set.
fn scroll_offsets(bottom: f64, step: f64, round_trip: bool) -> Vec<f64> {
    let mut down = Vec::new();
    let mut offset = step;
    while offset < bottom {
        down.push(offset);
        offset += step;
    }
    if bottom > 0.0 {
        down.push(bottom);
    }

    let mut offsets = down.clone();
    if round_trip {
        offsets.extend(down.iter().rev().skip(1).copied());
        if bottom > 0.0 {
            offsets.push(0.0);
        }
    }
    offsets
}

/// Walk `page` through a full scroll and tear it down.
pub fn run(page: PageKind, config: &MitraConfig) -> anyhow::Result<WalkthroughReport> {
    config.validate().context("invalid configuration")?;
    let settings = &config.walkthrough;

    let viewport = Size::new(settings.viewport_width, settings.viewport_height);
    let scene = page.scene(viewport);
    let content_height = scene.content_height();
    let mut engine = Engine::new(
        scene,
        ManualScroller::new(viewport),
        ManualObserver::new(),
        config.motion.clone(),
    );
    let timelines = page
        .mount(&mut engine)
        .with_context(|| format!("failed to mount the {page} page"))?;
    let bindings = engine.binding_count();
    let document_height = engine.document_height(content_height);
    let reserved_space = engine.reserved_space();
    info!(%page, timelines = timelines.len(), bindings, document_height, "mounted page");

    let mut walk = Walk {
        engine,
        frame_delta: settings.frame_delta,
        ratios: HashMap::new(),
        events: Vec::new(),
        steps: 0,
    };
    walk.deliver_intersections()?;
    walk.collect();

    let bottom = (document_height - viewport.height).max(0.0);
    for offset in scroll_offsets(bottom, settings.scroll_step, settings.round_trip) {
        walk.step(offset)
            .with_context(|| format!("{page} page failed at scroll offset {offset}"))?;
    }
    walk.settle()?;

    let values = walk
        .engine
        .renderer()
        .snapshot()
        .into_iter()
        .map(|((target, path), value)| (format!("{target}:{path}"), value))
        .collect();

    for handle in &timelines {
        walk.engine.destroy(*handle)?;
    }
    let engine = &walk.engine;
    ensure!(
        engine.timeline_count() == 0 && engine.binding_count() == 0,
        "{page} page left timelines behind"
    );
    ensure!(
        engine.frame_subscription_count() == 0,
        "{page} page left frame subscriptions behind"
    );
    ensure!(
        engine.observer().active_count() == 0,
        "{page} page left observers behind"
    );
    ensure!(
        engine.renderer().pinned_count() == 0 && engine.reserved_space() == 0.0,
        "{page} page left pinned elements behind"
    );

    info!(%page, steps = walk.steps, events = walk.events.len(), "walkthrough finished");
    Ok(WalkthroughReport {
        page,
        viewport,
        document_height,
        reserved_space,
        timelines: timelines.len(),
        bindings,
        steps: walk.steps,
        events: walk.events,
        values,
    })
}
