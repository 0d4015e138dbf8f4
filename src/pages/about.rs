//! About/pitch page: headline pop, staggered panel reveals, feature cards,
//! a pinned roadmap scrubbed by scroll, team cards and a call-to-action pulse.

use mitra_motion::headless::HeadlessScene;
use mitra_motion::prelude::*;
use tracing::debug;

use super::{Engine, ease, node, revealable};

const PANELS: usize = 3;
const REVEALS_PER_PANEL: usize = 3;
const FEATURE_CARDS: usize = 4;
const TEAM_CARDS: usize = 4;
const ROADMAP_DISTANCE: f64 = 1000.0;

const SHADOW_REST: [f32; 4] = [0.0, 0.0, 0.0, 0.06];
const SHADOW_LIFTED: [f32; 4] = [0.0, 0.627, 0.42, 0.12];

pub(super) fn scene(viewport: Size) -> HeadlessScene {
    let Size { width: vw, height: vh } = viewport;
    let mut scene = HeadlessScene::new();

    node(&mut scene, "intro", Rect::new(0.0, 0.0, vw, vh), &[]);
    node(&mut scene, "intro-title", Rect::new(0.0, vh * 0.3, vw, 160.0), &revealable());

    for p in 0..PANELS {
        let top = vh * (1 + p) as f64;
        let panel = format!("panel-{}", p + 1);
        node(&mut scene, &panel, Rect::new(0.0, top, vw, vh), &[]);
        for r in 0..REVEALS_PER_PANEL {
            let rect = Rect::new(0.0, top + 120.0 + r as f64 * 160.0, vw, 120.0);
            node(&mut scene, &format!("{panel}-reveal-{}", r + 1), rect, &revealable());
        }
    }

    let features_top = vh * (1 + PANELS) as f64;
    node(&mut scene, "features", Rect::new(0.0, features_top, vw, vh), &[]);
    for c in 0..FEATURE_CARDS {
        let rect = Rect::new(c as f64 * vw / 4.0, features_top + 200.0, vw / 4.0, 360.0);
        node(&mut scene, &format!("feature-card-{}", c + 1), rect, &revealable());
    }

    let roadmap_top = features_top + vh;
    node(&mut scene, "roadmap", Rect::new(0.0, roadmap_top, vw, vh), &[]);
    node(
        &mut scene,
        "roadmap-track",
        Rect::new(0.0, roadmap_top, vw * 2.0, vh),
        &[(
            "transform",
            AnimatableValue::Transform {
                transform: AnimatableTransform::default(),
            },
        )],
    );

    let team_top = roadmap_top + vh;
    node(&mut scene, "team", Rect::new(0.0, team_top, vw, vh), &[]);
    for t in 0..TEAM_CARDS {
        let row = (t / 2) as f64;
        let col = (t % 2) as f64;
        let rect = Rect::new(col * vw / 2.0, team_top + 80.0 + row * 340.0, vw / 2.0, 320.0);
        node(&mut scene, &format!("team-card-{}", t + 1), rect, &revealable());
    }

    let cta_top = team_top + vh;
    node(&mut scene, "cta", Rect::new(0.0, cta_top, vw, 400.0), &[]);
    node(
        &mut scene,
        "cta-btn",
        Rect::new(vw * 0.4, cta_top + 160.0, vw * 0.2, 64.0),
        &[
            ("scale", AnimatableValue::f64(1.0)),
            ("box-shadow.color", AnimatableValue::Color { rgba: SHADOW_LIFTED }),
        ],
    );
    scene
}

pub(super) fn mount(engine: &mut Engine) -> Result<Vec<TimelineHandle>> {
    let mut timelines = Vec::new();
    let replay: ToggleActions = "play none none reverse".parse()?;
    let power3 = ease("power3.out")?;

    // Intro headline: fade and pop.
    let intro = engine.create_timeline(TimelineConfig::new(1.1).restartable(true))?;
    engine
        .timeline_mut(intro)?
        .add_tween(reveal("intro-title", "opacity", 0.0, power3), 0.0, 1.1)?
        .add_tween(reveal("intro-title", "y", 60.0, power3), 0.0, 1.1)?
        .add_tween(reveal("intro-title", "scale", 0.98, power3), 0.0, 1.1)?;
    engine.bind_to_scroll(
        intro,
        ScrollRange::element("intro", "top center", "bottom top")?,
        BindOptions::new().actions(replay),
    )?;
    timelines.push(intro);

    // Panels: staggered children.
    for p in 1..=PANELS {
        let panel = format!("panel-{p}");
        let reveals: Vec<String> = (1..=REVEALS_PER_PANEL)
            .map(|r| format!("{panel}-reveal-{r}"))
            .collect();
        let stagger = 0.12;
        let duration = 0.9 + stagger * (REVEALS_PER_PANEL - 1) as f64;

        let handle = engine.create_timeline(TimelineConfig::new(duration).restartable(true))?;
        engine
            .timeline_mut(handle)?
            .stagger(reveals.clone(), &reveal("", "y", 40.0, power3), 0.0, stagger, 0.9)?
            .stagger(reveals, &reveal("", "opacity", 0.0, power3), 0.0, stagger, 0.9)?;
        engine.bind_to_scroll(
            handle,
            ScrollRange::element(panel.as_str(), "top 80%", "top 40%")?,
            BindOptions::new().actions(replay).threshold(0.2),
        )?;
        timelines.push(handle);
    }

    // Feature cards: scale in with a slight overshoot, once.
    let cards: Vec<String> = (1..=FEATURE_CARDS)
        .map(|c| format!("feature-card-{c}"))
        .collect();
    let back = ease("back.out(1.2)")?;
    let stagger = 0.15;
    let features = engine.create_timeline(TimelineConfig::new(
        0.9 + stagger * (FEATURE_CARDS - 1) as f64,
    ))?;
    engine
        .timeline_mut(features)?
        .stagger(cards.clone(), &reveal("", "scale", 0.96, back), 0.0, stagger, 0.9)?
        .stagger(cards.clone(), &reveal("", "y", 24.0, back), 0.0, stagger, 0.9)?
        .stagger(cards, &reveal("", "opacity", 0.0, back), 0.0, stagger, 0.9)?;
    engine.bind_to_scroll(
        features,
        ScrollRange::element("features", "top 85%", "bottom top")?,
        BindOptions::new().threshold(0.15),
    )?;
    timelines.push(features);

    // Roadmap: pinned, track scrubbed half its width to the left.
    let track_width = engine
        .renderer()
        .measure(&TargetId::from("roadmap-track"))?
        .width;
    let roadmap = engine.create_timeline(TimelineConfig::new(1.0).scrub(0.0).pinned())?;
    engine.timeline_mut(roadmap)?.add_tween(
        Tween::to(
            "roadmap-track",
            "transform",
            AnimatableValue::Transform {
                transform: AnimatableTransform::translate(-track_width * 0.5, 0.0),
            },
        )
        .with_easing(EasingFunction::Linear),
        0.0,
        1.0,
    )?;
    let roadmap_binding = engine.bind_to_scroll(
        roadmap,
        ScrollRange::element("roadmap", "top top", &format!("+={ROADMAP_DISTANCE}"))?,
        BindOptions::new().on_update(|binding, progress| {
            debug!(?binding, progress, "roadmap progress");
        }),
    )?;
    debug!(binding = ?roadmap_binding, reserved = engine.reserved_space(), "pinned roadmap");
    timelines.push(roadmap);

    // Team cards: one trigger each, delayed by position.
    for t in 0..TEAM_CARDS {
        let card = format!("team-card-{}", t + 1);
        let delay = t as f64 * 0.08;
        let handle = engine.create_timeline(TimelineConfig::new(delay + 0.75).restartable(true))?;
        engine
            .timeline_mut(handle)?
            .add_tween(reveal(&card, "y", 30.0, power3), delay, 0.75)?
            .add_tween(reveal(&card, "opacity", 0.0, power3), delay, 0.75)?
            .add_tween(reveal(&card, "scale", 0.98, power3), delay, 0.75)?;
        engine.bind_to_scroll(
            handle,
            ScrollRange::element(card.as_str(), "top 85%", "bottom top")?,
            BindOptions::new().actions(replay).threshold(0.15),
        )?;
        timelines.push(handle);
    }

    // Call to action: pulse and lift the shadow.
    let power1 = ease("power1.inOut")?;
    let cta = engine.create_timeline(TimelineConfig::new(0.6))?;
    engine
        .timeline_mut(cta)?
        .add_tween(
            Tween::from_to("cta-btn", "scale", AnimatableValue::f64(0.98), AnimatableValue::f64(1.0))
                .with_easing(power1),
            0.0,
            0.6,
        )?
        .add_tween(
            Tween::from_to(
                "cta-btn",
                "box-shadow.color",
                AnimatableValue::Color { rgba: SHADOW_REST },
                AnimatableValue::Color { rgba: SHADOW_LIFTED },
            )
            .with_easing(power1),
            0.0,
            0.6,
        )?;
    engine.bind_to_scroll(
        cta,
        ScrollRange::element("cta", "top 80%", "bottom top")?,
        BindOptions::new().threshold(0.2),
    )?;
    timelines.push(cta);

    Ok(timelines)
}

/// Start from `value` and settle on the authored one.
fn reveal(target: &str, property: &str, value: f64, easing: EasingFunction) -> Tween {
    Tween::from(target, property, AnimatableValue::f64(value)).with_easing(easing)
}
