//! Landing hero: images, headline and call to action slide in once on load.

use mitra_motion::headless::HeadlessScene;
use mitra_motion::prelude::*;

use super::{Engine, node, revealable};

/// Target, axis, offset distance and delay of each hero element.
const ENTRANCE: [(&str, &str, f64, f64); 6] = [
    ("home-img1", "x", 100.0, 0.0),
    ("home-img2", "x", -100.0, 0.2),
    ("home-img3", "y", 100.0, 0.4),
    ("home-title", "y", -50.0, 0.6),
    ("home-sub", "y", -50.0, 0.8),
    ("home-cta", "y", 50.0, 1.0),
];

const STEP_DURATION: f64 = 0.7;

pub(super) fn scene(viewport: Size) -> HeadlessScene {
    let Size { width: vw, height: vh } = viewport;
    let mut scene = HeadlessScene::new();
    node(&mut scene, "hero", Rect::new(0.0, 0.0, vw, vh), &[]);

    let mut values = revealable().to_vec();
    values.push(("x", AnimatableValue::f64(0.0)));
    for (i, (target, ..)) in ENTRANCE.iter().enumerate() {
        let rect = Rect::new(vw * 0.1, vh * 0.1 + i as f64 * 90.0, vw * 0.4, 80.0);
        node(&mut scene, target, rect, &values);
    }

    node(&mut scene, "home-brief", Rect::new(0.0, vh, vw, vh * 2.0), &[]);
    scene
}

pub(super) fn mount(engine: &mut Engine) -> Result<Vec<TimelineHandle>> {
    let total = ENTRANCE
        .iter()
        .map(|(.., delay)| delay + STEP_DURATION)
        .fold(0.0, f64::max);
    let entrance = engine.create_timeline(TimelineConfig::new(total))?;

    let timeline = engine.timeline_mut(entrance)?;
    for (target, axis, distance, delay) in ENTRANCE {
        timeline
            .add_tween(Tween::from(target, axis, AnimatableValue::f64(distance)), delay, STEP_DURATION)?
            .add_tween(Tween::from(target, "opacity", AnimatableValue::f64(0.0)), delay, STEP_DURATION)?;
    }

    // Not scroll bound: hidden immediately, then played on load.
    engine.seek(entrance, 0.0)?;
    engine.play(entrance, PlayDirection::Forward)?;
    Ok(vec![entrance])
}
