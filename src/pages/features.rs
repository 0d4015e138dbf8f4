//! Features page: each card plays its reveal when it crosses 70% of the
//! viewport and reverses when scrolled back above it.

use mitra_motion::headless::HeadlessScene;
use mitra_motion::prelude::*;

use super::{Engine, ease, node, revealable};

const CARDS: &[(&str, &[&str])] = &[
    ("monitor", &["Real-time", "air", "quality"]),
    ("predict", &["Hyperlocal", "pollution", "forecasts"]),
    ("alert", &["Health", "alerts", "that", "matter"]),
    ("act", &["Community", "action", "tools"]),
];

const WORD_STAGGER: f64 = 0.03;
const WORD_DURATION: f64 = 0.8;
/// (part, start, duration, ease)
const PARTS: [(&str, f64, f64, &str); 3] = [
    ("icon", 0.2, 0.7, "power2.out"),
    ("desc", 0.4, 0.7, "power2.out"),
    ("image", 0.5, 0.9, "power2.out"),
];

pub(super) fn scene(viewport: Size) -> HeadlessScene {
    let Size { width: vw, height: vh } = viewport;
    let mut scene = HeadlessScene::new();
    node(&mut scene, "features-hero", Rect::new(0.0, 0.0, vw, vh), &[]);

    for (i, (card, words)) in CARDS.iter().enumerate() {
        let top = vh * (1 + i) as f64;
        node(&mut scene, card, Rect::new(0.0, top, vw, vh), &[]);
        for (w, _) in words.iter().enumerate() {
            let rect = Rect::new(80.0 + w as f64 * 160.0, top + 120.0, 150.0, 64.0);
            node(
                &mut scene,
                &format!("{card}-word-{}", w + 1),
                rect,
                &[
                    ("opacity", AnimatableValue::f64(1.0)),
                    ("y-percent", AnimatableValue::f64(0.0)),
                ],
            );
        }
        for (r, (part, ..)) in PARTS.iter().enumerate() {
            let rect = Rect::new(80.0, top + 220.0 + r as f64 * 160.0, vw / 2.0, 140.0);
            node(&mut scene, &format!("{card}-{part}"), rect, &revealable());
        }
    }
    scene
}

pub(super) fn mount(engine: &mut Engine) -> Result<Vec<TimelineHandle>> {
    let actions: ToggleActions = "play none none reverse".parse()?;
    let words_ease = ease("power3.out")?;
    let duration = PARTS
        .iter()
        .map(|(_, at, dur, _)| at + dur)
        .fold(0.0, f64::max);

    let mut timelines = Vec::with_capacity(CARDS.len());
    for (card, words) in CARDS {
        let word_ids: Vec<String> = (1..=words.len()).map(|w| format!("{card}-word-{w}")).collect();
        let handle = engine.create_timeline(TimelineConfig::new(duration).restartable(true))?;
        let timeline = engine.timeline_mut(handle)?;

        timeline
            .stagger(
                word_ids.clone(),
                &Tween::from("", "y-percent", AnimatableValue::f64(100.0)).with_easing(words_ease),
                0.0,
                WORD_STAGGER,
                WORD_DURATION,
            )?
            .stagger(
                word_ids,
                &Tween::from("", "opacity", AnimatableValue::f64(0.0)).with_easing(words_ease),
                0.0,
                WORD_STAGGER,
                WORD_DURATION,
            )?;

        for (part, at, dur, name) in PARTS {
            let target = format!("{card}-{part}");
            let easing = ease(name)?;
            timeline
                .add_tween(
                    Tween::from(target.as_str(), "opacity", AnimatableValue::f64(0.0)).with_easing(easing),
                    at,
                    dur,
                )?
                .add_tween(
                    Tween::from(target.as_str(), "y", AnimatableValue::f64(50.0)).with_easing(easing),
                    at,
                    dur,
                )?;
        }

        engine.bind_to_scroll(
            handle,
            ScrollRange::element(*card, "top 70%", "bottom top")?,
            BindOptions::new().actions(actions).threshold(0.3),
        )?;
        timelines.push(handle);
    }
    Ok(timelines)
}
