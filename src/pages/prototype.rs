//! Prototype page: the device model turns, slides and grows as the story
//! sections scroll past, with the canvas pinned alongside them.

use std::f64::consts::PI;

use mitra_motion::headless::HeadlessScene;
use mitra_motion::prelude::*;

use super::{Engine, node};

const STORY_SECTIONS: usize = 5;
const SCRUB_LAG: f64 = 1.2;
const MODEL: &str = "device-model";

pub(super) fn scene(viewport: Size) -> HeadlessScene {
    let Size { width: vw, height: vh } = viewport;
    let mut scene = HeadlessScene::new();

    node(&mut scene, "canvas-wrapper", Rect::new(vw / 2.0, 0.0, vw / 2.0, vh), &[]);
    node(
        &mut scene,
        MODEL,
        Rect::new(vw / 2.0, 0.0, vw / 2.0, vh),
        &[
            ("scale", AnimatableValue::splat3(1.0)),
            ("rotation.y", AnimatableValue::f64(0.0)),
            ("position.x", AnimatableValue::f64(0.0)),
            ("position.z", AnimatableValue::f64(0.0)),
        ],
    );
    node(
        &mut scene,
        "story-sections",
        Rect::new(0.0, 0.0, vw / 2.0, vh * STORY_SECTIONS as f64),
        &[],
    );
    for i in 0..STORY_SECTIONS {
        node(
            &mut scene,
            &format!("story-{}", i + 1),
            Rect::new(0.0, vh * i as f64, vw / 2.0, vh),
            &[],
        );
    }
    scene
}

pub(super) fn mount(engine: &mut Engine) -> Result<Vec<TimelineHandle>> {
    let choreography = [
        (
            Tween::from_to(MODEL, "scale", AnimatableValue::splat3(0.9), AnimatableValue::splat3(1.03)),
            0.0,
            1.0,
        ),
        (Tween::to(MODEL, "rotation.y", AnimatableValue::f64(PI * 0.3)), 0.5, 1.2),
        (Tween::to(MODEL, "position.x", AnimatableValue::f64(-0.25)), 1.2, 1.2),
        (Tween::to(MODEL, "scale", AnimatableValue::splat3(1.15)), 2.0, 1.2),
        (Tween::to(MODEL, "rotation.y", AnimatableValue::f64(PI * 0.5)), 3.0, 1.5),
        (Tween::to(MODEL, "position.z", AnimatableValue::f64(1.2)), 4.5, 1.2),
    ];
    let duration = choreography
        .iter()
        .map(|(_, at, dur)| at + dur)
        .fold(0.0, f64::max);

    let handle = engine.create_timeline(TimelineConfig::new(duration).scrub(SCRUB_LAG).pinned())?;
    let timeline = engine.timeline_mut(handle)?;
    for (tween, at, dur) in choreography {
        timeline.add_tween(tween, at, dur)?;
    }

    engine.bind_to_scroll(
        handle,
        ScrollRange::element("story-sections", "top top", "bottom bottom")?,
        BindOptions::new().pin_target("canvas-wrapper"),
    )?;
    Ok(vec![handle])
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitra_motion::headless::{ManualObserver, ManualScroller};

    #[test]
    fn test_model_follows_scroll() {
        let viewport = Size::new(1280.0, 800.0);
        let mut engine = Engine::new(
            scene(viewport),
            ManualScroller::new(viewport),
            ManualObserver::new(),
            MotionConfig::default(),
        );
        let handle = mount(&mut engine).unwrap()[0];
        assert!((engine.timeline(handle).unwrap().duration() - 5.7).abs() < 1e-9);
        assert_eq!(engine.reserved_space(), 3200.0);
        assert_eq!(engine.renderer().value(MODEL, "scale"), Some(&AnimatableValue::splat3(0.9)));

        engine.seek(handle, 1.0).unwrap();
        let scene = engine.renderer();
        assert_eq!(scene.value(MODEL, "scale"), Some(&AnimatableValue::splat3(1.15)));
        assert_eq!(scene.value(MODEL, "rotation.y"), Some(&AnimatableValue::f64(PI * 0.5)));
        assert_eq!(scene.value(MODEL, "position.z"), Some(&AnimatableValue::f64(1.2)));

        engine.scroller_mut().scroll_to(1600.0);
        engine.on_scroll().unwrap();
        assert!(engine.renderer().placement("canvas-wrapper").is_some());
        assert_eq!(engine.frame_subscription_count(), 1);
    }
}
