//! Brief page: a pinned section whose slide track scrolls horizontally as
//! the page scrolls vertically. A progress bar follows the track and each
//! slide fades its copy in as it passes the viewport center.

use mitra_motion::headless::HeadlessScene;
use mitra_motion::prelude::*;
use tracing::trace;

use super::{Engine, ease, node, revealable};

const SLIDES: usize = 4;
const SCRUB_LAG: f64 = 1.0;
const COPY_STAGGER: f64 = 0.1;
const COPY_DURATION: f64 = 1.0;

pub(super) fn scene(viewport: Size) -> HeadlessScene {
    let Size { width: vw, height: vh } = viewport;
    let mut scene = HeadlessScene::new();

    node(&mut scene, "brief-intro", Rect::new(0.0, 0.0, vw, vh), &[]);
    node(&mut scene, "brief", Rect::new(0.0, vh, vw, vh), &[]);
    node(
        &mut scene,
        "brief-track",
        Rect::new(0.0, vh, vw * SLIDES as f64, vh),
        &[(
            "transform",
            AnimatableValue::Transform {
                transform: AnimatableTransform::default(),
            },
        )],
    );
    node(
        &mut scene,
        "brief-progress",
        Rect::new(0.0, vh, vw, 4.0),
        &[("scale-x", AnimatableValue::f64(0.0))],
    );

    for i in 0..SLIDES {
        let x = vw * i as f64;
        node(&mut scene, &slide_part(i, "title"), Rect::new(x + 80.0, vh + 200.0, vw - 160.0, 120.0), &revealable());
        node(&mut scene, &slide_part(i, "desc"), Rect::new(x + 80.0, vh + 360.0, vw - 160.0, 200.0), &revealable());
    }
    node(&mut scene, "brief-outro", Rect::new(0.0, vh * 2.0, vw, vh), &[]);
    scene
}

pub(super) fn mount(engine: &mut Engine) -> Result<Vec<TimelineHandle>> {
    let viewport = engine.scroller().viewport;
    let track = engine.renderer().measure(&TargetId::from("brief-track"))?;
    let overflow = (track.width - viewport.width).max(0.0);

    // Horizontal track, scrubbed with lag and pinned for its overflow.
    let scroll = engine.create_timeline(TimelineConfig::new(1.0).scrub(SCRUB_LAG).pinned())?;
    engine
        .timeline_mut(scroll)?
        .add_tween(
            Tween::to(
                "brief-track",
                "transform",
                AnimatableValue::Transform {
                    transform: AnimatableTransform::translate(-overflow, 0.0),
                },
            )
            .with_easing(EasingFunction::Linear),
            0.0,
            1.0,
        )?
        .add_tween(
            Tween::to("brief-progress", "scale-x", AnimatableValue::f64(1.0))
                .with_easing(EasingFunction::Linear),
            0.0,
            1.0,
        )?;
    let binding = engine.bind_to_scroll(
        scroll,
        ScrollRange::horizontal("brief", "top top", "brief-track")?,
        BindOptions::new().on_update(|binding, progress| {
            trace!(?binding, progress, "brief track progress");
        }),
    )?;
    let section = engine.binding_range(binding)?;

    let mut timelines = vec![scroll];
    let copy_ease = ease("power3.out")?;
    let actions: ToggleActions = "play reverse play reverse".parse()?;
    let duration = COPY_DURATION + COPY_STAGGER;

    for i in 0..SLIDES {
        let parts = [slide_part(i, "title"), slide_part(i, "desc")];
        let handle = engine.create_timeline(TimelineConfig::new(duration).restartable(true))?;
        engine
            .timeline_mut(handle)?
            .stagger(
                parts.clone(),
                &Tween::from_to("", "opacity", AnimatableValue::f64(0.0), AnimatableValue::f64(1.0))
                    .with_easing(copy_ease),
                0.0,
                COPY_STAGGER,
                COPY_DURATION,
            )?
            .stagger(
                parts,
                &Tween::from_to("", "y", AnimatableValue::f64(60.0), AnimatableValue::f64(0.0))
                    .with_easing(copy_ease),
                0.0,
                COPY_STAGGER,
                COPY_DURATION,
            )?;

        // Slide `i` is centered while the track has moved between its left
        // and right edges minus half a viewport.
        let (start, end) = slide_window(section.start, i, viewport.width);
        engine.bind_to_scroll(
            handle,
            ScrollRange::fixed(start.max(0.0), end),
            BindOptions::new().actions(actions).on_leave(move |binding, direction| {
                trace!(?binding, ?direction, slide = i, "slide left center");
            }),
        )?;
        timelines.push(handle);
    }
    Ok(timelines)
}

fn slide_part(slide: usize, part: &str) -> String {
    format!("brief-slide-{}-{part}", slide + 1)
}

/// Scroll offsets over which slide `index` spans the viewport center.
fn slide_window(section_start: f64, index: usize, viewport_width: f64) -> (f64, f64) {
    let left = section_start + index as f64 * viewport_width - viewport_width / 2.0;
    (left, left + viewport_width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitra_motion::headless::{ManualObserver, ManualScroller};

    fn engine() -> Engine {
        let viewport = Size::new(1280.0, 800.0);
        Engine::new(
            scene(viewport),
            ManualScroller::new(viewport),
            ManualObserver::new(),
            MotionConfig::default(),
        )
    }

    #[test]
    fn test_slide_window() {
        assert_eq!(slide_window(800.0, 0, 1280.0), (160.0, 1440.0));
        assert_eq!(slide_window(800.0, 1, 1280.0), (1440.0, 2720.0));
    }

    #[test]
    fn test_track_reserves_overflow() {
        let mut engine = engine();
        let timelines = mount(&mut engine).unwrap();
        assert_eq!(timelines.len(), 1 + SLIDES);
        assert_eq!(engine.reserved_space(), 1280.0 * 3.0);
        assert_eq!(engine.renderer().value("brief-slide-1-title", "opacity"), Some(&AnimatableValue::f64(0.0)));
    }

    #[test]
    fn test_second_slide_enters_mid_track() {
        let mut engine = engine();
        let timelines = mount(&mut engine).unwrap();
        engine.drain_events().for_each(drop);

        engine.scroller_mut().scroll_to(2000.0);
        engine.on_scroll().unwrap();
        let entered: Vec<TimelineHandle> = engine
            .drain_events()
            .filter_map(|event| match event {
                MotionEvent::TriggerEntered { timeline, .. } => Some(timeline),
                _ => None,
            })
            .collect();
        assert_eq!(entered, vec![timelines[0], timelines[2]]);
        assert!(engine.renderer().placement("brief").is_some());
    }
}
