//! Report dashboard: stat cards and charts reveal once, staggered, when the
//! dashboard scrolls into view.

use mitra_motion::headless::HeadlessScene;
use mitra_motion::prelude::*;

use super::{Engine, ease, node, revealable};

const STAT_CARDS: usize = 3;
const CHARTS: usize = 4;
const REVEAL_DURATION: f64 = 0.9;
const STAT_STAGGER: f64 = 0.12;
const CHART_STAGGER: f64 = 0.15;
/// Charts sit lower in the dashboard, so they wait for more of it to show.
const CHART_THRESHOLD: f64 = 0.1;

pub(super) fn scene(viewport: Size) -> HeadlessScene {
    let Size { width: vw, height: vh } = viewport;
    let mut scene = HeadlessScene::new();

    node(&mut scene, "report-header", Rect::new(0.0, 0.0, vw, vh), &[]);
    node(&mut scene, "report", Rect::new(0.0, vh, vw, 1100.0), &[]);

    let card_width = vw / STAT_CARDS as f64;
    for i in 0..STAT_CARDS {
        let rect = Rect::new(i as f64 * card_width, vh + 40.0, card_width - 24.0, 160.0);
        node(&mut scene, &stat_card(i), rect, &revealable());
    }
    for i in 0..CHARTS {
        let row = (i / 2) as f64;
        let col = (i % 2) as f64;
        let rect = Rect::new(col * vw / 2.0, vh + 240.0 + row * 420.0, vw / 2.0 - 24.0, 400.0);
        node(&mut scene, &chart(i), rect, &revealable());
    }
    scene
}

pub(super) fn mount(engine: &mut Engine) -> Result<Vec<TimelineHandle>> {
    let cards: Vec<String> = (0..STAT_CARDS).map(stat_card).collect();
    let power3 = ease("power3.out")?;
    let stats = engine.create_timeline(TimelineConfig::new(
        REVEAL_DURATION + STAT_STAGGER * (STAT_CARDS - 1) as f64,
    ))?;
    engine
        .timeline_mut(stats)?
        .stagger(
            cards.clone(),
            &Tween::from("", "y", AnimatableValue::f64(24.0)).with_easing(power3),
            0.0,
            STAT_STAGGER,
            REVEAL_DURATION,
        )?
        .stagger(
            cards,
            &Tween::from("", "opacity", AnimatableValue::f64(0.0)).with_easing(power3),
            0.0,
            STAT_STAGGER,
            REVEAL_DURATION,
        )?;
    engine.bind_to_scroll(
        stats,
        ScrollRange::element("report", "top 90%", "bottom top")?,
        BindOptions::new(),
    )?;

    let charts: Vec<String> = (0..CHARTS).map(chart).collect();
    let back = ease("back.out(1.2)")?;
    let reveal = engine.create_timeline(TimelineConfig::new(
        REVEAL_DURATION + CHART_STAGGER * (CHARTS - 1) as f64,
    ))?;
    engine
        .timeline_mut(reveal)?
        .stagger(
            charts.clone(),
            &Tween::from("", "scale", AnimatableValue::f64(0.96)).with_easing(back),
            0.0,
            CHART_STAGGER,
            REVEAL_DURATION,
        )?
        .stagger(
            charts,
            &Tween::from("", "opacity", AnimatableValue::f64(0.0)).with_easing(back),
            0.0,
            CHART_STAGGER,
            REVEAL_DURATION,
        )?;
    engine.bind_to_scroll(
        reveal,
        ScrollRange::element("report", "top 80%", "bottom top")?,
        BindOptions::new().threshold(CHART_THRESHOLD),
    )?;

    Ok(vec![stats, reveal])
}

fn stat_card(index: usize) -> String {
    format!("stat-card-{}", index + 1)
}

fn chart(index: usize) -> String {
    format!("chart-{}", index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mitra_motion::headless::{ManualObserver, ManualScroller};

    #[test]
    fn test_dashboard_starts_hidden_and_observed() {
        let viewport = Size::new(1280.0, 800.0);
        let mut engine = Engine::new(
            scene(viewport),
            ManualScroller::new(viewport),
            ManualObserver::new(),
            MotionConfig::default(),
        );
        let timelines = mount(&mut engine).unwrap();
        assert_eq!(timelines.len(), 2);

        let scene = engine.renderer();
        assert_eq!(scene.value("stat-card-1", "y"), Some(&AnimatableValue::f64(24.0)));
        assert_eq!(scene.value("chart-4", "scale"), Some(&AnimatableValue::f64(0.96)));
        assert_eq!(scene.value("chart-4", "opacity"), Some(&AnimatableValue::f64(0.0)));

        let thresholds: Vec<f64> = engine
            .observer()
            .observations()
            .into_iter()
            .map(|(_, observation)| observation.threshold)
            .collect();
        assert_eq!(thresholds, vec![0.0, CHART_THRESHOLD]);
    }
}
