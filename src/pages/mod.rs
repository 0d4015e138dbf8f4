//! Pitch-site pages rebuilt on the motion engine.
//!
//! Each page lays out a headless scene with the nodes its motion touches and
//! mounts its timelines and scroll bindings on an engine.

use std::fmt;
use std::str::FromStr;

use mitra_motion::headless::{HeadlessScene, ManualObserver, ManualScroller};
use mitra_motion::prelude::*;

mod about;
mod brief;
mod features;
mod home;
mod prototype;
mod report;

/// Engine wired to the in-memory collaborators.
pub type Engine = ScrollTimelineEngine<HeadlessScene, ManualScroller, ManualObserver>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Home,
    About,
    Features,
    Brief,
    Prototype,
    Report,
}

impl PageKind {
    pub const ALL: [PageKind; 6] = [
        PageKind::Home,
        PageKind::About,
        PageKind::Features,
        PageKind::Brief,
        PageKind::Prototype,
        PageKind::Report,
    ];

    /// Lay out the nodes this page animates.
    pub fn scene(self, viewport: Size) -> HeadlessScene {
        match self {
            Self::Home => home::scene(viewport),
            Self::About => about::scene(viewport),
            Self::Features => features::scene(viewport),
            Self::Brief => brief::scene(viewport),
            Self::Prototype => prototype::scene(viewport),
            Self::Report => report::scene(viewport),
        }
    }

    /// Create the page's timelines and bindings.
    pub fn mount(self, engine: &mut Engine) -> Result<Vec<TimelineHandle>> {
        match self {
            Self::Home => home::mount(engine),
            Self::About => about::mount(engine),
            Self::Features => features::mount(engine),
            Self::Brief => brief::mount(engine),
            Self::Prototype => prototype::mount(engine),
            Self::Report => report::mount(engine),
        }
    }
}

impl FromStr for PageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "about" => Ok(Self::About),
            "features" => Ok(Self::Features),
            "brief" => Ok(Self::Brief),
            "prototype" => Ok(Self::Prototype),
            "report" => Ok(Self::Report),
            other => anyhow::bail!(
                "unknown page `{other}` (expected home, about, features, brief, prototype or report)"
            ),
        }
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Features => "features",
            Self::Brief => "brief",
            Self::Prototype => "prototype",
            Self::Report => "report",
        };
        f.write_str(name)
    }
}

/// Pages selected by the `page` setting; every page when unset.
pub fn select(page: Option<&str>) -> anyhow::Result<Vec<PageKind>> {
    match page {
        Some(name) => Ok(vec![name.parse()?]),
        None => Ok(PageKind::ALL.to_vec()),
    }
}

/// Add a node with authored values.
fn node(scene: &mut HeadlessScene, id: &str, layout: Rect, values: &[(&str, AnimatableValue)]) {
    scene.insert_node(id, layout);
    for (path, value) in values {
        scene.set_value(id, *path, value.clone());
    }
}

/// Authored values of a block that fades and slides in.
fn revealable() -> [(&'static str, AnimatableValue); 3] {
    [
        ("opacity", AnimatableValue::f64(1.0)),
        ("y", AnimatableValue::f64(0.0)),
        ("scale", AnimatableValue::f64(1.0)),
    ]
}

fn ease(name: &str) -> Result<EasingFunction> {
    name.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_names_round_trip() {
        for page in PageKind::ALL {
            assert_eq!(page.to_string().parse::<PageKind>().unwrap(), page);
        }
        assert!("login".parse::<PageKind>().is_err());
    }

    #[test]
    fn test_select() {
        assert_eq!(select(None).unwrap().len(), PageKind::ALL.len());
        assert_eq!(select(Some("report")).unwrap(), vec![PageKind::Report]);
        assert_eq!(select(Some("Brief")).unwrap(), vec![PageKind::Brief]);
    }

    #[test]
    fn test_every_page_mounts() {
        let viewport = Size::new(1280.0, 800.0);
        for page in PageKind::ALL {
            let mut engine = Engine::new(
                page.scene(viewport),
                ManualScroller::new(viewport),
                ManualObserver::new(),
                MotionConfig::default(),
            );
            let timelines = page.mount(&mut engine).unwrap();
            assert!(!timelines.is_empty(), "{page} mounted nothing");
            assert_eq!(engine.timeline_count(), timelines.len());
        }
    }
}
