//! One-shot enter/leave triggers.
//!
//! A trigger turns a stream of "inside / outside" observations into
//! edge events. The state machine is:
//!
//! ```text
//!   Idle ──inside──► Entering ──► Active ──outside──► Leaving ──► Done
//!    ▲                                                   │
//!    └──────────────────── restartable ──────────────────┘
//! ```
//!
//! `Entering` and `Leaving` name the edges themselves: `Trigger::update`
//! reports each edge exactly once and settles on `Active`, `Idle` or `Done`
//! before returning, so `Trigger::state` never reports them. Repeated
//! observations on the same side of the threshold never fire again.
//!
//! Which playback action runs on each edge is described by `ToggleActions`,
//! parsed from the familiar four-word notation:
//!
//! ```
//! use mitra_motion::trigger::{ToggleAction, ToggleActions};
//!
//! let actions: ToggleActions = "play none none reverse".parse().unwrap();
//! assert_eq!(actions.on_enter, ToggleAction::Play);
//! assert_eq!(actions.on_leave_back, ToggleAction::Reverse);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::MotionError;
use crate::types::ScrollDirection;

/// Lifecycle state of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    #[default]
    Idle,
    /// The enter edge. Reported as `TriggerTransition::Enter`, never held.
    Entering,
    Active,
    /// The leave edge. Reported as `TriggerTransition::Leave`, never held.
    Leaving,
    /// Terminal unless the trigger is restartable.
    Done,
}

/// Edge reported by `Trigger::update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerTransition {
    Enter,
    Leave,
}

/// Visibility state machine for one binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    state: TriggerState,
    threshold: f64,
    restartable: bool,
}

impl Trigger {
    /// Create an idle trigger. `threshold` is clamped to `[0, 1]`.
    pub fn new(threshold: f64, restartable: bool) -> Self {
        Self {
            state: TriggerState::Idle,
            threshold: if threshold.is_finite() {
                threshold.clamp(0.0, 1.0)
            } else {
                0.0
            },
            restartable,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_restartable(&self) -> bool {
        self.restartable
    }

    /// Whether an intersection ratio counts as inside.
    ///
    /// A zero threshold means "any part visible".
    pub fn is_inside(&self, ratio: f64) -> bool {
        if self.threshold <= 0.0 {
            ratio > 0.0
        } else {
            ratio >= self.threshold
        }
    }

    /// Feed an intersection ratio.
    pub fn observe_ratio(&mut self, ratio: f64, direction: ScrollDirection) -> Option<TriggerTransition> {
        let inside = self.is_inside(ratio);
        self.update(inside, direction)
    }

    /// Feed an inside/outside observation and report the edge it causes.
    pub fn update(&mut self, inside: bool, direction: ScrollDirection) -> Option<TriggerTransition> {
        match (self.state, inside) {
            (TriggerState::Idle, true) => {
                trace!(?direction, "trigger entering");
                self.state = TriggerState::Active;
                Some(TriggerTransition::Enter)
            }
            (TriggerState::Active, false) => {
                trace!(?direction, "trigger leaving");
                self.state = if self.restartable {
                    TriggerState::Idle
                } else {
                    TriggerState::Done
                };
                Some(TriggerTransition::Leave)
            }
            _ => None,
        }
    }

    /// Return to `Idle` without firing anything.
    pub fn reset(&mut self) {
        self.state = TriggerState::Idle;
    }
}

/// Playback action run when a trigger edge fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleAction {
    /// Play forward from the current position.
    Play,
    Pause,
    /// Continue a paused playback in its previous direction.
    Resume,
    /// Play backward from the current position.
    Reverse,
    /// Jump to the start and play forward.
    Restart,
    /// Jump to the start and stop.
    Reset,
    /// Jump to the end and stop.
    Complete,
    #[default]
    None,
}

impl FromStr for ToggleAction {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "play" => Ok(Self::Play),
            "pause" => Ok(Self::Pause),
            "resume" => Ok(Self::Resume),
            "reverse" => Ok(Self::Reverse),
            "restart" => Ok(Self::Restart),
            "reset" => Ok(Self::Reset),
            "complete" => Ok(Self::Complete),
            "none" => Ok(Self::None),
            other => Err(MotionError::InvalidAnchor(format!(
                "unknown toggle action `{other}`"
            ))),
        }
    }
}

impl fmt::Display for ToggleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::Reverse => "reverse",
            Self::Restart => "restart",
            Self::Reset => "reset",
            Self::Complete => "complete",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Actions for the four trigger crossings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleActions {
    /// Entering while scrolling forward.
    pub on_enter: ToggleAction,
    /// Leaving while scrolling forward (scrolled past).
    pub on_leave: ToggleAction,
    /// Entering while scrolling backward (coming back from below).
    pub on_enter_back: ToggleAction,
    /// Leaving while scrolling backward (scrolled back above).
    pub on_leave_back: ToggleAction,
}

impl Default for ToggleActions {
    /// `play none none none`
    fn default() -> Self {
        Self {
            on_enter: ToggleAction::Play,
            on_leave: ToggleAction::None,
            on_enter_back: ToggleAction::None,
            on_leave_back: ToggleAction::None,
        }
    }
}

impl ToggleActions {
    /// Action for an edge observed while scrolling in `direction`.
    pub fn action_for(&self, transition: TriggerTransition, direction: ScrollDirection) -> ToggleAction {
        match (transition, direction) {
            (TriggerTransition::Enter, ScrollDirection::Forward) => self.on_enter,
            (TriggerTransition::Enter, ScrollDirection::Backward) => self.on_enter_back,
            (TriggerTransition::Leave, ScrollDirection::Forward) => self.on_leave,
            (TriggerTransition::Leave, ScrollDirection::Backward) => self.on_leave_back,
        }
    }
}

impl FromStr for ToggleActions {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let words: Vec<&str> = s.split_whitespace().collect();
        let [enter, leave, enter_back, leave_back] = words.as_slice() else {
            return Err(MotionError::InvalidAnchor(format!(
                "toggle actions need four words, got `{s}`"
            )));
        };
        Ok(Self {
            on_enter: enter.parse()?,
            on_leave: leave.parse()?,
            on_enter_back: enter_back.parse()?,
            on_leave_back: leave_back.parse()?,
        })
    }
}

impl fmt::Display for ToggleActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.on_enter, self.on_leave, self.on_enter_back, self.on_leave_back
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_leave_fire_once() {
        let mut trigger = Trigger::new(0.0, false);
        assert_eq!(
            trigger.update(true, ScrollDirection::Forward),
            Some(TriggerTransition::Enter)
        );
        assert_eq!(trigger.state(), TriggerState::Active);
        assert_eq!(trigger.update(true, ScrollDirection::Forward), None);

        assert_eq!(
            trigger.update(false, ScrollDirection::Forward),
            Some(TriggerTransition::Leave)
        );
        assert_eq!(trigger.state(), TriggerState::Done);
        assert_eq!(trigger.update(false, ScrollDirection::Forward), None);
    }

    #[test]
    fn test_done_is_terminal_without_restart() {
        let mut trigger = Trigger::new(0.0, false);
        trigger.update(true, ScrollDirection::Forward);
        trigger.update(false, ScrollDirection::Forward);
        assert_eq!(trigger.update(true, ScrollDirection::Backward), None);
        assert_eq!(trigger.state(), TriggerState::Done);
    }

    #[test]
    fn test_restartable_fires_once_per_crossing() {
        let mut trigger = Trigger::new(0.5, true);
        let mut enters = 0;
        let mut leaves = 0;
        let crossings = 25;

        for i in 0..crossings {
            let direction = if i % 2 == 0 {
                ScrollDirection::Forward
            } else {
                ScrollDirection::Backward
            };
            // Jitter on each side of the threshold must not re-fire.
            for ratio in [0.6, 0.9, 0.5, 1.0] {
                if trigger.observe_ratio(ratio, direction) == Some(TriggerTransition::Enter) {
                    enters += 1;
                }
            }
            for ratio in [0.4, 0.1, 0.0, 0.49] {
                if trigger.observe_ratio(ratio, direction) == Some(TriggerTransition::Leave) {
                    leaves += 1;
                }
            }
        }

        assert_eq!(enters, crossings);
        assert_eq!(leaves, crossings);
        assert_eq!(trigger.state(), TriggerState::Idle);
    }

    #[test]
    fn test_zero_threshold_needs_visible_pixels() {
        let trigger = Trigger::new(0.0, false);
        assert!(!trigger.is_inside(0.0));
        assert!(trigger.is_inside(0.01));

        let trigger = Trigger::new(0.3, false);
        assert!(!trigger.is_inside(0.29));
        assert!(trigger.is_inside(0.3));
    }

    #[test]
    fn test_threshold_is_clamped() {
        assert_eq!(Trigger::new(4.0, false).threshold(), 1.0);
        assert_eq!(Trigger::new(f64::NAN, false).threshold(), 0.0);
    }

    #[test]
    fn test_toggle_actions_parse() {
        let actions: ToggleActions = "play none none reverse".parse().unwrap();
        assert_eq!(actions.on_enter, ToggleAction::Play);
        assert_eq!(actions.on_leave, ToggleAction::None);
        assert_eq!(actions.on_enter_back, ToggleAction::None);
        assert_eq!(actions.on_leave_back, ToggleAction::Reverse);
        assert_eq!(actions.to_string(), "play none none reverse");

        assert!(matches!(
            "play none".parse::<ToggleActions>(),
            Err(MotionError::InvalidAnchor(_))
        ));
        assert!(matches!(
            "play none none bounce".parse::<ToggleActions>(),
            Err(MotionError::InvalidAnchor(_))
        ));
    }

    #[test]
    fn test_action_for_direction() {
        let actions: ToggleActions = "restart pause resume reset".parse().unwrap();
        assert_eq!(
            actions.action_for(TriggerTransition::Enter, ScrollDirection::Forward),
            ToggleAction::Restart
        );
        assert_eq!(
            actions.action_for(TriggerTransition::Leave, ScrollDirection::Forward),
            ToggleAction::Pause
        );
        assert_eq!(
            actions.action_for(TriggerTransition::Enter, ScrollDirection::Backward),
            ToggleAction::Resume
        );
        assert_eq!(
            actions.action_for(TriggerTransition::Leave, ScrollDirection::Backward),
            ToggleAction::Reset
        );
    }
}
