//! EcoMitra motion configuration
//!
//! Centralized settings for the scroll timeline engine and the headless
//! walkthrough, loaded from `mitra.toml` with `MITRA_*` environment overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

fn invalid(key: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.into(),
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MitraConfig {
    /// Engine defaults
    pub motion: MotionConfig,
    /// Headless walkthrough settings
    pub walkthrough: WalkthroughConfig,
}

/// Defaults applied by the scroll timeline engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Intersection ratio used when a binding does not specify one
    pub default_threshold: f64,
    /// Distance below which a scrubbed progress snaps to its target
    pub settle_epsilon: f64,
    /// Upper bound on a single frame delta in seconds
    pub max_frame_delta: f64,
    /// Playback speed used by toggle actions
    pub default_speed: f64,
}

/// Headless walkthrough configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkthroughConfig {
    /// Page to walk through (home, about, features, brief, prototype, report). All when unset.
    pub page: Option<String>,
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Pixels scrolled per step
    pub scroll_step: f64,
    /// Frame delta in seconds between steps
    pub frame_delta: f64,
    /// Scroll back to the top after reaching the bottom
    pub round_trip: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            default_threshold: 0.0,
            settle_epsilon: 1e-4,
            max_frame_delta: 0.1,
            default_speed: 1.0,
        }
    }
}

impl Default for WalkthroughConfig {
    fn default() -> Self {
        Self {
            page: None,
            viewport_width: 1280.0,
            viewport_height: 800.0,
            scroll_step: 120.0,
            frame_delta: 1.0 / 60.0,
            round_trip: true,
        }
    }
}

impl MotionConfig {
    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.default_threshold) {
            return Err(invalid(
                "motion.default_threshold",
                format!("must be within [0, 1], got {}", self.default_threshold),
            ));
        }
        if !self.settle_epsilon.is_finite() || self.settle_epsilon < 0.0 {
            return Err(invalid(
                "motion.settle_epsilon",
                format!("must be finite and >= 0, got {}", self.settle_epsilon),
            ));
        }
        if !self.max_frame_delta.is_finite() || self.max_frame_delta < 0.0 {
            return Err(invalid(
                "motion.max_frame_delta",
                format!("must be finite and >= 0, got {}", self.max_frame_delta),
            ));
        }
        if !self.default_speed.is_finite() || self.default_speed <= 0.0 {
            return Err(invalid(
                "motion.default_speed",
                format!("must be finite and > 0, got {}", self.default_speed),
            ));
        }
        Ok(())
    }

    /// Copy with every invalid field replaced by its default.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut config = self.clone();
        if !(0.0..=1.0).contains(&config.default_threshold) {
            config.default_threshold = defaults.default_threshold;
        }
        if !config.settle_epsilon.is_finite() || config.settle_epsilon < 0.0 {
            config.settle_epsilon = defaults.settle_epsilon;
        }
        if !config.max_frame_delta.is_finite() || config.max_frame_delta < 0.0 {
            config.max_frame_delta = defaults.max_frame_delta;
        }
        if !config.default_speed.is_finite() || config.default_speed <= 0.0 {
            config.default_speed = defaults.default_speed;
        }
        config
    }
}

impl WalkthroughConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.viewport_width.is_finite() || self.viewport_width <= 0.0 {
            return Err(invalid("walkthrough.viewport_width", "must be positive"));
        }
        if !self.viewport_height.is_finite() || self.viewport_height <= 0.0 {
            return Err(invalid("walkthrough.viewport_height", "must be positive"));
        }
        if !self.scroll_step.is_finite() || self.scroll_step <= 0.0 {
            return Err(invalid(
                "walkthrough.scroll_step",
                format!("must be positive, got {}", self.scroll_step),
            ));
        }
        if !self.frame_delta.is_finite() || self.frame_delta <= 0.0 {
            return Err(invalid(
                "walkthrough.frame_delta",
                format!("must be positive, got {}", self.frame_delta),
            ));
        }
        Ok(())
    }
}

fn env_flag(val: &str) -> bool {
    val == "1" || val.eq_ignore_ascii_case("true")
}

fn env_f64(name: &str) -> Option<f64> {
    std::env::var(name).ok()?.parse::<f64>().ok()
}

impl MitraConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration from `mitra.toml` in the current directory
    /// or return default configuration if the file doesn't exist
    pub fn load_or_default() -> Self {
        Self::load_from_file("mitra.toml").unwrap_or_default()
    }

    /// Merge configuration with environment variables
    ///
    /// Environment variables take precedence over configuration file values.
    pub fn merge_with_env(&mut self) {
        if let Some(threshold) = env_f64("MITRA_THRESHOLD") {
            self.motion.default_threshold = threshold.clamp(0.0, 1.0);
        }
        if let Some(epsilon) = env_f64("MITRA_SETTLE_EPSILON") {
            self.motion.settle_epsilon = epsilon.abs();
        }
        if let Some(delta) = env_f64("MITRA_MAX_FRAME_DELTA") {
            self.motion.max_frame_delta = delta;
        }
        if let Some(speed) = env_f64("MITRA_SPEED") {
            self.motion.default_speed = speed;
        }

        if let Ok(page) = std::env::var("MITRA_PAGE") {
            self.walkthrough.page = Some(page);
        }
        if let Some(width) = env_f64("MITRA_VIEWPORT_WIDTH") {
            self.walkthrough.viewport_width = width;
        }
        if let Some(height) = env_f64("MITRA_VIEWPORT_HEIGHT") {
            self.walkthrough.viewport_height = height;
        }
        if let Some(step) = env_f64("MITRA_SCROLL_STEP") {
            self.walkthrough.scroll_step = step;
        }
        if let Some(delta) = env_f64("MITRA_FRAME_DELTA") {
            self.walkthrough.frame_delta = delta;
        }
        if let Ok(val) = std::env::var("MITRA_ROUND_TRIP") {
            self.walkthrough.round_trip = env_flag(&val);
        }
    }

    /// Load configuration with environment variable overrides
    ///
    /// 1. Load from mitra.toml (or use defaults if not found)
    /// 2. Override with environment variables if present
    pub fn load() -> Self {
        let mut config = Self::load_or_default();
        config.merge_with_env();
        config
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.motion.validate()?;
        self.walkthrough.validate()
    }
}
