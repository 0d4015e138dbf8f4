//! Error types for the scroll timeline engine.

use thiserror::Error;

use crate::types::{BindingHandle, Handle, PropertyPath, TargetId};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, MotionError>;

/// Errors raised by a `Renderer` implementation.
///
/// The engine never masks these; they propagate to whoever drove the update.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    /// The target does not exist (or no longer exists) in the render tree.
    #[error("render target `{0}` not found")]
    MissingTarget(TargetId),

    /// The target exists but has no such property.
    #[error("render target `{target}` has no property `{property}`")]
    MissingProperty {
        target: TargetId,
        property: PropertyPath,
    },

    /// Backend specific failure.
    #[error("renderer failure: {0}")]
    Backend(String),
}

/// Errors that can occur while building or driving timelines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Malformed offsets, durations or scroll range.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// A second pin was requested on an element whose pinned region overlaps.
    #[error("element `{target}` is already pinned by binding {owner:?}")]
    ConflictingPin {
        target: TargetId,
        owner: BindingHandle,
    },

    /// Operation attempted on a destroyed timeline or binding.
    #[error("stale handle {0:?}")]
    StaleBinding(Handle),

    /// Start and end values of a tween cannot be interpolated.
    #[error("cannot interpolate `{property}` on `{target}` from {from} to {to}")]
    ValueMismatch {
        target: TargetId,
        property: PropertyPath,
        from: &'static str,
        to: &'static str,
    },

    /// Unrecognized ease name.
    #[error("invalid easing `{0}`")]
    InvalidEasing(String),

    /// Unrecognized scroll anchor, toggle action or relative offset.
    #[error("invalid anchor `{0}`")]
    InvalidAnchor(String),

    #[error(transparent)]
    Render(#[from] RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_error_converts() {
        let err: MotionError = RenderError::MissingTarget(TargetId::from("hero")).into();
        assert_eq!(err.to_string(), "render target `hero` not found");
    }

    #[test]
    fn test_conflicting_pin_message() {
        let err = MotionError::ConflictingPin {
            target: TargetId::from("roadmap"),
            owner: BindingHandle(4),
        };
        assert_eq!(
            err.to_string(),
            "element `roadmap` is already pinned by binding BindingHandle(4)"
        );
    }
}
