//! Rendering error types

use thiserror::Error;

/// Camera serialization failures
#[derive(Debug, Error)]
pub enum CameraError {
    /// JSON encoding or decoding failed
    #[error("Camera state JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Decoded state breaks a camera invariant
    #[error("Invalid camera state: {0}")]
    Invalid(String),
}

/// Render pipeline registration failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Raw layer index outside the canonical layer set
    #[error("Unknown render layer index {0}")]
    UnknownLayer(u8),

    /// No renderer carries the given name
    #[error("No renderer named '{0}'")]
    UnknownRenderer(String),
}

/// Errors produced by the rendering system and individual renderers
#[derive(Debug, Error)]
pub enum RenderError {
    /// Configuration failed validation
    #[error("Invalid render configuration: {0}")]
    InvalidConfig(String),

    /// The drawing surface cannot be drawn to
    #[error("Drawing surface unavailable: {0}")]
    SurfaceUnavailable(String),

    /// `initialize` was called twice
    #[error("Rendering system already initialized")]
    AlreadyInitialized,

    /// A renderer failed while drawing
    #[error("Renderer '{renderer}' failed: {reason}")]
    RendererFailed {
        /// Renderer name
        renderer: String,
        /// Failure description
        reason: String,
    },

    /// A renderer panicked while drawing
    #[error("Renderer '{renderer}' panicked: {reason}")]
    Panicked {
        /// Renderer name
        renderer: String,
        /// Panic payload, when it was a string
        reason: String,
    },

    /// Pipeline registration error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Camera error
    #[error(transparent)]
    Camera(#[from] CameraError),
}

impl RenderError {
    /// Convenience constructor for renderer failures
    pub fn renderer(renderer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::RendererFailed {
            renderer: renderer.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
