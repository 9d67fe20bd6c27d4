//! Rendering subsystem
//!
//! Camera, drawing-surface abstraction, render layers, the fault-contained
//! pipeline, the built-in renderers and the [`RenderingSystem`] composition
//! root that wires them together.

pub mod camera;
pub mod error;
pub mod game_state;
pub mod layer;
pub mod pipeline;
pub mod renderer;
pub mod renderers;
pub mod rendering_system;
pub mod surface;

pub use camera::{Camera, CameraState, Interpolatable, Pose, WorldBounds};
pub use error::{CameraError, PipelineError, RenderError, RenderResult};
pub use game_state::{Element, ElementData, GameState, Segment, Snake, Station};
pub use layer::RenderLayer;
pub use pipeline::{PipelineMetrics, RenderPipeline, RendererFault, RendererKey};
pub use renderer::{Renderer, RendererMetrics};
pub use rendering_system::{FrameTimings, InitOptions, RenderingSystem};
pub use surface::{
    Color, CompositeMode, DrawCommand, DrawSurface, GradientStop, ImageHandle, LinearGradient, Paint,
    RadialGradient, RecordingSurface, TextAlign,
};
