//! Renderer trait shared by every draw strategy

use std::any::Any;

use super::camera::Camera;
use super::error::RenderResult;
use super::game_state::GameState;
use super::surface::DrawSurface;

/// Counters a renderer reports about its last frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RendererMetrics {
    /// Primitive draw calls issued
    pub draw_calls: usize,
    /// Entities skipped by viewport culling
    pub culled: usize,
    /// Entities considered
    pub total: usize,
}

impl RendererMetrics {
    /// Entities actually drawn
    pub const fn drawn(&self) -> usize {
        self.total.saturating_sub(self.culled)
    }
}

/// Draw strategy plugged into the render pipeline
///
/// Renderers read the game state and camera and issue draw calls; they never
/// mutate the camera or game state. Time-dependent internal state is advanced
/// outside of [`Renderer::render`].
pub trait Renderer: Any {
    /// Diagnostic name; anonymous renderers get one assigned on registration
    fn name(&self) -> Option<&str> {
        None
    }

    /// Opt-in whole-renderer culling
    fn should_render(&self, _camera: &Camera, _state: &GameState) -> bool {
        true
    }

    /// Draw one frame
    fn render(
        &mut self,
        surface: &mut dyn DrawSurface,
        state: &GameState,
        camera: &Camera,
        interpolation: f32,
    ) -> RenderResult<()>;

    /// Counters from the last [`Renderer::render`]
    fn metrics(&self) -> Option<RendererMetrics> {
        None
    }

    /// Upcast for downcasting to the concrete renderer
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for downcasting to the concrete renderer
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
