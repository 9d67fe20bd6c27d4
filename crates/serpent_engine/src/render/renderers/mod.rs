//! Built-in renderers
//!
//! | Renderer                | Layer          | Margin key   |
//! |-------------------------|----------------|--------------|
//! | [`BackgroundRenderer`]  | `Background`   | `decoration` |
//! | [`ElementRenderer`]     | `GameObjects`  | `element`    |
//! | [`SnakeRenderer`]       | `Entities`     | `snake`      |
//! | [`ParticleRenderer`]    | `Particles`    | `particle`   |
//! | [`BorderRenderer`]      | `UiOverlay`    | `border`     |
//!
//! Every renderer has a desktop and a mobile path. The mobile path drops
//! shadows, additive glow, sparkles and tiled parallax.

pub mod background;
pub mod border;
pub mod element;
pub mod particle;
pub mod snake;

pub use background::BackgroundRenderer;
pub use border::BorderRenderer;
pub use element::ElementRenderer;
pub use particle::ParticleRenderer;
pub use snake::{segment_size, SnakeRenderer};

use crate::foundation::math::Vec2;
use crate::render::camera::Camera;
use crate::render::error::{RenderError, RenderResult};

/// Fail instead of drawing through a camera with a non-finite position or zoom
pub(crate) fn ensure_usable_camera(camera: &Camera, renderer: &str) -> RenderResult<()> {
    let position = camera.position();
    let zoom = camera.zoom();
    if position.x.is_finite() && position.y.is_finite() && zoom.is_finite() && zoom > 0.0 {
        return Ok(());
    }
    Err(RenderError::renderer(
        renderer,
        format!("unusable camera at ({}, {}) with zoom {}", position.x, position.y, zoom),
    ))
}

/// Vertices of a star polygon, alternating outer and inner radius
pub(crate) fn star_points(center: Vec2, outer: f32, inner: f32, points: usize, rotation: f32) -> Vec<Vec2> {
    let count = points.max(2) * 2;
    (0..count)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = rotation - std::f32::consts::FRAC_PI_2
                + i as f32 * std::f32::consts::PI / points.max(2) as f32;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}
