//! Border renderer: arena edge, proximity warning and ambient edge particles

use std::any::Any;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::foundation::math::Vec2;
use crate::particles::BorderParticle;
use crate::render::camera::{Camera, WorldBounds};
use crate::render::error::RenderResult;
use crate::render::game_state::GameState;
use crate::render::renderer::{Renderer, RendererMetrics};
use crate::render::surface::{Color, CompositeMode, DrawSurface, LinearGradient};

use super::ensure_usable_camera;

/// World distance from an edge at which the warning starts to show
const WARNING_DISTANCE: f32 = 600.0;

/// Peak opacity of the warning gradient
const WARNING_ALPHA: f32 = 0.45;

/// Screen depth of the warning gradient
const WARNING_DEPTH: f32 = 120.0;

/// Draws the arena boundary
#[derive(Debug, Clone)]
pub struct BorderRenderer {
    mobile: bool,
    bounds: WorldBounds,
    particles: Vec<BorderParticle>,
    color: Color,
    warning: Color,
    metrics: RendererMetrics,
}

impl BorderRenderer {
    /// Registered name
    pub const NAME: &'static str = "border";

    /// Border around `bounds` with `particles_per_edge` ambient particles on each edge
    pub fn new(bounds: WorldBounds, particles_per_edge: usize, mobile: bool, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            mobile,
            bounds,
            particles: BorderParticle::along_edges(&bounds, particles_per_edge, &mut rng),
            color: Color::rgb(255, 60, 90),
            warning: Color::rgb(255, 30, 60),
            metrics: RendererMetrics::default(),
        }
    }

    /// Arena bounds
    pub const fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    /// Ambient particles
    pub fn particles(&self) -> &[BorderParticle] {
        &self.particles
    }

    fn draw_edge(&mut self, surface: &mut dyn DrawSurface, camera: &Camera) {
        let corners = [
            (self.bounds.min_x, self.bounds.min_y),
            (self.bounds.max_x, self.bounds.min_y),
            (self.bounds.max_x, self.bounds.max_y),
            (self.bounds.min_x, self.bounds.max_y),
            (self.bounds.min_x, self.bounds.min_y),
        ];
        let outline: Vec<Vec2> = corners
            .iter()
            .map(|&(x, y)| camera.world_to_screen(x, y))
            .collect();
        let width = (4.0 * camera.zoom()).max(1.0);

        if !self.mobile {
            surface.save();
            surface.set_shadow(self.color, 24.0);
            surface.set_alpha(0.35);
            surface.stroke_polyline(&outline, &self.color.into(), width * 4.0);
            surface.restore();
            self.metrics.draw_calls += 1;
        }
        surface.stroke_polyline(&outline, &self.color.into(), width);
        self.metrics.draw_calls += 1;
    }

    fn draw_warning(&mut self, surface: &mut dyn DrawSurface, camera: &Camera) {
        let position = camera.position();
        let (width, height) = (surface.width(), surface.height());
        let edges = [
            (position.x - self.bounds.min_x, Vec2::new(0.0, 0.0), Vec2::new(WARNING_DEPTH, 0.0), true),
            (self.bounds.max_x - position.x, Vec2::new(width, 0.0), Vec2::new(width - WARNING_DEPTH, 0.0), true),
            (position.y - self.bounds.min_y, Vec2::new(0.0, 0.0), Vec2::new(0.0, WARNING_DEPTH), false),
            (self.bounds.max_y - position.y, Vec2::new(0.0, height), Vec2::new(0.0, height - WARNING_DEPTH), false),
        ];

        for (distance, start, end, side) in edges {
            if distance >= WARNING_DISTANCE {
                continue;
            }
            let strength = (1.0 - distance.max(0.0) / WARNING_DISTANCE) * WARNING_ALPHA;
            let gradient = LinearGradient::new(start, end)
                .with_stop(0.0, self.warning.with_alpha(strength))
                .with_stop(1.0, self.warning.with_alpha(0.0));

            let x = start.x.min(end.x);
            let y = start.y.min(end.y);
            let (w, h) = if side { (WARNING_DEPTH, height) } else { (width, WARNING_DEPTH) };
            surface.fill_rect(x, y, w, h, &gradient.into());
            self.metrics.draw_calls += 1;
        }
    }

    fn draw_particles(&mut self, surface: &mut dyn DrawSurface, camera: &Camera, time_ms: f32) {
        if !self.mobile {
            surface.set_composite(CompositeMode::Lighter);
        }
        for particle in &self.particles {
            self.metrics.total += 1;
            let position = particle.position(time_ms);
            if !camera.is_in_viewport(position.x, position.y, None, Some("particle")) {
                self.metrics.culled += 1;
                continue;
            }
            let screen = camera.world_to_screen(position.x, position.y);
            surface.set_alpha(particle.opacity(time_ms));
            surface.fill_circle(screen.x, screen.y, particle.size * camera.zoom(), &self.color.into());
            self.metrics.draw_calls += 1;
        }
        surface.set_alpha(1.0);
        surface.set_composite(CompositeMode::SourceOver);
    }
}

impl Renderer for BorderRenderer {
    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }

    /// Skip frames where the visible area stays clear of every edge
    fn should_render(&self, camera: &Camera, _state: &GameState) -> bool {
        let margin = camera.culling_margin(None, Some("border")) / camera.zoom();
        let visible = camera.visible_world_bounds();
        visible.min_x - margin <= self.bounds.min_x
            || visible.max_x + margin >= self.bounds.max_x
            || visible.min_y - margin <= self.bounds.min_y
            || visible.max_y + margin >= self.bounds.max_y
    }

    fn render(
        &mut self,
        surface: &mut dyn DrawSurface,
        state: &GameState,
        camera: &Camera,
        _interpolation: f32,
    ) -> RenderResult<()> {
        self.metrics = RendererMetrics::default();
        ensure_usable_camera(camera, Self::NAME)?;
        self.draw_warning(surface, camera);
        self.draw_edge(surface, camera);
        self.draw_particles(surface, camera, state.time_ms);
        Ok(())
    }

    fn metrics(&self) -> Option<RendererMetrics> {
        Some(self.metrics)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::{DrawCommand, Paint, RecordingSurface};

    fn camera_at(x: f32, y: f32) -> Camera {
        let mut camera = Camera::with_viewport(800.0, 600.0);
        camera.follow(Vec2::new(x, y), true);
        camera
    }

    fn render(renderer: &mut BorderRenderer, camera: &Camera) -> RecordingSurface {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        renderer.render(&mut surface, &GameState::default(), camera, 1.0).unwrap();
        surface
    }

    #[test]
    fn test_skipped_far_from_edges() {
        let renderer = BorderRenderer::new(WorldBounds::centered(10_000.0, 10_000.0), 4, false, 1);
        assert!(!renderer.should_render(&camera_at(0.0, 0.0), &GameState::default()));
        assert!(renderer.should_render(&camera_at(4800.0, 0.0), &GameState::default()));
    }

    #[test]
    fn test_desktop_glow_and_mobile_plain_edge() {
        let bounds = WorldBounds::centered(1000.0, 1000.0);
        let camera = camera_at(0.0, 0.0);

        let mut desktop = BorderRenderer::new(bounds, 4, false, 1);
        let surface = render(&mut desktop, &camera);
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::StrokePolyline { .. })), 2);
        assert!(surface.count(|command| matches!(command, DrawCommand::Shadow { .. })) > 0);

        let mut mobile = BorderRenderer::new(bounds, 1, true, 1);
        let surface = render(&mut mobile, &camera);
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::StrokePolyline { .. })), 1);
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::Shadow { .. })), 0);
    }

    #[test]
    fn test_warning_only_near_edge() {
        let bounds = WorldBounds::centered(4000.0, 4000.0);
        let mut renderer = BorderRenderer::new(bounds, 0, false, 1);
        let gradients =
            |surface: &RecordingSurface| surface.count(|command| matches!(command, DrawCommand::FillRect { paint: Paint::Linear(_), .. }));

        assert_eq!(gradients(&render(&mut renderer, &camera_at(0.0, 0.0))), 0);
        assert_eq!(gradients(&render(&mut renderer, &camera_at(1900.0, 0.0))), 1);
        assert_eq!(gradients(&render(&mut renderer, &camera_at(1900.0, -1900.0))), 2);
    }

    #[test]
    fn test_particles_culled_by_viewport() {
        let bounds = WorldBounds::centered(20_000.0, 20_000.0);
        let mut renderer = BorderRenderer::new(bounds, 10, false, 1);
        render(&mut renderer, &camera_at(-9900.0, 0.0));
        let metrics = renderer.metrics().unwrap();
        assert_eq!(metrics.total, 40);
        assert!(metrics.culled > 30);
        assert!(metrics.drawn() < 10);
    }
}
