//! Particle renderer and effect spawners
//!
//! The only renderer with time-dependent state: it owns the particle pool and
//! advances it from [`ParticleRenderer::update`], never from `render`.

use std::any::Any;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::ParticleConfig;
use crate::foundation::math::Vec2;
use crate::particles::{Particle, ParticleKind, ParticlePool, ParticleSpawn};
use crate::render::camera::Camera;
use crate::render::error::RenderResult;
use crate::render::game_state::{GameState, Snake};
use crate::render::renderer::{Renderer, RendererMetrics};
use crate::render::surface::{Color, CompositeMode, DrawSurface};

use super::{ensure_usable_camera, star_points};

/// Draws and owns pooled particles
#[derive(Debug, Clone)]
pub struct ParticleRenderer {
    pool: ParticlePool,
    max_active: usize,
    mobile: bool,
    rng: StdRng,
    dropped: u64,
    metrics: RendererMetrics,
}

impl ParticleRenderer {
    /// Registered name
    pub const NAME: &'static str = "particle";

    /// Create a renderer with a pre-allocated pool
    pub fn new(config: &ParticleConfig, mobile: bool, seed: u64) -> Self {
        Self {
            pool: ParticlePool::new(config.pool_size),
            max_active: config.max_active(mobile),
            mobile,
            rng: StdRng::seed_from_u64(seed),
            dropped: 0,
            metrics: RendererMetrics::default(),
        }
    }

    /// Advance every particle by `delta_time` milliseconds
    pub fn update(&mut self, delta_time: f32) {
        self.pool.update(delta_time);
    }

    /// Particle pool
    pub const fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// Number of particles in flight
    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    /// Spawns refused because the active cap was reached
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Spawn one particle; `None` when the active cap is reached
    pub fn spawn_particle(&mut self, spawn: &ParticleSpawn) -> Option<&mut Particle> {
        if self.pool.active_count() >= self.max_active {
            self.dropped += 1;
            log::trace!("Particle cap {} reached, dropping spawn", self.max_active);
            return None;
        }
        Some(self.pool.spawn(spawn))
    }

    /// Celebration burst when two elements combine
    pub fn create_combination_particles(&mut self, x: f32, y: f32, color: Color) {
        let count = if self.mobile { 12 } else { 30 };
        for i in 0..count {
            let angle = i as f32 / count as f32 * std::f32::consts::TAU + self.rng.gen_range(-0.2..0.2);
            let speed = self.rng.gen_range(2.0..6.0);
            let kind = if i % 3 == 0 { ParticleKind::Star } else { ParticleKind::Circle };
            let mut spawn = ParticleSpawn::at(x, y)
                .with_velocity(angle.cos() * speed, angle.sin() * speed)
                .with_color(color)
                .with_kind(kind)
                .with_size(self.rng.gen_range(2.0..5.0))
                .with_fade_rate(self.rng.gen_range(0.015..0.03))
                .with_glow(!self.mobile);
            spawn.drag = 0.96;
            spawn.rotation_speed = self.rng.gen_range(-0.2..0.2);
            if !self.mobile && i % 2 == 0 {
                spawn.trail_length = 6;
            }
            if self.spawn_particle(&spawn).is_none() {
                break;
            }
        }
    }

    /// Debris along a dying snake's body
    pub fn create_death_particles(&mut self, snake: &Snake, color: Color) {
        let stride = if self.mobile { 6 } else { 2 };
        for segment in snake.segments.iter().step_by(stride) {
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            let speed = self.rng.gen_range(0.5..3.0);
            let mut spawn = ParticleSpawn::at(segment.x, segment.y)
                .with_velocity(angle.cos() * speed, angle.sin() * speed)
                .with_color(color)
                .with_kind(ParticleKind::Square)
                .with_size(snake.size * self.rng.gen_range(0.2..0.4))
                .with_fade_rate(self.rng.gen_range(0.01..0.025));
            spawn.drag = 0.95;
            spawn.growth = -0.03;
            spawn.rotation_speed = self.rng.gen_range(-0.3..0.3);
            if self.spawn_particle(&spawn).is_none() {
                break;
            }
        }
    }

    /// Exhaust puff behind a boosting snake heading along `angle`
    pub fn create_boost_particle(&mut self, x: f32, y: f32, angle: f32, color: Color) {
        let spread = self.rng.gen_range(-0.4..0.4);
        let speed = self.rng.gen_range(1.0..2.5);
        let back = angle + std::f32::consts::PI + spread;
        let mut spawn = ParticleSpawn::at(x, y)
            .with_velocity(back.cos() * speed, back.sin() * speed)
            .with_color(color)
            .with_size(self.rng.gen_range(1.5..3.0))
            .with_fade_rate(0.05)
            .with_glow(!self.mobile);
        spawn.pulse = 0.4;
        if !self.mobile {
            spawn.trail_length = 4;
        }
        self.spawn_particle(&spawn);
    }

    fn draw_particle(
        surface: &mut dyn DrawSurface,
        camera: &Camera,
        particle: &Particle,
        mobile: bool,
        metrics: &mut RendererMetrics,
    ) {
        let zoom = camera.zoom();
        let screen = camera.world_to_screen(particle.x, particle.y);
        let size = particle.render_size() * zoom;
        let alpha = particle.alpha();
        let glow = particle.glow && !mobile;

        if let Some(trail) = &particle.trail {
            let len = trail.len().max(1) as f32;
            for (k, point) in trail.iter().enumerate() {
                let fade = 1.0 - k as f32 / len;
                let ghost = camera.world_to_screen(point.x, point.y);
                surface.set_alpha(alpha * fade * 0.5);
                surface.fill_circle(ghost.x, ghost.y, size * fade, &particle.color.into());
                metrics.draw_calls += 1;
            }
        }

        surface.set_alpha(alpha);
        if glow {
            surface.set_composite(CompositeMode::Lighter);
        }

        match particle.kind {
            ParticleKind::Circle => surface.fill_circle(screen.x, screen.y, size, &particle.color.into()),
            ParticleKind::Square => {
                surface.save();
                surface.translate(screen.x, screen.y);
                surface.rotate(particle.rotation);
                surface.fill_rect(-size, -size, size * 2.0, size * 2.0, &particle.color.into());
                surface.restore();
            }
            ParticleKind::Star => {
                let points = star_points(Vec2::new(screen.x, screen.y), size, size * 0.45, 5, particle.rotation);
                surface.fill_polygon(&points, &particle.color.into());
            }
        }
        metrics.draw_calls += 1;

        if glow {
            surface.set_composite(CompositeMode::SourceOver);
        }
    }
}

impl Renderer for ParticleRenderer {
    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }

    fn should_render(&self, _camera: &Camera, _state: &GameState) -> bool {
        self.pool.active_count() > 0
    }

    fn render(
        &mut self,
        surface: &mut dyn DrawSurface,
        _state: &GameState,
        camera: &Camera,
        _interpolation: f32,
    ) -> RenderResult<()> {
        self.metrics = RendererMetrics::default();
        ensure_usable_camera(camera, Self::NAME)?;

        let Self {
            pool,
            mobile,
            metrics,
            ..
        } = self;
        for particle in pool.active() {
            if !particle.active {
                continue;
            }
            metrics.total += 1;
            if !camera.is_in_viewport(particle.x, particle.y, None, Some("particle")) {
                metrics.culled += 1;
                continue;
            }
            Self::draw_particle(surface, camera, particle, *mobile, metrics);
        }

        surface.set_alpha(1.0);
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
    use crate::foundation::time::FRAME_MS;
    use crate::render::surface::{DrawCommand, RecordingSurface};

    fn renderer(mobile: bool) -> ParticleRenderer {
        ParticleRenderer::new(&ParticleConfig::default(), mobile, 11)
    }

    fn draw(renderer: &mut ParticleRenderer) -> RecordingSurface {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        renderer
            .render(&mut surface, &GameState::default(), &Camera::with_viewport(800.0, 600.0), 1.0)
            .unwrap();
        surface
    }

    #[test]
    fn test_shape_dispatch() {
        let mut renderer = renderer(true);
        for kind in [ParticleKind::Circle, ParticleKind::Square, ParticleKind::Star] {
            renderer.spawn_particle(&ParticleSpawn::at(0.0, 0.0).with_kind(kind));
        }
        let surface = draw(&mut renderer);
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::FillCircle { .. })), 1);
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::FillRect { .. })), 1);
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::FillPolygon { .. })), 1);
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::Rotate(_))), 1);
    }

    #[test]
    fn test_trail_replayed_behind_particle() {
        let mut renderer = renderer(false);
        renderer.spawn_particle(&ParticleSpawn::at(0.0, 0.0).with_velocity(3.0, 0.0).with_trail(5));
        for _ in 0..3 {
            renderer.update(FRAME_MS);
        }
        let surface = draw(&mut renderer);
        // Three ghosts plus the particle itself
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::FillCircle { .. })), 4);
    }

    #[test]
    fn test_active_cap_drops_spawns() {
        let config = ParticleConfig {
            pool_size: 4,
            max_active_desktop: 10,
            max_active_mobile: 3,
            border_particles_per_edge: 0,
        };
        let mut mobile = ParticleRenderer::new(&config, true, 1);
        for _ in 0..5 {
            mobile.spawn_particle(&ParticleSpawn::default());
        }
        assert_eq!(mobile.active_count(), 3);
        assert_eq!(mobile.dropped(), 2);

        let mut desktop = ParticleRenderer::new(&config, false, 1);
        for _ in 0..5 {
            desktop.spawn_particle(&ParticleSpawn::default());
        }
        assert_eq!(desktop.active_count(), 5);
    }

    #[test]
    fn test_combination_burst_smaller_on_mobile() {
        let mut desktop = renderer(false);
        let mut mobile = renderer(true);
        desktop.create_combination_particles(0.0, 0.0, Color::WHITE);
        mobile.create_combination_particles(0.0, 0.0, Color::WHITE);
        assert_eq!(desktop.active_count(), 30);
        assert_eq!(mobile.active_count(), 12);
        assert!(mobile.pool().active().iter().all(|particle| particle.trail.is_none() && !particle.glow));
    }

    #[test]
    fn test_glow_composite_desktop_only() {
        let spawn = ParticleSpawn::at(0.0, 0.0).with_glow(true);
        let lighter = |mobile| {
            let mut renderer = renderer(mobile);
            renderer.spawn_particle(&spawn);
            draw(&mut renderer).count(|command| {
                matches!(command, DrawCommand::FillCircle { composite: CompositeMode::Lighter, .. })
            })
        };
        assert_eq!(lighter(false), 1);
        assert_eq!(lighter(true), 0);
    }

    #[test]
    fn test_death_and_boost_particles() {
        let snake = Snake::new("a", 0.0, 0.0).with_body(12, 5.0);
        let mut desktop = renderer(false);
        desktop.create_death_particles(&snake, Color::WHITE);
        assert_eq!(desktop.active_count(), 6);

        let mut mobile = renderer(true);
        mobile.create_death_particles(&snake, Color::WHITE);
        assert_eq!(mobile.active_count(), 2);

        mobile.create_boost_particle(0.0, 0.0, 0.0, Color::WHITE);
        let boost = &mobile.pool().active()[2];
        // Ejected backwards
        assert!(boost.vx < 0.0);
    }

    #[test]
    fn test_offscreen_particles_culled_and_dead_recycled() {
        let mut renderer = renderer(false);
        renderer.spawn_particle(&ParticleSpawn::at(0.0, 0.0).with_fade_rate(0.5));
        renderer.spawn_particle(&ParticleSpawn::at(3000.0, 0.0));
        draw(&mut renderer);
        let metrics = renderer.metrics().unwrap();
        assert_eq!((metrics.total, metrics.culled), (2, 1));

        renderer.update(FRAME_MS * 2.0);
        assert_eq!(renderer.active_count(), 1);
        assert_eq!(renderer.pool().free_count(), ParticleConfig::default().pool_size - 1);
    }
}
