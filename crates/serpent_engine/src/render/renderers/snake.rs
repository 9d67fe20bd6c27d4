//! # Snake Renderer
//!
//! Draws bodies tail first so the head ends up on top.
//!
//! ## Tapering
//!
//! For `n` segments the first 70% shrink almost imperceptibly
//! (`size * (1 - i * 0.001)`); the remaining tail eases out along
//! `0.8 * (1 - t)^1.5 + 0.2`, scaled by the size reached at the start of the
//! tail so the profile never widens again.
//!
//! ## Dissolution
//!
//! While dying, each segment is skipped with probability
//! `death_segment_phase * 0.3`, re-rolled every frame.

use std::any::Any;
use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::foundation::math::Vec2;
use crate::render::camera::Camera;
use crate::render::error::RenderResult;
use crate::render::game_state::{GameState, Snake};
use crate::render::renderer::{Renderer, RendererMetrics};
use crate::render::surface::{Color, CompositeMode, DrawSurface, ImageHandle, TextAlign};

use super::ensure_usable_camera;

/// Fraction of the body that keeps nearly full width
const BODY_FRACTION: f32 = 0.7;

/// Lowest factor the slow head taper reaches on very long snakes
const HEAD_TAPER_FLOOR: f32 = 0.5;

/// Skin colours used when no skin image is ready
const PALETTE: [Color; 8] = [
    Color::rgb(88, 214, 141),
    Color::rgb(93, 173, 226),
    Color::rgb(245, 176, 65),
    Color::rgb(236, 112, 99),
    Color::rgb(175, 122, 197),
    Color::rgb(72, 201, 176),
    Color::rgb(244, 208, 63),
    Color::rgb(220, 118, 51),
];

/// Radius of segment `index` in a body of `count` segments
pub fn segment_size(size: f32, index: usize, count: usize) -> f32 {
    let tail_start = (count as f32 * BODY_FRACTION).floor() as usize;
    let head_factor = |i: usize| (1.0 - i as f32 * 0.001).max(HEAD_TAPER_FLOOR);

    if index < tail_start {
        return size * head_factor(index);
    }

    let tail_len = count.saturating_sub(tail_start).max(1);
    let t = (index - tail_start) as f32 / tail_len as f32;
    size * head_factor(tail_start) * (0.8 * (1.0 - t).powf(1.5) + 0.2)
}

/// Palette colour for a skin without a ready image
pub fn palette_color(skin: &str) -> Color {
    let hash = skin.bytes().fold(0usize, |acc, byte| acc.wrapping_mul(31).wrapping_add(usize::from(byte)));
    PALETTE[hash % PALETTE.len()]
}

/// Draws every snake
#[derive(Debug, Clone)]
pub struct SnakeRenderer {
    mobile: bool,
    skins: HashMap<String, ImageHandle>,
    rng: StdRng,
    metrics: RendererMetrics,
}

impl SnakeRenderer {
    /// Registered name
    pub const NAME: &'static str = "snake";

    /// Renderer with the given skin images
    pub fn new(skins: HashMap<String, ImageHandle>, mobile: bool, seed: u64) -> Self {
        Self {
            mobile,
            skins,
            rng: StdRng::seed_from_u64(seed),
            metrics: RendererMetrics::default(),
        }
    }

    /// Add or replace a skin image
    pub fn set_skin(&mut self, name: impl Into<String>, image: ImageHandle) {
        self.skins.insert(name.into(), image);
    }

    fn ready_skin(&self, skin: &str) -> Option<&ImageHandle> {
        self.skins.get(skin).filter(|image| image.complete)
    }

    fn draw_snake(&mut self, surface: &mut dyn DrawSurface, camera: &Camera, snake: &Snake, interpolation: f32) {
        let head = camera.interpolate(snake, interpolation);
        let zoom = camera.zoom();
        let base = palette_color(&snake.skin);
        let skin = self.ready_skin(&snake.skin).cloned();
        let count = snake.segments.len();

        if snake.is_dying {
            surface.set_alpha((1.0 - snake.death_segment_phase).clamp(0.1, 1.0));
        }

        let boost_glow = snake.is_boosting && !self.mobile;
        if boost_glow {
            surface.save();
            surface.set_composite(CompositeMode::Lighter);
            surface.set_shadow(base, 20.0);
            for (i, segment) in snake.segments.iter().enumerate().step_by(3) {
                let screen = camera.world_to_screen(segment.x, segment.y);
                let radius = segment_size(snake.size, i, count) * zoom * 1.6;
                surface.fill_circle(screen.x, screen.y, radius, &base.with_alpha(0.25).into());
                self.metrics.draw_calls += 1;
            }
            surface.restore();
        }

        let skip_chance = if snake.is_dying { snake.death_segment_phase * 0.3 } else { 0.0 };
        for (i, segment) in snake.segments.iter().enumerate().rev() {
            if skip_chance > 0.0 && self.rng.gen::<f32>() < skip_chance {
                continue;
            }
            let position = if i == 0 { Vec2::new(head.x, head.y) } else { Vec2::new(segment.x, segment.y) };
            let radius = segment_size(snake.size, i, count) * zoom;
            if !camera.is_in_viewport(position.x, position.y, Some(radius), None) {
                continue;
            }

            let screen = camera.world_to_screen(position.x, position.y);
            match &skin {
                Some(image) => surface.draw_image(image, screen.x - radius, screen.y - radius, radius * 2.0, radius * 2.0),
                None => {
                    let shade = if i % 2 == 0 { base } else { base.mix(Color::BLACK, 0.15) };
                    surface.fill_circle(screen.x, screen.y, radius, &shade.into());
                }
            }
            self.metrics.draw_calls += 1;
        }

        let head_screen = camera.world_to_screen(head.x, head.y);
        let head_radius = snake.size * zoom;
        self.draw_eyes(surface, head_screen, head.angle, head_radius);

        if snake.is_leader || snake.is_boss {
            self.draw_crown(surface, head_screen, head_radius, snake.is_boss);
        }

        if snake.is_player || !self.mobile {
            let label_y = head_screen.y - head_radius - 14.0 * zoom.max(0.5);
            surface.fill_text(&snake.name, head_screen.x, label_y, 12.0, &Color::WHITE.into(), TextAlign::Center);
            self.metrics.draw_calls += 1;
        }

        surface.set_alpha(1.0);
    }

    fn draw_eyes(&mut self, surface: &mut dyn DrawSurface, head: Vec2, angle: f32, radius: f32) {
        let forward = Vec2::new(angle.cos(), angle.sin());
        let side = Vec2::new(-forward.y, forward.x);
        for sign in [-1.0, 1.0] {
            let eye = head + forward * radius * 0.45 + side * radius * 0.4 * sign;
            surface.fill_circle(eye.x, eye.y, radius * 0.28, &Color::WHITE.into());
            let pupil = eye + forward * radius * 0.1;
            surface.fill_circle(pupil.x, pupil.y, radius * 0.14, &Color::BLACK.into());
            self.metrics.draw_calls += 2;
        }
    }

    fn draw_crown(&mut self, surface: &mut dyn DrawSurface, head: Vec2, radius: f32, boss: bool) {
        let color = if boss { Color::rgb(230, 40, 40) } else { Color::rgb(255, 215, 0) };
        let base_y = head.y - radius * 1.2;
        let half = radius * 0.8;
        let points = [
            Vec2::new(head.x - half, base_y),
            Vec2::new(head.x - half, base_y - radius * 0.6),
            Vec2::new(head.x - half * 0.5, base_y - radius * 0.3),
            Vec2::new(head.x, base_y - radius * 0.8),
            Vec2::new(head.x + half * 0.5, base_y - radius * 0.3),
            Vec2::new(head.x + half, base_y - radius * 0.6),
            Vec2::new(head.x + half, base_y),
        ];
        if !self.mobile {
            surface.set_shadow(color, 12.0);
        }
        surface.fill_polygon(&points, &color.into());
        if !self.mobile {
            surface.set_shadow(Color::TRANSPARENT, 0.0);
        }
        self.metrics.draw_calls += 1;
    }
}

impl Renderer for SnakeRenderer {
    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }

    fn should_render(&self, _camera: &Camera, state: &GameState) -> bool {
        !state.snakes.is_empty()
    }

    fn render(
        &mut self,
        surface: &mut dyn DrawSurface,
        state: &GameState,
        camera: &Camera,
        interpolation: f32,
    ) -> RenderResult<()> {
        self.metrics = RendererMetrics::default();
        ensure_usable_camera(camera, Self::NAME)?;

        for snake in &state.snakes {
            if !snake.alive && !snake.is_dying {
                continue;
            }
            self.metrics.total += 1;
            if !camera.is_in_viewport(snake.x, snake.y, None, Some("snake")) {
                self.metrics.culled += 1;
                continue;
            }
            self.draw_snake(surface, camera, snake, interpolation);
        }
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
    use crate::render::surface::{DrawCommand, RecordingSurface};
    use approx::assert_relative_eq;

    fn draw(renderer: &mut SnakeRenderer, snakes: Vec<Snake>) -> RecordingSurface {
        let state = GameState {
            snakes,
            ..GameState::default()
        };
        let mut surface = RecordingSurface::new(800.0, 600.0);
        renderer
            .render(&mut surface, &state, &Camera::with_viewport(800.0, 600.0), 1.0)
            .unwrap();
        surface
    }

    fn circles(surface: &RecordingSurface) -> usize {
        surface.count(|command| matches!(command, DrawCommand::FillCircle { .. }))
    }

    #[test]
    fn test_taper_monotonic_for_any_length() {
        for count in 2..400 {
            let sizes: Vec<f32> = (0..count).map(|i| segment_size(10.0, i, count)).collect();
            for pair in sizes.windows(2) {
                assert!(pair[1] <= pair[0], "count {count}: {} > {}", pair[1], pair[0]);
            }
            assert!(sizes.iter().all(|size| *size > 0.0));
        }
        let sizes: Vec<f32> = (0..3000).map(|i| segment_size(10.0, i, 3000)).collect();
        assert!(sizes.windows(2).all(|pair| pair[1] <= pair[0]));
    }

    #[test]
    fn test_taper_curve_shape() {
        assert_relative_eq!(segment_size(10.0, 0, 100), 10.0);
        assert_relative_eq!(segment_size(10.0, 50, 100), 9.5, epsilon = 1e-5);
        // Tail start keeps the body width
        assert_relative_eq!(segment_size(10.0, 70, 100), 9.3, epsilon = 1e-5);
        // Tail end approaches 20% of that width
        assert!(segment_size(10.0, 99, 100) < 9.3 * 0.25);
    }

    #[test]
    fn test_palette_fallback_without_ready_skin() {
        let mut skins = HashMap::new();
        skins.insert("loading".to_string(), ImageHandle::pending("loading.png"));
        let mut renderer = SnakeRenderer::new(skins, false, 1);
        let snake = Snake::new("a", 0.0, 0.0).with_body(5, 10.0).with_skin("loading");
        let surface = draw(&mut renderer, vec![snake]);
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::Image { .. })), 0);
        assert!(circles(&surface) >= 5);
    }

    #[test]
    fn test_skin_image_when_complete() {
        let mut renderer = SnakeRenderer::new(HashMap::new(), false, 1);
        renderer.set_skin("stripes", ImageHandle::loaded("stripes.png", 64, 64));
        let snake = Snake::new("a", 0.0, 0.0).with_body(5, 10.0).with_skin("stripes");
        let surface = draw(&mut renderer, vec![snake]);
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::Image { .. })), 5);
    }

    #[test]
    fn test_boost_glow_desktop_only() {
        let mut snake = Snake::new("a", 0.0, 0.0).with_body(9, 10.0);
        snake.is_boosting = true;

        let desktop = draw(&mut SnakeRenderer::new(HashMap::new(), false, 1), vec![snake.clone()]);
        let mobile = draw(&mut SnakeRenderer::new(HashMap::new(), true, 1), vec![snake]);
        assert!(desktop.count(|command| matches!(command, DrawCommand::Shadow { .. })) > 0);
        assert_eq!(mobile.count(|command| matches!(command, DrawCommand::Shadow { .. })), 0);
        // Three glow circles on desktop
        assert_eq!(circles(&desktop), circles(&mobile) + 3);
    }

    #[test]
    fn test_names_hidden_for_ai_on_mobile() {
        let snakes = vec![Snake::new("me", 0.0, 0.0).as_player(), Snake::new("bot", 50.0, 0.0)];
        let desktop = draw(&mut SnakeRenderer::new(HashMap::new(), false, 1), snakes.clone());
        let mobile = draw(&mut SnakeRenderer::new(HashMap::new(), true, 1), snakes);
        assert_eq!(desktop.texts(), vec!["me", "bot"]);
        assert_eq!(mobile.texts(), vec!["me"]);
    }

    #[test]
    fn test_dying_snake_dissolves() {
        let mut snake = Snake::new("a", 0.0, 0.0).with_body(200, 1.0);
        snake.is_dying = true;
        snake.alive = false;
        snake.death_segment_phase = 1.0;

        let surface = draw(&mut SnakeRenderer::new(HashMap::new(), true, 7), vec![snake.clone()]);
        let body = circles(&surface) - 4;
        // About 30% skipped
        assert!(body < 180 && body > 100, "drew {body} segments");

        snake.death_segment_phase = 0.0;
        let surface = draw(&mut SnakeRenderer::new(HashMap::new(), true, 7), vec![snake]);
        assert_eq!(circles(&surface) - 4, 200);
    }

    #[test]
    fn test_dead_snakes_ignored_and_far_snakes_culled() {
        let mut dead = Snake::new("dead", 0.0, 0.0);
        dead.alive = false;
        let far = Snake::new("far", 5000.0, 0.0);
        let mut renderer = SnakeRenderer::new(HashMap::new(), false, 1);
        draw(&mut renderer, vec![dead, far, Snake::new("near", 0.0, 0.0)]);
        let metrics = renderer.metrics().unwrap();
        assert_eq!((metrics.total, metrics.culled), (2, 1));
    }

    #[test]
    fn test_crown_for_leader_and_boss() {
        let mut leader = Snake::new("lead", 0.0, 0.0);
        leader.is_leader = true;
        let surface = draw(&mut SnakeRenderer::new(HashMap::new(), false, 1), vec![leader]);
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::FillPolygon { .. })), 1);
    }
}
