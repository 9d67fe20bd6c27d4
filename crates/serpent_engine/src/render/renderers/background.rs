//! Background renderer: sky gradient, parallax stars and stations

use std::any::Any;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::config::BackgroundConfig;
use crate::foundation::math::Vec2;
use crate::render::camera::Camera;
use crate::render::error::RenderResult;
use crate::render::game_state::{GameState, Station};
use crate::render::renderer::{Renderer, RendererMetrics};
use crate::render::surface::{Color, DrawSurface, LinearGradient, Paint};

use super::ensure_usable_camera;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Star {
    /// Position inside one tile, in tile pixels
    position: Vec2,
    size: f32,
    twinkle_phase: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct StarLayer {
    stars: Vec<Star>,
    parallax: f32,
}

/// Draws the backdrop; a pure function of camera and game state
#[derive(Debug, Clone)]
pub struct BackgroundRenderer {
    mobile: bool,
    tile_size: f32,
    top: Color,
    bottom: Color,
    star_color: Color,
    layers: Vec<StarLayer>,
    metrics: RendererMetrics,
}

impl BackgroundRenderer {
    /// Registered name
    pub const NAME: &'static str = "background";

    /// Build star layers from configuration
    ///
    /// The mobile path keeps only the farthest layer and never scrolls it.
    pub fn new(config: &BackgroundConfig, mobile: bool, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let layer_count = if mobile { 1.min(config.stars_per_layer.len()) } else { config.stars_per_layer.len() };

        let layers = config
            .stars_per_layer
            .iter()
            .zip(&config.parallax_factors)
            .take(layer_count)
            .enumerate()
            .map(|(depth, (&count, &parallax))| StarLayer {
                stars: (0..count)
                    .map(|_| Star {
                        position: Vec2::new(
                            rng.gen_range(0.0..config.tile_size),
                            rng.gen_range(0.0..config.tile_size),
                        ),
                        size: rng.gen_range(0.5..1.5) + depth as f32 * 0.5,
                        twinkle_phase: rng.gen_range(0.0..std::f32::consts::TAU),
                    })
                    .collect(),
                parallax,
            })
            .collect();

        Self {
            mobile,
            tile_size: config.tile_size,
            top: Color::from_hex_or(&config.top_color, Color::BLACK),
            bottom: Color::from_hex_or(&config.bottom_color, Color::BLACK),
            star_color: Color::from_hex_or(&config.star_color, Color::WHITE),
            layers,
            metrics: RendererMetrics::default(),
        }
    }

    /// Whether the mobile path is active
    pub const fn is_mobile(&self) -> bool {
        self.mobile
    }

    /// Number of star layers kept
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn draw_sky(&mut self, surface: &mut dyn DrawSurface) {
        let (width, height) = (surface.width(), surface.height());
        let paint: Paint = if self.mobile {
            self.top.into()
        } else {
            LinearGradient::new(Vec2::zeros(), Vec2::new(0.0, height))
                .with_stop(0.0, self.top)
                .with_stop(1.0, self.bottom)
                .into()
        };
        surface.fill_rect(0.0, 0.0, width, height, &paint);
        self.metrics.draw_calls += 1;
    }

    fn draw_parallax_layers(&mut self, surface: &mut dyn DrawSurface, camera: &Camera, time_ms: f32) {
        let (width, height) = (surface.width(), surface.height());
        let tile = self.tile_size;

        for layer in &self.layers {
            let scroll = camera.position() * layer.parallax;
            let offset = Vec2::new((-scroll.x).rem_euclid(tile), (-scroll.y).rem_euclid(tile));
            let tiles_x = (width / tile).ceil() as i32 + 1;
            let tiles_y = (height / tile).ceil() as i32 + 1;

            for tx in -1..tiles_x {
                for ty in -1..tiles_y {
                    let origin = offset + Vec2::new(tx as f32 * tile, ty as f32 * tile);
                    for star in &layer.stars {
                        let screen = origin + star.position;
                        if screen.x < 0.0 || screen.y < 0.0 || screen.x > width || screen.y > height {
                            continue;
                        }
                        let twinkle = 0.6 + 0.4 * (time_ms * 0.002 + star.twinkle_phase).sin();
                        surface.set_alpha(twinkle);
                        surface.fill_circle(screen.x, screen.y, star.size, &self.star_color.into());
                        self.metrics.draw_calls += 1;
                    }
                }
            }
        }
        surface.set_alpha(1.0);
    }

    fn draw_static_layer(&mut self, surface: &mut dyn DrawSurface) {
        let scale = Vec2::new(surface.width() / self.tile_size, surface.height() / self.tile_size);
        if let Some(layer) = self.layers.first() {
            for star in &layer.stars {
                let screen = star.position.component_mul(&scale);
                surface.fill_rect(screen.x, screen.y, star.size, star.size, &self.star_color.into());
                self.metrics.draw_calls += 1;
            }
        }
    }

    fn draw_station(&mut self, surface: &mut dyn DrawSurface, camera: &Camera, station: &Station) {
        let screen = camera.world_to_screen(station.x, station.y);
        let radius = station.radius * camera.zoom();
        let hull = Color::rgb(70, 80, 110);
        let light = Color::rgb(120, 200, 255);

        if !self.mobile {
            surface.set_shadow(light, 18.0);
        }
        surface.fill_circle(screen.x, screen.y, radius, &hull.into());
        surface.stroke_circle(screen.x, screen.y, radius * 0.7, &light.into(), 2.0);
        self.metrics.draw_calls += 2;

        if !self.mobile {
            surface.set_shadow(Color::TRANSPARENT, 0.0);
            for spoke in 0..4 {
                let angle = station.rotation + spoke as f32 * std::f32::consts::FRAC_PI_2;
                let tip = screen + Vec2::new(angle.cos(), angle.sin()) * radius * 1.4;
                surface.stroke_line(screen, tip, &hull.into(), 3.0);
                surface.fill_circle(tip.x, tip.y, radius * 0.15, &light.into());
                self.metrics.draw_calls += 2;
            }
        }
    }
}

impl Renderer for BackgroundRenderer {
    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
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

        self.draw_sky(surface);
        if self.mobile {
            self.draw_static_layer(surface);
        } else {
            self.draw_parallax_layers(surface, camera, state.time_ms);
        }

        for station in &state.stations {
            self.metrics.total += 1;
            if camera.is_in_viewport(station.x, station.y, None, Some("decoration")) {
                self.draw_station(surface, camera, station);
            } else {
                self.metrics.culled += 1;
            }
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

    fn render(renderer: &mut BackgroundRenderer, camera: &Camera, state: &GameState) -> RecordingSurface {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        renderer.render(&mut surface, state, camera, 1.0).unwrap();
        surface
    }

    #[test]
    fn test_desktop_gradient_and_parallax() {
        let mut renderer = BackgroundRenderer::new(&BackgroundConfig::default(), false, 1);
        assert_eq!(renderer.layer_count(), 3);
        let surface = render(&mut renderer, &Camera::with_viewport(800.0, 600.0), &GameState::default());

        assert!(matches!(
            &surface.commands()[0],
            DrawCommand::FillRect { paint: Paint::Linear(_), .. }
        ));
        assert!(surface.count(|command| matches!(command, DrawCommand::FillCircle { .. })) > 0);
    }

    #[test]
    fn test_mobile_flat_single_static_layer() {
        let config = BackgroundConfig::default();
        let mut renderer = BackgroundRenderer::new(&config, true, 1);
        assert_eq!(renderer.layer_count(), 1);
        let surface = render(&mut renderer, &Camera::with_viewport(800.0, 600.0), &GameState::default());

        assert!(matches!(
            &surface.commands()[0],
            DrawCommand::FillRect { paint: Paint::Solid(_), .. }
        ));
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::FillCircle { .. })), 0);
        // Sky plus exactly one rect per star of the first layer
        assert_eq!(
            surface.count(|command| matches!(command, DrawCommand::FillRect { .. })),
            1 + config.stars_per_layer[0]
        );
    }

    #[test]
    fn test_parallax_scrolls_with_camera() {
        let mut renderer = BackgroundRenderer::new(&BackgroundConfig::default(), false, 9);
        let mut camera = Camera::with_viewport(800.0, 600.0);
        let still = render(&mut renderer, &camera, &GameState::default());
        camera.follow(Vec2::new(300.0, 0.0), true);
        let moved = render(&mut renderer, &camera, &GameState::default());
        assert_ne!(still.commands(), moved.commands());
    }

    #[test]
    fn test_stations_culled_outside_view() {
        let mut renderer = BackgroundRenderer::new(&BackgroundConfig::default(), true, 1);
        let state = GameState {
            stations: vec![
                Station { x: 0.0, y: 0.0, radius: 40.0, rotation: 0.0 },
                Station { x: 5000.0, y: 0.0, radius: 40.0, rotation: 0.0 },
            ],
            ..GameState::default()
        };
        render(&mut renderer, &Camera::with_viewport(800.0, 600.0), &state);
        let metrics = renderer.metrics().unwrap();
        assert_eq!((metrics.total, metrics.culled), (2, 1));
    }

    #[test]
    fn test_station_glow_desktop_only() {
        let state = GameState {
            stations: vec![Station { x: 0.0, y: 0.0, radius: 40.0, rotation: 0.0 }],
            ..GameState::default()
        };
        let camera = Camera::with_viewport(800.0, 600.0);
        let shadows = |mobile| {
            let mut renderer = BackgroundRenderer::new(&BackgroundConfig::default(), mobile, 1);
            render(&mut renderer, &camera, &state).count(|command| matches!(command, DrawCommand::Shadow { .. }))
        };
        assert!(shadows(false) > 0);
        assert_eq!(shadows(true), 0);
    }
}
