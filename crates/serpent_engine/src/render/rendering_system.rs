//! # Rendering System
//!
//! Composition root and the single rendering dependency of game logic.
//!
//! ## Frame Contract
//!
//! ```text
//! camera_mut().follow(..); camera_mut().update(dt)   // host
//! rendering.update(dt)                               // particles only
//! rendering.render(&state)                           // clear, pipeline, overlay
//! ```
//!
//! Both `update` and `render` do nothing until [`RenderingSystem::initialize`]
//! has run.

use std::collections::HashMap;

use super::camera::{Camera, WorldBounds};
use super::error::{RenderError, RenderResult};
use super::game_state::{GameState, Snake};
use super::layer::RenderLayer;
use super::pipeline::{PipelineMetrics, RenderPipeline, RendererKey};
use super::renderers::{BackgroundRenderer, BorderRenderer, ElementRenderer, ParticleRenderer, SnakeRenderer};
use super::surface::{Color, DrawSurface, ImageHandle, TextAlign};
use crate::core::config::RenderConfig;
use crate::foundation::time::{FrameClock, Stopwatch};
use crate::particles::ParticleSpawn;

/// Arguments to [`RenderingSystem::initialize`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitOptions {
    /// Arena width in world units
    pub map_width: f32,
    /// Arena height in world units
    pub map_height: f32,
    /// Skin images keyed by skin id
    pub skin_images: HashMap<String, ImageHandle>,
}

impl InitOptions {
    /// Options for an arena of the given size without skins
    pub fn new(map_width: f32, map_height: f32) -> Self {
        Self {
            map_width,
            map_height,
            skin_images: HashMap::new(),
        }
    }

    /// Add a skin image
    pub fn with_skin(mut self, skin: impl Into<String>, image: ImageHandle) -> Self {
        self.skin_images.insert(skin.into(), image);
        self
    }
}

/// Timing of the last frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTimings {
    /// Wall-clock milliseconds between the last two renders
    pub frame_ms: f32,
    /// Milliseconds spent in the last `update`
    pub update_ms: f32,
    /// Milliseconds spent in the last `render`
    pub render_ms: f32,
    /// `1000 / frame_ms`, zero before the second render
    pub fps: f32,
    /// Renders since initialization
    pub frame_count: u64,
}

/// Owns the surface, camera and pipeline and wires the built-in renderers
pub struct RenderingSystem<S: DrawSurface> {
    surface: S,
    config: RenderConfig,
    camera: Camera,
    pipeline: RenderPipeline,
    particle_key: Option<RendererKey>,
    snake_key: Option<RendererKey>,
    clock: FrameClock,
    timings: FrameTimings,
}

impl<S: DrawSurface> RenderingSystem<S> {
    /// Validate configuration and surface and build an uninitialized system
    pub fn new(surface: S, mut config: RenderConfig) -> RenderResult<Self> {
        config.validate().map_err(RenderError::InvalidConfig)?;
        if !surface.is_available() {
            return Err(RenderError::SurfaceUnavailable(format!(
                "surface is {}x{}",
                surface.width(),
                surface.height()
            )));
        }

        config.camera.viewport_width = surface.width();
        config.camera.viewport_height = surface.height();
        let camera = Camera::new(config.camera.clone(), config.seed);
        let pipeline = RenderPipeline::new(config.pipeline.clone());

        log::info!(
            "Rendering system created ({}x{}, {})",
            surface.width(),
            surface.height(),
            if config.mobile { "mobile" } else { "desktop" }
        );

        Ok(Self {
            surface,
            config,
            camera,
            pipeline,
            particle_key: None,
            snake_key: None,
            clock: FrameClock::new(),
            timings: FrameTimings::default(),
        })
    }

    /// Build the renderers, set camera bounds and register on canonical layers
    pub fn initialize(&mut self, options: InitOptions) -> RenderResult<()> {
        if self.is_initialized() {
            return Err(RenderError::AlreadyInitialized);
        }
        let usable = |extent: f32| extent.is_finite() && extent > 0.0;
        if !usable(options.map_width) || !usable(options.map_height) {
            return Err(RenderError::InvalidConfig(format!(
                "Map must be finite and positive, got {}x{}",
                options.map_width, options.map_height
            )));
        }

        let bounds = WorldBounds::centered(options.map_width, options.map_height);
        self.camera.set_bounds(Some(bounds));

        let mobile = self.config.mobile;
        let seed = self.config.seed;
        let particles_per_edge = self.config.particles.border_particles(mobile);

        self.pipeline.register_renderer(
            RenderLayer::Background,
            Box::new(BackgroundRenderer::new(&self.config.background, mobile, seed)),
        );
        self.pipeline.register_renderer(
            RenderLayer::UiOverlay,
            Box::new(BorderRenderer::new(bounds, particles_per_edge, mobile, seed.wrapping_add(1))),
        );
        self.pipeline
            .register_renderer(RenderLayer::GameObjects, Box::new(ElementRenderer::new(mobile)));
        self.snake_key = Some(self.pipeline.register(
            RenderLayer::Entities,
            Box::new(SnakeRenderer::new(options.skin_images, mobile, seed.wrapping_add(2))),
        ));
        self.particle_key = Some(self.pipeline.register(
            RenderLayer::Particles,
            Box::new(ParticleRenderer::new(&self.config.particles, mobile, seed.wrapping_add(3))),
        ));

        log::info!(
            "Rendering system initialized for {}x{} arena with {} renderers",
            options.map_width,
            options.map_height,
            self.pipeline.renderer_count()
        );
        Ok(())
    }

    /// Whether [`RenderingSystem::initialize`] has run
    pub const fn is_initialized(&self) -> bool {
        self.particle_key.is_some()
    }

    /// Advance time-dependent visual state (particles)
    pub fn update(&mut self, delta_time: f32) {
        if !self.is_initialized() {
            return;
        }
        let timer = Stopwatch::start_new();
        if let Some(particles) = self.particles_mut() {
            particles.update(delta_time);
        }
        self.timings.update_ms = timer.elapsed_ms();
    }

    /// Draw one frame
    pub fn render(&mut self, state: &GameState) {
        if !self.is_initialized() {
            return;
        }
        let frame_ms = self.clock.tick();
        let timer = Stopwatch::start_new();

        self.surface.clear(Color::BLACK);
        self.pipeline
            .render(&mut self.surface, &self.camera, state.interpolation, state);
        if self.config.debug_overlay {
            self.draw_debug_overlay();
        }

        self.timings.render_ms = timer.elapsed_ms();
        self.timings.frame_ms = frame_ms;
        self.timings.fps = self.clock.fps();
        self.timings.frame_count = self.clock.frame_count();
    }

    fn draw_debug_overlay(&mut self) {
        let particle_count = self.particle_count();
        let position = self.camera.position();
        let mut lines = vec![
            format!("FPS: {:.1}", self.timings.fps),
            format!("Camera: ({:.0}, {:.0}) x{:.2}", position.x, position.y, self.camera.zoom()),
            format!("Particles: {particle_count}"),
            format!("Draw calls: {}", self.pipeline.metrics().draw_calls),
        ];
        let disabled = self.pipeline.disabled_renderers();
        if !disabled.is_empty() {
            lines.push(format!("Disabled: {}", disabled.join(", ")));
        }

        let height = 8.0 + lines.len() as f32 * 16.0;
        self.surface.save();
        self.surface
            .fill_rect(8.0, 8.0, 240.0, height, &Color::BLACK.with_alpha(0.6).into());
        for (i, line) in lines.iter().enumerate() {
            self.surface.fill_text(
                line,
                16.0,
                26.0 + i as f32 * 16.0,
                12.0,
                &Color::rgb(0, 255, 128).into(),
                TextAlign::Left,
            );
        }
        self.surface.restore();
    }

    /// Resize the surface and the camera viewport
    pub fn resize(&mut self, width: f32, height: f32) {
        self.surface.resize(width, height);
        self.camera.resize(width, height);
        log::info!("Rendering system resized to {}x{}", width, height);
    }

    fn particles_mut(&mut self) -> Option<&mut ParticleRenderer> {
        let key = self.particle_key?;
        self.pipeline.renderer_as_mut::<ParticleRenderer>(key)
    }

    /// The particle renderer, once initialized
    pub fn particles(&self) -> Option<&ParticleRenderer> {
        let key = self.particle_key?;
        self.pipeline.renderer_as::<ParticleRenderer>(key)
    }

    /// Spawn one particle; false before initialization or at the active cap
    pub fn spawn_particle(&mut self, spawn: &ParticleSpawn) -> bool {
        self.particles_mut()
            .is_some_and(|particles| particles.spawn_particle(spawn).is_some())
    }

    /// Burst for an element combination
    pub fn create_combination_particles(&mut self, x: f32, y: f32, color: Color) {
        if let Some(particles) = self.particles_mut() {
            particles.create_combination_particles(x, y, color);
        }
    }

    /// Debris along a dying snake
    pub fn create_death_particles(&mut self, snake: &Snake, color: Color) {
        if let Some(particles) = self.particles_mut() {
            particles.create_death_particles(snake, color);
        }
    }

    /// Exhaust puff behind a boosting snake
    pub fn create_boost_particle(&mut self, x: f32, y: f32, angle: f32, color: Color) {
        if let Some(particles) = self.particles_mut() {
            particles.create_boost_particle(x, y, angle, color);
        }
    }

    /// Particles in flight
    pub fn particle_count(&self) -> usize {
        self.particles().map_or(0, ParticleRenderer::active_count)
    }

    /// Register a skin image that finished loading
    pub fn set_skin_image(&mut self, skin: impl Into<String>, image: ImageHandle) {
        if let Some(snakes) = self
            .snake_key
            .and_then(|key| self.pipeline.renderer_as_mut::<SnakeRenderer>(key))
        {
            snakes.set_skin(skin, image);
        }
    }

    /// Whether a named renderer is enabled
    pub fn renderer_enabled(&self, name: &str) -> Option<bool> {
        self.pipeline.renderer_enabled(name)
    }

    /// Enable or disable a named renderer
    pub fn set_renderer_enabled(&mut self, name: &str, enabled: bool) -> RenderResult<()> {
        Ok(self.pipeline.set_renderer_enabled(name, enabled)?)
    }

    /// Pipeline metrics from the last frame
    pub const fn metrics(&self) -> &PipelineMetrics {
        self.pipeline.metrics()
    }

    /// Clear metrics and re-enable every renderer
    pub fn reset_metrics(&mut self) {
        self.pipeline.reset_metrics();
    }

    /// Timing of the last frame
    pub const fn timings(&self) -> FrameTimings {
        self.timings
    }

    /// Camera
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera, for follow, zoom, shake and update
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Render pipeline
    pub const fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    /// Mutable render pipeline, for custom renderers
    pub fn pipeline_mut(&mut self) -> &mut RenderPipeline {
        &mut self.pipeline
    }

    /// Drawing surface
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable drawing surface
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Active configuration
    pub const fn config(&self) -> &RenderConfig {
        &self.config
    }
}
