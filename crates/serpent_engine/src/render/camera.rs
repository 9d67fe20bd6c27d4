//! # 2D Camera
//!
//! Sole authority for the world/screen affine transform and for smoothed
//! camera motion.
//!
//! ## Transform
//!
//! `screen = (world - position) * zoom + viewport_center + shake_offset`
//!
//! [`Camera::screen_to_world`] is the exact algebraic inverse, so a round trip
//! returns the original point to floating-point tolerance in any camera state.
//!
//! ## Motion
//!
//! - Position and zoom ease toward their targets with the frame-rate
//!   independent factor `1 - (1 - smoothing)^(dt / 16.67)`
//! - Shake decays geometrically per update and snaps to zero below an epsilon
//! - Optional world bounds clamp the position after smoothing

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::core::config::CameraConfig;
use crate::foundation::math::{utils, Vec2};
use crate::foundation::time::FRAME_MS;
use crate::render::error::CameraError;

/// Position and heading of something the camera can interpolate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// World X
    pub x: f32,
    /// World Y
    pub y: f32,
    /// Heading in radians
    pub angle: f32,
}

impl Pose {
    /// Create a pose
    pub const fn new(x: f32, y: f32, angle: f32) -> Self {
        Self { x, y, angle }
    }
}

/// Anything with a previous and a current simulated pose
pub trait Interpolatable {
    /// Pose at the previous simulation step
    fn previous_pose(&self) -> Pose;

    /// Pose at the current simulation step
    fn current_pose(&self) -> Pose;
}

/// Axis-aligned world rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    /// Left edge
    pub min_x: f32,
    /// Top edge
    pub min_y: f32,
    /// Right edge
    pub max_x: f32,
    /// Bottom edge
    pub max_y: f32,
}

impl WorldBounds {
    /// Create bounds from edges
    pub const fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Bounds `[-w/2, w/2] x [-h/2, h/2]` centred on the origin
    pub fn centered(width: f32, height: f32) -> Self {
        Self::new(-width / 2.0, -height / 2.0, width / 2.0, height / 2.0)
    }

    /// Width of the rectangle
    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Height of the rectangle
    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    /// Whether the point lies inside or on the edge
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Whether two rectangles overlap
    pub fn intersects(&self, other: &Self) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Finite edges with `min <= max` on both axes
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|edge| edge.is_finite())
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    /// Clamp a point into the rectangle
    ///
    /// Never panics; on invalid bounds the max edge wins.
    pub fn clamp(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.max(self.min_x).min(self.max_x),
            point.y.max(self.min_y).min(self.max_y),
        )
    }
}

/// Flat, JSON-compatible record of every camera field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraState {
    /// Current X
    pub x: f32,
    /// Current Y
    pub y: f32,
    /// Smoothing target X
    pub target_x: f32,
    /// Smoothing target Y
    pub target_y: f32,
    /// Current zoom
    pub zoom: f32,
    /// Smoothing target zoom
    pub target_zoom: f32,
    /// Viewport width in pixels
    pub viewport_width: f32,
    /// Viewport height in pixels
    pub viewport_height: f32,
    /// Smoothing factor
    pub smoothing: f32,
    /// Remaining shake intensity
    pub shake_intensity: f32,
    /// Current shake offset X
    pub shake_offset_x: f32,
    /// Current shake offset Y
    pub shake_offset_y: f32,
    /// Optional world bounds
    pub bounds: Option<WorldBounds>,
}

impl CameraState {
    /// Check the fields a camera cannot run with
    pub fn validate(&self) -> Result<(), String> {
        let numbers = [
            self.x,
            self.y,
            self.target_x,
            self.target_y,
            self.zoom,
            self.target_zoom,
            self.viewport_width,
            self.viewport_height,
            self.smoothing,
            self.shake_intensity,
            self.shake_offset_x,
            self.shake_offset_y,
        ];
        if numbers.iter().any(|value| !value.is_finite()) {
            return Err("Camera state contains a non-finite value".to_string());
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(format!("Smoothing must be within [0, 1], got {}", self.smoothing));
        }
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return Err(format!(
                "Viewport must be positive, got {}x{}",
                self.viewport_width, self.viewport_height
            ));
        }
        if self.shake_intensity < 0.0 {
            return Err(format!("Shake intensity must not be negative, got {}", self.shake_intensity));
        }
        if let Some(bounds) = self.bounds {
            if !bounds.is_valid() {
                return Err(format!("Bounds are not a valid rectangle: {bounds:?}"));
            }
        }
        Ok(())
    }
}

/// Smoothed 2D camera
#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec2,
    target: Vec2,
    zoom: f32,
    target_zoom: f32,
    viewport: Vec2,
    bounds: Option<WorldBounds>,
    smoothing: f32,
    shake_intensity: f32,
    shake_offset: Vec2,
    config: CameraConfig,
    rng: StdRng,
}

impl Camera {
    /// Create a camera at the origin from configuration
    pub fn new(config: CameraConfig, seed: u64) -> Self {
        Self {
            position: Vec2::zeros(),
            target: Vec2::zeros(),
            zoom: 1.0,
            target_zoom: 1.0,
            viewport: Vec2::new(config.viewport_width, config.viewport_height),
            bounds: None,
            smoothing: config.smoothing,
            shake_intensity: 0.0,
            shake_offset: Vec2::zeros(),
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a camera with default settings for the given viewport
    pub fn with_viewport(width: f32, height: f32) -> Self {
        Self::new(CameraConfig::new(width, height), 0)
    }

    /// Current world position
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Smoothing target position
    pub const fn target(&self) -> Vec2 {
        self.target
    }

    /// Current zoom
    pub const fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Smoothing target zoom
    pub const fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    /// Viewport width in pixels
    pub fn viewport_width(&self) -> f32 {
        self.viewport.x
    }

    /// Viewport height in pixels
    pub fn viewport_height(&self) -> f32 {
        self.viewport.y
    }

    /// World bounds, if any
    pub const fn bounds(&self) -> Option<WorldBounds> {
        self.bounds
    }

    /// Remaining shake intensity
    pub const fn shake_intensity(&self) -> f32 {
        self.shake_intensity
    }

    /// Current shake offset in pixels
    pub const fn shake_offset(&self) -> Vec2 {
        self.shake_offset
    }

    /// Configuration the camera was built from
    pub const fn config(&self) -> &CameraConfig {
        &self.config
    }

    fn viewport_center(&self) -> Vec2 {
        self.viewport * 0.5
    }

    /// Convert a world point to screen pixels
    pub fn world_to_screen(&self, world_x: f32, world_y: f32) -> Vec2 {
        (Vec2::new(world_x, world_y) - self.position) * self.zoom
            + self.viewport_center()
            + self.shake_offset
    }

    /// Convert screen pixels to a world point
    pub fn screen_to_world(&self, screen_x: f32, screen_y: f32) -> Vec2 {
        (Vec2::new(screen_x, screen_y) - self.shake_offset - self.viewport_center()) / self.zoom
            + self.position
    }

    /// Ease toward the targets, decay shake and clamp to bounds
    pub fn update(&mut self, delta_time: f32) {
        let factor = 1.0 - (1.0 - self.smoothing).powf(delta_time / FRAME_MS);
        self.position += (self.target - self.position) * factor;
        self.zoom += (self.target_zoom - self.zoom) * factor;

        if self.shake_intensity > 0.0 {
            let intensity = self.shake_intensity;
            self.shake_offset = Vec2::new(
                self.rng.gen_range(-intensity..=intensity),
                self.rng.gen_range(-intensity..=intensity),
            );
            self.shake_intensity *= self.config.shake_decay;
            if self.shake_intensity < self.config.shake_epsilon {
                self.shake_intensity = 0.0;
                self.shake_offset = Vec2::zeros();
            }
        }

        self.clamp_to_bounds();
    }

    fn clamp_to_bounds(&mut self) {
        if let Some(bounds) = self.bounds {
            self.position = bounds.clamp(self.position);
        }
    }

    /// Margin for an explicit override, an entity type, or the default
    pub fn culling_margin(&self, margin: Option<f32>, entity_type: Option<&str>) -> f32 {
        margin
            .or_else(|| entity_type.and_then(|kind| self.config.culling_margins.get(kind).copied()))
            .unwrap_or(self.config.default_margin)
    }

    /// Whether a world point falls inside the viewport expanded by a margin
    pub fn is_in_viewport(
        &self,
        world_x: f32,
        world_y: f32,
        margin: Option<f32>,
        entity_type: Option<&str>,
    ) -> bool {
        let margin = self.culling_margin(margin, entity_type);
        let screen = self.world_to_screen(world_x, world_y);
        screen.x >= -margin
            && screen.x <= self.viewport.x + margin
            && screen.y >= -margin
            && screen.y <= self.viewport.y + margin
    }

    /// World rectangle currently visible, ignoring shake
    pub fn visible_world_bounds(&self) -> WorldBounds {
        let half = self.viewport_center() / self.zoom;
        WorldBounds::new(
            self.position.x - half.x,
            self.position.y - half.y,
            self.position.x + half.x,
            self.position.y + half.y,
        )
    }

    /// Blend between previous and current pose, turning along the shortest arc
    pub fn interpolate<T: Interpolatable + ?Sized>(&self, entity: &T, delta: f32) -> Pose {
        let t = delta.clamp(0.0, 1.0);
        let previous = entity.previous_pose();
        let current = entity.current_pose();
        Pose::new(
            utils::lerp(previous.x, current.x, t),
            utils::lerp(previous.y, current.y, t),
            utils::lerp_angle(previous.angle, current.angle, t),
        )
    }

    /// Track an external position; `immediate` skips smoothing
    pub fn follow(&mut self, target: Vec2, immediate: bool) {
        self.target = target;
        if immediate {
            self.position = target;
            self.clamp_to_bounds();
        }
    }

    /// Set the zoom target, clamped to the configured range
    pub fn set_zoom(&mut self, zoom: f32, immediate: bool) {
        self.target_zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
        if immediate {
            self.zoom = self.target_zoom;
        }
    }

    /// Add shake; the stronger of current and new intensity wins
    ///
    /// Non-finite intensities are ignored.
    pub fn shake(&mut self, intensity: f32) {
        if !intensity.is_finite() {
            log::warn!("Ignoring non-finite camera shake {}", intensity);
            return;
        }
        self.shake_intensity = self.shake_intensity.max(intensity);
    }

    /// Set or remove world bounds; invalid rectangles are ignored
    pub fn set_bounds(&mut self, bounds: Option<WorldBounds>) {
        if let Some(invalid) = bounds.filter(|bounds| !bounds.is_valid()) {
            log::warn!("Ignoring invalid camera bounds {:?}", invalid);
            return;
        }
        self.bounds = bounds;
        self.clamp_to_bounds();
    }

    /// Change the viewport size
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        log::debug!("Camera viewport resized to {}x{}", width, height);
    }

    /// Override the culling margin of an entity type
    pub fn set_culling_margin(&mut self, entity_type: impl Into<String>, margin: f32) {
        self.config.culling_margins.insert(entity_type.into(), margin);
    }

    /// Snapshot every field
    pub fn state(&self) -> CameraState {
        CameraState {
            x: self.position.x,
            y: self.position.y,
            target_x: self.target.x,
            target_y: self.target.y,
            zoom: self.zoom,
            target_zoom: self.target_zoom,
            viewport_width: self.viewport.x,
            viewport_height: self.viewport.y,
            smoothing: self.smoothing,
            shake_intensity: self.shake_intensity,
            shake_offset_x: self.shake_offset.x,
            shake_offset_y: self.shake_offset.y,
            bounds: self.bounds,
        }
    }

    /// Restore every field from a snapshot
    ///
    /// Invalid snapshots are rejected untouched; zooms are clamped to the
    /// configured range.
    pub fn apply_state(&mut self, state: &CameraState) -> Result<(), CameraError> {
        state.validate().map_err(CameraError::Invalid)?;
        let (min_zoom, max_zoom) = (self.config.min_zoom, self.config.max_zoom);
        self.position = Vec2::new(state.x, state.y);
        self.target = Vec2::new(state.target_x, state.target_y);
        self.zoom = state.zoom.clamp(min_zoom, max_zoom);
        self.target_zoom = state.target_zoom.clamp(min_zoom, max_zoom);
        self.viewport = Vec2::new(state.viewport_width, state.viewport_height);
        self.smoothing = state.smoothing;
        self.shake_intensity = state.shake_intensity;
        self.shake_offset = Vec2::new(state.shake_offset_x, state.shake_offset_y);
        self.bounds = state.bounds;
        Ok(())
    }

    /// Serialize the camera state to JSON
    pub fn to_json(&self) -> Result<String, CameraError> {
        Ok(serde_json::to_string(&self.state())?)
    }

    /// Restore the camera state from JSON
    pub fn from_json(&mut self, json: &str) -> Result<(), CameraError> {
        let state: CameraState = serde_json::from_str(json)?;
        self.apply_state(&state)?;
        log::debug!("Camera restored to ({}, {}) zoom {}", state.x, state.y, state.zoom);
        Ok(())
    }
}
