//! # Render Configuration
//!
//! All tunables of the presentation core in one serializable tree. Renderers
//! receive a clone of the relevant section at construction time and never read
//! ambient globals.
//!
//! ## Configuration Categories
//!
//! - **Camera Config**: Viewport, smoothing, zoom limits, culling margins
//! - **Pipeline Config**: Metrics and renderer fault thresholds
//! - **Particle Config**: Pool sizing and per-platform active caps
//! - **Background Config**: Parallax star layers and palette

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Config;

/// Lowest zoom the camera accepts
pub const MIN_ZOOM: f32 = 0.1;

/// Highest zoom the camera accepts
pub const MAX_ZOOM: f32 = 5.0;

/// # Camera Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Viewport width in pixels
    pub viewport_width: f32,
    /// Viewport height in pixels
    pub viewport_height: f32,
    /// Smoothing factor per reference frame in `[0, 1]` (1 = snap)
    pub smoothing: f32,
    /// Lower zoom clamp
    pub min_zoom: f32,
    /// Upper zoom clamp
    pub max_zoom: f32,
    /// Margin used when neither an override nor an entity type is given
    pub default_margin: f32,
    /// Per entity type culling margins in screen pixels
    pub culling_margins: BTreeMap<String, f32>,
    /// Shake intensity below which shake is zeroed
    pub shake_epsilon: f32,
    /// Geometric shake decay per update call
    pub shake_decay: f32,
}

impl CameraConfig {
    /// Create a camera configuration for the given viewport
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            viewport_width,
            viewport_height,
            ..Self::default()
        }
    }

    /// Override one entity type's culling margin
    pub fn with_margin(mut self, entity_type: impl Into<String>, margin: f32) -> Self {
        self.culling_margins.insert(entity_type.into(), margin);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.viewport_width <= 0.0 || self.viewport_height <= 0.0 {
            return Err(format!(
                "Viewport must be positive, got {}x{}",
                self.viewport_width, self.viewport_height
            ));
        }
        if !(0.0..=1.0).contains(&self.smoothing) {
            return Err(format!("Smoothing must be within [0, 1], got {}", self.smoothing));
        }
        if self.min_zoom < MIN_ZOOM || self.max_zoom > MAX_ZOOM || self.min_zoom > self.max_zoom {
            return Err(format!(
                "Zoom range [{}, {}] must lie within [{}, {}]",
                self.min_zoom, self.max_zoom, MIN_ZOOM, MAX_ZOOM
            ));
        }
        if !(0.0..1.0).contains(&self.shake_decay) {
            return Err(format!("Shake decay must be within [0, 1), got {}", self.shake_decay));
        }
        Ok(())
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        let mut culling_margins = BTreeMap::new();
        culling_margins.insert("snake".to_string(), 300.0);
        culling_margins.insert("element".to_string(), 100.0);
        culling_margins.insert("particle".to_string(), 50.0);
        culling_margins.insert("border".to_string(), 200.0);
        culling_margins.insert("decoration".to_string(), 150.0);

        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            smoothing: 0.1,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            default_margin: 100.0,
            culling_margins,
            shake_epsilon: 0.1,
            shake_decay: 0.95,
        }
    }
}

/// # Pipeline Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Whether per-frame metrics are collected
    pub metrics_enabled: bool,
    /// Errors after which a renderer is disabled
    pub max_errors_per_renderer: u32,
    /// Length of the rolling error list
    pub max_error_log: usize,
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_errors_per_renderer == 0 {
            return Err("Max errors per renderer must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            max_errors_per_renderer: 3,
            max_error_log: 32,
        }
    }
}

/// # Particle Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Particles pre-allocated in the free list
    pub pool_size: usize,
    /// Active particle cap on desktop
    pub max_active_desktop: usize,
    /// Active particle cap on mobile
    pub max_active_mobile: usize,
    /// Ambient particles per world edge on desktop (mobile uses a quarter)
    pub border_particles_per_edge: usize,
}

impl ParticleConfig {
    /// Active cap for the platform
    pub const fn max_active(&self, mobile: bool) -> usize {
        if mobile {
            self.max_active_mobile
        } else {
            self.max_active_desktop
        }
    }

    /// Border particles per edge for the platform
    pub const fn border_particles(&self, mobile: bool) -> usize {
        if mobile {
            self.border_particles_per_edge / 4
        } else {
            self.border_particles_per_edge
        }
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            pool_size: 200,
            max_active_desktop: 1000,
            max_active_mobile: 250,
            border_particles_per_edge: 24,
        }
    }
}

/// # Background Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    /// Stars per parallax layer, nearest layer last
    pub stars_per_layer: Vec<usize>,
    /// Fraction of camera motion each layer follows
    pub parallax_factors: Vec<f32>,
    /// Gradient top colour (hex)
    pub top_color: String,
    /// Gradient bottom colour (hex)
    pub bottom_color: String,
    /// Star colour (hex)
    pub star_color: String,
    /// Size of one tiled star-field cell in screen pixels
    pub tile_size: f32,
}

impl BackgroundConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.stars_per_layer.len() != self.parallax_factors.len() {
            return Err(format!(
                "Star layers ({}) and parallax factors ({}) differ in length",
                self.stars_per_layer.len(),
                self.parallax_factors.len()
            ));
        }
        if self.tile_size <= 0.0 {
            return Err("Tile size must be positive".to_string());
        }
        Ok(())
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            stars_per_layer: vec![60, 40, 20],
            parallax_factors: vec![0.1, 0.3, 0.5],
            top_color: "#05060f".to_string(),
            bottom_color: "#140a2a".to_string(),
            star_color: "#ffffff".to_string(),
            tile_size: 1024.0,
        }
    }
}

/// # Complete Render Configuration
///
/// Top-level configuration for the rendering system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Log level used when `RUST_LOG` is unset
    pub log_level: String,
    /// Constrained-device rendering path
    pub mobile: bool,
    /// Draw the diagnostic overlay after each frame
    pub debug_overlay: bool,
    /// Seed for decorative and particle randomness
    pub seed: u64,
    /// Camera section
    pub camera: CameraConfig,
    /// Pipeline section
    pub pipeline: PipelineConfig,
    /// Particle section
    pub particles: ParticleConfig,
    /// Background section
    pub background: BackgroundConfig,
}

impl RenderConfig {
    /// Enable or disable the mobile path
    pub const fn with_mobile(mut self, mobile: bool) -> Self {
        self.mobile = mobile;
        self
    }

    /// Enable or disable the debug overlay
    pub const fn with_debug_overlay(mut self, enabled: bool) -> Self {
        self.debug_overlay = enabled;
        self
    }

    /// Set the RNG seed
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), String> {
        self.camera.validate()?;
        self.pipeline.validate()?;
        self.background.validate()?;
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            mobile: false,
            debug_overlay: false,
            seed: 0x5EED,
            camera: CameraConfig::default(),
            pipeline: PipelineConfig::default(),
            particles: ParticleConfig::default(),
            background: BackgroundConfig::default(),
        }
    }
}

impl Config for RenderConfig {
    fn check(&self) -> Result<(), String> {
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RenderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_viewport_rejected() {
        let mut config = RenderConfig::default();
        config.camera.viewport_width = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zoom_range_limited_to_fixed_bounds() {
        let mut config = CameraConfig::default();
        config.min_zoom = 0.05;
        assert!(config.validate().is_err());

        config.min_zoom = MIN_ZOOM;
        config.max_zoom = 8.0;
        assert!(config.validate().is_err());

        config.min_zoom = 2.0;
        config.max_zoom = 1.0;
        assert!(config.validate().is_err());

        config.min_zoom = 0.5;
        config.max_zoom = 2.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_mismatched_parallax_rejected() {
        let mut config = RenderConfig::default();
        config.background.parallax_factors.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_config_uses_defaults() {
        let text = "mobile = true\n\n[pipeline]\nmax_errors_per_renderer = 5\n";
        let config = RenderConfig::from_str_with_format(text, "render.toml").unwrap();
        assert!(config.mobile);
        assert_eq!(config.pipeline.max_errors_per_renderer, 5);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn test_ron_round_trip() {
        let config = RenderConfig::default().with_mobile(true).with_seed(7);
        let text = ron::ser::to_string(&config).unwrap();
        let parsed = RenderConfig::from_str_with_format(&text, "render.ron").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = RenderConfig::from_str_with_format("", "render.yaml");
        assert!(matches!(result, Err(crate::config::ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_loaded_config_is_checked() {
        let text = "[camera]\nviewport_width = -1.0\n";
        let result = RenderConfig::from_str_with_format(text, "render.toml");
        assert!(matches!(result, Err(crate::config::ConfigError::Invalid(_))));
    }

    #[test]
    fn test_mobile_caps() {
        let particles = ParticleConfig::default();
        assert!(particles.max_active(true) < particles.max_active(false));
        assert_eq!(particles.border_particles(true), 6);
    }
}
