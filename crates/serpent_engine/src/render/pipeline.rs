//! # Render Pipeline
//!
//! Composes independently written renderers into one deterministic frame.
//!
//! - Layers run in ascending [`RenderLayer`] order, renderers within a layer
//!   in registration order
//! - Each call is contained: an `Err` or a panic is logged, counted against the
//!   renderer and never reaches sibling renderers or the caller
//! - A renderer reaching `max_errors_per_renderer` faults is disabled until
//!   [`RenderPipeline::reset_metrics`]

use std::collections::{BTreeMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};

use slotmap::{new_key_type, SlotMap};

use super::camera::Camera;
use super::error::{PipelineError, RenderError};
use super::game_state::GameState;
use super::layer::RenderLayer;
use super::renderer::Renderer;
use super::surface::DrawSurface;
use crate::core::config::PipelineConfig;
use crate::foundation::time::Stopwatch;

new_key_type! {
    /// Stable handle to a registered renderer
    pub struct RendererKey;
}

/// One contained renderer failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererFault {
    /// Renderer name
    pub renderer: String,
    /// Layer it ran on
    pub layer: RenderLayer,
    /// Error description
    pub message: String,
    /// Pipeline frame number
    pub frame: u64,
}

/// Aggregated per-frame statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineMetrics {
    /// Frames rendered since construction or the last reset
    pub frames: u64,
    /// Draw calls reported by renderers this frame
    pub draw_calls: usize,
    /// Entities culled this frame
    pub culled_entities: usize,
    /// Entities considered this frame
    pub total_entities: usize,
    /// Renderers invoked this frame
    pub renderers_run: usize,
    /// Renderers skipped (disabled or opted out) this frame
    pub renderers_skipped: usize,
    /// Milliseconds spent per layer this frame
    pub layer_timings: BTreeMap<RenderLayer, f32>,
    /// Milliseconds spent in the whole pipeline this frame
    pub total_ms: f32,
    /// Most recent faults, oldest first
    pub errors: VecDeque<RendererFault>,
}

impl PipelineMetrics {
    fn begin_frame(&mut self) {
        self.draw_calls = 0;
        self.culled_entities = 0;
        self.total_entities = 0;
        self.renderers_run = 0;
        self.renderers_skipped = 0;
        self.layer_timings.clear();
        self.total_ms = 0.0;
        self.errors.clear();
    }
}

struct RendererSlot {
    name: String,
    layer: RenderLayer,
    renderer: Box<dyn Renderer>,
    enabled: bool,
    error_count: u32,
}

/// Layer-ordered renderer host with fault containment
pub struct RenderPipeline {
    renderers: SlotMap<RendererKey, RendererSlot>,
    layers: BTreeMap<RenderLayer, Vec<RendererKey>>,
    config: PipelineConfig,
    metrics: PipelineMetrics,
    frame: u64,
    anonymous_count: u32,
}

impl RenderPipeline {
    /// Create an empty pipeline
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            renderers: SlotMap::with_key(),
            layers: BTreeMap::new(),
            config,
            metrics: PipelineMetrics::default(),
            frame: 0,
            anonymous_count: 0,
        }
    }

    /// Register a renderer on a layer, chaining
    pub fn register_renderer(&mut self, layer: RenderLayer, renderer: Box<dyn Renderer>) -> &mut Self {
        self.register(layer, renderer);
        self
    }

    /// Register a renderer on a layer and return its handle
    pub fn register(&mut self, layer: RenderLayer, renderer: Box<dyn Renderer>) -> RendererKey {
        let name = if let Some(name) = renderer.name() {
            name.to_string()
        } else {
            self.anonymous_count += 1;
            format!("{}_renderer_{}", layer.name(), self.anonymous_count)
        };

        log::debug!("Registered renderer '{}' on layer {}", name, layer);
        let key = self.renderers.insert(RendererSlot {
            name,
            layer,
            renderer,
            enabled: true,
            error_count: 0,
        });
        self.layers.entry(layer).or_default().push(key);
        key
    }

    /// Register on a raw layer index, rejecting unknown values
    pub fn register_raw(&mut self, layer: u8, renderer: Box<dyn Renderer>) -> Result<RendererKey, PipelineError> {
        let layer = RenderLayer::try_from(layer)?;
        Ok(self.register(layer, renderer))
    }

    /// Remove a renderer
    pub fn unregister(&mut self, key: RendererKey) -> Option<Box<dyn Renderer>> {
        let slot = self.renderers.remove(key)?;
        if let Some(keys) = self.layers.get_mut(&slot.layer) {
            keys.retain(|existing| *existing != key);
        }
        log::debug!("Unregistered renderer '{}'", slot.name);
        Some(slot.renderer)
    }

    /// Run every enabled renderer in layer order
    pub fn render(
        &mut self,
        surface: &mut dyn DrawSurface,
        camera: &Camera,
        interpolation: f32,
        state: &GameState,
    ) {
        if self.config.metrics_enabled {
            self.metrics.begin_frame();
        }
        self.frame += 1;
        self.metrics.frames += 1;
        let frame_timer = Stopwatch::start_new();

        let Self {
            renderers,
            layers,
            config,
            metrics,
            frame,
            ..
        } = self;

        for (layer, keys) in layers.iter() {
            let layer_timer = Stopwatch::start_new();

            for key in keys {
                let Some(slot) = renderers.get_mut(*key) else {
                    continue;
                };
                if !slot.enabled || !slot.renderer.should_render(camera, state) {
                    metrics.renderers_skipped += 1;
                    continue;
                }

                metrics.renderers_run += 1;
                let depth = surface.save_depth();
                surface.save();
                let renderer = &mut slot.renderer;
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    renderer.render(&mut *surface, state, camera, interpolation)
                }));
                unwind_to(surface, depth, &slot.name);

                let error = match outcome {
                    Ok(Ok(())) => None,
                    Ok(Err(error)) => Some(error),
                    Err(payload) => Some(RenderError::Panicked {
                        renderer: slot.name.clone(),
                        reason: panic_message(payload.as_ref()),
                    }),
                };

                match error {
                    None => {
                        if let Some(reported) = slot.renderer.metrics() {
                            metrics.draw_calls += reported.draw_calls;
                            metrics.culled_entities += reported.culled;
                            metrics.total_entities += reported.total;
                        }
                    }
                    Some(error) => record_fault(slot, metrics, config, *frame, &error),
                }
            }

            if config.metrics_enabled {
                metrics.layer_timings.insert(*layer, layer_timer.elapsed_ms());
            }
        }

        if config.metrics_enabled {
            metrics.total_ms = frame_timer.elapsed_ms();
        }
    }

    /// Clear metrics and error counts and re-enable every renderer
    pub fn reset_metrics(&mut self) {
        self.metrics = PipelineMetrics::default();
        for slot in self.renderers.values_mut() {
            if !slot.enabled {
                log::info!("Re-enabling renderer '{}'", slot.name);
            }
            slot.enabled = true;
            slot.error_count = 0;
        }
    }

    /// Current metrics
    pub const fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    /// Pipeline configuration
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Turn metric collection on or off
    pub fn set_metrics_enabled(&mut self, enabled: bool) {
        self.config.metrics_enabled = enabled;
    }

    /// Number of registered renderers
    pub fn renderer_count(&self) -> usize {
        self.renderers.len()
    }

    /// Handle of the first renderer with a name
    pub fn key_of(&self, name: &str) -> Option<RendererKey> {
        self.renderers
            .iter()
            .find(|(_, slot)| slot.name == name)
            .map(|(key, _)| key)
    }

    /// Name of a renderer
    pub fn name_of(&self, key: RendererKey) -> Option<&str> {
        self.renderers.get(key).map(|slot| slot.name.as_str())
    }

    /// Names of the renderers on a layer, in execution order
    pub fn layer_renderers(&self, layer: RenderLayer) -> Vec<&str> {
        self.layers
            .get(&layer)
            .into_iter()
            .flatten()
            .filter_map(|key| self.name_of(*key))
            .collect()
    }

    /// Names of disabled renderers
    pub fn disabled_renderers(&self) -> Vec<&str> {
        self.renderers
            .values()
            .filter(|slot| !slot.enabled)
            .map(|slot| slot.name.as_str())
            .collect()
    }

    /// Whether a named renderer is enabled
    pub fn renderer_enabled(&self, name: &str) -> Option<bool> {
        let key = self.key_of(name)?;
        self.renderers.get(key).map(|slot| slot.enabled)
    }

    /// Enable or disable a named renderer
    pub fn set_renderer_enabled(&mut self, name: &str, enabled: bool) -> Result<(), PipelineError> {
        let key = self
            .key_of(name)
            .ok_or_else(|| PipelineError::UnknownRenderer(name.to_string()))?;
        if let Some(slot) = self.renderers.get_mut(key) {
            slot.enabled = enabled;
        }
        Ok(())
    }

    /// Faults counted against a named renderer
    pub fn error_count(&self, name: &str) -> Option<u32> {
        let key = self.key_of(name)?;
        self.renderers.get(key).map(|slot| slot.error_count)
    }

    /// Borrow a renderer
    pub fn renderer(&self, key: RendererKey) -> Option<&dyn Renderer> {
        self.renderers.get(key).map(|slot| slot.renderer.as_ref())
    }

    /// Borrow a renderer as its concrete type
    pub fn renderer_as<T: Renderer>(&self, key: RendererKey) -> Option<&T> {
        self.renderers.get(key)?.renderer.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow a renderer as its concrete type
    pub fn renderer_as_mut<T: Renderer>(&mut self, key: RendererKey) -> Option<&mut T> {
        self.renderers
            .get_mut(key)?
            .renderer
            .as_any_mut()
            .downcast_mut::<T>()
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

fn record_fault(
    slot: &mut RendererSlot,
    metrics: &mut PipelineMetrics,
    config: &PipelineConfig,
    frame: u64,
    error: &RenderError,
) {
    slot.error_count += 1;
    log::error!(
        "Renderer '{}' on layer {} failed ({}/{}): {}",
        slot.name,
        slot.layer,
        slot.error_count,
        config.max_errors_per_renderer,
        error
    );

    metrics.errors.push_back(RendererFault {
        renderer: slot.name.clone(),
        layer: slot.layer,
        message: error.to_string(),
        frame,
    });
    while metrics.errors.len() > config.max_error_log {
        metrics.errors.pop_front();
    }

    if slot.error_count >= config.max_errors_per_renderer {
        slot.enabled = false;
        log::warn!(
            "Renderer '{}' disabled after {} errors",
            slot.name,
            slot.error_count
        );
    }
}

/// Restore until the save stack is back at `depth`, dropping state a renderer left behind
fn unwind_to(surface: &mut dyn DrawSurface, depth: usize, renderer: &str) {
    let leaked = surface.save_depth().saturating_sub(depth + 1);
    if leaked > 0 {
        log::warn!("Renderer '{}' left {} unbalanced save(s)", renderer, leaked);
    }
    while surface.save_depth() > depth {
        surface.restore();
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
