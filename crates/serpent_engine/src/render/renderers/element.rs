//! Element renderer: collectable glyphs with tier colours and highlights

use std::any::Any;

use crate::foundation::math::Vec2;
use crate::render::camera::Camera;
use crate::render::error::RenderResult;
use crate::render::game_state::{Element, GameState};
use crate::render::renderer::{Renderer, RendererMetrics};
use crate::render::surface::{Color, DrawSurface, RadialGradient, TextAlign};

use super::{ensure_usable_camera, star_points};

/// Glyph drawn when element data has not been resolved
pub const FALLBACK_GLYPH: &str = "?";

/// Base element radius in world units
const BASE_SIZE: f32 = 18.0;

/// Zoom at which names appear under the glyph on desktop
const NAME_ZOOM: f32 = 1.5;

const TIER_COLORS: [Color; 6] = [
    Color::rgb(200, 200, 200),
    Color::rgb(102, 204, 102),
    Color::rgb(80, 160, 255),
    Color::rgb(170, 90, 255),
    Color::rgb(255, 170, 40),
    Color::rgb(255, 70, 110),
];

/// Colour of a rarity tier; tiers past the table share the last colour
pub fn tier_color(tier: u8) -> Color {
    TIER_COLORS[usize::from(tier).min(TIER_COLORS.len() - 1)]
}

/// Draws collectable elements
#[derive(Debug, Clone)]
pub struct ElementRenderer {
    mobile: bool,
    metrics: RendererMetrics,
}

impl ElementRenderer {
    /// Registered name
    pub const NAME: &'static str = "element";

    /// Create the renderer
    pub const fn new(mobile: bool) -> Self {
        Self {
            mobile,
            metrics: RendererMetrics {
                draw_calls: 0,
                culled: 0,
                total: 0,
            },
        }
    }

    fn draw_element(&mut self, surface: &mut dyn DrawSurface, camera: &Camera, state: &GameState, element: &Element) {
        let screen = camera.world_to_screen(element.x, element.y);
        let time = state.time_ms;
        let pulse = 1.0 + 0.1 * (element.pulse + time * 0.003).sin();
        let radius = BASE_SIZE * camera.zoom() * pulse;
        let tier = element.data.as_ref().map_or(0, |data| data.tier);
        let color = tier_color(tier);

        if state.alchemy_vision && state.is_discovered(&element.id) {
            self.draw_alchemy_glow(surface, screen, radius);
        }

        if !self.mobile && tier >= 2 {
            surface.set_shadow(color, 6.0 * f32::from(tier));
        }
        surface.fill_circle(screen.x, screen.y, radius, &color.with_alpha(0.25).into());
        surface.stroke_circle(screen.x, screen.y, radius, &color.into(), 2.0);
        if !self.mobile && tier >= 2 {
            surface.set_shadow(Color::TRANSPARENT, 0.0);
        }
        self.metrics.draw_calls += 2;

        if element.pending_combination {
            let ring = 0.5 + 0.5 * (time * 0.01).sin();
            surface.stroke_circle(screen.x, screen.y, radius * 1.35, &Color::WHITE.with_alpha(ring).into(), 2.0);
            self.metrics.draw_calls += 1;
        }

        if element.is_catalyst_spawned && !self.mobile {
            self.draw_sparkles(surface, screen, radius, time);
        }

        let glyph = element.data.as_ref().map_or(FALLBACK_GLYPH, |data| data.emoji.as_str());
        surface.fill_text(glyph, screen.x, screen.y + radius * 0.35, radius * 1.1, &Color::WHITE.into(), TextAlign::Center);
        self.metrics.draw_calls += 1;

        if !self.mobile && camera.zoom() >= NAME_ZOOM {
            if let Some(data) = &element.data {
                surface.fill_text(&data.name, screen.x, screen.y + radius * 1.8, 11.0, &color.into(), TextAlign::Center);
                self.metrics.draw_calls += 1;
            }
        }
    }

    fn draw_alchemy_glow(&mut self, surface: &mut dyn DrawSurface, screen: Vec2, radius: f32) {
        let gold = Color::rgb(255, 215, 0);
        if self.mobile {
            surface.stroke_circle(screen.x, screen.y, radius * 1.5, &gold.into(), 1.5);
        } else {
            let glow = RadialGradient::new(screen, radius * 2.0)
                .with_stop(0.0, gold.with_alpha(0.6))
                .with_stop(1.0, gold.with_alpha(0.0));
            surface.fill_circle(screen.x, screen.y, radius * 2.0, &glow.into());
        }
        self.metrics.draw_calls += 1;
    }

    fn draw_sparkles(&mut self, surface: &mut dyn DrawSurface, screen: Vec2, radius: f32, time: f32) {
        let sparkle = Color::rgb(255, 255, 200);
        for i in 0..4 {
            let angle = time * 0.002 + i as f32 * std::f32::consts::FRAC_PI_2;
            let center = screen + Vec2::new(angle.cos(), angle.sin()) * radius * 1.4;
            let points = star_points(center, radius * 0.25, radius * 0.1, 4, angle);
            surface.fill_polygon(&points, &sparkle.into());
            self.metrics.draw_calls += 1;
        }
    }
}

impl Default for ElementRenderer {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Renderer for ElementRenderer {
    fn name(&self) -> Option<&str> {
        Some(Self::NAME)
    }

    fn should_render(&self, _camera: &Camera, state: &GameState) -> bool {
        !state.elements.is_empty()
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
        for element in &state.elements {
            self.metrics.total += 1;
            if !camera.is_in_viewport(element.x, element.y, None, Some("element")) {
                self.metrics.culled += 1;
                continue;
            }
            self.draw_element(surface, camera, state, element);
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
    use crate::render::game_state::ElementData;
    use crate::render::surface::{DrawCommand, Paint, RecordingSurface};

    fn draw(renderer: &mut ElementRenderer, state: &GameState) -> RecordingSurface {
        let mut surface = RecordingSurface::new(800.0, 600.0);
        renderer
            .render(&mut surface, state, &Camera::with_viewport(800.0, 600.0), 1.0)
            .unwrap();
        surface
    }

    fn with_elements(elements: Vec<Element>) -> GameState {
        GameState {
            elements,
            ..GameState::default()
        }
    }

    fn fire() -> Element {
        Element::new("fire", 0.0, 0.0, Some(ElementData::new("🔥", "Fire", 3)))
    }

    #[test]
    fn test_glyph_and_fallback() {
        let state = with_elements(vec![fire(), Element::new("mystery", 10.0, 10.0, None)]);
        let surface = draw(&mut ElementRenderer::new(true), &state);
        assert_eq!(surface.texts(), vec!["🔥", FALLBACK_GLYPH]);
    }

    #[test]
    fn test_catalyst_sparkle_desktop_only() {
        let mut element = fire();
        element.is_catalyst_spawned = true;
        let state = with_elements(vec![element]);
        let polygons = |surface: &RecordingSurface| surface.count(|command| matches!(command, DrawCommand::FillPolygon { .. }));

        assert_eq!(polygons(&draw(&mut ElementRenderer::new(false), &state)), 4);
        assert_eq!(polygons(&draw(&mut ElementRenderer::new(true), &state)), 0);
    }

    #[test]
    fn test_alchemy_vision_highlights_discovered() {
        let mut state = with_elements(vec![fire()]);
        state.discovered_combinations.insert("fire".to_string());
        let radial = |surface: &RecordingSurface| {
            surface.count(|command| matches!(command, DrawCommand::FillCircle { paint: Paint::Radial(_), .. }))
        };

        assert_eq!(radial(&draw(&mut ElementRenderer::new(false), &state)), 0);
        state.alchemy_vision = true;
        assert_eq!(radial(&draw(&mut ElementRenderer::new(false), &state)), 1);
        // Mobile swaps the gradient for a plain ring
        let mobile = draw(&mut ElementRenderer::new(true), &state);
        assert_eq!(radial(&mobile), 0);
        assert_eq!(mobile.count(|command| matches!(command, DrawCommand::StrokeCircle { .. })), 2);
    }

    #[test]
    fn test_pending_ring() {
        let mut element = fire();
        element.pending_combination = true;
        let surface = draw(&mut ElementRenderer::new(true), &with_elements(vec![element]));
        assert_eq!(surface.count(|command| matches!(command, DrawCommand::StrokeCircle { .. })), 2);
    }

    #[test]
    fn test_tier_glow_shadow_desktop_only() {
        let state = with_elements(vec![fire()]);
        let shadows = |mobile| draw(&mut ElementRenderer::new(mobile), &state).count(|command| matches!(command, DrawCommand::Shadow { .. }));
        assert_eq!(shadows(false), 2);
        assert_eq!(shadows(true), 0);
    }

    #[test]
    fn test_culling_counts() {
        let state = with_elements(vec![fire(), Element::new("far", 2000.0, 0.0, None)]);
        let mut renderer = ElementRenderer::default();
        draw(&mut renderer, &state);
        let metrics = renderer.metrics().unwrap();
        assert_eq!((metrics.total, metrics.culled), (2, 1));
    }

    #[test]
    fn test_tier_colour_clamped() {
        assert_eq!(tier_color(200), tier_color(5));
        assert_ne!(tier_color(0), tier_color(1));
    }
}
