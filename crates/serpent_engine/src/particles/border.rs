//! Ambient particles along the arena edges
//!
//! Border particles never die. Position and opacity are pure functions of
//! elapsed time, so two renders at the same time draw the same frame.

use rand::Rng;

use crate::foundation::math::Vec2;
use crate::render::camera::WorldBounds;

/// World edge a border particle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// `min_y`
    Top,
    /// `max_y`
    Bottom,
    /// `min_x`
    Left,
    /// `max_x`
    Right,
}

impl Edge {
    /// Every edge
    pub const ALL: [Self; 4] = [Self::Top, Self::Bottom, Self::Left, Self::Right];

    /// Unit vector pointing into the arena
    pub fn inward(self) -> Vec2 {
        match self {
            Self::Top => Vec2::new(0.0, 1.0),
            Self::Bottom => Vec2::new(0.0, -1.0),
            Self::Left => Vec2::new(1.0, 0.0),
            Self::Right => Vec2::new(-1.0, 0.0),
        }
    }

    /// Unit vector running along the edge
    pub fn tangent(self) -> Vec2 {
        match self {
            Self::Top | Self::Bottom => Vec2::new(1.0, 0.0),
            Self::Left | Self::Right => Vec2::new(0.0, 1.0),
        }
    }
}

/// Decorative particle oscillating near one edge
#[derive(Debug, Clone, PartialEq)]
pub struct BorderParticle {
    /// Edge it hugs
    pub edge: Edge,
    /// Rest position on the edge
    pub anchor: Vec2,
    /// Oscillation phase offset in radians
    pub phase: f32,
    /// Oscillation amplitude in world units
    pub amplitude: f32,
    /// Angular speed in radians per millisecond
    pub speed: f32,
    /// Peak opacity
    pub base_alpha: f32,
    /// Radius
    pub size: f32,
}

impl BorderParticle {
    /// Particle anchored at a point of an edge
    pub fn new(edge: Edge, anchor: Vec2, phase: f32) -> Self {
        Self {
            edge,
            anchor,
            phase,
            amplitude: 12.0,
            speed: 0.002,
            base_alpha: 0.6,
            size: 2.0,
        }
    }

    /// Spread `per_edge` particles evenly along every edge of `bounds`
    pub fn along_edges<R: Rng + ?Sized>(bounds: &WorldBounds, per_edge: usize, rng: &mut R) -> Vec<Self> {
        let mut particles = Vec::with_capacity(per_edge * Edge::ALL.len());
        for edge in Edge::ALL {
            for i in 0..per_edge {
                let t = (i as f32 + 0.5) / per_edge as f32;
                let anchor = match edge {
                    Edge::Top => Vec2::new(bounds.min_x + bounds.width() * t, bounds.min_y),
                    Edge::Bottom => Vec2::new(bounds.min_x + bounds.width() * t, bounds.max_y),
                    Edge::Left => Vec2::new(bounds.min_x, bounds.min_y + bounds.height() * t),
                    Edge::Right => Vec2::new(bounds.max_x, bounds.min_y + bounds.height() * t),
                };
                let mut particle = Self::new(edge, anchor, rng.gen_range(0.0..std::f32::consts::TAU));
                particle.speed *= rng.gen_range(0.6..1.4);
                particle.size = rng.gen_range(1.0..3.0);
                particles.push(particle);
            }
        }
        particles
    }

    /// World position at `time_ms`
    pub fn position(&self, time_ms: f32) -> Vec2 {
        let wave = time_ms * self.speed + self.phase;
        let inward = self.amplitude * (0.5 + 0.5 * wave.sin());
        let drift = self.amplitude * 0.5 * (wave * 0.5).cos();
        self.anchor + self.edge.inward() * inward + self.edge.tangent() * drift
    }

    /// Opacity at `time_ms`
    pub fn opacity(&self, time_ms: f32) -> f32 {
        let wave = time_ms * self.speed * 1.3 + self.phase;
        self.base_alpha * (0.35 + 0.65 * (0.5 + 0.5 * wave.sin()))
    }
}
