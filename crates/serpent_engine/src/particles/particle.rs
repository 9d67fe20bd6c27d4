//! Single simulated particle

use std::collections::VecDeque;

use crate::foundation::math::Vec2;
use crate::render::Color;

/// Shape drawn for a particle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleKind {
    /// Axis-aligned square rotated by the particle rotation
    Square,
    /// Filled circle
    #[default]
    Circle,
    /// Five-pointed star
    Star,
}

/// Parameters for spawning or resetting a particle
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSpawn {
    /// World X
    pub x: f32,
    /// World Y
    pub y: f32,
    /// Velocity X in world units per reference frame
    pub vx: f32,
    /// Velocity Y in world units per reference frame
    pub vy: f32,
    /// Life lost per reference frame
    pub fade_rate: f32,
    /// Radius or half-extent
    pub size: f32,
    /// Base colour
    pub color: Color,
    /// Shape
    pub kind: ParticleKind,
    /// Added to `vy` per reference frame
    pub gravity: f32,
    /// Velocity multiplier per reference frame
    pub drag: f32,
    /// Rotation change per reference frame
    pub rotation_speed: f32,
    /// Size change per reference frame
    pub growth: f32,
    /// Pulse angular speed per reference frame, zero disables pulsing
    pub pulse: f32,
    /// Trail history length, zero disables the trail
    pub trail_length: usize,
    /// Draw with additive glow on capable platforms
    pub glow: bool,
}

impl ParticleSpawn {
    /// Stationary circle at a position
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    /// Set the velocity
    pub const fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    /// Set the colour
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the shape
    pub const fn with_kind(mut self, kind: ParticleKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the fade rate
    pub const fn with_fade_rate(mut self, fade_rate: f32) -> Self {
        self.fade_rate = fade_rate;
        self
    }

    /// Set the size
    pub const fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Enable a trail of the given length
    pub const fn with_trail(mut self, length: usize) -> Self {
        self.trail_length = length;
        self
    }

    /// Set the gravity
    pub const fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Enable or disable glow
    pub const fn with_glow(mut self, glow: bool) -> Self {
        self.glow = glow;
        self
    }
}

impl Default for ParticleSpawn {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            fade_rate: 0.02,
            size: 3.0,
            color: Color::WHITE,
            kind: ParticleKind::Circle,
            gravity: 0.0,
            drag: 1.0,
            rotation_speed: 0.0,
            growth: 0.0,
            pulse: 0.0,
            trail_length: 0,
            glow: false,
        }
    }
}

/// Transient visual point effect
///
/// `life` runs from 1 down to 0; the particle deactivates at or below zero and
/// must not be drawn afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// World X
    pub x: f32,
    /// World Y
    pub y: f32,
    /// Velocity X
    pub vx: f32,
    /// Velocity Y
    pub vy: f32,
    /// Remaining life in `[0, 1]`
    pub life: f32,
    /// Life lost per reference frame
    pub fade_rate: f32,
    /// Current size
    pub size: f32,
    /// Base colour
    pub color: Color,
    /// Shape
    pub kind: ParticleKind,
    /// Added to `vy` per reference frame
    pub gravity: f32,
    /// Velocity multiplier per reference frame
    pub drag: f32,
    /// Rotation in radians
    pub rotation: f32,
    /// Rotation change per reference frame
    pub rotation_speed: f32,
    /// Size change per reference frame
    pub growth: f32,
    /// Pulse angular speed
    pub pulse: f32,
    /// Pulse phase in radians
    pub pulse_phase: f32,
    /// Recent positions, newest first
    pub trail: Option<VecDeque<Vec2>>,
    /// Maximum trail entries
    pub trail_length: usize,
    /// Additive glow
    pub glow: bool,
    /// Whether the particle is alive
    pub active: bool,
}

impl Particle {
    /// Construct an active particle
    pub fn new(spawn: &ParticleSpawn) -> Self {
        let mut particle = Self::inactive();
        particle.reset(spawn);
        particle
    }

    /// Construct a dead particle for the free list
    pub fn inactive() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            life: 0.0,
            fade_rate: 0.0,
            size: 0.0,
            color: Color::WHITE,
            kind: ParticleKind::Circle,
            gravity: 0.0,
            drag: 1.0,
            rotation: 0.0,
            rotation_speed: 0.0,
            growth: 0.0,
            pulse: 0.0,
            pulse_phase: 0.0,
            trail: None,
            trail_length: 0,
            glow: false,
            active: false,
        }
    }

    /// Reinitialise every field from spawn parameters, reusing the trail buffer
    pub fn reset(&mut self, spawn: &ParticleSpawn) {
        self.x = spawn.x;
        self.y = spawn.y;
        self.vx = spawn.vx;
        self.vy = spawn.vy;
        self.life = 1.0;
        self.fade_rate = spawn.fade_rate;
        self.size = spawn.size;
        self.color = spawn.color;
        self.kind = spawn.kind;
        self.gravity = spawn.gravity;
        self.drag = spawn.drag;
        self.rotation = 0.0;
        self.rotation_speed = spawn.rotation_speed;
        self.growth = spawn.growth;
        self.pulse = spawn.pulse;
        self.pulse_phase = 0.0;
        self.trail_length = spawn.trail_length;
        self.glow = spawn.glow;
        self.active = true;

        if spawn.trail_length > 0 {
            let trail = self.trail.get_or_insert_with(VecDeque::new);
            trail.clear();
            trail.reserve(spawn.trail_length);
        } else {
            self.trail = None;
        }
    }

    /// Advance by `step` reference frames
    pub fn update(&mut self, step: f32) {
        if !self.active {
            return;
        }

        if let Some(trail) = self.trail.as_mut() {
            trail.push_front(Vec2::new(self.x, self.y));
            trail.truncate(self.trail_length);
        }

        if self.drag < 1.0 {
            let damping = self.drag.powf(step);
            self.vx *= damping;
            self.vy *= damping;
        }
        self.vy += self.gravity * step;
        self.x += self.vx * step;
        self.y += self.vy * step;
        self.rotation += self.rotation_speed * step;
        self.size = (self.size + self.growth * step).max(0.0);
        self.pulse_phase += self.pulse * step;

        self.life -= self.fade_rate * step;
        if self.life <= 0.0 {
            self.life = 0.0;
            self.active = false;
        }
    }

    /// Size after pulsing
    pub fn render_size(&self) -> f32 {
        if self.pulse > 0.0 {
            self.size * (1.0 + 0.2 * self.pulse_phase.sin())
        } else {
            self.size
        }
    }

    /// Opacity, equal to remaining life
    pub fn alpha(&self) -> f32 {
        self.life.clamp(0.0, 1.0)
    }
}
