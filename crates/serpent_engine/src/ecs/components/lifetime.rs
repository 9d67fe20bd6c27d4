//! Lifetime Component
//!
//! Tracks entity age for timed despawning. The component only flags expiry;
//! destroying the entity is left to the caller.

use crate::ecs::ComponentKind;
use crate::impl_component;

/// Lifetime component for entities that should despawn after a duration
#[derive(Debug, Clone, PartialEq)]
pub struct LifetimeComponent {
    /// Milliseconds lived so far
    pub elapsed_ms: f32,
    /// Total lifetime in milliseconds (zero or less means infinite)
    pub duration_ms: f32,
    /// Whether the component is enabled
    pub enabled: bool,
}

impl LifetimeComponent {
    /// Create a new lifetime component
    pub const fn new(duration_ms: f32) -> Self {
        Self {
            elapsed_ms: 0.0,
            duration_ms,
            enabled: true,
        }
    }

    /// Age the component
    pub fn tick(&mut self, delta_ms: f32) {
        self.elapsed_ms += delta_ms;
    }

    /// Check if this entity's lifetime has expired
    pub fn is_expired(&self) -> bool {
        if self.duration_ms <= 0.0 {
            false // Infinite lifetime
        } else {
            self.elapsed_ms >= self.duration_ms
        }
    }

    /// Get remaining lifetime in milliseconds
    pub fn remaining(&self) -> f32 {
        if self.duration_ms <= 0.0 {
            f32::INFINITY
        } else {
            (self.duration_ms - self.elapsed_ms).max(0.0)
        }
    }
}

impl_component!(LifetimeComponent, ComponentKind::Lifetime);
