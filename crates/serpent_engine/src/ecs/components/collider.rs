//! Collider component

use crate::ecs::ComponentKind;
use crate::impl_component;

/// Circular bounds used by game rules for overlap checks
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderComponent {
    /// Radius in world units
    pub radius: f32,
    /// Whether the component is enabled
    pub enabled: bool,
}

impl ColliderComponent {
    /// Create a collider
    pub const fn new(radius: f32) -> Self {
        Self {
            radius,
            enabled: true,
        }
    }

    /// Whether two circles centred at the given points overlap
    pub fn overlaps(&self, a: (f32, f32), other: &Self, b: (f32, f32)) -> bool {
        let dx = a.0 - b.0;
        let dy = a.1 - b.1;
        let reach = self.radius + other.radius;
        dx * dx + dy * dy <= reach * reach
    }
}

impl_component!(ColliderComponent, ComponentKind::Collider);
