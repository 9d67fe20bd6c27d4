//! Velocity component

use crate::ecs::ComponentKind;
use crate::foundation::math::Vec2;
use crate::impl_component;

/// Linear velocity in world units per reference frame plus turn rate
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityComponent {
    /// Linear velocity
    pub linear: Vec2,
    /// Angular velocity in radians per reference frame
    pub angular: f32,
    /// Speed clamp, `None` for unbounded
    pub max_speed: Option<f32>,
    /// Whether the component is enabled
    pub enabled: bool,
}

impl VelocityComponent {
    /// Create a velocity without rotation
    pub fn new(vx: f32, vy: f32) -> Self {
        Self {
            linear: Vec2::new(vx, vy),
            angular: 0.0,
            max_speed: None,
            enabled: true,
        }
    }

    /// Set the turn rate
    pub const fn with_angular(mut self, angular: f32) -> Self {
        self.angular = angular;
        self
    }

    /// Set the speed clamp
    pub const fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = Some(max_speed);
        self
    }

    /// Linear velocity after applying the speed clamp
    pub fn clamped(&self) -> Vec2 {
        match self.max_speed {
            Some(max) if self.linear.norm() > max => self.linear.normalize() * max,
            _ => self.linear,
        }
    }
}

impl_component!(VelocityComponent, ComponentKind::Velocity);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_clamped_speed() {
        let velocity = VelocityComponent::new(30.0, 40.0).with_max_speed(5.0);
        assert_relative_eq!(velocity.clamped().norm(), 5.0, epsilon = 1e-5);
        assert_relative_eq!(velocity.clamped().x, 3.0, epsilon = 1e-5);
    }
}
