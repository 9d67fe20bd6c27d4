//! Transform component with previous-pose tracking for interpolation

use crate::ecs::ComponentKind;
use crate::impl_component;
use crate::render::camera::{Interpolatable, Pose};

/// World position and heading, plus the pose from the previous simulation step
#[derive(Debug, Clone, PartialEq)]
pub struct TransformComponent {
    /// World X
    pub x: f32,
    /// World Y
    pub y: f32,
    /// Heading in radians
    pub angle: f32,
    /// Pose before the last [`TransformComponent::advance_to`]
    pub previous: Pose,
    /// Whether the component is enabled
    pub enabled: bool,
}

impl TransformComponent {
    /// Create a transform whose previous pose equals the current one
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            x,
            y,
            angle,
            previous: Pose::new(x, y, angle),
            enabled: true,
        }
    }

    /// Current pose
    pub const fn pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.angle)
    }

    /// Record the current pose as previous, then move to the new one
    pub fn advance_to(&mut self, x: f32, y: f32, angle: f32) {
        self.previous = self.pose();
        self.x = x;
        self.y = y;
        self.angle = angle;
    }

    /// Jump without leaving an interpolation trail (teleports, respawns)
    pub fn teleport(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.previous = self.pose();
    }
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl Interpolatable for TransformComponent {
    fn previous_pose(&self) -> Pose {
        self.previous
    }

    fn current_pose(&self) -> Pose {
        self.pose()
    }
}

impl_component!(TransformComponent, ComponentKind::Transform);
