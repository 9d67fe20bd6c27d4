//! Movement system integrating velocity into transforms

use crate::ecs::components::{TransformComponent, VelocityComponent};
use crate::ecs::{ComponentMask, EntityTable, System, SystemState};
use crate::foundation::time::FRAME_MS;

/// Integrates [`VelocityComponent`] into [`TransformComponent`]
///
/// Velocities are per reference frame, so a step of `delta_time / FRAME_MS`
/// keeps motion frame-rate independent. The previous pose is recorded for
/// render interpolation.
pub struct MovementSystem {
    state: SystemState,
}

impl MovementSystem {
    /// Create a movement system with the given priority
    pub const fn new(priority: i32) -> Self {
        Self {
            state: SystemState::new(priority),
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new(100)
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn required_components(&self) -> ComponentMask {
        ComponentMask::TRANSFORM | ComponentMask::VELOCITY
    }

    fn state(&self) -> &SystemState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }

    fn update(&mut self, delta_time: f32, entities: &mut EntityTable) {
        let step = delta_time / FRAME_MS;

        for id in self.state.entities() {
            let Some(entity) = entities.get_mut(id) else {
                continue;
            };
            let Some(velocity) = entity.get::<VelocityComponent>() else {
                continue;
            };
            if !velocity.enabled {
                continue;
            }
            let linear = velocity.clamped();
            let angular = velocity.angular;

            if let Some(transform) = entity.get_mut::<TransformComponent>() {
                if transform.enabled {
                    transform.advance_to(
                        transform.x + linear.x * step,
                        transform.y + linear.y * step,
                        transform.angle + angular * step,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::Coordinator;
    use approx::assert_relative_eq;

    #[test]
    fn test_moves_members_by_frame_step() {
        let mut coordinator = Coordinator::new();
        let id = coordinator.create_entity(None);
        coordinator
            .edit_entity(id)
            .unwrap()
            .add(TransformComponent::new(0.0, 0.0, 0.0))
            .add(VelocityComponent::new(2.0, -1.0).with_angular(0.1));
        coordinator.register_system(Box::new(MovementSystem::default()));

        coordinator.update(FRAME_MS * 2.0);

        let transform = coordinator.entity(id).unwrap().get::<TransformComponent>().unwrap();
        assert_relative_eq!(transform.x, 4.0, epsilon = 1e-4);
        assert_relative_eq!(transform.y, -2.0, epsilon = 1e-4);
        assert_relative_eq!(transform.angle, 0.2, epsilon = 1e-4);
        assert_relative_eq!(transform.previous.x, 0.0);
    }

    #[test]
    fn test_disabled_velocity_is_ignored() {
        let mut coordinator = Coordinator::new();
        let id = coordinator.create_entity(None);
        let mut velocity = VelocityComponent::new(5.0, 5.0);
        velocity.enabled = false;
        coordinator
            .edit_entity(id)
            .unwrap()
            .add(TransformComponent::default())
            .add(velocity);
        coordinator.register_system(Box::new(MovementSystem::default()));

        coordinator.update(FRAME_MS);

        let transform = coordinator.entity(id).unwrap().get::<TransformComponent>().unwrap();
        assert_eq!((transform.x, transform.y), (0.0, 0.0));
    }
}
