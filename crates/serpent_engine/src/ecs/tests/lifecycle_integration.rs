//! Integration tests for entity lifecycle across several systems
//!
//! Exercises the coordinator with the built-in systems the way the frame
//! loop drives them.

use crate::ecs::components::{
    ColliderComponent, LifetimeComponent, PlayerComponent, TransformComponent, VelocityComponent,
};
use crate::ecs::systems::{LifetimeSystem, MovementSystem};
use crate::ecs::{ComponentKind, ComponentMask, Coordinator, EntityId, System};
use crate::foundation::time::FRAME_MS;

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_projectile(coordinator: &mut Coordinator, vx: f32, lifetime_ms: f32) -> EntityId {
        let id = coordinator.create_entity(None);
        coordinator
            .edit_entity(id)
            .unwrap()
            .add(TransformComponent::default())
            .add(VelocityComponent::new(vx, 0.0))
            .add(LifetimeComponent::new(lifetime_ms))
            .add(ColliderComponent::new(2.0));
        id
    }

    #[test]
    fn test_frame_loop_despawns_expired_entities() {
        let mut coordinator = Coordinator::new();
        let movement = coordinator.register_system(Box::new(MovementSystem::default()));
        let lifetime = coordinator.register_system(Box::new(LifetimeSystem::default()));

        let short = spawn_projectile(&mut coordinator, 1.0, FRAME_MS * 3.0);
        let long = spawn_projectile(&mut coordinator, 1.0, FRAME_MS * 100.0);

        for _ in 0..4 {
            coordinator.update(FRAME_MS);
            for id in LifetimeSystem::expired_in(&coordinator) {
                coordinator.destroy_entity(id);
            }
        }

        assert!(coordinator.entity(short).is_none());
        assert!(coordinator.entity(long).is_some());
        for system in [movement, lifetime] {
            let members = coordinator.system(system).unwrap().entities();
            assert!(!members.contains(&short));
            assert!(members.contains(&long));
        }
    }

    #[test]
    fn test_mid_game_registration_sees_existing_entities() {
        let mut coordinator = Coordinator::new();
        let ids: Vec<_> = (0..5)
            .map(|i| spawn_projectile(&mut coordinator, i as f32, 0.0))
            .collect();
        let player = coordinator.create_entity(None);
        coordinator
            .edit_entity(player)
            .unwrap()
            .add(TransformComponent::default())
            .add(PlayerComponent::new("hero"));

        let movement = coordinator.register_system(Box::new(MovementSystem::default()));
        let members: Vec<_> = coordinator
            .system(movement)
            .unwrap()
            .entities()
            .iter()
            .copied()
            .collect();

        assert_eq!(members, ids);
        assert_eq!(coordinator.query_entities(ComponentMask::PLAYER), vec![player]);
    }

    #[test]
    fn test_membership_equals_matching_set_after_sync() {
        let mut coordinator = Coordinator::new();
        let movement = coordinator.register_system(Box::new(MovementSystem::default()));
        let ids: Vec<_> = (0..6)
            .map(|_| spawn_projectile(&mut coordinator, 1.0, 0.0))
            .collect();

        for id in ids.iter().step_by(2) {
            coordinator
                .edit_entity(*id)
                .unwrap()
                .remove(ComponentKind::Velocity);
        }

        let expected = coordinator.query_entities(MovementSystem::default().required_components());
        let members: Vec<_> = coordinator
            .system(movement)
            .unwrap()
            .entities()
            .iter()
            .copied()
            .collect();
        assert_eq!(members, expected);
        assert_eq!(members.len(), 3);
    }
}
