//! Lifetime system

use crate::ecs::components::LifetimeComponent;
use crate::ecs::{ComponentMask, Coordinator, EntityId, EntityTable, System, SystemState};

/// Ages [`LifetimeComponent`]s; expired entities are left for the caller to destroy
pub struct LifetimeSystem {
    state: SystemState,
}

impl LifetimeSystem {
    /// Create a lifetime system with the given priority
    pub const fn new(priority: i32) -> Self {
        Self {
            state: SystemState::new(priority),
        }
    }

    /// Entities in `coordinator` whose lifetime has run out, ascending
    pub fn expired_in(coordinator: &Coordinator) -> Vec<EntityId> {
        coordinator
            .query_entities(ComponentMask::LIFETIME)
            .into_iter()
            .filter(|id| {
                coordinator
                    .entity(*id)
                    .and_then(|entity| entity.get::<LifetimeComponent>())
                    .is_some_and(LifetimeComponent::is_expired)
            })
            .collect()
    }
}

impl Default for LifetimeSystem {
    fn default() -> Self {
        Self::new(0)
    }
}

impl System for LifetimeSystem {
    fn name(&self) -> &str {
        "lifetime"
    }

    fn required_components(&self) -> ComponentMask {
        ComponentMask::LIFETIME
    }

    fn state(&self) -> &SystemState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }

    fn update(&mut self, delta_time: f32, entities: &mut EntityTable) {
        for id in self.state.entities() {
            if let Some(lifetime) = entities
                .get_mut(id)
                .and_then(|entity| entity.get_mut::<LifetimeComponent>())
            {
                if lifetime.enabled {
                    lifetime.tick(delta_time);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_and_reports_expired() {
        let mut coordinator = Coordinator::new();
        let short = coordinator.create_entity(None);
        let long = coordinator.create_entity(None);
        coordinator.edit_entity(short).unwrap().add(LifetimeComponent::new(100.0));
        coordinator.edit_entity(long).unwrap().add(LifetimeComponent::new(1000.0));
        coordinator.register_system(Box::new(LifetimeSystem::default()));

        coordinator.update(150.0);

        let expired = LifetimeSystem::expired_in(&coordinator);
        assert_eq!(expired, vec![short]);
    }
}
