//! ECS Coordinator
//!
//! Owns every entity and the priority-ordered system list, and keeps system
//! membership in step with entity component sets.
//!
//! Membership is re-evaluated only at explicit sync points:
//! [`Coordinator::update_entity_in_systems`], or the drop of an
//! [`EntityEditor`] whose component set changed. Writes through
//! [`Coordinator::entity_mut`] that add or remove components must be followed
//! by a manual sync.

use std::cmp::Reverse;

use super::component::{Component, ComponentKind, ComponentMask, TypedComponent};
use super::entity::{Entity, EntityId, EntityTable};
use super::system::{System, SystemId};

struct RegisteredSystem {
    id: SystemId,
    system: Box<dyn System>,
}

/// Owner of the entity table and the ordered system list
pub struct Coordinator {
    entities: EntityTable,
    systems: Vec<RegisteredSystem>,
    next_entity_id: u32,
    next_system_id: u32,
}

impl Coordinator {
    /// Create an empty coordinator
    pub const fn new() -> Self {
        Self {
            entities: EntityTable::new(),
            systems: Vec::new(),
            next_entity_id: 0,
            next_system_id: 0,
        }
    }

    /// Allocate and register a new entity
    ///
    /// With an explicit id that is already taken, the previous entity is
    /// destroyed first so no system keeps a stale membership.
    pub fn create_entity(&mut self, id: Option<EntityId>) -> EntityId {
        let id = id.unwrap_or_else(|| EntityId::new(self.next_entity_id));
        if id.raw() >= self.next_entity_id {
            self.next_entity_id = id.raw().saturating_add(1);
        }

        if self.entities.contains_key(&id) {
            log::warn!("Entity {} already exists, replacing it", id);
            self.destroy_entity(id);
        }

        self.entities.insert(id, Entity::new(id));
        log::trace!("Created entity {}", id);
        id
    }

    /// Unregister an entity from every system, drop its components and remove it
    ///
    /// Returns whether the entity existed.
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if !self.entities.contains_key(&id) {
            return false;
        }

        for registered in &mut self.systems {
            registered.system.state_mut().unregister(id);
        }

        if let Some(mut entity) = self.entities.remove(&id) {
            entity.clear_components();
        }
        log::trace!("Destroyed entity {}", id);
        true
    }

    /// Shared access to an entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Raw mutable access to an entity
    ///
    /// Component adds and removes made through this reference are not
    /// reflected in system membership until
    /// [`Coordinator::update_entity_in_systems`] is called.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Structural edit scope that resyncs membership when dropped
    pub fn edit_entity(&mut self, id: EntityId) -> Option<EntityEditor<'_>> {
        let initial_mask = self.entities.get(&id)?.mask();
        Some(EntityEditor {
            coordinator: self,
            id,
            initial_mask,
        })
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterate live entities in id order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Register a system
    ///
    /// Systems are kept sorted by descending priority; equal priorities keep
    /// registration order. Existing matching entities join immediately.
    pub fn register_system(&mut self, mut system: Box<dyn System>) -> SystemId {
        let id = SystemId(self.next_system_id);
        self.next_system_id += 1;

        system.init();
        for (entity_id, entity) in &self.entities {
            if system.matches(entity) {
                system.state_mut().register(*entity_id);
            }
        }

        log::debug!(
            "Registered system '{}' ({}) with priority {} and {} entities",
            system.name(),
            id,
            system.priority(),
            system.entities().len()
        );

        self.systems.push(RegisteredSystem { id, system });
        // Vec::sort_by_key is stable
        self.systems
            .sort_by_key(|registered| Reverse(registered.system.priority()));
        id
    }

    /// Remove a system, running its destroy hook; entities are untouched
    pub fn unregister_system(&mut self, id: SystemId) -> Option<Box<dyn System>> {
        let index = self.systems.iter().position(|registered| registered.id == id)?;
        let mut registered = self.systems.remove(index);
        registered.system.destroy();
        log::debug!("Unregistered system '{}' ({})", registered.system.name(), id);
        Some(registered.system)
    }

    /// Shared access to a registered system
    pub fn system(&self, id: SystemId) -> Option<&(dyn System + 'static)> {
        self.systems
            .iter()
            .find(|registered| registered.id == id)
            .map(|registered| &*registered.system)
    }

    /// Mutable access to a registered system
    pub fn system_mut(&mut self, id: SystemId) -> Option<&mut (dyn System + 'static)> {
        self.systems
            .iter_mut()
            .find(|registered| registered.id == id)
            .map(|registered| &mut *registered.system)
    }

    /// System ids in execution order
    pub fn system_ids(&self) -> Vec<SystemId> {
        self.systems.iter().map(|registered| registered.id).collect()
    }

    /// Number of registered systems
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Re-evaluate one entity's membership in every system
    pub fn update_entity_in_systems(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get(&id) else {
            return;
        };

        for registered in &mut self.systems {
            let system = &mut registered.system;
            let matches = system.matches(entity);
            let member = system.state().contains(id);
            if matches && !member {
                system.state_mut().register(id);
            } else if !matches && member {
                system.state_mut().unregister(id);
            }
        }
    }

    /// Run every enabled system in priority order
    pub fn update(&mut self, delta_time: f32) {
        let Self {
            entities, systems, ..
        } = self;

        for registered in systems.iter_mut() {
            if registered.system.is_enabled() {
                registered.system.update(delta_time, entities);
            }
        }
    }

    /// Ids of entities carrying every kind in `required`, ascending
    pub fn query_entities(&self, required: ComponentMask) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| entity.matches(required))
            .map(Entity::id)
            .collect()
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Structural edit scope over one entity
///
/// Dropping the editor resyncs system membership if the component set changed.
pub struct EntityEditor<'a> {
    coordinator: &'a mut Coordinator,
    id: EntityId,
    initial_mask: ComponentMask,
}

impl EntityEditor<'_> {
    /// Id of the edited entity
    pub const fn id(&self) -> EntityId {
        self.id
    }

    fn entity_mut(&mut self) -> Option<&mut Entity> {
        self.coordinator.entities.get_mut(&self.id)
    }

    /// Attach a component, replacing any previous one of the same kind
    pub fn add<C: Component>(&mut self, component: C) -> &mut Self {
        if let Some(entity) = self.entity_mut() {
            entity.add_component(component);
        }
        self
    }

    /// Detach the component of `kind`
    pub fn remove(&mut self, kind: ComponentKind) -> Option<Box<dyn Component>> {
        self.entity_mut()?.remove_component(kind)
    }

    /// Typed component access
    pub fn get<C: TypedComponent>(&self) -> Option<&C> {
        self.coordinator.entities.get(&self.id)?.get::<C>()
    }

    /// Typed mutable component access
    pub fn get_mut<C: TypedComponent>(&mut self) -> Option<&mut C> {
        self.entity_mut()?.get_mut::<C>()
    }
}

impl Drop for EntityEditor<'_> {
    fn drop(&mut self) {
        let changed = self
            .coordinator
            .entities
            .get(&self.id)
            .is_some_and(|entity| entity.mask() != self.initial_mask);
        if changed {
            self.coordinator.update_entity_in_systems(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{TransformComponent, VelocityComponent};
    use crate::ecs::system::SystemState;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct ProbeSystem {
        name: String,
        required: ComponentMask,
        state: SystemState,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl ProbeSystem {
        fn boxed(
            name: &str,
            required: ComponentMask,
            priority: i32,
            log: &Rc<RefCell<Vec<String>>>,
        ) -> Box<Self> {
            Box::new(Self {
                name: name.to_string(),
                required,
                state: SystemState::new(priority),
                log: Rc::clone(log),
            })
        }
    }

    impl System for ProbeSystem {
        fn name(&self) -> &str {
            &self.name
        }
        fn required_components(&self) -> ComponentMask {
            self.required
        }
        fn state(&self) -> &SystemState {
            &self.state
        }
        fn state_mut(&mut self) -> &mut SystemState {
            &mut self.state
        }
        fn init(&mut self) {
            self.log.borrow_mut().push(format!("init:{}", self.name));
        }
        fn destroy(&mut self) {
            self.log.borrow_mut().push(format!("destroy:{}", self.name));
        }
        fn update(&mut self, _delta_time: f32, _entities: &mut EntityTable) {
            self.log.borrow_mut().push(format!("update:{}", self.name));
        }
    }

    fn moving_entity(coordinator: &mut Coordinator) -> EntityId {
        let id = coordinator.create_entity(None);
        let entity = coordinator.entity_mut(id).unwrap();
        entity.add_component(TransformComponent::default());
        entity.add_component(VelocityComponent::new(1.0, 0.0));
        coordinator.update_entity_in_systems(id);
        id
    }

    #[test]
    fn test_create_entity_ids() {
        let mut coordinator = Coordinator::new();
        let a = coordinator.create_entity(None);
        let b = coordinator.create_entity(Some(EntityId::new(10)));
        let c = coordinator.create_entity(None);
        assert_eq!(a, EntityId::new(0));
        assert_eq!(b, EntityId::new(10));
        assert_eq!(c, EntityId::new(11));
        assert_eq!(coordinator.entity_count(), 3);
    }

    #[test]
    fn test_systems_run_in_descending_priority_with_stable_ties() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        coordinator.register_system(ProbeSystem::boxed("low", ComponentMask::empty(), 0, &log));
        coordinator.register_system(ProbeSystem::boxed("first-mid", ComponentMask::empty(), 5, &log));
        coordinator.register_system(ProbeSystem::boxed("high", ComponentMask::empty(), 10, &log));
        coordinator.register_system(ProbeSystem::boxed("second-mid", ComponentMask::empty(), 5, &log));
        log.borrow_mut().clear();

        coordinator.update(16.0);

        assert_eq!(
            *log.borrow(),
            vec!["update:high", "update:first-mid", "update:second-mid", "update:low"]
        );
    }

    #[test]
    fn test_disabled_system_skipped() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        let id = coordinator.register_system(ProbeSystem::boxed("a", ComponentMask::empty(), 0, &log));
        coordinator.system_mut(id).unwrap().state_mut().set_enabled(false);
        log.borrow_mut().clear();

        coordinator.update(16.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_late_registration_backfills_membership() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        let moving = moving_entity(&mut coordinator);
        let still = coordinator.create_entity(None);
        coordinator
            .entity_mut(still)
            .unwrap()
            .add_component(TransformComponent::default());

        let id = coordinator.register_system(ProbeSystem::boxed(
            "movement",
            ComponentMask::TRANSFORM | ComponentMask::VELOCITY,
            0,
            &log,
        ));

        let members: Vec<_> = coordinator.system(id).unwrap().entities().iter().copied().collect();
        assert_eq!(members, vec![moving]);
        assert_eq!(log.borrow()[0], "init:movement");
    }

    #[test]
    fn test_manual_sync_required_after_raw_write() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        let id = coordinator.register_system(ProbeSystem::boxed(
            "movement",
            ComponentMask::TRANSFORM,
            0,
            &log,
        ));
        let entity = coordinator.create_entity(None);
        coordinator
            .entity_mut(entity)
            .unwrap()
            .add_component(TransformComponent::default());
        assert!(coordinator.system(id).unwrap().entities().is_empty());

        coordinator.update_entity_in_systems(entity);
        assert!(coordinator.system(id).unwrap().entities().contains(&entity));

        coordinator
            .entity_mut(entity)
            .unwrap()
            .remove_component(ComponentKind::Transform);
        coordinator.update_entity_in_systems(entity);
        assert!(coordinator.system(id).unwrap().entities().is_empty());
    }

    #[test]
    fn test_editor_resyncs_on_drop() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        let id = coordinator.register_system(ProbeSystem::boxed(
            "movement",
            ComponentMask::TRANSFORM | ComponentMask::VELOCITY,
            0,
            &log,
        ));
        let entity = coordinator.create_entity(None);

        coordinator
            .edit_entity(entity)
            .unwrap()
            .add(TransformComponent::default())
            .add(VelocityComponent::new(0.0, 1.0));
        assert!(coordinator.system(id).unwrap().entities().contains(&entity));

        {
            let mut editor = coordinator.edit_entity(entity).unwrap();
            editor.remove(ComponentKind::Velocity);
        }
        assert!(coordinator.system(id).unwrap().entities().is_empty());
    }

    #[test]
    fn test_destroy_entity_clears_everything() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        let id = coordinator.register_system(ProbeSystem::boxed(
            "movement",
            ComponentMask::TRANSFORM,
            0,
            &log,
        ));
        let entity = moving_entity(&mut coordinator);
        assert!(coordinator.system(id).unwrap().entities().contains(&entity));

        assert!(coordinator.destroy_entity(entity));
        assert!(coordinator.entity(entity).is_none());
        assert!(coordinator.system(id).unwrap().entities().is_empty());
        assert!(!coordinator.destroy_entity(entity));
    }

    #[test]
    fn test_unregister_system_keeps_entities() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut coordinator = Coordinator::new();
        let entity = moving_entity(&mut coordinator);
        let id = coordinator.register_system(ProbeSystem::boxed("a", ComponentMask::TRANSFORM, 0, &log));

        let removed = coordinator.unregister_system(id).unwrap();
        assert_eq!(removed.name(), "a");
        assert_eq!(log.borrow().last().unwrap(), "destroy:a");
        assert_eq!(coordinator.system_count(), 0);
        assert!(coordinator.entity(entity).is_some());
        assert!(coordinator.unregister_system(id).is_none());
    }

    #[test]
    fn test_absent_ids_are_no_ops() {
        let mut coordinator = Coordinator::new();
        let ghost = EntityId::new(99);
        coordinator.update_entity_in_systems(ghost);
        assert!(coordinator.edit_entity(ghost).is_none());
        assert!(coordinator.entity_mut(ghost).is_none());
        assert!(!coordinator.destroy_entity(ghost));
    }

    #[test]
    fn test_query_entities() {
        let mut coordinator = Coordinator::new();
        let moving = moving_entity(&mut coordinator);
        let still = coordinator.create_entity(None);
        coordinator
            .entity_mut(still)
            .unwrap()
            .add_component(TransformComponent::default());

        assert_eq!(coordinator.query_entities(ComponentMask::TRANSFORM), vec![moving, still]);
        assert_eq!(coordinator.query_entities(ComponentMask::VELOCITY), vec![moving]);
        assert_eq!(coordinator.query_entities(ComponentMask::empty()).len(), 2);
    }
}
