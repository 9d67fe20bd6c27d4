//! Entity implementation

use std::collections::BTreeMap;
use std::fmt;

use super::component::{Component, ComponentKind, ComponentMask, TypedComponent};

/// Entity identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    /// Create an identifier from a raw value
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw identifier
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Authoritative id to entity table, ordered for deterministic iteration
pub type EntityTable = BTreeMap<EntityId, Entity>;

/// An identity plus at most one component per kind
///
/// The entity owns its components; they are dropped with it.
#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    components: BTreeMap<ComponentKind, Box<dyn Component>>,
    mask: ComponentMask,
}

impl Entity {
    /// Create an entity without components
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            components: BTreeMap::new(),
            mask: ComponentMask::empty(),
        }
    }

    /// Get the entity ID
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Kinds currently attached
    pub const fn mask(&self) -> ComponentMask {
        self.mask
    }

    /// Whether every kind in `required` is attached
    pub const fn matches(&self, required: ComponentMask) -> bool {
        self.mask.contains(required)
    }

    /// Attach a component, replacing any previous one of the same kind
    ///
    /// Returns the replaced component after its destroy hook ran.
    pub fn add_component<C: Component>(&mut self, component: C) -> Option<Box<dyn Component>> {
        self.add_boxed(Box::new(component))
    }

    /// Attach an already boxed component
    pub fn add_boxed(&mut self, mut component: Box<dyn Component>) -> Option<Box<dyn Component>> {
        let kind = component.kind();
        component.on_init();
        self.mask |= kind.mask();
        let mut replaced = self.components.insert(kind, component);
        if let Some(old) = replaced.as_mut() {
            old.on_destroy();
        }
        replaced
    }

    /// Detach the component of `kind`
    pub fn remove_component(&mut self, kind: ComponentKind) -> Option<Box<dyn Component>> {
        let mut removed = self.components.remove(&kind)?;
        self.mask.remove(kind.mask());
        removed.on_destroy();
        Some(removed)
    }

    /// Whether a component of `kind` is attached
    pub fn has_component(&self, kind: ComponentKind) -> bool {
        self.mask.contains(kind.mask())
    }

    /// Untyped component access
    pub fn component(&self, kind: ComponentKind) -> Option<&dyn Component> {
        self.components.get(&kind).map(|component| &**component)
    }

    /// Typed component access
    pub fn get<C: TypedComponent>(&self) -> Option<&C> {
        self.components.get(&C::KIND)?.as_any().downcast_ref::<C>()
    }

    /// Typed mutable component access
    pub fn get_mut<C: TypedComponent>(&mut self) -> Option<&mut C> {
        self.components.get_mut(&C::KIND)?.as_any_mut().downcast_mut::<C>()
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Run destroy hooks and drop every component
    pub fn clear_components(&mut self) {
        for component in self.components.values_mut() {
            component.on_destroy();
        }
        self.components.clear();
        self.mask = ComponentMask::empty();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::components::{ColliderComponent, TransformComponent, VelocityComponent};
    use std::any::Any;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Debug)]
    struct HookProbe {
        enabled: bool,
        inits: Rc<Cell<u32>>,
        destroys: Rc<Cell<u32>>,
    }

    impl Component for HookProbe {
        fn kind(&self) -> ComponentKind {
            ComponentKind::Player
        }
        fn enabled(&self) -> bool {
            self.enabled
        }
        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
        fn on_init(&mut self) {
            self.inits.set(self.inits.get() + 1);
        }
        fn on_destroy(&mut self) {
            self.destroys.set(self.destroys.get() + 1);
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_insertion_replaces_same_kind() {
        let mut entity = Entity::new(EntityId::new(1));
        entity.add_component(TransformComponent::new(1.0, 2.0, 0.0));
        let replaced = entity.add_component(TransformComponent::new(5.0, 6.0, 0.0));

        assert!(replaced.is_some());
        assert_eq!(entity.component_count(), 1);
        let transform = entity.get::<TransformComponent>().unwrap();
        assert_eq!((transform.x, transform.y), (5.0, 6.0));
    }

    #[test]
    fn test_mask_tracks_components() {
        let mut entity = Entity::new(EntityId::new(2));
        entity.add_component(TransformComponent::default());
        entity.add_component(VelocityComponent::new(1.0, 0.0));
        assert!(entity.matches(ComponentMask::TRANSFORM | ComponentMask::VELOCITY));
        assert!(!entity.matches(ComponentMask::COLLIDER));

        entity.remove_component(ComponentKind::Velocity);
        assert!(!entity.matches(ComponentMask::VELOCITY));
        assert!(entity.has_component(ComponentKind::Transform));
    }

    #[test]
    fn test_hooks_invoked_by_entity() {
        let inits = Rc::new(Cell::new(0));
        let destroys = Rc::new(Cell::new(0));
        let probe = || HookProbe {
            enabled: true,
            inits: Rc::clone(&inits),
            destroys: Rc::clone(&destroys),
        };

        let mut entity = Entity::new(EntityId::new(3));
        entity.add_component(probe());
        entity.add_component(probe());
        assert_eq!((inits.get(), destroys.get()), (2, 1));

        entity.add_component(ColliderComponent::new(4.0));
        entity.clear_components();
        assert_eq!(destroys.get(), 2);
        assert_eq!(entity.component_count(), 0);
        assert_eq!(entity.mask(), ComponentMask::empty());
    }

    #[test]
    fn test_typed_access_missing_kind() {
        let mut entity = Entity::new(EntityId::new(4));
        assert!(entity.get::<TransformComponent>().is_none());
        assert!(entity.get_mut::<TransformComponent>().is_none());
        assert!(entity.remove_component(ComponentKind::Transform).is_none());
    }
}
