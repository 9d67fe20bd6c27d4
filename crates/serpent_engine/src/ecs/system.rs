//! System trait and shared system bookkeeping

use std::collections::BTreeSet;
use std::fmt;

use super::component::ComponentMask;
use super::entity::{Entity, EntityId, EntityTable};

/// Identifier handed out by [`crate::ecs::Coordinator::register_system`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub(crate) u32);

impl fmt::Display for SystemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "system#{}", self.0)
    }
}

/// Membership, priority and enabled flag common to every system
///
/// Membership holds entity ids only; the coordinator owns the entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemState {
    entities: BTreeSet<EntityId>,
    priority: i32,
    enabled: bool,
}

impl SystemState {
    /// Create an enabled state with the given priority (higher runs first)
    pub const fn new(priority: i32) -> Self {
        Self {
            entities: BTreeSet::new(),
            priority,
            enabled: true,
        }
    }

    /// Ids of member entities
    pub const fn entities(&self) -> &BTreeSet<EntityId> {
        &self.entities
    }

    /// Whether `id` is a member
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(&id)
    }

    /// Add a member, returning whether it was newly added
    pub fn register(&mut self, id: EntityId) -> bool {
        self.entities.insert(id)
    }

    /// Remove a member, returning whether it was present
    pub fn unregister(&mut self, id: EntityId) -> bool {
        self.entities.remove(&id)
    }

    /// Drop every member
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Scheduling priority
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Whether the system runs on update
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the system
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

impl Default for SystemState {
    fn default() -> Self {
        Self::new(0)
    }
}

/// System trait for processing entities and components
pub trait System {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Components an entity needs to become a member
    fn required_components(&self) -> ComponentMask;

    /// Shared bookkeeping
    fn state(&self) -> &SystemState;

    /// Mutable shared bookkeeping
    fn state_mut(&mut self) -> &mut SystemState;

    /// Called once on registration
    fn init(&mut self) {}

    /// Called once on unregistration
    fn destroy(&mut self) {}

    /// Run the system over its members
    fn update(&mut self, delta_time: f32, entities: &mut EntityTable);

    /// Whether `entity` satisfies [`System::required_components`]
    fn matches(&self, entity: &Entity) -> bool {
        entity.matches(self.required_components())
    }

    /// Scheduling priority
    fn priority(&self) -> i32 {
        self.state().priority()
    }

    /// Whether the system runs on update
    fn is_enabled(&self) -> bool {
        self.state().enabled()
    }

    /// Ids of member entities
    fn entities(&self) -> &BTreeSet<EntityId> {
        self.state().entities()
    }
}
