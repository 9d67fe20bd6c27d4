//! Entity-Component-System implementation
//!
//! Entities own enumerated components, systems hold non-owning membership
//! sets, and the [`Coordinator`] owns both and drives updates by priority.

pub mod entity;
pub mod component;
pub mod system;
pub mod coordinator;
pub mod components;
pub mod systems;

#[cfg(test)]
mod tests;

pub use entity::{Entity, EntityId, EntityTable};
pub use component::{Component, ComponentKind, ComponentMask, TypedComponent};
pub use system::{System, SystemId, SystemState};
pub use coordinator::{Coordinator, EntityEditor};
