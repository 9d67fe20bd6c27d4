//! Player marker component

use crate::ecs::ComponentKind;
use crate::impl_component;

/// Marks the entity controlled by the local player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerComponent {
    /// Display name
    pub name: String,
    /// Whether the component is enabled
    pub enabled: bool,
}

impl PlayerComponent {
    /// Create a player marker
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
        }
    }
}

impl_component!(PlayerComponent, ComponentKind::Player);
