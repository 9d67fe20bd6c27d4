//! Renderable component

use crate::ecs::ComponentKind;
use crate::impl_component;
use crate::render::RenderLayer;

/// Marks an entity as drawable on a layer, with a culling category
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableComponent {
    /// Composition layer
    pub layer: RenderLayer,
    /// Culling margin category (`"snake"`, `"element"`, ...)
    pub entity_type: String,
    /// Hidden entities keep their layer but are skipped
    pub visible: bool,
    /// Whether the component is enabled
    pub enabled: bool,
}

impl RenderableComponent {
    /// Create a visible renderable
    pub fn new(layer: RenderLayer, entity_type: impl Into<String>) -> Self {
        Self {
            layer,
            entity_type: entity_type.into(),
            visible: true,
            enabled: true,
        }
    }
}

impl_component!(RenderableComponent, ComponentKind::Renderable);
