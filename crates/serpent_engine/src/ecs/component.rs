//! Component trait and kind tags
//!
//! Components are keyed by an explicit [`ComponentKind`] instead of a type
//! name, and systems declare their requirements as a [`ComponentMask`].

use std::any::Any;
use std::fmt::Debug;

use bitflags::bitflags;

bitflags! {
    /// Set of component kinds, used for system requirement matching
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ComponentMask: u32 {
        /// Position and heading
        const TRANSFORM = 1 << 0;
        /// Linear and angular velocity
        const VELOCITY = 1 << 1;
        /// Render layer and visibility
        const RENDERABLE = 1 << 2;
        /// Timed despawn
        const LIFETIME = 1 << 3;
        /// Circular collision bounds
        const COLLIDER = 1 << 4;
        /// Player ownership marker
        const PLAYER = 1 << 5;
    }
}

/// Enumerated component type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// [`crate::ecs::components::TransformComponent`]
    Transform,
    /// [`crate::ecs::components::VelocityComponent`]
    Velocity,
    /// [`crate::ecs::components::RenderableComponent`]
    Renderable,
    /// [`crate::ecs::components::LifetimeComponent`]
    Lifetime,
    /// [`crate::ecs::components::ColliderComponent`]
    Collider,
    /// [`crate::ecs::components::PlayerComponent`]
    Player,
}

impl ComponentKind {
    /// Every kind, in mask bit order
    pub const ALL: [Self; 6] = [
        Self::Transform,
        Self::Velocity,
        Self::Renderable,
        Self::Lifetime,
        Self::Collider,
        Self::Player,
    ];

    /// Single-bit mask for this kind
    pub const fn mask(self) -> ComponentMask {
        match self {
            Self::Transform => ComponentMask::TRANSFORM,
            Self::Velocity => ComponentMask::VELOCITY,
            Self::Renderable => ComponentMask::RENDERABLE,
            Self::Lifetime => ComponentMask::LIFETIME,
            Self::Collider => ComponentMask::COLLIDER,
            Self::Player => ComponentMask::PLAYER,
        }
    }

    /// Human readable name for diagnostics
    pub const fn name(self) -> &'static str {
        match self {
            Self::Transform => "Transform",
            Self::Velocity => "Velocity",
            Self::Renderable => "Renderable",
            Self::Lifetime => "Lifetime",
            Self::Collider => "Collider",
            Self::Player => "Player",
        }
    }
}

/// Plain data attached to an entity
///
/// Lifecycle hooks are invoked by the owning [`crate::ecs::Entity`], never by
/// the component itself.
pub trait Component: Any + Debug {
    /// Kind tag used as the storage key
    fn kind(&self) -> ComponentKind;

    /// Whether the component is enabled
    fn enabled(&self) -> bool;

    /// Enable or disable the component
    fn set_enabled(&mut self, enabled: bool);

    /// Called after the component is attached
    fn on_init(&mut self) {}

    /// Called before the component is discarded
    fn on_destroy(&mut self) {}

    /// Upcast for typed access
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed access
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Component with a statically known kind, enabling typed lookups
pub trait TypedComponent: Component + Sized {
    /// Kind tag of this component type
    const KIND: ComponentKind;
}

/// Implement [`Component`] and [`TypedComponent`] for a struct with an
/// `enabled: bool` field and no lifecycle hooks.
#[macro_export]
macro_rules! impl_component {
    ($ty:ty, $kind:expr) => {
        impl $crate::ecs::Component for $ty {
            fn kind(&self) -> $crate::ecs::ComponentKind {
                $kind
            }

            fn enabled(&self) -> bool {
                self.enabled
            }

            fn set_enabled(&mut self, enabled: bool) {
                self.enabled = enabled;
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
                self
            }
        }

        impl $crate::ecs::TypedComponent for $ty {
            const KIND: $crate::ecs::ComponentKind = $kind;
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_masks_are_distinct() {
        let mut combined = ComponentMask::empty();
        for kind in ComponentKind::ALL {
            assert!(!combined.intersects(kind.mask()), "{} overlaps", kind.name());
            combined |= kind.mask();
        }
        assert_eq!(combined, ComponentMask::all());
    }
}
