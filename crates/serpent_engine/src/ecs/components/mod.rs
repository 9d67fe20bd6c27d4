//! ECS Components module
//!
//! Built-in components understood by the engine's systems and renderers.

pub mod transform;
pub mod velocity;
pub mod renderable;
pub mod lifetime;
pub mod collider;
pub mod player;

pub use transform::TransformComponent;
pub use velocity::VelocityComponent;
pub use renderable::RenderableComponent;
pub use lifetime::LifetimeComponent;
pub use collider::ColliderComponent;
pub use player::PlayerComponent;
