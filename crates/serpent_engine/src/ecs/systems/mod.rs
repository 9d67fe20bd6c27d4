//! Built-in systems

pub mod movement;
pub mod lifetime;

pub use movement::MovementSystem;
pub use lifetime::LifetimeSystem;
