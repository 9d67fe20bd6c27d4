//! Particle subsystem
//!
//! Pooled short-lived effect particles plus the immortal ambient particles
//! that decorate the arena border.

pub mod border;
pub mod particle;
pub mod pool;

pub use border::{BorderParticle, Edge};
pub use particle::{Particle, ParticleKind, ParticleSpawn};
pub use pool::ParticlePool;
