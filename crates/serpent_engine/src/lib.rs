//! # Serpent Engine
//!
//! Simulation-and-presentation core of a top-down snake arcade game.
//!
//! ## Features
//!
//! - **ECS Runtime**: Entities, enumerated components and prioritised systems
//! - **Camera**: World/screen transforms, smoothing, shake, bounds and culling
//! - **Particles**: Pooled particle lifecycle and ambient border particles
//! - **Render Pipeline**: Layer-ordered renderers with fault containment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use serpent_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RenderConfig::default();
//!     let surface = RecordingSurface::new(800.0, 600.0);
//!     let mut rendering = RenderingSystem::new(surface, config)?;
//!     rendering.initialize(InitOptions::new(4000.0, 4000.0))?;
//!
//!     let state = GameState::default();
//!     rendering.update(16.67);
//!     rendering.render(&state);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod core;

pub mod config;
pub mod foundation;
pub mod ecs;
pub mod particles;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        core::config::{
            BackgroundConfig, CameraConfig, ParticleConfig, PipelineConfig, RenderConfig,
        },
        config::{Config, ConfigError},
        ecs::{
            Component, ComponentKind, ComponentMask, Coordinator, Entity, EntityId, System,
            SystemId,
        },
        foundation::math::Vec2,
        particles::{BorderParticle, Particle, ParticleKind, ParticlePool, ParticleSpawn},
        render::{
            Camera, Color, DrawSurface, Element, ElementData, GameState, ImageHandle,
            InitOptions, RecordingSurface, RenderError, RenderLayer, RenderPipeline, Renderer,
            RenderingSystem, Segment, Snake,
        },
    };
}
