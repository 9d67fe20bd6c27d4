//! Core engine configuration types

pub mod config;

pub use config::{
    BackgroundConfig, CameraConfig, ParticleConfig, PipelineConfig, RenderConfig, MAX_ZOOM,
    MIN_ZOOM,
};
