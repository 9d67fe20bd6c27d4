//! Math utilities and types
//!
//! Provides the 2D math types used by the camera, particles and renderers.

use std::f32::consts::{PI, TAU};

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Math utility functions
pub mod utils {
    use super::{PI, TAU};

    /// Linear interpolation between `a` and `b`
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Wrap an angle into the `(-PI, PI]` range
    pub fn wrap_angle(angle: f32) -> f32 {
        let mut wrapped = angle % TAU;
        if wrapped > PI {
            wrapped -= TAU;
        } else if wrapped <= -PI {
            wrapped += TAU;
        }
        wrapped
    }

    /// Shortest signed rotation that takes `from` onto `to`
    pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
        wrap_angle(to - from)
    }

    /// Interpolate between two angles along the shortest arc
    pub fn lerp_angle(from: f32, to: f32, t: f32) -> f32 {
        from + shortest_angle_delta(from, to) * t
    }
}
