//! Core types shared across the planetarium demo.

pub mod time;

pub use time::*;

// Re-export commonly used math types
pub use glam::{Mat4, Vec2, Vec3};
