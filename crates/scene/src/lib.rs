//! Solar-system simulation: celestial bodies, per-frame orbital update,
//! and the instance-matrix batch for the instanced planet draw.
//!
//! Pure math over glam; the renderer consumes the matrices this crate
//! produces but no GPU types appear here.

pub mod body;
pub mod system;

pub use body::*;
pub use system::*;
