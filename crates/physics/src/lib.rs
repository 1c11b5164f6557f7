//! Static collision world and scene queries using Rapier3D.

pub mod collision;
pub mod physics_world;
pub mod query;

pub use collision::*;
pub use physics_world::*;
pub use query::*;

// Re-export Rapier for downstream crates
pub use rapier3d;

// Re-export common Rapier types
pub use rapier3d::prelude::{ColliderHandle, RigidBodyHandle};
