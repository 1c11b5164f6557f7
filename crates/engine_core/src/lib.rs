//! Core engine types and utilities shared by the climbing workspace.
//!
//! This crate provides the foundational types used across all systems:
//! - Transform, facing rotations and rotation interpolation
//! - Simulation time management
//! - Character shape and movement-mode types

pub mod components;
pub mod time;
pub mod transform;

pub use components::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{Mat3, Quat, Vec2, Vec3};
pub use hecs::{Entity, World};
