//! Wall climbing for capsule characters.
//!
//! A [`CharacterMovement`] host runs walking and falling; [`ClimbingMovement`]
//! plugs into it through the [`Locomotion`] hooks to scan for walls, decide
//! when climbing may start, move the character along the wall, mantle over
//! ledges and dash. [`ClimbingCharacter`] wraps both behind player commands.

pub mod animation;
pub mod character;
pub mod climbing;
pub mod config;
pub mod curve;
pub mod dash;
pub mod debug;
mod ledge;
pub mod locomotion;
mod motion;
pub mod surface;
pub mod velocity;

#[cfg(test)]
mod test_support;

pub use animation::{AnimationPlayer, ClipId, NoAnimation};
pub use character::ClimbingCharacter;
pub use climbing::{ClimbingMovement, CLIMBING};
pub use config::{ClimbingConfig, ConfigError, LocomotionConfig};
pub use curve::{CurveKey, FloatCurve};
pub use dash::ClimbDashState;
pub use debug::{DebugColor, DebugDraw, LogDebugDraw, NoDebugDraw};
pub use locomotion::{BasicLocomotion, CharacterBody, CharacterMovement, Locomotion, PhysOutcome, StepContext};
pub use surface::{ClimbingSurface, WallHit, WallHitSet};
