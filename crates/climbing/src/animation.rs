//! The narrow animation seam used for the ledge mantle.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Name of an animation clip / montage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

/// Montage playback provided by the host animation system.
pub trait AnimationPlayer {
    /// Whether `clip` is currently playing.
    fn is_playing(&self, clip: &ClipId) -> bool;

    /// Start playing `clip` from the beginning.
    fn play(&mut self, clip: &ClipId);

    /// Animation-driven velocity in character-local space (x right, y up, -z
    /// forward), if a playing clip currently supplies root motion.
    fn root_motion_velocity(&self) -> Option<Vec3> {
        None
    }
}

/// Animation stand-in for characters without montages.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAnimation;

impl AnimationPlayer for NoAnimation {
    fn is_playing(&self, _clip: &ClipId) -> bool {
        false
    }

    fn play(&mut self, _clip: &ClipId) {}
}
