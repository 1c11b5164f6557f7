//! Transform component and utilities for spatial positioning.

use glam::{Mat3, Quat, Vec3};

/// World up axis (Y-up, right-handed).
pub const WORLD_UP: Vec3 = Vec3::Y;

/// A 3D transform representing position and rotation of a character body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a transform at `position` whose forward axis points along `direction`.
    /// Falls back to the identity rotation for a zero direction.
    pub fn facing(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            rotation: rotation_facing(direction).unwrap_or(Quat::IDENTITY),
        }
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Get the right direction (positive X).
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::X
    }

    /// Get the up direction (positive Y).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Translate the transform by a delta.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
    }

    /// Heading around the world up axis, in radians.
    ///
    /// When the forward axis is (nearly) vertical the heading is read from the
    /// up axis instead, which is then the one lying in the horizontal plane.
    pub fn yaw(&self) -> f32 {
        let forward = self.forward();
        let mut heading = Vec3::new(forward.x, 0.0, forward.z);
        if heading.length_squared() < 1e-8 {
            let up = self.up();
            let sign = if forward.y > 0.0 { -1.0 } else { 1.0 };
            heading = Vec3::new(up.x, 0.0, up.z) * sign;
        }
        (-heading.x).atan2(-heading.z)
    }

    /// Drop pitch and roll, keeping only the heading.
    pub fn make_upright(&mut self) {
        self.rotation = Quat::from_rotation_y(self.yaw());
    }
}

/// Rotation whose forward axis (-Z) points along `direction`, keeping the
/// local up axis as close to world up as possible.
///
/// Returns `None` for a zero-length direction.
pub fn rotation_facing(direction: Vec3) -> Option<Quat> {
    let forward = direction.try_normalize()?;
    let mut right = forward.cross(WORLD_UP);
    if right.length_squared() < 1e-8 {
        // Looking straight up or down: any horizontal right axis will do.
        right = Vec3::X;
    }
    let right = right.normalize();
    let up = right.cross(forward);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize())
}

/// Move `current` toward `target` at `speed` (per second), frame-rate independent.
///
/// A non-positive speed snaps straight to the target.
pub fn quat_interp_to(current: Quat, target: Quat, dt: f32, speed: f32) -> Quat {
    if speed <= 0.0 || current.dot(target).abs() > 1.0 - 1e-6 {
        return target;
    }
    let alpha = (speed * dt).clamp(0.0, 1.0);
    current.slerp(target, alpha).normalize()
}
