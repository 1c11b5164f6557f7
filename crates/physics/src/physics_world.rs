//! Static collision world management with Rapier3D.

use crate::collision::CollisionGroup;
use engine_core::CapsuleShape;
use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

/// Environment collision groups so static geometry (ground, walls, ledges) is
/// visible to the character queries.
fn env_collision_groups() -> InteractionGroups {
    CollisionGroup::interaction_groups(CollisionGroup::environment())
}

/// Convert a glam position/rotation pair into a Rapier isometry.
pub fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(
        rotation.w, rotation.x, rotation.y, rotation.z,
    ));
    Isometry::from_parts(Translation3::new(position.x, position.y, position.z), rotation)
}

/// Collision world holding the static level geometry and the character colliders.
///
/// Characters are moved kinematically by the locomotion code, so the world never
/// runs a dynamics step; it only keeps the query pipeline up to date.
pub struct PhysicsWorld {
    pub rigid_body_set: RigidBodySet,
    pub collider_set: ColliderSet,
    pub query_pipeline: QueryPipeline,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsWorld {
    /// Create an empty collision world.
    pub fn new() -> Self {
        Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Update query pipeline after geometry was added, removed or moved.
    pub fn update_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.collider_set);
    }

    /// Add a ground plane collider (flat Y=0 half-space).
    pub fn add_ground_plane(&mut self) -> ColliderHandle {
        let collider = ColliderBuilder::halfspace(Vector::y_axis())
            .collision_groups(env_collision_groups())
            .build();
        self.collider_set.insert(collider)
    }

    /// Add a static cuboid collider (walls, ledges, slanted slabs). No parent body.
    /// `translation`: world position of center. `rotation`: world orientation.
    /// `half_extents`: half sizes in local X, Y, Z (before rotation).
    pub fn add_static_cuboid(
        &mut self,
        translation: Vec3,
        rotation: Quat,
        half_extents: Vec3,
    ) -> ColliderHandle {
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .position(to_isometry(translation, rotation))
            .collision_groups(env_collision_groups())
            .build();
        let handle = self.collider_set.insert(collider);
        log::debug!(
            "Static cuboid {:?} at {:?}, half extents {:?}",
            handle,
            translation,
            half_extents
        );
        handle
    }

    /// Add the collider of a kinematically driven character.
    ///
    /// It lives in the `Player` group so static-geometry queries never see it.
    pub fn add_character_capsule(&mut self, position: Vec3, capsule: CapsuleShape) -> ColliderHandle {
        let collider = ColliderBuilder::capsule_y(capsule.segment_half_height(), capsule.radius)
            .position(to_isometry(position, Quat::IDENTITY))
            .collision_groups(CollisionGroup::interaction_groups(CollisionGroup::player()))
            .build();
        let handle = self.collider_set.insert(collider);
        log::debug!(
            "Character capsule {:?} at {:?} (radius {}, half height {})",
            handle,
            position,
            capsule.radius,
            capsule.half_height
        );
        handle
    }

    /// Move a character collider to follow its body.
    pub fn set_character_pose(&mut self, handle: ColliderHandle, position: Vec3, rotation: Quat) {
        match self.collider_set.get_mut(handle) {
            Some(collider) => collider.set_position(to_isometry(position, rotation)),
            None => log::warn!("set_character_pose: no collider {:?}", handle),
        }
    }

    /// Resize a character collider (climbing shrinks and restores it).
    pub fn set_character_capsule(&mut self, handle: ColliderHandle, capsule: CapsuleShape) {
        if let Some(collider) = self.collider_set.get_mut(handle) {
            collider.set_shape(SharedShape::capsule_y(
                capsule.segment_half_height(),
                capsule.radius,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn character_collider_follows_pose_and_capsule() {
        let mut world = PhysicsWorld::new();
        let handle = world.add_character_capsule(Vec3::ZERO, CapsuleShape::new(0.42, 0.96));

        world.set_character_pose(handle, Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY);
        world.set_character_capsule(handle, CapsuleShape::new(0.12, 0.96));

        let collider = &world.collider_set[handle];
        let t = collider.position().translation;
        assert_eq!((t.x, t.y, t.z), (1.0, 2.0, 3.0));
        let capsule = collider.shape().as_capsule().unwrap();
        assert!((capsule.radius - 0.12).abs() < 1e-6);
        assert!((capsule.half_height() - 0.84).abs() < 1e-6);
    }

    #[test]
    fn static_cuboid_uses_given_extents() {
        let mut world = PhysicsWorld::new();
        let handle = world.add_static_cuboid(Vec3::new(4.5, 1.5, 0.0), Quat::IDENTITY, Vec3::new(1.5, 1.5, 4.0));
        let cuboid = world.collider_set[handle].shape().as_cuboid().unwrap();
        assert_eq!(cuboid.half_extents.x, 1.5);
        assert_eq!(cuboid.half_extents.z, 4.0);
    }
}
