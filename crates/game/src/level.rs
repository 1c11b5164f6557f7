//! Static sandbox level: a ground plane plus climbable blocks.

use glam::{Quat, Vec3};
use physics::{ColliderHandle, PhysicsWorld};
use serde::{Deserialize, Serialize};

/// A static box. Its faces are the walls, its top the ledge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockSpec {
    pub center: [f32; 3],
    pub half_extents: [f32; 3],
    /// Rotation about the world up axis.
    #[serde(default)]
    pub yaw_degrees: f32,
}

/// One 3 m block whose face looks down -X at x = 3, with a 3 m deep top to
/// stand on, and a low angled step off to the side.
pub fn default_level() -> Vec<BlockSpec> {
    vec![
        BlockSpec {
            center: [4.5, 1.5, 0.0],
            half_extents: [1.5, 1.5, 4.0],
            yaw_degrees: 0.0,
        },
        BlockSpec {
            center: [-4.0, 0.5, 6.0],
            half_extents: [1.0, 0.5, 2.0],
            yaw_degrees: 30.0,
        },
    ]
}

/// Add the ground and `blocks` to `physics`, then refresh its query pipeline.
pub fn build_level(physics: &mut PhysicsWorld, blocks: &[BlockSpec]) -> Vec<ColliderHandle> {
    physics.add_ground_plane();
    let handles = blocks
        .iter()
        .map(|block| {
            physics.add_static_cuboid(
                Vec3::from_array(block.center),
                Quat::from_rotation_y(block.yaw_degrees.to_radians()),
                Vec3::from_array(block.half_extents),
            )
        })
        .collect();
    physics.update_query_pipeline();
    handles
}
