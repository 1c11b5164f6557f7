//! Collision groups and query filtering.

use rapier3d::prelude::*;

/// Collision groups for different entity types.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionGroup {
    /// Static environment (terrain, walls, ledges)
    Environment = 1 << 0,
    /// Player character
    Player = 1 << 1,
}

impl CollisionGroup {
    /// Create a collision group for environment.
    pub fn environment() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Environment as u32);
        let filter = Group::ALL;
        (membership, filter)
    }

    /// Create a collision group for player.
    pub fn player() -> (Group, Group) {
        let membership = Group::from_bits_retain(Self::Player as u32);
        let filter = Group::from_bits_retain(Self::Environment as u32);
        (membership, filter)
    }

    /// Interaction groups for scene queries that only see static geometry.
    pub fn static_query() -> InteractionGroups {
        InteractionGroups::new(Group::ALL, Group::from_bits_retain(Self::Environment as u32))
    }

    pub fn interaction_groups((membership, filter): (Group, Group)) -> InteractionGroups {
        InteractionGroups::new(membership, filter)
    }
}

/// Filter for the static-geometry query channel, optionally ignoring one collider
/// (usually the querying character's own body).
pub fn static_filter<'a>(ignore: Option<ColliderHandle>) -> QueryFilter<'a> {
    let filter = QueryFilter::default().groups(CollisionGroup::static_query());
    match ignore {
        Some(handle) => filter.exclude_collider(handle),
        None => filter,
    }
}

/// Handles linking a character to its physics representation.
#[derive(Debug, Clone, Copy)]
pub struct PhysicsBody {
    pub collider: ColliderHandle,
}

impl PhysicsBody {
    pub fn new(collider: ColliderHandle) -> Self {
        Self { collider }
    }
}
