//! Scene queries used by character locomotion: line probes and shape sweeps.

use crate::collision::static_filter;
use crate::physics_world::{to_isometry, PhysicsWorld};
use engine_core::CapsuleShape;
use glam::{Quat, Vec3};
use rapier3d::parry::query::{self as parry_query, ShapeCastOptions};
use rapier3d::parry::shape::{Ball, Capsule, Shape};
use rapier3d::prelude::*;

/// Upper bound on the distinct colliders a multi-hit sweep reports.
const MAX_SWEEP_HITS: usize = 16;

/// Result of a line probe or shape sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepHit {
    /// The collider that was hit, if the backend tracks colliders.
    pub collider: Option<ColliderHandle>,
    /// Fraction of the segment travelled before the hit, in `[0, 1]`.
    pub fraction: f32,
    /// Distance travelled along the segment before the hit.
    pub distance: f32,
    /// World position of the impact on the hit surface.
    pub point: Vec3,
    /// Surface normal at the impact, pointing away from the hit geometry.
    pub normal: Vec3,
}

/// Synchronous, read-only queries against static geometry.
///
/// Every query filters to the static channel and skips `ignore` (the querying
/// character's own collider). A miss is `None` or an empty list, never an error.
pub trait SceneQuery {
    /// Sweep an upright-relative capsule from `start` to `end`, reporting every
    /// collider touched along the way (including ones overlapping at `start`),
    /// ordered by distance.
    fn sweep_capsule_multi(
        &self,
        start: Vec3,
        end: Vec3,
        rotation: Quat,
        capsule: CapsuleShape,
        ignore: Option<ColliderHandle>,
    ) -> Vec<SweepHit>;

    /// Sweep a capsule and report the first blocking hit.
    fn sweep_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        rotation: Quat,
        capsule: CapsuleShape,
        ignore: Option<ColliderHandle>,
    ) -> Option<SweepHit>;

    /// Sweep a sphere and report the first blocking hit.
    fn sweep_sphere(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        ignore: Option<ColliderHandle>,
    ) -> Option<SweepHit>;

    /// Trace a line segment and report the first hit.
    fn line_trace(&self, start: Vec3, end: Vec3, ignore: Option<ColliderHandle>) -> Option<SweepHit>;
}

fn to_vec3(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn point_to_vec3(p: &Point<Real>) -> Vec3 {
    Vec3::new(p.x, p.y, p.z)
}

fn capsule_shape(capsule: CapsuleShape) -> Capsule {
    Capsule::new_y(capsule.segment_half_height(), capsule.radius)
}

impl PhysicsWorld {
    /// Cast `shape` along `start..end` and return the first hit that the filter accepts.
    fn cast_shape_segment(
        &self,
        start: Vec3,
        end: Vec3,
        rotation: Quat,
        shape: &dyn Shape,
        filter: QueryFilter,
    ) -> Option<SweepHit> {
        let motion = end - start;
        let length = motion.length();
        let shape_pos = to_isometry(start, rotation);
        let shape_vel = vector![motion.x, motion.y, motion.z];
        // Shapes that start touching but move away are not considered blocked.
        let options = ShapeCastOptions {
            stop_at_penetration: false,
            ..ShapeCastOptions::with_max_time_of_impact(1.0)
        };

        self.query_pipeline
            .cast_shape(
                &self.rigid_body_set,
                &self.collider_set,
                &shape_pos,
                &shape_vel,
                shape,
                options,
                filter,
            )
            .map(|(collider, hit)| SweepHit {
                collider: Some(collider),
                fraction: hit.time_of_impact,
                distance: hit.time_of_impact * length,
                point: point_to_vec3(&hit.witness1),
                normal: to_vec3(&hit.normal1),
            })
    }

    /// Colliders overlapping `shape` at `position`, with their contact data.
    fn overlap_contacts(
        &self,
        position: Vec3,
        rotation: Quat,
        shape: &dyn Shape,
        filter: QueryFilter,
    ) -> Vec<SweepHit> {
        let shape_pos = to_isometry(position, rotation);
        let mut overlapping = Vec::new();
        self.query_pipeline.intersections_with_shape(
            &self.rigid_body_set,
            &self.collider_set,
            &shape_pos,
            shape,
            filter,
            |collider| {
                overlapping.push(collider);
                true // Continue searching
            },
        );

        overlapping
            .into_iter()
            .filter_map(|handle| {
                let collider = self.collider_set.get(handle)?;
                let contact = parry_query::contact(
                    &shape_pos,
                    shape,
                    collider.position(),
                    collider.shape(),
                    0.0,
                )
                .ok()??;
                Some(SweepHit {
                    collider: Some(handle),
                    fraction: 0.0,
                    distance: 0.0,
                    point: point_to_vec3(&contact.point2),
                    normal: to_vec3(&contact.normal2),
                })
            })
            .collect()
    }
}

impl SceneQuery for PhysicsWorld {
    fn sweep_capsule_multi(
        &self,
        start: Vec3,
        end: Vec3,
        rotation: Quat,
        capsule: CapsuleShape,
        ignore: Option<ColliderHandle>,
    ) -> Vec<SweepHit> {
        let shape = capsule_shape(capsule);
        let mut hits = self.overlap_contacts(start, rotation, &shape, static_filter(ignore));
        let mut seen: Vec<ColliderHandle> = hits.iter().filter_map(|h| h.collider).collect();

        while hits.len() < MAX_SWEEP_HITS {
            let next = {
                let unseen = |handle: ColliderHandle, _: &Collider| !seen.contains(&handle);
                let filter = static_filter(ignore).predicate(&unseen);
                self.cast_shape_segment(start, end, rotation, &shape, filter)
            };
            let Some(hit) = next else {
                break;
            };
            if let Some(handle) = hit.collider {
                seen.push(handle);
            }
            hits.push(hit);
        }

        // Sort by distance (use unwrap_or to avoid panic on NaN)
        hits.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        hits
    }

    fn sweep_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        rotation: Quat,
        capsule: CapsuleShape,
        ignore: Option<ColliderHandle>,
    ) -> Option<SweepHit> {
        let shape = capsule_shape(capsule);
        self.cast_shape_segment(start, end, rotation, &shape, static_filter(ignore))
    }

    fn sweep_sphere(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        ignore: Option<ColliderHandle>,
    ) -> Option<SweepHit> {
        let shape = Ball::new(radius);
        self.cast_shape_segment(start, end, Quat::IDENTITY, &shape, static_filter(ignore))
    }

    fn line_trace(&self, start: Vec3, end: Vec3, ignore: Option<ColliderHandle>) -> Option<SweepHit> {
        let direction = end - start;
        let length = direction.length();
        if length < 1e-6 {
            return None;
        }
        let direction = direction / length;
        let ray = Ray::new(
            point![start.x, start.y, start.z],
            vector![direction.x, direction.y, direction.z],
        );

        self.query_pipeline
            .cast_ray_and_get_normal(
                &self.rigid_body_set,
                &self.collider_set,
                &ray,
                length,
                true,
                static_filter(ignore),
            )
            .map(|(collider, intersection)| SweepHit {
                collider: Some(collider),
                fraction: intersection.time_of_impact / length,
                distance: intersection.time_of_impact,
                point: start + direction * intersection.time_of_impact,
                normal: to_vec3(&intersection.normal),
            })
    }
}
