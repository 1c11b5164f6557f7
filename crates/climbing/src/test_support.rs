//! Scene, animation and drawing doubles for the climbing tests.

use crate::animation::{AnimationPlayer, ClipId};
use crate::config::LocomotionConfig;
use crate::debug::{DebugColor, DebugDraw};
use crate::locomotion::CharacterBody;
use engine_core::{CapsuleShape, Transform};
use glam::{Quat, Vec3};
use physics::{ColliderHandle, SceneQuery, SweepHit};

/// Axis-aligned static box.
#[derive(Debug, Clone, Copy)]
struct Aabb {
    min: Vec3,
    max: Vec3,
}

impl Aabb {
    fn grown(&self, extent: Vec3) -> Self {
        Self {
            min: self.min - extent,
            max: self.max + extent,
        }
    }

    fn contains(&self, point: Vec3) -> bool {
        point.cmpgt(self.min).all() && point.cmplt(self.max).all()
    }

    /// Outward normal of the face nearest to an inside `point`.
    fn nearest_face_normal(&self, point: Vec3) -> Vec3 {
        let mut best = f32::MAX;
        let mut normal = Vec3::ZERO;
        for axis in 0..3 {
            let mut unit = Vec3::ZERO;
            unit[axis] = 1.0;
            let to_min = point[axis] - self.min[axis];
            let to_max = self.max[axis] - point[axis];
            if to_min < best {
                best = to_min;
                normal = -unit;
            }
            if to_max < best {
                best = to_max;
                normal = unit;
            }
        }
        normal
    }

    /// `point` clamped onto the face whose outward normal is `normal`.
    fn face_point(&self, point: Vec3, normal: Vec3) -> Vec3 {
        let mut on_face = point.clamp(self.min, self.max);
        for axis in 0..3 {
            if normal[axis] > 0.0 {
                on_face[axis] = self.max[axis];
            } else if normal[axis] < 0.0 {
                on_face[axis] = self.min[axis];
            }
        }
        on_face
    }

    /// Entry time and face normal of the segment `start..start + motion`.
    fn segment_entry(&self, start: Vec3, motion: Vec3) -> Option<(f32, Vec3)> {
        let mut enter = 0.0f32;
        let mut exit = 1.0f32;
        let mut normal = Vec3::ZERO;
        for axis in 0..3 {
            let (s, d) = (start[axis], motion[axis]);
            if d.abs() < 1e-9 {
                if s < self.min[axis] || s > self.max[axis] {
                    return None;
                }
                continue;
            }
            let mut unit = Vec3::ZERO;
            unit[axis] = 1.0;
            let (mut near, mut far) = ((self.min[axis] - s) / d, (self.max[axis] - s) / d);
            let mut face = -unit;
            if near > far {
                std::mem::swap(&mut near, &mut far);
                face = unit;
            }
            if near > enter || (normal == Vec3::ZERO && near >= enter) {
                enter = near;
                normal = face;
            }
            exit = exit.min(far);
            if enter > exit {
                return None;
            }
        }
        (normal != Vec3::ZERO).then_some((enter, normal))
    }
}

/// Analytic scene of axis-aligned boxes. Capsules are treated as boxes of
/// their radius and half height, which is exact against box faces.
#[derive(Debug, Clone, Default)]
pub struct BoxScene {
    boxes: Vec<Aabb>,
}

fn handle(index: usize) -> ColliderHandle {
    ColliderHandle::from_raw_parts(index as u32, 0)
}

impl BoxScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_box(mut self, min: Vec3, max: Vec3) -> Self {
        self.boxes.push(Aabb { min, max });
        self
    }

    /// Flat ground whose top is at y = 0.
    pub fn ground_only() -> Self {
        Self::new().with_box(Vec3::new(-50.0, -1.0, -50.0), Vec3::new(50.0, 0.0, 50.0))
    }

    /// Ground plus a 5 m wall whose climbable face looks down -X at x = 1.
    pub fn wall_world() -> Self {
        Self::ground_only().with_box(Vec3::new(1.0, 0.0, -5.0), Vec3::new(2.0, 5.0, 5.0))
    }

    /// Hits of a box-shaped sweep of half size `extent`, nearest first.
    ///
    /// Boxes overlapping at `start` are reported at distance zero when
    /// `report_overlaps` is set, or when the motion pushes further in.
    fn sweep(
        &self,
        start: Vec3,
        end: Vec3,
        extent: Vec3,
        ignore: Option<ColliderHandle>,
        report_overlaps: bool,
    ) -> Vec<SweepHit> {
        let motion = end - start;
        let length = motion.length();
        let mut hits = Vec::new();

        for (index, aabb) in self.boxes.iter().enumerate() {
            let collider = handle(index);
            if ignore == Some(collider) {
                continue;
            }
            let grown = aabb.grown(extent);

            let (fraction, normal, center) = if grown.contains(start) {
                let normal = grown.nearest_face_normal(start);
                if !report_overlaps && motion.dot(normal) >= 0.0 {
                    continue;
                }
                (0.0, normal, start)
            } else if let Some((fraction, normal)) = grown.segment_entry(start, motion) {
                (fraction, normal, start + motion * fraction)
            } else {
                continue;
            };

            let point = aabb.face_point(center - normal * extent.dot(normal.abs()), normal);
            hits.push(SweepHit {
                collider: Some(collider),
                fraction,
                distance: fraction * length,
                point,
                normal,
            });
        }

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }
}

fn capsule_extent(capsule: CapsuleShape) -> Vec3 {
    Vec3::new(capsule.radius, capsule.half_height, capsule.radius)
}

impl SceneQuery for BoxScene {
    fn sweep_capsule_multi(
        &self,
        start: Vec3,
        end: Vec3,
        _rotation: Quat,
        capsule: CapsuleShape,
        ignore: Option<ColliderHandle>,
    ) -> Vec<SweepHit> {
        self.sweep(start, end, capsule_extent(capsule), ignore, true)
    }

    fn sweep_capsule(
        &self,
        start: Vec3,
        end: Vec3,
        _rotation: Quat,
        capsule: CapsuleShape,
        ignore: Option<ColliderHandle>,
    ) -> Option<SweepHit> {
        self.sweep(start, end, capsule_extent(capsule), ignore, false)
            .into_iter()
            .next()
    }

    fn sweep_sphere(
        &self,
        start: Vec3,
        end: Vec3,
        radius: f32,
        ignore: Option<ColliderHandle>,
    ) -> Option<SweepHit> {
        self.sweep(start, end, Vec3::splat(radius), ignore, false)
            .into_iter()
            .next()
    }

    fn line_trace(&self, start: Vec3, end: Vec3, ignore: Option<ColliderHandle>) -> Option<SweepHit> {
        self.sweep(start, end, Vec3::ZERO, ignore, true).into_iter().next()
    }
}

/// Default-sized body at `position` looking along `direction`.
pub fn body_facing(position: Vec3, direction: Vec3) -> CharacterBody {
    CharacterBody::new(Transform::facing(position, direction), &LocomotionConfig::default())
}

/// Animation double that plays one clip at a time until told to stop.
#[derive(Debug, Default)]
pub struct RecordingAnimation {
    pub playing: Option<ClipId>,
    pub played: Vec<ClipId>,
    /// Root motion reported while a clip plays.
    pub root_motion: Option<Vec3>,
}

impl RecordingAnimation {
    pub fn stop(&mut self) {
        self.playing = None;
    }
}

impl AnimationPlayer for RecordingAnimation {
    fn is_playing(&self, clip: &ClipId) -> bool {
        self.playing.as_ref() == Some(clip)
    }

    fn play(&mut self, clip: &ClipId) {
        self.playing = Some(clip.clone());
        self.played.push(clip.clone());
    }

    fn root_motion_velocity(&self) -> Option<Vec3> {
        self.playing.as_ref().and(self.root_motion)
    }
}

/// Debug drawer that remembers the color of everything drawn.
#[derive(Debug, Default)]
pub struct RecordingDraw {
    pub capsules: Vec<DebugColor>,
    pub spheres: Vec<DebugColor>,
    pub lines: Vec<DebugColor>,
}

impl DebugDraw for RecordingDraw {
    fn capsule(&mut self, _center: Vec3, _capsule: CapsuleShape, color: DebugColor) {
        self.capsules.push(color);
    }

    fn sphere(&mut self, _center: Vec3, _radius: f32, color: DebugColor) {
        self.spheres.push(color);
    }

    fn line(&mut self, _start: Vec3, _end: Vec3, color: DebugColor) {
        self.lines.push(color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_sweep_reports_point_on_the_face() {
        let scene = BoxScene::wall_world();
        let capsule = CapsuleShape::new(0.5, 0.72);
        // Starts 0.4 from the face with a 0.5 radius: already touching.
        let start = Vec3::new(0.6, 1.0, 0.0);
        let hits = scene.sweep_capsule_multi(start, start + Vec3::X * 0.01, Quat::IDENTITY, capsule, None);
        let wall = hits
            .iter()
            .find(|hit| hit.normal.abs_diff_eq(-Vec3::X, 1e-5))
            .expect("wall overlaps the capsule");
        assert_eq!(wall.fraction, 0.0);
        assert!((wall.point.x - 1.0).abs() < 1e-5);
        assert!((wall.point.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn swept_hit_lands_on_the_entered_face() {
        let scene = BoxScene::wall_world();
        let hit = scene
            .sweep_sphere(Vec3::new(-1.0, 2.0, 0.0), Vec3::new(3.0, 2.0, 0.0), 0.1, None)
            .expect("sphere reaches the wall");
        assert!((hit.point.x - 1.0).abs() < 1e-5);
        assert!((hit.distance - 1.9).abs() < 1e-4);
    }
}
