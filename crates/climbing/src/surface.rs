//! Wall scanning, climbability checks and surface aggregation.

use crate::config::ClimbingConfig;
use crate::locomotion::CharacterBody;
use engine_core::WORLD_UP;
use glam::{Quat, Vec3};
use physics::{SceneQuery, SweepHit};

/// Cosines below this mark a hit normal with no horizontal part (floor or ceiling).
const FLAT_SURFACE_COS: f32 = 1e-4;
/// How much further the eye probe reaches per unit of surface slope.
const STEEPNESS_REACH: f32 = 6.0;

/// One contact of the wall scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    pub point: Vec3,
    pub normal: Vec3,
}

impl WallHit {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self { point, normal }
    }
}

impl From<SweepHit> for WallHit {
    fn from(hit: SweepHit) -> Self {
        Self::new(hit.point, hit.normal)
    }
}

/// Everything the latest scan touched, nearest first.
pub type WallHitSet = Vec<WallHit>;

/// `normal` with its vertical part removed, renormalized. Zero for a
/// horizontal surface.
pub fn horizontal_normal(normal: Vec3) -> Vec3 {
    Vec3::new(normal.x, 0.0, normal.z).normalize_or_zero()
}

/// The averaged surface being climbed. A zero normal means there is none.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimbingSurface {
    pub normal: Vec3,
    pub anchor: Vec3,
}

impl ClimbingSurface {
    pub const NONE: Self = Self {
        normal: Vec3::ZERO,
        anchor: Vec3::ZERO,
    };

    pub fn is_valid(&self) -> bool {
        self.normal != Vec3::ZERO
    }

    pub fn horizontal_normal(&self) -> Vec3 {
        horizontal_normal(self.normal)
    }
}

/// A line probe and what it found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSegment {
    pub start: Vec3,
    pub end: Vec3,
    pub hit: Option<SweepHit>,
}

impl TraceSegment {
    pub fn is_hit(&self) -> bool {
        self.hit.is_some()
    }
}

/// Geometry queries made on behalf of one character.
#[derive(Clone, Copy)]
pub struct SurfaceProbe<'a> {
    scene: &'a dyn SceneQuery,
    body: &'a CharacterBody,
    config: &'a ClimbingConfig,
}

impl<'a> SurfaceProbe<'a> {
    pub fn new(scene: &'a dyn SceneQuery, body: &'a CharacterBody, config: &'a ClimbingConfig) -> Self {
        Self { scene, body, config }
    }

    /// Center of the scan capsule at the start of its sweep.
    pub fn scan_start(&self) -> Vec3 {
        self.body.location() + self.body.forward() * self.config.scan_forward_offset
    }

    /// Sweep the upright scan capsule a tiny step forward and collect every
    /// static hit. A zero-length sweep misses some geometry, so it always moves.
    pub fn scan(&self) -> WallHitSet {
        let start = self.scan_start();
        let end = start + self.body.forward() * self.config.scan_sweep_length;
        self.scene
            .sweep_capsule_multi(
                start,
                end,
                Quat::IDENTITY,
                self.config.scan_capsule(),
                self.body.collider,
            )
            .into_iter()
            .map(WallHit::from)
            .collect()
    }

    /// Whether the character faces the hit within the configured angle.
    pub fn horizontal_climb_check(&self, hit: &WallHit) -> bool {
        let wall = horizontal_normal(hit.normal);
        let cos = self.body.forward().dot(-wall).clamp(-1.0, 1.0);
        cos.acos().to_degrees() <= self.config.min_horizontal_degrees_to_start_climbing
    }

    /// Whether the hit is steep enough and continues up to eye height.
    pub fn vertical_climb_check(&self, hit: &WallHit) -> bool {
        self.vertical_probe(hit).is_some_and(|probe| probe.is_hit())
    }

    /// The eye probe the vertical check runs for `hit`, or `None` for floors
    /// and ceilings, which never qualify.
    pub fn vertical_probe(&self, hit: &WallHit) -> Option<TraceSegment> {
        let cos = hit.normal.dot(horizontal_normal(hit.normal));
        if cos.abs() < FLAT_SURFACE_COS {
            return None;
        }
        let reach = self.config.collision_edge() * (1.0 + (1.0 - cos) * STEEPNESS_REACH);
        Some(self.eye_height_trace(reach))
    }

    /// Trace forward from eye height.
    pub fn eye_height_trace(&self, distance: f32) -> TraceSegment {
        let start = self.body.eye_location();
        let end = start + self.body.forward() * distance;
        TraceSegment {
            start,
            end,
            hit: self.scene.line_trace(start, end, self.body.collider),
        }
    }

    /// Whether any hit passes both the horizontal and the vertical check.
    pub fn can_start_climbing(&self, hits: &[WallHit]) -> bool {
        hits.iter()
            .any(|hit| self.horizontal_climb_check(hit) && self.vertical_climb_check(hit))
    }

    /// Average the hits into one surface, refining each with a short sphere
    /// sweep from the character toward it. Hits the sweep cannot reach are left out.
    pub fn compute_surface(&self, hits: &[WallHit]) -> ClimbingSurface {
        let origin = self.body.location();
        let mut point_sum = Vec3::ZERO;
        let mut normal_sum = Vec3::ZERO;
        let mut count = 0u32;

        for hit in hits {
            let direction = (hit.point - origin).normalize_or_zero();
            if direction == Vec3::ZERO {
                continue;
            }
            let end = origin + direction * self.config.surface_assist_length;
            if let Some(assist) = self.scene.sweep_sphere(
                origin,
                end,
                self.config.surface_assist_radius,
                self.body.collider,
            ) {
                point_sum += assist.point;
                normal_sum += assist.normal;
                count += 1;
            }
        }

        if count == 0 {
            return ClimbingSurface::NONE;
        }
        ClimbingSurface {
            normal: normal_sum.normalize_or_zero(),
            anchor: point_sum / count as f32,
        }
    }

    /// Trace down from the feet looking for floor.
    pub fn floor_probe(&self) -> TraceSegment {
        let start = self.body.feet_location();
        let end = start - WORLD_UP * self.config.floor_check_distance;
        TraceSegment {
            start,
            end,
            hit: self.scene.line_trace(start, end, self.body.collider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LocomotionConfig;
    use crate::test_support::{body_facing, BoxScene};

    fn probe<'a>(scene: &'a BoxScene, body: &'a CharacterBody, config: &'a ClimbingConfig) -> SurfaceProbe<'a> {
        SurfaceProbe::new(scene, body, config)
    }

    #[test]
    fn scan_finds_wall_in_front() {
        let scene = BoxScene::wall_world();
        let config = ClimbingConfig::default();
        let body = body_facing(Vec3::new(0.4, 1.0, 0.0), Vec3::X);
        let hits = probe(&scene, &body, &config).scan();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].normal.abs_diff_eq(-Vec3::X, 1e-5));
        assert!((hits[0].point.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn scan_in_open_space_is_empty() {
        let scene = BoxScene::wall_world();
        let config = ClimbingConfig::default();
        let body = body_facing(Vec3::new(-4.0, 1.0, 0.0), -Vec3::X);
        assert!(probe(&scene, &body, &config).scan().is_empty());
    }

    #[test]
    fn facing_wall_qualifies() {
        let scene = BoxScene::wall_world();
        let config = ClimbingConfig::default();
        let body = body_facing(Vec3::new(0.4, 1.0, 0.0), Vec3::X);
        let probe = probe(&scene, &body, &config);
        let hits = [WallHit::new(Vec3::new(1.0, 1.0, 0.0), -Vec3::X)];
        assert!(probe.horizontal_climb_check(&hits[0]));
        assert!(probe.vertical_climb_check(&hits[0]));
        assert!(probe.can_start_climbing(&hits));
    }

    #[test]
    fn looking_sideways_does_not_qualify() {
        let scene = BoxScene::wall_world();
        let config = ClimbingConfig::default();
        let body = body_facing(Vec3::new(0.4, 1.0, 0.0), Vec3::Z);
        let hits = [WallHit::new(Vec3::new(1.0, 1.0, 0.0), -Vec3::X)];
        assert!(!probe(&scene, &body, &config).can_start_climbing(&hits));
    }

    #[test]
    fn floors_and_ceilings_never_qualify() {
        let scene = BoxScene::wall_world();
        let config = ClimbingConfig::default();
        let body = body_facing(Vec3::new(0.4, 1.0, 0.0), Vec3::X);
        let hits = [
            WallHit::new(Vec3::new(0.4, 0.0, 0.0), Vec3::Y),
            WallHit::new(Vec3::new(0.4, 3.0, 0.0), -Vec3::Y),
        ];
        let probe = probe(&scene, &body, &config);
        assert!(hits.iter().all(|hit| probe.vertical_probe(hit).is_none()));
        assert!(!probe.can_start_climbing(&hits));
        assert!(!probe.can_start_climbing(&[]));
    }

    #[test]
    fn low_wall_fails_vertical_check() {
        let scene = BoxScene::new()
            .with_box(Vec3::new(-10.0, -1.0, -10.0), Vec3::new(10.0, 0.0, 10.0))
            .with_box(Vec3::new(1.0, 0.0, -5.0), Vec3::new(2.0, 1.2, 5.0));
        let config = ClimbingConfig::default();
        let body = body_facing(Vec3::new(0.4, 1.0, 0.0), Vec3::X);
        let hit = WallHit::new(Vec3::new(1.0, 1.0, 0.0), -Vec3::X);
        let probe = probe(&scene, &body, &config);
        assert!(probe.horizontal_climb_check(&hit));
        assert!(!probe.vertical_climb_check(&hit));
    }

    #[test]
    fn steeper_slopes_reach_further() {
        let scene = BoxScene::new();
        let config = ClimbingConfig::default();
        let body = body_facing(Vec3::ZERO, Vec3::X);
        let probe = probe(&scene, &body, &config);
        let wall = probe
            .vertical_probe(&WallHit::new(Vec3::X, -Vec3::X))
            .expect("vertical wall is probed");
        let slope = probe
            .vertical_probe(&WallHit::new(Vec3::X, Vec3::new(-0.8, 0.6, 0.0)))
            .expect("slope is probed");
        let wall_reach = (wall.end - wall.start).length();
        let slope_reach = (slope.end - slope.start).length();
        assert!((wall_reach - config.collision_edge()).abs() < 1e-5);
        // cos = 0.8, so the reach grows by a factor of 2.2.
        assert!((slope_reach - config.collision_edge() * 2.2).abs() < 1e-4);
    }

    #[test]
    fn no_hits_is_no_surface() {
        let scene = BoxScene::wall_world();
        let config = ClimbingConfig::default();
        let body = body_facing(Vec3::new(0.4, 1.0, 0.0), Vec3::X);
        let surface = probe(&scene, &body, &config).compute_surface(&[]);
        assert_eq!(surface, ClimbingSurface::NONE);
        assert!(!surface.is_valid());
    }

    #[test]
    fn surface_is_mean_of_assisted_hits() {
        // Inside corner: a wall facing -X and another facing -Z.
        let scene = BoxScene::new()
            .with_box(Vec3::new(1.0, 0.0, -5.0), Vec3::new(2.0, 5.0, 0.5))
            .with_box(Vec3::new(-5.0, 0.0, 1.0), Vec3::new(0.5, 5.0, 2.0));
        let config = ClimbingConfig::default();
        let body = body_facing(Vec3::new(0.4, 1.0, 0.4), Vec3::new(1.0, 0.0, 1.0));
        let probe = probe(&scene, &body, &config);
        let a = WallHit::new(Vec3::new(1.0, 1.0, 0.4), -Vec3::X);
        let b = WallHit::new(Vec3::new(0.4, 1.0, 1.0), -Vec3::Z);

        let forward = probe.compute_surface(&[a, b]);
        let backward = probe.compute_surface(&[b, a]);
        let expected = Vec3::new(-1.0, 0.0, -1.0).normalize();
        assert!(forward.normal.abs_diff_eq(expected, 1e-5));
        assert!((forward.normal.length() - 1.0).abs() < 1e-5);
        assert!(forward.anchor.abs_diff_eq(Vec3::new(0.7, 1.0, 0.7), 1e-4));
        assert!(backward.normal.abs_diff_eq(forward.normal, 1e-5));
        assert!(backward.anchor.abs_diff_eq(forward.anchor, 1e-5));
    }

    #[test]
    fn floor_probe_starts_at_feet() {
        let scene = BoxScene::ground_only();
        let config = ClimbingConfig::default();
        let body = body_facing(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        let probe = probe(&scene, &body, &config).floor_probe();
        let half_height = LocomotionConfig::default().capsule_half_height;
        assert!((probe.start.y - (1.0 - half_height)).abs() < 1e-5);
        let hit = probe.hit.expect("ground is within reach");
        assert!(hit.normal.abs_diff_eq(Vec3::Y, 1e-5));
    }
}
