//! Climbing over the top of a wall onto the floor behind it.

use crate::climbing::ClimbingMovement;
use crate::locomotion::{CharacterBody, StepContext};
use crate::surface::SurfaceProbe;
use engine_core::WORLD_UP;
use glam::Vec3;
use physics::SceneQuery;

/// Extra height the landing capsule is lifted above the ledge floor.
const LANDING_CLEARANCE: f32 = 0.05;

impl ClimbingMovement {
    /// Start the mantle montage if the character has climbed past the top of
    /// the wall and there is room to stand behind it.
    pub(crate) fn try_mantle(&mut self, body: &mut CharacterBody, ctx: &mut StepContext<'_>) -> bool {
        let Some(clip) = self.config.mantle_clip.clone() else {
            return false;
        };
        if ctx.animation.is_playing(&clip) || !self.has_reached_ledge(body, ctx.scene) {
            return false;
        }
        let Some(landing) = self.ledge_landing(body, ctx.scene, ctx.walkable_floor_z) else {
            return false;
        };
        if !self.can_move_to_ledge(body, ctx.scene, landing) {
            return false;
        }

        body.make_upright();
        ctx.animation.play(&clip);
        self.mantling = true;
        log::debug!("mantling onto ledge at {:.2?}", landing);
        true
    }

    /// Moving up with nothing left in front of the eyes.
    pub(crate) fn has_reached_ledge(&self, body: &CharacterBody, scene: &dyn SceneQuery) -> bool {
        if body.velocity.dot(WORLD_UP) <= 0.0 {
            return false;
        }
        let probe = SurfaceProbe::new(scene, body, &self.config);
        !probe.eye_height_trace(self.config.collision_edge()).is_hit()
    }

    /// Where the capsule center would stand on the ledge, if the floor there is walkable.
    pub(crate) fn ledge_landing(
        &self,
        body: &CharacterBody,
        scene: &dyn SceneQuery,
        walkable_floor_z: f32,
    ) -> Option<Vec3> {
        let start = body.location()
            + body.forward() * self.config.ledge_forward_offset
            + WORLD_UP * self.config.ledge_up_offset;
        let end = start - WORLD_UP * self.config.ledge_floor_probe_distance;
        let floor = scene
            .line_trace(start, end, body.collider)
            .filter(|hit| hit.normal.y >= walkable_floor_z)?;
        Some(floor.point + WORLD_UP * (body.half_height() + LANDING_CLEARANCE))
    }

    /// Sweep the character capsule across to `landing` at landing height, so
    /// the lip being climbed does not count as an obstacle.
    pub(crate) fn can_move_to_ledge(&self, body: &CharacterBody, scene: &dyn SceneQuery, landing: Vec3) -> bool {
        let heading = Vec3::new(body.forward().x, 0.0, body.forward().z).normalize_or_zero();
        let start = landing - heading * self.config.ledge_forward_offset;
        scene
            .sweep_capsule(start, landing, body.rotation(), body.capsule(), body.collider)
            .is_none()
    }
}
