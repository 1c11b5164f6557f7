//! Per-step climbing physics: velocity, movement along the wall, rotation and snapping.

use crate::climbing::ClimbingMovement;
use crate::locomotion::{CharacterBody, PhysOutcome, StepContext, MIN_TICK_TIME};
use crate::surface::SurfaceProbe;
use crate::velocity::{calc_velocity, VelocityParams};
use engine_core::{quat_interp_to, rotation_facing};
use glam::{Quat, Vec3};
use physics::SceneQuery;

impl ClimbingMovement {
    pub(crate) fn phys_climbing(
        &mut self,
        body: &mut CharacterBody,
        ctx: &mut StepContext<'_>,
        dt: f32,
    ) -> PhysOutcome {
        if dt < MIN_TICK_TIME {
            return PhysOutcome::Done;
        }

        self.surface = SurfaceProbe::new(ctx.scene, body, &self.config).compute_surface(&self.wall_hits);

        if self.mantling && !self.mantle_playing(&*ctx.animation) {
            self.mantling = false;
        }

        if self.should_stop_climbing(body, ctx.scene, &*ctx.animation, ctx.walkable_floor_z) {
            return self.stop_climbing(dt);
        }

        self.dash.align_to_surface(self.surface.horizontal_normal());

        let root_motion = ctx
            .animation
            .root_motion_velocity()
            .map(|local| body.rotation() * local);
        self.compute_climbing_velocity(body, root_motion, dt);
        let duration = self.dash_duration();
        self.dash.advance(dt, duration);

        let old_location = body.location();
        self.move_along_surface(body, ctx.scene, dt);
        if root_motion.is_none() {
            body.velocity = (body.location() - old_location) / dt;
        }

        self.try_mantle(body, ctx);
        self.snap_to_surface(body, ctx.scene, dt);
        PhysOutcome::Done
    }

    fn compute_climbing_velocity(&self, body: &mut CharacterBody, root_motion: Option<Vec3>, dt: f32) {
        if let Some(velocity) = root_motion {
            body.velocity = velocity;
            return;
        }

        if self.dash.is_active() {
            if let Some(curve) = &self.config.dash_curve {
                body.velocity = self.dash.velocity(curve);
                return;
            }
        }

        let params = VelocityParams {
            max_speed: self.config.max_climbing_speed,
            friction: 0.0,
            braking_deceleration: self.config.braking_deceleration_climbing,
            braking_friction_factor: 0.0,
        };
        body.velocity = calc_velocity(body.velocity, body.acceleration, dt, &params);
    }

    fn move_along_surface(&self, body: &mut CharacterBody, scene: &dyn SceneQuery, dt: f32) {
        let delta = body.velocity * dt;
        let rotation = self.smooth_climbing_rotation(body, dt);
        if let Some(hit) = body.safe_move(scene, delta, rotation) {
            body.slide_along_surface(scene, delta, &hit);
        }
    }

    /// Speed-up applied to rotation and snapping when moving faster than the
    /// climbing max speed.
    fn speed_factor(&self, body: &CharacterBody) -> f32 {
        (body.velocity.length() / self.config.max_climbing_speed).max(1.0)
    }

    /// Turn toward facing the surface. Held upright during a mantle.
    pub(crate) fn smooth_climbing_rotation(&self, body: &CharacterBody, dt: f32) -> Quat {
        let current = body.rotation();
        if self.mantling || !self.surface.is_valid() {
            return current;
        }
        let Some(target) = rotation_facing(-self.surface.normal) else {
            return current;
        };
        let speed = self.config.climbing_rotation_speed * self.speed_factor(body);
        quat_interp_to(current, target, dt, speed)
    }

    /// Pull the body toward the stand-off distance from the surface anchor.
    pub(crate) fn snap_to_surface(&self, body: &mut CharacterBody, scene: &dyn SceneQuery, dt: f32) {
        if self.mantling || !self.surface.is_valid() {
            return;
        }
        let forward = body.forward();
        let to_anchor = (self.surface.anchor - body.location()).project_onto_normalized(forward);
        let offset = -self.surface.normal * (to_anchor.length() - self.config.climbing_distance_from_surface);
        let step = offset * self.config.climbing_snap_speed * self.speed_factor(body) * dt;
        let rotation = body.rotation();
        body.safe_move(scene, step, rotation);
    }
}
