//! Player-facing climbing character: commands in, climbing state out.

use crate::animation::AnimationPlayer;
use crate::climbing::ClimbingMovement;
use crate::config::{ClimbingConfig, LocomotionConfig};
use crate::debug::DebugDraw;
use crate::locomotion::{CharacterBody, CharacterMovement};
use engine_core::{MovementMode, Transform};
use glam::{Quat, Vec3};
use physics::{ColliderHandle, SceneQuery};

/// A character whose movement can climb walls.
#[derive(Debug, Clone)]
pub struct ClimbingCharacter {
    movement: CharacterMovement<ClimbingMovement>,
    /// Camera heading used to map input while not climbing, in radians.
    control_yaw: f32,
}

impl ClimbingCharacter {
    pub fn new(transform: Transform, locomotion: LocomotionConfig, climbing: ClimbingConfig) -> Self {
        let control_yaw = transform.yaw();
        let body = CharacterBody::new(transform, &locomotion);
        Self {
            movement: CharacterMovement::new(body, ClimbingMovement::new(climbing), locomotion),
            control_yaw,
        }
    }

    pub fn movement(&self) -> &CharacterMovement<ClimbingMovement> {
        &self.movement
    }

    pub fn body(&self) -> &CharacterBody {
        &self.movement.body
    }

    pub fn body_mut(&mut self) -> &mut CharacterBody {
        &mut self.movement.body
    }

    pub fn set_collider(&mut self, collider: ColliderHandle) {
        self.movement.body.collider = Some(collider);
    }

    pub fn control_yaw(&self) -> f32 {
        self.control_yaw
    }

    pub fn set_control_yaw(&mut self, yaw: f32) {
        self.control_yaw = yaw;
    }

    pub fn request_climb(&mut self, scene: &dyn SceneQuery) {
        self.movement.extension.want_climb(&self.movement.body, scene);
    }

    pub fn request_cancel_climb(&mut self) {
        self.movement.extension.cancel_climb();
    }

    pub fn request_dash(&mut self) {
        self.movement.extension.try_climb_dash(&self.movement.body);
    }

    /// Feed a 2D move input. While climbing, `forward` runs up the surface and
    /// `right` across it; otherwise both follow the control heading.
    pub fn supply_move_vector(&mut self, forward: f32, right: f32) {
        let body = &mut self.movement.body;
        let (forward_axis, right_axis) = if body.mode().is_climbing() {
            let normal = self.movement.extension.surface_normal();
            (normal.cross(body.right()), body.up().cross(normal))
        } else {
            let yaw = Quat::from_rotation_y(self.control_yaw);
            (yaw * -Vec3::Z, yaw * Vec3::X)
        };
        body.add_movement_input(forward_axis, forward);
        body.add_movement_input(right_axis, right);
    }

    pub fn mode(&self) -> MovementMode {
        self.movement.mode()
    }

    pub fn is_climbing(&self) -> bool {
        self.mode().is_climbing()
    }

    pub fn is_dashing(&self) -> bool {
        self.movement.extension.is_dashing()
    }

    pub fn is_mantling(&self) -> bool {
        self.movement.extension.is_mantling()
    }

    pub fn surface_normal(&self) -> Vec3 {
        self.movement.extension.surface_normal()
    }

    pub fn dash_direction(&self) -> Vec3 {
        self.movement.extension.dash_direction()
    }

    pub fn tick(
        &mut self,
        dt: f32,
        scene: &dyn SceneQuery,
        animation: &mut dyn AnimationPlayer,
        debug: &mut dyn DebugDraw,
    ) {
        self.movement.tick(dt, scene, animation, debug);
    }
}
