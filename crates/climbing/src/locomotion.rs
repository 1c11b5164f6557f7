//! Host character movement: the body, its walking/falling physics and the
//! [`Locomotion`] hooks that let an extension add custom movement modes.

use crate::animation::AnimationPlayer;
use crate::config::LocomotionConfig;
use crate::debug::DebugDraw;
use crate::velocity::{calc_velocity, VelocityParams};
use engine_core::{quat_interp_to, rotation_facing, CapsuleShape, CustomMode, MovementMode, Transform};
use glam::{Quat, Vec3};
use physics::{ColliderHandle, SceneQuery, SweepHit};

/// Steps shorter than this are not simulated.
pub const MIN_TICK_TIME: f32 = 1e-6;

/// Distance kept between a swept body and whatever stopped it.
const MOVE_SKIN: f32 = 0.001;
/// Height the walking body floats above its floor.
const FLOOR_GAP: f32 = 0.02;

/// The simulated character: where it is, how it moves and what it collides as.
#[derive(Debug, Clone)]
pub struct CharacterBody {
    pub transform: Transform,
    pub velocity: Vec3,
    /// Input acceleration for the current tick.
    pub acceleration: Vec3,
    /// Eye height above the capsule center.
    pub eye_height: f32,
    /// Yaw toward the acceleration direction while walking or falling.
    pub orient_rotation_to_movement: bool,
    /// The character's own collider, skipped by every scene query.
    pub collider: Option<ColliderHandle>,
    mode: MovementMode,
    capsule: CapsuleShape,
    pending_input: Vec3,
}

impl CharacterBody {
    pub fn new(transform: Transform, config: &LocomotionConfig) -> Self {
        Self {
            transform,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            eye_height: config.eye_height,
            orient_rotation_to_movement: true,
            collider: None,
            mode: MovementMode::default(),
            capsule: config.capsule(),
            pending_input: Vec3::ZERO,
        }
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn location(&self) -> Vec3 {
        self.transform.position
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    pub fn forward(&self) -> Vec3 {
        self.transform.forward()
    }

    pub fn right(&self) -> Vec3 {
        self.transform.right()
    }

    pub fn up(&self) -> Vec3 {
        self.transform.up()
    }

    pub fn capsule(&self) -> CapsuleShape {
        self.capsule
    }

    pub fn half_height(&self) -> f32 {
        self.capsule.half_height
    }

    pub fn set_half_height(&mut self, half_height: f32) {
        self.capsule = CapsuleShape::new(self.capsule.radius, half_height);
    }

    /// Bottom of the capsule along the body's up axis.
    pub fn feet_location(&self) -> Vec3 {
        self.location() - self.up() * self.capsule.half_height
    }

    pub fn eye_location(&self) -> Vec3 {
        self.location() + self.up() * self.eye_height
    }

    /// Queue movement input for the next tick.
    pub fn add_movement_input(&mut self, direction: Vec3, scale: f32) {
        self.pending_input += direction * scale;
    }

    pub fn pending_input(&self) -> Vec3 {
        self.pending_input
    }

    /// Take the queued input, leaving none behind.
    pub fn consume_input_vector(&mut self) -> Vec3 {
        std::mem::take(&mut self.pending_input)
    }

    pub fn stop_movement_immediately(&mut self) {
        self.velocity = Vec3::ZERO;
        self.acceleration = Vec3::ZERO;
    }

    /// Drop pitch and roll, keeping the heading.
    pub fn make_upright(&mut self) {
        self.transform.make_upright();
    }

    /// Rotate to `rotation` and sweep the capsule along `delta`, stopping just
    /// short of the first blocking hit.
    pub fn safe_move(&mut self, scene: &dyn SceneQuery, delta: Vec3, rotation: Quat) -> Option<SweepHit> {
        self.transform.rotation = rotation;
        let length = delta.length();
        if length < 1e-6 {
            return None;
        }

        let start = self.location();
        let Some(hit) = scene.sweep_capsule(start, start + delta, rotation, self.capsule, self.collider) else {
            self.transform.translate(delta);
            return None;
        };

        let travel = (hit.distance - MOVE_SKIN).max(0.0);
        self.transform.translate(delta / length * travel);
        Some(hit)
    }

    /// Spend what is left of `delta` after `hit` moving along the hit surface.
    pub fn slide_along_surface(&mut self, scene: &dyn SceneQuery, delta: Vec3, hit: &SweepHit) {
        let remaining = delta * (1.0 - hit.fraction);
        let slide = remaining - hit.normal * remaining.dot(hit.normal);
        if slide.length_squared() > 1e-10 {
            let rotation = self.rotation();
            self.safe_move(scene, slide, rotation);
        }
    }
}

/// Collaborators and shared settings for one movement tick.
pub struct StepContext<'a> {
    pub scene: &'a dyn SceneQuery,
    pub animation: &'a mut dyn AnimationPlayer,
    pub debug: &'a mut dyn DebugDraw,
    /// Minimum up component of a normal the body can stand on.
    pub walkable_floor_z: f32,
}

/// What a physics step asks the host to do next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysOutcome {
    Done,
    /// Switch to `mode` and simulate the `remaining` time in it.
    SwitchMode { mode: MovementMode, remaining: f32 },
}

/// Extension points of [`CharacterMovement`]. Every hook defaults to the host
/// behavior.
pub trait Locomotion {
    /// Called at the start of every tick, before input is turned into acceleration.
    fn on_tick(&mut self, _body: &CharacterBody, _ctx: &mut StepContext<'_>, _dt: f32) {}

    /// Called after the physics update; may request a mode change.
    fn on_movement_updated(&mut self, _body: &CharacterBody, _dt: f32) -> Option<MovementMode> {
        None
    }

    /// Called after the body's mode changed away from `previous`.
    fn on_mode_changed(&mut self, _body: &mut CharacterBody, _previous: MovementMode) {}

    fn max_speed(&self, _body: &CharacterBody, default: f32) -> f32 {
        default
    }

    fn max_acceleration(&self, _body: &CharacterBody, default: f32) -> f32 {
        default
    }

    /// Physics for [`MovementMode::Custom`] modes.
    fn phys_custom(
        &mut self,
        _mode: CustomMode,
        _body: &mut CharacterBody,
        _ctx: &mut StepContext<'_>,
        _dt: f32,
        _iterations: u32,
    ) -> PhysOutcome {
        PhysOutcome::Done
    }
}

/// Walking and falling only.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicLocomotion;

impl Locomotion for BasicLocomotion {}

/// The host movement component driving a [`CharacterBody`].
#[derive(Debug, Clone)]
pub struct CharacterMovement<L: Locomotion> {
    pub body: CharacterBody,
    pub extension: L,
    config: LocomotionConfig,
}

impl<L: Locomotion> CharacterMovement<L> {
    pub fn new(body: CharacterBody, extension: L, config: LocomotionConfig) -> Self {
        Self {
            body,
            extension,
            config,
        }
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn mode(&self) -> MovementMode {
        self.body.mode
    }

    /// Change mode, notifying the extension. Setting the current mode is a no-op.
    pub fn set_movement_mode(&mut self, mode: MovementMode) {
        let previous = self.body.mode;
        if previous == mode {
            return;
        }
        self.body.mode = mode;
        if mode == MovementMode::Walking {
            self.body.velocity.y = 0.0;
        }
        log::debug!("movement mode {} -> {}", previous.name(), mode.name());
        self.extension.on_mode_changed(&mut self.body, previous);
    }

    pub fn max_speed(&self) -> f32 {
        let default = match self.body.mode {
            MovementMode::Walking | MovementMode::Falling => self.config.max_walk_speed,
            MovementMode::Custom(_) => 0.0,
        };
        self.extension.max_speed(&self.body, default)
    }

    pub fn max_acceleration(&self) -> f32 {
        self.extension.max_acceleration(&self.body, self.config.max_acceleration)
    }

    /// Advance the character by `dt` seconds.
    pub fn tick(
        &mut self,
        dt: f32,
        scene: &dyn SceneQuery,
        animation: &mut dyn AnimationPlayer,
        debug: &mut dyn DebugDraw,
    ) {
        let mut ctx = StepContext {
            scene,
            animation,
            debug,
            walkable_floor_z: self.config.walkable_floor_z,
        };
        self.extension.on_tick(&self.body, &mut ctx, dt);

        let input = self.body.consume_input_vector().clamp_length_max(1.0);
        self.body.acceleration = input * self.max_acceleration();

        if dt < MIN_TICK_TIME {
            return;
        }

        self.start_new_physics(dt, 0, &mut ctx);

        if let Some(mode) = self.extension.on_movement_updated(&self.body, dt) {
            self.set_movement_mode(mode);
        }
    }

    /// Run the physics of the current mode, following mode switches until the
    /// time or the iteration budget is spent.
    pub fn start_new_physics(&mut self, dt: f32, iterations: u32, ctx: &mut StepContext<'_>) {
        if dt < MIN_TICK_TIME || iterations >= self.config.max_simulation_iterations {
            return;
        }

        let outcome = match self.body.mode {
            MovementMode::Walking => self.phys_walking(dt, ctx),
            MovementMode::Falling => self.phys_falling(dt, ctx),
            MovementMode::Custom(mode) => {
                self.extension
                    .phys_custom(mode, &mut self.body, ctx, dt, iterations)
            }
        };

        if let PhysOutcome::SwitchMode { mode, remaining } = outcome {
            self.set_movement_mode(mode);
            self.start_new_physics(remaining, iterations + 1, ctx);
        }
    }

    fn find_floor(&self, scene: &dyn SceneQuery, walkable_floor_z: f32) -> Option<SweepHit> {
        let start = self.body.location();
        let end = start - Vec3::Y * (self.body.half_height() + self.config.max_step_height);
        scene
            .line_trace(start, end, self.body.collider)
            .filter(|hit| hit.normal.y >= walkable_floor_z)
    }

    /// Yaw toward the acceleration when orient-to-movement is on.
    fn movement_rotation(&self, dt: f32) -> Quat {
        let current = self.body.rotation();
        if !self.body.orient_rotation_to_movement {
            return current;
        }
        let heading = Vec3::new(self.body.acceleration.x, 0.0, self.body.acceleration.z);
        match rotation_facing(heading) {
            Some(target) if heading.length_squared() > 1e-6 => {
                quat_interp_to(current, target, dt, self.config.orient_rotation_speed)
            }
            _ => current,
        }
    }

    fn phys_walking(&mut self, dt: f32, ctx: &mut StepContext<'_>) -> PhysOutcome {
        if self.find_floor(ctx.scene, ctx.walkable_floor_z).is_none() {
            return PhysOutcome::SwitchMode {
                mode: MovementMode::Falling,
                remaining: dt,
            };
        }

        self.body.velocity.y = 0.0;
        self.body.acceleration.y = 0.0;
        let params = VelocityParams {
            max_speed: self.max_speed(),
            friction: self.config.ground_friction,
            braking_deceleration: self.config.braking_deceleration_walking,
            braking_friction_factor: self.config.braking_friction_factor,
        };
        self.body.velocity = calc_velocity(self.body.velocity, self.body.acceleration, dt, &params);

        let delta = self.body.velocity * dt;
        let rotation = self.movement_rotation(dt);
        if let Some(hit) = self.body.safe_move(ctx.scene, delta, rotation) {
            self.body.slide_along_surface(ctx.scene, delta, &hit);
        }

        match self.find_floor(ctx.scene, ctx.walkable_floor_z) {
            Some(floor) => {
                self.body.transform.position.y = floor.point.y + self.body.half_height() + FLOOR_GAP;
                PhysOutcome::Done
            }
            None => PhysOutcome::SwitchMode {
                mode: MovementMode::Falling,
                remaining: 0.0,
            },
        }
    }

    fn phys_falling(&mut self, dt: f32, ctx: &mut StepContext<'_>) -> PhysOutcome {
        let horizontal_acceleration =
            Vec3::new(self.body.acceleration.x, 0.0, self.body.acceleration.z) * self.config.air_control;
        let params = VelocityParams {
            max_speed: self.max_speed(),
            friction: 0.0,
            braking_deceleration: self.config.braking_deceleration_falling,
            braking_friction_factor: self.config.braking_friction_factor,
        };
        let horizontal = Vec3::new(self.body.velocity.x, 0.0, self.body.velocity.z);
        let horizontal = calc_velocity(horizontal, horizontal_acceleration, dt, &params);
        let vertical = self.body.velocity.y - self.config.gravity * dt;
        self.body.velocity = Vec3::new(horizontal.x, vertical, horizontal.z);

        let delta = self.body.velocity * dt;
        let rotation = self.movement_rotation(dt);
        let Some(hit) = self.body.safe_move(ctx.scene, delta, rotation) else {
            return PhysOutcome::Done;
        };

        if hit.normal.y >= ctx.walkable_floor_z {
            self.body.velocity.y = 0.0;
            return PhysOutcome::SwitchMode {
                mode: MovementMode::Walking,
                remaining: dt * (1.0 - hit.fraction),
            };
        }

        self.body.slide_along_surface(ctx.scene, delta, &hit);
        PhysOutcome::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::NoAnimation;
    use crate::debug::NoDebugDraw;
    use crate::test_support::BoxScene;

    const DT: f32 = 1.0 / 60.0;

    fn movement_at(position: Vec3) -> CharacterMovement<BasicLocomotion> {
        let config = LocomotionConfig::default();
        let body = CharacterBody::new(Transform::facing(position, Vec3::X), &config);
        CharacterMovement::new(body, BasicLocomotion, config)
    }

    fn run(movement: &mut CharacterMovement<impl Locomotion>, scene: &BoxScene, steps: usize) {
        for _ in 0..steps {
            movement.tick(DT, scene, &mut NoAnimation, &mut NoDebugDraw);
        }
    }

    #[derive(Default)]
    struct CountingLocomotion {
        changes: Vec<MovementMode>,
    }

    impl Locomotion for CountingLocomotion {
        fn on_mode_changed(&mut self, _body: &mut CharacterBody, previous: MovementMode) {
            self.changes.push(previous);
        }
    }

    #[test]
    fn walking_without_floor_starts_falling() {
        let scene = BoxScene::new();
        let mut movement = movement_at(Vec3::new(0.0, 5.0, 0.0));
        run(&mut movement, &scene, 1);
        assert_eq!(movement.mode(), MovementMode::Falling);
        assert!(movement.body.location().y < 5.0);
    }

    #[test]
    fn falling_body_lands_and_walks() {
        let scene = BoxScene::ground_only();
        let mut movement = movement_at(Vec3::new(0.0, 3.0, 0.0));
        movement.set_movement_mode(MovementMode::Falling);
        run(&mut movement, &scene, 120);
        assert_eq!(movement.mode(), MovementMode::Walking);
        let expected = movement.body.half_height() + FLOOR_GAP;
        assert!((movement.body.location().y - expected).abs() < 1e-3);
        assert_eq!(movement.body.velocity.y, 0.0);
    }

    #[test]
    fn walking_accelerates_to_max_speed() {
        let scene = BoxScene::ground_only();
        let mut movement = movement_at(Vec3::new(0.0, 0.98, 0.0));
        for _ in 0..120 {
            movement.body.add_movement_input(Vec3::X, 1.0);
            run(&mut movement, &scene, 1);
        }
        assert_eq!(movement.mode(), MovementMode::Walking);
        assert!((movement.body.velocity.length() - 5.0).abs() < 1e-3);
        assert!(movement.body.location().x > 5.0);
    }

    #[test]
    fn walking_into_wall_stops_at_the_face() {
        let scene = BoxScene::wall_world();
        let mut movement = movement_at(Vec3::new(0.0, 0.98, 0.0));
        for _ in 0..60 {
            movement.body.add_movement_input(Vec3::X, 1.0);
            run(&mut movement, &scene, 1);
        }
        let radius = movement.body.capsule().radius;
        assert!(movement.body.location().x <= 1.0 - radius);
        assert!(movement.body.location().x > 1.0 - radius - 0.05);
    }

    #[test]
    fn mode_hook_fires_only_on_change() {
        let config = LocomotionConfig::default();
        let body = CharacterBody::new(Transform::default(), &config);
        let mut movement = CharacterMovement::new(body, CountingLocomotion::default(), config);
        movement.set_movement_mode(MovementMode::Walking);
        movement.set_movement_mode(MovementMode::Falling);
        movement.set_movement_mode(MovementMode::Falling);
        assert_eq!(movement.extension.changes, vec![MovementMode::Walking]);
    }

    #[test]
    fn tiny_tick_skips_physics_but_consumes_input() {
        let scene = BoxScene::new();
        let mut movement = movement_at(Vec3::new(0.0, 5.0, 0.0));
        movement.body.add_movement_input(Vec3::X, 1.0);
        movement.tick(1e-7, &scene, &mut NoAnimation, &mut NoDebugDraw);
        assert_eq!(movement.mode(), MovementMode::Walking);
        assert_eq!(movement.body.location(), Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(movement.body.pending_input(), Vec3::ZERO);
        assert!((movement.body.acceleration.length() - movement.config().max_acceleration).abs() < 1e-4);
    }

    #[test]
    fn safe_move_stops_short_of_the_hit() {
        let scene = BoxScene::wall_world();
        let config = LocomotionConfig::default();
        let mut body = CharacterBody::new(Transform::facing(Vec3::new(0.0, 1.0, 0.0), Vec3::X), &config);
        let rotation = body.rotation();
        let hit = body.safe_move(&scene, Vec3::X * 2.0, rotation).expect("wall blocks the move");
        assert!(hit.normal.x < -0.99);
        assert!(body.location().x < 1.0 - config.capsule_radius);
        assert!(body.location().x > 1.0 - config.capsule_radius - 0.01);
    }
}
