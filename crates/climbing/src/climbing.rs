//! The climbing extension: intent, mode transitions and the stop conditions.

use crate::animation::AnimationPlayer;
use crate::config::ClimbingConfig;
use crate::dash::ClimbDashState;
use crate::debug::{draw_scan, scan_color, DebugColor, DebugDraw, ScanSnapshot};
use crate::locomotion::{CharacterBody, Locomotion, PhysOutcome, StepContext};
use crate::surface::{ClimbingSurface, SurfaceProbe, TraceSegment, WallHit, WallHitSet};
use engine_core::{CustomMode, MovementMode, WORLD_UP};
use glam::Vec3;
use physics::SceneQuery;

/// Normals whose dot with world up reaches this are treated as parallel to it.
const PARALLEL_NORMALS_COS: f32 = 0.999845;
/// Fraction of the max climbing acceleration input must exceed to steer a dash.
const DASH_INPUT_THRESHOLD: f32 = 0.1;
/// Fraction of the max climbing speed at which moving toward a floor below
/// counts as climbing down onto it.
const CLIMB_DOWN_SPEED_FRACTION: f32 = 1.0 / 3.0;

pub const CLIMBING: MovementMode = MovementMode::Custom(CustomMode::Climbing);

/// Wall climbing on top of the host walking/falling movement.
#[derive(Debug, Clone)]
pub struct ClimbingMovement {
    pub(crate) config: ClimbingConfig,
    pub(crate) wall_hits: WallHitSet,
    pub(crate) surface: ClimbingSurface,
    pub(crate) wants_to_climb: bool,
    pub(crate) mantling: bool,
    pub(crate) dash: ClimbDashState,
    /// Capsule half height before climbing shrank it.
    standing_half_height: Option<f32>,
}

impl ClimbingMovement {
    pub fn new(config: ClimbingConfig) -> Self {
        Self {
            config,
            wall_hits: Vec::new(),
            surface: ClimbingSurface::NONE,
            wants_to_climb: false,
            mantling: false,
            dash: ClimbDashState::default(),
            standing_half_height: None,
        }
    }

    pub fn config(&self) -> &ClimbingConfig {
        &self.config
    }

    /// Hits of the most recent wall scan.
    pub fn wall_hits(&self) -> &[WallHit] {
        &self.wall_hits
    }

    pub fn wants_to_climb(&self) -> bool {
        self.wants_to_climb
    }

    pub fn is_dashing(&self) -> bool {
        self.dash.is_active()
    }

    pub fn is_mantling(&self) -> bool {
        self.mantling
    }

    /// Normal of the last computed climbing surface, zero if there was none.
    pub fn surface_normal(&self) -> Vec3 {
        self.surface.normal
    }

    pub fn surface(&self) -> ClimbingSurface {
        self.surface
    }

    pub fn dash_direction(&self) -> Vec3 {
        self.dash.direction()
    }

    pub fn can_start_climbing(&self, body: &CharacterBody, scene: &dyn SceneQuery) -> bool {
        SurfaceProbe::new(scene, body, &self.config).can_start_climbing(&self.wall_hits)
    }

    /// Ask to climb. The request sticks only if the last scan found a
    /// climbable wall; the mode switch follows on the next movement update.
    pub fn want_climb(&mut self, body: &CharacterBody, scene: &dyn SceneQuery) {
        if !self.wants_to_climb {
            self.wants_to_climb = self.can_start_climbing(body, scene);
        }
    }

    /// Drop the climb request. Climbing ends on the next physics step.
    pub fn cancel_climb(&mut self) {
        self.wants_to_climb = false;
    }

    /// Start a dash along the surface, upward unless the input points elsewhere.
    pub fn try_climb_dash(&mut self, body: &CharacterBody) {
        let has_curve = self.config.dash_curve.as_ref().is_some_and(|curve| !curve.is_empty());
        if !body.mode().is_climbing() || self.dash.is_active() || !has_curve {
            return;
        }

        let threshold = DASH_INPUT_THRESHOLD * self.config.max_climbing_acceleration;
        let direction = if body.acceleration.length() > threshold {
            body.acceleration.normalize()
        } else {
            WORLD_UP
        };
        self.dash.start(direction);
        log::debug!("climb dash toward {:.2?}", direction);
    }

    /// Duration of the configured dash curve.
    pub(crate) fn dash_duration(&self) -> f32 {
        self.config
            .dash_curve
            .as_ref()
            .and_then(|curve| curve.time_range())
            .map_or(0.0, |(_, end)| end)
    }

    /// Whether a mantle montage is still moving the character.
    pub(crate) fn mantle_playing(&self, animation: &dyn AnimationPlayer) -> bool {
        self.mantling
            && self
                .config
                .mantle_clip
                .as_ref()
                .is_some_and(|clip| animation.is_playing(clip))
    }

    pub fn should_stop_climbing(
        &self,
        body: &CharacterBody,
        scene: &dyn SceneQuery,
        animation: &dyn AnimationPlayer,
        walkable_floor_z: f32,
    ) -> bool {
        if self.mantle_playing(animation) {
            return false;
        }
        let on_ceiling_or_floor = self.surface.normal.dot(WORLD_UP).abs() >= PARALLEL_NORMALS_COS;
        !self.wants_to_climb
            || !self.surface.is_valid()
            || on_ceiling_or_floor
            || self.should_climb_down_to_floor(body, scene, walkable_floor_z)
    }

    /// Leave the wall when it meets walkable floor: either the character is
    /// climbing down onto that floor at a real fraction of climbing speed, or
    /// the surface itself has flattened out.
    pub fn should_climb_down_to_floor(
        &self,
        body: &CharacterBody,
        scene: &dyn SceneQuery,
        walkable_floor_z: f32,
    ) -> bool {
        let probe = SurfaceProbe::new(scene, body, &self.config).floor_probe();
        let Some(floor) = probe.hit else {
            return false;
        };
        if floor.normal.y <= walkable_floor_z {
            return false;
        }

        let down_speed = body.velocity.dot(-floor.normal);
        let moving_to_floor = down_speed >= self.config.max_climbing_speed * CLIMB_DOWN_SPEED_FRACTION;
        let flat_surface = self.surface.normal.y
            > self.config.min_vertical_degrees_to_start_climbing.to_radians().cos();
        moving_to_floor || flat_surface
    }

    /// Release the wall and let falling take over the rest of the step.
    pub(crate) fn stop_climbing(&mut self, remaining: f32) -> PhysOutcome {
        self.wants_to_climb = false;
        PhysOutcome::SwitchMode {
            mode: MovementMode::Falling,
            remaining,
        }
    }

    fn enter_climbing(&mut self, body: &mut CharacterBody) {
        body.orient_rotation_to_movement = false;
        let standing = body.half_height();
        self.standing_half_height = Some(standing);
        body.set_half_height(standing - self.config.climbing_shrink_amount);
        self.dash.reset();
        self.mantling = false;
        log::debug!("started climbing, surface normal {:.2?}", self.surface.normal);
    }

    fn exit_climbing(&mut self, body: &mut CharacterBody) {
        body.orient_rotation_to_movement = true;
        body.make_upright();
        if let Some(standing) = self.standing_half_height.take() {
            body.set_half_height(standing);
        }
        body.stop_movement_immediately();
        self.wants_to_climb = false;
        self.mantling = false;
        self.dash.reset();
        log::debug!("stopped climbing at {:.2?}", body.location());
    }

    fn draw_debug(&self, body: &CharacterBody, ctx: &mut StepContext<'_>) {
        let probe = SurfaceProbe::new(ctx.scene, body, &self.config);
        let qualifies = probe.can_start_climbing(&self.wall_hits);
        let color = scan_color(
            !self.wall_hits.is_empty(),
            qualifies,
            body.mode().is_climbing(),
            self.dash.is_active(),
        );
        draw_scan(
            ctx.debug,
            &ScanSnapshot {
                sweep_start: probe.scan_start(),
                capsule: self.config.scan_capsule(),
                hits: &self.wall_hits,
                right: body.right(),
                color,
            },
        );

        for hit in &self.wall_hits {
            if let Some(eye) = probe.vertical_probe(hit) {
                draw_probe(ctx.debug, &eye, DebugColor::Yellow);
            }
        }
        if body.mode().is_climbing() {
            draw_probe(ctx.debug, &probe.floor_probe(), DebugColor::Blue);
        }
    }
}

fn draw_probe(debug: &mut dyn DebugDraw, probe: &TraceSegment, color: DebugColor) {
    let end = probe.hit.map_or(probe.end, |hit| hit.point);
    debug.line(probe.start, end, color);
}

impl Locomotion for ClimbingMovement {
    fn on_tick(&mut self, body: &CharacterBody, ctx: &mut StepContext<'_>, _dt: f32) {
        self.wall_hits = SurfaceProbe::new(ctx.scene, body, &self.config).scan();
        if self.config.debug_draw {
            self.draw_debug(body, ctx);
        }
    }

    fn on_movement_updated(&mut self, body: &CharacterBody, _dt: f32) -> Option<MovementMode> {
        (self.wants_to_climb && !body.mode().is_climbing()).then_some(CLIMBING)
    }

    fn on_mode_changed(&mut self, body: &mut CharacterBody, previous: MovementMode) {
        if body.mode().is_climbing() {
            self.enter_climbing(body);
        }
        if previous.is_climbing() {
            self.exit_climbing(body);
        }
    }

    fn max_speed(&self, body: &CharacterBody, default: f32) -> f32 {
        if body.mode().is_climbing() {
            self.config.max_climbing_speed
        } else {
            default
        }
    }

    fn max_acceleration(&self, body: &CharacterBody, default: f32) -> f32 {
        if body.mode().is_climbing() {
            self.config.max_climbing_acceleration
        } else {
            default
        }
    }

    fn phys_custom(
        &mut self,
        mode: CustomMode,
        body: &mut CharacterBody,
        ctx: &mut StepContext<'_>,
        dt: f32,
        _iterations: u32,
    ) -> PhysOutcome {
        match mode {
            CustomMode::Climbing => self.phys_climbing(body, ctx, dt),
        }
    }
}
