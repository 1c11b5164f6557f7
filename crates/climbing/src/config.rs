//! Climbing and host locomotion settings. Deserialized from RON.

use crate::animation::ClipId;
use crate::curve::FloatCurve;
use engine_core::CapsuleShape;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Problems found when loading or validating settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("shrinking the capsule by {shrink} would leave half height {remaining} below radius {radius}")]
    ShrinkTooLarge {
        shrink: f32,
        remaining: f32,
        radius: f32,
    },
    #[error("dash curve keys are not sorted by time")]
    UnsortedDashCurve,
}

/// Wall-climbing settings. Distances in meters, speeds in m/s, angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimbingConfig {
    /// Radius of the forward scan capsule.
    #[serde(default = "default_scan_capsule_radius")]
    pub scan_capsule_radius: f32,
    /// Half height of the forward scan capsule.
    #[serde(default = "default_scan_capsule_half_height")]
    pub scan_capsule_half_height: f32,
    /// How far in front of the character the scan starts.
    #[serde(default = "default_scan_forward_offset")]
    pub scan_forward_offset: f32,
    /// Length of the (deliberately tiny) scan sweep.
    #[serde(default = "default_scan_sweep_length")]
    pub scan_sweep_length: f32,
    /// Amount removed from the character capsule half height while climbing.
    #[serde(default = "default_climbing_shrink_amount")]
    pub climbing_shrink_amount: f32,
    #[serde(default = "default_min_horizontal_degrees")]
    pub min_horizontal_degrees_to_start_climbing: f32,
    /// Surfaces tilted less than this from horizontal count as floor for the
    /// climb-down bailout.
    #[serde(default = "default_min_vertical_degrees")]
    pub min_vertical_degrees_to_start_climbing: f32,
    #[serde(default = "default_max_climbing_speed")]
    pub max_climbing_speed: f32,
    #[serde(default = "default_max_climbing_acceleration")]
    pub max_climbing_acceleration: f32,
    #[serde(default = "default_braking_deceleration_climbing")]
    pub braking_deceleration_climbing: f32,
    #[serde(default = "default_climbing_rotation_speed")]
    pub climbing_rotation_speed: f32,
    #[serde(default = "default_climbing_snap_speed")]
    pub climbing_snap_speed: f32,
    /// Stand-off distance kept between the character center and the surface.
    #[serde(default = "default_climbing_distance_from_surface")]
    pub climbing_distance_from_surface: f32,
    /// Length of the downward floor probe, measured from the feet.
    #[serde(default = "default_floor_check_distance")]
    pub floor_check_distance: f32,
    /// Radius of the per-hit assist sweep used to average the surface.
    #[serde(default = "default_surface_assist_radius")]
    pub surface_assist_radius: f32,
    #[serde(default = "default_surface_assist_length")]
    pub surface_assist_length: f32,
    /// Landing spot offsets for the ledge mantle, relative to the character.
    #[serde(default = "default_ledge_forward_offset")]
    pub ledge_forward_offset: f32,
    #[serde(default = "default_ledge_up_offset")]
    pub ledge_up_offset: f32,
    #[serde(default = "default_ledge_floor_probe_distance")]
    pub ledge_floor_probe_distance: f32,
    /// Dash speed over time. No curve disables dashing.
    #[serde(default)]
    pub dash_curve: Option<FloatCurve>,
    /// Mantle montage. No clip disables ledge mantling.
    #[serde(default)]
    pub mantle_clip: Option<ClipId>,
    /// Draw scan/probe overlays through the debug drawer.
    #[serde(default)]
    pub debug_draw: bool,
}

fn default_scan_capsule_radius() -> f32 {
    0.5
}
fn default_scan_capsule_half_height() -> f32 {
    0.72
}
fn default_scan_forward_offset() -> f32 {
    0.2
}
fn default_scan_sweep_length() -> f32 {
    0.01
}
fn default_climbing_shrink_amount() -> f32 {
    0.3
}
fn default_min_horizontal_degrees() -> f32 {
    25.0
}
fn default_min_vertical_degrees() -> f32 {
    45.0
}
fn default_max_climbing_speed() -> f32 {
    1.2
}
fn default_max_climbing_acceleration() -> f32 {
    3.8
}
fn default_braking_deceleration_climbing() -> f32 {
    5.5
}
fn default_climbing_rotation_speed() -> f32 {
    6.0
}
fn default_climbing_snap_speed() -> f32 {
    4.0
}
fn default_climbing_distance_from_surface() -> f32 {
    0.45
}
fn default_floor_check_distance() -> f32 {
    0.75
}
fn default_surface_assist_radius() -> f32 {
    0.06
}
fn default_surface_assist_length() -> f32 {
    1.2
}
fn default_ledge_forward_offset() -> f32 {
    1.2
}
fn default_ledge_up_offset() -> f32 {
    1.6
}
fn default_ledge_floor_probe_distance() -> f32 {
    2.5
}

impl Default for ClimbingConfig {
    fn default() -> Self {
        Self {
            scan_capsule_radius: default_scan_capsule_radius(),
            scan_capsule_half_height: default_scan_capsule_half_height(),
            scan_forward_offset: default_scan_forward_offset(),
            scan_sweep_length: default_scan_sweep_length(),
            climbing_shrink_amount: default_climbing_shrink_amount(),
            min_horizontal_degrees_to_start_climbing: default_min_horizontal_degrees(),
            min_vertical_degrees_to_start_climbing: default_min_vertical_degrees(),
            max_climbing_speed: default_max_climbing_speed(),
            max_climbing_acceleration: default_max_climbing_acceleration(),
            braking_deceleration_climbing: default_braking_deceleration_climbing(),
            climbing_rotation_speed: default_climbing_rotation_speed(),
            climbing_snap_speed: default_climbing_snap_speed(),
            climbing_distance_from_surface: default_climbing_distance_from_surface(),
            floor_check_distance: default_floor_check_distance(),
            surface_assist_radius: default_surface_assist_radius(),
            surface_assist_length: default_surface_assist_length(),
            ledge_forward_offset: default_ledge_forward_offset(),
            ledge_up_offset: default_ledge_up_offset(),
            ledge_floor_probe_distance: default_ledge_floor_probe_distance(),
            dash_curve: None,
            mantle_clip: None,
            debug_draw: false,
        }
    }
}

impl ClimbingConfig {
    /// Parse a config from RON text and validate it against `capsule`.
    pub fn from_ron(text: &str, capsule: CapsuleShape) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(text)?;
        config.validate(capsule)?;
        Ok(config)
    }

    /// The capsule swept forward to look for walls.
    pub fn scan_capsule(&self) -> CapsuleShape {
        CapsuleShape::new(self.scan_capsule_radius, self.scan_capsule_half_height)
    }

    /// Reach of the eye-height probe before any steepness scaling.
    pub fn collision_edge(&self) -> f32 {
        self.scan_capsule_radius + self.scan_forward_offset
    }

    /// Check the settings against the character capsule they will drive.
    pub fn validate(&self, capsule: CapsuleShape) -> Result<(), ConfigError> {
        let positive = [
            ("scan_capsule_radius", self.scan_capsule_radius),
            ("scan_capsule_half_height", self.scan_capsule_half_height),
            ("scan_sweep_length", self.scan_sweep_length),
            ("max_climbing_speed", self.max_climbing_speed),
            ("max_climbing_acceleration", self.max_climbing_acceleration),
            ("climbing_rotation_speed", self.climbing_rotation_speed),
            ("floor_check_distance", self.floor_check_distance),
            ("surface_assist_radius", self.surface_assist_radius),
            ("surface_assist_length", self.surface_assist_length),
        ];
        if let Some(&(field, value)) = positive.iter().find(|(_, value)| *value <= 0.0) {
            return Err(ConfigError::NonPositive { field, value });
        }

        let remaining = capsule.half_height - self.climbing_shrink_amount;
        if self.climbing_shrink_amount < 0.0 || remaining < capsule.radius {
            return Err(ConfigError::ShrinkTooLarge {
                shrink: self.climbing_shrink_amount,
                remaining,
                radius: capsule.radius,
            });
        }

        if let Some(curve) = &self.dash_curve {
            if !curve.is_sorted() {
                return Err(ConfigError::UnsortedDashCurve);
            }
        }
        Ok(())
    }
}

/// Host locomotion settings: the character body and its walking/falling model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocomotionConfig {
    #[serde(default = "default_capsule_radius")]
    pub capsule_radius: f32,
    #[serde(default = "default_capsule_half_height")]
    pub capsule_half_height: f32,
    /// Eye height above the capsule center.
    #[serde(default = "default_eye_height")]
    pub eye_height: f32,
    #[serde(default = "default_max_walk_speed")]
    pub max_walk_speed: f32,
    #[serde(default = "default_max_acceleration")]
    pub max_acceleration: f32,
    #[serde(default = "default_braking_deceleration_walking")]
    pub braking_deceleration_walking: f32,
    #[serde(default)]
    pub braking_deceleration_falling: f32,
    #[serde(default = "default_ground_friction")]
    pub ground_friction: f32,
    /// Multiplier applied to friction while braking.
    #[serde(default = "default_braking_friction_factor")]
    pub braking_friction_factor: f32,
    #[serde(default = "default_air_control")]
    pub air_control: f32,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    /// Minimum up component of a surface normal to stand on it.
    #[serde(default = "default_walkable_floor_z")]
    pub walkable_floor_z: f32,
    /// Yaw interpolation speed when orienting rotation to movement.
    #[serde(default = "default_orient_rotation_speed")]
    pub orient_rotation_speed: f32,
    /// How far below the feet the walking floor probe reaches.
    #[serde(default = "default_max_step_height")]
    pub max_step_height: f32,
    #[serde(default = "default_max_simulation_iterations")]
    pub max_simulation_iterations: u32,
}

fn default_capsule_radius() -> f32 {
    0.42
}
fn default_capsule_half_height() -> f32 {
    0.96
}
fn default_eye_height() -> f32 {
    0.64
}
fn default_max_walk_speed() -> f32 {
    5.0
}
fn default_max_acceleration() -> f32 {
    20.48
}
fn default_braking_deceleration_walking() -> f32 {
    20.48
}
fn default_ground_friction() -> f32 {
    8.0
}
fn default_braking_friction_factor() -> f32 {
    2.0
}
fn default_air_control() -> f32 {
    0.35
}
fn default_gravity() -> f32 {
    9.81
}
fn default_walkable_floor_z() -> f32 {
    0.71
}
fn default_orient_rotation_speed() -> f32 {
    10.0
}
fn default_max_step_height() -> f32 {
    0.3
}
fn default_max_simulation_iterations() -> u32 {
    8
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            capsule_radius: default_capsule_radius(),
            capsule_half_height: default_capsule_half_height(),
            eye_height: default_eye_height(),
            max_walk_speed: default_max_walk_speed(),
            max_acceleration: default_max_acceleration(),
            braking_deceleration_walking: default_braking_deceleration_walking(),
            braking_deceleration_falling: 0.0,
            ground_friction: default_ground_friction(),
            braking_friction_factor: default_braking_friction_factor(),
            air_control: default_air_control(),
            gravity: default_gravity(),
            walkable_floor_z: default_walkable_floor_z(),
            orient_rotation_speed: default_orient_rotation_speed(),
            max_step_height: default_max_step_height(),
            max_simulation_iterations: default_max_simulation_iterations(),
        }
    }
}

impl LocomotionConfig {
    pub fn capsule(&self) -> CapsuleShape {
        CapsuleShape::new(self.capsule_radius, self.capsule_half_height)
    }
}
