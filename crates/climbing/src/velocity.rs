//! Acceleration, friction and braking model shared by every movement mode.

use crate::locomotion::MIN_TICK_TIME;
use glam::Vec3;

/// Longest sub-step used when integrating braking with friction.
pub const BRAKING_SUB_STEP_TIME: f32 = 1.0 / 33.0;
/// Below this speed a braking body comes to a full stop.
pub const BRAKE_TO_STOP_SPEED: f32 = 0.1;
/// Squared speed treated as no movement at all.
const STOP_SPEED_SQUARED: f32 = 1e-4;
/// Tolerance before a velocity counts as exceeding the max speed.
const OVER_SPEED_FACTOR: f32 = 1.01;

/// Per-mode inputs of [`calc_velocity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VelocityParams {
    pub max_speed: f32,
    /// Friction applied while accelerating; also the base for braking friction.
    pub friction: f32,
    pub braking_deceleration: f32,
    /// Multiplier applied to `friction` while braking.
    pub braking_friction_factor: f32,
}

fn exceeds_max_speed(velocity: Vec3, max_speed: f32) -> bool {
    velocity.length_squared() > max_speed * max_speed * OVER_SPEED_FACTOR
}

/// Advance `velocity` by one step of input `acceleration`.
///
/// Without input, or above `max_speed`, the body brakes. With input, friction
/// bends the velocity toward the input direction before the acceleration is
/// added and the result clamped.
pub fn calc_velocity(velocity: Vec3, acceleration: Vec3, dt: f32, params: &VelocityParams) -> Vec3 {
    if dt < MIN_TICK_TIME {
        return velocity;
    }

    let friction = params.friction.max(0.0);
    let zero_acceleration = acceleration.length_squared() < 1e-8;
    let over_max = exceeds_max_speed(velocity, params.max_speed);
    let mut velocity = velocity;

    if zero_acceleration || over_max {
        let old = velocity;
        let braking_friction = friction * params.braking_friction_factor.max(0.0);
        velocity = apply_braking(velocity, dt, braking_friction, params.braking_deceleration);

        // Braking should not pull a body below max speed while it is still pushing forward.
        if over_max
            && velocity.length_squared() < params.max_speed * params.max_speed
            && acceleration.dot(old) > 0.0
        {
            velocity = old.normalize_or_zero() * params.max_speed;
        }
    } else {
        let direction = acceleration.normalize_or_zero();
        let speed = velocity.length();
        velocity -= (velocity - direction * speed) * (dt * friction).min(1.0);
    }

    if !zero_acceleration {
        let limit = if exceeds_max_speed(velocity, params.max_speed) {
            velocity.length()
        } else {
            params.max_speed
        };
        velocity = (velocity + acceleration * dt).clamp_length_max(limit);
    }

    velocity
}

/// Slow `velocity` down by friction and a constant deceleration, sub-stepped
/// so it never reverses direction.
pub fn apply_braking(velocity: Vec3, dt: f32, friction: f32, braking_deceleration: f32) -> Vec3 {
    if velocity == Vec3::ZERO || dt < MIN_TICK_TIME {
        return velocity;
    }

    let friction = friction.max(0.0);
    let braking_deceleration = braking_deceleration.max(0.0);
    let zero_friction = friction == 0.0;
    let zero_braking = braking_deceleration == 0.0;
    if zero_friction && zero_braking {
        return velocity;
    }

    let old = velocity;
    let reverse_acceleration = if zero_braking {
        Vec3::ZERO
    } else {
        -braking_deceleration * velocity.normalize_or_zero()
    };

    let mut velocity = velocity;
    let mut remaining = dt;
    while remaining >= MIN_TICK_TIME {
        let step = if remaining > BRAKING_SUB_STEP_TIME && !zero_friction {
            BRAKING_SUB_STEP_TIME.min(remaining * 0.5)
        } else {
            remaining
        };
        remaining -= step;

        velocity += (-friction * velocity + reverse_acceleration) * step;
        if velocity.dot(old) <= 0.0 {
            return Vec3::ZERO;
        }
    }

    let speed_squared = velocity.length_squared();
    if speed_squared <= STOP_SPEED_SQUARED
        || (!zero_braking && speed_squared <= BRAKE_TO_STOP_SPEED * BRAKE_TO_STOP_SPEED)
    {
        return Vec3::ZERO;
    }
    velocity
}
