//! Character components shared by physics and locomotion.

/// Upright capsule dimensions.
///
/// `half_height` is measured from the center to the tip of a hemisphere, so it
/// is never smaller than `radius`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleShape {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleShape {
    pub fn new(radius: f32, half_height: f32) -> Self {
        Self {
            radius,
            half_height: half_height.max(radius),
        }
    }

    /// Half length of the inner segment (the part between the hemisphere centers).
    pub fn segment_half_height(&self) -> f32 {
        (self.half_height - self.radius).max(0.0)
    }
}

/// Sub-modes that a locomotion extension can run inside `MovementMode::Custom`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CustomMode {
    Climbing,
}

/// Locomotion mode of a character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MovementMode {
    #[default]
    Walking,
    Falling,
    Custom(CustomMode),
}

impl MovementMode {
    pub fn is_climbing(&self) -> bool {
        matches!(self, MovementMode::Custom(CustomMode::Climbing))
    }

    pub fn name(&self) -> &'static str {
        match self {
            MovementMode::Walking => "Walking",
            MovementMode::Falling => "Falling",
            MovementMode::Custom(CustomMode::Climbing) => "Climbing",
        }
    }
}
