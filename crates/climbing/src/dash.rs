//! Short burst of speed along the climbing surface.

use crate::curve::FloatCurve;
use glam::Vec3;

/// Progress of the current climb dash.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimbDashState {
    direction: Vec3,
    elapsed: f32,
    active: bool,
}

impl ClimbDashState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn start(&mut self, direction: Vec3) {
        self.direction = direction.normalize_or_zero();
        self.elapsed = 0.0;
        self.active = true;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.active = false;
    }

    /// Keep the direction on the surface plane. A degenerate projection keeps
    /// the previous direction.
    pub fn align_to_surface(&mut self, surface_horizontal_normal: Vec3) {
        if !self.active {
            return;
        }
        let projected = self.direction.reject_from_normalized(surface_horizontal_normal);
        if let Some(direction) = projected.try_normalize() {
            self.direction = direction;
        }
    }

    /// Advance the clock after the current step sampled the curve, ending the
    /// dash once `duration` has passed.
    pub fn advance(&mut self, dt: f32, duration: f32) {
        if !self.active {
            return;
        }
        self.elapsed += dt;
        if self.elapsed >= duration {
            self.reset();
        }
    }

    /// Dash velocity at the current point of `curve`.
    pub fn velocity(&self, curve: &FloatCurve) -> Vec3 {
        self.direction * curve.value_at(self.elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_at_duration_for_any_step_size() {
        for dt in [0.01, 0.15, 0.4, 1.0] {
            let mut dash = ClimbDashState::default();
            dash.start(Vec3::Y);
            let mut time = 0.0;
            while dash.is_active() {
                dash.advance(dt, 0.4);
                time += dt;
                assert!(time < 0.4 + dt + 1e-4, "dash outlived its curve with dt {dt}");
            }
            assert_eq!(dash.elapsed(), 0.0);
            assert!(time >= 0.4 - 1e-4);
        }
    }

    #[test]
    fn direction_is_kept_on_the_surface_plane() {
        let mut dash = ClimbDashState::default();
        dash.start(Vec3::new(1.0, 1.0, 0.0));
        dash.align_to_surface(-Vec3::X);
        assert!(dash.direction().abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn degenerate_projection_keeps_direction() {
        let mut dash = ClimbDashState::default();
        dash.start(Vec3::X);
        dash.align_to_surface(-Vec3::X);
        assert!(dash.direction().abs_diff_eq(Vec3::X, 1e-5));
    }

    #[test]
    fn velocity_follows_curve() {
        let curve = FloatCurve::from_points(&[(0.0, 0.0), (0.2, 4.0), (0.4, 0.0)]);
        let mut dash = ClimbDashState::default();
        dash.start(Vec3::Y);
        dash.advance(0.2, 0.4);
        assert!(dash.velocity(&curve).abs_diff_eq(Vec3::Y * 4.0, 1e-4));
    }

    #[test]
    fn first_step_uses_the_start_of_the_curve() {
        let curve = FloatCurve::from_points(&[(0.0, 6.0), (0.1, 1.0), (0.3, 0.0)]);
        let mut dash = ClimbDashState::default();
        dash.start(Vec3::Y);
        assert!(dash.velocity(&curve).abs_diff_eq(Vec3::Y * 6.0, 1e-5));
        dash.advance(0.1, 0.3);
        assert!(dash.velocity(&curve).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn inactive_dash_ignores_the_surface() {
        let mut dash = ClimbDashState::default();
        dash.align_to_surface(-Vec3::X);
        dash.advance(0.1, 0.3);
        assert_eq!(dash, ClimbDashState::default());
    }
}
