//! Debug overlays for the wall scan and the climbing probes.
//!
//! Drawing never feeds back into the simulation; the climbing component only
//! calls into a [`DebugDraw`] when `ClimbingConfig::debug_draw` is set.

use crate::surface::{horizontal_normal, WallHit};
use engine_core::CapsuleShape;
use glam::Vec3;

const HIT_MARKER_RADIUS: f32 = 0.05;
const NORMAL_LINE_LENGTH: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugColor {
    White,
    Red,
    Yellow,
    Green,
    Magenta,
    Blue,
    Cyan,
}

/// Immediate-mode debug drawing supplied by the host.
pub trait DebugDraw {
    fn capsule(&mut self, center: Vec3, capsule: CapsuleShape, color: DebugColor);
    fn sphere(&mut self, center: Vec3, radius: f32, color: DebugColor);
    fn line(&mut self, start: Vec3, end: Vec3, color: DebugColor);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDebugDraw;

impl DebugDraw for NoDebugDraw {
    fn capsule(&mut self, _center: Vec3, _capsule: CapsuleShape, _color: DebugColor) {}
    fn sphere(&mut self, _center: Vec3, _radius: f32, _color: DebugColor) {}
    fn line(&mut self, _start: Vec3, _end: Vec3, _color: DebugColor) {}
}

/// Writes every primitive to the `trace` log level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDebugDraw;

impl DebugDraw for LogDebugDraw {
    fn capsule(&mut self, center: Vec3, capsule: CapsuleShape, color: DebugColor) {
        log::trace!(
            "debug capsule {:?} at {:.2?} (r {:.2}, hh {:.2})",
            color,
            center,
            capsule.radius,
            capsule.half_height
        );
    }

    fn sphere(&mut self, center: Vec3, radius: f32, color: DebugColor) {
        log::trace!("debug sphere {:?} at {:.2?} (r {:.2})", color, center, radius);
    }

    fn line(&mut self, start: Vec3, end: Vec3, color: DebugColor) {
        log::trace!("debug line {:?} {:.2?} -> {:.2?}", color, start, end);
    }
}

/// Color of the scan capsule for the current climbing situation.
pub fn scan_color(has_hits: bool, qualifies: bool, climbing: bool, dashing: bool) -> DebugColor {
    if !has_hits {
        DebugColor::White
    } else if dashing {
        DebugColor::Magenta
    } else if climbing {
        DebugColor::Green
    } else if qualifies {
        DebugColor::Yellow
    } else {
        DebugColor::Red
    }
}

/// What the wall scan saw this step.
#[derive(Debug, Clone, Copy)]
pub struct ScanSnapshot<'a> {
    pub sweep_start: Vec3,
    pub capsule: CapsuleShape,
    pub hits: &'a [WallHit],
    /// Character right axis, used to draw each hit's surface-up direction.
    pub right: Vec3,
    pub color: DebugColor,
}

/// Draw the scan capsule, each hit point, its normal, its surface-up line and,
/// for sloped surfaces, its horizontal normal.
pub fn draw_scan(draw: &mut dyn DebugDraw, snapshot: &ScanSnapshot<'_>) {
    draw.capsule(snapshot.sweep_start, snapshot.capsule, snapshot.color);

    for hit in snapshot.hits {
        draw.sphere(hit.point, HIT_MARKER_RADIUS, DebugColor::Blue);
        draw.line(hit.point, hit.point + hit.normal * NORMAL_LINE_LENGTH, DebugColor::Cyan);

        let surface_up = hit.normal.cross(snapshot.right);
        draw.line(hit.point, hit.point + surface_up * NORMAL_LINE_LENGTH, DebugColor::Green);

        let horizontal = horizontal_normal(hit.normal);
        if !(hit.normal - horizontal).abs_diff_eq(Vec3::ZERO, 1e-4) {
            draw.line(hit.point, hit.point + horizontal * NORMAL_LINE_LENGTH, DebugColor::Magenta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingDraw;

    #[test]
    fn scan_color_priorities() {
        assert_eq!(scan_color(false, true, true, true), DebugColor::White);
        assert_eq!(scan_color(true, false, false, false), DebugColor::Red);
        assert_eq!(scan_color(true, true, false, false), DebugColor::Yellow);
        assert_eq!(scan_color(true, true, true, false), DebugColor::Green);
        assert_eq!(scan_color(true, false, true, true), DebugColor::Magenta);
    }

    #[test]
    fn sloped_hits_also_draw_horizontal_normal() {
        let hits = [
            WallHit::new(Vec3::new(1.0, 1.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)),
            WallHit::new(Vec3::new(1.0, 2.0, 0.0), Vec3::new(-0.8, 0.6, 0.0)),
        ];
        let mut draw = RecordingDraw::default();
        draw_scan(
            &mut draw,
            &ScanSnapshot {
                sweep_start: Vec3::ZERO,
                capsule: CapsuleShape::new(0.5, 0.72),
                hits: &hits,
                right: Vec3::Z,
                color: DebugColor::Yellow,
            },
        );
        assert_eq!(draw.capsules, vec![DebugColor::Yellow]);
        assert_eq!(draw.spheres.len(), 2);
        // Two lines for the vertical wall, three for the sloped one.
        assert_eq!(draw.lines.len(), 5);
        assert_eq!(draw.lines.iter().filter(|c| **c == DebugColor::Magenta).count(), 1);
    }
}
