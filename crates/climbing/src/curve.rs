//! Piecewise-linear float curves (dash speed over time).

use serde::{Deserialize, Serialize};

/// One keyframe of a [`FloatCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
}

/// A value over time, linearly interpolated between keys and clamped outside them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatCurve {
    pub keys: Vec<CurveKey>,
}

impl FloatCurve {
    /// Build a curve from `(time, value)` pairs. Keys are expected in time order.
    pub fn from_points(points: &[(f32, f32)]) -> Self {
        Self {
            keys: points
                .iter()
                .map(|&(time, value)| CurveKey { time, value })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Whether keys are in non-decreasing time order.
    pub fn is_sorted(&self) -> bool {
        self.keys.windows(2).all(|pair| pair[0].time <= pair[1].time)
    }

    /// First and last key times.
    pub fn time_range(&self) -> Option<(f32, f32)> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        Some((first.time, last.time))
    }

    /// Value at `time`. An empty curve evaluates to zero.
    pub fn value_at(&self, time: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return 0.0;
        };
        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        for pair in self.keys.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if time <= b.time {
                let span = b.time - a.time;
                if span <= f32::EPSILON {
                    return b.value;
                }
                let t = (time - a.time) / span;
                return a.value + (b.value - a.value) * t;
            }
        }
        last.value
    }
}
