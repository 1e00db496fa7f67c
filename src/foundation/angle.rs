//! Degree-based angle helpers shared by the camera and the scroll-path engine.

/// Normalize into `[0, 360)`.
pub fn wrap_deg(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Signed difference `to - from` folded into `[-180, 180)`.
pub fn shortest_delta(from: f64, to: f64) -> f64 {
    (to - from + 180.0).rem_euclid(360.0) - 180.0
}

/// Target angle equivalent to `target` that is reachable from `current` without turning more
/// than half a revolution.
pub fn shortest_rotation(current: f64, target: f64) -> f64 {
    current + shortest_delta(current, target)
}

/// Removes ±360° seams from a stream of angles so consecutive outputs never differ by more than
/// 180°.
#[derive(Clone, Copy, Debug, Default)]
pub struct AngleUnwrapper {
    last: Option<f64>,
}

impl AngleUnwrapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn unwrap(&mut self, deg: f64) -> f64 {
        let Some(last) = self.last else {
            self.last = Some(deg);
            return deg;
        };
        let out = last + shortest_delta(last, deg);
        self.last = Some(out);
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/angle.rs"]
mod tests;
