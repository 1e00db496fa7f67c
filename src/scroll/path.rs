use kurbo::{Line, ParamCurve};

use crate::foundation::core::Point;

/// Point and tangent on a polyline at a given arc-length fraction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathSample {
    pub point: Point,
    /// Direction of travel in degrees, measured from +x towards +y.
    pub angle_deg: f64,
}

/// Straight-segment motion path in page-local coordinates, parameterized by arc length.
#[derive(Clone, Debug)]
pub struct MotionPath {
    segments: Vec<Line>,
    /// `cumulative[i]` is the length before segment `i`.
    cumulative: Vec<f64>,
    total: f64,
    origin: Point,
}

impl MotionPath {
    /// `None` for an empty point list.
    pub fn new(points: &[Point]) -> Option<Self> {
        let origin = *points.first()?;
        let segments: Vec<Line> = points
            .windows(2)
            .map(|w| Line::new(w[0], w[1]))
            .filter(|l| l.p0.distance(l.p1) > 0.0)
            .collect();
        let mut cumulative = Vec::with_capacity(segments.len());
        let mut total = 0.0;
        for seg in &segments {
            cumulative.push(total);
            total += seg.p0.distance(seg.p1);
        }
        Some(Self {
            segments,
            cumulative,
            total,
            origin,
        })
    }

    pub fn length(&self) -> f64 {
        self.total
    }

    pub fn start(&self) -> Point {
        self.origin
    }

    /// Sample at `t` in `[0, 1]` of the total length.
    pub fn sample(&self, t: f64) -> PathSample {
        if self.segments.is_empty() {
            return PathSample {
                point: self.origin,
                angle_deg: 0.0,
            };
        }
        let d = t.clamp(0.0, 1.0) * self.total;
        let i = self
            .cumulative
            .partition_point(|&start| start <= d)
            .saturating_sub(1);
        let seg = self.segments[i];
        let len = seg.p0.distance(seg.p1);
        let local = ((d - self.cumulative[i]) / len).clamp(0.0, 1.0);
        let dir = seg.p1 - seg.p0;
        PathSample {
            point: seg.eval(local),
            angle_deg: dir.y.atan2(dir.x).to_degrees(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/path.rs"]
mod tests;
