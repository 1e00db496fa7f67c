use crate::{config::ScrollSettings, foundation::core::Point};

/// Corner overview of the active motion path with a moving indicator.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Minimap {
    pub size: f64,
    min: Point,
    scale: f64,
    padding: f64,
    /// Path vertices projected into minimap space, snapped to whole pixels.
    pub path: Vec<Point>,
    pub indicator: Point,
    pub indicator_radius: f64,
    /// Rotation of the drawing about the minimap center, matching the page's upright view.
    pub rotation_deg: f64,
}

impl Minimap {
    pub fn new(points: &[Point], page_rot_deg: f64, settings: &ScrollSettings) -> Self {
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        if points.is_empty() {
            (min_x, min_y, max_x, max_y) = (0.0, 0.0, 0.0, 0.0);
        }
        let w = (max_x - min_x).max(1.0);
        let h = (max_y - min_y).max(1.0);
        let padding = settings.minimap_padding + settings.indicator_radius + 2.0;
        let inner = settings.minimap_size - padding * 2.0;
        let scale = (inner / w).min(inner / h);

        let mut map = Self {
            size: settings.minimap_size,
            min: Point::new(min_x, min_y),
            scale,
            padding,
            path: Vec::with_capacity(points.len()),
            indicator: Point::new(padding, padding),
            indicator_radius: settings.indicator_radius,
            rotation_deg: -page_rot_deg,
        };
        map.path = points
            .iter()
            .map(|&p| {
                let q = map.project(p);
                Point::new(q.x.round(), q.y.round())
            })
            .collect();
        if let Some(&first) = points.first() {
            map.indicator = map.project(first);
        }
        map
    }

    pub fn project(&self, local: Point) -> Point {
        Point::new(
            (local.x - self.min.x) * self.scale + self.padding,
            (local.y - self.min.y) * self.scale + self.padding,
        )
    }

    pub fn move_indicator(&mut self, local: Point) {
        self.indicator = self.project(local);
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/minimap.rs"]
mod tests;
