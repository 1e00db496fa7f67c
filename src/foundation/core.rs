use crate::foundation::error::{PagewalkError, PagewalkResult};

pub use kurbo::{Affine, Point, Rect, Vec2};

/// Milliseconds on the session clock.
pub type Millis = u64;

/// Visible screen area in CSS-like pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Viewport {
    /// Create a validated viewport with finite, positive extents.
    pub fn new(width: f64, height: f64) -> PagewalkResult<Self> {
        let vp = Self { width, height };
        vp.validate()?;
        Ok(vp)
    }

    pub fn validate(&self) -> PagewalkResult<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(PagewalkError::validation("viewport width must be finite and > 0"));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return Err(PagewalkError::validation(
                "viewport height must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Screen-space center; also the transform origin of the camera wrapper.
    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Translation that brings world point `p` to the viewport center.
    pub fn centering_translation(self, p: Point) -> Vec2 {
        self.center() - p
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

/// Axis-aligned extent of a set of pages in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorldBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
}

impl WorldBounds {
    /// Union of `rects`, skipping any with non-finite edges.
    ///
    /// Returns `None` when nothing usable was supplied.
    pub fn from_rects<I>(rects: I) -> Option<Self>
    where
        I: IntoIterator<Item = Rect>,
    {
        let mut acc: Option<Rect> = None;
        for r in rects {
            if !(r.x0.is_finite() && r.x1.is_finite() && r.y0.is_finite() && r.y1.is_finite()) {
                continue;
            }
            acc = Some(match acc {
                Some(a) => a.union(r),
                None => r,
            });
        }
        acc.map(|r| Self {
            min_x: r.x0,
            max_x: r.x1,
            min_y: r.y0,
            max_y: r.y1,
            width: r.x1 - r.x0,
            height: r.y1 - r.y0,
        })
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

/// Rect centered on `center` with the given extents.
pub fn centered_rect(center: Point, width: f64, height: f64) -> Rect {
    Rect::new(
        center.x - width / 2.0,
        center.y - height / 2.0,
        center.x + width / 2.0,
        center.y + height / 2.0,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
