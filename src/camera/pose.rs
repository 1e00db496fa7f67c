use crate::{
    animation::tween::Lerp,
    foundation::core::{Affine, Point, Vec2, Viewport},
};

/// Camera state split across two transform layers.
///
/// `x`/`y` live on the translation-only viewer layer; `rotation_deg` and `scale` live on the
/// camera wrapper, which pivots about the viewport center. The layers are never merged into
/// one transform on the host side.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraPose {
    pub x: f64,
    pub y: f64,
    pub rotation_deg: f64,
    pub scale: f64,
}

impl CameraPose {
    pub fn new(x: f64, y: f64, rotation_deg: f64, scale: f64) -> Self {
        Self {
            x,
            y,
            rotation_deg,
            scale,
        }
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn viewer_affine(&self) -> Affine {
        Affine::translate(self.translation())
    }

    pub fn wrapper_affine(&self, viewport: Viewport) -> Affine {
        let c = viewport.center().to_vec2();
        Affine::translate(c)
            * Affine::rotate(self.rotation_deg.to_radians())
            * Affine::scale(self.scale)
            * Affine::translate(-c)
    }

    /// Full world-to-screen mapping (wrapper applied after the viewer translation).
    pub fn world_to_screen(&self, viewport: Viewport) -> Affine {
        self.wrapper_affine(viewport) * self.viewer_affine()
    }

    /// World point shown at the viewport center.
    pub fn focus(&self, viewport: Viewport) -> Point {
        viewport.center() - self.translation()
    }
}

impl Lerp for CameraPose {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            rotation_deg: a.rotation_deg + (b.rotation_deg - a.rotation_deg) * t,
            scale: a.scale + (b.scale - a.scale) * t,
        }
    }
}
