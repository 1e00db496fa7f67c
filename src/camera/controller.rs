use crate::{
    animation::{ease::Ease, tween::Tween},
    camera::pose::CameraPose,
    foundation::{
        angle::shortest_rotation,
        core::{Millis, Point, Viewport, WorldBounds},
    },
};

/// Identity of one camera move; used to match completion continuations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveId(u64);

#[derive(Clone, Debug)]
struct CameraMove {
    id: MoveId,
    tween: Tween<CameraPose>,
}

/// Owns the camera pose and its single in-flight animation.
///
/// Starting a move overwrites whatever was running; the overwritten move never settles.
#[derive(Clone, Debug)]
pub struct CameraController {
    viewport: Viewport,
    pose: CameraPose,
    ease: Ease,
    active: Option<CameraMove>,
    saved: Option<CameraPose>,
    next_id: u64,
}

impl CameraController {
    pub fn new(viewport: Viewport, base_scale: f64, ease: Ease) -> Self {
        Self {
            viewport,
            pose: CameraPose::new(0.0, 0.0, 0.0, base_scale),
            ease,
            active: None,
            saved: None,
            next_id: 1,
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    /// Where the current move ends, or the current pose when idle.
    pub fn target_pose(&self) -> CameraPose {
        self.active
            .as_ref()
            .map(|m| *m.tween.target())
            .unwrap_or(self.pose)
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn animate(&mut self, target: CameraPose, now: Millis, duration_ms: Millis) -> MoveId {
        let id = MoveId(self.next_id);
        self.next_id += 1;
        if let Some(prev) = self.active.take() {
            tracing::trace!(overwritten = prev.id.0, "camera move overwritten");
        }
        self.active = Some(CameraMove {
            id,
            tween: Tween::new(self.pose, target, now, duration_ms, self.ease),
        });
        id
    }

    /// Pose that centers `anchor` with the page drawn upright, turning the short way round.
    pub fn centered_pose(&self, anchor: Point, page_rot_deg: f64) -> CameraPose {
        let t = self.viewport.centering_translation(anchor);
        CameraPose::new(
            t.x,
            t.y,
            shortest_rotation(self.pose.rotation_deg, -page_rot_deg),
            self.pose.scale,
        )
    }

    pub fn center_on(
        &mut self,
        anchor: Point,
        page_rot_deg: f64,
        now: Millis,
        duration_ms: Millis,
    ) -> MoveId {
        let target = self.centered_pose(anchor, page_rot_deg);
        tracing::debug!(
            x = target.x,
            y = target.y,
            rot = target.rotation_deg,
            duration_ms,
            "camera center"
        );
        self.animate(target, now, duration_ms)
    }

    /// Jump without animating; cancels any in-flight move.
    pub fn set_immediate(&mut self, pose: CameraPose) {
        self.active = None;
        self.pose = pose;
    }

    /// Sample the running move. Returns the move's id once it has settled.
    pub fn tick(&mut self, now: Millis) -> Option<MoveId> {
        let m = self.active.as_ref()?;
        self.pose = m.tween.sample(now);
        if !m.tween.is_finished(now) {
            return None;
        }
        let id = m.id;
        self.active = None;
        Some(id)
    }

    pub fn next_settle_due(&self) -> Option<Millis> {
        self.active.as_ref().map(|m| m.tween.end_ms())
    }

    /// Pose that fits `bounds` into the viewport at `fill` of its size, unrotated.
    pub fn overview_pose(&self, bounds: &WorldBounds, fill: f64) -> CameraPose {
        let t = self.viewport.centering_translation(bounds.center());
        let w = if bounds.width > 0.0 { bounds.width } else { 1.0 };
        let h = if bounds.height > 0.0 { bounds.height } else { 1.0 };
        let scale = (self.viewport.width / w).min(self.viewport.height / h) * fill;
        CameraPose::new(t.x, t.y, 0.0, scale)
    }

    /// Remember where the camera is heading (its pose when idle) for a later restore.
    pub fn save_pose(&mut self) {
        self.saved = Some(self.target_pose());
    }

    pub fn take_saved(&mut self) -> Option<CameraPose> {
        self.saved.take()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/controller.rs"]
mod tests;
