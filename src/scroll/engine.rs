//! Scroll-driven camera choreography for pages that carry a motion path.
//!
//! Lifecycle per page: `Idle -> Armed -> Tracking -> Completing -> Idle`. [`ScrollPathEngine::arm`]
//! builds the path session, [`ScrollPathEngine::attach`] creates the scroll region and starts
//! tracking, crossing the completion threshold moves to `Completing` while still tracking, and
//! [`ScrollPathEngine::kill`] tears everything down.

use crate::{
    config::ScrollSettings,
    dataset::PageDescriptor,
    foundation::{
        angle::{AngleUnwrapper, wrap_deg},
        core::{Point, Vec2, Viewport},
    },
    scroll::{minimap::Minimap, path::MotionPath},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollPhase {
    #[default]
    Idle,
    Armed,
    Tracking,
    Completing,
}

/// What arming a page produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArmOutcome {
    /// The page does not drive scroll.
    NoPath,
    /// Too few points to follow; the camera should just look at `anchor`.
    Degenerate { anchor: Point },
    Armed,
}

/// Scrollable spacer sized from the path length.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ScrollRegion {
    pub spacer_height: f64,
    /// Extra space after the spacer so the end of the path is reachable.
    pub trailing_margin: f64,
    pub viewport_height: f64,
}

impl ScrollRegion {
    pub fn new(path_length: f64, settings: &ScrollSettings, viewport: Viewport) -> Self {
        let len = path_length.max(1.0);
        Self {
            spacer_height: settings
                .spacer_min_px
                .max((len * settings.scroll_speed).round()),
            trailing_margin: viewport.height,
            viewport_height: viewport.height,
        }
    }

    fn span(&self) -> f64 {
        (self.spacer_height - self.viewport_height).max(1.0)
    }

    /// Progress from the spacer's top meeting the viewport top to its bottom meeting the
    /// viewport bottom.
    pub fn progress_at(&self, offset: f64) -> f64 {
        (offset / self.span()).clamp(0.0, 1.0)
    }

    pub fn offset_for(&self, progress: f64) -> f64 {
        progress.clamp(0.0, 1.0) * self.span()
    }

    pub fn max_offset(&self) -> f64 {
        (self.spacer_height + self.trailing_margin - self.viewport_height).max(0.0)
    }
}

/// Camera and threshold output of one progress update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollFrame {
    pub progress: f64,
    /// Viewer translation centering the path point.
    pub translation: Vec2,
    /// Camera wrapper rotation to apply.
    pub rotation_deg: f64,
    /// Wrapped rotation to record on the page instance.
    pub live_rot: f64,
    pub world_point: Point,
    /// Progress is at or beyond the completion threshold.
    pub done: bool,
    /// First crossing of the completion threshold in this session.
    pub done_reached: bool,
    /// Crossed into the max band on this update.
    pub reached_max: bool,
    /// Dropped out of the max band on this update.
    pub left_max: bool,
}

#[derive(Clone, Debug)]
struct PathSession {
    page_id: String,
    page_index: usize,
    path: MotionPath,
    /// Top-left of the page in world space.
    page_origin: Point,
    page_rot: f64,
    rotate: bool,
    minimap: Minimap,
    region: Option<ScrollRegion>,
    unwrapper: AngleUnwrapper,
    progress: f64,
    at_max: bool,
    done: bool,
}

/// Public view of the live session.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ScrollStatus {
    pub page_id: String,
    pub page_index: usize,
    pub phase: ScrollPhase,
    pub progress: f64,
    pub at_max: bool,
    pub region: Option<ScrollRegion>,
    pub minimap: Minimap,
}

#[derive(Clone, Debug)]
pub struct ScrollPathEngine {
    settings: ScrollSettings,
    phase: ScrollPhase,
    session: Option<PathSession>,
}

impl ScrollPathEngine {
    pub fn new(settings: ScrollSettings) -> Self {
        Self {
            settings,
            phase: ScrollPhase::Idle,
            session: None,
        }
    }

    pub fn settings(&self) -> &ScrollSettings {
        &self.settings
    }

    pub fn phase(&self) -> ScrollPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Scroll input currently moves the camera.
    pub fn is_tracking(&self) -> bool {
        matches!(self.phase, ScrollPhase::Tracking | ScrollPhase::Completing)
    }

    pub fn at_max(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.at_max)
    }

    pub fn active_page(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.page_id.as_str())
    }

    pub fn progress(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.progress)
    }

    pub fn region(&self) -> Option<ScrollRegion> {
        self.session.as_ref().and_then(|s| s.region)
    }

    pub fn status(&self) -> Option<ScrollStatus> {
        self.session.as_ref().map(|s| ScrollStatus {
            page_id: s.page_id.clone(),
            page_index: s.page_index,
            phase: self.phase,
            progress: s.progress,
            at_max: s.at_max,
            region: s.region,
            minimap: s.minimap.clone(),
        })
    }

    /// Prepare a path session for `desc`, placed with its center at `center`.
    ///
    /// Any previous session is killed first.
    pub fn arm(&mut self, desc: &PageDescriptor, center: Point, page_index: usize) -> ArmOutcome {
        self.kill();
        if !desc.drives_scroll() {
            return ArmOutcome::NoPath;
        }
        if desc.scroll_path.len() <= self.settings.min_path_points {
            return ArmOutcome::Degenerate {
                anchor: desc.anchor_point(),
            };
        }
        let page_origin = Point::new(center.x - desc.size.w / 2.0, center.y - desc.size.h / 2.0);
        let local: Vec<Point> = desc
            .scroll_path
            .iter()
            .map(|p| Point::new(p.x - page_origin.x, p.y - page_origin.y))
            .collect();
        let Some(path) = MotionPath::new(&local) else {
            return ArmOutcome::NoPath;
        };
        let minimap = Minimap::new(&local, desc.world.rot, &self.settings);
        tracing::debug!(
            page = %desc.id,
            points = local.len(),
            length = path.length(),
            rotate = desc.rotates_with_path(),
            "scroll path armed"
        );
        self.session = Some(PathSession {
            page_id: desc.id.clone(),
            page_index,
            path,
            page_origin,
            page_rot: desc.world.rot,
            rotate: desc.rotates_with_path(),
            minimap,
            region: None,
            unwrapper: AngleUnwrapper::new(),
            progress: 0.0,
            at_max: false,
            done: false,
        });
        self.phase = ScrollPhase::Armed;
        ArmOutcome::Armed
    }

    /// Create the scroll region and begin tracking. The scroll position starts at the top.
    pub fn attach(&mut self, viewport: Viewport) -> Option<ScrollRegion> {
        let s = self.session.as_mut()?;
        if self.phase != ScrollPhase::Armed {
            return s.region;
        }
        let region = ScrollRegion::new(s.path.length(), &self.settings, viewport);
        s.region = Some(region);
        self.phase = ScrollPhase::Tracking;
        tracing::debug!(spacer = region.spacer_height, "scroll region attached");
        Some(region)
    }

    /// Rebuild the region of a tracking session for a new viewport. Progress is kept; the
    /// caller re-applies it to get the matching offset.
    pub fn relayout(&mut self, viewport: Viewport) -> Option<ScrollRegion> {
        if !self.is_tracking() {
            return None;
        }
        let s = self.session.as_mut()?;
        let region = ScrollRegion::new(s.path.length(), &self.settings, viewport);
        s.region = Some(region);
        tracing::debug!(
            page = %s.page_id,
            spacer = region.spacer_height,
            viewport_height = viewport.height,
            "scroll region relaid out"
        );
        Some(region)
    }

    /// Feed a scroll offset within the region.
    pub fn update(&mut self, offset: f64, viewport: Viewport) -> Option<ScrollFrame> {
        let region = self.session.as_ref()?.region?;
        self.update_progress(region.progress_at(offset), viewport)
    }

    /// Feed a progress value in `[0, 1]` directly.
    pub fn update_progress(&mut self, progress: f64, viewport: Viewport) -> Option<ScrollFrame> {
        if !self.is_tracking() {
            return None;
        }
        let settings = &self.settings;
        let s = self.session.as_mut()?;
        let t = progress.clamp(0.0, 1.0);
        s.progress = t;

        let sample = s.path.sample(t);
        let world_point = Point::new(
            s.page_origin.x + sample.point.x,
            s.page_origin.y + sample.point.y,
        );
        let translation = viewport.centering_translation(world_point);

        let base = -s.page_rot;
        let (rotation_deg, live_rot) = if s.rotate {
            let smooth = s.unwrapper.unwrap(sample.angle_deg);
            let local = smooth + settings.angle_offset_deg - s.page_rot;
            let applied = base + settings.rotate_sign * local;
            (applied, wrap_deg(applied))
        } else {
            (base, base)
        };
        s.minimap.move_indicator(sample.point);

        let done = t >= settings.done_threshold;
        let done_reached = done && !s.done;
        if done_reached {
            s.done = true;
            self.phase = ScrollPhase::Completing;
        }
        let in_max = t >= settings.max_threshold;
        let reached_max = in_max && !s.at_max;
        let left_max = !in_max && s.at_max;
        s.at_max = in_max;

        Some(ScrollFrame {
            progress: t,
            translation,
            rotation_deg,
            live_rot,
            world_point,
            done,
            done_reached,
            reached_max,
            left_max,
        })
    }

    /// Tear down the session and its scroll artefacts. Safe to call when idle.
    pub fn kill(&mut self) -> bool {
        let Some(s) = self.session.take() else {
            self.phase = ScrollPhase::Idle;
            return false;
        };
        tracing::debug!(page = %s.page_id, progress = s.progress, "scroll path killed");
        self.phase = ScrollPhase::Idle;
        true
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/engine.rs"]
mod tests;
