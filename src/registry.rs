//! Active page sequence and lazily created page instances.

use std::{collections::HashMap, sync::Arc};

use crate::{
    animation::{ease::Ease, tween::Tween},
    assets::resolver::{ImageResolver, ImageSource},
    config::{Branch, BranchConfig},
    dataset::{PageDataset, PageDescriptor, PageKind, PageSize},
    foundation::core::{Millis, Point, Rect, Vec2, WorldBounds, centered_rect},
};

/// Per-instance state toggled by the navigation engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct InstanceFlags {
    /// Scroll progress on this page has crossed the completion threshold at least once.
    pub scroll_done: bool,
    /// Member of a reveal batch; hidden until its threshold is crossed.
    pub sequence_member: bool,
    /// An at-max auto-advance is pending for this page.
    pub auto_nav_scheduled: bool,
    /// The branch prompt was already opened from this page's scroll.
    pub choice_prompted: bool,
    /// A reveal batch hand-off was already scheduled from this page.
    pub advance_scheduled: bool,
    pub visible: bool,
    pub dimmed: bool,
    pub highlighted: bool,
    pub hover_enabled: bool,
    pub hovered: bool,
}

impl Default for InstanceFlags {
    fn default() -> Self {
        Self {
            scroll_done: false,
            sequence_member: false,
            auto_nav_scheduled: false,
            choice_prompted: false,
            advance_scheduled: false,
            visible: true,
            dimmed: false,
            highlighted: false,
            hover_enabled: false,
            hovered: false,
        }
    }
}

/// A page created in the world: its geometry, image and presentation flags.
#[derive(Clone, Debug)]
pub struct PageInstance {
    pub id: String,
    pub kind: PageKind,
    /// Absolute center; copied from the dataset at creation.
    pub center: Point,
    pub size: PageSize,
    /// Intrinsic rotation in degrees.
    pub rot: f64,
    /// Rotation the camera currently applies to this page while its path is active.
    pub live_rot: f64,
    /// `None` for blank pages.
    pub image: Option<ImageSource>,
    /// What is on screen: a thumbnail in overview mode, otherwise the original.
    pub displayed: Option<String>,
    pub flags: InstanceFlags,
    slide_in: Option<Tween<Vec2>>,
}

impl PageInstance {
    fn from_descriptor(desc: &PageDescriptor, image: Option<ImageSource>) -> Self {
        let displayed = image.as_ref().map(|s| s.as_str().to_string());
        Self {
            id: desc.id.clone(),
            kind: desc.kind.clone(),
            center: desc.center(),
            size: desc.size,
            rot: desc.world.rot,
            live_rot: desc.world.rot,
            image,
            displayed,
            flags: InstanceFlags::default(),
            slide_in: None,
        }
    }

    /// Unrotated page rectangle in world space.
    pub fn rect(&self) -> Rect {
        centered_rect(self.center, self.size.w, self.size.h)
    }

    /// Start the entry animation: the page rises from `1.2 * h` below its rest position, where
    /// "below" is measured in the upright camera frame for this page.
    pub fn start_slide_in(&mut self, now: Millis, duration_ms: Millis, ease: Ease) {
        let cam = (-self.rot).to_radians();
        let dist = self.size.h * 1.2;
        let from = Vec2::new(cam.sin() * dist, cam.cos() * dist);
        self.slide_in = Some(Tween::new(from, Vec2::ZERO, now, duration_ms, ease));
    }

    /// Offset from the rest position at `now`.
    pub fn slide_offset(&self, now: Millis) -> Vec2 {
        self.slide_in
            .as_ref()
            .map(|tw| tw.sample(now))
            .unwrap_or(Vec2::ZERO)
    }

    /// Full-size image, as opposed to the thumbnail shown in overview.
    pub fn original_src(&self) -> Option<&str> {
        self.image.as_ref().map(ImageSource::as_str)
    }
}

/// Result of [`PageRegistry::ensure`]: whether the instance was just made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ensured {
    Created,
    Existing,
}

/// Ordered sequence of active page ids plus the instances created so far.
///
/// Instances are keyed by id and never removed; pages on an arm dropped by a later branch
/// selection stay created but are unreachable through the active sequence.
#[derive(Clone, Debug)]
pub struct PageRegistry {
    dataset: Arc<PageDataset>,
    active: Vec<String>,
    instances: HashMap<String, PageInstance>,
}

impl PageRegistry {
    /// Registry over the whole dataset with no instances yet.
    pub fn new(dataset: Arc<PageDataset>) -> Self {
        let active = dataset.ids().map(str::to_string).collect();
        Self {
            dataset,
            active,
            instances: HashMap::new(),
        }
    }

    pub fn dataset(&self) -> &PageDataset {
        &self.dataset
    }

    /// Length of the active sequence, not of the dataset.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Page ids of the active sequence in reading order.
    pub fn ids(&self) -> &[String] {
        &self.active
    }

    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.active.get(index).map(String::as_str)
    }

    /// Active index of `id`; `None` for pages off the chosen arm.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.active.iter().position(|x| x == id)
    }

    /// Dataset descriptor of the page at an active index.
    pub fn descriptor_at(&self, index: usize) -> Option<&PageDescriptor> {
        self.id_at(index).and_then(|id| self.dataset.get(id))
    }

    /// Instance at an active index.
    pub fn get(&self, index: usize) -> Option<&PageInstance> {
        self.id_at(index).and_then(|id| self.instances.get(id))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut PageInstance> {
        let id = self.active.get(index)?;
        self.instances.get_mut(id)
    }

    /// Instance by id, reachable or not.
    pub fn instance(&self, id: &str) -> Option<&PageInstance> {
        self.instances.get(id)
    }

    pub fn instance_mut(&mut self, id: &str) -> Option<&mut PageInstance> {
        self.instances.get_mut(id)
    }

    pub fn is_instantiated(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Highest active index with an instance; sliders may not go past it.
    pub fn max_instantiated_index(&self) -> Option<usize> {
        (0..self.active.len()).rev().find(|&i| self.is_instantiated(i))
    }

    /// Create the instance at `index` if absent. Blank pages get no image; everything else is
    /// resolved through `resolver` first. Returns `None` for an index outside the active
    /// sequence.
    pub fn ensure(&mut self, index: usize, resolver: &ImageResolver) -> Option<Ensured> {
        let id = self.active.get(index)?;
        if self.instances.contains_key(id) {
            return Some(Ensured::Existing);
        }
        let desc = self.dataset.get(id)?;
        let image = (!desc.kind.is_blank()).then(|| resolver.resolve(id));
        let inst = PageInstance::from_descriptor(desc, image);
        tracing::debug!(id = %inst.id, index, kind = %inst.kind, "page created");
        self.instances.insert(id.clone(), inst);
        Some(Ensured::Created)
    }

    /// Recompute the active sequence for `branch` from the full dataset order.
    ///
    /// Returns `false` (and leaves the sequence untouched) when any branch id is missing from
    /// the dataset.
    pub fn select_branch(&mut self, branch: Branch, cfg: &BranchConfig) -> bool {
        let ds = &self.dataset;
        let (Some(_), Some(a_start), Some(b_start), Some(a_end)) = (
            ds.position(&cfg.anchor),
            ds.position(&cfg.arm_a_start),
            ds.position(&cfg.arm_b_start),
            ds.position(cfg.arm_a_end()),
        ) else {
            tracing::warn!(?branch, anchor = %cfg.anchor, "branch ids missing from dataset, selection skipped");
            return false;
        };
        let ids: Vec<&str> = ds.ids().collect();
        self.active = match branch {
            Branch::A => ids[..a_end].iter().map(|s| s.to_string()).collect(),
            Branch::B => ids[..a_start.min(b_start)]
                .iter()
                .chain(ids[b_start..].iter())
                .map(|s| s.to_string())
                .collect(),
        };
        tracing::debug!(?branch, len = self.active.len(), "branch applied");
        true
    }

    /// Last id of `branch`'s arm.
    pub fn ending_of(&self, branch: Branch, cfg: &BranchConfig) -> Option<String> {
        match branch {
            Branch::A => cfg.ending_a.clone().or_else(|| {
                let end = self.dataset.position(cfg.arm_a_end())?;
                let last = end.checked_sub(1)?;
                self.dataset.pages().get(last).map(|p| p.id.clone())
            }),
            Branch::B => cfg
                .ending_b
                .clone()
                .or_else(|| self.dataset.pages().last().map(|p| p.id.clone())),
        }
    }

    /// Every created instance, in no particular order.
    pub fn instances(&self) -> impl Iterator<Item = &PageInstance> {
        self.instances.values()
    }

    pub fn instances_mut(&mut self) -> impl Iterator<Item = &mut PageInstance> {
        self.instances.values_mut()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Bounds of every created page, reachable or not.
    pub fn instantiated_bounds(&self) -> Option<WorldBounds> {
        WorldBounds::from_rects(self.instances.values().map(PageInstance::rect))
    }
}

#[cfg(test)]
#[path = "../tests/unit/registry.rs"]
mod tests;
