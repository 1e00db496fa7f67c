//! Page presentation toggled by camera modes: dimming around the focused page and the overview
//! affordances (thumbnails, highlight, hover/click targets).

use crate::{assets::resolver::ImageResolver, registry::PageRegistry};

/// Dim every instance except `focus`.
pub fn dim_all_except(registry: &mut PageRegistry, focus: &str) {
    for inst in registry.instances_mut() {
        inst.flags.dimmed = inst.id != focus;
    }
}

/// Clear dimming on every instance.
pub fn undim_all(registry: &mut PageRegistry) {
    for inst in registry.instances_mut() {
        inst.flags.dimmed = false;
    }
}

/// Setup/teardown pair for overview presentation. Both halves are idempotent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverviewAffordances {
    attached: bool,
}

impl OverviewAffordances {
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Swap every page image for its thumbnail and enable hover/click targets.
    ///
    /// Pages without a loadable thumbnail keep their original image.
    pub fn attach(
        &mut self,
        registry: &mut PageRegistry,
        resolver: &ImageResolver,
        highlight: Option<&str>,
    ) {
        if self.attached {
            return;
        }
        self.attached = true;
        undim_all(registry);
        let mut swapped = 0usize;
        for inst in registry.instances_mut() {
            inst.flags.highlighted = highlight.is_some_and(|h| h == inst.id);
            inst.flags.hover_enabled = true;
            inst.flags.hovered = false;
            if inst.image.is_none() {
                continue;
            }
            if let Some(thumb) = resolver.resolve_thumbnail(&inst.id) {
                inst.displayed = Some(thumb);
                swapped += 1;
            }
        }
        tracing::debug!(swapped, "overview affordances attached");
    }

    pub fn detach(&mut self, registry: &mut PageRegistry) {
        if !self.attached {
            return;
        }
        self.attached = false;
        for inst in registry.instances_mut() {
            inst.flags.highlighted = false;
            inst.flags.hover_enabled = false;
            inst.flags.hovered = false;
            inst.displayed = inst.original_src().map(str::to_string);
        }
        tracing::debug!("overview affordances detached");
    }

    /// Hover feedback; ignored unless attached.
    pub fn hover(&self, registry: &mut PageRegistry, id: &str, on: bool) -> bool {
        if !self.attached {
            return false;
        }
        match registry.instance_mut(id) {
            Some(inst) if inst.flags.hover_enabled => {
                inst.flags.hovered = on;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/overview.rs"]
mod tests;
