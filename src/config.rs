//! Engine tuning and the narrative table.
//!
//! Every field has a default, so an empty JSON object is a valid configuration. Unknown fields
//! are rejected to catch typos in hand-written files.

use std::path::Path;

use crate::{
    animation::ease::Ease,
    foundation::{
        core::{Millis, Viewport},
        error::{PagewalkError, PagewalkResult},
    },
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub viewport: Viewport,
    /// Camera wrapper scale outside overview mode.
    pub base_view_scale: f64,
    pub center_duration_s: f64,
    pub overview_duration_s: f64,
    /// Fraction of the viewport the world occupies in overview mode.
    pub overview_fill: f64,
    pub unlock_debounce_ms: Millis,
    pub auto_advance_ms: Millis,
    pub modal_delay_ms: Millis,
    pub branch_advance_delay_ms: Millis,
    /// Delay before a page with a degenerate motion path moves on by itself; `None` disables it.
    pub degenerate_auto_advance_ms: Option<Millis>,
    pub slider_warning_threshold: u32,
    pub toast_dismiss_ms: Millis,
    pub all_pages_yield_ms: Millis,
    pub replay_step_ms: Millis,
    pub ease: Ease,
    pub scroll: ScrollSettings,
    pub images: ImageSettings,
    pub narrative: NarrativeTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            base_view_scale: 1.4,
            center_duration_s: 0.8,
            overview_duration_s: 0.9,
            overview_fill: 0.9,
            unlock_debounce_ms: 250,
            auto_advance_ms: 800,
            modal_delay_ms: 500,
            branch_advance_delay_ms: 300,
            degenerate_auto_advance_ms: Some(1000),
            slider_warning_threshold: 5,
            toast_dismiss_ms: 3000,
            all_pages_yield_ms: 10,
            replay_step_ms: 50,
            ease: Ease::InOutCubic,
            scroll: ScrollSettings::default(),
            images: ImageSettings::default(),
            narrative: NarrativeTable::default(),
        }
    }
}

impl EngineConfig {
    #[tracing::instrument]
    pub fn from_json_file(path: &Path) -> PagewalkResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            PagewalkError::config(format!("read config '{}': {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> PagewalkResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| PagewalkError::config(format!("parse config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> PagewalkResult<()> {
        self.viewport
            .validate()
            .map_err(|e| PagewalkError::config(e.to_string()))?;
        if !(self.base_view_scale.is_finite() && self.base_view_scale > 0.0) {
            return Err(PagewalkError::config("base_view_scale must be finite and > 0"));
        }
        for (name, v) in [
            ("center_duration_s", self.center_duration_s),
            ("overview_duration_s", self.overview_duration_s),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(PagewalkError::config(format!("{name} must be finite and >= 0")));
            }
        }
        if !(self.overview_fill > 0.0 && self.overview_fill <= 1.0) {
            return Err(PagewalkError::config("overview_fill must be in (0, 1]"));
        }
        if self.slider_warning_threshold == 0 {
            return Err(PagewalkError::config("slider_warning_threshold must be >= 1"));
        }
        self.scroll.validate()?;
        self.images.validate()?;
        self.narrative.validate()
    }

    pub fn center_duration_ms(&self) -> Millis {
        seconds_to_ms(self.center_duration_s)
    }

    pub fn overview_duration_ms(&self) -> Millis {
        seconds_to_ms(self.overview_duration_s)
    }
}

fn seconds_to_ms(s: f64) -> Millis {
    (s * 1000.0).round().max(0.0) as Millis
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrollSettings {
    /// Paths with this many points or fewer are treated as a single anchor point.
    pub min_path_points: usize,
    pub done_threshold: f64,
    pub max_threshold: f64,
    pub spacer_min_px: f64,
    /// Spacer pixels per unit of path length.
    pub scroll_speed: f64,
    pub rotate_sign: f64,
    pub angle_offset_deg: f64,
    pub minimap_size: f64,
    pub minimap_padding: f64,
    pub indicator_radius: f64,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            min_path_points: 4,
            done_threshold: 0.93,
            max_threshold: 0.99,
            spacer_min_px: 2000.0,
            scroll_speed: 3.0,
            rotate_sign: -1.0,
            angle_offset_deg: 0.0,
            minimap_size: 120.0,
            minimap_padding: 20.0,
            indicator_radius: 4.0,
        }
    }
}

impl ScrollSettings {
    pub fn validate(&self) -> PagewalkResult<()> {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_unit(self.done_threshold) || !in_unit(self.max_threshold) {
            return Err(PagewalkError::config("scroll thresholds must be in [0, 1]"));
        }
        if self.done_threshold > self.max_threshold {
            return Err(PagewalkError::config(
                "scroll.done_threshold must not exceed scroll.max_threshold",
            ));
        }
        if !(self.scroll_speed.is_finite() && self.scroll_speed > 0.0) {
            return Err(PagewalkError::config("scroll.scroll_speed must be > 0"));
        }
        if !(self.spacer_min_px.is_finite() && self.spacer_min_px >= 0.0) {
            return Err(PagewalkError::config("scroll.spacer_min_px must be >= 0"));
        }
        if !(self.minimap_size.is_finite() && self.minimap_size > 0.0) {
            return Err(PagewalkError::config("scroll.minimap_size must be > 0"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageSettings {
    pub image_dir: String,
    pub thumbnail_dir: String,
    /// Probe order for full-resolution images.
    pub extensions: Vec<String>,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            image_dir: "images".to_string(),
            thumbnail_dir: "images/thumbnails".to_string(),
            extensions: vec!["jpg".to_string(), "png".to_string(), "webp".to_string()],
        }
    }
}

impl ImageSettings {
    pub fn validate(&self) -> PagewalkResult<()> {
        if self.extensions.is_empty() {
            return Err(PagewalkError::config("images.extensions must not be empty"));
        }
        if let Some(bad) = self
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.contains(['.', '/', '\\']))
        {
            return Err(PagewalkError::config(format!(
                "images.extensions entry '{bad}' is not a bare extension"
            )));
        }
        Ok(())
    }
}

/// Narrative events keyed by page id.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NarrativeTable {
    pub branch: Option<BranchConfig>,
    pub reveal_batches: Vec<RevealBatch>,
    pub auto_advance: Vec<AutoAdvanceRule>,
}

impl NarrativeTable {
    pub fn validate(&self) -> PagewalkResult<()> {
        for batch in &self.reveal_batches {
            batch.validate()?;
        }
        let mut triggers: Vec<&str> = self
            .reveal_batches
            .iter()
            .map(|b| b.trigger.as_str())
            .collect();
        triggers.sort_unstable();
        if triggers.windows(2).any(|w| w[0] == w[1]) {
            return Err(PagewalkError::config(
                "narrative.reveal_batches has duplicate triggers",
            ));
        }
        Ok(())
    }

    pub fn reveal_batch_for(&self, trigger: &str) -> Option<&RevealBatch> {
        self.reveal_batches.iter().find(|b| b.trigger == trigger)
    }

    pub fn auto_advance_for(&self, id: &str) -> Option<Millis> {
        self.auto_advance
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.delay_ms)
    }

    pub fn is_branch_anchor(&self, id: &str) -> bool {
        self.branch.as_ref().is_some_and(|b| b.anchor == id)
    }
}

/// Which arm of a two-way branch the reader picked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Branch {
    A,
    B,
}

impl Branch {
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// A two-way fork in the page sequence.
///
/// Branch A keeps every id before `arm_a_end` (which defaults to `arm_b_start`). Branch B keeps
/// the ids before `arm_a_start` plus everything from `arm_b_start` on. Both are recomputed from
/// the full dataset order, so the arms may share pages.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchConfig {
    pub anchor: String,
    pub arm_a_start: String,
    pub arm_b_start: String,
    #[serde(default)]
    pub arm_a_end: Option<String>,
    /// Last page of arm A; defaults to the page right before `arm_a_end`.
    #[serde(default)]
    pub ending_a: Option<String>,
    /// Last page of arm B; defaults to the final page of the dataset.
    #[serde(default)]
    pub ending_b: Option<String>,
    /// Branch applied by the all-pages operation when none was chosen.
    #[serde(default = "default_branch")]
    pub default_branch: Branch,
}

fn default_branch() -> Branch {
    Branch::B
}

impl BranchConfig {
    pub fn arm_a_end(&self) -> &str {
        self.arm_a_end.as_deref().unwrap_or(&self.arm_b_start)
    }
}

/// Pages revealed one by one while the reader scrolls through `trigger`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevealBatch {
    pub trigger: String,
    pub pages: Vec<String>,
    #[serde(default = "default_segments")]
    pub segments: u32,
    #[serde(default = "default_unlock_at")]
    pub unlock_at: f64,
    #[serde(default)]
    pub advance_to: Option<String>,
    #[serde(default = "default_advance_after")]
    pub advance_after: f64,
    #[serde(default = "default_advance_delay_ms")]
    pub advance_delay_ms: Millis,
}

fn default_segments() -> u32 {
    5
}

fn default_unlock_at() -> f64 {
    0.8
}

fn default_advance_after() -> f64 {
    0.85
}

fn default_advance_delay_ms() -> Millis {
    500
}

impl RevealBatch {
    pub fn validate(&self) -> PagewalkResult<()> {
        if self.pages.is_empty() {
            return Err(PagewalkError::config(format!(
                "reveal batch '{}' has no pages",
                self.trigger
            )));
        }
        if self.segments == 0 {
            return Err(PagewalkError::config(format!(
                "reveal batch '{}' needs at least one segment",
                self.trigger
            )));
        }
        if self.pages.len() > self.segments as usize {
            return Err(PagewalkError::config(format!(
                "reveal batch '{}' has {} pages for {} segments",
                self.trigger,
                self.pages.len(),
                self.segments
            )));
        }
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        for (name, v) in [
            ("unlock_at", self.unlock_at),
            ("advance_after", self.advance_after),
        ] {
            if !in_unit(v) {
                return Err(PagewalkError::config(format!(
                    "reveal batch '{}': {name} must be within [0, 1], got {v}",
                    self.trigger
                )));
            }
        }
        Ok(())
    }

    /// Progress at which the `i`-th batch page becomes visible.
    pub fn threshold(&self, i: usize) -> f64 {
        i as f64 / f64::from(self.segments)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AutoAdvanceRule {
    pub id: String,
    pub delay_ms: Millis,
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
