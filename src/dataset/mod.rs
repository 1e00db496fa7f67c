//! Page geometry loaded once per session.

use std::{collections::HashMap, io::Read, path::Path};

use crate::foundation::{
    core::{Point, Rect, WorldBounds, centered_rect},
    error::{PagewalkError, PagewalkResult},
};

/// Page type as declared in the dataset file.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PageKind {
    Basic,
    /// Interstitial without an image.
    Blank,
    /// Motion path, fixed camera rotation.
    Special1,
    /// Motion path with path-following rotation.
    Special2,
    Custom(String),
}

impl PageKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Basic => "basic",
            Self::Blank => "blank",
            Self::Special1 => "special1",
            Self::Special2 => "special2",
            Self::Custom(s) => s,
        }
    }

    pub fn is_special(&self) -> bool {
        self.as_str().starts_with("special")
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }
}

impl From<String> for PageKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "basic" => Self::Basic,
            "blank" => Self::Blank,
            "special1" => Self::Special1,
            "special2" => Self::Special2,
            _ => Self::Custom(s),
        }
    }
}

impl From<PageKind> for String {
    fn from(kind: PageKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for PageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Placement of a page center in world coordinates; `rot` is in degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WorldPlacement {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub rot: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageSize {
    pub w: f64,
    pub h: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
}

impl From<PathPoint> for Point {
    fn from(p: PathPoint) -> Self {
        Point::new(p.x, p.y)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageDescriptor {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PageKind,
    pub world: WorldPlacement,
    pub size: PageSize,
    /// Absolute world coordinates.
    #[serde(rename = "scrollPath", default)]
    pub scroll_path: Vec<PathPoint>,
}

impl PageDescriptor {
    pub fn center(&self) -> Point {
        Point::new(self.world.x, self.world.y)
    }

    /// Where the camera looks when it centers on this page: the first path point, else the
    /// page center.
    pub fn anchor_point(&self) -> Point {
        self.scroll_path
            .first()
            .map(|p| Point::from(*p))
            .unwrap_or_else(|| self.center())
    }

    pub fn has_path(&self) -> bool {
        !self.scroll_path.is_empty()
    }

    /// Special type, or any page that carries a motion path.
    pub fn drives_scroll(&self) -> bool {
        self.kind.is_special() || self.has_path()
    }

    /// Path-following rotation applies only to `special2`; everything else with a path behaves
    /// as `special1`.
    pub fn rotates_with_path(&self) -> bool {
        self.kind == PageKind::Special2
    }

    pub fn rect(&self) -> Rect {
        centered_rect(self.center(), self.size.w, self.size.h)
    }

    fn validate(&self) -> PagewalkResult<()> {
        if self.id.trim().is_empty() {
            return Err(PagewalkError::dataset("page id must be non-empty"));
        }
        let finite = [self.world.x, self.world.y, self.world.rot]
            .iter()
            .chain(self.scroll_path.iter().flat_map(|p| [&p.x, &p.y]))
            .all(|v| v.is_finite());
        if !finite {
            return Err(PagewalkError::dataset(format!(
                "page '{}' has non-finite coordinates",
                self.id
            )));
        }
        if !(self.size.w.is_finite() && self.size.w > 0.0)
            || !(self.size.h.is_finite() && self.size.h > 0.0)
        {
            return Err(PagewalkError::dataset(format!(
                "page '{}' size must be finite and > 0",
                self.id
            )));
        }
        Ok(())
    }
}

/// Ordered, read-only page table.
#[derive(Clone, Debug)]
pub struct PageDataset {
    pages: Vec<PageDescriptor>,
    by_id: HashMap<String, usize>,
}

impl PageDataset {
    pub fn from_pages(pages: Vec<PageDescriptor>) -> PagewalkResult<Self> {
        if pages.is_empty() {
            return Err(PagewalkError::dataset("dataset has no pages"));
        }
        let mut by_id = HashMap::with_capacity(pages.len());
        for (i, p) in pages.iter().enumerate() {
            p.validate()?;
            if by_id.insert(p.id.clone(), i).is_some() {
                return Err(PagewalkError::dataset(format!("duplicate page id '{}'", p.id)));
            }
        }
        Ok(Self { pages, by_id })
    }

    pub fn from_json_str(text: &str) -> PagewalkResult<Self> {
        let pages: Vec<PageDescriptor> = serde_json::from_str(text)
            .map_err(|e| PagewalkError::dataset(format!("parse pages: {e}")))?;
        Self::from_pages(pages)
    }

    pub fn from_reader<R: Read>(reader: R) -> PagewalkResult<Self> {
        let pages: Vec<PageDescriptor> = serde_json::from_reader(reader)
            .map_err(|e| PagewalkError::dataset(format!("parse pages: {e}")))?;
        Self::from_pages(pages)
    }

    #[tracing::instrument]
    pub fn load(path: &Path) -> PagewalkResult<Self> {
        let file = std::fs::File::open(path).map_err(|e| {
            PagewalkError::dataset(format!("open dataset '{}': {e}", path.display()))
        })?;
        let ds = Self::from_reader(std::io::BufReader::new(file))?;
        tracing::debug!(pages = ds.len(), "dataset loaded");
        Ok(ds)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&PageDescriptor> {
        self.by_id.get(id).map(|&i| &self.pages[i])
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn ids(&self) -> impl ExactSizeIterator<Item = &str> {
        self.pages.iter().map(|p| p.id.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PageDescriptor> {
        self.pages.iter()
    }

    pub fn pages(&self) -> &[PageDescriptor] {
        &self.pages
    }

    pub fn into_pages(self) -> Vec<PageDescriptor> {
        self.pages
    }

    pub fn anchor_point(&self, id: &str) -> Option<Point> {
        self.get(id).map(PageDescriptor::anchor_point)
    }

    /// Union of all page rectangles.
    pub fn world_bounds(&self) -> Option<WorldBounds> {
        WorldBounds::from_rects(self.pages.iter().map(PageDescriptor::rect))
    }

    pub fn to_json_pretty(&self) -> PagewalkResult<String> {
        Ok(serde_json::to_string_pretty(&self.pages)?)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dataset/mod.rs"]
mod tests;
