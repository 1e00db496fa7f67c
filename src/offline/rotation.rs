//! Rotation patches: a plain-text list of page ids (or `pA-pB` ranges) each followed by a
//! `rot: N` line, applied in bulk to a dataset file.
//!
//! ```text
//! p17-p19
//! rot: 90
//! p42
//! rot: 180
//! ```

use std::{collections::BTreeMap, path::Path};

use crate::{
    dataset::PageDataset,
    foundation::error::{PagewalkError, PagewalkResult},
};

/// Page id to rotation in degrees.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RotationPatch {
    rotations: BTreeMap<String, f64>,
}

/// What [`apply_rotation_file`] changed.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct RotationReport {
    /// `(id, rot)` for every page that was updated, in dataset order.
    pub updated: Vec<(String, f64)>,
    /// Patch ids with no matching page.
    pub unknown: Vec<String>,
}

impl RotationPatch {
    /// Parse patch text. Blank lines are ignored; lines pair up as target then rotation. A pair
    /// whose second line carries no `rot:` value is skipped.
    pub fn parse(text: &str) -> PagewalkResult<Self> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let mut rotations = BTreeMap::new();
        for pair in lines.chunks(2) {
            let [target, rot_line] = pair else {
                tracing::warn!(line = pair[0], "rotation target without a rot line");
                break;
            };
            let Some(rot) = parse_rot(rot_line) else {
                tracing::warn!(target = *target, line = *rot_line, "rot line not understood, skipped");
                continue;
            };
            for id in expand_target(target)? {
                rotations.insert(id, rot);
            }
        }
        Ok(Self { rotations })
    }

    pub fn len(&self) -> usize {
        self.rotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rotations.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.rotations.get(id).copied()
    }

    /// Overwrite `world.rot` of every listed page.
    pub fn apply(&self, dataset: PageDataset) -> PagewalkResult<(PageDataset, RotationReport)> {
        let mut report = RotationReport::default();
        let mut pages = dataset.into_pages();
        for page in &mut pages {
            if let Some(rot) = self.get(&page.id) {
                page.world.rot = rot;
                report.updated.push((page.id.clone(), rot));
            }
        }
        report.unknown = self
            .rotations
            .keys()
            .filter(|id| !pages.iter().any(|p| &p.id == *id))
            .cloned()
            .collect();
        Ok((PageDataset::from_pages(pages)?, report))
    }
}

/// Case-insensitive `rot: <number>`.
fn parse_rot(line: &str) -> Option<f64> {
    let lower = line.to_ascii_lowercase();
    let at = lower.find("rot:")?;
    let rest = line[at + 4..].trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

fn page_number(id: &str) -> Option<u32> {
    id.trim().strip_prefix('p')?.parse().ok()
}

fn expand_target(target: &str) -> PagewalkResult<Vec<String>> {
    let Some((start, end)) = target.split_once('-') else {
        return Ok(vec![target.to_string()]);
    };
    let (Some(a), Some(b)) = (page_number(start), page_number(end)) else {
        return Err(PagewalkError::validation(format!(
            "bad page range '{target}', expected pA-pB"
        )));
    };
    if a > b {
        return Err(PagewalkError::validation(format!(
            "page range '{target}' runs backwards"
        )));
    }
    Ok((a..=b).map(|n| format!("p{n}")).collect())
}

/// Read `patch_path`, apply it to the dataset at `dataset_path` and rewrite that file with
/// two-space indentation.
#[tracing::instrument]
pub fn apply_rotation_file(patch_path: &Path, dataset_path: &Path) -> PagewalkResult<RotationReport> {
    let text = std::fs::read_to_string(patch_path)?;
    let patch = RotationPatch::parse(&text)?;
    let dataset = PageDataset::load(dataset_path)?;
    let (dataset, report) = patch.apply(dataset)?;
    std::fs::write(dataset_path, dataset.to_json_pretty()?)?;
    tracing::info!(
        updated = report.updated.len(),
        unknown = report.unknown.len(),
        "rotation patch applied"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/offline/rotation.rs"]
mod tests;
