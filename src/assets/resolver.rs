use std::{
    collections::HashMap,
    sync::{Arc, Mutex, OnceLock, PoisonError},
};

use rayon::prelude::*;

use crate::{assets::probe::ImageProbe, config::ImageSettings};

/// Usable image reference for a page.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", content = "src", rename_all = "snake_case")]
pub enum ImageSource {
    /// Relative path of a file that decoded successfully.
    File(String),
    /// Inline SVG data URI naming the missing page.
    Placeholder(String),
}

impl ImageSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::File(s) | Self::Placeholder(s) => s,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder(_))
    }

    /// Lowercased file extension, with `jpeg` folded into `jpg`.
    pub fn extension(&self) -> Option<String> {
        let Self::File(path) = self else {
            return None;
        };
        let (_, ext) = path.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        Some(if ext == "jpeg" { "jpg".to_string() } else { ext })
    }
}

type Slot<T> = Arc<OnceLock<T>>;

/// Maps page ids to image sources by probing candidate extensions in order.
///
/// Results, including placeholders, are memoized for the lifetime of the resolver. Concurrent
/// resolutions of the same id share one slot, so the probe chain runs at most once per id.
pub struct ImageResolver {
    probe: Arc<dyn ImageProbe>,
    settings: ImageSettings,
    images: Mutex<HashMap<String, Slot<ImageSource>>>,
    thumbnails: Mutex<HashMap<String, Slot<Option<String>>>>,
}

impl std::fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResolver")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ImageResolver {
    pub fn new(probe: Arc<dyn ImageProbe>, settings: ImageSettings) -> Self {
        Self {
            probe,
            settings,
            images: Mutex::new(HashMap::new()),
            thumbnails: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &ImageSettings {
        &self.settings
    }

    pub fn resolve(&self, id: &str) -> ImageSource {
        let slot = slot_for(&self.images, id);
        slot.get_or_init(|| self.probe_chain(id)).clone()
    }

    /// Memoized result, without probing.
    pub fn cached(&self, id: &str) -> Option<ImageSource> {
        let map = self.images.lock().unwrap_or_else(PoisonError::into_inner);
        map.get(id).and_then(|slot| slot.get().cloned())
    }

    /// Resolve many ids in parallel; results are in input order.
    #[tracing::instrument(skip_all, fields(count = ids.len()))]
    pub fn preload<S>(&self, ids: &[S]) -> Vec<ImageSource>
    where
        S: AsRef<str> + Sync,
    {
        ids.par_iter().map(|id| self.resolve(id.as_ref())).collect()
    }

    /// Thumbnail paths in probe order. The primary extension follows the original image: png
    /// stays png, anything else (or an unresolved original) is looked up as jpg.
    pub fn thumbnail_candidates(&self, id: &str) -> [String; 2] {
        let original_png = self
            .cached(id)
            .and_then(|src| src.extension())
            .is_some_and(|ext| ext == "png");
        let (first, second) = if original_png {
            ("png", "jpg")
        } else {
            ("jpg", "png")
        };
        [
            self.thumbnail_path(id, first),
            self.thumbnail_path(id, second),
        ]
    }

    /// First loadable thumbnail; `None` means the original image stays in place.
    pub fn resolve_thumbnail(&self, id: &str) -> Option<String> {
        let slot = slot_for(&self.thumbnails, id);
        slot.get_or_init(|| {
            let found = self
                .thumbnail_candidates(id)
                .into_iter()
                .find(|path| self.probe.probe(path));
            if found.is_none() {
                tracing::debug!(id, "no thumbnail, keeping original");
            }
            found
        })
        .clone()
    }

    fn image_path(&self, id: &str, ext: &str) -> String {
        join_rel(&self.settings.image_dir, &format!("{id}.{ext}"))
    }

    fn thumbnail_path(&self, id: &str, ext: &str) -> String {
        join_rel(&self.settings.thumbnail_dir, &format!("{id}_thumb.{ext}"))
    }

    fn probe_chain(&self, id: &str) -> ImageSource {
        for ext in &self.settings.extensions {
            let path = self.image_path(id, ext);
            if self.probe.probe(&path) {
                tracing::debug!(id, %path, "image resolved");
                return ImageSource::File(path);
            }
        }
        tracing::warn!(id, "image missing for every extension, using placeholder");
        ImageSource::Placeholder(placeholder_uri(id))
    }
}

fn slot_for<T>(map: &Mutex<HashMap<String, Slot<T>>>, id: &str) -> Slot<T> {
    let mut map = map.lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(map.entry(id.to_string()).or_default())
}

fn join_rel(dir: &str, file: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        file.to_string()
    } else {
        format!("{dir}/{file}")
    }
}

/// Data URI for a dark card reading "Missing <id>".
pub fn placeholder_uri(id: &str) -> String {
    let svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"800\" height=\"1131\">\
<rect width=\"100%\" height=\"100%\" fill=\"#222\"/>\
<text x=\"50%\" y=\"50%\" fill=\"#aaa\" font-size=\"32\" text-anchor=\"middle\">Missing {id}</text></svg>"
    );
    format!("data:image/svg+xml;utf8,{}", encode_uri_component(&svg))
}

fn encode_uri_component(s: &str) -> String {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let mut out = String::with_capacity(s.len() * 3);
    for b in s.bytes() {
        let keep = b.is_ascii_alphanumeric()
            || matches!(b, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')');
        if keep {
            out.push(b as char);
        } else {
            out.push('%');
            out.push(HEX[usize::from(b >> 4)] as char);
            out.push(HEX[usize::from(b & 0x0f)] as char);
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/assets/resolver.rs"]
mod tests;
