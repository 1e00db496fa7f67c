use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

/// Answers whether an image exists and decodes at a relative asset path.
pub trait ImageProbe: Send + Sync {
    fn probe(&self, rel_path: &str) -> bool;
}

/// Probes files under a root directory by reading their image headers.
#[derive(Clone, Debug)]
pub struct FsImageProbe {
    root: PathBuf,
}

impl FsImageProbe {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageProbe for FsImageProbe {
    fn probe(&self, rel_path: &str) -> bool {
        let path = self.root.join(rel_path);
        let dims = image::ImageReader::open(&path)
            .and_then(|r| r.with_guessed_format())
            .map_err(image::ImageError::IoError)
            .and_then(|r| r.into_dimensions());
        match dims {
            Ok((w, h)) => {
                tracing::trace!(path = %path.display(), w, h, "image probe hit");
                true
            }
            Err(e) => {
                tracing::trace!(path = %path.display(), error = %e, "image probe miss");
                false
            }
        }
    }
}

/// In-memory probe over a fixed set of available paths; counts every probe it answers.
#[derive(Debug, Default)]
pub struct MemoryProbe {
    available: HashSet<String>,
    calls: AtomicUsize,
}

impl MemoryProbe {
    pub fn new<I, S>(available: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            available: available.into_iter().map(Into::into).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageProbe for MemoryProbe {
    fn probe(&self, rel_path: &str) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.available.contains(rel_path)
    }
}
