//! Overview thumbnails: `<stem>_thumb.png` for png originals, `<stem>_thumb.jpg` for
//! everything else, scaled down to a fixed width and never enlarged.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::Context;
use image::{DynamicImage, ImageFormat, codecs::jpeg::JpegEncoder, imageops::FilterType};
use rayon::prelude::*;

use crate::foundation::error::{PagewalkError, PagewalkResult};

const SOURCE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThumbnailOptions {
    pub width: u32,
    pub jpeg_quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            width: 400,
            jpeg_quality: 60,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ThumbnailOutcome {
    pub source: PathBuf,
    pub output: PathBuf,
    pub original_bytes: u64,
    pub thumbnail_bytes: u64,
    pub width: u32,
    pub height: u32,
}

impl ThumbnailOutcome {
    /// Size reduction in percent; negative when the thumbnail came out larger.
    pub fn reduction_pct(&self) -> f64 {
        reduction(self.original_bytes, self.thumbnail_bytes)
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct ThumbnailReport {
    pub generated: Vec<ThumbnailOutcome>,
    /// `(source, error)` for files that could not be processed.
    pub failed: Vec<(PathBuf, String)>,
}

impl ThumbnailReport {
    pub fn total_original_bytes(&self) -> u64 {
        self.generated.iter().map(|o| o.original_bytes).sum()
    }

    pub fn total_thumbnail_bytes(&self) -> u64 {
        self.generated.iter().map(|o| o.thumbnail_bytes).sum()
    }

    pub fn saved_bytes(&self) -> i64 {
        self.total_original_bytes() as i64 - self.total_thumbnail_bytes() as i64
    }

    pub fn average_reduction_pct(&self) -> f64 {
        reduction(self.total_original_bytes(), self.total_thumbnail_bytes())
    }
}

fn reduction(original: u64, thumb: u64) -> f64 {
    if original == 0 {
        return 0.0;
    }
    (1.0 - thumb as f64 / original as f64) * 100.0
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

/// Numeric part of a `p<N>` file name, used for reading-order sorting.
fn page_number(path: &Path) -> u64 {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let Some(at) = stem.find('p') else {
        return 0;
    };
    let digits: String = stem[at + 1..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().unwrap_or(0)
}

/// Image files directly inside `dir`, in page order.
pub fn list_images(dir: &Path) -> PagewalkResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if extension_of(&path).is_some_and(|e| SOURCE_EXTENSIONS.contains(&e.as_str())) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| page_number(a).cmp(&page_number(b)).then_with(|| a.cmp(b)));
    Ok(files)
}

/// Where the thumbnail for `source` lands inside `out_dir`.
pub fn thumbnail_path(source: &Path, out_dir: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let ext = if extension_of(source).as_deref() == Some("png") {
        "png"
    } else {
        "jpg"
    };
    out_dir.join(format!("{stem}_thumb.{ext}"))
}

fn resize_to_width(img: DynamicImage, width: u32) -> DynamicImage {
    if img.width() <= width {
        return img;
    }
    let height = ((f64::from(img.height()) * f64::from(width) / f64::from(img.width())).round()
        as u32)
        .max(1);
    img.resize_exact(width, height, FilterType::Lanczos3)
}

/// Generate one thumbnail into `out_dir`.
pub fn generate_thumbnail(
    source: &Path,
    out_dir: &Path,
    opts: ThumbnailOptions,
) -> PagewalkResult<ThumbnailOutcome> {
    let original_bytes = std::fs::metadata(source)?.len();
    let img = image::open(source)
        .with_context(|| format!("decode '{}'", source.display()))?;
    let thumb = resize_to_width(img, opts.width);
    let output = thumbnail_path(source, out_dir);

    if output.extension().is_some_and(|e| e == "png") {
        thumb
            .save_with_format(&output, ImageFormat::Png)
            .with_context(|| format!("write '{}'", output.display()))?;
    } else {
        let mut w = BufWriter::new(File::create(&output)?);
        let encoder = JpegEncoder::new_with_quality(&mut w, opts.jpeg_quality);
        DynamicImage::ImageRgb8(thumb.to_rgb8())
            .write_with_encoder(encoder)
            .with_context(|| format!("encode '{}'", output.display()))?;
    }

    let thumbnail_bytes = std::fs::metadata(&output)?.len();
    tracing::debug!(
        source = %source.display(),
        original_bytes,
        thumbnail_bytes,
        "thumbnail written"
    );
    Ok(ThumbnailOutcome {
        source: source.to_path_buf(),
        output,
        original_bytes,
        thumbnail_bytes,
        width: thumb.width(),
        height: thumb.height(),
    })
}

/// Thumbnail every image in `images_dir`. Per-file failures are collected, not fatal.
#[tracing::instrument(skip(opts))]
pub fn generate_all(
    images_dir: &Path,
    out_dir: &Path,
    opts: ThumbnailOptions,
) -> PagewalkResult<ThumbnailReport> {
    if !images_dir.is_dir() {
        return Err(PagewalkError::asset(format!(
            "image directory '{}' not found",
            images_dir.display()
        )));
    }
    std::fs::create_dir_all(out_dir)?;
    let files = list_images(images_dir)?;
    tracing::info!(count = files.len(), width = opts.width, "generating thumbnails");

    let results: Vec<_> = files
        .par_iter()
        .map(|f| (f, generate_thumbnail(f, out_dir, opts)))
        .collect();

    let mut report = ThumbnailReport::default();
    for (source, result) in results {
        match result {
            Ok(outcome) => report.generated.push(outcome),
            Err(err) => {
                tracing::warn!(source = %source.display(), %err, "thumbnail failed");
                report.failed.push((source.clone(), err.to_string()));
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/offline/thumbnails.rs"]
mod tests;
