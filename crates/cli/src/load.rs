use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::DynamicImage;
use imagedesk_core::{Desk, SourceImage};
use walkdir::WalkDir;

const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "webp"];

/// One decoded image from the scanned directory. The CLI is the "host":
/// it owns the pixels, the engine only sees borrowed views.
pub struct LoadedImage {
    pub id: i64,
    pub name: String,
    pub path: PathBuf,
    pub pixels: DynamicImage,
}

/// Walk `dir`, decode every supported image, and assign stable ids in
/// path order. Files that fail to decode are skipped with a warning.
pub fn load_directory(dir: &Path) -> Result<Vec<LoadedImage>> {
    if !dir.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SUPPORTED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        })
        .collect();
    paths.sort();

    let mut images = Vec::with_capacity(paths.len());
    for (index, path) in paths.into_iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match image::open(&path) {
            Ok(pixels) => images.push(LoadedImage {
                id: index as i64,
                name,
                path,
                pixels,
            }),
            Err(err) => eprintln!("warning: skipping {}: {err}", path.display()),
        }
    }

    if images.is_empty() {
        bail!("no decodable images found under {}", dir.display());
    }
    Ok(images)
}

/// Fingerprint the decoded images into a fresh engine snapshot.
pub fn desk_from(images: &[LoadedImage]) -> Result<Desk> {
    let sources: Vec<SourceImage<'_>> = images
        .iter()
        .map(|img| SourceImage {
            id: img.id,
            filename: &img.name,
            pixels: &img.pixels,
        })
        .collect();

    let mut desk = Desk::new();
    let outcome = desk.load(&sources);
    for (id, err) in &outcome.skipped {
        let name = images
            .iter()
            .find(|img| img.id == *id)
            .map(|img| img.name.as_str())
            .unwrap_or("?");
        eprintln!("warning: could not fingerprint {name}: {err}");
    }
    if outcome.loaded == 0 {
        bail!("none of the images could be fingerprinted");
    }
    Ok(desk)
}

/// Resolve a display path for an image id.
pub fn display_path(images: &[LoadedImage], id: i64) -> String {
    images
        .iter()
        .find(|img| img.id == id)
        .map(|img| img.path.display().to_string())
        .unwrap_or_else(|| "?".to_string())
}

/// Find the id of the image whose file name matches `name`.
pub fn find_by_name(images: &[LoadedImage], name: &str) -> Result<i64> {
    images
        .iter()
        .find(|img| img.name == name || img.path.ends_with(name))
        .map(|img| img.id)
        .with_context(|| format!("no image named {name} in the scanned directory"))
}
