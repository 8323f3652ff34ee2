//! Template storage: named reference images with precomputed grayscale kernels.

use super::error::{VisionError, VisionResult};
use image::{GrayImage, RgbImage};
use std::collections::HashMap;
use std::path::Path;

/// A named reference image and its derived grayscale search kernel.
///
/// Created once at load time and read-only thereafter. All matching runs on
/// the grayscale kernel.
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    pub image: RgbImage,
    pub gray: GrayImage,
    pub width: u32,
    pub height: u32,
}

/// Owns the mapping from marker name to template.
#[derive(Debug, Default)]
pub struct TemplateLibrary {
    templates: HashMap<String, Template>,
}

impl TemplateLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load one template image from disk under the given name.
    ///
    /// Loading is all-or-nothing per call: an unreadable or undecodable file
    /// is reported and leaves prior state untouched.
    pub fn load(&mut self, name: &str, path: impl AsRef<Path>) -> VisionResult<()> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|source| VisionError::TemplateLoadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        self.insert_image(name, decoded.to_rgb8());
        log::info!(
            "Loaded template '{}' from {:?} ({}x{})",
            name,
            path,
            self.templates[name].width,
            self.templates[name].height
        );
        Ok(())
    }

    /// Register an in-memory image as a template, deriving its grayscale
    /// kernel. Replaces any previous template with the same name.
    pub fn insert_image(&mut self, name: &str, image: RgbImage) {
        let gray = image::imageops::grayscale(&image);
        let (width, height) = image.dimensions();
        self.templates.insert(
            name.to_string(),
            Template {
                name: name.to_string(),
                image,
                gray,
                width,
                height,
            },
        );
    }

    /// Load every `.png` in a directory, named by file stem. A single bad
    /// file is logged and skipped; the return value counts successes.
    pub fn load_dir(&mut self, directory: impl AsRef<Path>) -> VisionResult<usize> {
        let directory = directory.as_ref();
        let entries =
            std::fs::read_dir(directory).map_err(|source| VisionError::TemplateDirUnreadable {
                path: directory.to_path_buf(),
                source,
            })?;

        let mut loaded = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("png") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned) else {
                continue;
            };
            match self.load(&name, &path) {
                Ok(()) => loaded += 1,
                Err(e) => log::warn!("Skipping template {:?}: {}", path, e),
            }
        }
        log::info!("Loaded {} template(s) from {:?}", loaded, directory);
        Ok(loaded)
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Shape of a loaded template as (height, width), or `None` if absent.
    pub fn shape_of(&self, name: &str) -> Option<(u32, u32)> {
        self.templates.get(name).map(|t| (t.height, t.width))
    }

    pub fn count(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
