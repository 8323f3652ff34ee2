use image::{GrayImage, RgbImage};
use serde::Deserialize;
use std::time::SystemTime;

/// A capture rectangle in physical display coordinates, relative to the
/// primary display origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaptureRegion {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// One captured raster image plus the wall-clock time it was grabbed.
///
/// Frames are produced once per capture call and never mutated; grayscale
/// views are derived as separate buffers.
#[derive(Debug, Clone)]
pub struct Frame {
    image: RgbImage,
    captured_at: SystemTime,
}

impl Frame {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            captured_at: SystemTime::now(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn captured_at(&self) -> SystemTime {
        self.captured_at
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Grayscale view for matching; detection ignores color on purpose.
    pub fn to_gray(&self) -> GrayImage {
        image::imageops::grayscale(&self.image)
    }
}
