use std::cell::OnceCell;

use image::{GrayImage, RgbImage};

use super::comparator;

/// A frame picked by the sampler, together with lazily derived views of it
#[derive(Debug, Clone)]
pub struct SampledFrame {
    /// Absolute frame index in the source video
    pub index: u64,
    /// Decoded pixels
    pub image: RgbImage,
    gray: OnceCell<GrayImage>,
    quality: OnceCell<f64>,
}

impl SampledFrame {
    pub fn new(index: u64, image: RgbImage) -> Self {
        Self {
            index,
            image,
            gray: OnceCell::new(),
            quality: OnceCell::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Grayscale copy, computed once
    pub fn gray(&self) -> &GrayImage {
        self.gray.get_or_init(|| comparator::to_grayscale(&self.image))
    }

    /// Laplacian variance of the frame at its own size, computed once
    pub fn quality(&self) -> f64 {
        *self.quality.get_or_init(|| comparator::quality(self.gray()))
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}
