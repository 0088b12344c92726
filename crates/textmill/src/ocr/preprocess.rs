//! Page-image preprocessing for OCR accuracy.
//!
//! Pure transform: grayscale, median denoise, then adaptive local
//! thresholding to separate glyphs from background under uneven lighting
//! and scan artifacts. Never fails the pipeline: on any internal error the
//! original image is returned unchanged.

use image::DynamicImage;
use imageproc::contrast::adaptive_threshold;
use imageproc::filter::median_filter;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Local threshold window radius; a radius of 5 gives an 11x11 block.
const THRESHOLD_BLOCK_RADIUS: u32 = 5;

/// Median denoise radius (3x3 neighborhood).
const DENOISE_RADIUS: u32 = 1;

/// Prepare a rasterized page for recognition.
pub fn preprocess(image: &DynamicImage) -> DynamicImage {
    if image.width() == 0 || image.height() == 0 {
        tracing::warn!("skipping preprocessing of degenerate page image");
        return image.clone();
    }

    match catch_unwind(AssertUnwindSafe(|| {
        let gray = image.to_luma8();
        let denoised = median_filter(&gray, DENOISE_RADIUS, DENOISE_RADIUS);
        adaptive_threshold(&denoised, THRESHOLD_BLOCK_RADIUS)
    })) {
        Ok(binary) => DynamicImage::ImageLuma8(binary),
        Err(_) => {
            tracing::warn!("image preprocessing failed, using original image");
            image.clone()
        }
    }
}
