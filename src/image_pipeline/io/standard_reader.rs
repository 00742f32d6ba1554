//! Image reader built on the `image` crate.
//!
//! Color inputs are decoded to three 8-bit RGB channels, grayscale inputs to
//! a single channel. Samples keep their 0–255 scale; normalization is left
//! to the caller.

use std::path::Path;

use image::DynamicImage;
use ndarray::Array3;
use tracing::debug;

use crate::image_pipeline::buffer::RawImage;
use crate::image_pipeline::common::error::{FusionError, Result};
use crate::image_pipeline::io::reader::ImageReader;

/// Extensions accepted for input images.
const SUPPORTED_INPUT_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "tif", "tiff"];

/// Whether `path` has an extension the reader accepts (case-insensitive).
pub fn is_supported_input(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_INPUT_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

pub struct StandardImageReader;

impl ImageReader for StandardImageReader {
    fn read_image(&self, data: &[u8]) -> Result<RawImage> {
        debug!("Decoding image, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| FusionError::DecodeError(e.to_string()))?;

        let width = decoded.width() as usize;
        let height = decoded.height() as usize;
        debug!("Decoded image: {}x{} ({:?})", width, height, decoded.color());

        let (channels, samples) = interleaved_samples(decoded);
        let array = Array3::from_shape_vec((height, width, channels), samples)
            .map_err(|e| FusionError::DecodeError(e.to_string()))?;

        Ok(RawImage::new(array.mapv(f64::from)))
    }
}

fn interleaved_samples(decoded: DynamicImage) -> (usize, Vec<u8>) {
    if decoded.color().has_color() {
        (3, decoded.to_rgb8().into_raw())
    } else {
        (1, decoded.to_luma8().into_raw())
    }
}
