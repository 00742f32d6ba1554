use crate::image_pipeline::buffer::RawImage;
use crate::image_pipeline::common::error::Result;

pub trait ImageReader {
    /// Decodes an encoded image into raw samples on its native 0–255 scale.
    fn read_image(&self, data: &[u8]) -> Result<RawImage>;
}
