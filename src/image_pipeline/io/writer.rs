use std::io::Write;

use crate::image_pipeline::buffer::RawImage;
use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::io::types::OutputConfig;

pub trait ImageWriter {
    fn write_image(&self, image: &RawImage, output: &mut dyn Write, config: &OutputConfig) -> Result<()>;
}
