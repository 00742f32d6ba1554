//! Image I/O module
//!
//! Decoding of encoded input images into raw sample arrays and encoding of
//! composites to PNG or TIFF.

mod reader;
mod standard_reader;
mod standard_writer;
pub mod types;
mod writer;

pub use reader::ImageReader;
pub use standard_reader::{is_supported_input, StandardImageReader};
pub use standard_writer::{to_u8_samples, StandardImageWriter};
pub use types::{OutputConfig, OutputConfigBuilder, OutputFormat, TiffCompression};
pub use writer::ImageWriter;
