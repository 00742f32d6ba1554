use std::io::{Cursor, Write};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use tracing::debug;

use crate::image_pipeline::buffer::RawImage;
use crate::image_pipeline::common::error::{FusionError, Result};
use crate::image_pipeline::io::types::{OutputConfig, OutputFormat, TiffCompression};
use crate::image_pipeline::io::writer::ImageWriter;

/// Rounds and saturates every sample to `u8`, interleaved channel-last.
pub fn to_u8_samples(image: &RawImage) -> Vec<u8> {
    image
        .view()
        .iter()
        .map(|&v| v.round().clamp(0.0, 255.0) as u8)
        .collect()
}

/// Writes 8-bit PNG or TIFF, one or three channels.
pub struct StandardImageWriter;

impl ImageWriter for StandardImageWriter {
    fn write_image(&self, image: &RawImage, output: &mut dyn Write, config: &OutputConfig) -> Result<()> {
        let (height, width, channels) = image.dim();
        debug!("Encoding {:?} image: {}x{}x{}", config.format, width, height, channels);

        if channels != 1 && channels != 3 {
            return Err(FusionError::UnsupportedFormat(format!(
                "cannot encode {channels} channels"
            )));
        }

        let samples = to_u8_samples(image);
        let buffer = match config.format {
            OutputFormat::Png => encode_png(&samples, width, height, channels)?,
            OutputFormat::Tiff => encode_tiff(&samples, width, height, channels, config)?,
        };

        output.write_all(&buffer)?;

        debug!("Encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}

fn encode_png(samples: &[u8], width: usize, height: usize, channels: usize) -> Result<Vec<u8>> {
    let color = if channels == 3 {
        ExtendedColorType::Rgb8
    } else {
        ExtendedColorType::L8
    };

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(samples, width as u32, height as u32, color)
        .map_err(|e| FusionError::EncodeError(e.to_string()))?;
    Ok(buffer)
}

fn encode_tiff(
    samples: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    config: &OutputConfig,
) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    let compression = match config.compression {
        TiffCompression::None => tiff::encoder::Compression::Uncompressed,
        TiffCompression::Lzw => tiff::encoder::Compression::Lzw,
        TiffCompression::DeflateFast => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Fast),
        TiffCompression::DeflateBalanced => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Balanced),
        TiffCompression::DeflateBest => tiff::encoder::Compression::Deflate(tiff::encoder::compression::DeflateLevel::Best),
    };

    {
        let mut encoder = tiff::encoder::TiffEncoder::new(Cursor::new(&mut buffer))
            .map_err(|e| FusionError::EncodeError(e.to_string()))?
            .with_compression(compression);

        if let Some(predictor_val) = config.predictor {
            let predictor = match predictor_val {
                2 => tiff::tags::Predictor::Horizontal,
                _ => tiff::tags::Predictor::None,
            };
            encoder = encoder.with_predictor(predictor);
        }

        let (width, height) = (width as u32, height as u32);
        let written = if channels == 3 {
            encoder.write_image::<tiff::encoder::colortype::RGB8>(width, height, samples)
        } else {
            encoder.write_image::<tiff::encoder::colortype::Gray8>(width, height, samples)
        };
        written.map_err(|e| FusionError::EncodeError(e.to_string()))?;
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::io::{ImageReader, StandardImageReader};
    use ndarray::Array3;

    fn gradient(channels: usize) -> RawImage {
        RawImage::new(Array3::from_shape_fn((5, 7, channels), |(i, j, c)| {
            (i * 40 + j * 10 + c * 3) as f64
        }))
    }

    #[test]
    fn test_samples_round_and_saturate() {
        let image = RawImage::new(Array3::from_shape_vec((1, 5, 1), vec![-3.0, 12.4, 12.5, 254.6, 400.0]).unwrap());
        assert_eq!(to_u8_samples(&image), vec![0, 12, 13, 255, 255]);
    }

    #[test]
    fn test_png_output_decodes_to_same_samples() {
        let image = gradient(3);
        let mut encoded = Vec::new();

        StandardImageWriter
            .write_image(&image, &mut encoded, &OutputConfig::default())
            .unwrap();

        let decoded = StandardImageReader.read_image(&encoded).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_tiff_output_with_each_compression() {
        let image = gradient(3);
        for compression in [
            TiffCompression::None,
            TiffCompression::Lzw,
            TiffCompression::DeflateFast,
            TiffCompression::DeflateBalanced,
            TiffCompression::DeflateBest,
        ] {
            let config = OutputConfig::builder()
                .format(OutputFormat::Tiff)
                .compression(compression)
                .build();
            let mut encoded = Vec::new();

            StandardImageWriter.write_image(&image, &mut encoded, &config).unwrap();

            assert_eq!(&encoded[..2], b"II");
            let decoded = StandardImageReader.read_image(&encoded).unwrap();
            assert_eq!(decoded, image, "{compression:?}");
        }
    }

    #[test]
    fn test_grayscale_png() {
        let image = gradient(1);
        let mut encoded = Vec::new();

        StandardImageWriter
            .write_image(&image, &mut encoded, &OutputConfig::default())
            .unwrap();

        assert_eq!(StandardImageReader.read_image(&encoded).unwrap(), image);
    }

    #[test]
    fn test_two_channels_unsupported() {
        let image = RawImage::new(Array3::zeros((2, 2, 2)));
        let err = StandardImageWriter
            .write_image(&image, &mut Vec::new(), &OutputConfig::default())
            .unwrap_err();
        assert!(matches!(err, FusionError::UnsupportedFormat(_)));
    }
}
