use tracing::debug;

use crate::image_pipeline::buffer::NormalizedImage;
use crate::image_pipeline::common::error::{FusionError, Result};
use crate::image_pipeline::filter::bilateral::joint_bilateral_filter;
use crate::image_pipeline::filter::config::FilterConfig;

/// Applies the joint bilateral filter to each channel of `signal`, guided by
/// the channel with the same index in `guide`. Channels never mix.
pub fn filter_color(
    signal: &NormalizedImage,
    guide: &NormalizedImage,
    config: &FilterConfig,
) -> Result<NormalizedImage> {
    if signal.dim() != guide.dim() {
        return Err(FusionError::invalid_input(
            "guide",
            format!(
                "shape {:?} does not match signal shape {:?}",
                guide.dim(),
                signal.dim()
            ),
        ));
    }
    config.validate()?;

    let planes = (0..signal.channels())
        .map(|c| {
            debug!(channel = c, "Filtering channel");
            joint_bilateral_filter(&signal.channel(c), &guide.channel(c), config)
        })
        .collect::<Result<Vec<_>>>()?;

    NormalizedImage::from_planes(&planes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn image(data: Array3<f64>) -> NormalizedImage {
        NormalizedImage::new("test", data).unwrap()
    }

    #[test]
    fn test_each_channel_filtered_independently() {
        let data = Array3::from_shape_fn((6, 6, 3), |(i, j, c)| match c {
            0 => 0.25,
            1 => ((i + j) % 2) as f64,
            _ => 0.5,
        });
        let input = image(data);
        let config = FilterConfig::new(1, 1.0, 0.2);

        let out = filter_color(&input, &input, &config).unwrap();

        assert_eq!(out.dim(), (6, 6, 3));
        assert!(out.view().index_axis(ndarray::Axis(2), 0).iter().all(|&v| v == 0.25));
        assert!(out.view().index_axis(ndarray::Axis(2), 2).iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_matches_single_channel_kernel() {
        let signal = image(Array3::from_shape_fn((5, 4, 2), |(i, j, c)| {
            ((i * 7 + j * 3 + c * 5) % 11) as f64 / 10.0
        }));
        let guide = image(Array3::from_shape_fn((5, 4, 2), |(i, j, c)| {
            ((i * 2 + j * 5 + c) % 7) as f64 / 6.0
        }));
        let config = FilterConfig::new(2, 1.5, 0.3);

        let out = filter_color(&signal, &guide, &config).unwrap();

        for c in 0..2 {
            let expected =
                joint_bilateral_filter(&signal.channel(c), &guide.channel(c), &config).unwrap();
            assert_eq!(out.channel(c), expected);
        }
    }

    #[test]
    fn test_channel_count_mismatch_is_rejected() {
        let signal = image(Array3::zeros((4, 4, 3)));
        let guide = image(Array3::zeros((4, 4, 1)));

        let err = filter_color(&signal, &guide, &FilterConfig::default()).unwrap_err();

        assert!(matches!(err, FusionError::InvalidInput { .. }));
    }
}
