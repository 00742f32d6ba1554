use ndarray::{Array2, ArrayView2, Zip};
use tracing::{debug, instrument};

use crate::image_pipeline::buffer::RawImage;
use crate::image_pipeline::common::error::{FusionError, Result};
use crate::image_pipeline::mask::config::MaskConfig;
use crate::image_pipeline::mask::grayscale::to_grayscale;
use crate::image_pipeline::mask::morphology::{dilate, StructuringElement};

/// Binary per-pixel mask (0.0 or 1.0). A set pixel is taken from the ambient
/// base layer instead of the detail-transferred composite. The same mask
/// applies to every channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactMask {
    data: Array2<f64>,
}

impl ArtifactMask {
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn is_masked(&self, row: usize, col: usize) -> bool {
        self.data[[row, col]] > 0.0
    }

    pub fn masked_count(&self) -> usize {
        self.data.iter().filter(|&&v| v > 0.0).count()
    }
}

/// Flags flash shadows and specular highlights from the raw image pair.
///
/// Shadow: `gray(flash) - gray(ambient) <= shadow_threshold`.
/// Specular: `gray(flash) / max(gray(flash)) > specular_fraction`.
/// The union is dilated with an elliptical element of `dilation_size`.
#[instrument(skip_all, fields(height = ambient_raw.height(), width = ambient_raw.width()))]
pub fn build_mask(
    ambient_raw: &RawImage,
    flash_raw: &RawImage,
    config: &MaskConfig,
) -> Result<ArtifactMask> {
    config.validate()?;

    let gray_ambient = to_grayscale("ambient_raw", ambient_raw)?;
    let gray_flash = to_grayscale("flash_raw", flash_raw)?;
    if gray_ambient.dim() != gray_flash.dim() {
        let (ah, aw) = gray_ambient.dim();
        let (fh, fw) = gray_flash.dim();
        return Err(FusionError::ShapeMismatch {
            expected: (ah, aw, ambient_raw.channels()),
            found: (fh, fw, flash_raw.channels()),
        });
    }

    let flash_max = gray_flash.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    // A black flash frame has no highlights to reject.
    let specular_scale = if flash_max > 0.0 { Some(flash_max) } else { None };

    let mut flags = Array2::<u8>::zeros(gray_flash.dim());
    Zip::from(&mut flags)
        .and(&gray_ambient)
        .and(&gray_flash)
        .for_each(|flag, &ambient, &flash| {
            let shadow = flash - ambient <= config.shadow_threshold;
            let specular =
                specular_scale.is_some_and(|max| flash / max > config.specular_fraction);
            if shadow || specular {
                *flag = u8::MAX;
            }
        });

    let (w, h) = config.dilation_size;
    let dilated = dilate(flags.view(), &StructuringElement::ellipse(w, h));

    let mask = ArtifactMask {
        data: dilated.mapv(|v| f64::from(v) / f64::from(u8::MAX)),
    };
    debug!(masked = mask.masked_count(), "Artifact mask built");
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn rgb(height: usize, width: usize, value: f64) -> Array3<f64> {
        Array3::from_elem((height, width, 3), value)
    }

    #[test]
    fn test_saturated_flash_block_is_masked() {
        let ambient = RawImage::new(rgb(40, 40, 100.0));
        let mut flash = rgb(40, 40, 120.0);
        for i in 15..25 {
            for j in 10..20 {
                for c in 0..3 {
                    flash[[i, j, c]] = 255.0;
                }
            }
        }
        let flash = RawImage::new(flash);

        let mask = build_mask(&ambient, &flash, &MaskConfig::default()).unwrap();

        for i in 15..25 {
            for j in 10..20 {
                assert!(mask.is_masked(i, j), "({i}, {j}) not masked");
            }
        }
        assert!(!mask.is_masked(0, 0));
        assert!(!mask.is_masked(39, 39));
        assert!(!mask.is_masked(20, 30));
        // Dilation adds at most two pixels on each side of the block.
        assert!(mask.masked_count() > 100);
        assert!(mask.masked_count() <= 14 * 14);
    }

    #[test]
    fn test_flash_shadow_is_masked() {
        let ambient = RawImage::new(rgb(20, 20, 150.0));
        let mut flash = rgb(20, 20, 160.0);
        for c in 0..3 {
            flash[[10, 10, c]] = 90.0;
        }
        // A bright corner keeps the interior below the specular fraction.
        for c in 0..3 {
            flash[[0, 19, c]] = 255.0;
        }
        let flash = RawImage::new(flash);
        let config = MaskConfig {
            specular_fraction: 0.99,
            ..MaskConfig::default()
        };

        let mask = build_mask(&ambient, &flash, &config).unwrap();

        assert!(mask.is_masked(10, 10));
        assert!(mask.is_masked(9, 10));
        assert!(!mask.is_masked(15, 3));
    }

    #[test]
    fn test_shadow_threshold_is_inclusive() {
        let ambient = RawImage::from_plane(Array2::from_elem((3, 3), 100.0));
        let mut flash = Array2::from_elem((3, 3), 60.0);
        flash[[1, 1]] = 50.0;
        let flash = RawImage::from_plane(flash);
        let config = MaskConfig {
            specular_fraction: 2.0,
            dilation_size: (1, 1),
            ..MaskConfig::default()
        };

        let mask = build_mask(&ambient, &flash, &config).unwrap();

        assert_eq!(mask.masked_count(), 1);
        assert!(mask.is_masked(1, 1));
    }

    #[test]
    fn test_rounded_luma_lands_on_shadow_threshold() {
        // Flash luma 50.299 rounds to 50, exactly 50 below the ambient.
        let ambient = RawImage::new(rgb(3, 3, 100.0));
        let mut flash = rgb(3, 3, 60.0);
        flash[[1, 1, 0]] = 51.0;
        flash[[1, 1, 1]] = 50.0;
        flash[[1, 1, 2]] = 50.0;
        let config = MaskConfig {
            specular_fraction: 2.0,
            dilation_size: (1, 1),
            ..MaskConfig::default()
        };

        let mask = build_mask(&ambient, &RawImage::new(flash), &config).unwrap();

        assert_eq!(mask.masked_count(), 1);
        assert!(mask.is_masked(1, 1));
    }

    #[test]
    fn test_black_flash_has_no_specular_pixels() {
        let ambient = RawImage::from_plane(Array2::zeros((4, 4)));
        let flash = RawImage::from_plane(Array2::zeros((4, 4)));

        let mask = build_mask(&ambient, &flash, &MaskConfig::default()).unwrap();

        assert_eq!(mask.masked_count(), 0);
    }

    #[test]
    fn test_mask_values_are_binary() {
        let ambient = RawImage::new(rgb(6, 6, 10.0));
        let mut flash = rgb(6, 6, 20.0);
        flash[[2, 2, 0]] = 250.0;
        let mask = build_mask(&ambient, &RawImage::new(flash), &MaskConfig::default()).unwrap();

        assert!(mask.view().iter().all(|&v| v == 0.0 || v == 1.0));
        assert!(mask.masked_count() > 0);
    }

    #[test]
    fn test_mismatched_raw_pair_is_rejected() {
        let ambient = RawImage::new(rgb(4, 6, 10.0));
        let flash = RawImage::new(rgb(6, 4, 10.0));

        let err = build_mask(&ambient, &flash, &MaskConfig::default()).unwrap_err();

        assert!(matches!(err, FusionError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_zero_dilation_size_is_rejected() {
        let image = RawImage::from_plane(Array2::zeros((2, 2)));
        let config = MaskConfig {
            dilation_size: (0, 4),
            ..MaskConfig::default()
        };
        assert!(matches!(
            build_mask(&image, &image, &config),
            Err(FusionError::InvalidInput { .. })
        ));
    }
}
