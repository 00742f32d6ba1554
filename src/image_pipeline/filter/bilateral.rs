//! Joint bilateral filter kernel.
//!
//! Each output sample is a weighted average of the signal over a square
//! window, where the weight of a neighbour is the product of its spatial
//! Gaussian weight and the similarity of its *guide* intensity to the guide
//! intensity at the center. Windows are clipped at the image border, never
//! padded.

use ndarray::{Array2, ArrayView2, Zip};
use tracing::{debug, instrument};

use crate::image_pipeline::buffer::NormalizedPlane;
use crate::image_pipeline::common::error::{FusionError, Result};
use crate::image_pipeline::filter::config::FilterConfig;
use crate::image_pipeline::filter::gaussian::GaussianWindow;

/// Filters `signal` using the edges of `guide`.
///
/// Both planes must have the same shape. With `guide == signal` this is the
/// ordinary bilateral filter.
///
/// # Errors
///
/// * `InvalidInput` naming `guide` when the shapes differ
/// * `InvalidInput` naming `config` when a sigma is not positive
#[instrument(skip_all, fields(
    height = signal.dim().0,
    width = signal.dim().1,
    radius = config.window_radius,
))]
pub fn joint_bilateral_filter(
    signal: &NormalizedPlane,
    guide: &NormalizedPlane,
    config: &FilterConfig,
) -> Result<NormalizedPlane> {
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

    // A window wider than the image clips to the same samples.
    let (height, width) = signal.dim();
    let radius = config.window_radius.min(height.max(width).saturating_sub(1));
    let window = GaussianWindow::new(radius, config.spatial_sigma);
    let signal = signal.view();
    let guide = guide.view();

    let mut output = Array2::<f64>::zeros(signal.dim());
    Zip::indexed(&mut output).par_for_each(|center, out| {
        *out = filter_pixel(signal, guide, &window, center, config);
    });

    debug!("Joint bilateral pass complete");
    // Weighted means of [0, 1] samples; the clamp only absorbs rounding.
    Ok(NormalizedPlane::from_trusted(output.mapv_into(|v| v.clamp(0.0, 1.0))))
}

/// Filtered value of the single pixel at `center`.
///
/// The window radius is taken from `window`; only `config.range_sigma` is
/// read from `config`.
///
/// # Panics
///
/// Panics if `signal` and `guide` differ in shape or `center` lies outside
/// them. [`joint_bilateral_filter`] checks both before calling this.
pub fn filter_pixel(
    signal: ArrayView2<'_, f64>,
    guide: ArrayView2<'_, f64>,
    window: &GaussianWindow,
    center: (usize, usize),
    config: &FilterConfig,
) -> f64 {
    let (height, width) = signal.dim();
    let (i, j) = center;
    let r = window.radius();

    let rows = (i.saturating_sub(r), (i + r).min(height - 1));
    let cols = (j.saturating_sub(r), (j + r).min(width - 1));

    let spatial = window.clipped(center, rows, cols);
    let signal_window = signal.slice(ndarray::s![rows.0..=rows.1, cols.0..=cols.1]);
    let guide_window = guide.slice(ndarray::s![rows.0..=rows.1, cols.0..=cols.1]);

    let guide_center = guide[[i, j]];
    let range_denom = 2.0 * config.range_sigma * config.range_sigma;

    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    Zip::from(&spatial)
        .and(&signal_window)
        .and(&guide_window)
        .for_each(|&g, &d, &c| {
            let diff = c - guide_center;
            let weight = g * (-(diff * diff) / range_denom).exp();
            weighted_sum += weight * d;
            weight_total += weight;
        });

    // The center contributes weight 1, so weight_total >= 1.
    weighted_sum / weight_total
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn plane(data: Array2<f64>) -> NormalizedPlane {
        NormalizedPlane::new("test", data).unwrap()
    }

    fn random_plane(height: usize, width: usize, seed: u64) -> NormalizedPlane {
        let mut rng = StdRng::seed_from_u64(seed);
        plane(Array2::from_shape_fn((height, width), |_| rng.random::<f64>()))
    }

    fn variance(values: ArrayView2<'_, f64>) -> f64 {
        let n = values.len() as f64;
        let mean = values.sum() / n;
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
    }

    #[test]
    fn test_radius_zero_is_identity() {
        let image = random_plane(9, 7, 1);
        let config = FilterConfig::new(0, 3.0, 0.1);

        let filtered = joint_bilateral_filter(&image, &image, &config).unwrap();

        assert_eq!(filtered, image);
    }

    #[test]
    fn test_flat_image_is_unchanged() {
        let image = plane(Array2::from_elem((5, 5), 0.5));
        let config = FilterConfig::new(1, 3.0, 0.1);

        let filtered = joint_bilateral_filter(&image, &image, &config).unwrap();

        assert!(filtered.view().iter().all(|&v| v == 0.5));
    }

    #[test]
    fn test_output_stays_within_window_range() {
        let signal = random_plane(12, 10, 7);
        let guide = random_plane(12, 10, 8);
        let config = FilterConfig::new(2, 1.5, 0.2);
        let r = config.window_radius;

        let filtered = joint_bilateral_filter(&signal, &guide, &config).unwrap();

        let d = signal.view();
        for ((i, j), &v) in filtered.view().indexed_iter() {
            let window = d.slice(ndarray::s![
                i.saturating_sub(r)..=(i + r).min(11),
                j.saturating_sub(r)..=(j + r).min(9)
            ]);
            let lo = window.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = window.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!(v >= lo - 1e-12 && v <= hi + 1e-12, "({i}, {j}) = {v} not in [{lo}, {hi}]");
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn test_self_guided_filter_preserves_rotational_symmetry() {
        let n = 9;
        let c = (n - 1) as f64 / 2.0;
        let image = plane(Array2::from_shape_fn((n, n), |(i, j)| {
            let d2 = (i as f64 - c).powi(2) + (j as f64 - c).powi(2);
            (d2 / 40.0).min(1.0)
        }));
        let config = FilterConfig::new(2, 2.0, 0.2);

        let filtered = joint_bilateral_filter(&image, &image, &config).unwrap();

        let f = filtered.view();
        let rotated = f.slice(ndarray::s![..;-1, ..;-1]);
        for (a, b) in f.iter().zip(rotated.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_larger_spatial_sigma_smooths_more() {
        let signal = random_plane(24, 24, 42);
        let guide = plane(Array2::from_elem((24, 24), 0.5));

        let variances: Vec<f64> = [0.5, 1.5, 4.0]
            .iter()
            .map(|&sigma| {
                let config = FilterConfig::new(3, sigma, 0.1);
                let out = joint_bilateral_filter(&signal, &guide, &config).unwrap();
                variance(out.view())
            })
            .collect();

        assert!(variances[0] < variance(signal.view()));
        assert!(variances[1] < variances[0]);
        assert!(variances[2] < variances[1]);
    }

    #[test]
    fn test_guide_edge_is_preserved() {
        // Signal is a noise-free step, guide has the same step: the step must survive.
        let step = Array2::from_shape_fn((8, 8), |(_, j)| if j < 4 { 0.1 } else { 0.9 });
        let image = plane(step);
        let config = FilterConfig::new(3, 3.0, 0.05);

        let filtered = joint_bilateral_filter(&image, &image, &config).unwrap();

        assert!((filtered.view()[[4, 3]] - 0.1).abs() < 1e-6);
        assert!((filtered.view()[[4, 4]] - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_filter_pixel_at_border_uses_clipped_window() {
        let signal = Array2::from_shape_fn((3, 3), |(i, j)| (i * 3 + j) as f64 / 8.0);
        let guide = Array2::from_elem((3, 3), 0.0);
        let config = FilterConfig::new(1, 1e6, 1.0);
        let window = GaussianWindow::new(1, config.spatial_sigma);

        // Near-flat spatial weights and a constant guide give the plain mean
        // of the clipped 2x2 corner window.
        let v = filter_pixel(signal.view(), guide.view(), &window, (0, 0), &config);
        let expected = (0.0 + 1.0 + 3.0 + 4.0) / 8.0 / 4.0;
        assert!((v - expected).abs() < 1e-9);
    }

    #[test]
    fn test_radius_beyond_image_matches_largest_useful_radius() {
        let image = random_plane(5, 5, 11);

        let huge = joint_bilateral_filter(&image, &image, &FilterConfig::new(10_000, 3.0, 0.1)).unwrap();
        let fitted = joint_bilateral_filter(&image, &image, &FilterConfig::new(4, 3.0, 0.1)).unwrap();

        assert_eq!(huge, fitted);
    }

    #[test]
    fn test_radius_near_usize_max_does_not_overflow() {
        let image = random_plane(3, 4, 12);
        let config = FilterConfig::new(usize::MAX / 2, 3.0, 0.1);

        let filtered = joint_bilateral_filter(&image, &image, &config).unwrap();

        assert_eq!(filtered.dim(), (3, 4));
    }

    #[test]
    fn test_shape_mismatch_names_guide() {
        let signal = plane(Array2::zeros((4, 5)));
        let guide = plane(Array2::zeros((5, 4)));

        let err = joint_bilateral_filter(&signal, &guide, &FilterConfig::default()).unwrap_err();

        assert!(matches!(err, FusionError::InvalidInput { ref argument, .. } if argument == "guide"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let image = plane(Array2::zeros((2, 2)));
        let config = FilterConfig::new(1, 3.0, 0.0);

        let err = joint_bilateral_filter(&image, &image, &config).unwrap_err();

        assert!(matches!(err, FusionError::InvalidInput { ref argument, .. } if argument == "config"));
    }
}
