//! Joint bilateral filter configuration

use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::error::{FusionError, Result};

/// Spatial extent and sensitivity of one filtering pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Half-size of the square window; the footprint is `(2r+1)²`.
    pub window_radius: usize,
    /// Standard deviation of the spatial Gaussian, in pixels.
    pub spatial_sigma: f64,
    /// Standard deviation of the range Gaussian, in normalized intensity.
    pub range_sigma: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            window_radius: 11,
            spatial_sigma: 3.0,
            range_sigma: 0.1,
        }
    }
}

impl FilterConfig {
    pub fn new(window_radius: usize, spatial_sigma: f64, range_sigma: f64) -> Self {
        Self {
            window_radius,
            spatial_sigma,
            range_sigma,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (name, sigma) in [
            ("spatial_sigma", self.spatial_sigma),
            ("range_sigma", self.range_sigma),
        ] {
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(FusionError::invalid_input(
                    "config",
                    format!("{name} must be positive and finite, got {sigma}"),
                ));
            }
        }
        Ok(())
    }
}
