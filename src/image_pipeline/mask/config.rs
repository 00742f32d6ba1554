//! Artifact mask configuration

use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::error::{FusionError, Result};

/// Thresholds for shadow and specular detection on the raw (0–255) scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaskConfig {
    /// Pixels where `flash - ambient <= shadow_threshold` are flash shadow.
    pub shadow_threshold: f64,
    /// Pixels brighter than this fraction of the flash maximum are specular.
    pub specular_fraction: f64,
    /// Width and height of the elliptical dilation element.
    pub dilation_size: (usize, usize),
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            shadow_threshold: -50.0,
            specular_fraction: 0.95,
            dilation_size: (4, 4),
        }
    }
}

impl MaskConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.shadow_threshold.is_finite() {
            return Err(FusionError::invalid_input(
                "mask_config",
                format!("shadow_threshold must be finite, got {}", self.shadow_threshold),
            ));
        }
        if !self.specular_fraction.is_finite() {
            return Err(FusionError::invalid_input(
                "mask_config",
                format!("specular_fraction must be finite, got {}", self.specular_fraction),
            ));
        }
        let (w, h) = self.dilation_size;
        if w == 0 || h == 0 {
            return Err(FusionError::invalid_input(
                "mask_config",
                format!("dilation_size must be at least 1x1, got {w}x{h}"),
            ));
        }
        Ok(())
    }
}
