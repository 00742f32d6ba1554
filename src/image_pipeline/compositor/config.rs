use serde::{Deserialize, Serialize};

use crate::image_pipeline::common::error::{FusionError, Result};
use crate::image_pipeline::filter::FilterConfig;
use crate::image_pipeline::mask::MaskConfig;

/// Every tunable of a detail transfer run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Self-guided ambient pass producing `A_base`.
    pub base_filter: FilterConfig,
    /// Flash-guided ambient pass producing `A_nr`.
    pub cross_filter: FilterConfig,
    /// Self-guided flash pass producing `F_base`.
    pub flash_filter: FilterConfig,
    pub mask: MaskConfig,
    /// Added to numerator and denominator of the detail ratio.
    pub detail_eps: f64,
    /// Multiplier taking the normalized composite to the output range.
    pub display_scale: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            base_filter: FilterConfig::new(11, 3.0, 0.2),
            cross_filter: FilterConfig::new(11, 3.0, 0.1),
            flash_filter: FilterConfig::new(11, 3.0, 0.1),
            mask: MaskConfig::default(),
            detail_eps: 0.02,
            display_scale: 255.0,
        }
    }
}

impl FusionConfig {
    pub fn builder() -> FusionConfigBuilder {
        FusionConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.base_filter.validate()?;
        self.cross_filter.validate()?;
        self.flash_filter.validate()?;
        self.mask.validate()?;
        // Zero is accepted; a zero guard surfaces as ArithmeticDegenerate on black pixels.
        if !(self.detail_eps.is_finite() && self.detail_eps >= 0.0) {
            return Err(FusionError::invalid_input(
                "detail_eps",
                format!("must be finite and non-negative, got {}", self.detail_eps),
            ));
        }
        if !(self.display_scale.is_finite() && self.display_scale > 0.0) {
            return Err(FusionError::invalid_input(
                "display_scale",
                format!("must be positive and finite, got {}", self.display_scale),
            ));
        }
        Ok(())
    }
}

/// Builder for FusionConfig
///
/// Setters named after a single knob (`window_radius`, `spatial_sigma`)
/// apply to all three filtering passes.
#[derive(Default)]
pub struct FusionConfigBuilder {
    config: FusionConfig,
}

impl FusionConfigBuilder {
    pub fn window_radius(mut self, radius: usize) -> Self {
        self.config.base_filter.window_radius = radius;
        self.config.cross_filter.window_radius = radius;
        self.config.flash_filter.window_radius = radius;
        self
    }

    pub fn spatial_sigma(mut self, sigma: f64) -> Self {
        self.config.base_filter.spatial_sigma = sigma;
        self.config.cross_filter.spatial_sigma = sigma;
        self.config.flash_filter.spatial_sigma = sigma;
        self
    }

    /// Range sigma of the self-guided ambient pass.
    pub fn base_range_sigma(mut self, sigma: f64) -> Self {
        self.config.base_filter.range_sigma = sigma;
        self
    }

    /// Range sigma of the flash-guided and flash base passes.
    pub fn detail_range_sigma(mut self, sigma: f64) -> Self {
        self.config.cross_filter.range_sigma = sigma;
        self.config.flash_filter.range_sigma = sigma;
        self
    }

    pub fn base_filter(mut self, filter: FilterConfig) -> Self {
        self.config.base_filter = filter;
        self
    }

    pub fn cross_filter(mut self, filter: FilterConfig) -> Self {
        self.config.cross_filter = filter;
        self
    }

    pub fn flash_filter(mut self, filter: FilterConfig) -> Self {
        self.config.flash_filter = filter;
        self
    }

    pub fn mask(mut self, mask: MaskConfig) -> Self {
        self.config.mask = mask;
        self
    }

    pub fn shadow_threshold(mut self, threshold: f64) -> Self {
        self.config.mask.shadow_threshold = threshold;
        self
    }

    pub fn specular_fraction(mut self, fraction: f64) -> Self {
        self.config.mask.specular_fraction = fraction;
        self
    }

    pub fn dilation_size(mut self, width: usize, height: usize) -> Self {
        self.config.mask.dilation_size = (width, height);
        self
    }

    pub fn detail_eps(mut self, eps: f64) -> Self {
        self.config.detail_eps = eps;
        self
    }

    pub fn display_scale(mut self, scale: f64) -> Self {
        self.config.display_scale = scale;
        self
    }

    pub fn build(self) -> FusionConfig {
        self.config
    }
}
