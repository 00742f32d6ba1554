use ndarray::{Array3, Zip};
use tracing::{info, instrument, warn};

use crate::image_pipeline::buffer::{NormalizedImage, RawImage};
use crate::image_pipeline::common::error::{FusionError, Result};
use crate::image_pipeline::common::timing::{PipelineTimings, Timer};
use crate::image_pipeline::compositor::config::FusionConfig;
use crate::image_pipeline::compositor::progress::{FilterPass, ProgressEvent, ProgressSink};
use crate::image_pipeline::filter::{filter_color, FilterConfig};
use crate::image_pipeline::mask::{build_mask, ArtifactMask};

/// The image pair in both representations.
///
/// `ambient` / `flash` feed the filters; `ambient_raw` / `flash_raw` feed the
/// artifact mask and must share their height and width.
#[derive(Debug, Clone, Copy)]
pub struct FusionInputs<'a> {
    pub ambient: &'a NormalizedImage,
    pub flash: &'a NormalizedImage,
    pub ambient_raw: &'a RawImage,
    pub flash_raw: &'a RawImage,
}

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct Composite {
    /// Composite in the display range (`display_scale`), not clamped.
    pub image: RawImage,
    pub mask: ArtifactMask,
    pub timings: PipelineTimings,
}

pub struct DetailTransferCompositor {
    config: FusionConfig,
}

impl DetailTransferCompositor {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: FusionConfig) {
        self.config = config;
    }

    /// Runs the three filtering passes, the detail ratio, the mask and the
    /// blend:
    ///
    /// ```text
    /// A_base   = filter(ambient, ambient)
    /// A_nr     = filter(ambient, flash)
    /// F_base   = filter(flash, flash)
    /// F_detail = (flash + eps) / (F_base + eps)
    /// output   = ((1 - M) * A_nr * F_detail + M * A_base) * display_scale
    /// ```
    ///
    /// All shape and configuration checks happen before the first pass. On
    /// error nothing is returned.
    #[instrument(skip_all, fields(dim = ?inputs.ambient.dim()))]
    pub fn compose(
        &self,
        inputs: &FusionInputs<'_>,
        progress: &dyn ProgressSink,
    ) -> Result<Composite> {
        validate_inputs(inputs)?;
        self.config.validate()?;

        let mut timings = PipelineTimings::new();
        let config = &self.config;

        let a_base = run_pass(
            FilterPass::AmbientBase,
            inputs.ambient,
            inputs.ambient,
            &config.base_filter,
            progress,
            &mut timings,
        )?;
        let a_nr = run_pass(
            FilterPass::AmbientNoiseReduced,
            inputs.ambient,
            inputs.flash,
            &config.cross_filter,
            progress,
            &mut timings,
        )?;
        let f_base = run_pass(
            FilterPass::FlashBase,
            inputs.flash,
            inputs.flash,
            &config.flash_filter,
            progress,
            &mut timings,
        )?;

        let timer = Timer::start("f_detail");
        let f_detail = detail_layer(inputs.flash, &f_base, config.detail_eps)?;
        timer.record(&mut timings);

        let timer = Timer::start("mask");
        let mask = build_mask(inputs.ambient_raw, inputs.flash_raw, &config.mask)?;
        timer.record(&mut timings);
        progress.report(ProgressEvent::MaskBuilt {
            masked_pixels: mask.masked_count(),
        });

        let timer = Timer::start("blend");
        let image = blend(&a_base, &a_nr, &f_detail, &mask, config.display_scale);
        timer.record(&mut timings);

        let total = timings.total_duration();
        info!(
            masked_pixels = mask.masked_count(),
            ms = total.as_secs_f64() * 1000.0,
            "Detail transfer complete"
        );
        progress.report(ProgressEvent::Finished { total });

        Ok(Composite {
            image,
            mask,
            timings,
        })
    }
}

fn validate_inputs(inputs: &FusionInputs<'_>) -> Result<()> {
    let ambient_dim = inputs.ambient.dim();
    if inputs.flash.dim() != ambient_dim {
        warn!(
            ambient = ?ambient_dim,
            flash = ?inputs.flash.dim(),
            "Ambient and flash images differ in shape"
        );
        return Err(FusionError::ShapeMismatch {
            expected: ambient_dim,
            found: inputs.flash.dim(),
        });
    }

    let (height, width, _) = ambient_dim;
    for (argument, raw) in [
        ("ambient_raw", inputs.ambient_raw),
        ("flash_raw", inputs.flash_raw),
    ] {
        if (raw.height(), raw.width()) != (height, width) {
            return Err(FusionError::ShapeMismatch {
                expected: (height, width, raw.channels()),
                found: raw.dim(),
            });
        }
        if !matches!(raw.channels(), 1 | 3 | 4) {
            return Err(FusionError::invalid_input(
                argument,
                format!("expected 1, 3 or 4 channels, got {}", raw.channels()),
            ));
        }
    }
    Ok(())
}

fn run_pass(
    pass: FilterPass,
    signal: &NormalizedImage,
    guide: &NormalizedImage,
    config: &FilterConfig,
    progress: &dyn ProgressSink,
    timings: &mut PipelineTimings,
) -> Result<NormalizedImage> {
    let _span = tracing::info_span!("filter_pass", pass = pass.name()).entered();
    progress.report(ProgressEvent::PassStarted(pass));

    let timer = Timer::start(pass.name());
    let filtered = filter_color(signal, guide, config)?;
    let elapsed = timer.record(timings);

    progress.report(ProgressEvent::PassFinished { pass, elapsed });
    Ok(filtered)
}

/// `(flash + eps) / (f_base + eps)`; any non-finite ratio is an error.
fn detail_layer(flash: &NormalizedImage, f_base: &NormalizedImage, eps: f64) -> Result<Array3<f64>> {
    let detail = Zip::from(flash.view())
        .and(f_base.view())
        .map_collect(|&f, &b| (f + eps) / (b + eps));

    if let Some(((i, j, c), value)) = detail.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(FusionError::ArithmeticDegenerate(format!(
            "detail ratio at ({i}, {j}, {c}) is {value}; eps {eps} is too small for the sample scale"
        )));
    }
    Ok(detail)
}

fn blend(
    a_base: &NormalizedImage,
    a_nr: &NormalizedImage,
    f_detail: &Array3<f64>,
    mask: &ArtifactMask,
    display_scale: f64,
) -> RawImage {
    let mask = mask.view();
    let mut output = Array3::<f64>::zeros(a_base.dim());
    Zip::indexed(&mut output)
        .and(a_nr.view())
        .and(f_detail)
        .and(a_base.view())
        .par_for_each(|(i, j, _), out, &nr, &detail, &base| {
            let m = mask[[i, j]];
            *out = ((1.0 - m) * nr * detail + m * base) * display_scale;
        });
    RawImage::new(output)
}
