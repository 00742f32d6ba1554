use std::io::Write;
use std::path::Path;

use tracing::{info, instrument};

use crate::image_pipeline::{
    buffer::{NormalizedImage, RawImage},
    common::error::{FusionError, Result},
    common::timing::{PipelineTimings, Timer},
    compositor::{Composite, DetailTransferCompositor, FusionConfig, FusionInputs, NoProgress, ProgressSink},
    io::{ImageReader, ImageWriter, OutputConfig, StandardImageReader, StandardImageWriter},
};

/// Full scale of the 8-bit samples produced by the reader.
const INPUT_FULL_SCALE: f64 = 255.0;

pub struct FlashFusionPipeline<R: ImageReader, W: ImageWriter> {
    reader: R,
    writer: W,
    compositor: DetailTransferCompositor,
    output: OutputConfig,
    progress: Box<dyn ProgressSink>,
}

impl FlashFusionPipeline<StandardImageReader, StandardImageWriter> {
    pub fn new(config: FusionConfig, output: OutputConfig) -> Self {
        Self::with_custom(StandardImageReader, StandardImageWriter, config, output)
    }
}

impl<R: ImageReader, W: ImageWriter> FlashFusionPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: FusionConfig, output: OutputConfig) -> Self {
        Self {
            reader,
            writer,
            compositor: DetailTransferCompositor::new(config),
            output,
            progress: Box::new(NoProgress),
        }
    }

    /// Routes compositor progress events to `progress`.
    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    fn validate_dimensions(image: &RawImage) -> Result<()> {
        if image.width() == 0 || image.height() == 0 {
            return Err(FusionError::InvalidDimensions(image.width(), image.height()));
        }
        Ok(())
    }

    /// Decodes both inputs and runs the compositor without encoding.
    #[instrument(skip_all, fields(ambient_size = ambient_data.len(), flash_size = flash_data.len()))]
    pub fn composite(&self, ambient_data: &[u8], flash_data: &[u8]) -> Result<Composite> {
        let mut timings = PipelineTimings::new();

        let timer = Timer::start("decode");
        let (ambient_raw, flash_raw) = {
            let _span = tracing::info_span!("decode_inputs").entered();
            (
                self.reader.read_image(ambient_data)?,
                self.reader.read_image(flash_data)?,
            )
        };
        timer.record(&mut timings);

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = ambient_raw.width(),
                height = ambient_raw.height()
            ).entered();
            Self::validate_dimensions(&ambient_raw)?;
            Self::validate_dimensions(&flash_raw)?;
        }

        let timer = Timer::start("normalize");
        let ambient = NormalizedImage::from_raw("ambient", &ambient_raw, INPUT_FULL_SCALE)?;
        let flash = NormalizedImage::from_raw("flash", &flash_raw, INPUT_FULL_SCALE)?;
        timer.record(&mut timings);

        let inputs = FusionInputs {
            ambient: &ambient,
            flash: &flash,
            ambient_raw: &ambient_raw,
            flash_raw: &flash_raw,
        };
        let mut composite = self.compositor.compose(&inputs, self.progress.as_ref())?;

        timings.extend(std::mem::take(&mut composite.timings));
        composite.timings = timings;
        Ok(composite)
    }

    /// Decodes, composites and encodes. Nothing is written on failure.
    #[instrument(skip_all)]
    pub fn fuse(&self, ambient_data: &[u8], flash_data: &[u8], output: &mut dyn Write) -> Result<PipelineTimings> {
        info!("Starting flash / no-flash fusion");

        let mut composite = self.composite(ambient_data, flash_data)?;

        let timer = Timer::start("encode");
        {
            let _span = tracing::info_span!("encode_output", format = ?self.output.format).entered();
            self.writer.write_image(&composite.image, output, &self.output)?;
        }
        timer.record(&mut composite.timings);

        info!(
            width = composite.image.width(),
            height = composite.image.height(),
            "Fusion complete"
        );
        Ok(composite.timings)
    }

    #[instrument(skip(self, ambient_path, flash_path, output_path))]
    pub fn fuse_files<P: AsRef<Path>, Q: AsRef<Path>, O: AsRef<Path>>(
        &self,
        ambient_path: P,
        flash_path: Q,
        output_path: O,
    ) -> Result<PipelineTimings> {
        let ambient_path = ambient_path.as_ref();
        let flash_path = flash_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            ambient = %ambient_path.display(),
            flash = %flash_path.display(),
            output = %output_path.display(),
            "Fusing files"
        );

        let (ambient_data, flash_data) = {
            let _span = tracing::info_span!("read_input_files").entered();
            (read_input(ambient_path)?, read_input(flash_path)?)
        };

        // Encode into memory first so a failed run leaves no partial file behind.
        let mut encoded = Vec::new();
        let timings = self.fuse(&ambient_data, &flash_data, &mut encoded)?;

        {
            let _span = tracing::info_span!("write_output_file").entered();
            std::fs::write(output_path, &encoded).map_err(|e| {
                FusionError::OutputWriteError(format!("{}: {}", output_path.display(), e))
            })?;
        }

        Ok(timings)
    }

    pub fn config(&self) -> &FusionConfig {
        self.compositor.config()
    }

    pub fn set_config(&mut self, config: FusionConfig) {
        self.compositor.set_config(config);
    }

    pub fn output_config(&self) -> &OutputConfig {
        &self.output
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| FusionError::InputReadError(format!("{}: {}", path.display(), e)))
}
