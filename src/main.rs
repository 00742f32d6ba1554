use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use flash_fusion_rs::image_pipeline::io::is_supported_input;
use flash_fusion_rs::image_pipeline::{
    FlashFusionPipeline, FusionConfig, FusionError, FusionStatus, LogProgress, OutputConfig,
    OutputFormat, TiffCompression,
};
use flash_fusion_rs::logger;

use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "flash_fusion",
    version,
    about = "Merge a no-flash / flash photograph pair by joint bilateral detail transfer"
)]
struct Cli {
    /// Ambient (no-flash) image
    #[arg(value_name = "AMBIENT")]
    ambient: PathBuf,

    /// Flash image of the same scene
    #[arg(value_name = "FLASH")]
    flash: PathBuf,

    /// Output image (.png, .tif or .tiff)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// JSON file with a full or partial fusion config; flags override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Half-size of the bilateral window for all three passes
    #[arg(long)]
    radius: Option<usize>,

    /// Spatial sigma for all three passes
    #[arg(long)]
    spatial_sigma: Option<f64>,

    /// Range sigma of the ambient base pass
    #[arg(long)]
    base_range_sigma: Option<f64>,

    /// Range sigma of the flash-guided and flash base passes
    #[arg(long)]
    detail_range_sigma: Option<f64>,

    /// Flash minus ambient difference at or below which a pixel is shadow
    #[arg(long, allow_hyphen_values = true)]
    shadow_threshold: Option<f64>,

    /// Fraction of the flash maximum above which a pixel is specular
    #[arg(long)]
    specular_fraction: Option<f64>,

    /// Size of the elliptical dilation element
    #[arg(long)]
    dilation_size: Option<usize>,

    /// Guard added to the detail ratio
    #[arg(long)]
    eps: Option<f64>,

    /// TIFF compression
    #[arg(long, value_enum, default_value = "lzw")]
    compression: CompressionArg,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CompressionArg {
    None,
    Lzw,
    DeflateFast,
    DeflateBalanced,
    DeflateBest,
}

impl From<CompressionArg> for TiffCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::None => TiffCompression::None,
            CompressionArg::Lzw => TiffCompression::Lzw,
            CompressionArg::DeflateFast => TiffCompression::DeflateFast,
            CompressionArg::DeflateBalanced => TiffCompression::DeflateBalanced,
            CompressionArg::DeflateBest => TiffCompression::DeflateBest,
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<FusionConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => FusionConfig::default(),
    };

    for filter in [&mut config.base_filter, &mut config.cross_filter, &mut config.flash_filter] {
        if let Some(radius) = cli.radius {
            filter.window_radius = radius;
        }
        if let Some(sigma) = cli.spatial_sigma {
            filter.spatial_sigma = sigma;
        }
    }
    if let Some(sigma) = cli.base_range_sigma {
        config.base_filter.range_sigma = sigma;
    }
    if let Some(sigma) = cli.detail_range_sigma {
        config.cross_filter.range_sigma = sigma;
        config.flash_filter.range_sigma = sigma;
    }
    if let Some(threshold) = cli.shadow_threshold {
        config.mask.shadow_threshold = threshold;
    }
    if let Some(fraction) = cli.specular_fraction {
        config.mask.specular_fraction = fraction;
    }
    if let Some(size) = cli.dilation_size {
        config.mask.dilation_size = (size, size);
    }
    if let Some(eps) = cli.eps {
        config.detail_eps = eps;
    }
    Ok(config)
}

fn check_paths(cli: &Cli) -> anyhow::Result<OutputFormat> {
    for input in [&cli.ambient, &cli.flash] {
        if !is_supported_input(input) {
            bail!("unsupported input file type: {}", input.display());
        }
    }
    OutputFormat::from_path(&cli.output)
        .with_context(|| format!("unsupported output file type: {}", cli.output.display()))
}

fn run(cli: &Cli, format: OutputFormat) -> flash_fusion_rs::image_pipeline::Result<()> {
    let config = load_config_or_invalid(cli)?;
    let output = OutputConfig::builder()
        .format(format)
        .compression(cli.compression.into())
        .build();

    info!(
        radius = config.cross_filter.window_radius,
        spatial_sigma = config.cross_filter.spatial_sigma,
        eps = config.detail_eps,
        "Fusion pipeline initialized"
    );

    let pipeline = FlashFusionPipeline::new(config, output).with_progress(LogProgress);
    let timings = pipeline.fuse_files(&cli.ambient, &cli.flash, &cli.output)?;
    timings.log_summary();
    Ok(())
}

fn load_config_or_invalid(cli: &Cli) -> flash_fusion_rs::image_pipeline::Result<FusionConfig> {
    load_config(cli).map_err(|e| FusionError::invalid_input("config", format!("{e:#}")))
}

fn print_status(status: &FusionStatus) {
    match serde_json::to_string(status) {
        Ok(json) => println!("{json}"),
        Err(e) => error!("Failed to serialize status: {}", e),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(&cli.log_level);

    info!("Starting flash_fusion...");

    let format = match check_paths(&cli) {
        Ok(format) => format,
        Err(e) => {
            error!("{:#}", e);
            print_status(&FusionStatus::Error {
                kind: "invalid_input".to_string(),
                message: format!("{e:#}"),
            });
            return ExitCode::FAILURE;
        }
    };

    let result = run(&cli, format);
    let status = FusionStatus::from_result(&result);
    print_status(&status);

    match result {
        Ok(()) => {
            info!(output = %cli.output.display(), "Fusion successful!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Fusion failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
