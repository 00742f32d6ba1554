//! Image processing pipeline module
//!
//! Flash / no-flash detail transfer: joint bilateral filtering, artifact
//! masking and compositing, with separate modules for image I/O and the
//! end-to-end conversion.

pub mod buffer;
pub mod common;
pub mod compositor;
pub mod conversions;
pub mod filter;
pub mod io;
pub mod mask;

pub use common::{
    FusionError,
    FusionStatus,
    PipelineTimings,
    Result,
};

pub use buffer::{
    NormalizedImage,
    NormalizedPlane,
    RawImage,
};

pub use filter::{
    filter_color,
    joint_bilateral_filter,
    FilterConfig,
};

pub use mask::{
    build_mask,
    ArtifactMask,
    MaskConfig,
};

pub use compositor::{
    ChannelProgress,
    Composite,
    DetailTransferCompositor,
    FilterPass,
    FusionConfig,
    FusionConfigBuilder,
    FusionInputs,
    LogProgress,
    NoProgress,
    ProgressEvent,
    ProgressSink,
};

pub use io::{
    ImageReader,
    ImageWriter,
    OutputConfig,
    OutputConfigBuilder,
    OutputFormat,
    StandardImageReader,
    StandardImageWriter,
    TiffCompression,
};

pub use conversions::FlashFusionPipeline;
