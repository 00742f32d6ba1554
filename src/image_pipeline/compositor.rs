//! Detail transfer compositor module
//!
//! Merges an ambient / flash pair: the ambient image denoised with the flash
//! edges, modulated by the flash detail layer, with flash shadows and
//! highlights replaced by the ambient base layer.

mod config;
mod pipeline;
mod progress;


pub use config::{FusionConfig, FusionConfigBuilder};
pub use pipeline::{Composite, DetailTransferCompositor, FusionInputs};
pub use progress::{ChannelProgress, FilterPass, LogProgress, NoProgress, ProgressEvent, ProgressSink};
