//! Pipeline conversions module
//!
//! Orchestrates decoding an ambient / flash pair, compositing it and
//! encoding the result.

mod flash_fusion;


pub use flash_fusion::FlashFusionPipeline;
