//! Common utilities module
//!
//! This module contains the error type, status record and step timings shared
//! across the image pipeline.

pub mod error;
pub mod status;
pub mod timing;

pub use error::{FusionError, Result};
pub use status::FusionStatus;
pub use timing::{PipelineTimings, StepTiming, Timer};
