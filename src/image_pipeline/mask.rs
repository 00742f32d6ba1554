//! Artifact mask module
//!
//! Flags pixels where the flash image cannot be trusted (flash shadows and
//! specular highlights) and grows the flagged region with a morphological
//! dilation so the blend has no halo along the mask boundary.

pub mod builder;
pub mod config;
pub mod grayscale;
pub mod morphology;

pub use builder::{build_mask, ArtifactMask};
pub use config::MaskConfig;
pub use grayscale::to_grayscale;
pub use morphology::{dilate, StructuringElement};
