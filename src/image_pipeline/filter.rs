//! Joint bilateral filtering module
//!
//! Edge-preserving smoothing of one image using the intensity edges of a
//! second (guide) image. The per-pixel kernel lives in `bilateral`, the
//! per-channel driver for color images in `channelwise`.

pub mod bilateral;
pub mod channelwise;
pub mod config;
pub mod gaussian;

pub use bilateral::{filter_pixel, joint_bilateral_filter};
pub use channelwise::filter_color;
pub use config::FilterConfig;
pub use gaussian::GaussianWindow;
