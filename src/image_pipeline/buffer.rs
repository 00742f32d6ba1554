//! Image buffer module
//!
//! Dense channel-last sample arrays. `RawImage` carries samples in whatever
//! range the decoder produced, `NormalizedImage` and `NormalizedPlane` are
//! guaranteed to hold samples in `[0, 1]`.

pub mod types;

pub use types::{NormalizedImage, NormalizedPlane, RawImage};
