use ndarray::{Array2, ArrayView3, Axis, Zip};

use crate::image_pipeline::buffer::RawImage;
use crate::image_pipeline::common::error::{FusionError, Result};

/// Rec. 601 luma weights for R, G, B.
const LUMA_WEIGHTS: [f64; 3] = [0.299, 0.587, 0.114];

/// Single-channel intensity of `image`.
///
/// One-channel images are returned as-is. Three- and four-channel images are
/// treated as RGB(A) and rounded to whole 8-bit levels; alpha is ignored.
/// Any other channel count is rejected.
pub fn to_grayscale(argument: &str, image: &RawImage) -> Result<Array2<f64>> {
    let view = image.view();
    match image.channels() {
        1 => Ok(view.index_axis(Axis(2), 0).to_owned()),
        3 | 4 => Ok(luma(view)),
        n => Err(FusionError::invalid_input(
            argument,
            format!("cannot derive grayscale from {n} channels"),
        )),
    }
}

fn luma(view: ArrayView3<'_, f64>) -> Array2<f64> {
    let mut gray = Array2::zeros((view.dim().0, view.dim().1));
    Zip::from(&mut gray)
        .and(view.index_axis(Axis(2), 0))
        .and(view.index_axis(Axis(2), 1))
        .and(view.index_axis(Axis(2), 2))
        .for_each(|g, &r, &gr, &b| {
            *g = (LUMA_WEIGHTS[0] * r + LUMA_WEIGHTS[1] * gr + LUMA_WEIGHTS[2] * b).round();
        });
    gray
}
