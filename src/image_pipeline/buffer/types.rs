//! Image buffer types

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};

use crate::image_pipeline::common::error::{FusionError, Result};

/// Image with samples in an unconstrained range, laid out `(height, width, channels)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    data: Array3<f64>,
}

impl RawImage {
    pub fn new(data: Array3<f64>) -> Self {
        Self { data }
    }

    /// Wraps a single-channel plane as a one-channel image.
    pub fn from_plane(plane: Array2<f64>) -> Self {
        Self {
            data: plane.insert_axis(Axis(2)),
        }
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }
}

/// Multi-channel image whose samples all lie in `[0, 1]`.
///
/// The range is checked once at construction; every accessor hands out
/// read-only views so the invariant cannot be broken afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedImage {
    data: Array3<f64>,
}

impl NormalizedImage {
    /// Validates `data` and wraps it. `argument` names the input in the error.
    pub fn new(argument: &str, data: Array3<f64>) -> Result<Self> {
        check_unit_range(argument, data.indexed_iter().map(|((i, j, c), v)| ([i, j, c], *v)))?;
        Ok(Self { data })
    }

    /// Divides every sample of `raw` by `scale` (255 for 8-bit sources).
    pub fn from_raw(argument: &str, raw: &RawImage, scale: f64) -> Result<Self> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(FusionError::invalid_input(
                argument,
                format!("normalization scale must be positive and finite, got {scale}"),
            ));
        }
        Self::new(argument, raw.view().mapv(|v| v / scale))
    }

    /// Stacks single-channel planes back into a channel-last image.
    pub fn from_planes(planes: &[NormalizedPlane]) -> Result<Self> {
        let views: Vec<ArrayView2<'_, f64>> = planes.iter().map(|p| p.view()).collect();
        let data = ndarray::stack(Axis(2), &views)
            .map_err(|e| FusionError::invalid_input("planes", e.to_string()))?;
        Ok(Self { data })
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    /// Copies channel `index` out as a plane. Panics if `index >= channels()`.
    pub fn channel(&self, index: usize) -> NormalizedPlane {
        NormalizedPlane {
            data: self.data.index_axis(Axis(2), index).to_owned(),
        }
    }

    pub fn view(&self) -> ArrayView3<'_, f64> {
        self.data.view()
    }
}

/// Single-channel image whose samples all lie in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPlane {
    data: Array2<f64>,
}

impl NormalizedPlane {
    pub fn new(argument: &str, data: Array2<f64>) -> Result<Self> {
        check_unit_range(argument, data.indexed_iter().map(|((i, j), v)| ([i, j, 0], *v)))?;
        Ok(Self { data })
    }

    /// Caller guarantees every sample of `data` is in `[0, 1]`.
    pub(crate) fn from_trusted(data: Array2<f64>) -> Self {
        debug_assert!(data.iter().all(|v| (0.0..=1.0).contains(v)));
        Self { data }
    }

    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }
}

fn check_unit_range(
    argument: &str,
    mut samples: impl Iterator<Item = ([usize; 3], f64)>,
) -> Result<()> {
    match samples.find(|(_, v)| !(0.0..=1.0).contains(v)) {
        Some((index, value)) => Err(FusionError::invalid_input(
            argument,
            format!("sample {value} at {index:?} is outside the closed interval [0, 1]"),
        )),
        None => Ok(()),
    }
}
