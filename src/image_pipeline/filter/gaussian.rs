use ndarray::{s, Array2, ArrayView2};

/// Precomputed spatial weights `exp(-(di² + dj²) / (2σ²))` for every offset
/// of a `(2r+1) × (2r+1)` window. Built once per pass and shared read-only.
#[derive(Debug, Clone)]
pub struct GaussianWindow {
    radius: usize,
    weights: Array2<f64>,
}

impl GaussianWindow {
    pub fn new(radius: usize, sigma: f64) -> Self {
        let size = 2 * radius + 1;
        let denom = 2.0 * sigma * sigma;
        let r = radius as f64;
        let weights = Array2::from_shape_fn((size, size), |(y, x)| {
            let dy = y as f64 - r;
            let dx = x as f64 - r;
            (-(dx * dx + dy * dy) / denom).exp()
        });
        Self { radius, weights }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    /// Weights aligned with the image window `rows × cols` clipped around
    /// `center`. Rows and columns are inclusive image coordinates.
    pub fn clipped(
        &self,
        center: (usize, usize),
        rows: (usize, usize),
        cols: (usize, usize),
    ) -> ArrayView2<'_, f64> {
        let r = self.radius;
        let (i, j) = center;
        self.weights.slice(s![
            rows.0 + r - i..=rows.1 + r - i,
            cols.0 + r - j..=cols.1 + r - j
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_weight_is_one() {
        let window = GaussianWindow::new(3, 1.5);
        assert_eq!(window.weights().dim(), (7, 7));
        assert_eq!(window.weights()[[3, 3]], 1.0);
    }

    #[test]
    fn test_weights_are_symmetric_and_decay() {
        let window = GaussianWindow::new(2, 1.0);
        let w = window.weights();
        assert_eq!(w[[0, 1]], w[[4, 3]]);
        assert_eq!(w[[1, 0]], w[[3, 4]]);
        assert!(w[[2, 1]] > w[[2, 0]]);
        assert!((w[[2, 3]] - (-0.5f64).exp()).abs() < 1e-15);
    }

    #[test]
    fn test_clipped_window_at_corner() {
        let window = GaussianWindow::new(2, 1.0);
        // pixel (0, 0) of a large image: rows 0..=2, cols 0..=2
        let clipped = window.clipped((0, 0), (0, 2), (0, 2));
        assert_eq!(clipped.dim(), (3, 3));
        assert_eq!(clipped[[0, 0]], 1.0);
        assert_eq!(clipped[[2, 2]], window.weights()[[4, 4]]);
    }
}
