use ndarray::{Array2, ArrayView2, Zip};

/// Binary structuring element stored as `(dy, dx)` offsets from its anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    width: usize,
    height: usize,
    offsets: Vec<(isize, isize)>,
}

impl StructuringElement {
    /// Ellipse inscribed in a `width × height` box, anchored at
    /// `(height / 2, width / 2)`.
    ///
    /// Row `i` covers the columns `c - dx ..= c + dx` (clipped to the box),
    /// where `dx = round(c * sqrt(1 - (i - r)² / r²))`. For even sizes this
    /// leaves the top row with a single pixel, e.g. 4×4:
    ///
    /// ```text
    /// . . # .
    /// # # # #
    /// # # # #
    /// # # # #
    /// ```
    pub fn ellipse(width: usize, height: usize) -> Self {
        let r = (height / 2) as isize;
        let c = (width / 2) as isize;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

        let mut offsets = Vec::new();
        for i in 0..height as isize {
            let dy = i - r;
            if dy.abs() > r {
                continue;
            }
            let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as isize;
            let j1 = (c - dx).max(0);
            let j2 = (c + dx + 1).min(width as isize);
            offsets.extend((j1..j2).map(|j| (dy, j - c)));
        }

        Self {
            width,
            height,
            offsets,
        }
    }

    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }

    /// Element rendered as a `height × width` 0/1 grid.
    pub fn to_grid(&self) -> Array2<u8> {
        let mut grid = Array2::zeros((self.height, self.width));
        let (r, c) = ((self.height / 2) as isize, (self.width / 2) as isize);
        for &(dy, dx) in &self.offsets {
            grid[[(dy + r) as usize, (dx + c) as usize]] = 1;
        }
        grid
    }
}

/// Grayscale dilation: each output pixel is the maximum of the input over
/// the element placed at that pixel. Samples outside the image are ignored.
pub fn dilate(src: ArrayView2<'_, u8>, element: &StructuringElement) -> Array2<u8> {
    let (height, width) = src.dim();
    let (h, w) = (height as isize, width as isize);
    let mut output = Array2::<u8>::zeros((height, width));

    Zip::indexed(&mut output).par_for_each(|(y, x), out| {
        let mut max_val = 0u8;
        for &(dy, dx) in element.offsets() {
            let py = y as isize + dy;
            let px = x as isize + dx;
            if py >= 0 && py < h && px >= 0 && px < w {
                max_val = max_val.max(src[[py as usize, px as usize]]);
            }
        }
        *out = max_val;
    });

    output
}
