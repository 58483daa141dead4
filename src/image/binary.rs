//! Owned boolean grid in row-major layout.
//!
//! Used both for the global image handed to the dispatcher and for the
//! individual tiles cut out of it. A pixel is "set" iff its source value
//! was above the binarization threshold.
use super::{ImageU8, ImageView};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryImage {
    /// Width in pixels
    pub w: usize,
    /// Height in pixels
    pub h: usize,
    /// Row-major pixel storage, `w * h` entries
    pub data: Vec<bool>,
}

impl BinaryImage {
    /// All-clear grid of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![false; w * h],
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(w: usize, h: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                data.push(f(x, y));
            }
        }
        Self { w, h, data }
    }

    /// Binarize a grayscale view: a pixel is set iff `value > threshold`.
    ///
    /// `threshold = 0` reproduces the "non-zero is set" rule.
    pub fn from_gray(gray: &ImageU8<'_>, threshold: u8) -> Self {
        let mut data = Vec::with_capacity(gray.w * gray.h);
        for row in gray.rows() {
            data.extend(row.iter().map(|&v| v > threshold));
        }
        Self {
            w: gray.w,
            h: gray.h,
            data,
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: bool) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&p| p).count()
    }

    /// Copy of the `w × h` block whose top-left corner is `(x0, y0)`.
    ///
    /// Returns `None` if the block does not fit inside the grid.
    pub fn crop(&self, x0: usize, y0: usize, w: usize, h: usize) -> Option<BinaryImage> {
        if x0.checked_add(w)? > self.w || y0.checked_add(h)? > self.h {
            return None;
        }
        let mut data = Vec::with_capacity(w * h);
        for y in y0..y0 + h {
            let start = self.idx(x0, y);
            data.extend_from_slice(&self.data[start..start + w]);
        }
        Some(BinaryImage { w, h, data })
    }
}

impl ImageView for BinaryImage {
    type Pixel = bool;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn row(&self, y: usize) -> &[bool] {
        let start = y * self.w;
        &self.data[start..start + self.w]
    }
}
