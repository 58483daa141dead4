//! One-bit-per-pixel tile serialization.
//!
//! Pixel `(row, col)` maps to index `row * width + col`; that index lives in
//! byte `index / 8` at bit `index % 8` (LSB first).
use crate::image::BinaryImage;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackedBitmap {
    width: usize,
    height: usize,
    bytes: Vec<u8>,
}

impl PackedBitmap {
    /// Number of payload bytes for a `width × height` tile.
    #[inline]
    pub fn byte_len(width: usize, height: usize) -> usize {
        (width * height).div_ceil(8)
    }

    /// Pack an already-binarized tile.
    pub fn pack(tile: &BinaryImage) -> Self {
        let mut bytes = vec![0u8; Self::byte_len(tile.w, tile.h)];
        for (index, &set) in tile.data.iter().enumerate() {
            if set {
                bytes[index / 8] |= 1 << (index % 8);
            }
        }
        Self {
            width: tile.w,
            height: tile.h,
            bytes,
        }
    }

    /// Wrap raw payload bytes; `None` if the length does not match the size.
    pub fn from_bytes(width: usize, height: usize, bytes: Vec<u8>) -> Option<Self> {
        (bytes.len() == Self::byte_len(width, height)).then_some(Self {
            width,
            height,
            bytes,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// State of the bit backing pixel `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> bool {
        let index = row * self.width + col;
        self.bytes[index / 8] & (1 << (index % 8)) != 0
    }

    /// Expand back into a boolean grid.
    pub fn unpack(&self) -> BinaryImage {
        BinaryImage::from_fn(self.width, self.height, |col, row| self.get(row, col))
    }

    /// Number of set pixels.
    pub fn count_set(&self) -> usize {
        self.bytes.iter().map(|b| b.count_ones() as usize).sum()
    }
}
