use hough_tiles::image::BinaryImage;

/// Full-width horizontal line at `row` and full-height vertical line at `col`.
pub fn cross(size: usize, row: usize, col: usize) -> BinaryImage {
    assert!(row < size && col < size, "cross must lie inside the image");
    BinaryImage::from_fn(size, size, |x, y| x == col || y == row)
}

/// Single full-width horizontal line.
pub fn horizontal_line(size: usize, row: usize) -> BinaryImage {
    BinaryImage::from_fn(size, size, |_, y| y == row)
}

/// Gray buffer with `value` on the cross and zero elsewhere, for the
/// binarization path.
pub fn cross_gray(size: usize, row: usize, col: usize, value: u8) -> Vec<u8> {
    let mut img = vec![0u8; size * size];
    for y in 0..size {
        for x in 0..size {
            if x == col || y == row {
                img[y * size + x] = value;
            }
        }
    }
    img
}
