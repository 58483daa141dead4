//! Debug overlay: source pixels and detected lines on one character grid.
use crate::angle::unit_normal;
use crate::image::BinaryImage;
use crate::types::GlobalDetection;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum OverlayCell {
    Empty,
    /// Set pixel of the source image only.
    Image,
    /// Pixel on exactly one detected line.
    Line,
    /// Pixel claimed by more than one feature (image and line, or two lines).
    Overlap,
}

impl OverlayCell {
    pub fn symbol(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Image => '#',
            Self::Line => '+',
            Self::Overlap => '@',
        }
    }
}

#[derive(Clone, Copy, Default)]
struct Claims {
    image: bool,
    lines: u16,
}

impl Claims {
    fn cell(self) -> OverlayCell {
        match (self.image, self.lines) {
            (false, 0) => OverlayCell::Empty,
            (true, 0) => OverlayCell::Image,
            (false, 1) => OverlayCell::Line,
            _ => OverlayCell::Overlap,
        }
    }
}

/// Rendered `width × height` overlay.
#[derive(Clone, Debug)]
pub struct OverlayGrid {
    width: usize,
    height: usize,
    cells: Vec<OverlayCell>,
}

impl OverlayGrid {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> OverlayCell {
        self.cells[y * self.width + x]
    }

    pub fn count(&self, cell: OverlayCell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }
}

impl fmt::Display for OverlayGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.width.max(1)) {
            let line: String = row.iter().map(|c| c.symbol()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Pixels covered by the line `x·cosθ + y·sinθ = rho`, clipped to the grid.
///
/// Near-horizontal lines (`|sinθ| > 0.5`) are walked per column solving for
/// `y`; the rest per row solving for `x`.
pub fn rasterize_line(
    rho: f32,
    theta_deg: u8,
    width: usize,
    height: usize,
) -> Vec<(usize, usize)> {
    let [cos, sin] = unit_normal(theta_deg);
    let mut out = Vec::new();
    if sin.abs() > 0.5 {
        for x in 0..width {
            let y = ((rho - x as f32 * cos) / sin).round();
            if y >= 0.0 && (y as usize) < height {
                out.push((x, y as usize));
            }
        }
    } else {
        for y in 0..height {
            let x = ((rho - y as f32 * sin) / cos).round();
            if x >= 0.0 && (x as usize) < width {
                out.push((x as usize, y));
            }
        }
    }
    out
}

/// Draw `image` (if any) and every line in `lines` onto a `size × size` grid.
pub fn render_overlay(
    image: Option<&BinaryImage>,
    lines: &[GlobalDetection],
    size: usize,
) -> OverlayGrid {
    let mut claims = vec![Claims::default(); size * size];
    if let Some(img) = image {
        for y in 0..size.min(img.h) {
            for x in 0..size.min(img.w) {
                if img.get(x, y) {
                    claims[y * size + x].image = true;
                }
            }
        }
    }
    for line in lines {
        for (x, y) in rasterize_line(line.global_rho, line.theta_deg, size, size) {
            let c = &mut claims[y * size + x];
            c.lines = c.lines.saturating_add(1);
        }
    }
    OverlayGrid {
        width: size,
        height: size,
        cells: claims.into_iter().map(Claims::cell).collect(),
    }
}
