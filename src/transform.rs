//! Tile-local to global line re-projection.
//!
//! A tile at `(tile_x, tile_y)` has its origin at `(tile_x·E, tile_y·E)`.
//! A line `x·cosθ + y·sinθ = rho` in tile coordinates keeps its normal in
//! global coordinates and gains the projection of the tile origin onto
//! that normal:
//!
//! `global_rho = offset · n(θ) + rho`
//!
//! Axis intercepts follow from the normal form and are left absent when the
//! component they divide by is negligible.
use crate::angle::{is_negligible, unit_normal};
use crate::types::{GlobalDetection, LocalDetection, TileCoord};
use nalgebra::Vector2;

/// Pixel offset of a tile's origin in the global plane.
#[inline]
pub fn tile_offset(tile: TileCoord, tile_edge: usize) -> Vector2<f32> {
    Vector2::new(
        (tile.tile_x * tile_edge) as f32,
        (tile.tile_y * tile_edge) as f32,
    )
}

/// Re-project one accelerator detection into global coordinates.
pub fn to_global(local: LocalDetection, tile: TileCoord, tile_edge: usize) -> GlobalDetection {
    let [cos, sin] = unit_normal(local.theta_deg);
    let normal = Vector2::new(cos, sin);
    let global_rho = tile_offset(tile, tile_edge).dot(&normal) + local.rho as f32;
    let (x_intercept, y_intercept) = intercepts(global_rho, cos, sin);
    GlobalDetection {
        tile,
        local_rho: local.rho,
        theta_deg: local.theta_deg,
        votes: local.votes,
        global_rho,
        x_intercept,
        y_intercept,
    }
}

fn intercepts(rho: f32, cos: f32, sin: f32) -> (Option<f32>, Option<f32>) {
    let x = (!is_negligible(cos)).then(|| rho / cos);
    let y = (!is_negligible(sin)).then(|| rho / sin);
    (x, y)
}
