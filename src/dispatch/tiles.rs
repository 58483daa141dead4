//! Square tile decomposition of the global image.
use crate::image::BinaryImage;
use crate::protocol::PackedBitmap;
use crate::types::TileCoord;
use serde::{Deserialize, Serialize};
use std::fmt;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Global image edge and accelerator tile edge, both in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileGeometry {
    pub image_size: usize,
    pub tile_edge: usize,
}

impl Default for TileGeometry {
    fn default() -> Self {
        Self {
            image_size: 64,
            tile_edge: 16,
        }
    }
}

impl TileGeometry {
    /// Check that the image splits into a whole number of tiles.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.tile_edge == 0 {
            return Err(GeometryError::ZeroTileEdge);
        }
        if self.image_size == 0 || self.image_size % self.tile_edge != 0 {
            return Err(GeometryError::NotDivisible {
                image_size: self.image_size,
                tile_edge: self.tile_edge,
            });
        }
        Ok(())
    }

    /// Tiles along one side (`T`).
    pub fn tiles_per_side(&self) -> usize {
        if self.tile_edge == 0 {
            0
        } else {
            self.image_size / self.tile_edge
        }
    }

    pub fn tile_count(&self) -> usize {
        self.tiles_per_side() * self.tiles_per_side()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GeometryError {
    ZeroTileEdge,
    NotDivisible {
        image_size: usize,
        tile_edge: usize,
    },
    ImageSize {
        expected: usize,
        width: usize,
        height: usize,
    },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTileEdge => write!(f, "tile edge must be positive"),
            Self::NotDivisible {
                image_size,
                tile_edge,
            } => write!(
                f,
                "image size {image_size} is not a positive multiple of tile edge {tile_edge}"
            ),
            Self::ImageSize {
                expected,
                width,
                height,
            } => write!(f, "expected a {expected}x{expected} image, got {width}x{height}"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// Validated geometry with tile addressing helpers.
#[derive(Clone, Copy, Debug)]
pub struct TileGrid {
    geometry: TileGeometry,
}

impl TileGrid {
    pub fn new(geometry: TileGeometry) -> Result<Self, GeometryError> {
        geometry.validate()?;
        Ok(Self { geometry })
    }

    pub fn geometry(&self) -> TileGeometry {
        self.geometry
    }

    /// Scan order: `tile_y` outer, `tile_x` inner.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> {
        let n = self.geometry.tiles_per_side();
        (0..n).flat_map(move |ty| (0..n).map(move |tx| TileCoord::new(tx, ty)))
    }

    /// Pixel origin of `tile` in the global image.
    pub fn origin(&self, tile: TileCoord) -> (usize, usize) {
        let e = self.geometry.tile_edge;
        (tile.tile_x * e, tile.tile_y * e)
    }

    pub fn check_image(&self, image: &BinaryImage) -> Result<(), GeometryError> {
        let n = self.geometry.image_size;
        if image.w != n || image.h != n {
            return Err(GeometryError::ImageSize {
                expected: n,
                width: image.w,
                height: image.h,
            });
        }
        Ok(())
    }

    /// Copy out one tile; `None` if the image does not cover it.
    pub fn extract(&self, image: &BinaryImage, tile: TileCoord) -> Option<BinaryImage> {
        let (x0, y0) = self.origin(tile);
        let e = self.geometry.tile_edge;
        image.crop(x0, y0, e, e)
    }

    /// Extract and pack every tile, in scan order.
    pub fn pack_all(
        &self,
        image: &BinaryImage,
    ) -> Result<Vec<(TileCoord, PackedBitmap)>, GeometryError> {
        self.check_image(image)?;
        let coords: Vec<TileCoord> = self.coords().collect();
        let pack = |&tile: &TileCoord| {
            self.extract(image, tile)
                .map(|block| (tile, PackedBitmap::pack(&block)))
        };
        #[cfg(feature = "parallel")]
        let packed: Option<Vec<_>> = coords.par_iter().map(pack).collect();
        #[cfg(not(feature = "parallel"))]
        let packed: Option<Vec<_>> = coords.iter().map(pack).collect();
        packed.ok_or(GeometryError::ImageSize {
            expected: self.geometry.image_size,
            width: image.w,
            height: image.h,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_geometry_is_rejected() {
        let bad = TileGeometry {
            image_size: 60,
            tile_edge: 16,
        };
        assert!(matches!(bad.validate(), Err(GeometryError::NotDivisible { .. })));
        let zero = TileGeometry {
            image_size: 64,
            tile_edge: 0,
        };
        assert_eq!(zero.validate(), Err(GeometryError::ZeroTileEdge));
        assert!(TileGrid::new(TileGeometry::default()).is_ok());
    }

    #[test]
    fn scan_order_is_row_major() {
        let grid = TileGrid::new(TileGeometry::default()).expect("default geometry");
        let coords: Vec<TileCoord> = grid.coords().collect();
        assert_eq!(coords.len(), 16);
        assert_eq!(coords[0], TileCoord::new(0, 0));
        assert_eq!(coords[1], TileCoord::new(1, 0));
        assert_eq!(coords[4], TileCoord::new(0, 1));
        assert_eq!(coords[15], TileCoord::new(3, 3));
    }

    #[test]
    fn tiles_cover_every_pixel_exactly_once() {
        let grid = TileGrid::new(TileGeometry::default()).expect("default geometry");
        let mut hits = vec![0u32; 64 * 64];
        for tile in grid.coords() {
            let (x0, y0) = grid.origin(tile);
            for y in y0..y0 + 16 {
                for x in x0..x0 + 16 {
                    hits[y * 64 + x] += 1;
                }
            }
        }
        assert!(hits.iter().all(|&h| h == 1));
    }

    #[test]
    fn extracted_tiles_reassemble_the_image() {
        let grid = TileGrid::new(TileGeometry::default()).expect("default geometry");
        let image = BinaryImage::from_fn(64, 64, |x, y| (x * 7 + y * 3) % 5 == 0);
        let packed = grid.pack_all(&image).expect("64x64 image");
        assert_eq!(packed.len(), 16);
        let mut rebuilt = BinaryImage::new(64, 64);
        for (tile, bitmap) in &packed {
            let (x0, y0) = grid.origin(*tile);
            let block = bitmap.unpack();
            for y in 0..16 {
                for x in 0..16 {
                    rebuilt.set(x0 + x, y0 + y, block.get(x, y));
                }
            }
        }
        assert_eq!(rebuilt, image);
    }

    #[test]
    fn wrong_image_size_is_reported() {
        let grid = TileGrid::new(TileGeometry::default()).expect("default geometry");
        let image = BinaryImage::new(32, 64);
        assert!(matches!(
            grid.pack_all(&image),
            Err(GeometryError::ImageSize { expected: 64, .. })
        ));
    }
}
