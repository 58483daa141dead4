//! Tile dispatcher: drives a global image through the accelerator one tile
//! at a time.
//!
//! Preparation (extraction and packing of every tile) runs up front and may
//! run in parallel. The wire phase is strictly sequential: the accelerator
//! handles a single tile at a time and the link has no addressing.

mod dispatcher;
mod tiles;

pub use dispatcher::{DispatchError, DispatchParams, TileDispatcher};
pub use tiles::{GeometryError, TileGeometry, TileGrid};
