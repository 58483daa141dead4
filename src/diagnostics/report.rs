use super::timing::TimingBreakdown;
use crate::protocol::ReplyStatus;
use crate::types::{DetectionSet, TileCoord};
use serde::Serialize;

/// Outcome of one tile exchange.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileReport {
    pub tile: TileCoord,
    pub status: ReplyStatus,
    /// Set pixels in the transmitted tile.
    pub set_pixels: usize,
    pub bytes_sent: usize,
    pub bytes_received: usize,
    /// Stale bytes discarded before transmitting.
    pub stale_discarded: usize,
    /// Bytes past the expected reply length.
    pub trailing: usize,
    /// Bytes lost to a full receive queue during the exchange.
    pub overflowed: usize,
    /// Detections taken from the reply.
    pub detections: usize,
    /// Detections lost because the raw set was full.
    pub dropped: usize,
    pub reply_ms: f64,
    pub elapsed_ms: f64,
}

/// Per-status tile counts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub ok: usize,
    pub silent: usize,
    pub truncated: usize,
    pub malformed: usize,
}

impl LinkSummary {
    pub fn from_tiles(tiles: &[TileReport]) -> Self {
        let mut summary = Self::default();
        for t in tiles {
            match t.status {
                ReplyStatus::Ok { .. } => summary.ok += 1,
                ReplyStatus::Silent => summary.silent += 1,
                ReplyStatus::Truncated { .. } => summary.truncated += 1,
                ReplyStatus::Malformed { .. } => summary.malformed += 1,
            }
        }
        summary
    }

    pub fn all_ok(&self) -> bool {
        self.silent == 0 && self.truncated == 0 && self.malformed == 0
    }
}

/// Full result of driving one image through the accelerator.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub image_size: usize,
    pub tile_edge: usize,
    pub tiles: Vec<TileReport>,
    pub summary: LinkSummary,
    /// Global detections in tile scan order, then reply order.
    pub detections: DetectionSet,
    pub timing: TimingBreakdown,
}

impl DispatchReport {
    /// Raw detections lost to the capacity cap.
    pub fn dropped(&self) -> usize {
        self.detections.dropped()
    }

    pub fn tile(&self, coord: TileCoord) -> Option<&TileReport> {
        self.tiles.iter().find(|t| t.tile == coord)
    }
}
