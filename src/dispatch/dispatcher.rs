use super::tiles::{GeometryError, TileGeometry, TileGrid};
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{DispatchReport, LinkSummary, TileReport, TimingBreakdown};
use crate::image::BinaryImage;
use crate::protocol::{
    decode_reply, expected_reply_len, transmit_frame, DecodePolicy, FrameOptions, PackedBitmap,
    ReplyStatus, MAX_REPLY_LINES, REPLY_GROUP_LEN,
};
use crate::transform::to_global;
use crate::transport::{pause, LinkError, LinkTiming, ReplyWait, Transport};
use crate::types::{DetectionSet, TileCoord, DEFAULT_MAX_DETECTIONS};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Everything the dispatcher needs besides the link and the image.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchParams {
    pub geometry: TileGeometry,
    pub timing: LinkTiming,
    pub frame: FrameOptions,
    pub decode_policy: DecodePolicy,
    pub reply_wait: ReplyWait,
    /// Capacity of the raw detection set.
    pub max_detections: usize,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            geometry: TileGeometry::default(),
            timing: LinkTiming::default(),
            frame: FrameOptions::default(),
            decode_policy: DecodePolicy::default(),
            reply_wait: ReplyWait::default(),
            max_detections: DEFAULT_MAX_DETECTIONS,
        }
    }
}

#[derive(Debug)]
pub enum DispatchError {
    Geometry(GeometryError),
    Link(LinkError),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(err) => write!(f, "invalid geometry: {err}"),
            Self::Link(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(err) => Some(err),
            Self::Link(err) => Some(err),
        }
    }
}

impl From<GeometryError> for DispatchError {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}

impl From<LinkError> for DispatchError {
    fn from(err: LinkError) -> Self {
        Self::Link(err)
    }
}

pub struct TileDispatcher {
    params: DispatchParams,
    grid: TileGrid,
}

impl TileDispatcher {
    pub fn new(params: DispatchParams) -> Result<Self, GeometryError> {
        let grid = TileGrid::new(params.geometry)?;
        Ok(Self { params, grid })
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Run every tile of `image` through `link`.
    ///
    /// Reply-level problems (silence, truncation, bad counts) are recorded
    /// per tile and do not stop the run; only link failures do.
    pub fn run<T>(&self, link: &mut T, image: &BinaryImage) -> Result<DispatchReport, DispatchError>
    where
        T: Transport + ?Sized,
    {
        let total_start = Instant::now();
        let mut timing = TimingBreakdown::default();

        let prep_start = Instant::now();
        let tiles = self.grid.pack_all(image)?;
        timing.push_since("pack_tiles", prep_start);
        self.log_wire_budget();

        let wire_start = Instant::now();
        let mut detections = DetectionSet::with_capacity(self.params.max_detections);
        let mut reports = Vec::with_capacity(tiles.len());
        let last = tiles.len().saturating_sub(1);
        for (i, (tile, bitmap)) in tiles.iter().enumerate() {
            let report = self.exchange_tile(link, *tile, bitmap, &mut detections)?;
            reports.push(report);
            if i < last {
                pause(self.params.timing.inter_tile_settle());
            }
        }
        timing.push_since("wire", wire_start);
        timing.total_ms = elapsed_ms(total_start);

        let summary = LinkSummary::from_tiles(&reports);
        info!(
            "TileDispatcher tiles={} ok={} silent={} truncated={} malformed={} detections={} dropped={}",
            reports.len(),
            summary.ok,
            summary.silent,
            summary.truncated,
            summary.malformed,
            detections.len(),
            detections.dropped()
        );
        Ok(DispatchReport {
            image_size: self.params.geometry.image_size,
            tile_edge: self.params.geometry.tile_edge,
            tiles: reports,
            summary,
            detections,
            timing,
        })
    }

    /// One tile exchange: clear, transmit, wait, decode, transform.
    pub fn exchange_tile<T>(
        &self,
        link: &mut T,
        tile: TileCoord,
        bitmap: &PackedBitmap,
        detections: &mut DetectionSet,
    ) -> Result<TileReport, LinkError>
    where
        T: Transport + ?Sized,
    {
        let start = Instant::now();
        let policy = self.params.decode_policy;
        let stale_discarded = link.rx().clear();
        if stale_discarded > 0 {
            debug!("tile {tile:?}: discarded {stale_discarded} stale bytes");
        }

        let bytes_sent = transmit_frame(link, bitmap, &self.params.frame, &self.params.timing)?;

        let raw = link.rx().collect(
            self.params.reply_wait,
            self.params.timing.reply_window(),
            |bytes: &[u8]| bytes.first().map(|&n| expected_reply_len(n, policy)),
        );
        if raw.disconnected && raw.bytes.is_empty() {
            return Err(LinkError::Disconnected);
        }
        let reply = decode_reply(&raw.bytes, policy);

        let before = detections.dropped();
        for local in &reply.detections {
            detections.push(to_global(*local, tile, self.params.geometry.tile_edge));
        }
        let dropped = detections.dropped() - before;

        match reply.status {
            ReplyStatus::Ok { .. } => {}
            ReplyStatus::Silent => warn!("tile {tile:?}: no reply"),
            status => warn!("tile {tile:?}: {status:?} ({} bytes)", raw.bytes.len()),
        }
        if raw.overflowed > 0 {
            warn!("tile {tile:?}: {} bytes lost to a full receive queue", raw.overflowed);
        }
        debug!(
            "tile {tile:?}: sent={bytes_sent} received={} detections={} reply_ms={:.1}",
            raw.bytes.len(),
            reply.detections.len(),
            raw.elapsed.as_secs_f64() * 1000.0
        );

        Ok(TileReport {
            tile,
            status: reply.status,
            set_pixels: bitmap.count_set(),
            bytes_sent,
            bytes_received: raw.bytes.len(),
            stale_discarded,
            trailing: reply.trailing,
            overflowed: raw.overflowed,
            detections: reply.detections.len(),
            dropped,
            reply_ms: raw.elapsed.as_secs_f64() * 1000.0,
            elapsed_ms: elapsed_ms(start),
        })
    }

    fn log_wire_budget(&self) {
        let timing = &self.params.timing;
        let edge = self.params.geometry.tile_edge;
        let max_reply = 1 + REPLY_GROUP_LEN * MAX_REPLY_LINES;
        let reply_wire = timing.wire_time(max_reply);
        let frame_len = 1 + PackedBitmap::byte_len(edge, edge);
        debug!(
            "wire budget: frame={}B ({:.1} ms) max_reply={}B ({:.1} ms) window={} ms",
            frame_len,
            timing.wire_time(frame_len).as_secs_f64() * 1000.0,
            max_reply,
            reply_wire.as_secs_f64() * 1000.0,
            timing.reply_window_ms
        );
        if reply_wire > timing.reply_window() {
            warn!(
                "reply window {} ms is shorter than the wire time of a full reply at {} baud",
                timing.reply_window_ms, timing.baud_rate
            );
        }
    }
}
