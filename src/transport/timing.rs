use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Link pacing parameters. None of these are negotiated with the device;
/// both sides must be configured to agree.
///
/// - `baud_rate`: serial bit rate, used to estimate wire time (8N1 → 10 bits/byte).
/// - `header_settle_ms`: pause after the sync header.
/// - `inter_byte_delay_ms`: pause after every payload byte.
/// - `reply_window_ms`: upper bound on waiting for a tile's reply.
/// - `inter_tile_settle_ms`: pause between consecutive tiles.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkTiming {
    pub baud_rate: u32,
    pub header_settle_ms: u64,
    pub inter_byte_delay_ms: u64,
    pub reply_window_ms: u64,
    pub inter_tile_settle_ms: u64,
}

impl Default for LinkTiming {
    fn default() -> Self {
        Self {
            baud_rate: 9600,
            header_settle_ms: 10,
            inter_byte_delay_ms: 2,
            // Hough core ~500 ms plus reply transmission at 9600 baud.
            reply_window_ms: 800,
            inter_tile_settle_ms: 200,
        }
    }
}

impl LinkTiming {
    /// No pacing at all; for simulated links and tests.
    pub fn immediate() -> Self {
        Self {
            header_settle_ms: 0,
            inter_byte_delay_ms: 0,
            reply_window_ms: 50,
            inter_tile_settle_ms: 0,
            ..Self::default()
        }
    }

    pub fn header_settle(&self) -> Duration {
        Duration::from_millis(self.header_settle_ms)
    }

    pub fn inter_byte_delay(&self) -> Duration {
        Duration::from_millis(self.inter_byte_delay_ms)
    }

    pub fn reply_window(&self) -> Duration {
        Duration::from_millis(self.reply_window_ms)
    }

    pub fn inter_tile_settle(&self) -> Duration {
        Duration::from_millis(self.inter_tile_settle_ms)
    }

    /// Time to clock `bytes` bytes over the wire at 10 bits per byte.
    pub fn wire_time(&self, bytes: usize) -> Duration {
        if self.baud_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(bytes as f64 * 10.0 / self.baud_rate as f64)
    }
}

/// How the host waits for a tile's reply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyWait {
    /// Sleep the whole reply window, then take whatever arrived.
    FixedWindow,
    /// Return as soon as the count byte and its groups are in, or at the
    /// end of the window.
    #[default]
    UntilComplete,
}

/// `thread::sleep` that skips zero durations.
#[inline]
pub(crate) fn pause(d: Duration) {
    if !d.is_zero() {
        std::thread::sleep(d);
    }
}
