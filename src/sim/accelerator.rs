use super::hough::{detect_lines, HoughParams};
use crate::protocol::{PackedBitmap, HEADER_BYTE, MAX_REPLY_LINES};
use crate::transport::{rx_channel, LinkError, RxQueue, RxSink, Transport, DEFAULT_RX_CAPACITY};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::thread;
use std::time::Duration;

/// Knobs of the software accelerator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedAcceleratorConfig {
    pub tile_edge: usize,
    /// Delay between the last payload byte and the reply.
    pub processing_delay_ms: u64,
    pub hough: HoughParams,
}

impl Default for SimulatedAcceleratorConfig {
    fn default() -> Self {
        Self {
            tile_edge: 16,
            processing_delay_ms: 0,
            hough: HoughParams::default(),
        }
    }
}

/// Scripted misbehaviour for one reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReplyFault {
    /// Send nothing.
    Silent,
    /// Cut the reply after this many bytes.
    TruncateTo(usize),
    /// Replace the count byte, keeping the groups.
    CountOverride(u8),
    /// Append extra bytes after a well-formed reply.
    Trailing(Vec<u8>),
}

enum RxState {
    WaitHeader,
    Payload(Vec<u8>),
}

/// In-process stand-in for the accelerator, speaking the headerless protocol.
///
/// Bytes sent by the host are consumed by a small state machine; after a
/// complete tile the reply is pushed into the host's receive queue, either
/// inline or from a short-lived thread when a processing delay is set.
pub struct SimulatedAccelerator {
    config: SimulatedAcceleratorConfig,
    sink: RxSink,
    queue: RxQueue,
    state: RxState,
    faults: VecDeque<Option<ReplyFault>>,
    frames: usize,
    ignored: usize,
    last_tile: Option<PackedBitmap>,
}

impl SimulatedAccelerator {
    pub fn new(config: SimulatedAcceleratorConfig) -> Self {
        let (sink, queue) = rx_channel(DEFAULT_RX_CAPACITY);
        Self {
            config,
            sink,
            queue,
            state: RxState::WaitHeader,
            faults: VecDeque::new(),
            frames: 0,
            ignored: 0,
            last_tile: None,
        }
    }

    /// Queue the fault plan for the next replies, one entry per frame.
    /// `None` entries reply normally.
    pub fn script_faults(&mut self, plan: impl IntoIterator<Item = Option<ReplyFault>>) {
        self.faults.extend(plan);
    }

    /// Frames fully received so far.
    pub fn frames_received(&self) -> usize {
        self.frames
    }

    /// Bytes seen outside a frame (noise, footers).
    pub fn ignored_bytes(&self) -> usize {
        self.ignored
    }

    pub fn last_tile(&self) -> Option<&PackedBitmap> {
        self.last_tile.as_ref()
    }

    /// Reply bytes for `tile` without any fault applied.
    pub fn reply_for(&self, tile: &PackedBitmap) -> Vec<u8> {
        let lines = detect_lines(tile, &self.config.hough);
        let count = lines.len().min(MAX_REPLY_LINES);
        let mut out = Vec::with_capacity(1 + 3 * count);
        out.push(count as u8);
        for line in lines.iter().take(count) {
            out.extend_from_slice(&[line.rho, line.theta_deg, line.votes]);
        }
        out
    }

    fn payload_len(&self) -> usize {
        PackedBitmap::byte_len(self.config.tile_edge, self.config.tile_edge)
    }

    fn finish_frame(&mut self, payload: Vec<u8>) -> Result<(), LinkError> {
        let edge = self.config.tile_edge;
        let Some(tile) = PackedBitmap::from_bytes(edge, edge, payload) else {
            return Ok(());
        };
        self.frames += 1;
        let mut reply = self.reply_for(&tile);
        self.last_tile = Some(tile);

        match self.faults.pop_front().flatten() {
            None => {}
            Some(ReplyFault::Silent) => reply.clear(),
            Some(ReplyFault::TruncateTo(n)) => reply.truncate(n),
            Some(ReplyFault::CountOverride(n)) => reply[0] = n,
            Some(ReplyFault::Trailing(extra)) => reply.extend(extra),
        }
        debug!(
            "SimulatedAccelerator frame={} reply={:?}",
            self.frames, reply
        );
        self.deliver(reply)
    }

    fn deliver(&self, reply: Vec<u8>) -> Result<(), LinkError> {
        if reply.is_empty() {
            return Ok(());
        }
        let delay = Duration::from_millis(self.config.processing_delay_ms);
        if delay.is_zero() {
            self.sink.notify_all(&reply);
            return Ok(());
        }
        let sink = self.sink.clone();
        thread::Builder::new()
            .name("sim-accelerator".to_string())
            .spawn(move || {
                thread::sleep(delay);
                sink.notify_all(&reply);
            })?;
        Ok(())
    }
}

impl Default for SimulatedAccelerator {
    fn default() -> Self {
        Self::new(SimulatedAcceleratorConfig::default())
    }
}

impl Transport for SimulatedAccelerator {
    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        let state = std::mem::replace(&mut self.state, RxState::WaitHeader);
        match state {
            RxState::WaitHeader => {
                if byte == HEADER_BYTE {
                    self.state = RxState::Payload(Vec::with_capacity(self.payload_len()));
                } else {
                    trace!("SimulatedAccelerator ignoring 0x{byte:02X}");
                    self.ignored += 1;
                }
            }
            RxState::Payload(mut payload) => {
                payload.push(byte);
                if payload.len() >= self.payload_len() {
                    self.finish_frame(payload)?;
                } else {
                    self.state = RxState::Payload(payload);
                }
            }
        }
        Ok(())
    }

    fn rx(&mut self) -> &mut RxQueue {
        &mut self.queue
    }
}
