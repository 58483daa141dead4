//! Receiver for the echoing bring-up link.
//!
//! On this link the device loops transmitted bytes back, possibly repeating
//! the header. The receiver discards everything up to the first header,
//! skips repeated headers, then collects a fixed number of payload bytes.
//! Header-valued bytes inside the payload are kept once collecting.
use super::HEADER_BYTE;
use log::debug;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SyncState {
    /// Waiting for a header byte.
    Unsynced,
    /// Header seen; skipping echoed headers.
    Synced,
    /// Appending payload bytes.
    Collecting,
}

#[derive(Clone, Debug)]
pub struct EchoReceiver {
    header: u8,
    expected: usize,
    state: SyncState,
    buffer: Vec<u8>,
    discarded: usize,
}

impl EchoReceiver {
    pub fn new(expected: usize) -> Self {
        Self::with_header(HEADER_BYTE, expected)
    }

    pub fn with_header(header: u8, expected: usize) -> Self {
        Self {
            header,
            expected,
            state: SyncState::Unsynced,
            buffer: Vec::with_capacity(expected),
            discarded: 0,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Payload bytes gathered in the current exchange.
    pub fn collected(&self) -> &[u8] {
        &self.buffer
    }

    /// Bytes thrown away while unsynced or skipping headers.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Drop any partial exchange and wait for the next header.
    pub fn reset(&mut self) {
        if self.state != SyncState::Unsynced {
            debug!(
                "EchoReceiver reset state={:?} collected={}",
                self.state,
                self.buffer.len()
            );
        }
        self.state = SyncState::Unsynced;
        self.buffer.clear();
    }

    /// Feed one received byte. Returns the payload once `expected` bytes
    /// have been collected; the receiver is then unsynced again.
    pub fn feed(&mut self, byte: u8) -> Option<Vec<u8>> {
        match self.state {
            SyncState::Unsynced => {
                if byte == self.header {
                    self.state = SyncState::Synced;
                    self.buffer.clear();
                } else {
                    self.discarded += 1;
                }
                None
            }
            SyncState::Synced if byte == self.header => {
                self.discarded += 1;
                None
            }
            SyncState::Synced | SyncState::Collecting => {
                self.state = SyncState::Collecting;
                self.buffer.push(byte);
                if self.buffer.len() >= self.expected {
                    self.state = SyncState::Unsynced;
                    Some(std::mem::take(&mut self.buffer))
                } else {
                    None
                }
            }
        }
    }

    /// Feed a run of bytes, returning the first completed payload.
    pub fn feed_all(&mut self, bytes: &[u8]) -> Option<Vec<u8>> {
        bytes.iter().find_map(|&b| self.feed(b))
    }
}

/// Header followed by `payload`, sent unpacked on the echo link.
pub fn encode_echo_frame(header: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + 1);
    out.push(header);
    out.extend_from_slice(payload);
    out
}

/// Fraction of positions where `echoed` matches `sent`. Missing bytes count
/// as mismatches.
pub fn match_ratio(sent: &[u8], echoed: &[u8]) -> f32 {
    if sent.is_empty() {
        return 1.0;
    }
    let matched = sent.iter().zip(echoed).filter(|(a, b)| a == b).count();
    matched as f32 / sent.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_before_header_is_discarded() {
        let mut rx = EchoReceiver::new(3);
        assert!(rx.feed_all(&[0x00, 0x13]).is_none());
        assert_eq!(rx.state(), SyncState::Unsynced);
        assert_eq!(rx.discarded(), 2);
        assert!(rx.feed(0xAA).is_none());
        assert_eq!(rx.state(), SyncState::Synced);
    }

    #[test]
    fn repeated_headers_are_skipped() {
        let mut rx = EchoReceiver::new(3);
        let out = rx.feed_all(&[0xAA, 0xAA, 0xAA, 1, 2, 3]);
        assert_eq!(out, Some(vec![1, 2, 3]));
        assert_eq!(rx.state(), SyncState::Unsynced);
    }

    #[test]
    fn header_value_inside_payload_is_kept() {
        let mut rx = EchoReceiver::new(3);
        let out = rx.feed_all(&[0xAA, 7, 0xAA, 9]);
        assert_eq!(out, Some(vec![7, 0xAA, 9]));
    }

    #[test]
    fn reset_drops_partial_exchange() {
        let mut rx = EchoReceiver::new(4);
        rx.feed_all(&[0xAA, 1, 2]);
        assert_eq!(rx.state(), SyncState::Collecting);
        rx.reset();
        assert_eq!(rx.state(), SyncState::Unsynced);
        assert!(rx.collected().is_empty());
        assert_eq!(rx.feed_all(&[5, 0xAA, 1, 2, 3, 4]), Some(vec![1, 2, 3, 4]));
    }

    #[test]
    fn match_ratio_counts_missing_bytes() {
        assert_eq!(match_ratio(&[1, 2, 3, 4], &[1, 2, 3, 4]), 1.0);
        assert_eq!(match_ratio(&[1, 2, 3, 4], &[1, 0, 3]), 0.5);
        let frame = encode_echo_frame(0xAA, &[9, 8]);
        assert_eq!(frame, vec![0xAA, 9, 8]);
    }
}
