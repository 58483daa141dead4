//! Byte-level link to the accelerator.
//!
//! A [`Transport`] offers a blocking single-byte send and owns the receive
//! side as an [`RxQueue`]. Whatever observes incoming bytes (a reader
//! thread, an interrupt shim, a simulated device) holds the matching
//! [`RxSink`] and pushes every byte into it; the dispatcher drains the
//! queue between exchanges.

mod rx;
mod stream;
mod timing;

pub use rx::{rx_channel, Delivery, RawReply, RxQueue, RxSink, DEFAULT_RX_CAPACITY};
pub use stream::StreamTransport;
pub use timing::{LinkTiming, ReplyWait};
pub(crate) use timing::pause;

use std::fmt;

/// Failures of the underlying byte link.
#[derive(Debug)]
pub enum LinkError {
    /// Writing to the device failed.
    Io(std::io::Error),
    /// The receiving end of the link has gone away.
    Disconnected,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "link i/o error: {err}"),
            Self::Disconnected => write!(f, "link disconnected"),
        }
    }
}

impl std::error::Error for LinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Disconnected => None,
        }
    }
}

impl From<std::io::Error> for LinkError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

/// Host side of a byte link with no flow control.
pub trait Transport {
    /// Send one byte, blocking until the link accepts it.
    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError>;

    /// Receive queue fed by the link's notification path.
    fn rx(&mut self) -> &mut RxQueue;

    /// Send a slice byte by byte, without inter-byte pacing.
    fn send_all(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        for &b in bytes {
            self.send_byte(b)?;
        }
        Ok(())
    }
}
