//! Transport over any byte stream pair, e.g. an already-configured tty node.
//!
//! Port setup (baud rate, framing, pin muxing) happens outside this crate.
//! A background thread reads the stream and acts as the receive
//! notification path.
use super::rx::{rx_channel, RxQueue, RxSink, DEFAULT_RX_CAPACITY};
use super::{LinkError, Transport};
use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::thread;

pub struct StreamTransport<W: Write> {
    writer: W,
    queue: RxQueue,
}

impl<W: Write> StreamTransport<W> {
    /// Wrap a writer and spawn a reader thread feeding the receive queue.
    pub fn new<R>(reader: R, writer: W) -> Result<Self, String>
    where
        R: Read + Send + 'static,
    {
        Self::with_capacity(reader, writer, DEFAULT_RX_CAPACITY)
    }

    /// Like [`StreamTransport::new`] with a receive queue of `capacity` bytes.
    ///
    /// The reader thread also stops on its first read after the transport
    /// is dropped.
    pub fn with_capacity<R>(reader: R, writer: W, capacity: usize) -> Result<Self, String>
    where
        R: Read + Send + 'static,
    {
        let (sink, queue) = rx_channel(capacity.max(1));
        thread::Builder::new()
            .name("link-rx".to_string())
            .spawn(move || read_loop(reader, sink))
            .map_err(|e| format!("Failed to spawn link reader: {e}"))?;
        Ok(Self { writer, queue })
    }
}

impl StreamTransport<File> {
    /// Open a character device (or FIFO) for both directions, with a
    /// receive queue of `capacity` bytes.
    pub fn open_device(path: &Path, capacity: usize) -> Result<Self, String> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
        let reader = file
            .try_clone()
            .map_err(|e| format!("Failed to clone handle for {}: {e}", path.display()))?;
        debug!(
            "StreamTransport::open_device {} rx_capacity={capacity}",
            path.display()
        );
        Self::with_capacity(reader, file, capacity)
    }
}

impl<W: Write> Transport for StreamTransport<W> {
    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        self.writer.write_all(&[byte])?;
        self.writer.flush()?;
        Ok(())
    }

    fn rx(&mut self) -> &mut RxQueue {
        &mut self.queue
    }
}

fn read_loop<R: Read>(mut reader: R, sink: RxSink) {
    let mut buf = [0u8; 64];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                debug!("link reader: end of stream");
                break;
            }
            Ok(n) => {
                if !sink.notify_all(&buf[..n]) {
                    debug!("link reader: receive queue closed");
                    break;
                }
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("link reader stopped: {e}");
                break;
            }
        }
    }
}
