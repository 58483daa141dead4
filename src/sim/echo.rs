use crate::protocol::HEADER_BYTE;
use crate::transport::{rx_channel, LinkError, RxQueue, RxSink, Transport, DEFAULT_RX_CAPACITY};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedEchoConfig {
    /// Payload bytes per frame after the header.
    pub payload_len: usize,
    /// Extra copies of the header echoed at the start of each frame.
    pub repeat_header: usize,
    /// Bytes emitted before the first echoed frame.
    pub leading_noise: Vec<u8>,
}

impl Default for SimulatedEchoConfig {
    fn default() -> Self {
        Self {
            payload_len: 256,
            repeat_header: 1,
            leading_noise: vec![0x00],
        }
    }
}

/// Loopback device for the echo-synchronised link.
pub struct SimulatedEcho {
    config: SimulatedEchoConfig,
    sink: RxSink,
    queue: RxQueue,
    /// Payload bytes still expected in the current frame; `None` between frames.
    remaining: Option<usize>,
    noise_sent: bool,
}

impl SimulatedEcho {
    pub fn new(config: SimulatedEchoConfig) -> Self {
        let capacity = DEFAULT_RX_CAPACITY.max(config.payload_len + config.repeat_header + 8);
        let (sink, queue) = rx_channel(capacity);
        Self {
            config,
            sink,
            queue,
            remaining: None,
            noise_sent: false,
        }
    }
}

impl Default for SimulatedEcho {
    fn default() -> Self {
        Self::new(SimulatedEchoConfig::default())
    }
}

impl Transport for SimulatedEcho {
    fn send_byte(&mut self, byte: u8) -> Result<(), LinkError> {
        if !self.noise_sent {
            self.sink.notify_all(&self.config.leading_noise);
            self.noise_sent = true;
        }
        self.sink.notify(byte);
        match self.remaining {
            None if byte == HEADER_BYTE => {
                for _ in 0..self.config.repeat_header {
                    self.sink.notify(byte);
                }
                self.remaining = Some(self.config.payload_len);
            }
            None => {}
            Some(n) if n <= 1 => self.remaining = None,
            Some(n) => self.remaining = Some(n - 1),
        }
        Ok(())
    }

    fn rx(&mut self) -> &mut RxQueue {
        &mut self.queue
    }
}
