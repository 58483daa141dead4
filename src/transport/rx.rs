//! Receive-side handoff between the notification path and the dispatcher.
//!
//! The sink end is the only writer and the queue end the only reader. The
//! queue is bounded; bytes arriving while it is full are dropped and
//! counted, mirroring a fixed receive buffer.
use super::timing::{pause, ReplyWait};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const DEFAULT_RX_CAPACITY: usize = 256;

/// Create a connected sink/queue pair holding at most `capacity` bytes.
pub fn rx_channel(capacity: usize) -> (RxSink, RxQueue) {
    let (tx, rx) = bounded(capacity);
    let overflow = Arc::new(AtomicUsize::new(0));
    (
        RxSink {
            tx,
            overflow: overflow.clone(),
        },
        RxQueue { rx, overflow },
    )
}

/// Writer end, held by whatever observes incoming bytes.
#[derive(Clone, Debug)]
pub struct RxSink {
    tx: Sender<u8>,
    overflow: Arc<AtomicUsize>,
}

/// Outcome of handing one byte to the queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    /// The queue was full; the byte was dropped and counted.
    Overflow,
    /// The queue end is gone; nothing will read further bytes.
    Closed,
}

impl RxSink {
    /// Hand one received byte to the host.
    pub fn notify(&self, byte: u8) -> Delivery {
        match self.tx.try_send(byte) {
            Ok(()) => Delivery::Queued,
            Err(TrySendError::Full(_)) => {
                self.overflow.fetch_add(1, Ordering::Relaxed);
                Delivery::Overflow
            }
            Err(TrySendError::Disconnected(_)) => Delivery::Closed,
        }
    }

    /// Hand over a run of bytes. Returns `false` once the queue end is gone.
    pub fn notify_all(&self, bytes: &[u8]) -> bool {
        bytes.iter().all(|&b| self.notify(b) != Delivery::Closed)
    }
}

/// Bytes gathered for one exchange.
#[derive(Clone, Debug, Default)]
pub struct RawReply {
    pub bytes: Vec<u8>,
    /// True if the expected length was known and reached.
    pub complete: bool,
    /// Every sink was dropped before the reply completed.
    pub disconnected: bool,
    /// Bytes lost to a full queue since the last clear.
    pub overflowed: usize,
    pub elapsed: Duration,
}

/// Reader end, owned by the transport and drained by the dispatcher.
#[derive(Debug)]
pub struct RxQueue {
    rx: Receiver<u8>,
    overflow: Arc<AtomicUsize>,
}

impl RxQueue {
    /// Bytes waiting to be read.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Discard stale bytes and reset the overflow counter. Returns the
    /// number of bytes discarded.
    pub fn clear(&mut self) -> usize {
        self.overflow.store(0, Ordering::Relaxed);
        self.rx.try_iter().count()
    }

    /// Take everything currently queued without waiting.
    pub fn drain(&mut self) -> Vec<u8> {
        self.rx.try_iter().collect()
    }

    /// Gather one reply within `window`.
    ///
    /// `expected_len` inspects the bytes received so far and returns the
    /// total reply length once it can be known.
    pub fn collect<F>(&mut self, wait: ReplyWait, window: Duration, expected_len: F) -> RawReply
    where
        F: Fn(&[u8]) -> Option<usize>,
    {
        let start = Instant::now();
        let mut reply = RawReply::default();
        match wait {
            ReplyWait::FixedWindow => {
                pause(window);
                reply.bytes = self.drain();
                match self.rx.try_recv() {
                    Ok(b) => reply.bytes.push(b),
                    Err(TryRecvError::Disconnected) => reply.disconnected = true,
                    Err(TryRecvError::Empty) => {}
                }
                reply.complete = expected_len(&reply.bytes).is_some_and(|n| reply.bytes.len() >= n);
            }
            ReplyWait::UntilComplete => {
                let deadline = start + window;
                loop {
                    if expected_len(&reply.bytes).is_some_and(|n| reply.bytes.len() >= n) {
                        reply.complete = true;
                        break;
                    }
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.rx.recv_timeout(remaining) {
                        Ok(b) => reply.bytes.push(b),
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => {
                            reply.disconnected = true;
                            break;
                        }
                    }
                }
            }
        }
        reply.overflowed = self.overflow.load(Ordering::Relaxed);
        reply.elapsed = start.elapsed();
        reply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_prefixed(bytes: &[u8]) -> Option<usize> {
        bytes.first().map(|&n| 1 + 3 * n as usize)
    }

    #[test]
    fn clear_discards_stale_bytes() {
        let (sink, mut queue) = rx_channel(8);
        sink.notify_all(&[1, 2, 3]);
        assert_eq!(queue.pending(), 3);
        assert_eq!(queue.clear(), 3);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn full_queue_counts_overflow() {
        let (sink, mut queue) = rx_channel(2);
        assert_eq!(sink.notify(1), Delivery::Queued);
        assert_eq!(sink.notify(2), Delivery::Queued);
        assert_eq!(sink.notify(3), Delivery::Overflow);
        let reply = queue.collect(ReplyWait::FixedWindow, Duration::ZERO, count_prefixed);
        assert_eq!(reply.bytes, vec![1, 2]);
        assert_eq!(reply.overflowed, 1);
    }

    #[test]
    fn until_complete_returns_early() {
        let (sink, mut queue) = rx_channel(16);
        sink.notify_all(&[1, 10, 20, 30, 99]);
        let reply = queue.collect(
            ReplyWait::UntilComplete,
            Duration::from_secs(5),
            count_prefixed,
        );
        assert!(reply.complete);
        assert_eq!(reply.bytes, vec![1, 10, 20, 30]);
        assert!(reply.elapsed < Duration::from_secs(1));
        // trailing byte is left for the next clear
        assert_eq!(queue.pending(), 1);
    }

    #[test]
    fn bytes_from_another_thread_arrive_in_order() {
        let (sink, mut queue) = rx_channel(16);
        let handle = std::thread::spawn(move || {
            for b in [2u8, 1, 2, 3, 4, 5, 6] {
                sink.notify(b);
                std::thread::sleep(Duration::from_millis(1));
            }
        });
        let reply = queue.collect(
            ReplyWait::UntilComplete,
            Duration::from_secs(2),
            count_prefixed,
        );
        handle.join().expect("sender thread");
        assert!(reply.complete);
        assert_eq!(reply.bytes, vec![2, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn dropped_sink_ends_the_wait() {
        let (sink, mut queue) = rx_channel(4);
        drop(sink);
        let reply = queue.collect(
            ReplyWait::UntilComplete,
            Duration::from_secs(5),
            count_prefixed,
        );
        assert!(reply.disconnected);
        assert!(reply.bytes.is_empty());
        assert!(!reply.complete);
    }

    #[test]
    fn dropped_sink_is_seen_after_a_fixed_window() {
        let (sink, mut queue) = rx_channel(4);
        sink.notify_all(&[0]);
        drop(sink);
        let reply = queue.collect(ReplyWait::FixedWindow, Duration::ZERO, count_prefixed);
        assert!(reply.disconnected);
        assert_eq!(reply.bytes, vec![0]);
        assert!(reply.complete);
    }

    #[test]
    fn open_sink_is_not_reported_disconnected() {
        let (_sink, mut queue) = rx_channel(4);
        let reply = queue.collect(ReplyWait::FixedWindow, Duration::ZERO, count_prefixed);
        assert!(!reply.disconnected);
        assert!(reply.bytes.is_empty());
    }

    #[test]
    fn dropped_queue_closes_the_sink() {
        let (sink, queue) = rx_channel(1);
        drop(queue);
        assert_eq!(sink.notify(1), Delivery::Closed);
        assert!(!sink.notify_all(&[1, 2]));
    }
}
