//! Host → accelerator tile frame: sync header, packed payload, optional footer.
use super::packed::PackedBitmap;
use super::HEADER_BYTE;
use crate::transport::{pause, LinkError, LinkTiming, Transport};
use log::debug;
use serde::{Deserialize, Serialize};

/// Framing knobs. The accelerator only requires the header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameOptions {
    pub header: u8,
    /// Host-side end marker, not validated or echoed by the accelerator.
    pub footer: Option<u8>,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            header: HEADER_BYTE,
            footer: None,
        }
    }
}

/// Wire bytes for one tile.
pub fn encode_frame(bitmap: &PackedBitmap, opts: &FrameOptions) -> Vec<u8> {
    let payload = bitmap.as_bytes();
    let mut out = Vec::with_capacity(payload.len() + 2);
    out.push(opts.header);
    out.extend_from_slice(payload);
    if let Some(footer) = opts.footer {
        out.push(footer);
    }
    out
}

/// Send `bytes` through `link` one at a time.
///
/// The first byte is followed by `header_settle`, every later byte by
/// `inter_byte_delay`. Returns the number of bytes written.
pub fn transmit_paced<T>(
    link: &mut T,
    bytes: &[u8],
    timing: &LinkTiming,
) -> Result<usize, LinkError>
where
    T: Transport + ?Sized,
{
    for (i, &byte) in bytes.iter().enumerate() {
        link.send_byte(byte)?;
        pause(if i == 0 {
            timing.header_settle()
        } else {
            timing.inter_byte_delay()
        });
    }
    Ok(bytes.len())
}

/// Send one tile through `link`, pacing bytes as `timing` prescribes.
///
/// Header and payload go through [`transmit_paced`]; the footer, if any,
/// follows without a pause. Returns the number of bytes written.
pub fn transmit_frame<T>(
    link: &mut T,
    bitmap: &PackedBitmap,
    opts: &FrameOptions,
    timing: &LinkTiming,
) -> Result<usize, LinkError>
where
    T: Transport + ?Sized,
{
    let frame = encode_frame(bitmap, opts);
    let payload_end = 1 + bitmap.as_bytes().len();
    let (paced, tail) = frame.split_at(payload_end);
    transmit_paced(link, paced, timing)?;
    link.send_all(tail)?;
    debug!(
        "transmit_frame sent={} set_pixels={}",
        frame.len(),
        bitmap.count_set()
    );
    Ok(frame.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::BinaryImage;
    use crate::protocol::FOOTER_BYTE;
    use crate::sim::SimulatedEcho;
    use std::time::{Duration, Instant};

    #[test]
    fn frame_is_header_then_payload() {
        let tile = BinaryImage::from_fn(16, 16, |c, r| r == 0 && c < 8);
        let bitmap = PackedBitmap::pack(&tile);
        let frame = encode_frame(&bitmap, &FrameOptions::default());
        assert_eq!(frame.len(), 33);
        assert_eq!(frame[0], 0xAA);
        assert_eq!(frame[1], 0xFF);
        assert!(frame[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn optional_footer_is_appended() {
        let bitmap = PackedBitmap::pack(&BinaryImage::new(16, 16));
        let opts = FrameOptions {
            footer: Some(FOOTER_BYTE),
            ..FrameOptions::default()
        };
        let frame = encode_frame(&bitmap, &opts);
        assert_eq!(frame.len(), 34);
        assert_eq!(*frame.last().expect("non-empty"), 0x55);
    }

    #[test]
    fn paced_send_waits_after_each_byte() {
        let mut link = SimulatedEcho::default();
        let timing = LinkTiming {
            header_settle_ms: 20,
            inter_byte_delay_ms: 5,
            ..LinkTiming::immediate()
        };
        let start = Instant::now();
        let sent = transmit_paced(&mut link, &[0xAA, 1, 2, 3], &timing).expect("in-process link");
        assert_eq!(sent, 4);
        assert!(start.elapsed() >= Duration::from_millis(35));
        // leading noise, the header and its repeat, then the payload
        assert_eq!(link.rx().drain(), vec![0x00, 0xAA, 0xAA, 1, 2, 3]);
    }

    #[test]
    fn footer_is_sent_after_the_payload() {
        let mut link = SimulatedEcho::default();
        let opts = FrameOptions {
            footer: Some(FOOTER_BYTE),
            ..FrameOptions::default()
        };
        let bitmap = PackedBitmap::pack(&BinaryImage::new(16, 16));
        let sent = transmit_frame(&mut link, &bitmap, &opts, &LinkTiming::immediate())
            .expect("in-process link");
        assert_eq!(sent, 34);
        let echoed = link.rx().drain();
        assert_eq!(echoed.last(), Some(&FOOTER_BYTE));
    }
}
