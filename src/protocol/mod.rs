//! Wire protocol between the host and the Hough accelerator.
//!
//! Two link variants exist and they are not compatible with each other:
//!
//! - [`ProtocolVariant::Headerless`]: the tile-dispatch protocol. The host
//!   sends `0xAA` followed by a packed 16×16 bitmap; the accelerator answers
//!   with a bare count byte and `count` groups of `(rho, theta, votes)`.
//!   See [`frame`] and [`reply`].
//! - [`ProtocolVariant::EchoSynced`]: the bring-up loopback link, where the
//!   device echoes the transmitted header and payload back. The receiver
//!   synchronises on the header with the state machine in [`echo`].
//!
//! Decoders for the two variants are separate types and never share state.

pub mod echo;
pub mod frame;
pub mod packed;
pub mod reply;

use serde::{Deserialize, Serialize};

/// Synchronisation byte opening every host → accelerator frame.
pub const HEADER_BYTE: u8 = 0xAA;
/// Optional host-side footer marker; the accelerator ignores it.
pub const FOOTER_BYTE: u8 = 0x55;
/// Sanity ceiling on the reply count byte.
pub const MAX_REPLY_LINES: usize = 4;
/// Bytes per `(rho, theta, votes)` group in a reply.
pub const REPLY_GROUP_LEN: usize = 3;

/// Tag selecting which link variant a component speaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolVariant {
    Headerless,
    EchoSynced,
}

pub use echo::{encode_echo_frame, match_ratio, EchoReceiver, SyncState};
pub use frame::{encode_frame, transmit_frame, transmit_paced, FrameOptions};
pub use packed::PackedBitmap;
pub use reply::{decode_reply, expected_reply_len, DecodePolicy, ReplyStatus, TileReply};
