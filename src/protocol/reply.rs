//! Accelerator → host reply decoding (headerless, count-prefixed).
//!
//! The first byte after the tile is the line count `N`, followed by `N`
//! groups of `(rho, theta, votes)`. Nothing else frames the reply, so the
//! decoder reports how well the observed bytes matched the declared shape.
use super::{MAX_REPLY_LINES, REPLY_GROUP_LEN};
use crate::types::LocalDetection;
use serde::{Deserialize, Serialize};

/// What to do with a reply that does not match its declared shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// Clamp an oversized count to the ceiling and keep every complete
    /// group that arrived.
    #[default]
    Lenient,
    /// Any violation yields no detections.
    Strict,
}

/// Outcome of one exchange.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyStatus {
    /// No bytes at all within the window.
    Silent,
    /// Well-formed reply with `count` detections.
    Ok { count: usize },
    /// Fewer bytes than the (possibly clamped) count implies.
    Truncated {
        declared: usize,
        received_groups: usize,
    },
    /// Count byte above the sanity ceiling.
    Malformed { declared: usize },
}

impl ReplyStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// Decoded reply for one tile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TileReply {
    pub status: ReplyStatus,
    pub detections: Vec<LocalDetection>,
    /// Bytes received beyond the expected length.
    pub trailing: usize,
}

/// Total reply length implied by its first byte.
///
/// Under `Lenient` the count is clamped first, so a count byte of 200 never
/// asks for more than `1 + 3 * 4` bytes. Under `Strict` an oversized count
/// ends the reply at the count byte itself.
pub fn expected_reply_len(count_byte: u8, policy: DecodePolicy) -> usize {
    let declared = count_byte as usize;
    let lines = match policy {
        DecodePolicy::Lenient => declared.min(MAX_REPLY_LINES),
        DecodePolicy::Strict if declared > MAX_REPLY_LINES => 0,
        DecodePolicy::Strict => declared,
    };
    1 + REPLY_GROUP_LEN * lines
}

/// Decode raw reply bytes.
pub fn decode_reply(raw: &[u8], policy: DecodePolicy) -> TileReply {
    let Some((&count_byte, body)) = raw.split_first() else {
        return TileReply {
            status: ReplyStatus::Silent,
            detections: Vec::new(),
            trailing: 0,
        };
    };
    let declared = count_byte as usize;
    let wanted = declared.min(MAX_REPLY_LINES);
    let available = body.len() / REPLY_GROUP_LEN;
    let parsed = wanted.min(available);

    let status = if declared > MAX_REPLY_LINES {
        ReplyStatus::Malformed { declared }
    } else if available < wanted {
        ReplyStatus::Truncated {
            declared,
            received_groups: available,
        }
    } else {
        ReplyStatus::Ok { count: declared }
    };

    let keep = match (policy, status) {
        (DecodePolicy::Strict, ReplyStatus::Ok { .. }) => parsed,
        (DecodePolicy::Strict, _) => 0,
        (DecodePolicy::Lenient, _) => parsed,
    };

    let detections = body
        .chunks_exact(REPLY_GROUP_LEN)
        .take(keep)
        .map(|g| LocalDetection {
            rho: g[0],
            theta_deg: g[1],
            votes: g[2],
        })
        .collect();

    let expected = expected_reply_len(count_byte, policy);
    TileReply {
        status,
        detections,
        trailing: raw.len().saturating_sub(expected),
    }
}
