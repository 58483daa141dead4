use super::{load_json, LinkConfig};
use crate::patterns::TestPattern;
use crate::protocol::{DecodePolicy, FrameOptions, ProtocolVariant};
use crate::transport::{LinkTiming, ReplyWait};

/// Spare queue room for repeated headers and noise on the echo link.
const ECHO_RX_HEADROOM: usize = 16;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Single-tile bring-up run.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub variant: ProtocolVariant,
    pub link: LinkConfig,
    pub tile_edge: usize,
    /// Patterns to send, in order; empty means all of them.
    pub patterns: Vec<TestPattern>,
    pub timing: LinkTiming,
    pub frame: FrameOptions,
    pub decode_policy: DecodePolicy,
    pub reply_wait: ReplyWait,
    /// Raw bytes sent after the header on the echo link.
    pub echo_payload_len: usize,
    pub json_out: Option<PathBuf>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            variant: ProtocolVariant::Headerless,
            link: LinkConfig::default(),
            tile_edge: 16,
            patterns: Vec::new(),
            timing: LinkTiming::default(),
            frame: FrameOptions::default(),
            decode_policy: DecodePolicy::default(),
            reply_wait: ReplyWait::default(),
            echo_payload_len: 256,
            json_out: None,
        }
    }
}

impl ProbeConfig {
    pub fn selected_patterns(&self) -> Vec<TestPattern> {
        if self.patterns.is_empty() {
            TestPattern::ALL.to_vec()
        } else {
            self.patterns.clone()
        }
    }

    /// Smallest receive queue that holds a whole echoed frame before it
    /// is drained.
    pub fn min_rx_capacity(&self) -> usize {
        match self.variant {
            ProtocolVariant::EchoSynced => 1 + self.echo_payload_len + ECHO_RX_HEADROOM,
            ProtocolVariant::Headerless => 0,
        }
    }
}

pub fn load_config(path: &Path) -> Result<ProbeConfig, String> {
    let config: ProbeConfig = load_json(path)?;
    if config.tile_edge == 0 {
        return Err(format!("tile_edge must be positive in {}", path.display()));
    }
    Ok(config)
}
