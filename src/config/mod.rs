//! JSON run configurations for the binaries.
//!
//! Every section is optional and falls back to its `Default`; only the
//! input image path of `tile_dispatch` is required.

pub mod dispatch;
pub mod probe;

use crate::sim::{
    SimulatedAccelerator, SimulatedAcceleratorConfig, SimulatedEcho, SimulatedEchoConfig,
};
use crate::transport::{StreamTransport, Transport, DEFAULT_RX_CAPACITY};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Which device sits on the other end of the link.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkConfig {
    /// In-process software accelerator.
    Simulated(SimulatedAcceleratorConfig),
    /// In-process loopback device for the echo link.
    Echo(SimulatedEchoConfig),
    /// Already-configured character device or FIFO.
    Device {
        path: PathBuf,
        /// Receive queue size in bytes; defaults to [`DEFAULT_RX_CAPACITY`].
        #[serde(default)]
        rx_capacity: Option<usize>,
    },
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self::Simulated(SimulatedAcceleratorConfig::default())
    }
}

impl LinkConfig {
    pub fn connect(&self) -> Result<Box<dyn Transport>, String> {
        self.connect_with_rx_capacity(0)
    }

    /// Connect, growing a device link's receive queue to at least
    /// `min_rx_capacity` bytes.
    pub fn connect_with_rx_capacity(
        &self,
        min_rx_capacity: usize,
    ) -> Result<Box<dyn Transport>, String> {
        let link: Box<dyn Transport> = match self {
            Self::Simulated(cfg) => Box::new(SimulatedAccelerator::new(cfg.clone())),
            Self::Echo(cfg) => Box::new(SimulatedEcho::new(cfg.clone())),
            Self::Device { path, .. } => Box::new(StreamTransport::open_device(
                path,
                self.rx_capacity(min_rx_capacity),
            )?),
        };
        Ok(link)
    }

    pub fn describe(&self) -> String {
        match self {
            Self::Simulated(_) => "simulated accelerator".to_string(),
            Self::Echo(_) => "simulated echo device".to_string(),
            Self::Device { path, .. } => path.display().to_string(),
        }
    }

    /// Receive queue size a device link would be opened with.
    pub fn rx_capacity(&self, min_rx_capacity: usize) -> usize {
        let configured = match self {
            Self::Device { rx_capacity, .. } => *rx_capacity,
            _ => None,
        };
        configured.unwrap_or(DEFAULT_RX_CAPACITY).max(min_rx_capacity)
    }
}

/// Read and parse a JSON config file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}
