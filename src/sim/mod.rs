//! Software doubles for the devices on the other end of the link.
//!
//! [`SimulatedAccelerator`] answers tiles with a 16-bin Hough vote so the
//! dispatcher can run end-to-end on a desk. [`SimulatedEcho`] loops bytes
//! back for the bring-up link. Neither models the real core's internals.

pub mod accelerator;
pub mod echo;
pub mod hough;

pub use accelerator::{ReplyFault, SimulatedAccelerator, SimulatedAcceleratorConfig};
pub use echo::{SimulatedEcho, SimulatedEchoConfig};
pub use hough::{detect_lines, HoughParams};
