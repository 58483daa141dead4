#![doc = include_str!("../README.md")]

// Core pipeline
pub mod aggregate;
pub mod dispatch;
pub mod overlay;
pub mod protocol;
pub mod transform;
pub mod transport;
pub mod types;

// Supporting modules
pub mod angle;
pub mod config;
pub mod diagnostics;
pub mod image;
pub mod patterns;
pub mod sim;

// --- High-level re-exports -------------------------------------------------

pub use crate::aggregate::{AggregateParams, AggregateStats, LineAggregator};
pub use crate::diagnostics::{DispatchReport, TileReport};
pub use crate::dispatch::{DispatchError, DispatchParams, TileDispatcher, TileGeometry};
pub use crate::transport::{LinkError, LinkTiming, Transport};
pub use crate::types::{DetectionSet, GlobalDetection, LocalDetection, TileCoord};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use hough_tiles::prelude::*;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let image = BinaryImage::from_fn(64, 64, |x, y| x == 32 || y == 32);
/// let params = DispatchParams {
///     timing: LinkTiming::immediate(),
///     ..Default::default()
/// };
/// let dispatcher = TileDispatcher::new(params)?;
/// let mut link = SimulatedAccelerator::default();
///
/// let report = dispatcher.run(&mut link, &image)?;
/// let (lines, _) = LineAggregator::default().aggregate(&report.detections);
/// for line in &lines {
///     println!("rho={:.1} theta={}", line.global_rho, line.theta_deg);
/// }
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::BinaryImage;
    pub use crate::sim::SimulatedAccelerator;
    pub use crate::{
        AggregateParams, DispatchParams, LineAggregator, LinkTiming, TileDispatcher, Transport,
    };
}
