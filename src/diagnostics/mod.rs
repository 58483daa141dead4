//! Serializable reports produced by the dispatcher and the demo tools.
//!
//! `DispatchReport` is the main entry point: one `TileReport` per exchange
//! plus the raw detection set and a timing trace. Everything here derives
//! `Serialize` so the binaries can dump it with `write_json_file`.

pub mod report;
pub mod timing;

pub use report::{DispatchReport, LinkSummary, TileReport};
pub use timing::{StageTiming, TimingBreakdown};
