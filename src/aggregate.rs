//! Cross-tile merging of near-duplicate detections.
//!
//! A line crossing several tiles is reported once per tile, and the coarse
//! theta quantization makes neighbouring bins fire for the same line. The
//! aggregator folds these into one representative per cluster.
//!
//! The pass is greedy and order-dependent: each detection is compared with
//! the accepted list in order and joins the first cluster within both
//! tolerances. Within a cluster the highest-votes detection wins outright;
//! no averaging is done.
use crate::angle::theta_difference_deg;
use crate::types::{DetectionSet, GlobalDetection, DEFAULT_MAX_DETECTIONS};
use log::debug;
use serde::{Deserialize, Serialize};

/// Merge tolerances. Both comparisons are strict (`<`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateParams {
    pub rho_delta: f32,
    /// Plain integer difference, no wrap-around at 180°.
    pub theta_delta_deg: u8,
    pub max_lines: usize,
}

impl Default for AggregateParams {
    fn default() -> Self {
        Self {
            rho_delta: 3.0,
            theta_delta_deg: 15,
            max_lines: DEFAULT_MAX_DETECTIONS,
        }
    }
}

/// Counters describing one aggregation pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateStats {
    pub input: usize,
    pub accepted: usize,
    /// Detections that replaced a weaker cluster representative.
    pub replaced: usize,
    /// Detections discarded in favour of an existing representative.
    pub absorbed: usize,
    /// New clusters rejected because the list was full.
    pub dropped: usize,
}

pub struct LineAggregator {
    params: AggregateParams,
}

impl LineAggregator {
    pub fn new(params: AggregateParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AggregateParams {
        &self.params
    }

    /// True if `a` and `b` fall in the same cluster.
    pub fn matches(&self, a: &GlobalDetection, b: &GlobalDetection) -> bool {
        (a.global_rho - b.global_rho).abs() < self.params.rho_delta
            && theta_difference_deg(a.theta_deg, b.theta_deg) < self.params.theta_delta_deg
    }

    /// Cluster `detections` in order, returning one representative per cluster.
    pub fn aggregate<'a, I>(&self, detections: I) -> (DetectionSet, AggregateStats)
    where
        I: IntoIterator<Item = &'a GlobalDetection>,
    {
        let mut lines = DetectionSet::with_capacity(self.params.max_lines);
        let mut stats = AggregateStats::default();
        for det in detections {
            stats.input += 1;
            let hit = lines.iter().position(|existing| self.matches(existing, det));
            match hit {
                Some(idx) => {
                    if let Some(existing) = lines.get_mut(idx) {
                        if det.votes > existing.votes {
                            *existing = *det;
                            stats.replaced += 1;
                        } else {
                            stats.absorbed += 1;
                        }
                    }
                }
                None => {
                    if !lines.push(*det) {
                        stats.dropped += 1;
                    }
                }
            }
        }
        stats.accepted = lines.len();
        debug!(
            "LineAggregator input={} accepted={} replaced={} absorbed={} dropped={}",
            stats.input, stats.accepted, stats.replaced, stats.absorbed, stats.dropped
        );
        (lines, stats)
    }
}

impl Default for LineAggregator {
    fn default() -> Self {
        Self::new(AggregateParams::default())
    }
}
