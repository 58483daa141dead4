//! Small Hough vote over one packed tile, used by the simulated accelerator.
//!
//! Orientation is quantized into `theta_bins` steps over `[0, 180)` using the
//! accelerator's truncating degree values. Rho is the rounded normal
//! distance from the tile origin; negative distances have no bin and are
//! not voted.
use crate::angle::{bin_theta_deg, unit_normal};
use crate::protocol::{PackedBitmap, MAX_REPLY_LINES};
use crate::types::LocalDetection;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HoughParams {
    pub theta_bins: usize,
    /// Minimum accumulator count for a peak.
    pub vote_threshold: u16,
    pub max_lines: usize,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            theta_bins: 16,
            vote_threshold: 8,
            max_lines: MAX_REPLY_LINES,
        }
    }
}

/// Vote every set pixel and return the strongest accumulator cells.
///
/// Peaks are ordered by votes, descending; ties keep bin order (theta, then
/// rho). Votes saturate at 255 on the way out.
pub fn detect_lines(tile: &PackedBitmap, params: &HoughParams) -> Vec<LocalDetection> {
    let (w, h) = (tile.width(), tile.height());
    if params.theta_bins == 0 || w == 0 || h == 0 {
        return Vec::new();
    }
    let max_rho = ((w * w + h * h) as f32).sqrt().ceil() as usize;
    let rho_bins = max_rho + 1;
    let normals: Vec<(u8, [f32; 2])> = (0..params.theta_bins)
        .map(|i| {
            let theta = bin_theta_deg(i, params.theta_bins);
            (theta, unit_normal(theta))
        })
        .collect();

    let mut acc = vec![0u16; params.theta_bins * rho_bins];
    for row in 0..h {
        for col in 0..w {
            if !tile.get(row, col) {
                continue;
            }
            for (t, (_, [cos, sin])) in normals.iter().enumerate() {
                let rho = (col as f32 * cos + row as f32 * sin).round();
                if rho < 0.0 {
                    continue;
                }
                let r = rho as usize;
                if r < rho_bins {
                    acc[t * rho_bins + r] += 1;
                }
            }
        }
    }

    let mut peaks: Vec<(u16, usize)> = acc
        .iter()
        .enumerate()
        .filter(|&(_, &v)| v >= params.vote_threshold.max(1))
        .map(|(i, &v)| (v, i))
        .collect();
    peaks.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

    peaks
        .into_iter()
        .take(params.max_lines)
        .map(|(votes, idx)| LocalDetection {
            rho: (idx % rho_bins).min(u8::MAX as usize) as u8,
            theta_deg: normals[idx / rho_bins].0,
            votes: votes.min(u8::MAX as u16) as u8,
        })
        .collect()
}
