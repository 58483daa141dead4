//! Detection data model shared by the dispatcher, transform and aggregator.
use serde::{Deserialize, Serialize};

/// Default cap on tracked detections (raw set and accepted clusters).
pub const DEFAULT_MAX_DETECTIONS: usize = 64;

/// Integer tile address inside the tile grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub tile_x: usize,
    pub tile_y: usize,
}

impl TileCoord {
    pub fn new(tile_x: usize, tile_y: usize) -> Self {
        Self { tile_x, tile_y }
    }
}

/// One `(rho, theta, votes)` group exactly as the accelerator reports it,
/// in tile-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDetection {
    /// Distance from the tile origin along the line normal (tile pixels).
    pub rho: u8,
    /// Orientation of the line normal in degrees, expected in `[0, 180)`.
    pub theta_deg: u8,
    /// Accumulator votes (confidence).
    pub votes: u8,
}

/// A detection re-projected into global image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalDetection {
    /// Tile that produced the detection.
    pub tile: TileCoord,
    /// Tile-local rho as received.
    pub local_rho: u8,
    pub theta_deg: u8,
    pub votes: u8,
    /// Normal-form distance relative to the global origin.
    pub global_rho: f32,
    /// Intersection with the x axis; `None` when the line is parallel to it.
    pub x_intercept: Option<f32>,
    /// Intersection with the y axis; `None` when the line is parallel to it.
    pub y_intercept: Option<f32>,
}

/// Capacity-bounded, insertion-ordered sequence of global detections.
///
/// Pushing into a full set drops the new entry and bumps `dropped`.
#[derive(Clone, Debug, Serialize)]
pub struct DetectionSet {
    items: Vec<GlobalDetection>,
    capacity: usize,
    dropped: usize,
}

impl DetectionSet {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            dropped: 0,
        }
    }

    /// Append `det`; returns `false` (and counts a drop) if the set is full.
    pub fn push(&mut self, det: GlobalDetection) -> bool {
        if self.items.len() >= self.capacity {
            self.dropped += 1;
            return false;
        }
        self.items.push(det);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Number of detections rejected because the set was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn as_slice(&self) -> &[GlobalDetection] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GlobalDetection> {
        self.items.iter()
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut GlobalDetection> {
        self.items.get_mut(index)
    }
}

impl Default for DetectionSet {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_DETECTIONS)
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a GlobalDetection;
    type IntoIter = std::slice::Iter<'a, GlobalDetection>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(votes: u8) -> GlobalDetection {
        GlobalDetection {
            tile: TileCoord::new(0, 0),
            local_rho: 0,
            theta_deg: 0,
            votes,
            global_rho: 0.0,
            x_intercept: None,
            y_intercept: None,
        }
    }

    #[test]
    fn full_set_drops_the_newest() {
        let mut set = DetectionSet::with_capacity(64);
        for i in 0..64 {
            assert!(set.push(det(i as u8)));
        }
        assert!(set.is_full());
        assert!(!set.push(det(200)));
        assert_eq!(set.len(), 64);
        assert_eq!(set.dropped(), 1);
        assert_eq!(set.as_slice()[63].votes, 63);
        assert!(set.iter().all(|d| d.votes != 200));
    }
}
