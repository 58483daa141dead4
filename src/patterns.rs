//! Canonical single-tile bring-up patterns.
//!
//! Coordinates are given for a 16-pixel edge and scale with the tile edge
//! (`mid = edge / 2`, the two verticals at `5/16` and `10/16`).
use crate::image::BinaryImage;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPattern {
    Diagonal,
    Vertical,
    Horizontal,
    AntiDiagonal,
    TwoVerticals,
    Cross,
    Square,
    X,
    VerticalLeft,
    HorizontalTop,
}

impl TestPattern {
    pub const ALL: [TestPattern; 10] = [
        Self::Diagonal,
        Self::Vertical,
        Self::Horizontal,
        Self::AntiDiagonal,
        Self::TwoVerticals,
        Self::Cross,
        Self::Square,
        Self::X,
        Self::VerticalLeft,
        Self::HorizontalTop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Diagonal => "diagonal",
            Self::Vertical => "vertical",
            Self::Horizontal => "horizontal",
            Self::AntiDiagonal => "anti_diagonal",
            Self::TwoVerticals => "two_verticals",
            Self::Cross => "cross",
            Self::Square => "square",
            Self::X => "x",
            Self::VerticalLeft => "vertical_left",
            Self::HorizontalTop => "horizontal_top",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }

    /// Render on an `edge × edge` tile.
    pub fn render(self, edge: usize) -> BinaryImage {
        let last = edge.saturating_sub(1);
        let mid = edge / 2;
        let (left, right) = (edge * 5 / 16, edge * 10 / 16);
        BinaryImage::from_fn(edge, edge, |x, y| match self {
            Self::Diagonal => x == y,
            Self::Vertical => x == mid,
            Self::Horizontal => y == mid,
            Self::AntiDiagonal => x + y == last,
            Self::TwoVerticals => x == left || x == right,
            Self::Cross => x == mid || y == mid,
            Self::Square => x == 0 || y == 0 || x == last || y == last,
            Self::X => x == y || x + y == last,
            Self::VerticalLeft => x == 0,
            Self::HorizontalTop => y == 0,
        })
    }
}
