use thiserror::Error;

use crate::geometry::{Point, Quadrant};

/// The image does not contain a clearly segmentable board.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("no board contour found")]
    NoContour,

    #[error("board outline collapsed to {found} vertices, need at least 4")]
    TooFewVertices { found: usize },
}

/// The four corner candidates could not be given distinct quadrant roles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CornerClassificationError {
    #[error("no corner candidate in the {0} quadrant")]
    Missing(Quadrant),

    #[error("{1} corner candidates landed in the {0} quadrant")]
    Ambiguous(Quadrant, usize),

    #[error("corner candidate ({}, {}) lies on a quadrant boundary", .0.x, .0.y)]
    Unassigned(Point),
}

/// Lattice construction produced the wrong shape. Only a bug can cause this.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("lattice has {found} points, expected 81")]
    LatticeSize { found: usize },

    #[error("indexed {found} squares, expected 64")]
    SquareCount { found: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error(transparent)]
    Detection(#[from] DetectionError),

    #[error(transparent)]
    CornerClassification(#[from] CornerClassificationError),

    #[error(transparent)]
    Grid(#[from] GridError),
}
