//! Error types for Voronoi computation.

use std::fmt;

/// Errors that can occur while computing a Voronoi diagram.
#[derive(Debug, Clone, PartialEq)]
pub enum VoronoiError {
    /// The bounding box does not satisfy `left < right` and `top < bottom`.
    InvalidBoundingBox,

    /// A cell could not be closed along the bounding box perimeter.
    ///
    /// This is a fatal invariant violation: either the bounding box does not
    /// enclose the region relevant to the sites, or the sweep produced a
    /// malformed cell. The diagram is not returned in this case.
    CellClosingFailed {
        /// Index of the cell whose border walk failed.
        cell: usize,
    },
}

impl fmt::Display for VoronoiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoronoiError::InvalidBoundingBox => {
                write!(f, "invalid bounding box: left < right and top < bottom required")
            }
            VoronoiError::CellClosingFailed { cell } => {
                write!(f, "cell {} could not be closed along the bounding box perimeter", cell)
            }
        }
    }
}

impl std::error::Error for VoronoiError {}
