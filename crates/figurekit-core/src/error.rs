//! Error handling for FigureKit
//!
//! Only contract violations are errors. Membership misses (removing or reordering a figure
//! that is not in a container) and numeric degeneracy (singular fitting systems, zero-length
//! tangents) are handled in place and never surface here.
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Geometry error type
///
/// Raised when a caller hands the geometry algorithms input they cannot work with.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Curve fitting needs at least two samples
    #[error("Curve fitting needs at least 2 points, got {count}")]
    TooFewPoints {
        /// The number of points that were supplied.
        count: usize,
    },

    /// A sample has a NaN or infinite coordinate
    #[error("Point {index} has a non-finite coordinate ({x}, {y})")]
    NonFinitePoint {
        /// Index of the offending point in the input.
        index: usize,
        /// The x coordinate.
        x: f64,
        /// The y coordinate.
        y: f64,
    },

    /// The fitting tolerance must be a positive finite number
    #[error("Invalid tolerance {tolerance}: must be positive and finite")]
    InvalidTolerance {
        /// The rejected tolerance.
        tolerance: f64,
    },

    /// A rectangle with min > max on some axis
    #[error("Invalid bounds ({min_x}, {min_y}) - ({max_x}, {max_y})")]
    InvalidBounds {
        /// Minimum x.
        min_x: f64,
        /// Minimum y.
        min_y: f64,
        /// Maximum x.
        max_x: f64,
        /// Maximum y.
        max_y: f64,
    },
}

/// Main error type for FigureKit
///
/// A unified error type that can represent any error from the library crates.
#[derive(Error, Debug)]
pub enum Error {
    /// Geometry error
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a geometry error
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Error::Geometry(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
