//! Shared defaults.
//!
//! The settings crate seeds its defaults from these, and the designer crate uses them when a
//! caller builds an index or a fitter without explicit configuration.

/// Half the side length of the default spatial index root, centered on the origin.
pub const DEFAULT_INDEX_HALF_EXTENT: f64 = 100_000.0;

/// Deepest quadtree level the default index will subdivide to.
pub const DEFAULT_INDEX_MAX_DEPTH: usize = 8;

/// Items a quadtree leaf holds before it tries to split.
pub const DEFAULT_INDEX_MAX_ITEMS: usize = 16;

/// Default squared-distance tolerance for freehand curve fitting.
pub const DEFAULT_FIT_ERROR: f64 = 4.0;

/// Default minimum distance between consecutive samples kept for curve fitting.
pub const DEFAULT_MIN_POINT_DISTANCE: f64 = 0.0;
