//! # FigureKit Designer
//!
//! Drawing-model primitives for a vector editor:
//!
//! - **Figure containers**: an ordered, Z-valued collection of figures with back/front/layer
//!   moves and hit testing
//! - **Spatial index**: a quadtree over axis-aligned bounds for fast range queries
//! - **Curve fitting**: turning freehand strokes into smooth cubic Bezier paths
//!
//! ## Architecture
//!
//! ```text
//! FigureContainer (draw order + Z-values)
//!   ├── SpatialIndex (optional quadtree over figure bounds)
//!   └── HitTest (point and rectangle lookup, front to back)
//!
//! CurveFitter (freehand points -> BezierPath / lyon::path::Path)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use figurekit_designer::{Bounds, FigureContainer};
//!
//! let mut container = FigureContainer::new();
//! container.init_index(Bounds::new(-1000.0, -1000.0, 1000.0, 1000.0));
//! container.add(my_figure);
//!
//! let visible = container.figures_in_range(&Bounds::new(0.0, 0.0, 100.0, 100.0));
//! ```

pub mod curve_fit;
pub mod figure;
pub mod figure_container;
pub mod geometry;
pub mod ordered_figure;
pub mod spatial_index;

pub use curve_fit::{
    fit_bezier_path, fit_curve, remove_close_points, BezierPath, CubicSegment, CurveFitter,
    FittedSegment,
};
pub use figure::{ContainerId, Figure};
pub use figure_container::{FigureContainer, SharedFigureContainer};
pub use geometry::Point;
pub use hit_test::HitTest;
pub use ordered_figure::OrderedFigure;
pub use spatial_index::{Bounds, SpatialIndex, SpatialIndexStats};
