//! # FigureKit
//!
//! Drawing-model building blocks for vector editors:
//! - Z-ordered figure containers with back/front/layer moves
//! - Quadtree spatial lookup for range queries and hit testing
//! - Fitting freehand strokes with cubic Bezier curves
//!
//! ## Architecture
//!
//! FigureKit is organized as a workspace with multiple crates:
//!
//! 1. **figurekit-core** - Error types, constants, shared-ownership aliases
//! 2. **figurekit-designer** - FigureContainer, SpatialIndex, HitTest, CurveFitter
//! 3. **figurekit-settings** - Index and curve-fit configuration, JSON/TOML persistence
//! 4. **figurekit** - This crate: re-exports, logging, building runtime objects from settings

pub use figurekit_core::{Error, GeometryError, Result};
pub use figurekit_designer as designer;
pub use figurekit_designer::{
    fit_bezier_path, fit_curve, BezierPath, Bounds, ContainerId, CubicSegment, CurveFitter,
    Figure, FigureContainer, FittedSegment, HitTest, OrderedFigure, Point,
    SharedFigureContainer, SpatialIndex, SpatialIndexStats,
};
pub use figurekit_settings::{
    default_config_path, Config, CurveFitSettings, IndexSettings, SettingsError, SettingsResult,
};

use tracing::debug;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support (INFO by default)
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Root region of the spatial index described by `settings`.
pub fn index_bounds(settings: &IndexSettings) -> Bounds {
    Bounds::new(settings.min_x, settings.min_y, settings.max_x, settings.max_y)
}

/// Creates an empty container, with a spatial index if the settings enable one.
///
/// Fails if the index root region is not a valid rectangle.
pub fn build_container<F: Figure>(config: &Config) -> Result<FigureContainer<F>> {
    let settings = &config.index;
    if !settings.enabled {
        debug!("spatial index disabled, container will scan");
        return Ok(FigureContainer::new());
    }
    let index = SpatialIndex::try_new(
        index_bounds(settings),
        settings.max_depth,
        settings.max_items_per_node,
    )?;
    Ok(FigureContainer::with_index(index))
}

/// Creates a curve fitter from the curve-fit settings.
pub fn build_fitter(config: &Config) -> Result<CurveFitter> {
    let settings = &config.curve_fit;
    Ok(CurveFitter::new(settings.error_tolerance)?
        .with_min_point_distance(settings.min_point_distance))
}
