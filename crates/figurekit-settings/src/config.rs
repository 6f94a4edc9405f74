//! Configuration for FigureKit
//!
//! Provides configuration file handling and validation. Supports JSON and TOML file formats
//! stored in the platform config directory.
//!
//! Configuration is organized into two sections:
//! - Spatial index settings (root region, depth and node capacity)
//! - Curve fitting settings (error tolerance, sample thinning)

use crate::error::{SettingsError, SettingsResult};
use figurekit_core::constants::{
    DEFAULT_FIT_ERROR, DEFAULT_INDEX_HALF_EXTENT, DEFAULT_INDEX_MAX_DEPTH,
    DEFAULT_INDEX_MAX_ITEMS, DEFAULT_MIN_POINT_DISTANCE,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Spatial index settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Build an index for new containers
    pub enabled: bool,
    /// Root region, minimum x
    pub min_x: f64,
    /// Root region, minimum y
    pub min_y: f64,
    /// Root region, maximum x
    pub max_x: f64,
    /// Root region, maximum y
    pub max_y: f64,
    /// Deepest level a node may split to
    pub max_depth: usize,
    /// Items a leaf holds before splitting
    pub max_items_per_node: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        let h = DEFAULT_INDEX_HALF_EXTENT;
        Self {
            enabled: true,
            min_x: -h,
            min_y: -h,
            max_x: h,
            max_y: h,
            max_depth: DEFAULT_INDEX_MAX_DEPTH,
            max_items_per_node: DEFAULT_INDEX_MAX_ITEMS,
        }
    }
}

/// Curve fitting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveFitSettings {
    /// Bound on the squared distance between a sample and the fitted curve
    pub error_tolerance: f64,
    /// Samples closer than this to the previous kept sample are dropped
    pub min_point_distance: f64,
}

impl Default for CurveFitSettings {
    fn default() -> Self {
        Self {
            error_tolerance: DEFAULT_FIT_ERROR,
            min_point_distance: DEFAULT_MIN_POINT_DISTANCE,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spatial index settings
    pub index: IndexSettings,
    /// Curve fitting settings
    pub curve_fit: CurveFitSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn of(path: &Path) -> SettingsResult<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(Format::Json),
            Some("toml") => Ok(Format::Toml),
            other => Err(SettingsError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

impl Config {
    /// Load config from file (JSON or TOML, chosen by extension)
    ///
    /// Sections or keys missing from the file take their defaults.
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = Format::of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        debug!(path = %path.display(), "loaded settings");
        Ok(config)
    }

    /// Save config to file (JSON or TOML), creating parent directories as needed
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match Format::of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        debug!(path = %path.display(), "saved settings");
        Ok(())
    }

    /// Load config from `path` if it exists, otherwise return defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        let index = &self.index;
        let extents = [index.min_x, index.min_y, index.max_x, index.max_y];
        if extents.iter().any(|v| !v.is_finite()) {
            return Err(SettingsError::invalid("index", "extents must be finite"));
        }
        if index.max_x <= index.min_x || index.max_y <= index.min_y {
            return Err(SettingsError::invalid(
                "index",
                "max extents must be greater than min extents",
            ));
        }
        if index.max_depth == 0 {
            return Err(SettingsError::invalid("index.max_depth", "must be > 0"));
        }
        if index.max_items_per_node == 0 {
            return Err(SettingsError::invalid(
                "index.max_items_per_node",
                "must be > 0",
            ));
        }

        let fit = &self.curve_fit;
        if !(fit.error_tolerance.is_finite() && fit.error_tolerance > 0.0) {
            return Err(SettingsError::invalid(
                "curve_fit.error_tolerance",
                "must be positive and finite",
            ));
        }
        if !(fit.min_point_distance.is_finite() && fit.min_point_distance >= 0.0) {
            return Err(SettingsError::invalid(
                "curve_fit.min_point_distance",
                "must be non-negative and finite",
            ));
        }

        Ok(())
    }
}

/// Default settings location, `<config dir>/figurekit/settings.toml`
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| {
            SettingsError::ConfigDirectory("no config or home directory found".to_string())
        })?;
    Ok(base.join("figurekit").join("settings.toml"))
}
