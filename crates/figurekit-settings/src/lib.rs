//! FigureKit Settings Crate
//!
//! Serializable configuration for the spatial index and the curve fitter, with JSON and
//! TOML persistence.

pub mod config;
pub mod error;

pub use config::{default_config_path, Config, CurveFitSettings, IndexSettings};
pub use error::{SettingsError, SettingsResult};
