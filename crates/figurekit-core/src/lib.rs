//! # FigureKit Core
//!
//! Core types shared by the FigureKit crates:
//! - the error taxonomy ([`GeometryError`], [`Error`], [`Result`]),
//! - default tuning constants, and
//! - the shared-ownership alias used to put one lock around one container.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, GeometryError, Result};

pub use types::{thread_safe, ThreadSafe};
