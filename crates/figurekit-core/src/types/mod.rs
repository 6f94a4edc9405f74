//! Type system utilities and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: The `Arc<Mutex<T>>` alias and its constructor.

pub mod aliases;

pub use aliases::*;
