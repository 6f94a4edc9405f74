//! Type alias for shared ownership of editor state.
//!
//! A figure container and its spatial index are one logical unit that must never be
//! observed half-updated. When a container is reachable from more than one thread it is
//! wrapped in exactly one lock, and this alias names that wrapping so every crate spells
//! it the same way.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use figurekit_core::types::*;
//!
//! // Instead of: Arc<Mutex<FigureContainer<MyFigure>>>
//! let container: ThreadSafe<FigureContainer<MyFigure>> = thread_safe(FigureContainer::new());
//! container.lock().bring_to_front(7);
//! ```

use parking_lot::Mutex;
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex`, so locking never returns a poison error.
///
/// # Example
/// ```rust,ignore
/// let state: ThreadSafe<Drawing> = thread_safe(Drawing::default());
/// state.lock().update();
/// ```
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// Create a new `ThreadSafe<T>` from a value.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}
