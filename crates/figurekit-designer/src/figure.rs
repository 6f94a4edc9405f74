//! The capability set a value needs to live in a [`FigureContainer`](crate::FigureContainer).

use crate::spatial_index::Bounds;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of one container instance, handed to figures when they are attached or detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(u64);

impl ContainerId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A drawable item as seen by a container.
///
/// The container only needs a stable identity and a bounding box. Draw order and Z-values
/// are owned by the container and cannot be set through this trait.
pub trait Figure {
    /// Stable identity. Two figures with the same id are the same figure.
    fn id(&self) -> u64;

    /// Current axis-aligned bounding box.
    fn bounds(&self) -> Bounds;

    /// Called when the figure becomes a member of `container`.
    fn attached(&mut self, _container: ContainerId) {}

    /// Called when the figure is removed from `container`.
    ///
    /// Orphaning skips this call.
    fn detached(&mut self, _container: ContainerId) {}
}
