//! Ordered figure storage with Z-order management and spatial lookup.
//!
//! `FigureContainer` is the canonical store for the figures of a drawing. It keeps:
//! - a draw-order sequence (back to front) that always agrees with ascending Z-values,
//! - the Z-value of each figure, which only the container can change, and
//! - an optional [`SpatialIndex`] that mirrors membership and last-known bounds.
//!
//! # Concurrency
//!
//! Mutation and traversal of one container must never overlap. With a single owner the
//! borrow checker enforces this, since traversal results borrow the container. To reach a
//! container from several threads, wrap it in one lock with
//! [`FigureContainer::into_shared`] and hold the guard for the whole operation.

use crate::figure::{ContainerId, Figure};
use crate::ordered_figure::OrderedFigure;
use crate::spatial_index::{Bounds, SpatialIndex, SpatialIndexStats};
use figurekit_core::constants::{DEFAULT_INDEX_MAX_DEPTH, DEFAULT_INDEX_MAX_ITEMS};
use figurekit_core::types::{thread_safe, ThreadSafe};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// A container behind its per-container lock.
pub type SharedFigureContainer<F> = ThreadSafe<FigureContainer<F>>;

#[derive(Debug, Clone)]
struct FigureEntry<F> {
    figure: F,
    z: i64,
    /// Bounds the figure was last indexed with.
    bounds: Bounds,
}

/// Ordered collection of figures with Z-order operations.
#[derive(Debug, Clone)]
pub struct FigureContainer<F> {
    id: ContainerId,
    figures: HashMap<u64, FigureEntry<F>>,
    draw_order: Vec<u64>,
    lowest_z: i64,
    highest_z: i64,
    index: Option<SpatialIndex>,
}

impl<F: Figure> Default for FigureContainer<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Figure> FigureContainer<F> {
    /// Creates an empty container without a spatial index.
    ///
    /// Range queries fall back to a linear scan until [`init_index`](Self::init_index) is
    /// called.
    pub fn new() -> Self {
        Self {
            id: ContainerId::next(),
            figures: HashMap::new(),
            draw_order: Vec::new(),
            lowest_z: 0,
            highest_z: 0,
            index: None,
        }
    }

    /// Creates an empty container that indexes into `index`.
    pub fn with_index(index: SpatialIndex) -> Self {
        let mut container = Self::new();
        container.init_index_with(index);
        container
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    /// Builds a spatial index whose root covers `working_area` and indexes every current
    /// figure into it.
    pub fn init_index(&mut self, working_area: Bounds) {
        self.init_index_with(SpatialIndex::new(
            working_area,
            DEFAULT_INDEX_MAX_DEPTH,
            DEFAULT_INDEX_MAX_ITEMS,
        ));
    }

    /// Installs `index` (after clearing it) and indexes every current figure into it.
    pub fn init_index_with(&mut self, mut index: SpatialIndex) {
        index.clear();
        for id in &self.draw_order {
            if let Some(entry) = self.figures.get(id) {
                index.insert(*id, &entry.bounds);
            }
        }
        debug!(
            container = self.id.get(),
            figures = index.len(),
            root = ?index.root_bounds(),
            "initialized spatial index"
        );
        self.index = Some(index);
    }

    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    pub fn index_stats(&self) -> Option<SpatialIndexStats> {
        self.index.as_ref().map(SpatialIndex::stats)
    }

    /// Number of figures in the container.
    pub fn len(&self) -> usize {
        self.draw_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.draw_order.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.figures.contains_key(&id)
    }

    pub fn get(&self, id: u64) -> Option<&F> {
        self.figures.get(&id).map(|e| &e.figure)
    }

    pub fn z_value(&self, id: u64) -> Option<i64> {
        self.figures.get(&id).map(|e| e.z)
    }

    /// Lowest Z-value handed out by [`send_to_back`](Self::send_to_back).
    pub fn lowest_z(&self) -> i64 {
        self.lowest_z
    }

    /// Highest Z-value handed out by [`add`](Self::add) or
    /// [`bring_to_front`](Self::bring_to_front).
    pub fn highest_z(&self) -> i64 {
        self.highest_z
    }

    /// Adds `figure` on top of the drawing.
    ///
    /// If a figure with the same id is already present nothing changes, `figure` is dropped
    /// and the stored figure is returned.
    pub fn add(&mut self, mut figure: F) -> &F {
        let id = figure.id();
        match self.figures.entry(id) {
            Entry::Occupied(entry) => {
                trace!(id, "figure already in container, add ignored");
                &entry.into_mut().figure
            }
            Entry::Vacant(slot) => {
                self.highest_z += 1;
                let z = self.highest_z;
                figure.attached(self.id);
                let bounds = figure.bounds();
                if let Some(index) = self.index.as_mut() {
                    index.insert(id, &bounds);
                }
                self.draw_order.push(id);
                &slot.insert(FigureEntry { figure, z, bounds }).figure
            }
        }
    }

    /// Removes a figure and notifies it through [`Figure::detached`].
    pub fn remove(&mut self, id: u64) -> Option<F> {
        let mut figure = self.take(id)?;
        figure.detached(self.id);
        Some(figure)
    }

    /// Removes a figure without notifying it.
    ///
    /// Used for temporary detachment while a figure is edited in place.
    pub fn orphan(&mut self, id: u64) -> Option<F> {
        self.take(id)
    }

    /// Removes every figure, notifying each, and resets the Z counters.
    ///
    /// Figures are returned in draw order.
    pub fn remove_all(&mut self) -> Vec<F> {
        let mut figures = self.take_all();
        for figure in &mut figures {
            figure.detached(self.id);
        }
        figures
    }

    /// Removes every figure without notifying them, and resets the Z counters.
    pub fn orphan_all(&mut self) -> Vec<F> {
        self.take_all()
    }

    /// Puts `new` in the draw-order slot and Z-value of `old`.
    ///
    /// Returns the removed figure, which has been notified of its removal. When `old` is not
    /// in the container, or `new` has the id of some other member, nothing changes and `new`
    /// is handed back as `Err`.
    pub fn replace(&mut self, old: u64, mut new: F) -> Result<F, F> {
        let new_id = new.id();
        if !self.figures.contains_key(&old)
            || (new_id != old && self.figures.contains_key(&new_id))
        {
            return Err(new);
        }
        let Some(mut previous) = self.figures.remove(&old) else {
            return Err(new);
        };

        if let Some(slot) = self.draw_order.iter_mut().find(|id| **id == old) {
            *slot = new_id;
        }
        let bounds = new.bounds();
        if let Some(index) = self.index.as_mut() {
            index.remove(old);
            index.insert(new_id, &bounds);
        }

        previous.figure.detached(self.id);
        new.attached(self.id);
        self.figures.insert(
            new_id,
            FigureEntry {
                figure: new,
                z: previous.z,
                bounds,
            },
        );
        Ok(previous.figure)
    }

    /// Moves a figure behind all others. Returns false if it is not in the container.
    pub fn send_to_back(&mut self, id: u64) -> bool {
        let Some(pos) = self.layer_of(id) else {
            return false;
        };
        self.draw_order.remove(pos);
        self.draw_order.insert(0, id);
        self.lowest_z -= 1;
        let z = self.lowest_z;
        self.set_z(id, z);
        true
    }

    /// Moves a figure in front of all others. Returns false if it is not in the container.
    pub fn bring_to_front(&mut self, id: u64) -> bool {
        let Some(pos) = self.layer_of(id) else {
            return false;
        };
        self.draw_order.remove(pos);
        self.draw_order.push(id);
        self.highest_z += 1;
        let z = self.highest_z;
        self.set_z(id, z);
        true
    }

    /// Moves a figure to draw-order position `layer`, clamped to `0..len`.
    ///
    /// The figure takes the Z-value of the figure currently at `layer`. Every figure it
    /// passes shifts one slot and takes its neighbor's Z-value, so the Z-values of the
    /// affected range are permuted rather than renumbered. Returns false if the figure is not
    /// in the container.
    pub fn send_to_layer(&mut self, id: u64, layer: isize) -> bool {
        let Some(from) = self.layer_of(id) else {
            return false;
        };
        let last = self.draw_order.len() as isize - 1;
        let to = layer.clamp(0, last) as usize;
        if to as isize != layer {
            debug!(id, layer, clamped = to, "layer index clamped");
        }
        let Some(target_z) = self.z_at(to) else {
            return false;
        };

        if from < to {
            for pos in (from + 1..=to).rev() {
                if let Some(z) = self.z_at(pos - 1) {
                    self.set_z_at(pos, z);
                }
            }
        } else {
            for pos in to..from {
                if let Some(z) = self.z_at(pos + 1) {
                    self.set_z_at(pos, z);
                }
            }
        }

        self.draw_order.remove(from);
        self.draw_order.insert(to, id);
        self.set_z(id, target_z);
        true
    }

    /// Draw-order position of a figure (0 is the back).
    pub fn get_layer(&self, id: u64) -> Option<usize> {
        self.layer_of(id)
    }

    /// The figure at draw-order position `layer`.
    pub fn figure_from_layer(&self, layer: usize) -> Option<&F> {
        self.draw_order.get(layer).and_then(|id| self.get(*id))
    }

    /// Iterates figures back to front.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &F> + '_ {
        self.draw_order.iter().filter_map(|id| self.get(*id))
    }

    /// Ids in draw order. The returned vector is a snapshot independent of the container.
    pub fn figure_ids(&self) -> Vec<u64> {
        self.draw_order.clone()
    }

    /// All figures back to front.
    pub fn figures(&self) -> Vec<&F> {
        self.iter().collect()
    }

    /// All figures front to back.
    pub fn figures_reverse(&self) -> Vec<&F> {
        self.iter().rev().collect()
    }

    /// Figures whose indexed bounds intersect `area`, back to front.
    ///
    /// Uses the spatial index when one is installed and a bounds-filtered scan otherwise.
    /// Both paths return the same figures in the same order.
    pub fn figures_in_range(&self, area: &Bounds) -> Vec<&F> {
        let mut ordered: Vec<OrderedFigure<'_, F>> = match self.index.as_ref() {
            Some(index) => index
                .query(area)
                .into_iter()
                .filter_map(|id| self.figures.get(&id))
                .map(|e| OrderedFigure::new(&e.figure, e.z))
                .collect(),
            None => {
                trace!(container = self.id.get(), "no spatial index, scanning all figures");
                self.draw_order
                    .iter()
                    .filter_map(|id| self.figures.get(id))
                    .filter(|e| e.bounds.intersects(area))
                    .map(|e| OrderedFigure::new(&e.figure, e.z))
                    .collect()
            }
        };
        ordered.sort();
        ordered.into_iter().map(OrderedFigure::into_figure).collect()
    }

    /// Runs `f` on a figure, then re-indexes it under its new bounds.
    ///
    /// If `f` changes the figure's id, the figure is re-keyed under the new id, keeping its
    /// draw-order slot and Z-value. When the new id already belongs to another member the
    /// figure stays under the old id and a warning is logged.
    pub fn modify<R>(&mut self, id: u64, f: impl FnOnce(&mut F) -> R) -> Option<R> {
        let entry = self.figures.get_mut(&id)?;
        let result = f(&mut entry.figure);
        let reported = entry.figure.id();
        entry.bounds = entry.figure.bounds();
        let bounds = entry.bounds;

        if let Some(index) = self.index.as_mut() {
            index.remove(id);
        }
        let key = if reported == id {
            id
        } else {
            self.rekey(id, reported)
        };
        if let Some(index) = self.index.as_mut() {
            index.insert(key, &bounds);
        }
        Some(result)
    }

    /// Re-reads a figure's bounds and re-indexes it. Returns false if it is absent.
    pub fn refresh_bounds(&mut self, id: u64) -> bool {
        self.modify(id, |_| ()).is_some()
    }

    /// Union of the indexed bounds of every figure.
    pub fn drawing_bounds(&self) -> Option<Bounds> {
        self.figures
            .values()
            .map(|e| e.bounds)
            .reduce(|acc, b| acc.union(&b))
    }

    /// Wraps the container in its own lock for sharing across threads.
    pub fn into_shared(self) -> SharedFigureContainer<F> {
        thread_safe(self)
    }

    fn layer_of(&self, id: u64) -> Option<usize> {
        if !self.figures.contains_key(&id) {
            return None;
        }
        self.draw_order.iter().position(|item| *item == id)
    }

    fn z_at(&self, pos: usize) -> Option<i64> {
        let id = self.draw_order.get(pos)?;
        self.z_value(*id)
    }

    fn set_z_at(&mut self, pos: usize, z: i64) {
        if let Some(id) = self.draw_order.get(pos).copied() {
            self.set_z(id, z);
        }
    }

    fn set_z(&mut self, id: u64, z: i64) {
        if let Some(entry) = self.figures.get_mut(&id) {
            entry.z = z;
        }
    }

    /// Moves the entry for `old` to `new`. Returns the key the entry ends up under.
    fn rekey(&mut self, old: u64, new: u64) -> u64 {
        if self.figures.contains_key(&new) {
            warn!(old, new, "figure id changed to an id already in use, keeping old key");
            return old;
        }
        let Some(entry) = self.figures.remove(&old) else {
            return old;
        };
        self.figures.insert(new, entry);
        if let Some(slot) = self.draw_order.iter_mut().find(|item| **item == old) {
            *slot = new;
        }
        debug!(old, new, "figure id changed, re-keyed");
        new
    }

    fn take(&mut self, id: u64) -> Option<F> {
        let entry = self.figures.remove(&id)?;
        self.draw_order.retain(|item| *item != id);
        if let Some(index) = self.index.as_mut() {
            index.remove(id);
        }
        Some(entry.figure)
    }

    fn take_all(&mut self) -> Vec<F> {
        let order = std::mem::take(&mut self.draw_order);
        let figures = order
            .into_iter()
            .filter_map(|id| self.figures.remove(&id))
            .map(|e| e.figure)
            .collect();
        self.figures.clear();
        if let Some(index) = self.index.as_mut() {
            index.clear();
        }
        self.lowest_z = 0;
        self.highest_z = 0;
        figures
    }
}
