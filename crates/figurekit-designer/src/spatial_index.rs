//! Quadtree spatial index for figure bounding boxes.
//!
//! The index maps axis-aligned boxes to `u64` figure ids and answers "which ids overlap this
//! rectangle". A box is stored in every leaf region it touches, so a query may meet the same
//! id several times; results are de-duplicated and returned in traversal order.
//!
//! Boxes that are not fully covered by the root region are kept in a separate overflow
//! list that every query scans linearly. Queries stay exact for figures dragged off the
//! working area, at the cost of a scan over the overflow list.

use figurekit_core::constants::{
    DEFAULT_INDEX_HALF_EXTENT, DEFAULT_INDEX_MAX_DEPTH, DEFAULT_INDEX_MAX_ITEMS,
};
use figurekit_core::{GeometryError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Axis-aligned rectangle given by its minimum and maximum corners.
///
/// All predicates are inclusive: rectangles that share only an edge intersect, and a
/// zero-area rectangle behaves like the point or segment it covers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    /// Creates bounds from minimum and maximum corners.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Creates bounds from two arbitrary corners, normalizing their order.
    pub fn from_corners(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))
    }

    /// Creates bounds from an origin and a size. Negative sizes are normalized.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_corners(x, y, x + width, y + height)
    }

    /// Smallest bounds enclosing every `(x, y)` pair, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        points.into_iter().fold(None, |acc, (x, y)| {
            let point = Self::new(x, y, x, y);
            Some(match acc {
                Some(b) => point.union(&b),
                None => point,
            })
        })
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// True when every coordinate is finite and min <= max on both axes.
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
            && self.min_x <= self.max_x
            && self.min_y <= self.max_y
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Grows the bounds by `dx` on the left and right and by `dy` on the top and bottom.
    pub fn inflate(&self, dx: f64, dy: f64) -> Bounds {
        Bounds::new(
            self.min_x - dx,
            self.min_y - dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    fn quadrants(&self) -> [Bounds; 4] {
        let (cx, cy) = self.center();
        [
            Bounds::new(self.min_x, self.min_y, cx, cy),
            Bounds::new(cx, self.min_y, self.max_x, cy),
            Bounds::new(self.min_x, cy, cx, self.max_y),
            Bounds::new(cx, cy, self.max_x, self.max_y),
        ]
    }
}

type NodeItems = SmallVec<[(u64, Bounds); 8]>;

#[derive(Debug, Clone)]
struct QuadtreeNode {
    bounds: Bounds,
    depth: usize,
    items: NodeItems,
    children: Option<Box<[QuadtreeNode; 4]>>,
}

impl QuadtreeNode {
    fn new(bounds: Bounds, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            items: SmallVec::new(),
            children: None,
        }
    }

    fn insert(&mut self, id: u64, bounds: Bounds, max_depth: usize, max_items: usize) {
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                if child.bounds.intersects(&bounds) {
                    child.insert(id, bounds, max_depth, max_items);
                }
            }
            return;
        }

        self.items.push((id, bounds));
        if self.items.len() > max_items && self.depth < max_depth {
            self.split(max_depth, max_items);
        }
    }

    fn split(&mut self, max_depth: usize, max_items: usize) {
        let depth = self.depth + 1;
        let [q0, q1, q2, q3] = self.bounds.quadrants();
        let mut children = Box::new([
            QuadtreeNode::new(q0, depth),
            QuadtreeNode::new(q1, depth),
            QuadtreeNode::new(q2, depth),
            QuadtreeNode::new(q3, depth),
        ]);
        trace!(depth, items = self.items.len(), "splitting quadtree node");

        for (id, bounds) in self.items.drain(..) {
            for child in children.iter_mut() {
                if child.bounds.intersects(&bounds) {
                    child.insert(id, bounds, max_depth, max_items);
                }
            }
        }
        self.children = Some(children);
    }

    fn remove(&mut self, id: u64, bounds: &Bounds, max_items: usize) {
        if let Some(children) = self.children.as_mut() {
            for child in children.iter_mut() {
                if child.bounds.intersects(bounds) {
                    child.remove(id, bounds, max_items);
                }
            }
            self.try_merge(max_items);
        } else {
            self.items.retain(|(item, _)| *item != id);
        }
    }

    /// Folds four leaf children back into this node once they hold few enough distinct ids.
    fn try_merge(&mut self, max_items: usize) {
        let Some(children) = self.children.as_ref() else {
            return;
        };
        if children.iter().any(|c| c.children.is_some()) {
            return;
        }

        let mut seen = HashSet::new();
        let mut merged = NodeItems::new();
        for child in children.iter() {
            for &(id, bounds) in &child.items {
                if seen.insert(id) {
                    merged.push((id, bounds));
                }
            }
        }
        if merged.len() <= max_items {
            self.items = merged;
            self.children = None;
        }
    }

    fn query(&self, area: &Bounds, seen: &mut HashSet<u64>, out: &mut Vec<u64>) {
        if !self.bounds.intersects(area) {
            return;
        }
        for (id, bounds) in &self.items {
            if bounds.intersects(area) && seen.insert(*id) {
                out.push(*id);
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query(area, seen, out);
            }
        }
    }

    fn collect_stats(&self, stats: &mut SpatialIndexStats) {
        stats.total_nodes += 1;
        stats.total_items += self.items.len();
        stats.max_depth = stats.max_depth.max(self.depth);
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.collect_stats(stats);
            }
        }
    }
}

/// Counters describing the shape of a [`SpatialIndex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpatialIndexStats {
    /// Number of quadtree nodes, including the root.
    pub total_nodes: usize,
    /// Item slots across all leaves plus the overflow list. An id stored in several leaves
    /// counts once per leaf.
    pub total_items: usize,
    /// Distinct ids in the index.
    pub distinct_items: usize,
    /// Ids whose bounds are not fully covered by the root region.
    pub outside_items: usize,
    /// Deepest node level reached (the root is level 0).
    pub max_depth: usize,
}

/// Region quadtree mapping figure ids to their last-known bounds.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    root: QuadtreeNode,
    max_depth: usize,
    max_items: usize,
    entries: HashMap<u64, Bounds>,
    outside: Vec<u64>,
}

impl SpatialIndex {
    /// Creates an empty index covering `bounds`.
    ///
    /// # Arguments
    ///
    /// * `bounds` - Root region; should enclose the anticipated working area
    /// * `max_depth` - Deepest level a node may split to
    /// * `max_items` - Items a leaf holds before splitting (at least 1)
    pub fn new(bounds: Bounds, max_depth: usize, max_items: usize) -> Self {
        Self {
            root: QuadtreeNode::new(bounds, 0),
            max_depth,
            max_items: max_items.max(1),
            entries: HashMap::new(),
            outside: Vec::new(),
        }
    }

    /// Like [`new`](Self::new), but rejects a root region that is not finite or has
    /// min > max on some axis.
    pub fn try_new(bounds: Bounds, max_depth: usize, max_items: usize) -> Result<Self> {
        if !bounds.is_valid() {
            return Err(GeometryError::InvalidBounds {
                min_x: bounds.min_x,
                min_y: bounds.min_y,
                max_x: bounds.max_x,
                max_y: bounds.max_y,
            }
            .into());
        }
        Ok(Self::new(bounds, max_depth, max_items))
    }

    /// Root region the index was created with.
    pub fn root_bounds(&self) -> Bounds {
        self.root.bounds
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.contains_key(&id)
    }

    /// Bounds the id was last inserted with.
    pub fn bounds_of(&self, id: u64) -> Option<Bounds> {
        self.entries.get(&id).copied()
    }

    /// Inserts `id` into every leaf region its bounds touch.
    ///
    /// Inserting an id that is already present replaces its old entry.
    pub fn insert(&mut self, id: u64, bounds: &Bounds) {
        if self.entries.contains_key(&id) {
            self.remove(id);
        }
        self.entries.insert(id, *bounds);

        if self.root.bounds.contains_bounds(bounds) {
            self.root
                .insert(id, *bounds, self.max_depth, self.max_items);
        } else {
            debug!(id, ?bounds, "bounds not covered by index root, using overflow list");
            self.outside.push(id);
        }
    }

    /// Removes `id` from every region. Returns false if it was not present.
    pub fn remove(&mut self, id: u64) -> bool {
        let Some(bounds) = self.entries.remove(&id) else {
            return false;
        };
        if self.root.bounds.contains_bounds(&bounds) {
            self.root.remove(id, &bounds, self.max_items);
        } else {
            self.outside.retain(|item| *item != id);
        }
        true
    }

    /// Returns every id whose bounds intersect `area`, each exactly once.
    pub fn query(&self, area: &Bounds) -> Vec<u64> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.root.query(area, &mut seen, &mut out);
        for id in &self.outside {
            let hit = self
                .entries
                .get(id)
                .is_some_and(|bounds| bounds.intersects(area));
            if hit && seen.insert(*id) {
                out.push(*id);
            }
        }
        out
    }

    /// Returns every id whose bounds contain the point.
    pub fn query_point(&self, x: f64, y: f64) -> Vec<u64> {
        self.query(&Bounds::new(x, y, x, y))
    }

    /// Empties the index, keeping its root region and tuning.
    pub fn clear(&mut self) {
        self.root = QuadtreeNode::new(self.root.bounds, 0);
        self.entries.clear();
        self.outside.clear();
    }

    pub fn stats(&self) -> SpatialIndexStats {
        let mut stats = SpatialIndexStats::default();
        self.root.collect_stats(&mut stats);
        stats.total_items += self.outside.len();
        stats.outside_items = self.outside.len();
        stats.distinct_items = self.entries.len();
        stats
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        let h = DEFAULT_INDEX_HALF_EXTENT;
        Self::new(
            Bounds::new(-h, -h, h, h),
            DEFAULT_INDEX_MAX_DEPTH,
            DEFAULT_INDEX_MAX_ITEMS,
        )
    }
}
