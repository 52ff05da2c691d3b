//! Point quad-tree over the projected unit-square world.

use std::sync::Arc;

use crate::geo::{self, MapPoint, PointBounds};
use crate::item::ClusterItem;

/// Maximum number of entries a leaf holds before splitting.
pub const QUAD_NODE_CAPACITY: usize = 8;

/// Maximum subdivision depth.
///
/// Bounds recursion when many items share (nearly) one position; a leaf at
/// this depth grows beyond capacity instead of splitting further.
pub const MAX_TREE_DEPTH: usize = 16;

/// A point quad-tree holding projected item positions.
///
/// Built from an item-store snapshot with [`QuadTree::build`]; traversal
/// order is determined by insertion order and node layout, so queries over
/// an identical snapshot return identical result orderings — a requirement
/// for deterministic clustering output.
pub struct QuadTree<T: ClusterItem> {
    root: Node<T>,
    len: usize,
}

struct Entry<T> {
    point: MapPoint,
    item: Arc<T>,
}

struct Node<T> {
    bounds: PointBounds,
    depth: usize,
    entries: Vec<Entry<T>>,
    children: Option<Box<[Node<T>; 4]>>,
}

impl<T: ClusterItem> QuadTree<T> {
    /// Create an empty tree spanning the whole world square.
    pub fn new() -> Self {
        Self {
            root: Node::new(PointBounds::WORLD, 0),
            len: 0,
        }
    }

    /// Build a tree from a snapshot, projecting each item's position.
    ///
    /// Positions are assumed valid; the item store rejects unprojectable
    /// items before they can reach a snapshot.
    pub fn build(items: &[Arc<T>]) -> Self {
        let mut tree = Self::new();
        for item in items {
            tree.insert(Arc::clone(item));
        }
        tree
    }

    /// Insert a single item.
    pub fn insert(&mut self, item: Arc<T>) {
        let point = geo::project(item.position());
        self.root.insert(Entry { point, item });
        self.len += 1;
    }

    /// Number of items in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Collect every item whose projected position falls inside `bounds`.
    pub fn query(&self, bounds: &PointBounds) -> Vec<Arc<T>> {
        let mut results = Vec::new();
        self.root.query(bounds, &mut results);
        results
    }

    /// Collect every item within `radius` of `center` (world units).
    ///
    /// A bounding-box query refined by squared distance, so items in the
    /// box corners beyond the radius are excluded.
    pub fn nearest_within(&self, center: MapPoint, radius: f64) -> Vec<Arc<T>> {
        let bounds = PointBounds::from_center_radius(center, radius);
        let radius_squared = radius * radius;
        let mut results = Vec::new();
        self.root.query_radius(&bounds, center, radius_squared, &mut results);
        results
    }
}

impl<T: ClusterItem> Default for QuadTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ClusterItem> Node<T> {
    fn new(bounds: PointBounds, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            entries: Vec::new(),
            children: None,
        }
    }

    fn insert(&mut self, entry: Entry<T>) {
        if let Some(children) = self.children.as_mut() {
            let index = Self::quadrant_index(&self.bounds, &entry.point);
            children[index].insert(entry);
            return;
        }

        self.entries.push(entry);
        if self.entries.len() > QUAD_NODE_CAPACITY && self.depth < MAX_TREE_DEPTH {
            self.split();
        }
    }

    fn split(&mut self) {
        let quadrants = self.bounds.quadrants();
        let depth = self.depth + 1;
        let mut children = Box::new([
            Node::new(quadrants[0], depth),
            Node::new(quadrants[1], depth),
            Node::new(quadrants[2], depth),
            Node::new(quadrants[3], depth),
        ]);
        for entry in self.entries.drain(..) {
            let index = Self::quadrant_index(&self.bounds, &entry.point);
            children[index].insert(entry);
        }
        self.children = Some(children);
    }

    /// Quadrant an insertion point belongs to: NW, NE, SW, SE.
    ///
    /// Points exactly on the center lines go east/south, matching the
    /// quadrant bounds whose edges are inclusive on the low side.
    fn quadrant_index(bounds: &PointBounds, point: &MapPoint) -> usize {
        let center = bounds.center();
        let east = point.x >= center.x;
        let south = point.y >= center.y;
        match (south, east) {
            (false, false) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (true, true) => 3,
        }
    }

    fn query(&self, bounds: &PointBounds, results: &mut Vec<Arc<T>>) {
        if !self.bounds.intersects(bounds) {
            return;
        }
        for entry in &self.entries {
            if bounds.contains(&entry.point) {
                results.push(Arc::clone(&entry.item));
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query(bounds, results);
            }
        }
    }

    fn query_radius(
        &self,
        bounds: &PointBounds,
        center: MapPoint,
        radius_squared: f64,
        results: &mut Vec<Arc<T>>,
    ) {
        if !self.bounds.intersects(bounds) {
            return;
        }
        for entry in &self.entries {
            if bounds.contains(&entry.point)
                && entry.point.distance_squared(&center) <= radius_squared
            {
                results.push(Arc::clone(&entry.item));
            }
        }
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query_radius(bounds, center, radius_squared, results);
            }
        }
    }
}
