//! Spatial index module
//!
//! A hierarchical spatial partition built over an item-store snapshot
//! before each clustering pass. The index supports the region and radius
//! queries the clustering algorithms issue many times per pass, sub-linear
//! in the total item count.
//!
//! The index is ephemeral: it is built fresh for a pass, owned exclusively
//! by that pass, and discarded with it. Nothing outside the pass ever
//! holds a reference to its nodes.

mod quadtree;

pub use quadtree::{QuadTree, MAX_TREE_DEPTH, QUAD_NODE_CAPACITY};
