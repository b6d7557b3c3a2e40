//! Hierarchical navigable small-world (HNSW) approximate nearest-neighbor
//! index: the core of this crate.

mod graph;
mod index;
mod params;
mod persistence;

pub use index::HnswIndex;
pub use params::{HnswParams, MAX_LAYER};
