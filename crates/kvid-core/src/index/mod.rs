//! Vector index abstractions: the common [`VectorIndex`] surface shared by
//! the exhaustive [`flat`] index and the approximate [`hnsw`] index.

pub mod flat;
pub mod hnsw;

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

pub use flat::FlatIndex;
pub use hnsw::HnswIndex;

/// One search hit: a stored ID plus its similarity and distance to the
/// query, as reported by the index's kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// The matching vector's ID.
    pub id: u64,
    /// Similarity of the match to the query (higher is closer).
    pub similarity: f32,
    /// Distance of the match to the query (lower is closer).
    pub distance: f32,
}

/// Common surface implemented by both the flat and HNSW indexes, per the
/// component design: add / addBatch / search / save / load / clear / size
/// / getVector.
pub trait VectorIndex {
    /// Inserts or overwrites the vector stored under `id`. Fails if
    /// `v.len()` doesn't match the index's dimension.
    fn add(&mut self, id: u64, v: Vec<f32>) -> Result<()>;

    /// Inserts every entry of `batch` in ascending-ID order; equivalent to
    /// calling [`VectorIndex::add`] once per entry.
    fn add_batch(&mut self, batch: BTreeMap<u64, Vec<f32>>) -> Result<()> {
        for (id, v) in batch {
            self.add(id, v)?;
        }
        Ok(())
    }

    /// Returns up to `k` results sorted by descending similarity. Returns
    /// an empty vector if the index is empty or `k == 0`.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// Returns a defensive copy of the vector stored under `id`, if any.
    fn get_vector(&self, id: u64) -> Option<Vec<f32>>;

    /// Number of vectors currently stored.
    fn size(&self) -> usize;

    /// Drops every stored vector and graph edge.
    fn clear(&mut self);

    /// Persists the index to `path`. Implementations must write to a
    /// temporary file and rename into place so a prior good file is never
    /// clobbered by a failed write.
    fn save(&self, path: &Path) -> Result<()>;

    /// Replaces in-memory state wholesale with what's stored at `path`.
    /// On failure the index is left in the state it had before the call.
    fn load(&mut self, path: &Path) -> Result<()>;
}
