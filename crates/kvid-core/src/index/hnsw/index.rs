//! The HNSW index proper: layer assignment, the insert procedure, the
//! `search-layer` beam traversal, and the public `search` entry point.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::kernel::SimilarityKernel;

use super::graph::Graph;
use super::params::{HnswParams, MAX_LAYER};
use super::persistence;
use crate::index::{SearchResult, VectorIndex};

/// One scored candidate during graph traversal: a node's internal index
/// plus its distance to the query. Ordered by ascending distance,
/// tie-broken by ascending internal ID, so a `BinaryHeap<Candidate>`'s
/// `peek`/`pop` gives the *farthest* candidate and `Reverse<Candidate>`
/// gives the *closest* — matching the tie-break rule of preferring the
/// lower ID when two candidates are equidistant.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Candidate {
    distance: f32,
    id: u32,
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.distance.total_cmp(&other.distance).then_with(|| self.id.cmp(&other.id))
    }
}

/// Hierarchical navigable small-world approximate nearest-neighbor index.
pub struct HnswIndex {
    kernel: Box<dyn SimilarityKernel>,
    params: HnswParams,
    graph: Graph,
    rng: StdRng,
}

impl HnswIndex {
    /// Creates an empty index using `kernel` for similarity/distance and
    /// `params` for construction tuning.
    #[must_use]
    pub fn new(kernel: Box<dyn SimilarityKernel>, params: HnswParams) -> Self {
        let rng = StdRng::seed_from_u64(params.seed);
        Self {
            kernel,
            params,
            graph: Graph::new(),
            rng,
        }
    }

    /// The kernel's fixed vector dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.kernel.dimension()
    }

    /// The construction/search parameters this index was built with.
    #[must_use]
    pub const fn params(&self) -> &HnswParams {
        &self.params
    }

    /// Like [`VectorIndex::search`] but with an explicit `ef_search`
    /// instead of defaulting to `efConstruction`.
    pub fn search_with_ef(&self, query: &[f32], k: usize, ef_search: usize) -> Result<Vec<SearchResult>> {
        self.search_internal(query, k, ef_search)
    }

    /// Loads from `path`, rejecting any neighbor reference to an ID that
    /// wasn't restored instead of silently dropping it.
    pub fn load_strict(&mut self, path: &Path) -> Result<()> {
        let (graph, params, dimension) = persistence::load(path, true)?;
        if dimension != self.kernel.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.kernel.dimension(),
                actual: dimension,
            });
        }
        self.graph = graph;
        self.params = HnswParams::custom(params.m, params.ef_construction, params.ml, self.params.seed);
        Ok(())
    }

    /// Samples a layer for a new node: draws `u ~ Uniform(0,1)` and takes
    /// `floor(-ln(u) * mL)`, clamped to [`MAX_LAYER`]. This is the
    /// standard exponential layer-assignment distribution that `mL`
    /// parameterizes; with the default `mL = 1/ln(2)` roughly half of
    /// nodes stop at layer 0, a quarter reach layer 1, and so on.
    fn sample_layer(&mut self) -> usize {
        let u: f64 = self.rng.gen_range(f64::MIN_POSITIVE..1.0);
        let level = (-(u.ln()) * self.params.ml).floor();
        if level.is_finite() && level > 0.0 {
            (level as usize).min(MAX_LAYER)
        } else {
            0
        }
    }

    fn node_vector(&self, internal: u32) -> &[f32] {
        &self.graph.node(internal).vector
    }

    /// Beam-style best-first traversal constrained to edges at `layer`,
    /// per the search-layer algorithm.
    fn search_layer(&self, q: &[f32], entry_points: &[u32], ef: usize, layer: usize) -> Vec<Candidate> {
        let mut visited: HashSet<u32> = entry_points.iter().copied().collect();
        let mut frontier: BinaryHeap<Reverse<Candidate>> = BinaryHeap::new();
        let mut working: BinaryHeap<Candidate> = BinaryHeap::new();

        for &ep in entry_points {
            let d = self.kernel.distance(q, self.node_vector(ep));
            let c = Candidate { distance: d, id: ep };
            frontier.push(Reverse(c));
            working.push(c);
        }

        while let Some(Reverse(c)) = frontier.pop() {
            let Some(&farthest) = working.peek() else {
                break;
            };
            if c.distance > farthest.distance && working.len() >= ef {
                break;
            }

            let neighbor_ids: Vec<u32> = self
                .graph
                .neighbors(c.id, layer)
                .map(<[u32]>::to_vec)
                .unwrap_or_default();

            for n in neighbor_ids {
                if visited.insert(n) {
                    let d = self.kernel.distance(q, self.node_vector(n));
                    if d < farthest.distance || working.len() < ef {
                        let nc = Candidate { distance: d, id: n };
                        working.push(nc);
                        frontier.push(Reverse(nc));
                        if working.len() > ef {
                            working.pop();
                        }
                    }
                }
            }
        }

        working.into_vec()
    }

    /// Runs the three-phase insert procedure for a freshly-allocated node
    /// `new_internal` targeting layer `level`.
    fn insert_procedure(&mut self, new_internal: u32, level: usize) {
        let Some(entry) = self.graph.entry_point else {
            return;
        };
        let entry_max_layer = self.graph.node(entry).max_layer;
        let query = self.graph.node(new_internal).vector.clone();

        let mut cur = vec![entry];
        if entry_max_layer > level {
            for l in (level + 1..=entry_max_layer).rev() {
                let candidates = self.search_layer(&query, &cur, 1, l);
                if let Some(nearest) = candidates.into_iter().min() {
                    cur = vec![nearest.id];
                }
            }
        }

        // New neighbor sets are only built on layers the entry point itself
        // participates in; a node promoted to entry point on a higher layer
        // starts that layer's neighbor set empty (filled in as later inserts
        // connect to it).
        for l in (0..=level.min(entry_max_layer)).rev() {
            let mut candidates = self.search_layer(&query, &cur, self.params.ef_construction, l);
            candidates.sort_unstable();

            let m_l = self.params.m_at(l);
            let chosen: Vec<u32> = candidates.iter().take(m_l).map(|c| c.id).collect();
            self.graph.set_neighbors(new_internal, l, chosen.clone());

            for &n in &chosen {
                let new_len = self.graph.add_neighbor(n, l, new_internal);
                if new_len > m_l {
                    self.prune_neighbors(n, l, m_l);
                }
            }

            cur = candidates.into_iter().map(|c| c.id).collect();
            if cur.is_empty() {
                cur = vec![entry];
            }
        }
    }

    /// Prunes `node`'s neighbor set at `layer` down to the `m_l` entries
    /// closest to it.
    fn prune_neighbors(&mut self, node: u32, layer: usize, m_l: usize) {
        let current: Vec<u32> = self
            .graph
            .neighbors(node, layer)
            .map(<[u32]>::to_vec)
            .unwrap_or_default();
        let node_vector = self.graph.node(node).vector.clone();

        let mut scored: Vec<Candidate> = current
            .iter()
            .map(|&nb| Candidate {
                distance: self.kernel.distance(&node_vector, self.node_vector(nb)),
                id: nb,
            })
            .collect();
        scored.sort_unstable();

        let kept: Vec<u32> = scored.into_iter().take(m_l).map(|c| c.id).collect();
        self.graph.set_neighbors(node, layer, kept);
    }

    fn search_internal(&self, query: &[f32], k: usize, ef_search: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.kernel.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.kernel.dimension(),
                actual: query.len(),
            });
        }
        if self.graph.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let entry = self.graph.entry_point.expect("non-empty graph has an entry point");
        let entry_max_layer = self.graph.node(entry).max_layer;
        let mut cur = vec![entry];

        for l in (1..=entry_max_layer).rev() {
            let candidates = self.search_layer(query, &cur, 1, l);
            if let Some(nearest) = candidates.into_iter().min() {
                cur = vec![nearest.id];
            }
        }

        let candidates = self.search_layer(query, &cur, ef_search.max(1), 0);
        let mut results: Vec<SearchResult> = candidates
            .into_iter()
            .map(|c| {
                let v = self.node_vector(c.id);
                SearchResult {
                    id: self.graph.node(c.id).external_id,
                    similarity: self.kernel.similarity(query, v),
                    distance: c.distance,
                }
            })
            .collect();

        results.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.id.cmp(&b.id)));
        results.truncate(k);
        Ok(results)
    }
}

impl VectorIndex for HnswIndex {
    fn add(&mut self, id: u64, v: Vec<f32>) -> Result<()> {
        if v.len() != self.kernel.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.kernel.dimension(),
                actual: v.len(),
            });
        }

        if let Some(internal) = self.graph.internal_of(id) {
            // Idempotent-by-last-write: overwrite the vector only, leaving
            // the node's layer and graph edges from its prior insertion.
            self.graph.overwrite_vector(internal, v);
            return Ok(());
        }

        if self.graph.is_empty() {
            let internal = self.graph.insert_new(id, v, 0);
            self.graph.entry_point = Some(internal);
            return Ok(());
        }

        let level = self.sample_layer();
        let former_entry_max_layer = self
            .graph
            .entry_point
            .map(|ep| self.graph.node(ep).max_layer)
            .unwrap_or(0);

        let internal = self.graph.insert_new(id, v, level);
        self.insert_procedure(internal, level);

        if level > former_entry_max_layer {
            self.graph.entry_point = Some(internal);
        }

        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.search_internal(query, k, self.params.ef_construction)
    }

    fn get_vector(&self, id: u64) -> Option<Vec<f32>> {
        let internal = self.graph.internal_of(id)?;
        Some(self.node_vector(internal).to_vec())
    }

    fn size(&self) -> usize {
        self.graph.len()
    }

    fn clear(&mut self) {
        self.graph.clear();
    }

    fn save(&self, path: &Path) -> Result<()> {
        persistence::save(path, &self.graph, &self.params, self.kernel.dimension())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let (graph, params, dimension) = persistence::load(path, false)?;
        if dimension != self.kernel.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.kernel.dimension(),
                actual: dimension,
            });
        }
        self.graph = graph;
        self.params = HnswParams::custom(params.m, params.ef_construction, params.ml, self.params.seed);
        Ok(())
    }
}

#[cfg(test)]
mod hnsw_tests;
