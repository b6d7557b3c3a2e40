//! The proximity graph arena: a dense array of node records indexed by a
//! compact internal index, with a dictionary from caller-supplied external
//! ID to internal index. Adjacency sets hold internal indices rather than
//! external IDs, keeping the graph itself free of any external-ID
//! indirection during traversal.

use std::collections::HashMap;

/// One node in the arena.
#[derive(Debug, Clone)]
pub struct NodeRecord {
    /// The caller-supplied ID.
    pub external_id: u64,
    /// Owned copy of the node's vector.
    pub vector: Vec<f32>,
    /// Highest layer this node participates in.
    pub max_layer: usize,
    /// `neighbors[layer]` is a sorted small-vector of internal indices.
    /// Sorted (not a hash set) for cache locality and deterministic
    /// serialization, per the expectation that adjacency sets stay small
    /// (typically <= 32 entries).
    pub neighbors: Vec<Vec<u32>>,
}

/// Dense arena of HNSW nodes plus the external-ID <-> internal-index
/// mapping and the current entry point.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<NodeRecord>,
    id_to_internal: HashMap<u64, u32>,
    /// Internal index of the current entry point, if the graph is
    /// non-empty.
    pub entry_point: Option<u32>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Looks up the internal index for an external ID.
    #[must_use]
    pub fn internal_of(&self, external_id: u64) -> Option<u32> {
        self.id_to_internal.get(&external_id).copied()
    }

    /// Borrows a node record by internal index.
    #[must_use]
    pub fn node(&self, internal: u32) -> &NodeRecord {
        &self.nodes[internal as usize]
    }

    /// Mutably borrows a node record by internal index.
    pub fn node_mut(&mut self, internal: u32) -> &mut NodeRecord {
        &mut self.nodes[internal as usize]
    }

    /// Neighbor list of `internal` at `layer`, or `None` if the node
    /// doesn't participate in that layer.
    #[must_use]
    pub fn neighbors(&self, internal: u32, layer: usize) -> Option<&[u32]> {
        self.nodes[internal as usize]
            .neighbors
            .get(layer)
            .map(Vec::as_slice)
    }

    /// Allocates a new node for a fresh external ID. Panics if `external_id`
    /// already exists — callers must check `internal_of` first.
    pub fn insert_new(&mut self, external_id: u64, vector: Vec<f32>, max_layer: usize) -> u32 {
        debug_assert!(!self.id_to_internal.contains_key(&external_id));
        let internal = self.nodes.len() as u32;
        self.nodes.push(NodeRecord {
            external_id,
            vector,
            max_layer,
            neighbors: vec![Vec::new(); max_layer + 1],
        });
        self.id_to_internal.insert(external_id, internal);
        internal
    }

    /// Overwrites the vector of an existing node in place, per the
    /// idempotent-by-last-write `add` semantics: graph edges and the
    /// node's layer assignment are left untouched.
    pub fn overwrite_vector(&mut self, internal: u32, vector: Vec<f32>) {
        self.nodes[internal as usize].vector = vector;
    }

    /// Adds `neighbor` to `node`'s adjacency set at `layer`, keeping it
    /// sorted and free of duplicates. Returns the resulting neighbor count
    /// so the caller can decide whether to prune.
    pub fn add_neighbor(&mut self, node: u32, layer: usize, neighbor: u32) -> usize {
        let list = &mut self.nodes[node as usize].neighbors[layer];
        if let Err(pos) = list.binary_search(&neighbor) {
            list.insert(pos, neighbor);
        }
        list.len()
    }

    /// Replaces `node`'s neighbor set at `layer` wholesale, sorted.
    pub fn set_neighbors(&mut self, node: u32, layer: usize, mut neighbors: Vec<u32>) {
        neighbors.sort_unstable();
        neighbors.dedup();
        self.nodes[node as usize].neighbors[layer] = neighbors;
    }

    /// Drops every node and mapping.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.id_to_internal.clear();
        self.entry_point = None;
    }

    /// Iterates all nodes in internal-index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &NodeRecord)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (i as u32, n))
    }
}
