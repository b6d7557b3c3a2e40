//! HNSW construction parameters.

/// Construction and search parameters for the HNSW index.
#[derive(Debug, Clone, Copy)]
pub struct HnswParams {
    /// Per-layer neighbor cap for layers above 0. Layer 0 uses `2 * m`.
    pub m: usize,
    /// Candidate-set width used while building the graph.
    pub ef_construction: usize,
    /// Layer-assignment multiplier. Smaller values produce taller, sparser
    /// upper layers.
    pub ml: f64,
    /// RNG seed. The same seed with the same insertion order reproduces
    /// the same graph byte-for-byte.
    pub seed: u64,
}

/// Layers are capped at 16 to bound memory per node, matching canonical
/// HNSW practice.
pub const MAX_LAYER: usize = 16;

impl HnswParams {
    /// A reasonable default: `M=16`, `efConstruction=200`, `mL = 1/ln(2)`.
    #[must_use]
    pub fn auto() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ml: 1.0 / std::f64::consts::LN_2,
            seed: 0x5EED,
        }
    }

    /// Favors build/query speed over recall: smaller `M` and
    /// `efConstruction`.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            m: 8,
            ef_construction: 64,
            ..Self::auto()
        }
    }

    /// Favors recall over speed: larger `M` and `efConstruction`.
    #[must_use]
    pub fn high_recall() -> Self {
        Self {
            m: 32,
            ef_construction: 400,
            ..Self::auto()
        }
    }

    /// Builds a custom parameter set. Caller is responsible for sane
    /// values (`m >= 1`, `ef_construction >= 1`, `ml > 0`).
    #[must_use]
    pub const fn custom(m: usize, ef_construction: usize, ml: f64, seed: u64) -> Self {
        Self {
            m,
            ef_construction,
            ml,
            seed,
        }
    }

    /// Neighbor cap for layer 0 (`2 * m`).
    #[must_use]
    pub const fn m0(&self) -> usize {
        2 * self.m
    }

    /// Neighbor cap for a given layer: `m0()` at layer 0, `m` above it.
    #[must_use]
    pub const fn m_at(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m0()
        } else {
            self.m
        }
    }
}

impl Default for HnswParams {
    fn default() -> Self {
        Self::auto()
    }
}
