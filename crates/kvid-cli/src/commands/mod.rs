//! CLI subcommand implementations, one module per `kvid` subcommand.

pub mod build_index;
pub mod decode;
pub mod encode;
pub mod info;
pub mod search;

use kvid_core::index::hnsw::HnswParams;
use kvid_core::index::{FlatIndex, HnswIndex, VectorIndex};
use kvid_core::kernel::{CosineKernel, DotKernel, L2Kernel, SimilarityKernel};

/// Which `VectorIndex` backend a build/search command should use.
#[derive(Debug, Clone, Copy)]
pub enum IndexBackend {
    /// Exact, exhaustive-scan index.
    Flat,
    /// Approximate multi-layer proximity graph.
    Hnsw,
}

/// Which `SimilarityKernel` a build/search command should use.
#[derive(Debug, Clone, Copy)]
pub enum Metric {
    /// Cosine similarity.
    Cosine,
    /// Raw dot product.
    Dot,
    /// Euclidean distance.
    L2,
}

fn kernel(metric: Metric, dimension: usize) -> Box<dyn SimilarityKernel> {
    match metric {
        Metric::Cosine => Box::new(CosineKernel::new(dimension)),
        Metric::Dot => Box::new(DotKernel::new(dimension)),
        Metric::L2 => Box::new(L2Kernel::new(dimension)),
    }
}

/// Builds an empty index of the requested backend and metric.
pub fn new_index(backend: IndexBackend, metric: Metric, dimension: usize) -> Box<dyn VectorIndex> {
    match backend {
        IndexBackend::Flat => Box::new(FlatIndex::new(kernel(metric, dimension))),
        IndexBackend::Hnsw => Box::new(HnswIndex::new(kernel(metric, dimension), HnswParams::auto())),
    }
}
