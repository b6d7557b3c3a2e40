//! `kvid search`: query a previously built index.

use std::path::PathBuf;

use kvid_core::chunker::ChunkerConfig;
use kvid_core::store::{HashEmbedder, Store};

use super::{new_index, IndexBackend, Metric};

/// Parsed arguments for the `search` subcommand.
pub struct SearchArgs {
    /// Path to a previously built index.
    pub index: PathBuf,
    /// Path to the matching chunk corpus sidecar.
    pub corpus: PathBuf,
    /// Query text.
    pub query: String,
    /// Number of results to return.
    pub top_k: usize,
    /// Index backend the index was built with.
    pub backend: IndexBackend,
    /// Similarity kernel the index was built with.
    pub metric: Metric,
    /// Embedding dimension the index was built with.
    pub dimension: usize,
}

/// Runs the `search` subcommand.
pub fn run(args: SearchArgs) -> anyhow::Result<()> {
    let mut store = Store::new(
        ChunkerConfig::default(),
        Box::new(HashEmbedder::new(args.dimension)),
        new_index(args.backend, args.metric, args.dimension),
    );

    store.load_index(&args.index)?;
    store.load_corpus(&args.corpus)?;

    let hits = store.search(&args.query, args.top_k)?;
    if hits.is_empty() {
        println!("no results");
        return Ok(());
    }

    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{}. similarity={:.4} distance={:.4}",
            rank + 1,
            hit.result.similarity,
            hit.result.distance
        );
        println!("   {}", hit.chunk.content);
    }

    Ok(())
}
