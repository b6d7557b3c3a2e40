//! `kvid build-index`: chunk, embed, and index a text corpus.

use std::path::PathBuf;

use kvid_core::chunker::ChunkerConfig;
use kvid_core::store::{HashEmbedder, Store};

use super::{new_index, IndexBackend, Metric};

/// Parsed arguments for the `build-index` subcommand.
pub struct BuildIndexArgs {
    /// Source text file.
    pub input: PathBuf,
    /// Path to write the index to.
    pub index_output: PathBuf,
    /// Path to write the chunk corpus sidecar to.
    pub corpus_output: PathBuf,
    /// Index backend.
    pub backend: IndexBackend,
    /// Similarity kernel.
    pub metric: Metric,
    /// Embedding dimension.
    pub dimension: usize,
    /// Characters per chunk.
    pub chunk_size: usize,
    /// Characters of overlap between consecutive chunks.
    pub overlap: usize,
}

/// Runs the `build-index` subcommand.
pub fn run(args: BuildIndexArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.input)?;

    let mut store = Store::new(
        ChunkerConfig::new(args.chunk_size, args.overlap, true),
        Box::new(HashEmbedder::new(args.dimension)),
        new_index(args.backend, args.metric, args.dimension),
    );

    let ids = store.add_text(&text)?;
    store.save_index(&args.index_output)?;
    store.save_corpus(&args.corpus_output)?;

    println!("Indexed {} chunks", ids.len());
    println!("  index:  {}", args.index_output.display());
    println!("  corpus: {}", args.corpus_output.display());

    Ok(())
}
