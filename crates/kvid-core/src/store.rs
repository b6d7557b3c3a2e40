//! `Store`: a thin facade bundling a chunker, a pluggable [`Embedder`], and
//! a [`VectorIndex`] so callers have one type to drive end-to-end instead
//! of wiring chunker/embedder/index together themselves.

use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;
use crate::chunker::{Chunker, ChunkerConfig};
use crate::error::{Error, Result};
use crate::index::{SearchResult, VectorIndex};

#[derive(Serialize, Deserialize)]
struct ChunkRecord {
    id: u64,
    chunk: Chunk,
}

/// Turns text into a fixed-dimension embedding vector. The core never
/// computes embeddings itself; this trait is the seam callers implement to
/// plug in a real model.
pub trait Embedder: Send + Sync {
    /// Embeds a single piece of text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// The dimension of vectors this embedder produces.
    fn dimension(&self) -> usize;
}

/// A deterministic, dependency-free [`Embedder`] for examples, tests, and
/// default CLI operation. Hashes whitespace-delimited tokens into buckets
/// of a fixed-size vector and L2-normalizes the result, so cosine
/// similarity between embeddings reflects shared-token overlap. Not a
/// substitute for a real model — just a default that needs nothing beyond
/// the standard library to run end-to-end.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Creates an embedder producing vectors of the given dimension.
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn hash_token(token: &str) -> u64 {
        // FNV-1a: small, dependency-free, and stable across runs.
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in token.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
        }
        hash
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0f32; self.dimension];
        for token in text.split_whitespace() {
            let lower = token.to_lowercase();
            let h = Self::hash_token(&lower);
            let bucket = (h as usize) % self.dimension;
            let sign = if (h >> 63) & 1 == 0 { 1.0 } else { -1.0 };
            v[bucket] += sign;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        Ok(v)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// One search hit joining the index's raw [`SearchResult`] with the chunk
/// it refers to.
#[derive(Debug, Clone)]
pub struct StoreHit {
    /// The chunk matched by the query.
    pub chunk: Chunk,
    /// The raw similarity/distance result from the index.
    pub result: SearchResult,
}

/// Bundles a chunker, an [`Embedder`], and a [`VectorIndex`] behind one
/// type: `add_text` chunks and embeds in one call, `search` embeds the
/// query and joins hits back to their source chunks.
pub struct Store {
    chunker: Chunker,
    embedder: Box<dyn Embedder>,
    index: Box<dyn VectorIndex>,
    chunks: HashMap<u64, Chunk>,
    next_id: u64,
}

impl Store {
    /// Creates a store over the given chunker configuration, embedder, and
    /// index. The embedder's and index's dimensions are not cross-checked
    /// here; a mismatch surfaces as a [`crate::error::Error::DimensionMismatch`]
    /// on the first `add_text`.
    #[must_use]
    pub fn new(chunker_config: ChunkerConfig, embedder: Box<dyn Embedder>, index: Box<dyn VectorIndex>) -> Self {
        Self {
            chunker: Chunker::new(chunker_config),
            embedder,
            index,
            chunks: HashMap::new(),
            next_id: 0,
        }
    }

    /// Chunks `text`, embeds each chunk, and inserts it into the index.
    /// Returns the IDs assigned to the newly inserted chunks, in chunk
    /// order. If embedding or insertion fails partway through, chunks
    /// already inserted remain in the index and in the store's chunk map.
    pub fn add_text(&mut self, text: &str) -> Result<Vec<u64>> {
        let chunks = self.chunker.chunk(text);
        let mut ids = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let vector = self.embedder.embed(&chunk.content)?;
            let id = self.next_id;
            self.next_id += 1;
            self.index.add(id, vector)?;
            self.chunks.insert(id, chunk);
            ids.push(id);
        }
        Ok(ids)
    }

    /// Embeds `query` and returns up to `k` matching chunks, ordered by
    /// descending similarity.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<StoreHit>> {
        let vector = self.embedder.embed(query)?;
        let results = self.index.search(&vector, k)?;
        Ok(results
            .into_iter()
            .filter_map(|result| {
                self.chunks.get(&result.id).map(|chunk| StoreHit {
                    chunk: chunk.clone(),
                    result,
                })
            })
            .collect())
    }

    /// Number of chunks currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the store has no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Drops every chunk and resets the underlying index.
    pub fn clear(&mut self) {
        self.chunks.clear();
        self.index.clear();
        self.next_id = 0;
    }

    /// Looks up a previously stored chunk by ID.
    #[must_use]
    pub fn chunk(&self, id: u64) -> Option<&Chunk> {
        self.chunks.get(&id)
    }

    /// Persists the underlying vector index to `index_path`.
    pub fn save_index(&self, index_path: &Path) -> Result<()> {
        self.index.save(index_path)
    }

    /// Replaces the underlying vector index wholesale with what's stored at
    /// `index_path`.
    pub fn load_index(&mut self, index_path: &Path) -> Result<()> {
        self.index.load(index_path)
    }

    /// Writes the chunk corpus as newline-delimited JSON records, one
    /// `{id, chunk}` object per line, so a later process can rejoin search
    /// results from a loaded index back to their source text.
    pub fn save_corpus(&self, corpus_path: &Path) -> Result<()> {
        let tmp_path = corpus_path.with_extension("tmp");
        {
            let mut f = fs::File::create(&tmp_path)?;
            let mut ids: Vec<&u64> = self.chunks.keys().collect();
            ids.sort_unstable();
            for id in ids {
                let record = ChunkRecord {
                    id: *id,
                    chunk: self.chunks[id].clone(),
                };
                let line = serde_json::to_string(&record).map_err(|e| Error::Serialization(e.to_string()))?;
                writeln!(f, "{line}")?;
            }
            f.sync_all()?;
        }
        fs::rename(&tmp_path, corpus_path)?;
        Ok(())
    }

    /// Replaces the in-memory chunk corpus with what's stored at
    /// `corpus_path`. Does not touch the vector index; pair with
    /// [`Store::load_index`] to fully restore a saved store.
    pub fn load_corpus(&mut self, corpus_path: &Path) -> Result<()> {
        let f = fs::File::open(corpus_path)?;
        let mut chunks = HashMap::new();
        let mut next_id = 0u64;
        for line in BufReader::new(f).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: ChunkRecord =
                serde_json::from_str(&line).map_err(|e| Error::Serialization(e.to_string()))?;
            next_id = next_id.max(record.id + 1);
            chunks.insert(record.id, record.chunk);
        }
        self.chunks = chunks;
        self.next_id = next_id;
        Ok(())
    }
}

#[cfg(test)]
mod store_tests;
