//! Exhaustive-scan flat index: the exact-search oracle against which the
//! HNSW index's recall is measured, and a sane default for small `N`.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::kernel::SimilarityKernel;

use super::{SearchResult, VectorIndex};

/// Same public surface as the HNSW index, implemented with a dense map and
/// a linear scan per query.
pub struct FlatIndex {
    kernel: Box<dyn SimilarityKernel>,
    vectors: BTreeMap<u64, Vec<f32>>,
}

impl FlatIndex {
    /// Creates an empty flat index using `kernel` for similarity/distance.
    #[must_use]
    pub fn new(kernel: Box<dyn SimilarityKernel>) -> Self {
        Self {
            kernel,
            vectors: BTreeMap::new(),
        }
    }

    /// The kernel's fixed vector dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.kernel.dimension()
    }
}

impl VectorIndex for FlatIndex {
    fn add(&mut self, id: u64, v: Vec<f32>) -> Result<()> {
        if v.len() != self.kernel.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.kernel.dimension(),
                actual: v.len(),
            });
        }
        self.vectors.insert(id, v);
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if self.vectors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.kernel.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.kernel.dimension(),
                actual: query.len(),
            });
        }

        let mut results: Vec<SearchResult> = self
            .vectors
            .iter()
            .map(|(id, v)| SearchResult {
                id: *id,
                similarity: self.kernel.similarity(query, v),
                distance: self.kernel.distance(query, v),
            })
            .collect();

        // Descending similarity, tie-broken by ascending ID for determinism.
        results.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        results.truncate(k);
        Ok(results)
    }

    fn get_vector(&self, id: u64) -> Option<Vec<f32>> {
        self.vectors.get(&id).cloned()
    }

    fn size(&self) -> usize {
        self.vectors.len()
    }

    fn clear(&mut self) {
        self.vectors.clear();
    }

    fn save(&self, path: &Path) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        {
            let mut f = fs::File::create(&tmp_path)?;
            writeln!(f, "{}", self.kernel.dimension())?;
            writeln!(f, "{}", self.vectors.len())?;
            for (id, v) in &self.vectors {
                let row = v.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
                writeln!(f, "{id},{row}")?;
            }
            f.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        let f = fs::File::open(path)?;
        let mut lines = BufReader::new(f).lines();

        let dimension: usize = lines
            .next()
            .ok_or_else(|| Error::CorruptData("missing dimension line".into()))??
            .trim()
            .parse()
            .map_err(|_| Error::CorruptData("invalid dimension line".into()))?;

        if dimension != self.kernel.dimension() {
            return Err(Error::DimensionMismatch {
                expected: self.kernel.dimension(),
                actual: dimension,
            });
        }

        let vector_count: usize = lines
            .next()
            .ok_or_else(|| Error::CorruptData("missing vector count line".into()))??
            .trim()
            .parse()
            .map_err(|_| Error::CorruptData("invalid vector count line".into()))?;

        let mut loaded = BTreeMap::new();
        for _ in 0..vector_count {
            let line = lines
                .next()
                .ok_or_else(|| Error::CorruptData("truncated vector data".into()))??;
            let mut parts = line.split(',');
            let id: u64 = parts
                .next()
                .ok_or_else(|| Error::CorruptData("missing id".into()))?
                .parse()
                .map_err(|_| Error::CorruptData("invalid id".into()))?;
            let values: Vec<f32> = parts
                .map(|s| s.parse::<f32>().map_err(|_| Error::CorruptData("invalid float".into())))
                .collect::<Result<_>>()?;
            if values.len() != dimension {
                return Err(Error::CorruptData(format!(
                    "vector for id {id} has {} components, expected {dimension}",
                    values.len()
                )));
            }
            loaded.insert(id, values);
        }

        // Only commit once the whole file has parsed cleanly.
        self.vectors = loaded;
        Ok(())
    }
}

#[cfg(test)]
mod flat_tests;
