//! The `Chunk` type produced by the text chunker and consumed by the
//! encode coordinator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A bounded, ordered slice of source text with a stable `sequence_number`.
/// Chunks are immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// The chunk's text content, already trimmed.
    pub content: String,
    /// Byte offset of `content`'s start within the source string.
    pub start_offset: usize,
    /// Byte offset of `content`'s end within the source string.
    pub end_offset: usize,
    /// 0-based index within the parent text.
    pub sequence_number: usize,
    /// Index of the parent text this chunk belongs to, when chunks from
    /// multiple source texts are pooled together (e.g. multiple
    /// `addMessage` calls feeding one encode coordinator).
    pub parent_index: Option<usize>,
    /// Free-form string metadata attached by the caller.
    pub metadata: HashMap<String, String>,
}

impl Chunk {
    /// Creates a new chunk with no metadata and no parent index.
    #[must_use]
    pub fn new(content: String, start_offset: usize, end_offset: usize, sequence_number: usize) -> Self {
        Self {
            content,
            start_offset,
            end_offset,
            sequence_number,
            parent_index: None,
            metadata: HashMap::new(),
        }
    }

    /// Builder-style setter for `parent_index`.
    #[must_use]
    pub fn with_parent_index(mut self, parent_index: usize) -> Self {
        self.parent_index = Some(parent_index);
        self
    }

    /// Builder-style setter for a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
