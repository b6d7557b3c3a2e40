//! Sentence-preserving, overlapping text chunker.

use crate::chunk::Chunk;

const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Chunker configuration.
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters of tail retained as the head of the next chunk.
    pub overlap_size: usize,
    /// Whether to extend a chunk boundary to the next sentence terminator
    /// when doing so doesn't blow past 1.5x `chunk_size`.
    pub preserve_sentences: bool,
}

impl ChunkerConfig {
    /// Creates a new chunker configuration.
    #[must_use]
    pub const fn new(chunk_size: usize, overlap_size: usize, preserve_sentences: bool) -> Self {
        Self {
            chunk_size,
            overlap_size,
            preserve_sentences,
        }
    }
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            overlap_size: 64,
            preserve_sentences: true,
        }
    }
}

/// Splits text into ordered, possibly overlapping, sentence-aware chunks.
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    /// Creates a chunker with the given configuration.
    #[must_use]
    pub const fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    /// Splits `text` into chunks per §4.3: walk a cursor over the
    /// characters of `text`, proposing `end = min(cursor + chunk_size,
    /// len)`, optionally extending to the next sentence terminator when
    /// that doesn't exceed `1.5 * chunk_size`, emitting the trimmed slice,
    /// then advancing the cursor to `max(cursor + 1, end - overlap_size)`.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        self.chunk_with_parent(text, None)
    }

    /// Like [`Chunker::chunk`] but tags every emitted chunk with
    /// `parent_index`, for pooling chunks from multiple source texts.
    #[must_use]
    pub fn chunk_with_parent(&self, text: &str, parent_index: Option<usize>) -> Vec<Chunk> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let chunk_size = self.config.chunk_size.max(1);
        let overlap_size = self.config.overlap_size;

        let mut chunks = Vec::new();
        let mut cursor = 0usize;

        if len == 0 {
            return chunks;
        }

        loop {
            let proposed_end = (cursor + chunk_size).min(len);
            let mut end = proposed_end;

            if self.config.preserve_sentences && proposed_end < len {
                if let Some(extended) = Self::extend_to_sentence_boundary(&chars, proposed_end, len) {
                    if extended - cursor < (chunk_size * 3) / 2 {
                        end = extended;
                    }
                }
            }

            let raw: String = chars[cursor..end].iter().collect();
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                let seq = chunks.len();
                let mut chunk = Chunk::new(trimmed.to_string(), cursor, end, seq);
                if let Some(p) = parent_index {
                    chunk = chunk.with_parent_index(p);
                }
                chunks.push(chunk);
            }

            if end >= len {
                break;
            }
            let next_cursor = (cursor + 1).max(end.saturating_sub(overlap_size));
            cursor = next_cursor;
        }

        chunks
    }

    /// Scans forward from `from` for the next sentence terminator, then
    /// skips trailing whitespace. Returns `None` if no terminator is found
    /// before the end of the text.
    fn extend_to_sentence_boundary(chars: &[char], from: usize, len: usize) -> Option<usize> {
        let mut i = from;
        while i < len && !SENTENCE_TERMINATORS.contains(&chars[i]) {
            i += 1;
        }
        if i >= len {
            return None;
        }
        i += 1; // consume the terminator itself
        while i < len && chars[i].is_whitespace() {
            i += 1;
        }
        Some(i)
    }
}

#[cfg(test)]
mod chunker_tests;
