//! Configuration loaded from a TOML file, with every field defaulted so a
//! caller can override only what they care about. The teacher loads its
//! broader configuration surface through `figment`; this crate's surface is
//! narrow enough that a direct `toml::from_str` covers it without pulling
//! in a layered-config crate (see DESIGN.md).

use serde::{Deserialize, Serialize};

use crate::chunker::ChunkerConfig;
use crate::collaborators::EccLevel;
use crate::error::{Error, Result};
use crate::index::hnsw::HnswParams;

/// HNSW construction defaults, serde-mirrored from [`HnswParams`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswSettings {
    /// Per-layer neighbor cap. See [`HnswParams::m`].
    pub m: usize,
    /// Build-time candidate width. See [`HnswParams::ef_construction`].
    pub ef_construction: usize,
    /// Layer-assignment multiplier. See [`HnswParams::ml`].
    pub ml: f64,
    /// RNG seed for deterministic builds.
    pub seed: u64,
}

impl Default for HnswSettings {
    fn default() -> Self {
        let p = HnswParams::auto();
        Self {
            m: p.m,
            ef_construction: p.ef_construction,
            ml: p.ml,
            seed: p.seed,
        }
    }
}

impl From<HnswSettings> for HnswParams {
    fn from(s: HnswSettings) -> Self {
        HnswParams::custom(s.m, s.ef_construction, s.ml, s.seed)
    }
}

/// Chunker defaults, serde-mirrored from [`ChunkerConfig`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerSettings {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters of overlap retained between consecutive chunks.
    pub overlap_size: usize,
    /// Whether to extend chunk boundaries to sentence terminators.
    pub preserve_sentences: bool,
}

impl Default for ChunkerSettings {
    fn default() -> Self {
        let c = ChunkerConfig::default();
        Self {
            chunk_size: c.chunk_size,
            overlap_size: c.overlap_size,
            preserve_sentences: c.preserve_sentences,
        }
    }
}

impl From<ChunkerSettings> for ChunkerConfig {
    fn from(s: ChunkerSettings) -> Self {
        ChunkerConfig::new(s.chunk_size, s.overlap_size, s.preserve_sentences)
    }
}

/// QR generation defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct QrSettings {
    /// Error-correction level to request.
    pub ecc: EccLevel,
    /// Specific QR version to request, or `None` to let the generator pick.
    pub version: Option<u8>,
}

impl Default for QrSettings {
    fn default() -> Self {
        Self {
            ecc: EccLevel::Medium,
            version: None,
        }
    }
}

/// Video encoding defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    /// Output frame width in pixels.
    pub width: u32,
    /// Output frame height in pixels.
    pub height: u32,
    /// Output frames per second.
    pub fps: u32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            fps: 10,
        }
    }
}

/// Top-level configuration, loadable from a TOML file. CLI flags are
/// expected to layer on top of these defaults (the CLI parses flags with
/// `clap` and falls back to the matching field here when a flag is unset).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// HNSW index defaults.
    pub hnsw: HnswSettings,
    /// Chunker defaults.
    pub chunker: ChunkerSettings,
    /// QR generation defaults.
    pub qr: QrSettings,
    /// Video encoding defaults.
    pub video: VideoSettings,
}

impl Config {
    /// Parses a TOML document into a `Config`, defaulting any field the
    /// document omits.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Reads and parses a TOML config file from `path`.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

#[cfg(test)]
mod config_tests;
