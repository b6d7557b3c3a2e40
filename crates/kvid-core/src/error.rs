//! Error types for `kvid`.
//!
//! A single unified error type covers the index, the chunker, and the
//! encode/decode pipeline. Each variant carries a stable `KVID-NNN` code so
//! that callers (and logs) can key off a string that won't drift if the
//! message text changes.

use thiserror::Error;

/// Result type alias for `kvid` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `kvid` operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Vector dimension did not match the kernel's dimension (KVID-001).
    #[error("[KVID-001] vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// An argument was invalid (KVID-002).
    #[error("[KVID-002] invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation was attempted in an invalid state, e.g. a second
    /// `buildVideo` while the encoder is still busy (KVID-003).
    #[error("[KVID-003] invalid state: {0}")]
    InvalidState(String),

    /// A chunk's content exceeds the QR generator's data capacity (KVID-004).
    #[error("[KVID-004] chunk content ({actual} bytes) exceeds QR capacity ({max} bytes)")]
    ChunkExceedsCapacity {
        /// The chunk's content length.
        actual: usize,
        /// The generator's maximum data capacity.
        max: usize,
    },

    /// The requested error-correction level isn't supported by the QR
    /// generator (KVID-005).
    #[error("[KVID-005] unsupported error-correction level: {0}")]
    UnsupportedEcc(String),

    /// Resource or I/O failure: missing file, permission denied, missing
    /// video track, unavailable codec (KVID-006).
    #[error("[KVID-006] resource error: {0}")]
    Resource(String),

    /// Wraps `std::io::Error` (KVID-007).
    #[error("[KVID-007] I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Persisted index or container data is corrupt (KVID-008). `load`
    /// guarantees it never leaves a partially-populated index behind this
    /// error.
    #[error("[KVID-008] corrupt data: {0}")]
    CorruptData(String),

    /// Serialization/deserialization failure outside of the structured
    /// persistence formats (KVID-009).
    #[error("[KVID-009] serialization error: {0}")]
    Serialization(String),

    /// An external collaborator (QR codec, video codec) reported failure
    /// (KVID-010).
    #[error("[KVID-010] collaborator error: {0}")]
    Collaborator(String),

    /// Internal invariant violation. Should never happen; report if seen
    /// (KVID-011).
    #[error("[KVID-011] internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the stable error code (e.g. `"KVID-001"`).
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => "KVID-001",
            Self::InvalidArgument(_) => "KVID-002",
            Self::InvalidState(_) => "KVID-003",
            Self::ChunkExceedsCapacity { .. } => "KVID-004",
            Self::UnsupportedEcc(_) => "KVID-005",
            Self::Resource(_) => "KVID-006",
            Self::Io(_) => "KVID-007",
            Self::CorruptData(_) => "KVID-008",
            Self::Serialization(_) => "KVID-009",
            Self::Collaborator(_) => "KVID-010",
            Self::Internal(_) => "KVID-011",
        }
    }

    /// Returns whether a caller can reasonably retry or work around this
    /// error. Corrupt data and internal errors are not recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CorruptData(_) | Self::Internal(_))
    }
}

#[cfg(test)]
mod error_tests;
