//! # kvid-core
//!
//! A text corpus store that hides its payload inside QR-coded video frames,
//! with an HNSW approximate-nearest-neighbor index for semantic retrieval
//! over the chunked text.
//!
//! ## Features
//!
//! - **Text-in-video persistence**: messages are chunked, rendered as QR
//!   codes, and encoded into a video container; decoding reverses the
//!   process frame by frame.
//! - **Two index backends**: an exhaustive [`index::FlatIndex`] (exact,
//!   O(n) search) and an approximate [`index::HnswIndex`] (sub-linear
//!   search via a multi-layer proximity graph), sharing one
//!   [`index::VectorIndex`] trait.
//! - **Pluggable similarity**: [`kernel::SimilarityKernel`] implementations
//!   for cosine, dot-product, and Euclidean distance.
//! - **Pluggable embedding**: [`store::Embedder`] is the seam for a real
//!   model; [`store::HashEmbedder`] ships as a dependency-free default.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kvid_core::chunker::ChunkerConfig;
//! use kvid_core::collaborators::qr::QrcodeGenerator;
//! use kvid_core::collaborators::video::NativeContainerEncoder;
//! use kvid_core::collaborators::{EccLevel, VideoEncoder as _};
//! use kvid_core::pipeline::{BuildParams, EncodeCoordinator};
//!
//! # fn main() -> kvid_core::error::Result<()> {
//! let mut coordinator = EncodeCoordinator::new(
//!     ChunkerConfig::default(),
//!     Box::new(QrcodeGenerator::new()),
//!     Box::new(NativeContainerEncoder::new()),
//! );
//! coordinator.add_message("hello from kvid");
//! coordinator.build_video(
//!     std::path::Path::new("out.kvid"),
//!     BuildParams {
//!         width: 512,
//!         height: 512,
//!         fps: 10,
//!         ecc: EccLevel::Medium,
//!         version: None,
//!     },
//! )?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod chunk;
pub mod chunker;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod index;
pub mod kernel;
pub mod pipeline;
pub mod store;

pub use chunk::Chunk;
pub use chunker::{Chunker, ChunkerConfig};
pub use config::Config;
pub use error::{Error, Result};
pub use index::{FlatIndex, HnswIndex, SearchResult, VectorIndex};
pub use kernel::SimilarityKernel;
pub use pipeline::{BuildParams, CoordinatorState, DecodeCoordinator, EncodeCoordinator};
pub use store::{Embedder, HashEmbedder, Store, StoreHit};
