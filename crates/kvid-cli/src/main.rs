//! kvid CLI - encode text corpora into QR-coded video and query them back.
//!
//! Usage:
//!   `kvid encode input.txt out.kvid`
//!   `kvid decode out.kvid`
//!   `kvid build-index corpus.txt index.flat corpus.jsonl`
//!   `kvid search index.flat corpus.jsonl "query text"`
//!   `kvid info out.kvid`

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use kvid_core::collaborators::EccLevel;
use kvid_core::config::Config;

#[derive(Parser)]
#[command(name = "kvid")]
#[command(author, version, about = "Text-in-video semantic store")]
#[command(propagate_version = true)]
struct Cli {
    /// Path to a TOML config file. Defaults to the platform config
    /// directory; flags given on the command line win over its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Resolves and loads the effective configuration: an explicit `--config`
/// path if given, else the platform config directory, else built-in
/// defaults if neither exists.
fn load_config(explicit: Option<PathBuf>) -> anyhow::Result<Config> {
    let path = explicit.or_else(|| dirs::config_dir().map(|d| d.join("kvid").join("config.toml")));
    match path {
        Some(p) if p.exists() => Ok(Config::load(&p)?),
        _ => Ok(Config::default()),
    }
}

/// CLI error-correction level option, mirroring [`EccLevel`].
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum EccArg {
    Low,
    #[default]
    Medium,
    Quartile,
    High,
}

impl From<EccArg> for EccLevel {
    fn from(e: EccArg) -> Self {
        match e {
            EccArg::Low => EccLevel::Low,
            EccArg::Medium => EccLevel::Medium,
            EccArg::Quartile => EccLevel::Quartile,
            EccArg::High => EccLevel::High,
        }
    }
}

/// Which `VectorIndex` backend to build or search against.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum IndexBackendArg {
    Flat,
    #[default]
    Hnsw,
}

/// Which `SimilarityKernel` to use.
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum MetricArg {
    #[default]
    Cosine,
    Dot,
    L2,
}

#[derive(Subcommand)]
enum Commands {
    /// Chunk a text file, render each chunk as a QR code, and encode the
    /// result into a video container.
    Encode {
        /// Path to the source text file.
        input: PathBuf,
        /// Path to write the container to.
        output: PathBuf,
        /// Output frame width in pixels. Defaults to the config file's
        /// `video.width`, or 512 if unconfigured.
        #[arg(long)]
        width: Option<u32>,
        /// Output frame height in pixels. Defaults to `video.height`.
        #[arg(long)]
        height: Option<u32>,
        /// Output frames per second. Defaults to `video.fps`.
        #[arg(long)]
        fps: Option<u32>,
        /// QR error-correction level. Defaults to `qr.ecc`.
        #[arg(long, value_enum)]
        ecc: Option<EccArg>,
        /// Characters per chunk. Defaults to `chunker.chunk_size`.
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Characters of overlap between consecutive chunks. Defaults to
        /// `chunker.overlap_size`.
        #[arg(long)]
        overlap: Option<usize>,
        /// Shell out to `ffmpeg` instead of writing the native container.
        #[arg(long)]
        ffmpeg: bool,
    },

    /// Decode a container back into chunk text, one line per frame.
    Decode {
        /// Path to the container to read.
        input: PathBuf,
        /// Only decode these frame numbers (comma-separated); all frames if
        /// omitted.
        #[arg(long, value_delimiter = ',')]
        frames: Option<Vec<u32>>,
    },

    /// Build a vector index (and its chunk corpus sidecar) from a text file.
    BuildIndex {
        /// Path to the source text file.
        input: PathBuf,
        /// Path to write the index to.
        index_output: PathBuf,
        /// Path to write the chunk corpus sidecar to.
        corpus_output: PathBuf,
        /// Index backend.
        #[arg(long, value_enum, default_value = "hnsw")]
        backend: IndexBackendArg,
        /// Similarity kernel.
        #[arg(long, value_enum, default_value = "cosine")]
        metric: MetricArg,
        /// Embedding dimension.
        #[arg(long, default_value_t = 128)]
        dimension: usize,
        /// Characters per chunk. Defaults to `chunker.chunk_size`.
        #[arg(long)]
        chunk_size: Option<usize>,
        /// Characters of overlap between consecutive chunks. Defaults to
        /// `chunker.overlap_size`.
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Search a previously built index for the chunks most similar to a
    /// query string.
    Search {
        /// Path to a previously built index.
        index: PathBuf,
        /// Path to the matching chunk corpus sidecar.
        corpus: PathBuf,
        /// Query text.
        query: String,
        /// Number of results to return.
        #[arg(short = 'k', long, default_value_t = 10)]
        top_k: usize,
        /// Index backend the index was built with.
        #[arg(long, value_enum, default_value = "hnsw")]
        backend: IndexBackendArg,
        /// Similarity kernel the index was built with.
        #[arg(long, value_enum, default_value = "cosine")]
        metric: MetricArg,
        /// Embedding dimension the index was built with.
        #[arg(long, default_value_t = 128)]
        dimension: usize,
    },

    /// Show container metadata without decoding any frames.
    Info {
        /// Path to the container to inspect.
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Encode {
            input,
            output,
            width,
            height,
            fps,
            ecc,
            chunk_size,
            overlap,
            ffmpeg,
        } => commands::encode::run(commands::encode::EncodeArgs {
            input,
            output,
            width: width.unwrap_or(config.video.width),
            height: height.unwrap_or(config.video.height),
            fps: fps.unwrap_or(config.video.fps),
            ecc: ecc.map_or(config.qr.ecc, Into::into),
            chunk_size: chunk_size.unwrap_or(config.chunker.chunk_size),
            overlap: overlap.unwrap_or(config.chunker.overlap_size),
            ffmpeg,
        })?,
        Commands::Decode { input, frames } => commands::decode::run(&input, frames.as_deref())?,
        Commands::BuildIndex {
            input,
            index_output,
            corpus_output,
            backend,
            metric,
            dimension,
            chunk_size,
            overlap,
        } => commands::build_index::run(commands::build_index::BuildIndexArgs {
            input,
            index_output,
            corpus_output,
            backend: backend.into(),
            metric: metric.into(),
            dimension,
            chunk_size: chunk_size.unwrap_or(config.chunker.chunk_size),
            overlap: overlap.unwrap_or(config.chunker.overlap_size),
        })?,
        Commands::Search {
            index,
            corpus,
            query,
            top_k,
            backend,
            metric,
            dimension,
        } => commands::search::run(commands::search::SearchArgs {
            index,
            corpus,
            query,
            top_k,
            backend: backend.into(),
            metric: metric.into(),
            dimension,
        })?,
        Commands::Info { input } => commands::info::run(&input)?,
    }

    Ok(())
}

impl From<IndexBackendArg> for commands::IndexBackend {
    fn from(b: IndexBackendArg) -> Self {
        match b {
            IndexBackendArg::Flat => commands::IndexBackend::Flat,
            IndexBackendArg::Hnsw => commands::IndexBackend::Hnsw,
        }
    }
}

impl From<MetricArg> for commands::Metric {
    fn from(m: MetricArg) -> Self {
        match m {
            MetricArg::Cosine => commands::Metric::Cosine,
            MetricArg::Dot => commands::Metric::Dot,
            MetricArg::L2 => commands::Metric::L2,
        }
    }
}
