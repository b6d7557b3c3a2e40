//! `kvid encode`: chunk a text file and encode it into a QR-coded video.

use std::path::PathBuf;

use kvid_core::chunker::ChunkerConfig;
use kvid_core::collaborators::qr::QrcodeGenerator;
use kvid_core::collaborators::video::{FfmpegEncoder, NativeContainerEncoder};
use kvid_core::collaborators::EccLevel;
use kvid_core::pipeline::{BuildParams, EncodeCoordinator};

/// Parsed arguments for the `encode` subcommand.
pub struct EncodeArgs {
    /// Source text file.
    pub input: PathBuf,
    /// Destination container path.
    pub output: PathBuf,
    /// Output frame width.
    pub width: u32,
    /// Output frame height.
    pub height: u32,
    /// Output frames per second.
    pub fps: u32,
    /// QR error-correction level.
    pub ecc: EccLevel,
    /// Characters per chunk.
    pub chunk_size: usize,
    /// Characters of overlap between consecutive chunks.
    pub overlap: usize,
    /// Use the `ffmpeg` subprocess encoder instead of the native container.
    pub ffmpeg: bool,
}

/// Runs the `encode` subcommand.
pub fn run(args: EncodeArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.input)?;

    let chunker_config = ChunkerConfig::new(args.chunk_size, args.overlap, true);
    let mut coordinator = if args.ffmpeg {
        EncodeCoordinator::new(chunker_config, Box::new(QrcodeGenerator::new()), Box::new(FfmpegEncoder::new()))
    } else {
        EncodeCoordinator::new(
            chunker_config,
            Box::new(QrcodeGenerator::new()),
            Box::new(NativeContainerEncoder::new()),
        )
    };

    coordinator.add_message(&text);
    let chunk_count = coordinator.buffer_len();

    let stats = coordinator.build_video(
        &args.output,
        BuildParams {
            width: args.width,
            height: args.height,
            fps: args.fps,
            ecc: args.ecc,
            version: None,
        },
    )?;

    println!("Encoded {chunk_count} chunks into {}", args.output.display());
    println!("  frames:          {}", stats.total_frames);
    println!("  file size:       {} bytes", stats.file_size);
    println!("  duration:        {:.2}s", stats.duration_seconds);
    println!("  codec:           {}", stats.codec);
    println!("  encoding time:   {} ms", stats.encoding_time_ms);

    Ok(())
}
