//! `kvid info`: show container metadata without decoding any frames.

use std::path::Path;

use kvid_core::collaborators::video::AutoContainerDecoder;
use kvid_core::collaborators::VideoDecoder;

/// Runs the `info` subcommand.
pub fn run(input: &Path) -> anyhow::Result<()> {
    let decoder = AutoContainerDecoder::new();
    let info = decoder.get_info(input)?;

    println!("kvid container: {}", input.display());
    println!("  frames:     {}", info.total_frames);
    println!("  dimensions: {}x{}", info.width, info.height);
    println!("  fps:        {}", info.fps);
    println!("  duration:   {:.2}s", info.duration_seconds);
    println!("  codec:      {}", info.codec);

    Ok(())
}
