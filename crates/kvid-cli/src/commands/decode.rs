//! `kvid decode`: read a container back into chunk text.

use std::path::Path;

use kvid_core::collaborators::qr::RqrrDecoder;
use kvid_core::collaborators::video::AutoContainerDecoder;
use kvid_core::pipeline::DecodeCoordinator;

/// Runs the `decode` subcommand.
pub fn run(input: &Path, frames: Option<&[u32]>) -> anyhow::Result<()> {
    let coordinator = DecodeCoordinator::new(Box::new(AutoContainerDecoder::new()), Box::new(RqrrDecoder::new()));
    let texts = coordinator.retrieve_frames(input, frames)?;

    for (i, text) in texts.iter().enumerate() {
        println!("--- chunk {i} ---");
        println!("{text}");
    }
    println!("\nrecovered {} chunk(s)", texts.len());

    Ok(())
}
