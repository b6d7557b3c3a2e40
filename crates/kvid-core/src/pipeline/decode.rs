//! Decode coordinator: reverses the encode pipeline with best-effort
//! per-frame recovery (§4.5).

use std::path::Path;

use crate::collaborators::{QrDecoder, VideoDecoder};
use crate::error::Result;

/// Reads a container back into decoded chunk text. Per-frame QR decode
/// failures are dropped silently; failures to read the container itself
/// (missing file, no video track) surface to the caller.
pub struct DecodeCoordinator {
    video_decoder: Box<dyn VideoDecoder>,
    qr_decoder: Box<dyn QrDecoder>,
}

impl DecodeCoordinator {
    /// Creates a coordinator over the given collaborators.
    #[must_use]
    pub fn new(video_decoder: Box<dyn VideoDecoder>, qr_decoder: Box<dyn QrDecoder>) -> Self {
        Self {
            video_decoder,
            qr_decoder,
        }
    }

    /// Retrieves every frame's decoded text, in the order frames were
    /// successfully decoded.
    pub fn retrieve(&self, path: &Path) -> Result<Vec<String>> {
        self.retrieve_frames(path, None)
    }

    /// Retrieves only the requested frames' decoded text (all frames if
    /// `frame_indices` is `None`).
    pub fn retrieve_frames(&self, path: &Path, frame_indices: Option<&[u32]>) -> Result<Vec<String>> {
        tracing::debug!(path = %path.display(), "retrieving frames from container");
        let frames = self.video_decoder.extract_frames(path, frame_indices)?;

        let mut out = Vec::with_capacity(frames.len());
        for frame in &frames {
            match self.qr_decoder.decode(frame) {
                Ok(text) => out.push(text),
                Err(err) => {
                    tracing::warn!(frame = frame.number, error = %err, "dropping frame that failed to decode");
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod decode_tests;
