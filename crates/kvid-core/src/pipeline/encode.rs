//! Encode coordinator: buffers chunks and drives the QR + video encoder
//! pipeline that turns them into a container (§4.4).

use std::path::Path;
use std::time::Instant;

use crate::chunk::Chunk;
use crate::chunker::{Chunker, ChunkerConfig};
use crate::collaborators::{EccLevel, QrGenerator, VideoEncoder, VideoEncoderParams, VideoStats};
use crate::error::{Error, Result};

/// Parameters for a single `buildVideo` call.
#[derive(Debug, Clone, Copy)]
pub struct BuildParams {
    /// Output frame width in pixels.
    pub width: u32,
    /// Output frame height in pixels.
    pub height: u32,
    /// Output frames per second.
    pub fps: u32,
    /// Error-correction level to request from the QR generator.
    pub ecc: EccLevel,
    /// Specific QR version to request, or `None` to let the generator pick.
    pub version: Option<u8>,
}

/// The coordinator's externally observable state, derived from its buffer
/// and busy flag (§9: "idle -> buffered -> building -> idle").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// No buffered chunks, not building.
    Idle,
    /// One or more buffered chunks, not building.
    Buffered,
    /// A `buildVideo` call is in progress.
    Building,
}

/// Buffers chunked text and drives QR rendering + video encoding into a
/// container. Holds a chunk buffer and a busy flag, per the component
/// design; `state()` derives the idle/buffered/building view from them.
pub struct EncodeCoordinator {
    chunker: Chunker,
    qr_generator: Box<dyn QrGenerator>,
    video_encoder: Box<dyn VideoEncoder>,
    buffer: Vec<Chunk>,
    busy: bool,
    last_stats: Option<VideoStats>,
}

impl EncodeCoordinator {
    /// Creates a coordinator with the given chunker configuration and
    /// collaborators.
    #[must_use]
    pub fn new(
        chunker_config: ChunkerConfig,
        qr_generator: Box<dyn QrGenerator>,
        video_encoder: Box<dyn VideoEncoder>,
    ) -> Self {
        Self {
            chunker: Chunker::new(chunker_config),
            qr_generator,
            video_encoder,
            buffer: Vec::new(),
            busy: false,
            last_stats: None,
        }
    }

    /// The coordinator's current state.
    #[must_use]
    pub fn state(&self) -> CoordinatorState {
        if self.busy {
            CoordinatorState::Building
        } else if self.buffer.is_empty() {
            CoordinatorState::Idle
        } else {
            CoordinatorState::Buffered
        }
    }

    /// Chunks `text` and appends the result to the buffer.
    pub fn add_message(&mut self, text: &str) {
        let parent_index = self.buffer.last().and_then(|c| c.parent_index).map_or(0, |i| i + 1);
        self.buffer.extend(self.chunker.chunk_with_parent(text, Some(parent_index)));
    }

    /// Number of chunks currently buffered.
    #[must_use]
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Statistics from the most recent successful `build_video` call.
    #[must_use]
    pub fn stats(&self) -> Option<&VideoStats> {
        self.last_stats.as_ref()
    }

    /// Resets the coordinator to idle: empties the buffer and forgets the
    /// last build's statistics.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.last_stats = None;
    }

    /// Atomically builds a video from the buffered chunks. Validates
    /// preconditions (non-empty buffer, not already building, every
    /// chunk's content within the QR generator's capacity, the requested
    /// ECC level supported) before touching the encoder, so a rejected
    /// build never mutates output. On failure after the encoder has been
    /// initialized, the encoder is canceled and the buffer is preserved so
    /// the caller can retry.
    pub fn build_video(&mut self, path: &Path, params: BuildParams) -> Result<VideoStats> {
        if self.busy {
            return Err(Error::InvalidState("encoder is already building".into()));
        }
        if self.buffer.is_empty() {
            return Err(Error::InvalidArgument("chunk buffer is empty".into()));
        }

        let caps = self.qr_generator.capabilities();
        if !caps.supported_ecc_levels.contains(&params.ecc) {
            return Err(Error::UnsupportedEcc(format!("{:?}", params.ecc)));
        }
        for chunk in &self.buffer {
            if chunk.content.len() > caps.max_data_capacity {
                return Err(Error::ChunkExceedsCapacity {
                    actual: chunk.content.len(),
                    max: caps.max_data_capacity,
                });
            }
        }

        self.busy = true;
        let started = Instant::now();
        let result = self.build_video_inner(path, &params);
        self.busy = false;

        match result {
            Ok(mut stats) => {
                stats.encoding_time_ms = started.elapsed().as_millis() as u64;
                self.last_stats = Some(stats.clone());
                Ok(stats)
            }
            Err(err) => {
                self.video_encoder.cancel();
                Err(err)
            }
        }
    }

    fn build_video_inner(&mut self, path: &Path, params: &BuildParams) -> Result<VideoStats> {
        self.video_encoder.init(VideoEncoderParams {
            width: params.width,
            height: params.height,
            fps: params.fps,
        })?;

        for (i, chunk) in self.buffer.iter().enumerate() {
            let qr = self.qr_generator.generate(&chunk.content, params.version, params.ecc)?;
            let scaled = scale_nearest_neighbor(&qr.grayscale, qr.width, qr.height, params.width, params.height);
            let rgb = grayscale_to_rgb(&scaled);
            self.video_encoder.add_frame(&rgb, i as u32)?;
        }

        self.video_encoder.finalize(path)
    }
}

/// Nearest-neighbor scales a grayscale image to `(dst_w, dst_h)`,
/// independently on each axis.
fn scale_nearest_neighbor(src: &[u8], src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> Vec<u8> {
    let mut out = vec![0u8; (dst_w * dst_h) as usize];
    for y in 0..dst_h {
        let src_y = (u64::from(y) * u64::from(src_h) / u64::from(dst_h)).min(u64::from(src_h.saturating_sub(1))) as u32;
        for x in 0..dst_w {
            let src_x =
                (u64::from(x) * u64::from(src_w) / u64::from(dst_w)).min(u64::from(src_w.saturating_sub(1))) as u32;
            out[(y * dst_w + x) as usize] = src[(src_y * src_w + src_x) as usize];
        }
    }
    out
}

fn grayscale_to_rgb(gray: &[u8]) -> Vec<u8> {
    gray.iter().flat_map(|&p| [p, p, p]).collect()
}

#[cfg(test)]
mod encode_tests;
