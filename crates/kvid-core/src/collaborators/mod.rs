//! External collaborator contracts (§6.1): QR generation/decoding and
//! video encoding/decoding. The core only depends on these traits — the
//! concrete implementations in [`qr`] and [`video`] are real, working
//! defaults, not the contract itself.

pub mod qr;
pub mod video;

use crate::error::Result;

/// Error-correction level for QR generation, from lowest to highest
/// redundancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EccLevel {
    /// ~7% of codewords can be restored.
    Low,
    /// ~15% of codewords can be restored.
    Medium,
    /// ~25% of codewords can be restored.
    Quartile,
    /// ~30% of codewords can be restored.
    High,
}

/// A generated QR code rendered as a grayscale pixel grid, one byte per
/// module pixel: `0` is dark, `255` is light.
#[derive(Debug, Clone)]
pub struct QrImage {
    /// Pixel width.
    pub width: u32,
    /// Pixel height.
    pub height: u32,
    /// Row-major grayscale pixels, `width * height` bytes.
    pub grayscale: Vec<u8>,
}

/// What a QR generator implementation supports.
#[derive(Debug, Clone)]
pub struct QrCapabilities {
    /// Maximum bytes of input data a single QR symbol can carry.
    pub max_data_capacity: usize,
    /// QR versions (1-40) this generator can produce.
    pub supported_versions: Vec<u8>,
    /// Error-correction levels this generator can produce.
    pub supported_ecc_levels: Vec<EccLevel>,
}

/// Produces QR code images from text.
pub trait QrGenerator: Send + Sync {
    /// Renders `text` as a QR code. `version` selects a specific QR
    /// version (1-40); `None` lets the generator pick the smallest version
    /// that fits.
    fn generate(&self, text: &str, version: Option<u8>, ecc: EccLevel) -> Result<QrImage>;

    /// This generator's capabilities.
    fn capabilities(&self) -> QrCapabilities;
}

/// Decodes QR code images back to text.
pub trait QrDecoder: Send + Sync {
    /// Decodes a single video frame's QR payload.
    fn decode(&self, frame: &DecodedFrame) -> Result<String>;

    /// Decodes a batch of frames, preserving per-frame success/failure
    /// independently (one frame's decode error never fails the batch).
    fn decode_batch(&self, frames: &[DecodedFrame]) -> Vec<Result<String>> {
        frames.iter().map(|f| self.decode(f)).collect()
    }
}

/// Parameters used to initialize a video encoder.
#[derive(Debug, Clone, Copy)]
pub struct VideoEncoderParams {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: u32,
}

/// Statistics reported once a video build finalizes.
#[derive(Debug, Clone)]
pub struct VideoStats {
    /// Total frames written.
    pub total_frames: u32,
    /// Size of the produced file, in bytes.
    pub file_size: u64,
    /// Nominal duration of the produced video.
    pub duration_seconds: f64,
    /// Average bitrate in bits/second.
    pub average_bitrate: f64,
    /// Codec identifier used.
    pub codec: String,
    /// Wall-clock time spent encoding, in milliseconds.
    pub encoding_time_ms: u64,
}

/// Drives frames into a video container. Frames are presumed delivered in
/// strictly increasing `frame_number` starting at 0.
pub trait VideoEncoder {
    /// Initializes the encoder for a new build. Must be called before any
    /// [`VideoEncoder::add_frame`] call.
    fn init(&mut self, params: VideoEncoderParams) -> Result<()>;

    /// Pushes one RGB frame (`width * height * 3` bytes, row-major).
    fn add_frame(&mut self, rgb: &[u8], frame_number: u32) -> Result<()>;

    /// Finalizes the build, writing the container to `path` and returning
    /// statistics about the encode.
    fn finalize(&mut self, path: &std::path::Path) -> Result<VideoStats>;

    /// Aborts an in-progress build. Must be infallible in practice — any
    /// failure to clean up partial state is swallowed, never propagated —
    /// so cancellation can never itself fail the caller's cleanup path.
    fn cancel(&mut self);
}

/// Metadata about a video container, without decoding any frames.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    /// Total frame count.
    pub total_frames: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second.
    pub fps: u32,
    /// Duration in seconds.
    pub duration_seconds: f64,
    /// Codec identifier.
    pub codec: String,
}

/// One decoded video frame.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// The frame's position in the container.
    pub number: u32,
    /// Row-major RGB pixels (`width * height * 3` bytes).
    pub rgb: Vec<u8>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

/// Reads frames back out of a video container.
pub trait VideoDecoder {
    /// Reads container-level metadata without decoding frame payloads.
    fn get_info(&self, path: &std::path::Path) -> Result<VideoInfo>;

    /// Extracts the requested frames (all frames if `indices` is `None`).
    fn extract_frames(&self, path: &std::path::Path, indices: Option<&[u32]>) -> Result<Vec<DecodedFrame>>;
}
