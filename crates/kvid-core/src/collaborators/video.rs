//! Default video encoder/decoder collaborators.
//!
//! Two concrete encoders are shipped: [`NativeContainerEncoder`], a
//! zero-external-dependency fallback that writes the `KVID` framed binary
//! container described in §6.3, and [`FfmpegEncoder`], which shells out to
//! an installed `ffmpeg` binary to produce a real MP4. [`NativeContainerDecoder`]
//! reads the former; both encoders' output can be told apart by the file's
//! first four bytes, so [`AutoContainerDecoder`] picks the right reader.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Instant;

use crate::error::{Error, Result};

use super::{DecodedFrame, VideoDecoder, VideoEncoder, VideoEncoderParams, VideoInfo, VideoStats};

const MAGIC: &[u8; 4] = b"KVID";
const FORMAT_VERSION: u8 = 1;
const CODEC_NATIVE_RGB24: u8 = 0;
const PIXEL_FORMAT_RGB24: u8 = 0;
const HEADER_LEN: usize = 4 + 1 + 1 + 1 + 1 + 4 + 4 + 4 + 4;

enum NativeState {
    Idle,
    Building {
        params: VideoEncoderParams,
        frames: Vec<u8>,
        frame_count: u32,
        next_frame: u32,
        started: Instant,
    },
}

/// Writes the §6.3 fallback `KVID` framed container directly, with no
/// external codec dependency. Frames are buffered in memory until
/// `finalize` writes the whole container atomically.
pub struct NativeContainerEncoder {
    state: NativeState,
}

impl Default for NativeContainerEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NativeContainerEncoder {
    /// Creates an idle encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: NativeState::Idle,
        }
    }
}

impl VideoEncoder for NativeContainerEncoder {
    fn init(&mut self, params: VideoEncoderParams) -> Result<()> {
        if matches!(self.state, NativeState::Building { .. }) {
            return Err(Error::InvalidState("encoder is already building".into()));
        }
        self.state = NativeState::Building {
            params,
            frames: Vec::new(),
            frame_count: 0,
            next_frame: 0,
            started: Instant::now(),
        };
        Ok(())
    }

    fn add_frame(&mut self, rgb: &[u8], frame_number: u32) -> Result<()> {
        let NativeState::Building {
            params,
            frames,
            frame_count,
            next_frame,
            ..
        } = &mut self.state
        else {
            return Err(Error::InvalidState("addFrame called before init".into()));
        };

        if frame_number != *next_frame {
            return Err(Error::InvalidArgument(format!(
                "frames must be added in strictly increasing order: expected {next_frame}, got {frame_number}"
            )));
        }
        let expected_len = (params.width * params.height * 3) as usize;
        if rgb.len() != expected_len {
            return Err(Error::InvalidArgument(format!(
                "frame {frame_number} has {} bytes, expected {expected_len}",
                rgb.len()
            )));
        }

        let timestamp_ms = if params.fps > 0 {
            u64::from(frame_number) * 1000 / u64::from(params.fps)
        } else {
            0
        };

        frames.extend_from_slice(&frame_number.to_be_bytes());
        frames.extend_from_slice(&timestamp_ms.to_be_bytes());
        frames.extend_from_slice(&(rgb.len() as u32).to_be_bytes());
        frames.extend_from_slice(rgb);

        *frame_count += 1;
        *next_frame += 1;
        Ok(())
    }

    fn finalize(&mut self, path: &Path) -> Result<VideoStats> {
        let NativeState::Building {
            params,
            frames,
            frame_count,
            started,
            ..
        } = std::mem::replace(&mut self.state, NativeState::Idle)
        else {
            return Err(Error::InvalidState("finalize called before init".into()));
        };

        let mut out = Vec::with_capacity(HEADER_LEN + frames.len());
        out.extend_from_slice(MAGIC);
        out.push(FORMAT_VERSION);
        out.push(CODEC_NATIVE_RGB24);
        out.push(PIXEL_FORMAT_RGB24);
        out.push(0); // reserved
        out.extend_from_slice(&params.width.to_be_bytes());
        out.extend_from_slice(&params.height.to_be_bytes());
        out.extend_from_slice(&params.fps.to_be_bytes());
        out.extend_from_slice(&frame_count.to_be_bytes());
        out.extend_from_slice(&frames);

        let tmp_path = path.with_extension("tmp");
        {
            let mut f = fs::File::create(&tmp_path)?;
            f.write_all(&out)?;
            f.sync_all()?;
        }
        fs::rename(&tmp_path, path)?;

        let file_size = out.len() as u64;
        let duration_seconds = if params.fps > 0 {
            f64::from(frame_count) / f64::from(params.fps)
        } else {
            0.0
        };
        let average_bitrate = if duration_seconds > 0.0 {
            (file_size as f64 * 8.0) / duration_seconds
        } else {
            0.0
        };

        Ok(VideoStats {
            total_frames: frame_count,
            file_size,
            duration_seconds,
            average_bitrate,
            codec: "kvid-native-rgb24".to_string(),
            encoding_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn cancel(&mut self) {
        self.state = NativeState::Idle;
    }
}

/// Reads the `KVID` framed container written by [`NativeContainerEncoder`].
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeContainerDecoder;

impl NativeContainerDecoder {
    /// Creates a new decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

struct NativeHeader {
    width: u32,
    height: u32,
    fps: u32,
    frame_count: u32,
}

fn read_header(buf: &[u8]) -> Result<NativeHeader> {
    if buf.len() < HEADER_LEN || &buf[0..4] != MAGIC {
        return Err(Error::CorruptData("not a KVID container (bad magic)".into()));
    }
    let width = u32::from_be_bytes(buf[8..12].try_into().unwrap());
    let height = u32::from_be_bytes(buf[12..16].try_into().unwrap());
    let fps = u32::from_be_bytes(buf[16..20].try_into().unwrap());
    let frame_count = u32::from_be_bytes(buf[20..24].try_into().unwrap());
    Ok(NativeHeader {
        width,
        height,
        fps,
        frame_count,
    })
}

impl VideoDecoder for NativeContainerDecoder {
    fn get_info(&self, path: &Path) -> Result<VideoInfo> {
        let buf = fs::read(path)?;
        let header = read_header(&buf)?;
        let duration_seconds = if header.fps > 0 {
            f64::from(header.frame_count) / f64::from(header.fps)
        } else {
            0.0
        };
        Ok(VideoInfo {
            total_frames: header.frame_count,
            width: header.width,
            height: header.height,
            fps: header.fps,
            duration_seconds,
            codec: "kvid-native-rgb24".to_string(),
        })
    }

    fn extract_frames(&self, path: &Path, indices: Option<&[u32]>) -> Result<Vec<DecodedFrame>> {
        let buf = fs::read(path)?;
        let header = read_header(&buf)?;

        let mut out = Vec::new();
        let mut offset = HEADER_LEN;
        for _ in 0..header.frame_count {
            if offset + 4 + 8 + 4 > buf.len() {
                return Err(Error::CorruptData("truncated frame record".into()));
            }
            let frame_number = u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap());
            offset += 4;
            offset += 8; // timestamp, unused on read
            let payload_size =
                u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap()) as usize;
            offset += 4;
            if offset + payload_size > buf.len() {
                return Err(Error::CorruptData("frame payload runs past end of file".into()));
            }
            let payload = buf[offset..offset + payload_size].to_vec();
            offset += payload_size;

            let wanted = indices.is_none_or(|want| want.contains(&frame_number));
            if wanted {
                out.push(DecodedFrame {
                    number: frame_number,
                    rgb: payload,
                    width: header.width,
                    height: header.height,
                });
            }
        }
        Ok(out)
    }
}

enum FfmpegState {
    Idle,
    Building {
        params: VideoEncoderParams,
        raw_path: PathBuf,
        raw_file: fs::File,
        frame_count: u32,
        next_frame: u32,
        started: Instant,
    },
}

/// Shells out to an installed `ffmpeg` binary to encode a real MP4.
/// Frames are buffered to a raw scratch file during the build and piped
/// into `ffmpeg` in one shot at `finalize`, matching the way the buffered
/// build then single final step happens for [`NativeContainerEncoder`].
pub struct FfmpegEncoder {
    ffmpeg_path: String,
    state: FfmpegState,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegEncoder {
    /// Creates an encoder that invokes `ffmpeg` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            state: FfmpegState::Idle,
        }
    }

    /// Creates an encoder that invokes a specific `ffmpeg` binary path.
    #[must_use]
    pub fn with_binary(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            state: FfmpegState::Idle,
        }
    }

    fn cleanup_raw_file(raw_path: &Path) {
        let _ = fs::remove_file(raw_path);
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn init(&mut self, params: VideoEncoderParams) -> Result<()> {
        if matches!(self.state, FfmpegState::Building { .. }) {
            return Err(Error::InvalidState("encoder is already building".into()));
        }
        let raw_path = std::env::temp_dir().join(format!("kvid-ffmpeg-{}.rgb24", std::process::id()));
        let raw_file = fs::File::create(&raw_path)?;
        self.state = FfmpegState::Building {
            params,
            raw_path,
            raw_file,
            frame_count: 0,
            next_frame: 0,
            started: Instant::now(),
        };
        Ok(())
    }

    fn add_frame(&mut self, rgb: &[u8], frame_number: u32) -> Result<()> {
        let FfmpegState::Building {
            params,
            raw_file,
            frame_count,
            next_frame,
            ..
        } = &mut self.state
        else {
            return Err(Error::InvalidState("addFrame called before init".into()));
        };

        if frame_number != *next_frame {
            return Err(Error::InvalidArgument(format!(
                "frames must be added in strictly increasing order: expected {next_frame}, got {frame_number}"
            )));
        }
        let expected_len = (params.width * params.height * 3) as usize;
        if rgb.len() != expected_len {
            return Err(Error::InvalidArgument(format!(
                "frame {frame_number} has {} bytes, expected {expected_len}",
                rgb.len()
            )));
        }

        raw_file.write_all(rgb)?;
        *frame_count += 1;
        *next_frame += 1;
        Ok(())
    }

    fn finalize(&mut self, path: &Path) -> Result<VideoStats> {
        let FfmpegState::Building {
            params,
            raw_path,
            raw_file,
            frame_count,
            started,
            ..
        } = std::mem::replace(&mut self.state, FfmpegState::Idle)
        else {
            return Err(Error::InvalidState("finalize called before init".into()));
        };
        raw_file.sync_all()?;
        drop(raw_file);

        let output = Command::new(&self.ffmpeg_path)
            .args(["-y", "-f", "rawvideo", "-pixel_format", "rgb24"])
            .args(["-video_size", &format!("{}x{}", params.width, params.height)])
            .args(["-framerate", &params.fps.to_string()])
            .arg("-i")
            .arg(&raw_path)
            .args(["-pix_fmt", "yuv420p"])
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        let output = match output {
            Ok(o) => o,
            Err(e) => {
                Self::cleanup_raw_file(&raw_path);
                return Err(Error::Resource(format!("failed to launch ffmpeg: {e}")));
            }
        };
        Self::cleanup_raw_file(&raw_path);

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Collaborator(format!("ffmpeg exited with {}: {stderr}", output.status)));
        }

        let file_size = fs::metadata(path)?.len();
        let duration_seconds = if params.fps > 0 {
            f64::from(frame_count) / f64::from(params.fps)
        } else {
            0.0
        };
        let average_bitrate = if duration_seconds > 0.0 {
            (file_size as f64 * 8.0) / duration_seconds
        } else {
            0.0
        };

        Ok(VideoStats {
            total_frames: frame_count,
            file_size,
            duration_seconds,
            average_bitrate,
            codec: "h264".to_string(),
            encoding_time_ms: started.elapsed().as_millis() as u64,
        })
    }

    fn cancel(&mut self) {
        if let FfmpegState::Building { raw_path, .. } = &self.state {
            Self::cleanup_raw_file(raw_path);
        }
        self.state = FfmpegState::Idle;
    }
}

/// Reads containers produced by [`FfmpegEncoder`] (or any ffmpeg-readable
/// container) by shelling out to `ffprobe`/`ffmpeg`.
pub struct FfmpegDecoder {
    ffprobe_path: String,
    ffmpeg_path: String,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegDecoder {
    /// Creates a decoder that invokes `ffprobe`/`ffmpeg` from `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ffprobe_path: "ffprobe".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
        }
    }

    fn run_ffprobe(&self, path: &Path) -> Result<String> {
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path)
            .output()
            .map_err(|e| Error::Resource(format!("failed to launch ffprobe: {e}")))?;
        if !output.status.success() {
            return Err(Error::Resource(format!("ffprobe exited with {}", output.status)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn json_u32(json: &str, key: &str) -> Option<u32> {
        let needle = format!("\"{key}\"");
        let idx = json.find(&needle)?;
        let rest = &json[idx + needle.len()..];
        let colon = rest.find(':')?;
        let rest = rest[colon + 1..].trim_start();
        let rest = rest.trim_start_matches('"');
        let end = rest.find(|c: char| !(c.is_ascii_digit())).unwrap_or(rest.len());
        rest[..end].parse().ok()
    }
}

impl VideoDecoder for FfmpegDecoder {
    fn get_info(&self, path: &Path) -> Result<VideoInfo> {
        let json = self.run_ffprobe(path)?;
        let width = Self::json_u32(&json, "width").unwrap_or(0);
        let height = Self::json_u32(&json, "height").unwrap_or(0);
        let fps = Self::json_u32(&json, "r_frame_rate").unwrap_or(30);
        let total_frames = Self::json_u32(&json, "nb_frames").unwrap_or(0);
        let duration_seconds = if fps > 0 {
            f64::from(total_frames) / f64::from(fps)
        } else {
            0.0
        };
        Ok(VideoInfo {
            total_frames,
            width,
            height,
            fps,
            duration_seconds,
            codec: "h264".to_string(),
        })
    }

    fn extract_frames(&self, path: &Path, indices: Option<&[u32]>) -> Result<Vec<DecodedFrame>> {
        let info = self.get_info(path)?;
        let output = Command::new(&self.ffmpeg_path)
            .args(["-v", "quiet", "-i"])
            .arg(path)
            .args(["-f", "rawvideo", "-pix_fmt", "rgb24", "-"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| Error::Resource(format!("failed to launch ffmpeg: {e}")))?;
        if !output.status.success() {
            return Err(Error::Collaborator(format!("ffmpeg exited with {}", output.status)));
        }

        let frame_len = (info.width * info.height * 3) as usize;
        if frame_len == 0 {
            return Err(Error::Collaborator("could not determine frame dimensions".into()));
        }

        let mut out = Vec::new();
        for (number, chunk) in output.stdout.chunks(frame_len).enumerate() {
            if chunk.len() != frame_len {
                break; // trailing partial chunk, not a full frame
            }
            let number = number as u32;
            let wanted = indices.is_none_or(|want| want.contains(&number));
            if wanted {
                out.push(DecodedFrame {
                    number,
                    rgb: chunk.to_vec(),
                    width: info.width,
                    height: info.height,
                });
            }
        }
        Ok(out)
    }
}

/// Dispatches to [`NativeContainerDecoder`] or [`FfmpegDecoder`] based on
/// the file's first four bytes, so the decode coordinator can accept
/// either backend's output transparently.
#[derive(Default)]
pub struct AutoContainerDecoder {
    native: NativeContainerDecoder,
    ffmpeg: FfmpegDecoder,
}

impl AutoContainerDecoder {
    /// Creates a decoder that recognizes both shipped container backends.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn is_native_container(path: &Path) -> bool {
        fs::read(path)
            .map(|buf| buf.len() >= 4 && &buf[0..4] == MAGIC)
            .unwrap_or(false)
    }
}

impl VideoDecoder for AutoContainerDecoder {
    fn get_info(&self, path: &Path) -> Result<VideoInfo> {
        if Self::is_native_container(path) {
            self.native.get_info(path)
        } else {
            self.ffmpeg.get_info(path)
        }
    }

    fn extract_frames(&self, path: &Path, indices: Option<&[u32]>) -> Result<Vec<DecodedFrame>> {
        if Self::is_native_container(path) {
            self.native.extract_frames(path, indices)
        } else {
            self.ffmpeg.extract_frames(path, indices)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn frame(width: u32, height: u32, fill: u8) -> Vec<u8> {
        vec![fill; (width * height * 3) as usize]
    }

    #[test]
    fn native_encoder_round_trips_frames() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.kvid");

        let mut encoder = NativeContainerEncoder::new();
        encoder
            .init(VideoEncoderParams {
                width: 4,
                height: 4,
                fps: 30,
            })
            .unwrap();
        encoder.add_frame(&frame(4, 4, 0), 0).unwrap();
        encoder.add_frame(&frame(4, 4, 255), 1).unwrap();
        let stats = encoder.finalize(&path).unwrap();
        assert_eq!(stats.total_frames, 2);

        let decoder = NativeContainerDecoder::new();
        let info = decoder.get_info(&path).unwrap();
        assert_eq!(info.total_frames, 2);
        assert_eq!(info.width, 4);

        let frames = decoder.extract_frames(&path, None).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].number, 0);
        assert_eq!(frames[1].rgb[0], 255);
    }

    #[test]
    fn native_encoder_rejects_out_of_order_frames() {
        let mut encoder = NativeContainerEncoder::new();
        encoder
            .init(VideoEncoderParams {
                width: 2,
                height: 2,
                fps: 10,
            })
            .unwrap();
        let err = encoder.add_frame(&frame(2, 2, 0), 1).unwrap_err();
        assert_eq!(err.code(), "KVID-002");
    }

    #[test]
    fn native_encoder_rejects_double_init() {
        let mut encoder = NativeContainerEncoder::new();
        let params = VideoEncoderParams {
            width: 2,
            height: 2,
            fps: 10,
        };
        encoder.init(params).unwrap();
        let err = encoder.init(params).unwrap_err();
        assert_eq!(err.code(), "KVID-003");
    }

    #[test]
    fn cancel_discards_buffered_frames_without_writing_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never.kvid");

        let mut encoder = NativeContainerEncoder::new();
        encoder
            .init(VideoEncoderParams {
                width: 2,
                height: 2,
                fps: 10,
            })
            .unwrap();
        encoder.add_frame(&frame(2, 2, 1), 0).unwrap();
        encoder.cancel();

        assert!(!path.exists());
        // encoder is idle again and can start a fresh build
        encoder
            .init(VideoEncoderParams {
                width: 2,
                height: 2,
                fps: 10,
            })
            .unwrap();
    }

    #[test]
    fn extract_frames_filters_by_requested_indices() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.kvid");

        let mut encoder = NativeContainerEncoder::new();
        encoder
            .init(VideoEncoderParams {
                width: 2,
                height: 2,
                fps: 5,
            })
            .unwrap();
        for i in 0..3u32 {
            encoder.add_frame(&frame(2, 2, i as u8), i).unwrap();
        }
        encoder.finalize(&path).unwrap();

        let decoder = NativeContainerDecoder::new();
        let frames = decoder.extract_frames(&path, Some(&[0, 2])).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].number, 0);
        assert_eq!(frames[1].number, 2);
    }
}
