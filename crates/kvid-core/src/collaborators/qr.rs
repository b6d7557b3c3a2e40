//! Default QR generator/decoder collaborators, backed by the `qrcode` and
//! `rqrr` crates.

use image::Luma;
use qrcode::{EcLevel, QrCode, Version};

use crate::error::{Error, Result};

use super::{DecodedFrame, EccLevel, QrCapabilities, QrDecoder, QrGenerator, QrImage};

/// Version 40, ECC L, 8-bit byte mode data capacity — the widest QR
/// symbol this generator can produce.
const MAX_DATA_CAPACITY: usize = 2953;

/// Renders QR codes via the `qrcode` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct QrcodeGenerator;

impl QrcodeGenerator {
    /// Creates a new generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

fn ecc_to_level(ecc: EccLevel) -> EcLevel {
    match ecc {
        EccLevel::Low => EcLevel::L,
        EccLevel::Medium => EcLevel::M,
        EccLevel::Quartile => EcLevel::Q,
        EccLevel::High => EcLevel::H,
    }
}

impl QrGenerator for QrcodeGenerator {
    fn generate(&self, text: &str, version: Option<u8>, ecc: EccLevel) -> Result<QrImage> {
        let ec_level = ecc_to_level(ecc);
        let code = match version {
            Some(v) => QrCode::with_version(text.as_bytes(), Version::Normal(i16::from(v)), ec_level)
                .map_err(|e| Error::Collaborator(format!("QR encode failed: {e}")))?,
            None => QrCode::with_error_correction_level(text.as_bytes(), ec_level)
                .map_err(|e| Error::Collaborator(format!("QR encode failed: {e}")))?,
        };

        let image = code.render::<Luma<u8>>().build();
        let (width, height) = image.dimensions();
        Ok(QrImage {
            width,
            height,
            grayscale: image.into_raw(),
        })
    }

    fn capabilities(&self) -> QrCapabilities {
        QrCapabilities {
            max_data_capacity: MAX_DATA_CAPACITY,
            supported_versions: (1..=40).collect(),
            supported_ecc_levels: vec![EccLevel::Low, EccLevel::Medium, EccLevel::Quartile, EccLevel::High],
        }
    }
}

/// Decodes QR codes via the `rqrr` crate, a pure-Rust grid detector and
/// decoder operating on grayscale images.
#[derive(Debug, Default, Clone, Copy)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    /// Creates a new decoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl QrDecoder for RqrrDecoder {
    fn decode(&self, frame: &DecodedFrame) -> Result<String> {
        let gray = rgb_to_luma(frame);
        let mut prepared = rqrr::PreparedImage::prepare(gray);
        let grids = prepared.detect_grids();
        let grid = grids
            .into_iter()
            .next()
            .ok_or_else(|| Error::Collaborator("no QR grid detected in frame".into()))?;
        let (_meta, content) = grid
            .decode()
            .map_err(|e| Error::Collaborator(format!("QR decode failed: {e}")))?;
        Ok(content)
    }
}

fn rgb_to_luma(frame: &DecodedFrame) -> image::GrayImage {
    image::GrayImage::from_fn(frame.width, frame.height, |x, y| {
        let idx = ((y * frame.width + x) * 3) as usize;
        let r = u32::from(frame.rgb[idx]);
        let g = u32::from(frame.rgb[idx + 1]);
        let b = u32::from(frame.rgb[idx + 2]);
        let luma = (r * 299 + g * 587 + b * 114) / 1000;
        image::Luma([luma as u8])
    })
}
