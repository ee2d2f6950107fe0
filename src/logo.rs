use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{ImageReader, Limits, Rgba, RgbaImage};
use std::io::Cursor;

use crate::color::Color;
use crate::config::LogoConfig;
use crate::error::DecodeError;

/// Decoded logo pixels (straight alpha).
pub type DecodedImage = RgbaImage;

/// Largest encoded logo accepted.
pub const MAX_LOGO_BYTES: usize = 512 * 1024;

/// Largest decoded logo side, in pixels.
pub const MAX_LOGO_DIMENSION: u32 = 4096;

/// Decode base64 logo data, with or without a data URI prefix
/// ("data:image/png;base64,...").
pub fn decode_logo_base64(input: &str) -> Result<Vec<u8>, DecodeError> {
    let b64 = match input.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => input,
    };
    let bytes = BASE64
        .decode(b64.trim())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;
    if bytes.len() > MAX_LOGO_BYTES {
        return Err(DecodeError::TooLarge(bytes.len()));
    }
    Ok(bytes)
}

/// Decode image bytes, refusing anything wider or taller than
/// [`MAX_LOGO_DIMENSION`] before its pixels are allocated.
pub fn decode_logo_bytes(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_LOGO_DIMENSION);
    limits.max_image_height = Some(MAX_LOGO_DIMENSION);

    let mut reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::UnsupportedImage(e.to_string()))?;
    reader.limits(limits);
    let img = reader
        .decode()
        .map_err(|e| DecodeError::UnsupportedImage(e.to_string()))?;
    if img.width() == 0 || img.height() == 0 {
        return Err(DecodeError::UnsupportedImage("image has no pixels".to_string()));
    }
    Ok(img.to_rgba8())
}

pub fn decode_logo(reference: &str) -> Result<DecodedImage, DecodeError> {
    decode_logo_bytes(&decode_logo_base64(reference)?)
}

/// Resolve the configured logo. Any failure means "no logo": the render goes
/// ahead without one.
pub fn load_logo(config: &LogoConfig) -> Option<DecodedImage> {
    let reference = config.image.as_deref()?;
    match decode_logo(reference) {
        Ok(img) => Some(img),
        Err(e) => {
            log::warn!("ignoring logo: {}", e);
            None
        }
    }
}

/// Largest `(width, height)` with the image's aspect ratio that fits in a
/// square of side `area`.
pub fn fit_inside(width: u32, height: u32, area: f32) -> (f32, f32) {
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }
    let aspect = width as f32 / height as f32;
    if aspect > 1.0 {
        (area, area / aspect)
    } else {
        (area * aspect, area)
    }
}

/// Same alpha, every pixel painted `color`.
pub fn silhouette(image: &DecodedImage, color: Color) -> DecodedImage {
    let mut out = image.clone();
    for px in out.pixels_mut() {
        let alpha = (px.0[3] as u32 * color.a as u32 / 255) as u8;
        *px = Rgba([color.r, color.g, color.b, alpha]);
    }
    out
}
