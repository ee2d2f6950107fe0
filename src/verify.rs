//! Scan a rendered image back to text.

use image::GrayImage;

use crate::raster::RasterImage;

/// Decode with rqrr, falling back to rxing for finder shapes rqrr
/// cannot fit a grid to.
pub fn decode_gray(img: &GrayImage) -> Option<String> {
    decode_with_rqrr(img).or_else(|| decode_with_rxing(img))
}

fn decode_with_rqrr(img: &GrayImage) -> Option<String> {
    let mut prepared = rqrr::PreparedImage::prepare(img.clone());
    prepared
        .detect_grids()
        .into_iter()
        .find_map(|grid| grid.decode().ok().map(|(_meta, content)| content))
}

fn decode_with_rxing(img: &GrayImage) -> Option<String> {
    let (width, height) = img.dimensions();
    match rxing::helpers::detect_in_luma(
        img.as_raw().clone(),
        width,
        height,
        Some(rxing::BarcodeFormat::QR_CODE),
    ) {
        Ok(result) => {
            log::debug!("rxing decoded a {}x{} image", width, height);
            Some(result.getText().to_string())
        }
        Err(e) => {
            log::debug!("rxing found no code: {}", e);
            None
        }
    }
}

/// Decode an encoded image file (PNG, JPEG, ...).
pub fn decode_bytes(bytes: &[u8]) -> Result<Option<String>, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    Ok(decode_gray(&img.to_luma8()))
}

/// Whether `raster`, as a scanner would see it, decodes to exactly `payload`.
pub fn round_trips(raster: &RasterImage, payload: &str) -> bool {
    match decode_gray(&raster.to_luma()) {
        Some(content) if content == payload => true,
        Some(content) => {
            log::warn!("scan mismatch: decoded {:?}", content);
            false
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, RgbaImage};

    #[test]
    fn blank_image_has_no_code() {
        let img = GrayImage::from_pixel(64, 64, Luma([255]));
        assert_eq!(decode_gray(&img), None);
        let raster = RasterImage::new(RgbaImage::from_pixel(64, 64, Rgba([255, 255, 255, 255])));
        assert!(!round_trips(&raster, "anything"));
    }

    #[test]
    fn lobed_finders_fall_back_to_rxing() {
        let mut config = crate::StyleConfig::new("https://example.com/fallback");
        config.corners.style = crate::CornerStyle::Ninja;
        let rendered = crate::generate(&config, None).unwrap();
        let luma = rendered.image.to_luma();
        assert_eq!(
            decode_with_rxing(&luma).as_deref(),
            Some("https://example.com/fallback")
        );
        assert!(round_trips(&rendered.image, "https://example.com/fallback"));
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(decode_bytes(b"definitely not an image").is_err());
    }
}
