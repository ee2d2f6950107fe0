use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Rgba, RgbaImage};

use crate::color::Color;
use crate::error::Result;

/// Export encodings for a rendered raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    /// No alpha channel; transparent pixels are flattened onto white.
    Jpeg,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Straight-alpha RGBA output of a render.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    image: RgbaImage,
}

impl RasterImage {
    pub fn new(image: RgbaImage) -> Self {
        RasterImage { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Color {
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        Color::rgba(r, g, b, a)
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    /// Composite onto opaque white.
    pub fn flatten(&self) -> RgbaImage {
        let mut out = self.image.clone();
        for px in out.pixels_mut() {
            let [r, g, b, a] = px.0;
            let blend = |c: u8| ((c as u32 * a as u32 + 255 * (255 - a as u32) + 127) / 255) as u8;
            *px = Rgba([blend(r), blend(g), blend(b), 255]);
        }
        out
    }

    /// Grayscale view as a scanner sees it (flattened onto white).
    pub fn to_luma(&self) -> GrayImage {
        DynamicImage::ImageRgba8(self.flatten()).to_luma8()
    }

    pub fn encode(&self, format: ExportFormat) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        match format {
            ExportFormat::Png => self.image.write_to(&mut buf, ImageFormat::Png)?,
            ExportFormat::Jpeg => DynamicImage::ImageRgba8(self.flatten())
                .to_rgb8()
                .write_to(&mut buf, ImageFormat::Jpeg)?,
        }
        Ok(buf.into_inner())
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        self.encode(ExportFormat::Png)
    }
}
