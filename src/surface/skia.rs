use image::{imageops, GrayImage, RgbaImage};
use tiny_skia::{
    BlendMode, ColorU8, FillRule, FilterQuality, IntSize, Mask, Paint, Path, PathBuilder, Pixmap,
    PixmapPaint, Rect, Transform,
};

use super::{DestRect, PathSink, Surface};
use crate::color::Color;
use crate::error::{RenderError, Result};
use crate::raster::RasterImage;

/// Translation and clip in effect; pushed by `save`.
#[derive(Clone, Default)]
struct State {
    offset: (f32, f32),
    clip: Option<Mask>,
}

/// Anti-aliased raster surface backed by a tiny-skia `Pixmap`.
pub struct SkiaSurface {
    pixmap: Pixmap,
    path: PathBuilder,
    state: State,
    stack: Vec<State>,
}

impl SkiaSurface {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| RenderError::Surface(format!("cannot allocate {}x{} pixmap", width, height)))?;
        Ok(SkiaSurface {
            pixmap,
            path: PathBuilder::new(),
            state: State::default(),
            stack: Vec::new(),
        })
    }

    /// Demultiply into a straight-alpha RGBA image.
    pub fn into_raster(self) -> Result<RasterImage> {
        let (w, h) = (self.pixmap.width(), self.pixmap.height());
        let data: Vec<u8> = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RgbaImage::from_raw(w, h, data)
            .map(RasterImage::new)
            .ok_or_else(|| RenderError::Surface("pixel buffer size mismatch".to_string()))
    }

    fn current_path(&self) -> Option<Path> {
        self.path.clone().finish()
    }

    fn fill_with(&mut self, color: Color, blend_mode: BlendMode, rule: FillRule) {
        let Some(path) = self.current_path() else {
            return;
        };
        let mut paint = solid(color);
        paint.blend_mode = blend_mode;
        self.pixmap.fill_path(
            &path,
            &paint,
            rule,
            Transform::identity(),
            self.state.clip.as_ref(),
        );
    }

    fn dest_transform(&self, image: &Pixmap, dest: DestRect) -> Transform {
        let (ox, oy) = self.state.offset;
        Transform::from_row(
            dest.width / image.width() as f32,
            0.0,
            0.0,
            dest.height / image.height() as f32,
            dest.x + ox,
            dest.y + oy,
        )
    }
}

fn solid(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn image_paint() -> PixmapPaint {
    PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..PixmapPaint::default()
    }
}

/// Premultiply a straight-alpha image into a pixmap.
fn to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())
        .ok_or_else(|| RenderError::Surface("empty logo image".to_string()))?;
    let mut data = Vec::with_capacity(image.as_raw().len());
    for px in image.pixels() {
        let [r, g, b, a] = px.0;
        let p = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[p.red(), p.green(), p.blue(), p.alpha()]);
    }
    Pixmap::from_vec(data, size).ok_or_else(|| RenderError::Surface("invalid logo pixmap".to_string()))
}

impl PathSink for SkiaSurface {
    fn begin_path(&mut self) {
        self.path = PathBuilder::new();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let (ox, oy) = self.state.offset;
        self.path.move_to(x + ox, y + oy);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (ox, oy) = self.state.offset;
        self.path.line_to(x + ox, y + oy);
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        let (ox, oy) = self.state.offset;
        self.path.quad_to(cx + ox, cy + oy, x + ox, y + oy);
    }

    fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        let (ox, oy) = self.state.offset;
        self.path
            .cubic_to(c1x + ox, c1y + oy, c2x + ox, c2y + oy, x + ox, y + oy);
    }

    fn close_path(&mut self) {
        self.path.close();
    }
}

impl Surface for SkiaSurface {
    fn fill(&mut self, color: Color) {
        self.fill_with(color, BlendMode::SourceOver, FillRule::Winding);
    }

    fn fill_even_odd(&mut self, color: Color) {
        self.fill_with(color, BlendMode::SourceOver, FillRule::EvenOdd);
    }

    fn fill_replace(&mut self, color: Color) {
        self.fill_with(color, BlendMode::Source, FillRule::Winding);
    }

    fn fill_shadow(&mut self, color: Color, blur: f32) -> Result<()> {
        let Some(path) = self.current_path() else {
            return Ok(());
        };
        // Three standard deviations on each side hold the visible falloff.
        let sigma = (blur / 2.0).max(0.0);
        let pad = (3.0 * sigma).ceil();
        let bounds = path.bounds();
        let x0 = (bounds.left() - pad).floor();
        let y0 = (bounds.top() - pad).floor();
        let w = (bounds.width() + 2.0 * pad).ceil().max(1.0) as u32 + 1;
        let h = (bounds.height() + 2.0 * pad).ceil().max(1.0) as u32 + 1;

        let mut coverage = Mask::new(w, h)
            .ok_or_else(|| RenderError::Surface(format!("cannot allocate {}x{} shadow mask", w, h)))?;
        coverage.fill_path(&path, FillRule::Winding, true, Transform::from_translate(-x0, -y0));
        let coverage = GrayImage::from_raw(w, h, coverage.data().to_vec())
            .ok_or_else(|| RenderError::Surface("shadow mask size mismatch".to_string()))?;
        let blurred = if sigma > 0.0 {
            imageops::fast_blur(&coverage, sigma)
        } else {
            coverage
        };

        let size = IntSize::from_wh(w, h)
            .ok_or_else(|| RenderError::Surface("empty shadow".to_string()))?;
        let mut data = Vec::with_capacity((w * h * 4) as usize);
        for cov in blurred.as_raw() {
            let alpha = (u16::from(*cov) * u16::from(color.a) / 255) as u8;
            let p = ColorU8::from_rgba(color.r, color.g, color.b, alpha).premultiply();
            data.extend_from_slice(&[p.red(), p.green(), p.blue(), p.alpha()]);
        }
        let shadow = Pixmap::from_vec(data, size)
            .ok_or_else(|| RenderError::Surface("invalid shadow pixmap".to_string()))?;

        self.pixmap.draw_pixmap(
            0,
            0,
            shadow.as_ref(),
            &PixmapPaint::default(),
            Transform::from_translate(x0, y0),
            self.state.clip.as_ref(),
        );
        Ok(())
    }

    fn clip(&mut self) {
        let Some(path) = self.current_path() else {
            return;
        };
        match self.state.clip.as_mut() {
            Some(mask) => mask.intersect_path(&path, FillRule::Winding, true, Transform::identity()),
            None => {
                if let Some(mut mask) = Mask::new(self.pixmap.width(), self.pixmap.height()) {
                    mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
                    self.state.clip = Some(mask);
                }
            }
        }
    }

    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.offset.0 += dx;
        self.state.offset.1 += dy;
    }

    fn draw_image(&mut self, image: &RgbaImage, dest: DestRect) -> Result<()> {
        let src = to_pixmap(image)?;
        let transform = self.dest_transform(&src, dest);
        self.pixmap.draw_pixmap(
            0,
            0,
            src.as_ref(),
            &image_paint(),
            transform,
            self.state.clip.as_ref(),
        );
        Ok(())
    }

    fn draw_silhouette(&mut self, image: &RgbaImage, dest: DestRect, color: Color) -> Result<()> {
        let src = to_pixmap(image)?;
        let w = dest.width.ceil().max(1.0) as u32;
        let h = dest.height.ceil().max(1.0) as u32;

        // Off-screen pass: scaled logo, then keep only its coverage in `color`.
        let mut offscreen = Pixmap::new(w, h)
            .ok_or_else(|| RenderError::Surface(format!("cannot allocate {}x{} off-screen buffer", w, h)))?;
        let scale = Transform::from_scale(dest.width / src.width() as f32, dest.height / src.height() as f32);
        offscreen.draw_pixmap(0, 0, src.as_ref(), &image_paint(), scale, None);

        let mut tint = solid(color);
        tint.blend_mode = BlendMode::SourceIn;
        if let Some(rect) = Rect::from_xywh(0.0, 0.0, w as f32, h as f32) {
            offscreen.fill_rect(rect, &tint, Transform::identity(), None);
        }

        let (ox, oy) = self.state.offset;
        self.pixmap.draw_pixmap(
            0,
            0,
            offscreen.as_ref(),
            &PixmapPaint::default(),
            Transform::from_translate(dest.x + ox, dest.y + oy),
            self.state.clip.as_ref(),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn pixel(raster: &RasterImage, x: u32, y: u32) -> [u8; 4] {
        raster.as_rgba().get_pixel(x, y).0
    }

    #[test]
    fn fill_respects_translation() {
        let mut s = SkiaSurface::new(20, 20).unwrap();
        s.save();
        s.translate(10.0, 10.0);
        s.begin_path();
        s.rect(0.0, 0.0, 10.0, 10.0);
        s.fill(Color::BLACK);
        s.restore();
        let raster = s.into_raster().unwrap();
        assert_eq!(pixel(&raster, 15, 15), [0, 0, 0, 255]);
        assert_eq!(pixel(&raster, 5, 5), [0, 0, 0, 0]);
    }

    #[test]
    fn clip_limits_fills_until_restore() {
        let mut s = SkiaSurface::new(20, 20).unwrap();
        s.save();
        s.begin_path();
        s.rect(0.0, 0.0, 10.0, 20.0);
        s.clip();
        s.begin_path();
        s.rect(0.0, 0.0, 20.0, 20.0);
        s.fill(Color::BLACK);
        s.restore();

        s.begin_path();
        s.rect(15.0, 0.0, 5.0, 5.0);
        s.fill(Color::rgb(255, 0, 0));

        let raster = s.into_raster().unwrap();
        assert_eq!(pixel(&raster, 5, 10), [0, 0, 0, 255]);
        assert_eq!(pixel(&raster, 12, 10), [0, 0, 0, 0]);
        assert_eq!(pixel(&raster, 17, 2), [255, 0, 0, 255]);
    }

    #[test]
    fn replace_punches_through() {
        let mut s = SkiaSurface::new(10, 10).unwrap();
        s.begin_path();
        s.rect(0.0, 0.0, 10.0, 10.0);
        s.fill(Color::BLACK);
        s.begin_path();
        s.rect(2.0, 2.0, 6.0, 6.0);
        s.fill_replace(Color::rgba(255, 255, 255, 0));
        let raster = s.into_raster().unwrap();
        assert_eq!(pixel(&raster, 5, 5)[3], 0);
        assert_eq!(pixel(&raster, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn even_odd_leaves_nested_subpath_unpainted() {
        let mut s = SkiaSurface::new(10, 10).unwrap();
        s.begin_path();
        s.rect(0.0, 0.0, 10.0, 10.0);
        s.rect(2.0, 2.0, 6.0, 6.0);
        s.fill_even_odd(Color::BLACK);
        let raster = s.into_raster().unwrap();
        assert_eq!(pixel(&raster, 5, 5)[3], 0);
        assert_eq!(pixel(&raster, 0, 0), [0, 0, 0, 255]);
    }

    #[test]
    fn shadow_spreads_past_the_path_and_fades() {
        let mut s = SkiaSurface::new(200, 200).unwrap();
        s.begin_path();
        s.rect(0.0, 0.0, 200.0, 200.0);
        s.fill(Color::WHITE);
        s.begin_path();
        s.rect(80.0, 80.0, 40.0, 40.0);
        s.fill_shadow(Color::rgba(0, 0, 0, 128), 20.0).unwrap();
        let raster = s.into_raster().unwrap();

        let center = pixel(&raster, 100, 100)[0];
        let edge = pixel(&raster, 100, 124)[0];
        assert!(center < edge, "center {} edge {}", center, edge);
        assert!(edge < 255);
        assert_eq!(pixel(&raster, 10, 10), [255, 255, 255, 255]);
    }

    #[test]
    fn silhouette_keeps_alpha_and_replaces_color() {
        // Left half opaque red, right half transparent.
        let logo = RgbaImage::from_fn(4, 4, |x, _| {
            if x < 2 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let mut s = SkiaSurface::new(40, 40).unwrap();
        s.draw_silhouette(&logo, DestRect::new(0.0, 0.0, 40.0, 40.0), Color::rgb(0, 0, 255))
            .unwrap();
        let raster = s.into_raster().unwrap();
        let [r, g, b, a] = pixel(&raster, 5, 20);
        assert!(r < 10 && g < 10 && b > 245 && a > 245, "got {:?}", [r, g, b, a]);
        assert!(pixel(&raster, 35, 20)[3] < 10);
    }

    #[test]
    fn draw_image_scales_into_dest() {
        let logo = RgbaImage::from_pixel(2, 2, Rgba([0, 255, 0, 255]));
        let mut s = SkiaSurface::new(30, 30).unwrap();
        s.draw_image(&logo, DestRect::new(10.0, 10.0, 10.0, 10.0)).unwrap();
        let raster = s.into_raster().unwrap();
        let [r, g, _, a] = pixel(&raster, 15, 15);
        assert!(r < 10 && g > 245 && a > 245);
        assert_eq!(pixel(&raster, 5, 5)[3], 0);
        assert_eq!(pixel(&raster, 25, 25)[3], 0);
    }

    #[test]
    fn zero_sized_surface_is_an_error() {
        assert!(SkiaSurface::new(0, 10).is_err());
    }
}
