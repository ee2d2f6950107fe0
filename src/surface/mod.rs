//! Drawing targets.
//!
//! Everything above this module is geometry and color logic; the surfaces are
//! the only place that knows how pixels (or SVG elements) are produced. The
//! model is an immediate-mode 2D context: build a path, then fill or clip with
//! it, under a save/restore stack of translation and clip.

mod skia;
mod svg;

pub use skia::SkiaSurface;
pub use svg::SvgSurface;

use image::RgbaImage;

use crate::color::Color;
use crate::error::Result;

/// Cubic Bézier handle length for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// Corner radii in canvas order: top-left, top-right, bottom-right, bottom-left.
pub type CornerRadii = [f32; 4];

/// Axis-aligned destination rectangle, in the current coordinate space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DestRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        DestRect { x, y, width, height }
    }
}

/// Path construction. Coordinates are relative to the current translation.
pub trait PathSink {
    /// Discard the current path.
    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32);
    fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32);
    fn close_path(&mut self);

    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.move_to(x, y);
        self.line_to(x + w, y);
        self.line_to(x + w, y + h);
        self.line_to(x, y + h);
        self.close_path();
    }

    /// Rectangle with per-corner radii, each clamped to half the shorter side.
    fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radii: CornerRadii) {
        let max = w.min(h) / 2.0;
        let [tl, tr, br, bl] = radii.map(|r| r.clamp(0.0, max));
        let (right, bottom) = (x + w, y + h);

        self.move_to(x + tl, y);
        self.line_to(right - tr, y);
        if tr > 0.0 {
            self.cubic_to(right - tr + tr * KAPPA, y, right, y + tr - tr * KAPPA, right, y + tr);
        }
        self.line_to(right, bottom - br);
        if br > 0.0 {
            self.cubic_to(right, bottom - br + br * KAPPA, right - br + br * KAPPA, bottom, right - br, bottom);
        }
        self.line_to(x + bl, bottom);
        if bl > 0.0 {
            self.cubic_to(x + bl - bl * KAPPA, bottom, x, bottom - bl + bl * KAPPA, x, bottom - bl);
        }
        self.line_to(x, y + tl);
        if tl > 0.0 {
            self.cubic_to(x, y + tl - tl * KAPPA, x + tl - tl * KAPPA, y, x + tl, y);
        }
        self.close_path();
    }

    fn circle(&mut self, cx: f32, cy: f32, r: f32) {
        let k = r * KAPPA;
        self.move_to(cx + r, cy);
        self.cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r);
        self.cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy);
        self.cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r);
        self.cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy);
        self.close_path();
    }
}

/// A drawing target the compositor paints onto.
pub trait Surface: PathSink {
    /// Fill the current path, blending over what is beneath.
    fn fill(&mut self, color: Color);

    /// Like [`fill`](Surface::fill) with the even-odd rule, so a nested
    /// subpath cuts a hole instead of being painted twice.
    fn fill_even_odd(&mut self, color: Color);

    /// Fill the current path, replacing what is beneath (alpha included).
    /// Surfaces that cannot replace fall back to blending.
    fn fill_replace(&mut self, color: Color) {
        self.fill(color);
    }

    /// Paint a drop shadow of the current path: its coverage blurred with a
    /// Gaussian of standard deviation `blur / 2`, in `color`. The path itself
    /// is not filled.
    fn fill_shadow(&mut self, color: Color, blur: f32) -> Result<()>;

    /// Intersect the clip region with the current path.
    fn clip(&mut self);

    /// Push translation and clip.
    fn save(&mut self);
    /// Pop translation and clip; unbalanced calls are ignored.
    fn restore(&mut self);
    fn translate(&mut self, dx: f32, dy: f32);

    /// Draw `image` scaled into `dest`.
    fn draw_image(&mut self, image: &RgbaImage, dest: DestRect) -> Result<()>;

    /// Draw `image` scaled into `dest` with every pixel's color replaced by
    /// `color`, keeping the image's alpha.
    fn draw_silhouette(&mut self, image: &RgbaImage, dest: DestRect, color: Color) -> Result<()>;
}
