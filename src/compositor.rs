//! Paints an encoded symbol onto a surface.
//!
//! Draw order is fixed: background, finder patterns, data modules, logo.

use crate::color::Color;
use crate::config::{ErrorCorrectionLevel, LogoShape, StyleConfig};
use crate::encoder::EncodedSymbol;
use crate::error::Result;
use crate::layout::{FinderPosition, Layout};
use crate::logo::{self, DecodedImage};
use crate::raster::RasterImage;
use crate::shapes::{self, DotCell};
use crate::surface::{DestRect, PathSink, SkiaSurface, Surface, SvgSurface};

/// Drop shadow under the logo plate: 10% black, 40px blur.
const PLATE_SHADOW: Color = Color::rgba(0, 0, 0, 26);
const PLATE_SHADOW_BLUR: f32 = 40.0;

/// Render to an RGBA raster of `layout.total_size` pixels square.
pub fn render(
    symbol: &EncodedSymbol,
    layout: &Layout,
    config: &StyleConfig,
    logo: Option<&DecodedImage>,
) -> Result<RasterImage> {
    let mut surface = SkiaSurface::new(layout.total_size, layout.total_size)?;
    paint(&mut surface, symbol, layout, config, logo)?;
    surface.into_raster()
}

/// Render to an SVG document with the same geometry as [`render`].
pub fn render_svg(
    symbol: &EncodedSymbol,
    layout: &Layout,
    config: &StyleConfig,
    logo: Option<&DecodedImage>,
) -> Result<String> {
    let mut surface = SvgSurface::new(layout.total_size, layout.total_size);
    paint(&mut surface, symbol, layout, config, logo)?;
    Ok(surface.finish())
}

/// Whether the logo pass runs, and therefore whether the center is cleared.
pub fn logo_active(config: &StyleConfig, logo: Option<&DecodedImage>) -> bool {
    logo.is_some() && config.logo.shape != LogoShape::None
}

pub fn paint<S: Surface + ?Sized>(
    surface: &mut S,
    symbol: &EncodedSymbol,
    layout: &Layout,
    config: &StyleConfig,
    logo: Option<&DecodedImage>,
) -> Result<()> {
    let background = config.background.color.with_opacity(config.background.opacity);
    let logo = logo.filter(|_| config.logo.shape != LogoShape::None);

    log::debug!(
        "compositing {}x{} modules: pixel_size={} margin={} total={} logo={}",
        layout.module_count,
        layout.module_count,
        layout.pixel_size,
        layout.margin,
        layout.total_size,
        logo.is_some()
    );
    if logo.is_some() && symbol.level() != ErrorCorrectionLevel::H {
        log::warn!(
            "logo exclusion radius is tuned for level H, symbol uses level {}",
            symbol.level()
        );
    }

    let total = layout.total_size as f32;
    surface.begin_path();
    surface.rect(0.0, 0.0, total, total);
    surface.fill(background);

    for position in FinderPosition::ALL {
        paint_finder(surface, layout, config, background, position);
    }

    let drawn = paint_dots(surface, symbol, layout, config, logo.is_some());
    log::debug!("drew {} of {} dark modules", drawn, symbol.dark_count());

    if let Some(image) = logo {
        paint_logo(surface, layout, config, background, image)?;
    }
    Ok(())
}

fn paint_finder<S: Surface + ?Sized>(
    surface: &mut S,
    layout: &Layout,
    config: &StyleConfig,
    background: Color,
    position: FinderPosition,
) {
    let p = layout.pixel_size as f32;
    let style = config.corners.style;
    let (x, y) = layout.finder_origin(position);

    surface.save();
    surface.translate(x, y);

    // Outer ring: the 7p outline with the 5p hole cut out of it.
    surface.begin_path();
    shapes::corner_path(surface, style, 7.0 * p, position);
    surface.translate(p, p);
    shapes::corner_path(surface, style, 5.0 * p, position);
    surface.fill_even_odd(config.corners.outer_color);

    surface.begin_path();
    shapes::corner_path(surface, style, 5.0 * p, position);
    surface.fill_replace(background);

    surface.translate(p, p);
    surface.begin_path();
    shapes::corner_path(surface, style, 3.0 * p, position);
    surface.fill(config.corners.inner_color);

    surface.restore();
}

/// All data modules go into one path and one fill. Returns the number drawn.
fn paint_dots<S: Surface + ?Sized>(
    surface: &mut S,
    symbol: &EncodedSymbol,
    layout: &Layout,
    config: &StyleConfig,
    clear_center: bool,
) -> usize {
    let n = symbol.size();
    let mut drawn = 0;

    surface.begin_path();
    for row in 0..n {
        for col in 0..n {
            if !symbol.is_dark(row, col) || layout.is_finder_module(row, col) {
                continue;
            }
            let (cx, cy) = layout.module_center(row, col);
            if clear_center && layout.in_logo_exclusion(cx, cy) {
                continue;
            }
            let cell = DotCell {
                cx,
                cy,
                size: layout.pixel_size as f32,
                distance: layout.distance_from_center(cx, cy),
                total_size: layout.total_size as f32,
            };
            shapes::dot_path(surface, config.dots.style, cell);
            drawn += 1;
        }
    }
    if drawn > 0 {
        surface.fill(config.dots.color);
    }
    drawn
}

fn plate_path<P: PathSink + ?Sized>(sink: &mut P, shape: LogoShape, center: f32, area: f32) {
    let origin = center - area / 2.0;
    match shape {
        LogoShape::Circle => sink.circle(center, center, area / 2.0),
        // Square plates are drawn rounded too, at the same radius.
        LogoShape::Square | LogoShape::RoundedSquare | LogoShape::None => {
            sink.rounded_rect(origin, origin, area, area, [area * 0.2; 4])
        }
    }
}

fn paint_logo<S: Surface + ?Sized>(
    surface: &mut S,
    layout: &Layout,
    config: &StyleConfig,
    background: Color,
    image: &DecodedImage,
) -> Result<()> {
    let logo = &config.logo;
    let area = layout.logo_area;
    let center = layout.center;
    let plate = if logo.sync_background {
        background
    } else {
        logo.background_color
    };

    surface.begin_path();
    plate_path(surface, logo.shape, center, area);
    surface.fill_shadow(PLATE_SHADOW, PLATE_SHADOW_BLUR)?;

    surface.save();
    surface.clip();
    surface.fill_replace(plate);

    let (w, h) = logo::fit_inside(image.width(), image.height(), area);
    let dest = DestRect::new(center - w / 2.0, center - h / 2.0, w, h);
    let result = if logo.recolor {
        surface.draw_silhouette(image, dest, config.dots.color)
    } else {
        surface.draw_image(image, dest)
    };
    surface.restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CornerStyle, DotStyle};
    use crate::layout::QUIET_ZONE_MODULES;
    use image::{Rgba, RgbaImage};

    const DOT: Color = Color::rgb(200, 0, 0);
    const OUTER: Color = Color::rgb(0, 0, 200);
    const INNER: Color = Color::rgb(0, 200, 0);

    fn all_dark(size: usize) -> EncodedSymbol {
        EncodedSymbol::from_modules(size, vec![true; size * size], ErrorCorrectionLevel::H).unwrap()
    }

    fn config() -> StyleConfig {
        let mut cfg = StyleConfig::new("synthetic");
        cfg.dots.style = DotStyle::Square;
        cfg.dots.color = DOT;
        cfg.corners.style = CornerStyle::Square;
        cfg.corners.outer_color = OUTER;
        cfg.corners.inner_color = INNER;
        cfg.logo.shape = LogoShape::Circle;
        cfg.logo.recolor = false;
        cfg
    }

    fn logo_image() -> DecodedImage {
        RgbaImage::from_pixel(8, 8, Rgba([0, 0, 0, 0]))
    }

    /// Color at the center of module `(row, col)`.
    fn module_color(raster: &RasterImage, layout: &Layout, row: usize, col: usize) -> Color {
        let (x, y) = layout.module_center(row, col);
        raster.pixel(x as u32, y as u32)
    }

    #[test]
    fn output_is_total_size_square() {
        let symbol = all_dark(21);
        let cfg = config();
        let layout = Layout::resolve_with_resolution(21, &cfg, 330).unwrap();
        let raster = render(&symbol, &layout, &cfg, None).unwrap();
        assert_eq!(raster.width(), layout.total_size);
        assert_eq!(raster.height(), layout.total_size);
        // Quiet zone is plain background.
        assert_eq!(raster.pixel(1, 1), Color::WHITE);
        assert_eq!(layout.margin, layout.pixel_size * QUIET_ZONE_MODULES);
    }

    #[test]
    fn finder_footprint_is_a_clean_bullseye() {
        let symbol = all_dark(21);
        let cfg = config();
        let layout = Layout::resolve_with_resolution(21, &cfg, 330).unwrap();
        let raster = render(&symbol, &layout, &cfg, None).unwrap();

        for (r0, c0) in [(0, 0), (0, 14), (14, 0)] {
            assert_eq!(module_color(&raster, &layout, r0, c0), OUTER);
            assert_eq!(module_color(&raster, &layout, r0 + 1, c0 + 1), Color::WHITE);
            assert_eq!(module_color(&raster, &layout, r0 + 5, c0 + 5), Color::WHITE);
            assert_eq!(module_color(&raster, &layout, r0 + 3, c0 + 3), INNER);
            assert_eq!(module_color(&raster, &layout, r0, c0 + 3), OUTER);
        }
        // Just outside the footprint data modules are drawn again.
        assert_eq!(module_color(&raster, &layout, 7, 7), DOT);
        assert_eq!(module_color(&raster, &layout, 0, 7), DOT);
        assert_eq!(module_color(&raster, &layout, 20, 20), DOT);
    }

    #[test]
    fn translucent_background_keeps_a_true_hole() {
        let symbol = all_dark(21);
        let mut cfg = config();
        cfg.background.opacity = 0.0;
        let layout = Layout::resolve_with_resolution(21, &cfg, 330).unwrap();
        let raster = render(&symbol, &layout, &cfg, None).unwrap();
        assert_eq!(module_color(&raster, &layout, 1, 1).a, 0);
        assert_eq!(module_color(&raster, &layout, 0, 0), OUTER);
    }

    #[test]
    fn svg_finder_hole_survives_a_transparent_background() {
        let symbol = all_dark(21);
        let mut cfg = config();
        cfg.background.opacity = 0.0;
        let layout = Layout::resolve_with_resolution(21, &cfg, 330).unwrap();
        let svg = render_svg(&symbol, &layout, &cfg, None).unwrap();

        let outer: Vec<&str> = svg.lines().filter(|l| l.contains(r##"fill="#0000c8""##)).collect();
        assert_eq!(outer.len(), 3);
        for line in &outer {
            assert!(line.contains(r#"fill-rule="evenodd""#), "solid outer block: {}", line);
        }
        // Top-left ring carries the hole outline one module in.
        let p = layout.pixel_size as f32;
        let hole = layout.margin as f32 + p;
        assert!(outer[0].contains(&format!("ZM{:.2} {:.2}", hole, hole)));
    }

    #[test]
    fn plate_casts_a_soft_shadow() {
        let size = 33;
        let symbol = EncodedSymbol::from_modules(size, vec![false; size * size], ErrorCorrectionLevel::H).unwrap();
        let mut cfg = config();
        cfg.logo.size_fraction = 0.2;
        let layout = Layout::resolve_with_resolution(size, &cfg, 900).unwrap();
        let raster = render(&symbol, &layout, &cfg, Some(&logo_image())).unwrap();

        let c = layout.center as u32;
        let top = (layout.center - layout.logo_area / 2.0) as u32;
        let near = raster.pixel(c, top - 6);
        assert!(near.r < 252 && near.r > 200, "got {:?}", near);
        assert_eq!(near.r, near.b);
        assert_eq!(raster.pixel(c, top - 150), Color::WHITE);
        // The plate itself is not darkened.
        assert_eq!(raster.pixel(c, top + 10), Color::WHITE);
    }

    #[test]
    fn square_plate_has_rounded_corners() {
        let symbol = all_dark(21);
        let mut cfg = config();
        cfg.logo.shape = LogoShape::Square;
        cfg.logo.sync_background = false;
        cfg.logo.background_color = Color::rgb(10, 20, 30);
        let layout = Layout::resolve_with_resolution(21, &cfg, 660).unwrap();
        let raster = render(&symbol, &layout, &cfg, Some(&logo_image())).unwrap();
        let origin = (layout.center - layout.logo_area / 2.0) as u32;
        let inset = (layout.logo_area * 0.2) as u32;
        assert_ne!(raster.pixel(origin + 1, origin + 1), Color::rgb(10, 20, 30));
        assert_eq!(raster.pixel(origin + inset, origin + inset), Color::rgb(10, 20, 30));
    }

    #[test]
    fn logo_clears_the_ring_around_the_plate() {
        let symbol = all_dark(33);
        let mut cfg = config();
        cfg.logo.size_fraction = 0.2;
        let layout = Layout::resolve_with_resolution(33, &cfg, 900).unwrap();
        let logo = logo_image();

        let with_logo = render(&symbol, &layout, &cfg, Some(&logo)).unwrap();
        let without = render(&symbol, &layout, &cfg, None).unwrap();

        let inner = layout.logo_area / 2.0;
        let outer = layout.logo_exclusion_radius;
        let mut ring = 0;
        for row in 0..33 {
            for col in 0..33 {
                let (x, y) = layout.module_center(row, col);
                let d = layout.distance_from_center(x, y);
                if d > inner + 1.0 && d < outer - 1.0 {
                    ring += 1;
                    // Background, under at most the plate's faint shadow.
                    let px = module_color(&with_logo, &layout, row, col);
                    assert!(px.r > 200 && px.g > 200 && px.b > 200, "got {:?}", px);
                    assert_eq!(module_color(&without, &layout, row, col), DOT);
                }
            }
        }
        assert!(ring > 0, "no module centers in the ring");
    }

    #[test]
    fn shape_none_disables_the_logo() {
        let symbol = all_dark(21);
        let mut cfg = config();
        cfg.logo.shape = LogoShape::None;
        let layout = Layout::resolve_with_resolution(21, &cfg, 330).unwrap();
        let logo = logo_image();
        assert!(!logo_active(&cfg, Some(&logo)));
        let raster = render(&symbol, &layout, &cfg, Some(&logo)).unwrap();
        assert_eq!(module_color(&raster, &layout, 10, 10), DOT);
    }

    #[test]
    fn recolored_logo_uses_dot_color() {
        let symbol = all_dark(21);
        let mut cfg = config();
        cfg.logo.recolor = true;
        cfg.logo.shape = LogoShape::Square;
        let layout = Layout::resolve_with_resolution(21, &cfg, 660).unwrap();
        let logo = RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 255]));
        let raster = render(&symbol, &layout, &cfg, Some(&logo)).unwrap();
        let c = layout.center as u32;
        let px = raster.pixel(c, c);
        assert!(px.r > 190 && px.g < 10 && px.b < 10, "got {:?}", px);
    }

    #[test]
    fn plate_uses_logo_background_when_not_synced() {
        let symbol = all_dark(21);
        let mut cfg = config();
        cfg.logo.sync_background = false;
        cfg.logo.background_color = Color::rgb(10, 20, 30);
        cfg.logo.shape = LogoShape::Square;
        let layout = Layout::resolve_with_resolution(21, &cfg, 660).unwrap();
        // Wide logo leaves plate visible above and below it.
        let logo = RgbaImage::from_pixel(8, 2, Rgba([255, 255, 255, 255]));
        let raster = render(&symbol, &layout, &cfg, Some(&logo)).unwrap();
        let c = layout.center;
        let y = (c - layout.logo_area / 2.0 + 2.0) as u32;
        assert_eq!(raster.pixel(c as u32, y), Color::rgb(10, 20, 30));
        let logo_px = raster.pixel(c as u32, c as u32);
        assert!(logo_px.r > 245 && logo_px.g > 245 && logo_px.b > 245, "got {:?}", logo_px);
    }

    #[test]
    fn svg_output_matches_layout() {
        let symbol = all_dark(21);
        let cfg = config();
        let layout = Layout::resolve_with_resolution(21, &cfg, 330).unwrap();
        let svg = render_svg(&symbol, &layout, &cfg, Some(&logo_image())).unwrap();
        let side = layout.total_size;
        assert!(svg.contains(&format!(r#"viewBox="0 0 {} {}""#, side, side)));
        assert!(svg.contains(r##"fill="#c80000""##));
        assert!(svg.contains("<clipPath"));
        assert!(svg.contains("<image"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let symbol = all_dark(25);
        let mut cfg = config();
        cfg.dots.style = DotStyle::Radial;
        cfg.corners.style = CornerStyle::Ninja;
        let layout = Layout::resolve_with_resolution(25, &cfg, 400).unwrap();
        let a = render(&symbol, &layout, &cfg, None).unwrap();
        let b = render(&symbol, &layout, &cfg, None).unwrap();
        assert_eq!(a, b);
    }
}
