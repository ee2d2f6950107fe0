//! Path builders for data modules and finder patterns.
//!
//! Every builder only emits geometry into a [`PathSink`]; filling and color
//! are the compositor's business.

use std::f32::consts::PI;

use crate::config::{CornerStyle, DotStyle};
use crate::layout::FinderPosition;
use crate::surface::{CornerRadii, PathSink};

/// Fraction of the cell a dot occupies; the 6% gap keeps neighbours apart.
pub const DOT_FILL: f32 = 0.94;

/// Position of one data module.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DotCell {
    /// Cell center.
    pub cx: f32,
    pub cy: f32,
    /// Cell side in pixels.
    pub size: f32,
    /// Distance of the cell center from the canvas center.
    pub distance: f32,
    /// Canvas side in pixels.
    pub total_size: f32,
}

/// Radius multiplier of a radial dot: 1 at the center, shrinking linearly
/// with distance, never above 1.
pub fn radial_scale(distance: f32, total_size: f32) -> f32 {
    (1.0 - (distance / (total_size / 1.2)) * 0.25).clamp(0.0, 1.0)
}

pub fn dot_path<P: PathSink + ?Sized>(sink: &mut P, style: DotStyle, cell: DotCell) {
    let s = cell.size * DOT_FILL;
    let rad = s / 2.0;
    let (x, y) = (cell.cx - rad, cell.cy - rad);

    match style {
        DotStyle::Radial => {
            sink.circle(cell.cx, cell.cy, rad * radial_scale(cell.distance, cell.total_size));
        }
        DotStyle::Liquid => sink.rounded_rect(x, y, s, s, [s * 0.45; 4]),
        DotStyle::Rounded => sink.rounded_rect(x, y, s, s, [s * 0.25; 4]),
        DotStyle::Hexagon => {
            for i in 0..6 {
                let a = i as f32 * PI / 3.0;
                let (px, py) = (cell.cx + rad * a.cos(), cell.cy + rad * a.sin());
                if i == 0 {
                    sink.move_to(px, py);
                } else {
                    sink.line_to(px, py);
                }
            }
            sink.close_path();
        }
        DotStyle::Circle | DotStyle::Dot => sink.circle(cell.cx, cell.cy, rad),
        DotStyle::Square => sink.rect(x, y, s, s),
    }
}

/// Radii for the variants whose rounding depends on the finder position.
/// The sharp (or rounded) outer corner always faces away from the symbol.
fn positional_radii(style: CornerStyle, r: f32, position: FinderPosition) -> Option<CornerRadii> {
    use FinderPosition::*;

    let radii = match (style, position) {
        (CornerStyle::EyeAlmond, TopLeft) => [0.0, r, 0.0, r],
        (CornerStyle::EyeAlmond, TopRight | BottomLeft) => [r, 0.0, r, 0.0],

        (CornerStyle::SingleRounded, TopLeft) => [r, 0.0, 0.0, 0.0],
        (CornerStyle::SingleRounded, TopRight) => [0.0, r, 0.0, 0.0],
        (CornerStyle::SingleRounded, BottomLeft) => [0.0, 0.0, 0.0, r],

        (CornerStyle::Leaf, TopLeft) => [0.0, r, r, r],
        (CornerStyle::Leaf, TopRight) => [r, 0.0, r, r],
        (CornerStyle::Leaf, BottomLeft) => [r, r, r, 0.0],

        _ => return None,
    };
    Some(radii)
}

/// One `size`×`size` layer of a finder pattern, at the local origin.
pub fn corner_path<P: PathSink + ?Sized>(sink: &mut P, style: CornerStyle, size: f32, position: FinderPosition) {
    let r = size * 0.45;

    if let Some(radii) = positional_radii(style, r, position) {
        sink.rounded_rect(0.0, 0.0, size, size, radii);
        return;
    }

    match style {
        CornerStyle::Rounded => sink.rounded_rect(0.0, 0.0, size, size, [size * 0.2; 4]),
        CornerStyle::ExtraRounded => sink.rounded_rect(0.0, 0.0, size, size, [size * 0.45; 4]),
        CornerStyle::Shield => {
            sink.move_to(0.0, 0.0);
            sink.line_to(size, 0.0);
            sink.line_to(size, size * 0.7);
            sink.cubic_to(size, size * 0.9, size * 0.7, size, size * 0.5, size);
            sink.cubic_to(size * 0.3, size, 0.0, size * 0.9, 0.0, size * 0.7);
            sink.close_path();
        }
        CornerStyle::Ninja => {
            let cp = size / 2.0;
            let offset = size * 0.2;
            sink.move_to(cp, 0.0);
            sink.quad_to(size - offset, offset, size, cp);
            sink.quad_to(size - offset, size - offset, cp, size);
            sink.quad_to(offset, size - offset, 0.0, cp);
            sink.quad_to(offset, offset, cp, 0.0);
            sink.close_path();
        }
        // The eye variants keep the classic square silhouette.
        CornerStyle::Square
        | CornerStyle::Eye
        | CornerStyle::EyeFancy
        | CornerStyle::Dot
        | CornerStyle::EyeAlmond
        | CornerStyle::SingleRounded
        | CornerStyle::Leaf => sink.rect(0.0, 0.0, size, size),
    }
}
