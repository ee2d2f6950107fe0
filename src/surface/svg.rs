use std::fmt::Write as _;
use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::RgbaImage;

use super::{DestRect, PathSink, Surface};
use crate::color::Color;
use crate::error::Result;
use crate::logo;

#[derive(Clone, Default)]
struct State {
    offset: (f32, f32),
    /// id of the innermost `<clipPath>`; nested clips reference their parent.
    clip: Option<String>,
}

/// Vector surface: every fill becomes a `<path>` element.
pub struct SvgSurface {
    width: u32,
    height: u32,
    body: String,
    path: String,
    state: State,
    stack: Vec<State>,
    next_clip_id: usize,
    next_filter_id: usize,
}

impl SvgSurface {
    pub fn new(width: u32, height: u32) -> Self {
        SvgSurface {
            width,
            height,
            body: String::new(),
            path: String::new(),
            state: State::default(),
            stack: Vec::new(),
            next_clip_id: 0,
            next_filter_id: 0,
        }
    }

    /// Complete SVG document.
    pub fn finish(self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}">
{body}</svg>"#,
            w = self.width,
            h = self.height,
            body = self.body,
        )
    }

    fn point(&mut self, cmd: char, coords: &[f32]) {
        let (ox, oy) = self.state.offset;
        self.path.push(cmd);
        for (i, v) in coords.iter().enumerate() {
            let v = if i % 2 == 0 { v + ox } else { v + oy };
            if i > 0 {
                self.path.push(' ');
            }
            let _ = write!(self.path, "{:.2}", v);
        }
    }

    fn emit_path(&mut self, attrs: &str) {
        if self.path.is_empty() {
            return;
        }
        let clip = self.clip_attr();
        let _ = writeln!(self.body, r#"<path d="{}" {}{}/>"#, self.path, attrs, clip);
    }

    fn clip_attr(&self) -> String {
        match &self.state.clip {
            Some(id) => format!(r#" clip-path="url(#{})""#, id),
            None => String::new(),
        }
    }
}

fn fill_attrs(color: Color) -> String {
    let rgb = format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b);
    if color.a == 255 {
        format!(r#"fill="{}""#, rgb)
    } else {
        format!(r#"fill="{}" fill-opacity="{:.3}""#, rgb, color.a as f32 / 255.0)
    }
}

impl PathSink for SvgSurface {
    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.point('M', &[x, y]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.point('L', &[x, y]);
    }

    fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.point('Q', &[cx, cy, x, y]);
    }

    fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) {
        self.point('C', &[c1x, c1y, c2x, c2y, x, y]);
    }

    fn close_path(&mut self) {
        self.path.push('Z');
    }
}

impl Surface for SvgSurface {
    fn fill(&mut self, color: Color) {
        self.emit_path(&fill_attrs(color));
    }

    fn fill_even_odd(&mut self, color: Color) {
        self.emit_path(&format!(r#"{} fill-rule="evenodd""#, fill_attrs(color)));
    }

    fn fill_shadow(&mut self, color: Color, blur: f32) -> Result<()> {
        if self.path.is_empty() {
            return Ok(());
        }
        let id = format!("shadow{}", self.next_filter_id);
        self.next_filter_id += 1;
        let _ = writeln!(
            self.body,
            r#"<filter id="{}" x="-50%" y="-50%" width="200%" height="200%"><feGaussianBlur stdDeviation="{:.2}"/></filter>"#,
            id,
            blur / 2.0
        );
        self.emit_path(&format!(r#"{} filter="url(#{})""#, fill_attrs(color), id));
        Ok(())
    }

    fn clip(&mut self) {
        if self.path.is_empty() {
            return;
        }
        let id = format!("clip{}", self.next_clip_id);
        self.next_clip_id += 1;
        let _ = writeln!(
            self.body,
            r#"<clipPath id="{}"{}><path d="{}"/></clipPath>"#,
            id,
            self.clip_attr(),
            self.path
        );
        self.state.clip = Some(id);
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
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, image::ImageFormat::Png)?;
        let (ox, oy) = self.state.offset;
        let _ = writeln!(
            self.body,
            r#"<image x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" preserveAspectRatio="none" href="data:image/png;base64,{}"{}/>"#,
            dest.x + ox,
            dest.y + oy,
            dest.width,
            dest.height,
            BASE64.encode(png.into_inner()),
            self.clip_attr()
        );
        Ok(())
    }

    fn draw_silhouette(&mut self, image: &RgbaImage, dest: DestRect, color: Color) -> Result<()> {
        let tinted = logo::silhouette(image, color);
        self.draw_image(&tinted, dest)
    }
}
