use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::config::StyleConfig;
use crate::contrast::RiskReport;

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    /// Style fields sit at the top level of the request body.
    #[serde(flatten)]
    pub config: StyleConfig,
    /// "png", "svg" or "jpeg".
    #[serde(default = "default_format")]
    pub format: String,
    /// Decode the rendered raster and report whether it scans.
    #[serde(default)]
    pub verify: bool,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    /// Data URI of the rendered image.
    pub image_base64: String,
    pub format: String,
    pub size: u32,
    pub module_count: usize,
    pub version: Option<i16>,
    pub contrast: RiskReport,
    pub logo_applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scannable: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ContrastRequest {
    #[serde(default = "default_foreground")]
    pub foreground: Color,
    #[serde(default = "default_background")]
    pub background: Color,
}

#[derive(Debug, Serialize)]
pub struct DecodeResponse {
    pub data: String,
    pub format: String,
}

#[derive(Debug, Serialize)]
pub struct StylesResponse {
    pub dot_styles: Vec<&'static str>,
    pub corner_styles: Vec<&'static str>,
    pub logo_shapes: Vec<&'static str>,
    pub error_correction_levels: Vec<&'static str>,
    pub max_logo_fraction: f32,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
    pub status: u16,
}

impl ApiError {
    pub fn new(status: u16, code: &str, error: impl Into<String>) -> Self {
        ApiError {
            error: error.into(),
            code: code.to_string(),
            status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

fn default_format() -> String {
    "png".to_string()
}
fn default_foreground() -> Color {
    Color::BLACK
}
fn default_background() -> Color {
    Color::WHITE
}
