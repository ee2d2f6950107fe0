use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rocket::data::{Data, ToByteUnit};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use crate::cache::SymbolCache;
use crate::config::{CornerStyle, DotStyle, ErrorCorrectionLevel, LogoShape, MAX_LOGO_FRACTION};
use crate::contrast::{self, RiskReport};
use crate::error::{EncodeError, RenderError};
use crate::logo;
use crate::models::*;
use crate::qr;
use crate::raster::{ExportFormat, RasterImage};
use crate::verify;

static START_TIME: LazyLock<Instant> = LazyLock::new(Instant::now);

/// Largest image accepted by the decode endpoint.
const MAX_DECODE_BYTES: u64 = 10 * 1024 * 1024;

type ApiResult<T> = Result<Json<T>, (Status, Json<ApiError>)>;

fn api_error(status: Status, code: &str, msg: impl Into<String>) -> (Status, Json<ApiError>) {
    (status, Json(ApiError::new(status.code, code, msg)))
}

fn render_error(err: RenderError) -> (Status, Json<ApiError>) {
    match err {
        RenderError::InvalidConfig(msg) => api_error(Status::BadRequest, "INVALID_CONFIG", msg),
        RenderError::Encode(e @ EncodeError::CapacityExceeded { .. }) => {
            api_error(Status::UnprocessableEntity, "PAYLOAD_TOO_LONG", e.to_string())
        }
        RenderError::Layout(e) => api_error(Status::UnprocessableEntity, "LAYOUT_FAILED", e.to_string()),
        other => {
            log::error!("render failed: {}", other);
            api_error(Status::InternalServerError, "RENDER_FAILED", other.to_string())
        }
    }
}

// ============ Health & Discovery ============

#[get("/health")]
pub fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: START_TIME.elapsed().as_secs(),
    })
}

#[get("/styles")]
pub fn styles() -> Json<StylesResponse> {
    Json(StylesResponse {
        dot_styles: DotStyle::ALL.iter().map(|s| s.as_str()).collect(),
        corner_styles: CornerStyle::ALL.iter().map(|s| s.as_str()).collect(),
        logo_shapes: LogoShape::ALL.iter().map(|s| s.as_str()).collect(),
        error_correction_levels: [
            ErrorCorrectionLevel::L,
            ErrorCorrectionLevel::M,
            ErrorCorrectionLevel::Q,
            ErrorCorrectionLevel::H,
        ]
        .iter()
        .map(|l| l.as_str())
        .collect(),
        max_logo_fraction: MAX_LOGO_FRACTION,
    })
}

// ============ Rendering ============

enum OutputFormat {
    Raster(ExportFormat),
    Svg,
}

fn parse_format(format: &str) -> Option<OutputFormat> {
    match format.to_lowercase().as_str() {
        "png" => Some(OutputFormat::Raster(ExportFormat::Png)),
        "jpeg" | "jpg" => Some(OutputFormat::Raster(ExportFormat::Jpeg)),
        "svg" => Some(OutputFormat::Svg),
        _ => None,
    }
}

fn describe<T>(
    rendered: &qr::Rendered<T>,
    image_base64: String,
    format: &str,
    scannable: Option<bool>,
) -> RenderResponse {
    RenderResponse {
        image_base64,
        format: format.to_lowercase(),
        size: rendered.layout.total_size,
        module_count: rendered.module_count,
        version: rendered.version,
        contrast: rendered.risk,
        logo_applied: rendered.logo_applied,
        scannable,
    }
}

fn check_scan(raster: &RasterImage, payload: &str) -> bool {
    let ok = verify::round_trips(raster, payload);
    if !ok {
        log::warn!("rendered symbol for {} bytes did not scan back", payload.len());
    }
    ok
}

/// Runs on a blocking thread: decode the logo, render, optionally verify.
fn render_blocking(
    cache: &SymbolCache,
    req: RenderRequest,
    format: OutputFormat,
) -> Result<RenderResponse, RenderError> {
    let config = &req.config;
    let logo = logo::load_logo(&config.logo);

    match format {
        OutputFormat::Raster(export) => {
            let rendered = qr::generate_with_cache(cache, config, logo.as_ref())?;
            let scannable = req.verify.then(|| check_scan(&rendered.image, &config.payload));
            let bytes = rendered.image.encode(export)?;
            let uri = format!("data:{};base64,{}", export.mime_type(), BASE64.encode(&bytes));
            Ok(describe(&rendered, uri, &req.format, scannable))
        }
        OutputFormat::Svg => {
            let rendered = qr::generate_svg_with_cache(cache, config, logo.as_ref())?;
            // SVG output is checked through its raster twin.
            let scannable = if req.verify {
                let raster = qr::generate_with_cache(cache, config, logo.as_ref())?;
                Some(check_scan(&raster.image, &config.payload))
            } else {
                None
            };
            let uri = format!("data:image/svg+xml;base64,{}", BASE64.encode(rendered.image.as_bytes()));
            Ok(describe(&rendered, uri, &req.format, scannable))
        }
    }
}

#[post("/qr/render", format = "json", data = "<req>")]
pub async fn render_qr(
    req: Json<serde_json::Value>,
    cache: &State<Arc<SymbolCache>>,
) -> ApiResult<RenderResponse> {
    let req: RenderRequest = serde_json::from_value(req.into_inner())
        .map_err(|e| api_error(Status::BadRequest, "INVALID_CONFIG", format!("Invalid request: {}", e)))?;

    let format = parse_format(&req.format).ok_or_else(|| {
        api_error(
            Status::BadRequest,
            "INVALID_FORMAT",
            format!("Unsupported format '{}': use png, svg or jpeg", req.format),
        )
    })?;

    log::info!(
        "render: {} bytes, level {}, dots {}, corners {}, format {}",
        req.config.payload.len(),
        req.config.error_correction_level,
        req.config.dots.style,
        req.config.corners.style,
        req.format
    );

    let cache = Arc::clone(cache.inner());
    let response = tokio::task::spawn_blocking(move || render_blocking(&cache, req, format))
        .await
        .map_err(|e| api_error(Status::InternalServerError, "RENDER_FAILED", e.to_string()))?
        .map_err(render_error)?;

    Ok(Json(response))
}

#[post("/qr/contrast", format = "json", data = "<req>")]
pub fn contrast_check(req: Json<ContrastRequest>) -> Json<RiskReport> {
    Json(contrast::analyze(req.foreground, req.background))
}

// ============ Decoding ============

#[post("/qr/decode", data = "<data>")]
pub async fn decode_qr(data: Data<'_>) -> ApiResult<DecodeResponse> {
    let bytes = data
        .open(MAX_DECODE_BYTES.bytes())
        .into_bytes()
        .await
        .map_err(|e| api_error(Status::BadRequest, "INVALID_IMAGE", format!("Failed to read body: {}", e)))?;
    if !bytes.is_complete() {
        return Err(api_error(
            Status::PayloadTooLarge,
            "IMAGE_TOO_LARGE",
            format!("Image exceeds {} bytes", MAX_DECODE_BYTES),
        ));
    }
    let bytes = bytes.into_inner();

    let decoded = tokio::task::spawn_blocking(move || verify::decode_bytes(&bytes))
        .await
        .map_err(|e| api_error(Status::InternalServerError, "DECODE_FAILED", e.to_string()))?
        .map_err(|e| api_error(Status::BadRequest, "INVALID_IMAGE", format!("Failed to load image: {}", e)))?;

    match decoded {
        Some(content) => Ok(Json(DecodeResponse {
            data: content,
            format: "qr".to_string(),
        })),
        None => Err(api_error(
            Status::UnprocessableEntity,
            "NO_QR_FOUND",
            "No QR code found in image",
        )),
    }
}
