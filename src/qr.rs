//! One-call entry points: validate, encode, lay out, paint.

use std::sync::Arc;

use crate::cache::SymbolCache;
use crate::compositor;
use crate::config::StyleConfig;
use crate::contrast::{self, RiskReport, RiskTier};
use crate::encoder::{self, EncodedSymbol};
use crate::error::Result;
use crate::layout::Layout;
use crate::logo::DecodedImage;
use crate::raster::{ExportFormat, RasterImage};

/// A finished render and what went into it.
#[derive(Debug, Clone)]
pub struct Rendered<T = RasterImage> {
    pub image: T,
    pub layout: Layout,
    pub module_count: usize,
    pub version: Option<i16>,
    /// Dot color against the background; advisory only.
    pub risk: RiskReport,
    pub logo_applied: bool,
}

pub fn generate(config: &StyleConfig, logo: Option<&DecodedImage>) -> Result<Rendered> {
    config.validate()?;
    let symbol = encoder::encode(&config.payload, config.error_correction_level)?;
    compose(&symbol, config, logo, compositor::render)
}

/// Like [`generate`], reusing a cached symbol when the payload and level
/// were seen before.
pub fn generate_with_cache(
    cache: &SymbolCache,
    config: &StyleConfig,
    logo: Option<&DecodedImage>,
) -> Result<Rendered> {
    config.validate()?;
    let symbol = cached_symbol(cache, config)?;
    compose(&symbol, config, logo, compositor::render)
}

pub fn generate_svg_with_cache(
    cache: &SymbolCache,
    config: &StyleConfig,
    logo: Option<&DecodedImage>,
) -> Result<Rendered<String>> {
    config.validate()?;
    let symbol = cached_symbol(cache, config)?;
    compose(&symbol, config, logo, compositor::render_svg)
}

pub fn generate_png(config: &StyleConfig, logo: Option<&DecodedImage>) -> Result<Vec<u8>> {
    generate(config, logo)?.image.encode(ExportFormat::Png)
}

pub fn generate_svg(config: &StyleConfig, logo: Option<&DecodedImage>) -> Result<String> {
    config.validate()?;
    let symbol = encoder::encode(&config.payload, config.error_correction_level)?;
    Ok(compose(&symbol, config, logo, compositor::render_svg)?.image)
}

fn cached_symbol(cache: &SymbolCache, config: &StyleConfig) -> Result<Arc<EncodedSymbol>> {
    Ok(cache.get_or_encode(&config.payload, config.error_correction_level)?)
}

fn compose<T, F>(
    symbol: &EncodedSymbol,
    config: &StyleConfig,
    logo: Option<&DecodedImage>,
    paint: F,
) -> Result<Rendered<T>>
where
    F: FnOnce(&EncodedSymbol, &Layout, &StyleConfig, Option<&DecodedImage>) -> Result<T>,
{
    let layout = Layout::resolve(symbol.size(), config)?;

    let risk = contrast::analyze(config.dots.color, config.background.color);
    if risk.tier == RiskTier::Risky {
        log::warn!(
            "low contrast between {} and {} (ratio {:.2}), scanners may struggle",
            config.dots.color,
            config.background.color,
            risk.ratio
        );
    }

    let image = paint(symbol, &layout, config, logo)?;
    Ok(Rendered {
        image,
        module_count: layout.module_count,
        layout,
        version: symbol.version(),
        risk,
        logo_applied: compositor::logo_active(config, logo),
    })
}
