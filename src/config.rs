use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{RenderError, Result};

/// Largest logo size (fraction of canvas width) accepted by validation.
/// Beyond it the occluded codewords approach what level H can repair.
pub const MAX_LOGO_FRACTION: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum ErrorCorrectionLevel {
    L,
    M,
    Q,
    H,
}

impl ErrorCorrectionLevel {
    /// Unknown levels fall back to H.
    pub fn parse(level: &str) -> Self {
        match level.trim().to_uppercase().as_str() {
            "L" => ErrorCorrectionLevel::L,
            "M" => ErrorCorrectionLevel::M,
            "Q" => ErrorCorrectionLevel::Q,
            _ => ErrorCorrectionLevel::H,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCorrectionLevel::L => "L",
            ErrorCorrectionLevel::M => "M",
            ErrorCorrectionLevel::Q => "Q",
            ErrorCorrectionLevel::H => "H",
        }
    }
}

impl fmt::Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declares a style enum whose wire form is a kebab-case identifier and
/// whose unknown identifiers fall back to `$fallback`.
macro_rules! style_enum {
    (
        $(#[$meta:meta])*
        $name:ident, fallback = $fallback:ident {
            $($variant:ident => $ident:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "&'static str")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn parse(s: &str) -> Self {
                match s.trim().to_lowercase().as_str() {
                    $($ident => $name::$variant,)+
                    _ => $name::$fallback,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $ident,)+
                }
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name::parse(&s)
            }
        }

        impl From<$name> for &'static str {
            fn from(v: $name) -> Self {
                v.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

impl From<String> for ErrorCorrectionLevel {
    fn from(s: String) -> Self {
        ErrorCorrectionLevel::parse(&s)
    }
}

impl From<ErrorCorrectionLevel> for &'static str {
    fn from(v: ErrorCorrectionLevel) -> Self {
        v.as_str()
    }
}

style_enum! {
    /// Shape of a data module.
    DotStyle, fallback = Square {
        Square => "square",
        Circle => "circle",
        Dot => "dot",
        Rounded => "rounded",
        Liquid => "liquid",
        Hexagon => "hexagon",
        Radial => "radial",
    }
}

style_enum! {
    /// Shape of the three finder patterns.
    CornerStyle, fallback = Square {
        Square => "square",
        Rounded => "rounded",
        ExtraRounded => "extra-rounded",
        Eye => "eye",
        EyeFancy => "eye-fancy",
        Dot => "dot",
        Leaf => "leaf",
        Shield => "shield",
        Ninja => "ninja",
        EyeAlmond => "eye-almond",
        SingleRounded => "single-rounded",
    }
}

style_enum! {
    /// Clip shape of the logo plate.
    LogoShape, fallback = RoundedSquare {
        Circle => "circle",
        Square => "square",
        RoundedSquare => "rounded-square",
        None => "none",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DotConfig {
    #[serde(default = "default_dot_style")]
    pub style: DotStyle,
    #[serde(default = "default_accent")]
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundConfig {
    #[serde(default = "default_background")]
    pub color: Color,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CornerConfig {
    #[serde(default = "default_corner_style")]
    pub style: CornerStyle,
    #[serde(default = "default_accent")]
    pub outer_color: Color,
    #[serde(default = "default_accent")]
    pub inner_color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoConfig {
    /// Logo image as a data URI (`data:image/png;base64,...`) or raw base64.
    #[serde(default)]
    pub image: Option<String>,
    /// Plate size as a fraction of the canvas width.
    #[serde(default = "default_logo_fraction")]
    pub size_fraction: f32,
    #[serde(default = "default_logo_shape")]
    pub shape: LogoShape,
    #[serde(default = "default_background")]
    pub background_color: Color,
    /// Paint the plate with the canvas background instead of `background_color`.
    #[serde(default = "default_true")]
    pub sync_background: bool,
    /// Replace the logo's colors with the dot color, keeping its alpha.
    #[serde(default = "default_true")]
    pub recolor: bool,
}

/// Full style of one render. Replaced wholesale on every edit; the renderer
/// only ever borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub payload: String,
    #[serde(default = "default_level")]
    pub error_correction_level: ErrorCorrectionLevel,
    #[serde(default)]
    pub dots: DotConfig,
    #[serde(default)]
    pub background: BackgroundConfig,
    #[serde(default)]
    pub corners: CornerConfig,
    #[serde(default)]
    pub logo: LogoConfig,
}

fn default_level() -> ErrorCorrectionLevel {
    ErrorCorrectionLevel::H
}
fn default_dot_style() -> DotStyle {
    DotStyle::Radial
}
fn default_corner_style() -> CornerStyle {
    CornerStyle::Eye
}
fn default_accent() -> Color {
    Color::rgb(0x63, 0x66, 0xf1)
}
fn default_background() -> Color {
    Color::WHITE
}
fn default_opacity() -> f32 {
    1.0
}
fn default_logo_fraction() -> f32 {
    0.22
}
fn default_logo_shape() -> LogoShape {
    LogoShape::RoundedSquare
}
fn default_true() -> bool {
    true
}

impl Default for DotConfig {
    fn default() -> Self {
        DotConfig {
            style: default_dot_style(),
            color: default_accent(),
        }
    }
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        BackgroundConfig {
            color: default_background(),
            opacity: default_opacity(),
        }
    }
}

impl Default for CornerConfig {
    fn default() -> Self {
        CornerConfig {
            style: default_corner_style(),
            outer_color: default_accent(),
            inner_color: default_accent(),
        }
    }
}

impl Default for LogoConfig {
    fn default() -> Self {
        LogoConfig {
            image: None,
            size_fraction: default_logo_fraction(),
            shape: default_logo_shape(),
            background_color: default_background(),
            sync_background: true,
            recolor: true,
        }
    }
}

impl StyleConfig {
    pub fn new(payload: impl Into<String>) -> Self {
        StyleConfig {
            payload: payload.into(),
            error_correction_level: default_level(),
            dots: DotConfig::default(),
            background: BackgroundConfig::default(),
            corners: CornerConfig::default(),
            logo: LogoConfig::default(),
        }
    }

    /// Reject configurations that would corrupt the symbol. Contrast is
    /// advisory and not checked here.
    pub fn validate(&self) -> Result<()> {
        if self.payload.is_empty() {
            return Err(RenderError::InvalidConfig("payload cannot be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.background.opacity) {
            return Err(RenderError::InvalidConfig(format!(
                "background opacity must be between 0 and 1, got {}",
                self.background.opacity
            )));
        }
        let fraction = self.logo.size_fraction;
        if !(fraction > 0.0 && fraction <= MAX_LOGO_FRACTION) {
            return Err(RenderError::InvalidConfig(format!(
                "logo size_fraction must be in (0, {}], got {}",
                MAX_LOGO_FRACTION, fraction
            )));
        }
        Ok(())
    }
}
