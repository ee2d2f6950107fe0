use thiserror::Error;

use crate::config::ErrorCorrectionLevel;

/// Failures of the external symbol encoder.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodeError {
    #[error("payload of {len} bytes exceeds QR capacity at error-correction level {level}")]
    CapacityExceeded {
        level: ErrorCorrectionLevel,
        len: usize,
    },

    #[error("QR encoding error: {0}")]
    Other(String),
}

/// Degenerate geometry; fatal for the render call that hit it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("symbol of {0} modules is too small to hold finder patterns")]
    TooFewModules(usize),

    #[error("resolution {resolution}px cannot fit {modules} modules plus quiet zone")]
    ResolutionTooLow { resolution: u32, modules: usize },
}

/// Logo loading errors. Never surfaced by a render: the loader turns them
/// into "no logo".
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid base64 logo data: {0}")]
    InvalidBase64(String),

    #[error("logo of {0} bytes exceeds the {max} byte limit", max = crate::logo::MAX_LOGO_BYTES)]
    TooLarge(usize),

    #[error("unsupported logo image: {0}")]
    UnsupportedImage(String),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("surface error: {0}")]
    Surface(String),

    #[error("image export error: {0}")]
    Export(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
