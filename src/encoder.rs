use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode, Version};

use crate::config::ErrorCorrectionLevel;
use crate::error::EncodeError;

impl From<ErrorCorrectionLevel> for EcLevel {
    fn from(level: ErrorCorrectionLevel) -> Self {
        match level {
            ErrorCorrectionLevel::L => EcLevel::L,
            ErrorCorrectionLevel::M => EcLevel::M,
            ErrorCorrectionLevel::Q => EcLevel::Q,
            ErrorCorrectionLevel::H => EcLevel::H,
        }
    }
}

/// Square module grid produced by the encoder. Row-major, `true` is dark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSymbol {
    size: usize,
    modules: Vec<bool>,
    version: Option<i16>,
    level: ErrorCorrectionLevel,
}

impl EncodedSymbol {
    /// Build a symbol from a raw grid. `modules.len()` must be `size * size`.
    pub fn from_modules(size: usize, modules: Vec<bool>, level: ErrorCorrectionLevel) -> Option<Self> {
        if modules.len() != size * size {
            return None;
        }
        Some(EncodedSymbol {
            size,
            modules,
            version: None,
            level,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Out-of-range coordinates read as light.
    pub fn is_dark(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.modules[row * self.size + col]
    }

    /// QR version (1-40) when produced by the encoder.
    pub fn version(&self) -> Option<i16> {
        self.version
    }

    pub fn level(&self) -> ErrorCorrectionLevel {
        self.level
    }

    pub fn dark_count(&self) -> usize {
        self.modules.iter().filter(|&&m| m).count()
    }
}

pub fn encode(payload: &str, level: ErrorCorrectionLevel) -> Result<EncodedSymbol, EncodeError> {
    let code = QrCode::with_error_correction_level(payload, level.into()).map_err(|e| match e {
        QrError::DataTooLong => EncodeError::CapacityExceeded {
            level,
            len: payload.len(),
        },
        other => EncodeError::Other(other.to_string()),
    })?;

    let size = code.width();
    let modules = code
        .to_colors()
        .into_iter()
        .map(|c| c == qrcode::Color::Dark)
        .collect();
    let version = match code.version() {
        Version::Normal(v) => Some(v),
        Version::Micro(_) => None,
    };

    log::debug!(
        "encoded {} bytes at level {} into {}x{} modules",
        payload.len(),
        level,
        size,
        size
    );

    Ok(EncodedSymbol {
        size,
        modules,
        version,
        level,
    })
}
