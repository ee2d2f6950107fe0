//! Perceptual contrast between dot and background colors.
//!
//! The ratio follows the WCAG relative-luminance formula. It is an advisory
//! scan-risk estimate: rendering never depends on it.

use serde::{Deserialize, Serialize};

use crate::color::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Excellent,
    Good,
    Risky,
}

impl RiskTier {
    /// Score shown next to the tier, out of 100.
    pub fn score(self) -> u8 {
        match self {
            RiskTier::Excellent => 100,
            RiskTier::Good => 85,
            RiskTier::Risky => 45,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub ratio: f64,
    pub tier: RiskTier,
    pub score: u8,
}

fn linearize(channel: u8) -> f64 {
    let v = channel as f64 / 255.0;
    if v <= 0.03928 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance in [0, 1]. Alpha is ignored.
pub fn relative_luminance(color: Color) -> f64 {
    0.2126 * linearize(color.r) + 0.7152 * linearize(color.g) + 0.0722 * linearize(color.b)
}

pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let l1 = relative_luminance(a);
    let l2 = relative_luminance(b);
    (l1.max(l2) + 0.05) / (l1.min(l2) + 0.05)
}

pub fn analyze(foreground: Color, background: Color) -> RiskReport {
    let ratio = contrast_ratio(foreground, background);
    let tier = if ratio > 7.0 {
        RiskTier::Excellent
    } else if ratio > 4.5 {
        RiskTier::Good
    } else {
        RiskTier::Risky
    };

    RiskReport {
        ratio,
        tier,
        score: tier.score(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::parse_hex_color;

    fn hex(s: &str) -> Color {
        parse_hex_color(s).unwrap()
    }

    #[test]
    fn black_on_white_is_excellent() {
        let report = analyze(hex("#000000"), hex("#ffffff"));
        assert!((report.ratio - 21.0).abs() < 1e-6);
        assert_eq!(report.tier, RiskTier::Excellent);
        assert_eq!(report.score, 100);
    }

    #[test]
    fn near_greys_are_risky() {
        let report = analyze(hex("#777777"), hex("#888888"));
        assert!(report.ratio < 1.5);
        assert_eq!(report.tier, RiskTier::Risky);
    }

    #[test]
    fn ratio_is_symmetric() {
        let a = hex("#6366f1");
        let b = hex("#ffffff");
        assert_eq!(contrast_ratio(a, b), contrast_ratio(b, a));
    }

    #[test]
    fn mid_grey_on_white_is_good() {
        let report = analyze(hex("#666666"), Color::WHITE);
        assert!(report.ratio > 4.5 && report.ratio <= 7.0, "ratio {}", report.ratio);
        assert_eq!(report.tier, RiskTier::Good);
        assert_eq!(report.score, 85);
    }

    #[test]
    fn identical_colors_have_unit_ratio() {
        let report = analyze(Color::WHITE, Color::WHITE);
        assert!((report.ratio - 1.0).abs() < 1e-9);
        assert_eq!(report.tier, RiskTier::Risky);
    }
}
