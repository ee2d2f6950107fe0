use crate::config::StyleConfig;
use crate::error::LayoutError;

/// Canvas resolution the module size is derived from.
pub const TARGET_RESOLUTION: u32 = 2048;
/// Quiet zone width in modules, per side.
pub const QUIET_ZONE_MODULES: u32 = 6;
/// Side of a finder pattern in modules.
pub const FINDER_MODULES: usize = 7;

/// Which of the three finder patterns a shape belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinderPosition {
    TopLeft,
    TopRight,
    BottomLeft,
}

impl FinderPosition {
    pub const ALL: [FinderPosition; 3] = [
        FinderPosition::TopLeft,
        FinderPosition::TopRight,
        FinderPosition::BottomLeft,
    ];
}

/// Pixel geometry of one render.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub module_count: usize,
    pub pixel_size: u32,
    pub margin: u32,
    pub total_size: u32,
    pub center: f32,
    /// Side (or diameter) of the logo plate.
    pub logo_area: f32,
    /// Data modules whose center lies closer than this to `center` are
    /// skipped while a logo is shown.
    pub logo_exclusion_radius: f32,
}

impl Layout {
    pub fn resolve(module_count: usize, config: &StyleConfig) -> Result<Layout, LayoutError> {
        Self::resolve_with_resolution(module_count, config, TARGET_RESOLUTION)
    }

    pub fn resolve_with_resolution(
        module_count: usize,
        config: &StyleConfig,
        resolution: u32,
    ) -> Result<Layout, LayoutError> {
        if module_count < FINDER_MODULES {
            return Err(LayoutError::TooFewModules(module_count));
        }

        let span = u32::try_from(module_count)
            .ok()
            .and_then(|m| m.checked_add(QUIET_ZONE_MODULES * 2))
            .ok_or(LayoutError::ResolutionTooLow {
                resolution,
                modules: module_count,
            })?;
        let pixel_size = resolution / span;
        if pixel_size == 0 {
            return Err(LayoutError::ResolutionTooLow {
                resolution,
                modules: module_count,
            });
        }

        let margin = pixel_size * QUIET_ZONE_MODULES;
        let total_size = span * pixel_size;
        let logo_area = config.logo.size_fraction * total_size as f32;

        Ok(Layout {
            module_count,
            pixel_size,
            margin,
            total_size,
            center: total_size as f32 / 2.0,
            logo_area,
            logo_exclusion_radius: (logo_area + pixel_size as f32 * 1.5) / 2.0,
        })
    }

    /// Pixel center of module `(row, col)`.
    pub fn module_center(&self, row: usize, col: usize) -> (f32, f32) {
        let p = self.pixel_size as f32;
        let m = self.margin as f32;
        (m + col as f32 * p + p / 2.0, m + row as f32 * p + p / 2.0)
    }

    /// Top-left pixel of a finder pattern's 7x7 footprint.
    pub fn finder_origin(&self, position: FinderPosition) -> (f32, f32) {
        let m = self.margin as f32;
        let far = m + ((self.module_count - FINDER_MODULES) as u32 * self.pixel_size) as f32;
        match position {
            FinderPosition::TopLeft => (m, m),
            FinderPosition::TopRight => (far, m),
            FinderPosition::BottomLeft => (m, far),
        }
    }

    /// Hard rectangular check against the three 7x7 finder footprints.
    pub fn is_finder_module(&self, row: usize, col: usize) -> bool {
        let far = self.module_count - FINDER_MODULES;
        (row < FINDER_MODULES && col < FINDER_MODULES)
            || (row < FINDER_MODULES && col >= far)
            || (row >= far && col < FINDER_MODULES)
    }

    pub fn distance_from_center(&self, x: f32, y: f32) -> f32 {
        (x - self.center).hypot(y - self.center)
    }

    /// Circular check from the exact canvas center.
    pub fn in_logo_exclusion(&self, x: f32, y: f32) -> bool {
        self.distance_from_center(x, y) < self.logo_exclusion_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(fraction: f32) -> StyleConfig {
        let mut cfg = StyleConfig::new("layout");
        cfg.logo.size_fraction = fraction;
        cfg
    }

    #[test]
    fn version_three_geometry() {
        let layout = Layout::resolve(29, &config(0.2)).unwrap();
        // 2048 / (29 + 12) = 49.95
        assert_eq!(layout.pixel_size, 49);
        assert_eq!(layout.margin, 294);
        assert_eq!(layout.total_size, 29 * 49 + 2 * 294);
        assert_eq!(layout.center, layout.total_size as f32 / 2.0);
        let expected_area = 0.2 * layout.total_size as f32;
        assert!((layout.logo_area - expected_area).abs() < 1e-3);
        assert!((layout.logo_exclusion_radius - (expected_area + 73.5) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn degenerate_inputs_fail() {
        assert_eq!(
            Layout::resolve(5, &config(0.2)),
            Err(LayoutError::TooFewModules(5))
        );
        assert_eq!(
            Layout::resolve_with_resolution(177, &config(0.2), 100),
            Err(LayoutError::ResolutionTooLow {
                resolution: 100,
                modules: 177
            })
        );
        // Exactly one pixel per module is still valid.
        let layout = Layout::resolve_with_resolution(21, &config(0.2), 33).unwrap();
        assert_eq!(layout.pixel_size, 1);
    }

    #[test]
    fn finder_footprints_are_rectangular() {
        let layout = Layout::resolve(21, &config(0.2)).unwrap();
        assert!(layout.is_finder_module(0, 0));
        assert!(layout.is_finder_module(6, 6));
        assert!(!layout.is_finder_module(7, 7));
        assert!(!layout.is_finder_module(6, 7));
        assert!(layout.is_finder_module(0, 14));
        assert!(!layout.is_finder_module(0, 13));
        assert!(layout.is_finder_module(20, 6));
        assert!(!layout.is_finder_module(20, 20));
        assert!(!layout.is_finder_module(10, 10));
    }

    #[test]
    fn finder_origins() {
        let layout = Layout::resolve(21, &config(0.2)).unwrap();
        let m = layout.margin as f32;
        let far = m + (14 * layout.pixel_size) as f32;
        assert_eq!(layout.finder_origin(FinderPosition::TopLeft), (m, m));
        assert_eq!(layout.finder_origin(FinderPosition::TopRight), (far, m));
        assert_eq!(layout.finder_origin(FinderPosition::BottomLeft), (m, far));
    }

    #[test]
    fn logo_exclusion_is_circular() {
        let layout = Layout::resolve(41, &config(0.2)).unwrap();
        let c = layout.center;
        let r = layout.logo_exclusion_radius;
        assert!(layout.in_logo_exclusion(c, c));
        assert!(layout.in_logo_exclusion(c + r * 0.99, c));
        assert!(!layout.in_logo_exclusion(c + r, c));
        // A bounding box would include this diagonal point, the disk does not.
        assert!(!layout.in_logo_exclusion(c + r * 0.9, c + r * 0.9));
    }

    #[test]
    fn central_module_center_is_canvas_center() {
        let layout = Layout::resolve(21, &config(0.2)).unwrap();
        assert_eq!(layout.module_center(10, 10), (layout.center, layout.center));
    }
}
