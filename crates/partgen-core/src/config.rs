use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::location::{DEFAULT_PRECISION, round_to};
use crate::units::Unit;

const FONT_FAMILY: &str = "DroidSans";
const FONT_SIZE_MM: f64 = 1.62;
/// Socket radius relative to the pin pitch.
const SOCKET_RADIUS_RATIO: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    pub background: String,
    pub foreground: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: "#d0d0d0".to_string(),
            foreground: "#000000".to_string(),
        }
    }
}

/// Rendering parameters fixed when a board is created.
///
/// Every renderer receives the board's config by reference; nothing here is
/// global, so boards in different units can be generated side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub unit: Unit,
    pub scale_factor: f64,
    pub precision: u32,
    pub font_family: String,
    pub font_size: f64,
    pub socket_radius: f64,
    pub palette: Palette,
}

impl RenderConfig {
    pub fn new(unit: Unit, pitch: f64) -> Result<Self, Error> {
        if !(pitch.is_finite() && pitch > 0.0) {
            return Err(Error::invalid_input(
                "pitch",
                format!("must be a positive number, got {pitch}"),
            ));
        }
        let scale_factor = unit.scale_factor();
        let precision = DEFAULT_PRECISION;
        Ok(Self {
            unit,
            scale_factor,
            precision,
            font_family: FONT_FAMILY.to_string(),
            font_size: round_to(FONT_SIZE_MM * scale_factor, precision),
            socket_radius: round_to(pitch * SOCKET_RADIUS_RATIO, precision),
            palette: Palette::default(),
        })
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.palette.background = background.into();
        self
    }

    #[must_use]
    pub fn round(&self, value: f64) -> f64 {
        round_to(value, self.precision)
    }

    /// Convert a constant defined in millimeters into the board's unit.
    #[must_use]
    pub fn scaled(&self, mm: f64) -> f64 {
        self.round(mm * self.scale_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn inch_board_scales_shared_constants() {
        let cfg = RenderConfig::new(Unit::Inch, 0.1).unwrap();
        assert_abs_diff_eq!(cfg.font_size, 0.064, epsilon = 1e-12);
        assert_abs_diff_eq!(cfg.socket_radius, 0.015, epsilon = 1e-12);
        assert_abs_diff_eq!(cfg.scaled(0.3), 0.012, epsilon = 1e-12);
    }

    #[test]
    fn mm_board_keeps_constants() {
        let cfg = RenderConfig::new(Unit::Millimeter, 2.54).unwrap();
        assert_eq!(cfg.font_size, 1.62);
        assert_eq!(cfg.socket_radius, 0.381);
        assert_eq!(cfg.scaled(0.1), 0.1);
    }

    #[test]
    fn rejects_non_positive_pitch() {
        assert!(RenderConfig::new(Unit::Millimeter, 0.0).is_err());
        assert!(RenderConfig::new(Unit::Millimeter, f64::NAN).is_err());
    }
}
