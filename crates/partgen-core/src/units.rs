use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

const MM_PER_INCH: f64 = 25.4;

/// Physical unit a board is laid out in. All coordinates of a board share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "in", alias = "inch")]
    Inch,
}

impl Unit {
    /// Factor converting a millimeter constant into this unit.
    #[must_use]
    pub fn scale_factor(self) -> f64 {
        match self {
            Unit::Millimeter => 1.0,
            Unit::Inch => 1.0 / MM_PER_INCH,
        }
    }

    /// Suffix used on SVG `width`/`height` attributes.
    #[must_use]
    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Millimeter => "mm",
            Unit::Inch => "in",
        }
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "mm" => Ok(Unit::Millimeter),
            "in" | "inch" => Ok(Unit::Inch),
            other => Err(Error::invalid_input(
                "unit",
                format!("expected \"mm\" or \"in\", got \"{other}\""),
            )),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_inch_aliases() {
        assert_eq!("in".parse::<Unit>().unwrap(), Unit::Inch);
        assert_eq!("inch".parse::<Unit>().unwrap(), Unit::Inch);
        assert_eq!("mm".parse::<Unit>().unwrap(), Unit::Millimeter);
        assert!("cm".parse::<Unit>().is_err());
    }

    #[test]
    fn inch_scale_converts_from_mm() {
        assert_relative_eq!(Unit::Inch.scale_factor() * 25.4, 1.0);
        assert_eq!(Unit::Millimeter.scale_factor(), 1.0);
    }
}
