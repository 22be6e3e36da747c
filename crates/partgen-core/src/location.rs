use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Decimal digits kept for every coordinate unless a board asks otherwise.
pub const DEFAULT_PRECISION: u32 = 3;

/// Round `value` to `digits` decimal places.
///
/// This is the only rounding routine used for coordinates, so values derived
/// twice (e.g. the last slot of a row) compare bit-identical.
#[must_use]
pub fn round_to(value: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    let rounded = (value * factor).round() / factor;
    // Normalizes -0.0 so it never reaches the SVG output.
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// A named position on the part, in the board's unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    x: f64,
    y: f64,
    name: String,
}

impl Location {
    #[must_use]
    pub fn new(x: f64, y: f64, name: impl Into<String>, precision: u32) -> Self {
        Self {
            x: round_to(x, precision),
            y: round_to(y, precision),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn x(&self) -> f64 {
        self.x
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Description of `count` equally spaced locations starting at `origin`.
///
/// Locations are computed on demand and are a pure function of the fields, so
/// iterating twice yields the same sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationList {
    name: String,
    origin: [f64; 2],
    step: [f64; 2],
    count: usize,
    precision: u32,
}

impl LocationList {
    pub fn new(
        name: impl Into<String>,
        origin: [f64; 2],
        step: [f64; 2],
        count: usize,
        precision: u32,
    ) -> Result<Self, Error> {
        let name = name.into();
        if count == 0 {
            return Err(Error::invalid_input(
                format!("location count for \"{name}\""),
                "must be greater than zero",
            ));
        }
        if !origin.iter().chain(step.iter()).all(|v| v.is_finite()) {
            return Err(Error::invalid_input(
                format!("origin/step for \"{name}\""),
                "coordinates must be finite",
            ));
        }
        Ok(Self {
            name,
            origin: [round_to(origin[0], precision), round_to(origin[1], precision)],
            step,
            count,
            precision,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// The location at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Location> {
        if index >= self.count {
            return None;
        }
        let i = index as f64;
        Some(Location::new(
            self.origin[0] + self.step[0] * i,
            self.origin[1] + self.step[1] * i,
            format!("{}{index}", self.name),
            self.precision,
        ))
    }

    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        (0..self.count).filter_map(move |i| self.get(i))
    }
}

/// Eagerly generate a row of `count` locations named `name0..name{count-1}`.
pub fn generate_row(
    name: &str,
    origin: [f64; 2],
    step: [f64; 2],
    count: usize,
    precision: u32,
) -> Result<Vec<Location>, Error> {
    Ok(LocationList::new(name, origin, step, count, precision)?
        .locations()
        .collect())
}
