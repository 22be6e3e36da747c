use std::fmt;

use indexmap::IndexMap;
use partgen_core::{Error, Location, LocationList};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Side of the schematic symbol a pin is drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchematicSide {
    Left,
    Top,
    Right,
    Bottom,
}

impl SchematicSide {
    fn from_letter(c: char) -> Option<Self> {
        match c {
            'l' => Some(Self::Left),
            't' => Some(Self::Top),
            'r' => Some(Self::Right),
            'b' => Some(Self::Bottom),
            _ => None,
        }
    }

    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Left => 'l',
            Self::Top => 't',
            Self::Right => 'r',
            Self::Bottom => 'b',
        }
    }
}

/// Where a pin shows up on the schematic view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchematicAnchor {
    /// Drawn on `side` at grid step `index`.
    Grid { side: SchematicSide, index: u32 },
    /// Same node as the pin named `target`; drawn at that pin's anchor.
    Alias { target: String },
}

impl SchematicAnchor {
    /// Parse the compact notation: `r5` is the right side at grid step 5,
    /// `oGND` means "represented by the pin named GND".
    pub fn parse(pin: &str, value: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidSchematicPosition {
            pin: pin.to_string(),
            value: value.to_string(),
        };
        let mut chars = value.chars();
        let side = chars.next().ok_or_else(invalid)?;
        let rest = chars.as_str();
        if side == 'o' {
            if rest.is_empty() {
                return Err(invalid());
            }
            return Ok(Self::Alias {
                target: rest.to_string(),
            });
        }
        let side = SchematicSide::from_letter(side).ok_or_else(invalid)?;
        let index = rest.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::Grid { side, index })
    }

    #[must_use]
    pub fn alias_target(&self) -> Option<&str> {
        match self {
            Self::Alias { target } => Some(target),
            Self::Grid { .. } => None,
        }
    }
}

impl fmt::Display for SchematicAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid { side, index } => write!(f, "{}{index}", side.letter()),
            Self::Alias { target } => write!(f, "o{target}"),
        }
    }
}

/// Input for one slot of a row. `name: None` keeps the slot empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PinSpec {
    pub name: Option<String>,
    pub schematic: Option<SchematicAnchor>,
}

impl PinSpec {
    #[must_use]
    pub fn unused() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            schematic: None,
        }
    }

    #[must_use]
    pub fn at(name: impl Into<String>, side: SchematicSide, index: u32) -> Self {
        Self {
            name: Some(name.into()),
            schematic: Some(SchematicAnchor::Grid { side, index }),
        }
    }

    #[must_use]
    pub fn alias(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            schematic: Some(SchematicAnchor::Alias {
                target: target.into(),
            }),
        }
    }

    /// Named pin with a position in compact notation (`"r13"`, `"oGND"`).
    pub fn parse(name: impl Into<String>, position: &str) -> Result<Self, Error> {
        let name = name.into();
        let schematic = SchematicAnchor::parse(&name, position)?;
        Ok(Self {
            name: Some(name),
            schematic: Some(schematic),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pin {
    pub location: Location,
    pub name: Option<String>,
    pub schematic: Option<SchematicAnchor>,
}

impl Pin {
    #[must_use]
    pub fn x(&self) -> f64 {
        self.location.x()
    }

    #[must_use]
    pub fn y(&self) -> f64 {
        self.location.y()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn alias_target(&self) -> Option<&str> {
        self.schematic.as_ref().and_then(SchematicAnchor::alias_target)
    }

    #[must_use]
    pub fn is_alias(&self) -> bool {
        self.alias_target().is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// Header row of a microcontroller board.
    Pin,
    /// Power rail of a breadboard.
    Outer,
    /// Signal row of a breadboard.
    Inner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSelection {
    All,
    Outer,
    Inner,
}

impl RowSelection {
    #[must_use]
    pub fn matches(self, kind: RowKind) -> bool {
        match self {
            Self::All => true,
            Self::Outer => kind == RowKind::Outer,
            Self::Inner => kind == RowKind::Inner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub name: String,
    pub kind: RowKind,
    /// Offset between consecutive slots.
    pub step: [f64; 2],
    pub pins: Vec<Pin>,
}

impl Row {
    /// True when the slots advance mainly along y.
    #[must_use]
    pub fn is_vertical(&self) -> bool {
        self.step[1].abs() > self.step[0].abs()
    }

    pub fn named_pins(&self) -> impl Iterator<Item = &Pin> + '_ {
        self.pins.iter().filter(|p| p.name.is_some())
    }
}

/// All rows of a board plus a name index over their named pins.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PinCatalog {
    precision: u32,
    rows: Vec<Row>,
    #[serde(skip)]
    index: IndexMap<String, (usize, usize)>,
}

impl PinCatalog {
    #[must_use]
    pub fn new(precision: u32) -> Self {
        Self {
            precision,
            rows: Vec::new(),
            index: IndexMap::new(),
        }
    }

    /// Lay `specs` out from `origin` in steps of `step` and index the named ones.
    ///
    /// Either the whole row is registered or, on error, nothing is.
    pub fn register_row(
        &mut self,
        name: &str,
        kind: RowKind,
        origin: [f64; 2],
        step: [f64; 2],
        specs: Vec<PinSpec>,
    ) -> Result<(), Error> {
        if self.rows.iter().any(|r| r.name == name) {
            return Err(Error::invalid_input(
                "row name",
                format!("row \"{name}\" registered twice"),
            ));
        }
        let slots = LocationList::new(name, origin, step, specs.len(), self.precision)?;

        let mut fresh: Vec<&str> = Vec::new();
        for spec_name in specs.iter().filter_map(|s| s.name.as_deref()) {
            if self.index.contains_key(spec_name) || fresh.contains(&spec_name) {
                return Err(Error::DuplicateName {
                    name: spec_name.to_string(),
                });
            }
            fresh.push(spec_name);
        }

        let row_idx = self.rows.len();
        let mut pins = Vec::with_capacity(specs.len());
        for (pin_idx, (spec, location)) in specs.into_iter().zip(slots.locations()).enumerate() {
            if let Some(pin_name) = &spec.name {
                self.index.insert(pin_name.clone(), (row_idx, pin_idx));
            }
            pins.push(Pin {
                location,
                name: spec.name,
                schematic: spec.schematic,
            });
        }
        debug!(row = name, ?kind, slots = pins.len(), "registered row");
        self.rows.push(Row {
            name: name.to_string(),
            kind,
            step,
            pins,
        });
        Ok(())
    }

    #[must_use]
    pub fn find_pin(&self, name: &str) -> Option<&Pin> {
        let (row, pin) = *self.index.get(name)?;
        self.rows.get(row)?.pins.get(pin)
    }

    #[must_use]
    pub fn row(&self, name: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Rows in registration order.
    pub fn rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.rows.iter()
    }

    /// Rows matching `selection`, ordered by name.
    #[must_use]
    pub fn rows_sorted(&self, selection: RowSelection) -> Vec<&Row> {
        let mut rows: Vec<&Row> = self
            .rows
            .iter()
            .filter(|r| selection.matches(r.kind))
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    /// Every slot (named or not) of the selected rows, in registration order.
    pub fn pins(&self, selection: RowSelection) -> impl Iterator<Item = &Pin> + '_ {
        self.rows
            .iter()
            .filter(move |r| selection.matches(r.kind))
            .flat_map(|r| r.pins.iter())
    }

    pub fn named_pins(&self, selection: RowSelection) -> impl Iterator<Item = &Pin> + '_ {
        self.pins(selection).filter(|p| p.name.is_some())
    }

    /// Number of named pins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
