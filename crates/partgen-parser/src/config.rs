//! Raw shape of a board definition file.

use indexmap::IndexMap;
use partgen_core::{Palette, Unit};
use partgen_layout::{Decoration, SchematicGrid};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RawKind {
    Breadboard,
    Microcontroller,
}

impl RawKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            RawKind::Breadboard => "breadboard",
            RawKind::Microcontroller => "microcontroller",
        }
    }
}

/// `2.54` or `[0.1, 0.1]`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPitch {
    Uniform(f64),
    Split([f64; 2]),
}

impl RawPitch {
    #[must_use]
    pub fn xy(self) -> [f64; 2] {
        match self {
            RawPitch::Uniform(p) => [p, p],
            RawPitch::Split(xy) => xy,
        }
    }
}

/// One row slot: `~`, `NAME`, `[NAME, r5]` or `{name: NAME, at: r5}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPin {
    Pair(String, String),
    Full {
        name: String,
        #[serde(default)]
        at: Option<String>,
    },
    Bare(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRow {
    pub name: String,
    pub origin: [f64; 2],
    /// Defaults to one pitch to the right.
    #[serde(default)]
    pub step: Option<[f64; 2]>,
    pub pins: Vec<Option<RawPin>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberLine {
    Before,
    After,
}

/// One block of a breadboard, top to bottom: two rails or a run of signal rows.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLayoutEntry {
    #[serde(default)]
    pub outer: Option<String>,
    #[serde(default)]
    pub inner: Option<String>,
    #[serde(default)]
    pub numbers: Vec<NumberLine>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawBus {
    pub id: String,
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawPart {
    pub module_id: Option<String>,
    pub fritzing_version: Option<String>,
    pub meta: IndexMap<String, serde_yaml::Value>,
    pub tags: Vec<String>,
    pub properties: IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawBoard {
    pub name: String,
    pub kind: RawKind,
    pub unit: Unit,
    pub pitch: RawPitch,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub colors: Option<Palette>,

    // Microcontroller boards.
    #[serde(default)]
    pub rows: Vec<RawRow>,
    #[serde(default)]
    pub schematic: Option<SchematicGrid>,
    #[serde(default)]
    pub texts: Vec<Decoration>,
    #[serde(default)]
    pub graphics: Vec<Decoration>,
    #[serde(default)]
    pub icon: Vec<Decoration>,
    #[serde(default)]
    pub buses: Vec<RawBus>,

    // Breadboards.
    #[serde(default)]
    pub pins_per_row: Option<usize>,
    #[serde(default)]
    pub left: Option<f64>,
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub layout: Vec<RawLayoutEntry>,
    #[serde(default)]
    pub bus_groups: Vec<String>,
    #[serde(default)]
    pub outer_group_size: Option<usize>,
    #[serde(default)]
    pub icon_text: Option<String>,

    #[serde(default)]
    pub part: RawPart,
}
