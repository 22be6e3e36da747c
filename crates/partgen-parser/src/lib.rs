//! Board definitions in YAML, turned into a [`Board`] plus the descriptor
//! metadata the exporter needs.

pub mod config;
pub mod error;

use partgen_export::PartMetadata;
use partgen_export::xml::is_element_name;
use partgen_layout::{Board, Bus, DecorationLayer, PinSpec};
use tracing::debug;

pub use config::RawBoard;
pub use error::ParseError;

use config::{NumberLine, RawKind, RawPin};

/// Breadboards default to this many pitches tall.
const BREADBOARD_ROWS: f64 = 27.0;

/// A fully built board ready for export.
#[derive(Debug, Clone)]
pub struct PartDefinition {
    pub board: Board,
    pub metadata: PartMetadata,
}

impl PartDefinition {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ParseError> {
        let raw: RawBoard = serde_yaml::from_str(yaml)?;
        Self::from_raw(&raw)
    }

    pub fn from_raw(raw: &RawBoard) -> Result<Self, ParseError> {
        let board = match raw.kind {
            RawKind::Breadboard => build_breadboard(raw)?,
            RawKind::Microcontroller => build_microcontroller(raw)?,
        };
        let metadata = build_metadata(raw)?;
        debug!(
            board = board.name(),
            kind = raw.kind.as_str(),
            pins = board.catalog().len(),
            "loaded board definition"
        );
        Ok(Self { board, metadata })
    }
}

fn missing(kind: RawKind, field: &'static str) -> ParseError {
    ParseError::MissingField {
        kind: kind.as_str(),
        field,
    }
}

fn reject(kind: RawKind, field: &'static str, present: bool) -> Result<(), ParseError> {
    if present {
        return Err(ParseError::UnexpectedField {
            kind: kind.as_str(),
            field,
        });
    }
    Ok(())
}

fn pin_spec(raw: Option<&RawPin>) -> Result<PinSpec, ParseError> {
    Ok(match raw {
        None => PinSpec::unused(),
        Some(RawPin::Bare(name)) | Some(RawPin::Full { name, at: None }) => PinSpec::named(name),
        Some(RawPin::Pair(name, at)) | Some(RawPin::Full { name, at: Some(at) }) => PinSpec::parse(name, at)?,
    })
}

fn build_microcontroller(raw: &RawBoard) -> Result<Board, ParseError> {
    let kind = RawKind::Microcontroller;
    reject(kind, "pins_per_row", raw.pins_per_row.is_some())?;
    reject(kind, "layout", !raw.layout.is_empty())?;
    reject(kind, "bus_groups", !raw.bus_groups.is_empty())?;
    reject(kind, "icon_text", raw.icon_text.is_some())?;
    reject(kind, "outer_group_size", raw.outer_group_size.is_some())?;

    let [pitch_x, pitch_y] = raw.pitch.xy();
    if pitch_x != pitch_y {
        return Err(partgen_core::Error::invalid_input(
            "pitch",
            "microcontroller boards use one pitch for both axes",
        )
        .into());
    }
    let width = raw.width.ok_or_else(|| missing(kind, "width"))?;
    let height = raw.height.ok_or_else(|| missing(kind, "height"))?;
    let mut board = Board::microcontroller(&raw.name, raw.unit, width, height, pitch_x)?;
    if let Some(colors) = &raw.colors {
        board = board.with_palette(colors.clone());
    }

    for row in &raw.rows {
        let pins = row
            .pins
            .iter()
            .map(|p| pin_spec(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let step = row.step.unwrap_or([pitch_x, 0.0]);
        board.add_pin_row(&row.name, row.origin, step, pins)?;
    }
    if let Some(grid) = raw.schematic {
        board.set_schematic_grid(grid)?;
    }
    for (layer, decorations) in [
        (DecorationLayer::Texts, &raw.texts),
        (DecorationLayer::Graphics, &raw.graphics),
        (DecorationLayer::Icon, &raw.icon),
    ] {
        for deco in decorations {
            board.decorate(layer, deco.clone())?;
        }
    }
    for bus in &raw.buses {
        board.declare_bus(Bus::new(bus.id.clone(), bus.members.clone()))?;
    }
    Ok(board)
}

fn build_breadboard(raw: &RawBoard) -> Result<Board, ParseError> {
    let kind = RawKind::Breadboard;
    reject(kind, "rows", !raw.rows.is_empty())?;
    reject(kind, "schematic", raw.schematic.is_some())?;
    reject(kind, "texts", !raw.texts.is_empty())?;
    reject(kind, "graphics", !raw.graphics.is_empty())?;
    reject(kind, "icon", !raw.icon.is_empty())?;
    reject(kind, "buses", !raw.buses.is_empty())?;

    let pins = raw.pins_per_row.ok_or_else(|| missing(kind, "pins_per_row"))?;
    if raw.layout.is_empty() {
        return Err(missing(kind, "layout"));
    }
    let pitch = raw.pitch.xy();
    let width = raw.width.unwrap_or((pins as f64 + 3.0) * pitch[0]);
    let height = raw.height.unwrap_or(BREADBOARD_ROWS * pitch[1]);
    let mut board = Board::breadboard(&raw.name, raw.unit, width, height, pins, pitch)?;
    if let Some(colors) = &raw.colors {
        board = board.with_palette(colors.clone());
    }
    if let Some(size) = raw.outer_group_size {
        board.set_outer_group_size(size)?;
    }

    let left = raw.left.unwrap_or(pitch[0]);
    let mut y = raw.top.unwrap_or(pitch[1]);
    for (index, entry) in raw.layout.iter().enumerate() {
        y = match (&entry.outer, &entry.inner) {
            (Some(names), None) if entry.numbers.is_empty() => board.add_outer_rows(names, left, y)?,
            (None, Some(names)) => board.add_inner_rows(
                names,
                left,
                y,
                entry.numbers.contains(&NumberLine::Before),
                entry.numbers.contains(&NumberLine::After),
            )?,
            _ => return Err(ParseError::LayoutEntry { index }),
        };
    }

    let mut groups = Vec::with_capacity(raw.bus_groups.len());
    for group in &raw.bus_groups {
        let rows: Vec<String> = group.chars().map(String::from).collect();
        if let Some(unknown) = rows.iter().find(|r| board.catalog().row(r).is_none()) {
            return Err(ParseError::UnknownRow {
                name: unknown.clone(),
            });
        }
        groups.push(rows);
    }
    board.set_bus_groups(groups)?;
    if let Some(text) = &raw.icon_text {
        board.set_icon_text(text.clone())?;
    }
    Ok(board)
}

fn scalar(key: &str, value: &serde_yaml::Value) -> Result<String, ParseError> {
    match value {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ParseError::NonScalar {
            key: key.to_string(),
        }),
    }
}

fn build_metadata(raw: &RawBoard) -> Result<PartMetadata, ParseError> {
    let part = &raw.part;
    let mut metadata = PartMetadata {
        module_id: part.module_id.clone(),
        tags: part.tags.clone(),
        ..PartMetadata::default()
    };
    if let Some(version) = &part.fritzing_version {
        metadata.fritzing_version = version.clone();
    }
    for (key, value) in &part.meta {
        if !is_element_name(key) {
            return Err(ParseError::InvalidMetaKey { key: key.clone() });
        }
        metadata.meta.insert(key.clone(), scalar(key, value)?);
    }
    for (key, value) in &part.properties {
        metadata.properties.insert(key.clone(), scalar(key, value)?);
    }
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use partgen_layout::{RowSelection, SchematicAnchor, SchematicSide};

    const MICRO: &str = r##"
name: Tiny
kind: microcontroller
unit: mm
pitch: 2.54
width: 20
height: 10
rows:
  - name: upper
    origin: [1.27, 1.27]
    pins:
      - [D1, r1]
      - ~
      - {name: GND-2, at: oGND}
      - NC
  - name: lower
    origin: [1.27, 8.89]
    pins:
      - [GND, b2]
part:
  meta:
    version: 1
    title: Tiny board
  tags: [tiny]
  properties:
    family: Tiny
"##;

    #[test]
    fn parses_microcontroller_rows() {
        let part = PartDefinition::from_yaml_str(MICRO).unwrap();
        let catalog = part.board.catalog();
        assert_eq!(catalog.len(), 4);
        let alias = catalog.find_pin("GND-2").unwrap();
        assert_eq!(
            alias.schematic,
            Some(SchematicAnchor::Alias {
                target: "GND".into()
            })
        );
        assert!(catalog.find_pin("NC").unwrap().schematic.is_none());
        assert_abs_diff_eq!(catalog.find_pin("GND-2").unwrap().x(), 6.35, epsilon = 1e-9);
        assert_eq!(
            catalog.find_pin("GND").unwrap().schematic,
            Some(SchematicAnchor::Grid {
                side: SchematicSide::Bottom,
                index: 2
            })
        );
        assert_eq!(catalog.named_pins(RowSelection::All).count(), 4);
        assert_eq!(part.metadata.meta["version"], "1");
        assert_eq!(part.metadata.tags, ["tiny"]);
        assert_eq!(part.metadata.module_id_for(&part.board), "TinyModuleID");
    }

    #[test]
    fn bad_schematic_position_is_reported() {
        let yaml = MICRO.replace("[D1, r1]", "[D1, x1]");
        let err = PartDefinition::from_yaml_str(&yaml).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Part(partgen_core::Error::InvalidSchematicPosition { .. })
        ));
    }

    #[test]
    fn breadboard_defaults_follow_pin_count() {
        let yaml = r#"
name: Small
kind: breadboard
unit: in
pitch: 0.1
pins_per_row: 30
layout:
  - outer: ZY
  - inner: EDCBA
    numbers: [before, after]
bus_groups: [ABCDE]
"#;
        let part = PartDefinition::from_yaml_str(yaml).unwrap();
        assert_abs_diff_eq!(part.board.width(), 3.3, epsilon = 1e-9);
        assert_abs_diff_eq!(part.board.height(), 2.7, epsilon = 1e-9);
        let layout = part.board.breadboard_layout().unwrap();
        assert_eq!(layout.numbering_rows().len(), 2);
        assert_eq!(layout.bus_groups().len(), 1);
    }

    #[test]
    fn bus_group_with_unknown_row_fails() {
        let yaml = r#"
name: Small
kind: breadboard
unit: in
pitch: 0.1
pins_per_row: 10
layout:
  - inner: BA
bus_groups: [ABC]
"#;
        let err = PartDefinition::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ParseError::UnknownRow { ref name } if name == "C"));
    }

    #[test]
    fn layout_entry_needs_exactly_one_kind() {
        let yaml = r#"
name: Small
kind: breadboard
unit: in
pitch: 0.1
pins_per_row: 10
layout:
  - outer: ZY
    inner: A
"#;
        let err = PartDefinition::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ParseError::LayoutEntry { index: 0 }));
    }

    #[test]
    fn meta_key_with_a_space_is_rejected() {
        let yaml = r#"
name: Small
kind: breadboard
unit: in
pitch: 0.1
pins_per_row: 10
layout:
  - inner: BA
part:
  meta:
    my key: 1
"#;
        let err = PartDefinition::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ParseError::InvalidMetaKey { ref key } if key == "my key"));
    }

    #[test]
    fn absurd_pin_count_is_an_error() {
        let yaml = r#"
name: Huge
kind: breadboard
unit: in
pitch: 0.1
pins_per_row: 18446744073709551615
layout:
  - inner: A
"#;
        let err = PartDefinition::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ParseError::Part(partgen_core::Error::InvalidInput { .. })));
    }
}
