use partgen_core::{Error, Palette, RenderConfig, Unit};
use serde::{Deserialize, Serialize};

use crate::breadboard::BreadboardLayout;
use crate::catalog::{PinCatalog, PinSpec, RowKind, SchematicAnchor, SchematicSide};
use crate::reconcile::{Bus, Reconciliation, reconcile};

/// Caller-drawn shape on a microcontroller board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Decoration {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        #[serde(default)]
        font_size: Option<f64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationLayer {
    /// Breadboard view, drawn above the pins.
    Texts,
    /// Breadboard view, drawn last.
    Graphics,
    /// Icon view.
    Icon,
}

/// Schematic symbol size, in pin steps. `outer` is the pin line length.
///
/// Anchors run from `0` to `width` (top and bottom) or `height` (left and
/// right), both ends included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchematicGrid {
    pub width: u32,
    pub height: u32,
    pub outer: u32,
}

impl SchematicGrid {
    const DEFAULT_OUTER: u32 = 3;

    /// Grid holding every anchored pin of `catalog`, with one free step past
    /// the last anchor on each side.
    #[must_use]
    pub fn fit(catalog: &PinCatalog) -> Self {
        let mut width = 0;
        let mut height = 0;
        for pin in catalog.named_pins(crate::catalog::RowSelection::All) {
            if let Some(SchematicAnchor::Grid { side, index }) = &pin.schematic {
                match side {
                    SchematicSide::Top | SchematicSide::Bottom => width = width.max(*index),
                    SchematicSide::Left | SchematicSide::Right => height = height.max(*index),
                }
            }
        }
        Self {
            width: width + 1,
            height: height + 1,
            outer: Self::DEFAULT_OUTER,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MicroLayout {
    pub schematic: Option<SchematicGrid>,
    pub texts: Vec<Decoration>,
    pub graphics: Vec<Decoration>,
    pub icon: Vec<Decoration>,
    pub buses: Vec<Bus>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoardKind {
    /// Passive socket board; connectors are female.
    Breadboard(BreadboardLayout),
    /// Active board with header pins; connectors are male.
    Microcontroller(MicroLayout),
}

/// One part being generated: its geometry, pins and rendering parameters.
#[derive(Debug, Clone)]
pub struct Board {
    name: String,
    config: RenderConfig,
    width: f64,
    height: f64,
    pitch: [f64; 2],
    pub(crate) catalog: PinCatalog,
    pub(crate) kind: BoardKind,
}

impl Board {
    fn new(
        name: &str,
        unit: Unit,
        size: [f64; 2],
        pitch: [f64; 2],
        kind: BoardKind,
    ) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(Error::invalid_input("board name", "must not be empty"));
        }
        for (what, v) in [("width", size[0]), ("height", size[1]), ("pitch", pitch[1])] {
            if !(v.is_finite() && v > 0.0) {
                return Err(Error::invalid_input(what, format!("must be positive, got {v}")));
            }
        }
        let config = RenderConfig::new(unit, pitch[0])?;
        Ok(Self {
            name: name.to_string(),
            width: config.round(size[0]),
            height: config.round(size[1]),
            catalog: PinCatalog::new(config.precision),
            config,
            pitch,
            kind,
        })
    }

    pub fn microcontroller(
        name: &str,
        unit: Unit,
        width: f64,
        height: f64,
        pitch: f64,
    ) -> Result<Self, Error> {
        Self::new(
            name,
            unit,
            [width, height],
            [pitch, pitch],
            BoardKind::Microcontroller(MicroLayout::default()),
        )
    }

    pub fn breadboard(
        name: &str,
        unit: Unit,
        width: f64,
        height: f64,
        pins_per_row: usize,
        pitch: [f64; 2],
    ) -> Result<Self, Error> {
        let layout = BreadboardLayout::new(pins_per_row)?;
        let board = Self::new(name, unit, [width, height], pitch, BoardKind::Breadboard(layout))?;
        Ok(board.with_background(BreadboardLayout::BACKGROUND))
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.config = self.config.with_palette(palette);
        self
    }

    #[must_use]
    pub fn with_background(mut self, background: &str) -> Self {
        self.config = self.config.with_background(background);
        self
    }

    /// File name root shared by all generated files.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn pitch_x(&self) -> f64 {
        self.pitch[0]
    }

    #[must_use]
    pub fn pitch_y(&self) -> f64 {
        self.pitch[1]
    }

    #[must_use]
    pub fn catalog(&self) -> &PinCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn kind(&self) -> &BoardKind {
        &self.kind
    }

    #[must_use]
    pub fn is_breadboard(&self) -> bool {
        matches!(self.kind, BoardKind::Breadboard(_))
    }

    #[must_use]
    pub fn micro(&self) -> Option<&MicroLayout> {
        match &self.kind {
            BoardKind::Microcontroller(m) => Some(m),
            BoardKind::Breadboard(_) => None,
        }
    }

    fn micro_mut(&mut self, what: &str) -> Result<&mut MicroLayout, Error> {
        match &mut self.kind {
            BoardKind::Microcontroller(m) => Ok(m),
            BoardKind::Breadboard(_) => Err(Error::invalid_input(
                what,
                "only available on microcontroller boards",
            )),
        }
    }

    /// Add a header row. Slots are `step` apart starting at `origin`.
    pub fn add_pin_row(
        &mut self,
        name: &str,
        origin: [f64; 2],
        step: [f64; 2],
        pins: Vec<PinSpec>,
    ) -> Result<(), Error> {
        self.micro_mut("pin row")?;
        self.catalog
            .register_row(name, RowKind::Pin, origin, step, pins)
    }

    pub fn decorate(&mut self, layer: DecorationLayer, decoration: Decoration) -> Result<(), Error> {
        let micro = self.micro_mut("decoration")?;
        match layer {
            DecorationLayer::Texts => micro.texts.push(decoration),
            DecorationLayer::Graphics => micro.graphics.push(decoration),
            DecorationLayer::Icon => micro.icon.push(decoration),
        }
        Ok(())
    }

    pub fn set_schematic_grid(&mut self, grid: SchematicGrid) -> Result<(), Error> {
        if grid.width == 0 || grid.height == 0 {
            return Err(Error::invalid_input(
                "schematic grid",
                "width and height must be at least one step",
            ));
        }
        self.micro_mut("schematic grid")?.schematic = Some(grid);
        Ok(())
    }

    /// Declare pins that are connected on the board itself.
    pub fn declare_bus(&mut self, bus: Bus) -> Result<(), Error> {
        if bus.members.len() < 2 {
            return Err(Error::invalid_input(
                format!("bus \"{}\"", bus.id),
                "needs at least two members",
            ));
        }
        let buses = &mut self.micro_mut("bus")?.buses;
        if buses.iter().any(|b| b.id == bus.id) {
            return Err(Error::invalid_input(
                format!("bus \"{}\"", bus.id),
                "declared twice",
            ));
        }
        buses.push(bus);
        Ok(())
    }

    /// Schematic grid to draw: the configured one, else one fitted to the pins.
    #[must_use]
    pub fn schematic_grid(&self) -> SchematicGrid {
        self.micro()
            .and_then(|m| m.schematic)
            .unwrap_or_else(|| SchematicGrid::fit(&self.catalog))
    }

    /// Buses known before alias reconciliation: breadboard rails and row
    /// groups, or the buses declared on a microcontroller.
    #[must_use]
    pub fn declared_buses(&self) -> Vec<Bus> {
        match &self.kind {
            BoardKind::Breadboard(layout) => layout.buses(&self.catalog),
            BoardKind::Microcontroller(micro) => micro.buses.clone(),
        }
    }

    pub fn reconcile(&self) -> Result<Reconciliation, Error> {
        reconcile(&self.catalog, &self.declared_buses())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn micro() -> Board {
        Board::microcontroller("Micro", Unit::Millimeter, 48.0, 18.0, 2.54).unwrap()
    }

    #[test]
    fn fitted_grid_covers_all_anchors() {
        let mut board = micro();
        board
            .add_pin_row(
                "upper",
                [3.81, 1.27],
                [2.54, 0.0],
                vec![
                    PinSpec::at("A", SchematicSide::Left, 10),
                    PinSpec::at("B", SchematicSide::Top, 6),
                    PinSpec::at("C", SchematicSide::Right, 21),
                    PinSpec::alias("D", "A"),
                ],
            )
            .unwrap();
        assert_eq!(
            board.schematic_grid(),
            SchematicGrid {
                width: 7,
                height: 22,
                outer: 3
            }
        );
        board
            .set_schematic_grid(SchematicGrid {
                width: 8,
                height: 23,
                outer: 3,
            })
            .unwrap();
        assert_eq!(board.schematic_grid().height, 23);
    }

    #[test]
    fn breadboard_rejects_microcontroller_calls() {
        let mut board =
            Board::breadboard("BB", Unit::Inch, 3.3, 2.7, 30, [0.1, 0.1]).unwrap();
        assert!(board.add_pin_row("x", [0.0, 0.0], [0.1, 0.0], vec![PinSpec::named("X")]).is_err());
        assert!(board
            .decorate(
                DecorationLayer::Icon,
                Decoration::Text {
                    text: "x".into(),
                    x: 0.0,
                    y: 0.0,
                    font_size: None
                }
            )
            .is_err());
    }

    #[test]
    fn rejects_degenerate_dimensions() {
        assert!(Board::microcontroller("M", Unit::Millimeter, 0.0, 18.0, 2.54).is_err());
        assert!(Board::microcontroller("", Unit::Millimeter, 10.0, 18.0, 2.54).is_err());
        assert!(Board::microcontroller("M", Unit::Millimeter, 10.0, 18.0, -1.0).is_err());
    }

    #[test]
    fn declared_bus_needs_two_members() {
        let mut board = micro();
        assert!(board.declare_bus(Bus::new("b", vec!["A".into()])).is_err());
    }

    #[test]
    fn declared_bus_ids_are_unique() {
        let mut board = micro();
        board
            .declare_bus(Bus::new("GND", vec!["VIN".into(), "5V".into()]))
            .unwrap();
        let err = board
            .declare_bus(Bus::new("GND", vec!["A".into(), "B".into()]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref what, .. } if what == "bus \"GND\""));
        assert_eq!(board.declared_buses().len(), 1);
    }
}
