//! Breadboard layout: power rails ("outer rows") and signal rows ("inner rows").
//!
//! Every row has `pins_per_row + 2` slots. The first and last slot carry the
//! row name label; sockets use slots `1..=pins_per_row`. Rails leave a gap
//! every `outer_group_size` sockets.

use partgen_core::Error;
use serde::Serialize;
use tracing::debug;

use crate::board::{Board, BoardKind};
use crate::catalog::{PinCatalog, PinSpec, RowKind, RowSelection};
use crate::reconcile::Bus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Negative,
    Positive,
}

/// Colored line marking a power rail.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Electrode {
    pub y: f64,
    pub polarity: Polarity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreadboardLayout {
    pins_per_row: usize,
    outer_group_size: usize,
    numbering_step: usize,
    numbering_rows: Vec<f64>,
    electrodes: Vec<Electrode>,
    bus_groups: Vec<Vec<String>>,
    icon_text: Option<String>,
}

impl BreadboardLayout {
    pub const BACKGROUND: &'static str = "#d9d9d9";
    const OUTER_GROUP_SIZE: usize = 6;
    const NUMBERING_STEP: usize = 5;
    pub const MAX_PINS_PER_ROW: usize = 1000;

    pub fn new(pins_per_row: usize) -> Result<Self, Error> {
        if pins_per_row == 0 {
            return Err(Error::invalid_input(
                "pins per row",
                "breadboard rows need at least one socket",
            ));
        }
        if pins_per_row > Self::MAX_PINS_PER_ROW {
            return Err(Error::invalid_input(
                "pins per row",
                format!(
                    "{pins_per_row} exceeds the limit of {}",
                    Self::MAX_PINS_PER_ROW
                ),
            ));
        }
        Ok(Self {
            pins_per_row,
            outer_group_size: Self::OUTER_GROUP_SIZE,
            numbering_step: Self::NUMBERING_STEP,
            numbering_rows: Vec::new(),
            electrodes: Vec::new(),
            bus_groups: Vec::new(),
            icon_text: None,
        })
    }

    #[must_use]
    pub fn pins_per_row(&self) -> usize {
        self.pins_per_row
    }

    #[must_use]
    pub fn numbering_step(&self) -> usize {
        self.numbering_step
    }

    /// Y values of the lines holding column numbers.
    #[must_use]
    pub fn numbering_rows(&self) -> &[f64] {
        &self.numbering_rows
    }

    #[must_use]
    pub fn electrodes(&self) -> &[Electrode] {
        &self.electrodes
    }

    #[must_use]
    pub fn bus_groups(&self) -> &[Vec<String>] {
        &self.bus_groups
    }

    #[must_use]
    pub fn icon_text(&self) -> Option<&str> {
        self.icon_text.as_deref()
    }

    /// Socket slots used on a rail, skipping every `outer_group_size`-th.
    pub fn outer_row_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (1..=self.pins_per_row).filter(move |i| i % self.outer_group_size != 0)
    }

    /// Socket slots used on a signal row.
    pub fn inner_row_indices(&self) -> impl Iterator<Item = usize> + '_ {
        1..=self.pins_per_row
    }

    fn slot_specs(&self, row: &str, used: impl Iterator<Item = usize>) -> Vec<PinSpec> {
        let mut specs = vec![PinSpec::unused(); self.pins_per_row + 2];
        for i in used {
            specs[i] = PinSpec::named(format!("{row}{i}"));
        }
        specs
    }

    /// Rail buses first (`o<row>`, rows by name), then one bus per column and
    /// row group (`i<first><last><column>`).
    pub(crate) fn buses(&self, catalog: &PinCatalog) -> Vec<Bus> {
        let mut buses = Vec::new();
        for row in catalog.rows_sorted(RowSelection::Outer) {
            let members = row
                .named_pins()
                .filter_map(|p| p.name.clone())
                .collect();
            buses.push(Bus::new(format!("o{}", row.name), members));
        }
        for group in &self.bus_groups {
            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            for column in 1..=self.pins_per_row {
                let members = group.iter().map(|row| format!("{row}{column}")).collect();
                buses.push(Bus::new(format!("i{first}{last}{column}"), members));
            }
        }
        buses
    }
}

impl Board {
    fn breadboard_mut(&mut self) -> Result<&mut BreadboardLayout, Error> {
        match &mut self.kind {
            BoardKind::Breadboard(layout) => Ok(layout),
            BoardKind::Microcontroller(_) => Err(Error::invalid_input(
                "breadboard row",
                "only available on breadboards",
            )),
        }
    }

    #[must_use]
    pub fn breadboard_layout(&self) -> Option<&BreadboardLayout> {
        match &self.kind {
            BoardKind::Breadboard(layout) => Some(layout),
            BoardKind::Microcontroller(_) => None,
        }
    }

    fn add_breadboard_row(&mut self, name: &str, kind: RowKind, left: f64, y: f64) -> Result<(), Error> {
        let pitch_x = self.pitch_x();
        let layout = self.breadboard_mut()?;
        let specs = match kind {
            RowKind::Outer => layout.slot_specs(name, layout.outer_row_indices()),
            _ => layout.slot_specs(name, layout.inner_row_indices()),
        };
        self.catalog
            .register_row(name, kind, [left, y], [pitch_x, 0.0], specs)
    }

    /// Add two rails framed by a negative (top) and positive (bottom)
    /// electrode line. Each character of `names` names one rail.
    /// Returns the y of the next free line.
    pub fn add_outer_rows(&mut self, names: &str, left: f64, y: f64) -> Result<f64, Error> {
        let rows: Vec<char> = names.chars().collect();
        let [first, second] = rows.as_slice() else {
            return Err(Error::invalid_input(
                "outer rows",
                format!("expected two row names, got \"{names}\""),
            ));
        };
        let dy = self.pitch_y();
        let mut y = y;
        let top = self.config().round(y);
        self.breadboard_mut()?.electrodes.push(Electrode {
            y: top,
            polarity: Polarity::Negative,
        });
        y += dy;
        self.add_breadboard_row(&first.to_string(), RowKind::Outer, left, y)?;
        y += dy;
        self.add_breadboard_row(&second.to_string(), RowKind::Outer, left, y)?;
        y += dy;
        let bottom = self.config().round(y);
        self.breadboard_mut()?.electrodes.push(Electrode {
            y: bottom,
            polarity: Polarity::Positive,
        });
        y += dy;
        debug!(rows = names, next_y = y, "added outer rows");
        Ok(y)
    }

    /// Add consecutive signal rows, one per character of `names`, optionally
    /// preceded/followed by a line of column numbers.
    /// Returns the y of the next free line.
    pub fn add_inner_rows(
        &mut self,
        names: &str,
        left: f64,
        y: f64,
        numbers_before: bool,
        numbers_after: bool,
    ) -> Result<f64, Error> {
        if names.is_empty() {
            return Err(Error::invalid_input("inner rows", "no row names given"));
        }
        let dy = self.pitch_y();
        let mut y = y;
        if numbers_before {
            let line = self.config().round(y);
            self.breadboard_mut()?.numbering_rows.push(line);
            y += dy;
        }
        for name in names.chars() {
            self.add_breadboard_row(&name.to_string(), RowKind::Inner, left, y)?;
            y += dy;
        }
        if numbers_after {
            let line = self.config().round(y);
            self.breadboard_mut()?.numbering_rows.push(line);
            y += dy;
        }
        debug!(rows = names, next_y = y, "added inner rows");
        Ok(y)
    }

    /// Rows tied together column by column, e.g. `[["A".."E"], ["F".."J"]]`.
    pub fn set_bus_groups(&mut self, groups: Vec<Vec<String>>) -> Result<(), Error> {
        if let Some(empty) = groups.iter().position(Vec::is_empty) {
            return Err(Error::invalid_input(
                "bus group",
                format!("group #{empty} has no rows"),
            ));
        }
        self.breadboard_mut()?.bus_groups = groups;
        Ok(())
    }

    pub fn set_outer_group_size(&mut self, size: usize) -> Result<(), Error> {
        if size < 2 {
            return Err(Error::invalid_input(
                "outer group size",
                format!("must be at least 2, got {size}"),
            ));
        }
        self.breadboard_mut()?.outer_group_size = size;
        Ok(())
    }

    pub fn set_icon_text(&mut self, text: impl Into<String>) -> Result<(), Error> {
        self.breadboard_mut()?.icon_text = Some(text.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use partgen_core::Unit;

    fn board(pins: usize) -> Board {
        Board::breadboard("BB", Unit::Inch, (pins + 3) as f64 * 0.1, 2.7, pins, [0.1, 0.1]).unwrap()
    }

    #[test]
    fn outer_indices_skip_group_gaps() {
        let layout = BreadboardLayout::new(63).unwrap();
        let indices: Vec<usize> = layout.outer_row_indices().collect();
        assert_eq!(indices.len(), 63 - 10);
        for gap in (6..=60).step_by(6) {
            assert!(!indices.contains(&gap), "{gap} should be a gap");
        }
        assert_eq!(indices.first(), Some(&1));
        assert_eq!(indices.last(), Some(&63));
        assert_eq!(layout.inner_row_indices().count(), 63);
    }

    #[test]
    fn pins_per_row_is_bounded() {
        assert!(BreadboardLayout::new(BreadboardLayout::MAX_PINS_PER_ROW).is_ok());
        for bad in [0, BreadboardLayout::MAX_PINS_PER_ROW + 1, usize::MAX] {
            let err = BreadboardLayout::new(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidInput { .. }), "{bad}");
        }
        assert!(Board::breadboard("BB", Unit::Inch, 1.0, 1.0, usize::MAX, [0.1, 0.1]).is_err());
    }

    #[test]
    fn outer_rows_advance_four_lines() {
        let mut board = board(10);
        let next = board.add_outer_rows("ZY", 0.1, 0.1).unwrap();
        assert_abs_diff_eq!(next, 0.5, epsilon = 1e-9);
        let layout = board.breadboard_layout().unwrap();
        assert_eq!(layout.electrodes().len(), 2);
        assert_eq!(layout.electrodes()[0].polarity, Polarity::Negative);
        let z = board.catalog().row("Z").unwrap();
        assert_eq!(z.pins.len(), 12);
        assert!(z.pins[0].name.is_none());
        assert!(z.pins[6].name.is_none());
        assert_eq!(z.pins[5].name.as_deref(), Some("Z5"));
        assert_abs_diff_eq!(z.pins[0].y(), 0.2, epsilon = 1e-9);
    }

    #[test]
    fn inner_rows_record_numbering_lines() {
        let mut board = board(10);
        let next = board.add_inner_rows("EDCBA", 0.1, 1.0, true, true).unwrap();
        assert_abs_diff_eq!(next, 1.7, epsilon = 1e-9);
        let layout = board.breadboard_layout().unwrap();
        assert_eq!(layout.numbering_rows().len(), 2);
        assert!(board.catalog().find_pin("A10").is_some());
        assert!(board.catalog().find_pin("A11").is_none());
    }

    #[test]
    fn buses_cover_rails_and_groups() {
        let mut board = board(12);
        let y = board.add_outer_rows("ZY", 0.1, 0.1).unwrap();
        board.add_inner_rows("BA", 0.1, y, false, false).unwrap();
        board
            .set_bus_groups(vec![vec!["A".into(), "B".into()]])
            .unwrap();
        let buses = board.declared_buses();
        assert_eq!(buses[0].id, "oY");
        assert_eq!(buses[1].id, "oZ");
        assert_eq!(buses[0].members.len(), 10);
        assert_eq!(buses[2].id, "iAB1");
        assert_eq!(buses[2].members, ["A1", "B1"]);
        assert_eq!(buses.len(), 2 + 12);
        board.reconcile().unwrap();
    }

    #[test]
    fn rejects_bad_outer_names() {
        let mut board = board(5);
        assert!(board.add_outer_rows("Z", 0.1, 0.1).is_err());
        assert!(board.add_outer_rows("ZYX", 0.1, 0.1).is_err());
    }
}
