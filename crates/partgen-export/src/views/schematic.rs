use partgen_core::Error;
use partgen_layout::{Board, Reconciliation, RowSelection, SchematicAnchor, SchematicGrid, SchematicSide};

use super::{INK, text};
use crate::error::ExportError;
use crate::svg::{Group, Line, Rect, Stroke, SvgDocument, TextAnchor};

const LINE_STROKE_MM: f64 = 0.1;

struct Frame {
    outer_x: f64,
    outer_y: f64,
    width: f64,
    height: f64,
    stroke: f64,
    font_size: f64,
    pitch_x: f64,
    pitch_y: f64,
}

/// Schematic symbol: a box with one pin line per connector.
///
/// Grid steps run from `0` to `width`/`height` inclusive, so both corners of
/// a side are valid anchors.
///
/// Every canonical pin is drawn at its grid anchor; each of its aliases gets
/// its own line and terminal at the same spot. Alias captions are moved off
/// the canonical caption: above the pin line on the left and right sides,
/// one text line further inside the box on the top and bottom.
pub fn render_schematic(board: &Board, rec: &Reconciliation) -> Result<SvgDocument, ExportError> {
    let SchematicGrid {
        width,
        height,
        outer,
    } = board.schematic_grid();
    let config = board.config();
    let outer_x = f64::from(outer) * board.pitch_x();
    let outer_y = f64::from(outer) * board.pitch_y();
    let frame = Frame {
        outer_x,
        outer_y,
        width: config.round(f64::from(width) * board.pitch_x() + 2.0 * outer_x),
        height: config.round(f64::from(height) * board.pitch_y() + 2.0 * outer_y),
        stroke: config.scaled(LINE_STROKE_MM),
        font_size: config.round(board.pitch_y() * 0.5),
        pitch_x: board.pitch_x(),
        pitch_y: board.pitch_y(),
    };

    let mut doc = SvgDocument::new(frame.width, frame.height, config.unit);
    let mut group = Group::new("schematic");
    group.push(
        Rect::new(
            config.round(outer_x),
            config.round(outer_y),
            config.round(frame.width - 2.0 * outer_x),
            config.round(frame.height - 2.0 * outer_y),
            "#FFFFFF",
        )
        .class("interior rect")
        .stroke(Stroke::new(INK, config.round(2.0 * frame.stroke))),
    );

    let terminal_radius = board.pitch_x() * 0.2;
    for pin in board.catalog().named_pins(RowSelection::All) {
        let Some(name) = pin.name() else { continue };
        let (side, index) = match &pin.schematic {
            Some(SchematicAnchor::Alias { .. }) => continue,
            Some(SchematicAnchor::Grid { side, index }) => (*side, *index),
            None => {
                return Err(Error::InvalidSchematicPosition {
                    pin: name.to_string(),
                    value: String::new(),
                }
                .into());
            }
        };
        let limit = match side {
            SchematicSide::Left | SchematicSide::Right => height,
            SchematicSide::Top | SchematicSide::Bottom => width,
        };
        if index > limit {
            return Err(Error::InvalidSchematicPosition {
                pin: name.to_string(),
                value: format!("{}{index}", side.letter()),
            }
            .into());
        }
        for (slot, alias) in rec.aliases_of(name).iter().enumerate() {
            let anchor = Anchor { side, index, caption_slot: slot + 1 };
            draw_pin(board, &mut group, &frame, alias, anchor, terminal_radius);
        }
        let anchor = Anchor { side, index, caption_slot: 0 };
        draw_pin(board, &mut group, &frame, name, anchor, terminal_radius * 2.0);
    }

    doc.push(group);
    Ok(doc)
}

/// Where a pin line goes. `caption_slot` is 0 for the canonical pin and
/// counts up for its aliases.
#[derive(Debug, Clone, Copy)]
struct Anchor {
    side: SchematicSide,
    index: u32,
    caption_slot: usize,
}

fn draw_pin(
    board: &Board,
    group: &mut Group,
    frame: &Frame,
    id_root: &str,
    Anchor { side, index, caption_slot }: Anchor,
    terminal_radius: f64,
) {
    let config = board.config();
    let i = f64::from(index);
    let lw = frame.stroke;
    let font = frame.font_size;
    // Alias captions stack above the pin line, one text line apart.
    let above = |y: f64| y - 2.0 * lw - (caption_slot as f64 - 1.0) * font;
    let (start, stop, label, anchor) = match side {
        SchematicSide::Left => {
            let y = frame.pitch_y * i + frame.outer_y;
            let stop_x = frame.outer_x;
            let (label, anchor) = if caption_slot == 0 {
                ((stop_x + 2.0 * lw, y + font * 0.35), TextAnchor::Start)
            } else {
                ((stop_x * 0.5, above(y)), TextAnchor::Middle)
            };
            ((0.0, y), (stop_x, y), label, anchor)
        }
        SchematicSide::Right => {
            let y = frame.pitch_y * i + frame.outer_y;
            let stop_x = frame.width - frame.outer_x;
            let (label, anchor) = if caption_slot == 0 {
                ((stop_x - 2.0 * lw, y + font * 0.35), TextAnchor::End)
            } else {
                (((stop_x + frame.width) * 0.5, above(y)), TextAnchor::Middle)
            };
            ((frame.width, y), (stop_x, y), label, anchor)
        }
        SchematicSide::Top => {
            let x = frame.pitch_x * i + frame.outer_x;
            let stop_y = frame.outer_y;
            let depth = font * (1.0 + caption_slot as f64);
            ((x, 0.0), (x, stop_y), (x, stop_y + depth), TextAnchor::Middle)
        }
        SchematicSide::Bottom => {
            let x = frame.pitch_x * i + frame.outer_x;
            let stop_y = frame.height - frame.outer_y;
            let depth = font * (1.0 + caption_slot as f64);
            ((x, frame.height), (x, stop_y), (x, stop_y - depth), TextAnchor::Middle)
        }
    };

    group.push(Line {
        id: Some(format!("{id_root}pin")),
        x1: config.round(start.0),
        y1: config.round(start.1),
        x2: config.round(stop.0),
        y2: config.round(stop.1),
        stroke: Stroke::new(INK, lw),
    });
    let mut caption = text(board, id_root, label.0, label.1, Some(font));
    caption.anchor = anchor;
    caption.fill = INK.to_string();
    group.push(caption);
    group.push(
        Rect::new(
            config.round(start.0 - terminal_radius),
            config.round(start.1 - terminal_radius),
            config.round(2.0 * terminal_radius),
            config.round(2.0 * terminal_radius),
            "none",
        )
        .id(format!("{id_root}terminal"))
        .stroke(Stroke::new("none", 0.0)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use partgen_core::Unit;
    use partgen_layout::PinSpec;

    fn board(pins: Vec<PinSpec>) -> Board {
        let mut board = Board::microcontroller("M", Unit::Millimeter, 48.0, 18.0, 2.54).unwrap();
        board
            .add_pin_row("r", [1.27, 1.27], [2.54, 0.0], pins)
            .unwrap();
        board
            .set_schematic_grid(SchematicGrid {
                width: 8,
                height: 23,
                outer: 3,
            })
            .unwrap();
        board
    }

    #[test]
    fn left_pin_geometry() {
        let board = board(vec![PinSpec::at("AREF", SchematicSide::Left, 3)]);
        let rec = board.reconcile().unwrap();
        let doc = render_schematic(&board, &rec).unwrap();
        assert_abs_diff_eq!(doc.width, 35.56, epsilon = 1e-9);
        let root = doc.to_xml();
        let group = root.find("g").unwrap();
        let line = group.find("line").unwrap();
        assert_eq!(line.attribute("id"), Some("AREFpin"));
        assert_eq!(line.attribute("x1"), Some("0"));
        assert_eq!(line.attribute("x2"), Some("7.62"));
        assert_eq!(line.attribute("y1"), Some("15.24"));
        let label = group.find("text").unwrap();
        assert_eq!(label.attribute("text-anchor"), Some("start"));
        let terminal = group.find_all("rect").nth(1).unwrap();
        assert_eq!(terminal.attribute("id"), Some("AREFterminal"));
        assert_eq!(terminal.attribute("width"), Some("2.032"));
    }

    #[test]
    fn aliases_share_the_canonical_anchor() {
        let board = board(vec![
            PinSpec::alias("GND-2", "GND"),
            PinSpec::at("GND", SchematicSide::Bottom, 5),
        ]);
        let rec = board.reconcile().unwrap();
        let doc = render_schematic(&board, &rec).unwrap();
        assert_eq!(
            doc.element_ids(),
            ["schematic", "GND-2pin", "GND-2terminal", "GNDpin", "GNDterminal"]
        );
        let root = doc.to_xml();
        let lines: Vec<_> = root.find("g").unwrap().find_all("line").collect();
        assert_eq!(lines[0].attribute("x1"), lines[1].attribute("x1"));
        assert_eq!(lines[0].attribute("y2"), lines[1].attribute("y2"));
    }

    #[test]
    fn named_pin_without_anchor_fails() {
        let board = board(vec![PinSpec::named("D3")]);
        let rec = board.reconcile().unwrap();
        let err = render_schematic(&board, &rec).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Part(Error::InvalidSchematicPosition { ref pin, .. }) if pin == "D3"
        ));
    }

    #[test]
    fn anchor_outside_the_grid_fails() {
        let board = board(vec![PinSpec::at("D3", SchematicSide::Top, 9)]);
        let rec = board.reconcile().unwrap();
        let err = render_schematic(&board, &rec).unwrap_err();
        assert!(matches!(
            err,
            ExportError::Part(Error::InvalidSchematicPosition { ref value, .. }) if value == "t9"
        ));
    }

    #[test]
    fn both_corners_are_valid_anchors() {
        let board = board(vec![
            PinSpec::at("T0", SchematicSide::Top, 0),
            PinSpec::at("T8", SchematicSide::Top, 8),
            PinSpec::at("L0", SchematicSide::Left, 0),
            PinSpec::at("L23", SchematicSide::Left, 23),
        ]);
        let rec = board.reconcile().unwrap();
        let root = render_schematic(&board, &rec).unwrap().to_xml();
        let xs: Vec<&str> = root
            .find("g")
            .unwrap()
            .find_all("line")
            .filter_map(|l| l.attribute("x1"))
            .collect();
        // Top pins sit on the left and right edges of the box.
        assert_eq!(xs[0], "7.62");
        assert_eq!(xs[1], "27.94");
    }

    #[test]
    fn alias_captions_do_not_cover_the_canonical_caption() {
        for side in [SchematicSide::Bottom, SchematicSide::Right] {
            let board = board(vec![
                PinSpec::alias("GND-2", "GND"),
                PinSpec::alias("GND-3", "GND"),
                PinSpec::at("GND", side, 5),
            ]);
            let rec = board.reconcile().unwrap();
            let root = render_schematic(&board, &rec).unwrap().to_xml();
            let captions: Vec<(Option<&str>, Option<&str>)> = root
                .find("g")
                .unwrap()
                .find_all("text")
                .map(|t| (t.attribute("x"), t.attribute("y")))
                .collect();
            assert_eq!(captions.len(), 3);
            for (i, a) in captions.iter().enumerate() {
                for b in &captions[i + 1..] {
                    assert_ne!(a, b, "{side:?}");
                }
            }
        }
    }
}
