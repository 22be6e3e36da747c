use partgen_layout::{Board, BoardKind, BreadboardLayout, MicroLayout, Pin, Polarity, RowSelection};

use super::{BREADBOARD_LAYER, decoration, text, zigzag_labels};
use crate::svg::{Circle, Group, Rect, Stroke, SvgDocument, SvgNode};

const HOLE_FILL: &str = "#383838";
const NEGATIVE: &str = "#0000ff";
const POSITIVE: &str = "#ff0000";
const ELECTRODE_THICKNESS_MM: f64 = 0.3;

/// Relative bezier outlines of a socket's two bevels, in millimetres:
/// a start offset followed by two cubic segments.
const SOCKET_LIGHT: ([f64; 2], [f64; 12], &str) = (
    [-0.844, 0.0],
    [0.0, -0.466, 0.377, -0.844, 0.844, -0.844, 0.466, 0.0, 0.844, 0.377, 0.844, 0.844],
    "#e6e6e6",
);
const SOCKET_SHADE: ([f64; 2], [f64; 12], &str) = (
    [0.844, 0.0],
    [0.0, 0.466, -0.377, 0.844, -0.844, 0.844, -0.466, 0.0, -0.844, -0.377, -0.844, -0.844],
    "#bfbfbf",
);

/// Main (breadboard view) drawing of either board kind.
pub fn render_breadboard(board: &Board) -> SvgDocument {
    let mut doc = SvgDocument::new(board.width(), board.height(), board.config().unit)
        .with_enable_background();
    let root = match board.kind() {
        BoardKind::Breadboard(layout) => socket_board(board, layout),
        BoardKind::Microcontroller(micro) => header_board(board, micro),
    };
    doc.push(root);
    doc
}

fn background(board: &Board) -> Group {
    let mut group = Group::new("background");
    group.push(Rect::new(
        0.0,
        0.0,
        board.width(),
        board.height(),
        board.config().palette.background.clone(),
    ));
    group
}

fn hole(board: &Board, pin: &Pin) -> Circle {
    let r = board.config().socket_radius;
    Circle {
        id: None,
        cx: pin.x(),
        cy: pin.y(),
        r,
        fill: HOLE_FILL.to_string(),
        stroke: Stroke::new("none", board.config().round(r / 5.0)),
        connector_name: None,
    }
}

fn bevel_path(board: &Board, pin: &Pin, (offset, curves, fill): ([f64; 2], [f64; 12], &str)) -> SvgNode {
    let config = board.config();
    let n = |mm: f64| crate::svg::fmt_num(config.round(mm * config.scale_factor));
    let join = |values: &[f64]| values.iter().map(|v| n(*v)).collect::<Vec<_>>().join(",");
    let d = format!(
        "M{},{}m{},{}c{}c{}",
        crate::svg::fmt_num(pin.x()),
        crate::svg::fmt_num(pin.y()),
        n(offset[0]),
        n(offset[1]),
        join(&curves[..6]),
        join(&curves[6..]),
    );
    SvgNode::Path {
        fill: fill.to_string(),
        d,
    }
}

fn socket_board(board: &Board, layout: &BreadboardLayout) -> Group {
    let catalog = board.catalog();
    let config = board.config();
    let mut root = Group::new(BREADBOARD_LAYER);
    root.push(background(board));

    // Row names sit in the first and last slot of every row.
    let mut texts = Group::new("texts");
    let label_dy = config.socket_radius * 1.2;
    for selection in [RowSelection::Inner, RowSelection::Outer] {
        for row in catalog.rows_sorted(selection) {
            for pin in [row.pins.first(), row.pins.last()].into_iter().flatten() {
                texts.push(text(board, &row.name, pin.x(), pin.y() + label_dy, None));
            }
        }
    }

    let mut sockets = Group::new("sockets");
    for selection in [RowSelection::Outer, RowSelection::Inner] {
        for row in catalog.rows_sorted(selection) {
            for pin in row.named_pins() {
                let Some(name) = pin.name() else { continue };
                let mut socket = Group::new(format!("{name}pin"));
                socket.push(bevel_path(board, pin, SOCKET_LIGHT));
                socket.push(bevel_path(board, pin, SOCKET_SHADE));
                socket.push(hole(board, pin));
                sockets.push(socket);
            }
        }
    }

    if let Some(first) = catalog.rows_sorted(RowSelection::Inner).first() {
        for &y in layout.numbering_rows() {
            let step = layout.numbering_step();
            for column in (step..=layout.pins_per_row()).step_by(step) {
                if let Some(pin) = first.pins.get(column) {
                    let label = column.to_string();
                    texts.push(text(board, &label, pin.x(), y + board.pitch_y() / 2.0, None));
                }
            }
        }
    }

    let mut electrodes = Group::new("electrodes");
    let thickness = config.scaled(ELECTRODE_THICKNESS_MM);
    for electrode in layout.electrodes() {
        let color = match electrode.polarity {
            Polarity::Negative => NEGATIVE,
            Polarity::Positive => POSITIVE,
        };
        electrodes.push(Rect::new(0.0, electrode.y, board.width(), thickness, color));
    }

    root.push(texts);
    root.push(sockets);
    root.push(electrodes);
    root
}

fn header_board(board: &Board, micro: &MicroLayout) -> Group {
    let font_size = board.config().font_size * 0.5;
    let mut root = Group::new("breadboard");
    root.push(background(board));

    let mut pins = Group::new("microPins");
    let mut texts = Group::new("texts");
    for deco in &micro.texts {
        texts.push(decoration(board, deco));
    }
    for row in board.catalog().rows() {
        for (pin, spot) in zigzag_labels(board, row, font_size) {
            let Some(name) = pin.name() else { continue };
            let mut circle = hole(board, pin);
            circle.id = Some(format!("{name}pin"));
            pins.push(circle);
            texts.push(spot.text(board, name, font_size));
        }
    }

    let mut graphics = Group::new("graphics");
    for deco in &micro.graphics {
        graphics.push(decoration(board, deco));
    }

    root.push(pins);
    root.push(texts);
    root.push(graphics);
    root
}
