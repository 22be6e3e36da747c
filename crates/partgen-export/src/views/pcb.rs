use partgen_layout::Board;

use super::{INK, zigzag_labels};
use crate::svg::{Circle, Group, Rect, Stroke, SvgDocument};

const PAD_COLOR: &str = "#9a916c";
const PAD_RADIUS_MM: f64 = 0.619;
const PAD_STROKE_MM: f64 = 0.3379;
const OUTLINE_STROKE_MM: f64 = 0.1;

/// Footprint: board outline and pin labels on the silkscreen, one
/// through-hole pad per named pin on both copper layers.
pub fn render_pcb(board: &Board) -> SvgDocument {
    let config = board.config();
    let font_size = config.font_size * 0.5;
    let mut doc = SvgDocument::new(board.width(), board.height(), config.unit);

    let mut silkscreen = Group::new("silkscreen");
    silkscreen.push(
        Rect::new(0.0, 0.0, board.width(), board.height(), "none")
            .stroke(Stroke::new(INK, config.scaled(OUTLINE_STROKE_MM))),
    );

    let mut copper0 = Group::new("copper0");
    for row in board.catalog().rows() {
        for (pin, spot) in zigzag_labels(board, row, font_size) {
            let Some(name) = pin.name() else { continue };
            copper0.push(Circle {
                id: Some(format!("{name}pad")),
                cx: pin.x(),
                cy: pin.y(),
                r: config.scaled(PAD_RADIUS_MM),
                fill: "none".to_string(),
                stroke: Stroke::new(PAD_COLOR, config.scaled(PAD_STROKE_MM)),
                connector_name: Some(name.to_string()),
            });
            let mut label = spot.text(board, name, font_size);
            label.fill = INK.to_string();
            silkscreen.push(label);
        }
    }

    let mut copper1 = Group::new("copper1");
    copper1.push(copper0);
    doc.push(silkscreen);
    doc.push(copper1);
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use partgen_core::Unit;
    use partgen_layout::PinSpec;

    #[test]
    fn pads_live_on_both_copper_layers() {
        let mut board = Board::microcontroller("M", Unit::Millimeter, 20.0, 10.0, 2.54).unwrap();
        board
            .add_pin_row(
                "r",
                [1.27, 8.89],
                [2.54, 0.0],
                vec![PinSpec::named("VIN"), PinSpec::unused(), PinSpec::named("GND")],
            )
            .unwrap();
        let doc = render_pcb(&board);
        assert_eq!(
            doc.element_ids(),
            ["silkscreen", "copper1", "copper0", "VINpad", "GNDpad"]
        );
        let root = doc.to_xml();
        let copper0 = root.find_all("g").nth(1).unwrap().find("g").unwrap();
        let pad = copper0.find("circle").unwrap();
        assert_eq!(pad.attribute("connectorname"), Some("VIN"));
        assert_eq!(pad.attribute("r"), Some("0.619"));
        assert_eq!(pad.attribute("stroke-width"), Some("0.338"));
        // Lower-half rows are labelled above the pins.
        let label = root.find("g").unwrap().find("text").unwrap();
        assert_eq!(label.attribute("y"), Some("7.62"));
    }

    #[test]
    fn vertical_row_labels_follow_their_pads() {
        let mut board = Board::microcontroller("M", Unit::Millimeter, 20.0, 10.0, 2.54).unwrap();
        board
            .add_pin_row(
                "side",
                [1.27, 1.27],
                [0.0, 2.54],
                vec![
                    PinSpec::named("A"),
                    PinSpec::named("B"),
                    PinSpec::named("C"),
                    PinSpec::named("D"),
                ],
            )
            .unwrap();
        let root = render_pcb(&board).to_xml();
        let labels: Vec<(String, f64, f64)> = root
            .find("g")
            .unwrap()
            .find_all("text")
            .map(|t| {
                let num = |key: &str| t.attribute(key).unwrap().parse::<f64>().unwrap();
                (t.text.clone().unwrap_or_default(), num("x"), num("y"))
            })
            .collect();
        let expected = [("A", 2.54, 1.27), ("B", 3.35, 3.81), ("C", 2.54, 6.35), ("D", 3.35, 8.89)];
        assert_eq!(labels.len(), expected.len());
        for ((name, x, y), (want, want_x, pin_y)) in labels.iter().zip(expected) {
            assert_eq!(name, want);
            assert_abs_diff_eq!(*x, want_x, epsilon = 1e-9);
            // Baseline sits just below the pad centre, on the pad's own line.
            assert_abs_diff_eq!(*y, pin_y + 0.81 * 0.35, epsilon = 1e-3);
        }
    }
}
