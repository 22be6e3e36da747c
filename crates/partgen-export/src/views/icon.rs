use partgen_layout::{Board, BoardKind, Polarity};

use super::{decoration, text};
use crate::svg::{Group, Rect, SvgDocument};

const ICON_SIZE: f64 = 32.0;
const ICON_FONT_SIZE: f64 = 12.0;
const ELECTRODE_HEIGHT: f64 = 0.4;

/// Parts-bin icon on a fixed 32x32 canvas.
pub fn render_icon(board: &Board) -> SvgDocument {
    let mut doc = SvgDocument::new(ICON_SIZE, ICON_SIZE, board.config().unit);
    let mut group = Group::new("icon");
    match board.kind() {
        BoardKind::Breadboard(layout) => {
            let scale = ICON_SIZE / board.height();
            for electrode in layout.electrodes() {
                let color = match electrode.polarity {
                    Polarity::Negative => "#0000ff",
                    Polarity::Positive => "#ff0000",
                };
                group.push(Rect::new(
                    0.0,
                    board.config().round(scale * electrode.y),
                    ICON_SIZE,
                    ELECTRODE_HEIGHT,
                    color,
                ));
            }
            if let Some(label) = layout.icon_text() {
                let half = ICON_SIZE * 0.5;
                group.push(text(
                    board,
                    label,
                    half,
                    half + ICON_FONT_SIZE * 0.35,
                    Some(ICON_FONT_SIZE),
                ));
            }
        }
        BoardKind::Microcontroller(micro) => {
            for deco in &micro.icon {
                group.push(decoration(board, deco));
            }
        }
    }
    doc.push(group);
    doc
}
