//! View renderers. Each one turns a reconciled [`Board`] into an
//! [`SvgDocument`] whose element ids the descriptor points at.

mod breadboard;
mod icon;
mod pcb;
mod schematic;

use indexmap::IndexMap;
use partgen_layout::{Board, Decoration, Pin, Reconciliation, Row};
use tracing::debug;

use crate::error::ExportError;
use crate::svg::{Rect, SvgNode, SvgDocument, Text, TextAnchor};

pub use breadboard::render_breadboard;
pub use icon::render_icon;
pub use pcb::render_pcb;
pub use schematic::render_schematic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViewKind {
    Breadboard,
    Schematic,
    Pcb,
    Icon,
}

impl ViewKind {
    /// Views listed in a descriptor, in descriptor order.
    pub const ALL: [ViewKind; 4] = [
        ViewKind::Icon,
        ViewKind::Breadboard,
        ViewKind::Schematic,
        ViewKind::Pcb,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ViewKind::Breadboard => "breadboard",
            ViewKind::Schematic => "schematic",
            ViewKind::Pcb => "pcb",
            ViewKind::Icon => "icon",
        }
    }

    /// Descriptor element naming this view, e.g. `breadboardView`.
    #[must_use]
    pub fn element(self) -> &'static str {
        match self {
            ViewKind::Breadboard => "breadboardView",
            ViewKind::Schematic => "schematicView",
            ViewKind::Pcb => "pcbView",
            ViewKind::Icon => "iconView",
        }
    }

    /// Appended to the board name to form the SVG file name.
    #[must_use]
    pub fn file_suffix(self) -> &'static str {
        match self {
            ViewKind::Breadboard => "Main.svg",
            ViewKind::Schematic => "Schematic.svg",
            ViewKind::Pcb => "Pcb.svg",
            ViewKind::Icon => "Icon.svg",
        }
    }

    /// Folder the descriptor's image paths are relative to.
    #[must_use]
    pub fn folder(self) -> &'static str {
        self.name()
    }

    /// Prefix of the file inside a bundle.
    #[must_use]
    pub fn bundle_prefix(self) -> &'static str {
        match self {
            ViewKind::Breadboard => "svg.breadboard.",
            ViewKind::Schematic => "svg.schematic.",
            ViewKind::Pcb => "svg.pcb.",
            ViewKind::Icon => "svg.icon.",
        }
    }

    /// Views a board renders. Breadboards reuse their main drawing for
    /// the schematic and pcb views.
    #[must_use]
    pub fn rendered_for(board: &Board) -> &'static [ViewKind] {
        if board.is_breadboard() {
            &[ViewKind::Breadboard, ViewKind::Icon]
        } else {
            &[
                ViewKind::Breadboard,
                ViewKind::Icon,
                ViewKind::Schematic,
                ViewKind::Pcb,
            ]
        }
    }

    /// Rendered view whose file backs this view in the descriptor.
    #[must_use]
    pub fn image_for(self, board: &Board) -> ViewKind {
        match self {
            ViewKind::Icon => ViewKind::Icon,
            _ if board.is_breadboard() => ViewKind::Breadboard,
            other => other,
        }
    }

    /// Layer ids this view declares for `board`.
    #[must_use]
    pub fn layers(self, board: &Board) -> &'static [&'static str] {
        match (self, board.is_breadboard()) {
            (ViewKind::Icon, _) => &["icon"],
            (_, true) => &[BREADBOARD_LAYER],
            (ViewKind::Breadboard, false) => &["breadboard"],
            (ViewKind::Schematic, false) => &["schematic"],
            (ViewKind::Pcb, false) => &["copper1", "silkscreen", "copper0"],
        }
    }
}

/// Line and text color of the schematic and pcb views, whatever the palette.
pub(crate) const INK: &str = "#000000";

/// Single layer shared by every non-icon view of a breadboard.
pub const BREADBOARD_LAYER: &str = "breadboardbreadboard";

pub type RenderedViews = IndexMap<ViewKind, SvgDocument>;

/// Render every view `board` needs, in bundle order.
pub fn render_views(board: &Board, rec: &Reconciliation) -> Result<RenderedViews, ExportError> {
    let mut views = RenderedViews::new();
    for &kind in ViewKind::rendered_for(board) {
        let doc = match kind {
            ViewKind::Breadboard => render_breadboard(board),
            ViewKind::Icon => render_icon(board),
            ViewKind::Schematic => render_schematic(board, rec)?,
            ViewKind::Pcb => render_pcb(board),
        };
        debug!(view = kind.name(), elements = doc.element_ids().len(), "rendered view");
        views.insert(kind, doc);
    }
    Ok(views)
}

pub(crate) fn text(board: &Board, content: &str, x: f64, y: f64, font_size: Option<f64>) -> Text {
    let config = board.config();
    Text {
        x: config.round(x),
        y: config.round(y),
        text: content.to_string(),
        fill: config.palette.foreground.clone(),
        font_family: config.font_family.clone(),
        font_size: font_size.unwrap_or(config.font_size),
        anchor: TextAnchor::Middle,
    }
}

pub(crate) fn decoration(board: &Board, deco: &Decoration) -> SvgNode {
    let config = board.config();
    match deco {
        Decoration::Rect {
            x,
            y,
            width,
            height,
            fill,
        } => Rect::new(
            config.round(*x),
            config.round(*y),
            config.round(*width),
            config.round(*height),
            fill.clone(),
        )
        .into(),
        Decoration::Text {
            text: content,
            x,
            y,
            font_size,
        } => text(board, content, *x, *y, *font_size).into(),
    }
}

/// Where a pin label is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct LabelSpot {
    pub x: f64,
    pub y: f64,
    pub anchor: TextAnchor,
}

impl LabelSpot {
    pub(crate) fn text(self, board: &Board, content: &str, font_size: f64) -> Text {
        let mut label = text(board, content, self.x, self.y, Some(font_size));
        label.anchor = self.anchor;
        label
    }
}

/// Label positions alternating between two lines next to a header row, so
/// neighbouring labels do not overlap.
///
/// Horizontal rows in the upper half are labelled below their pins, the
/// others above. Vertical rows in the left half are labelled to the right of
/// their pins, the others to the left.
pub(crate) fn zigzag_labels<'a>(
    board: &Board,
    row: &'a Row,
    font_size: f64,
) -> impl Iterator<Item = (&'a Pin, LabelSpot)> + 'a {
    let vertical = row.is_vertical();
    let (first_x, first_y) = row.pins.first().map_or((0.0, 0.0), |p| (p.x(), p.y()));
    let (near, far, anchor) = if vertical {
        if first_x < board.width() * 0.5 {
            let near = first_x + board.pitch_x() * 0.5;
            (near, near + font_size, TextAnchor::Start)
        } else {
            let near = first_x - board.pitch_x() * 0.5;
            (near, near - font_size, TextAnchor::End)
        }
    } else if first_y < board.height() * 0.5 {
        let near = first_y + board.pitch_y() * 0.7;
        (near, near + font_size, TextAnchor::Middle)
    } else {
        let near = first_y - board.pitch_y() * 0.5;
        (near, near - font_size, TextAnchor::Middle)
    };
    row.named_pins().enumerate().map(move |(i, pin)| {
        let offset = if i % 2 == 0 { near } else { far };
        let spot = if vertical {
            LabelSpot {
                x: offset,
                y: pin.y() + font_size * 0.35,
                anchor,
            }
        } else {
            LabelSpot {
                x: pin.x(),
                y: offset,
                anchor,
            }
        };
        (pin, spot)
    })
}
