//! Part descriptor (`.fzp`): metadata, view files, connectors and buses.

use indexmap::IndexMap;
use partgen_layout::{Board, Reconciliation, RowSelection};
use tracing::debug;

use crate::error::ExportError;
use crate::views::{RenderedViews, ViewKind};
use crate::xml::{XmlElement, is_element_name};

pub const DEFAULT_FRITZING_VERSION: &str = "0.12.34";

/// Descriptive part of the descriptor. Everything else is derived from the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartMetadata {
    /// Defaults to `<board name>ModuleID`.
    pub module_id: Option<String>,
    pub fritzing_version: String,
    /// Emitted as `<key>value</key>` in insertion order.
    pub meta: IndexMap<String, String>,
    pub tags: Vec<String>,
    pub properties: IndexMap<String, String>,
}

impl Default for PartMetadata {
    fn default() -> Self {
        Self {
            module_id: None,
            fritzing_version: DEFAULT_FRITZING_VERSION.to_string(),
            meta: IndexMap::new(),
            tags: Vec::new(),
            properties: IndexMap::new(),
        }
    }
}

impl PartMetadata {
    #[must_use]
    pub fn module_id_for(&self, board: &Board) -> String {
        self.module_id
            .clone()
            .unwrap_or_else(|| format!("{}ModuleID", board.name()))
    }
}

/// Build the descriptor tree and check that every element id it references
/// exists in the rendered views.
pub fn build_descriptor(
    board: &Board,
    rec: &Reconciliation,
    metadata: &PartMetadata,
    views: &RenderedViews,
) -> Result<XmlElement, ExportError> {
    let mut module = XmlElement::new("module")
        .attr("moduleId", metadata.module_id_for(board))
        .attr("fritzingVersion", &metadata.fritzing_version);
    for (key, value) in &metadata.meta {
        if !is_element_name(key) {
            return Err(partgen_core::Error::invalid_input(
                "meta key",
                format!("\"{key}\" is not a valid element name"),
            )
            .into());
        }
        module.push(XmlElement::new(key).with_text(value));
    }

    let mut tags = XmlElement::new("tags");
    for tag in &metadata.tags {
        tags.push(XmlElement::new("tag").with_text(tag));
    }
    module.push(tags);

    let mut properties = XmlElement::new("properties");
    for (name, value) in &metadata.properties {
        properties.push(XmlElement::new("property").attr("name", name).with_text(value));
    }
    module.push(properties);

    module.push(view_list(board));
    let connectors = if board.is_breadboard() {
        socket_connectors(board)
    } else {
        header_connectors(board, rec)
    };
    let count = connectors.children.len();
    module.push(connectors);

    let mut buses = XmlElement::new("buses");
    for bus in &rec.buses {
        let mut el = XmlElement::new("bus").attr("id", &bus.id);
        for member in &bus.members {
            el.push(XmlElement::new("nodeMember").attr("connectorId", connector_id(board, member)));
        }
        buses.push(el);
    }
    module.push(buses);

    check_references(board, &module, views)?;
    debug!(connectors = count, buses = rec.buses.len(), "built part descriptor");
    Ok(module)
}

fn connector_id(board: &Board, pin: &str) -> String {
    if board.is_breadboard() {
        pin.to_string()
    } else {
        format!("connector{pin}")
    }
}

fn view_list(board: &Board) -> XmlElement {
    let mut views = XmlElement::new("views");
    for kind in ViewKind::ALL {
        let image = kind.image_for(board);
        let mut layers = XmlElement::new("layers").attr(
            "image",
            format!("{}/{}{}", image.folder(), board.name(), image.file_suffix()),
        );
        for layer in kind.layers(board) {
            layers.push(XmlElement::new("layer").attr("layerId", *layer));
        }
        views.push(XmlElement::new(kind.element()).child(layers));
    }
    views
}

fn layer_ref(layer: &str, svg_id: String) -> XmlElement {
    XmlElement::new("p").attr("layer", layer).attr("svgId", svg_id)
}

fn socket_connectors(board: &Board) -> XmlElement {
    let mut connectors = XmlElement::new("connectors").attr("ignoreTerminalPoints", "true");
    let catalog = board.catalog();
    for selection in [RowSelection::Outer, RowSelection::Inner] {
        for row in catalog.rows_sorted(selection) {
            for name in row.named_pins().filter_map(|p| p.name()) {
                let mut views = XmlElement::new("views");
                for kind in [ViewKind::Breadboard, ViewKind::Schematic, ViewKind::Pcb] {
                    let layer = kind.layers(board)[0];
                    views.push(
                        XmlElement::new(kind.element()).child(layer_ref(layer, format!("{name}pin"))),
                    );
                }
                connectors.push(
                    XmlElement::new("connector")
                        .attr("id", name)
                        .attr("name", name)
                        .attr("type", "female")
                        .child(XmlElement::new("description").with_text("breadboard socket"))
                        .child(views)
                        .child(XmlElement::new("erc").attr("ignore", "always")),
                );
            }
        }
    }
    connectors
}

fn header_connectors(board: &Board, rec: &Reconciliation) -> XmlElement {
    let mut connectors = XmlElement::new("connectors");
    for pin in board.catalog().named_pins(RowSelection::All) {
        let Some(name) = pin.name() else { continue };
        if pin.is_alias() {
            continue;
        }
        for alias in rec.aliases_of(name) {
            connectors.push(header_connector(alias, name));
        }
        connectors.push(header_connector(name, name));
    }
    connectors
}

/// `id_root` names the physical pin, `name` the node it belongs to.
fn header_connector(id_root: &str, name: &str) -> XmlElement {
    let mut schematic = layer_ref("schematic", format!("{id_root}pin"));
    schematic.set_attr("terminalId", format!("{id_root}terminal"));
    let views = XmlElement::new("views")
        .child(XmlElement::new("breadboardView").child(layer_ref("breadboard", format!("{id_root}pin"))))
        .child(XmlElement::new("schematicView").child(schematic))
        .child(
            XmlElement::new("pcbView")
                .child(layer_ref("copper0", format!("{id_root}pad")))
                .child(layer_ref("copper1", format!("{id_root}pad"))),
        );
    XmlElement::new("connector")
        .attr("id", format!("connector{id_root}"))
        .attr("type", "male")
        .attr("name", name)
        .child(XmlElement::new("description").with_text(name))
        .child(views)
}

fn view_for_element(element: &str) -> Option<ViewKind> {
    ViewKind::ALL.into_iter().find(|k| k.element() == element)
}

fn rendered<'a>(
    board: &Board,
    views: &'a RenderedViews,
    kind: ViewKind,
) -> Result<&'a crate::svg::SvgDocument, ExportError> {
    let image = kind.image_for(board);
    views.get(&image).ok_or(ExportError::DanglingReference {
        view: kind.name(),
        id: format!("{}{}", board.name(), image.file_suffix()),
    })
}

fn check_references(board: &Board, module: &XmlElement, views: &RenderedViews) -> Result<(), ExportError> {
    for kind in ViewKind::ALL {
        let doc = rendered(board, views, kind)?;
        for layer in kind.layers(board) {
            if !doc.contains_id(layer) {
                return Err(ExportError::DanglingReference {
                    view: kind.name(),
                    id: (*layer).to_string(),
                });
            }
        }
    }

    let Some(connectors) = module.find("connectors") else {
        return Ok(());
    };
    for connector in connectors.find_all("connector") {
        let Some(connector_views) = connector.find("views") else {
            continue;
        };
        for view in &connector_views.children {
            let Some(kind) = view_for_element(&view.name) else {
                continue;
            };
            let doc = rendered(board, views, kind)?;
            for p in view.find_all("p") {
                for key in ["svgId", "terminalId"] {
                    if let Some(id) = p.attribute(key) {
                        if !doc.contains_id(id) {
                            return Err(ExportError::DanglingReference {
                                view: kind.name(),
                                id: id.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }
    Ok(())
}
