//! Rendering and packaging of a reconciled board into a part: four SVG views,
//! a descriptor and a zip bundle.

pub mod descriptor;
pub mod error;
pub mod package;
pub mod svg;
pub mod views;
pub mod xml;

use partgen_layout::{Board, Reconciliation};
use tracing::info;

pub use descriptor::{PartMetadata, build_descriptor};
pub use error::ExportError;
pub use package::{FileKind, PackageFile, PartPackage, to_pretty_xml};
pub use svg::{SvgDocument, SvgNode};
pub use views::{RenderedViews, ViewKind, render_views};
pub use xml::XmlElement;

/// Everything generated for one board, still in memory.
#[derive(Debug, Clone)]
pub struct GeneratedPart {
    pub reconciliation: Reconciliation,
    pub views: RenderedViews,
    pub descriptor: XmlElement,
    pub package: PartPackage,
}

/// Reconcile `board`, render its views and build its descriptor. Nothing is
/// written; a failure leaves no partial output behind.
pub fn generate_part(board: &Board, metadata: &PartMetadata) -> Result<GeneratedPart, ExportError> {
    let reconciliation = board.reconcile()?;
    let views = render_views(board, &reconciliation)?;
    let descriptor = build_descriptor(board, &reconciliation, metadata, &views)?;

    let mut package = PartPackage::new(board.name());
    for (kind, doc) in &views {
        package.insert(FileKind::View(*kind), &doc.to_xml())?;
    }
    package.insert(FileKind::Descriptor, &descriptor)?;
    info!(
        part = board.name(),
        pins = board.catalog().len(),
        views = views.len(),
        "generated part"
    );
    Ok(GeneratedPart {
        reconciliation,
        views,
        descriptor,
        package,
    })
}
