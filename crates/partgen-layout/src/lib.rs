//! Pin catalog, board layouts and cross-view pin reconciliation.

pub mod board;
pub mod breadboard;
pub mod catalog;
pub mod reconcile;

pub use board::{Board, BoardKind, Decoration, DecorationLayer, MicroLayout, SchematicGrid};
pub use breadboard::{BreadboardLayout, Electrode, Polarity};
pub use catalog::{
    Pin, PinCatalog, PinSpec, Row, RowKind, RowSelection, SchematicAnchor, SchematicSide,
};
pub use reconcile::{AliasMap, Bus, Reconciliation, reconcile};
