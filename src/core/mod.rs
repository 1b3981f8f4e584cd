//! Core-Domänentypen: Board- und Schaltplan-Dokumente, Kamera, Geometrie, Spatial-Index.

pub mod bbox;
/// Platinen-Datenmodell
///
/// - BoardDocument: Container für Layer-Stack, Netze und alle Items
/// - Footprint/Pad: platzierte Bauteile mit absoluten Positionen
/// - TrackSegment/TrackArc/Via/Zone: Kupfer-Items
pub mod board;
pub mod bom;
pub mod camera;
pub mod geometry;
pub mod schematic;
pub mod settings;
pub mod spatial;

pub use bbox::BBox;
pub use board::{
    BoardDocument, BoardItem, BoardText, Footprint, GraphicItem, GraphicShape, LayerDecl,
    LayerKind, Net, NetNumber, Pad, PadKind, PadNet, PadShape, TextRenderCache, TrackArc,
    TrackSegment, Via, ViaKind, Zone,
};
pub use bom::{bom_from_boards, bom_from_schematics, BomItem};
pub use camera::Camera2D;
pub use schematic::{
    LabelKind, NetLabel, SchematicDocument, SchematicSheet, SchematicSymbol, SheetInstance,
    SymbolInstance, Wire,
};
pub use settings::{file_stem, ProjectSettings};
pub use spatial::{PickMatch, PickTarget, SpatialIndex};
