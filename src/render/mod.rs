//! Layer-basiertes Rendering von Board-Dokumenten.
//!
//! Der Renderer erzeugt retained Paint-Output pro Layer; das Rastern auf einen
//! Canvas übernimmt der Host.

mod culling;
pub mod dynamic_labels;
pub mod focus;
pub mod glyphs;
pub mod labels;
pub mod layers;
pub mod paint;
pub mod painters;
mod renderer;

pub use crate::shared::RenderScene;
pub use dynamic_labels::{update_dynamic_labels, DynamicLabelStats, LabelError, LabelSettings};
pub use focus::FocusState;
pub use labels::{display_net_name, layout_pad_labels, PadLabels, PlacedLabel};
pub use layers::{Layer, LayerId, LayerSet, OverlayKind, PadSide, UnknownLayerName};
pub use paint::{Color, PaintList, PaintOp};
pub use painters::{paint_board, paint_item, ItemPainter, NetFilter, PaintContext, PaintSink};
pub use renderer::{BoardRenderer, RenderEvent};
