//! Layer-Modell: Identitäten, einzelne Layer und die geordnete Layer-Menge.

mod id;
mod layer;
mod set;

pub use id::{LayerId, OverlayKind, PadSide, UnknownLayerName};
pub use layer::Layer;
pub use set::LayerSet;
