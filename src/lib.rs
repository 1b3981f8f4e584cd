//! ECAD-Viewer Library.
//! Headless Kern eines einbettbaren KiCad-Viewers: Document Store mit
//! Snapshot-Cache, Layer-Modell, Renderer und View-State-Engine.

pub mod app;
pub mod core;
pub mod parser;
pub mod project;
pub mod render;
pub mod shared;

pub use app::{
    DeferredLoad, HostBinding, LoadRequestOutcome, LoadState, StateOrigin, Viewer, ViewerError,
    ViewerEvent, ViewerIntent, ViewState,
};
pub use core::{BoardDocument, Camera2D, SchematicDocument, SpatialIndex};
pub use project::{LoadOutcome, LoadSources, Project, ProjectServices, SnapshotCache, SourceBlob};
pub use render::{BoardRenderer, LayerId, LayerSet};
pub use shared::{RenderScene, ViewerOptions};
