//! Application-Layer: Viewer-Shell, View-State-Engine, Panels und Host-Anbindung.

pub mod deferred;
pub mod engine;
pub mod error;
pub mod events;
pub mod host;
pub mod panels;
/// Viewer-Shell
///
/// Hält Project, Load-Zustand, Einklappen/Vollbild und die Panel-Registry einer
/// Viewer-Instanz und übersetzt Eingaben in View-State-Änderungen.
pub mod shell;
pub mod view_state;

pub use deferred::{extract_zip, DeferredLoad};
pub use engine::ViewStateEngine;
pub use error::ViewerError;
pub use events::{OpacitySlider, StateOrigin, ViewerEvent, ViewerIntent};
pub use host::HostBinding;
pub use panels::{
    BoardView, LayersPanel, MountedPanels, NetsPanel, ObjectsPanel, PanelRegistry, TabBar,
    TabsPanel, ViewerPanels,
};
pub use shell::{LoadRequestOutcome, LoadState, Viewer};
pub use view_state::{NetsViewState, ObjectsViewState, PcbViewState, ViewState};
